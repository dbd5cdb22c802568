//! Dispatcher behaviour driven through text frames and a recording transport.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

mod common;

use common::*;
use folio_core::protocol::outbound::OutboundEvent;
use folio_core::{BookId, UserId};
use folio_gateway::presence::CountPolicy;

fn book(s: &str) -> BookId {
    BookId::parse(s).unwrap()
}

fn user(s: &str) -> UserId {
    UserId::parse(s).unwrap()
}

fn update(count: usize) -> OutboundEvent {
    OutboundEvent::OnlineUsersUpdate { count }
}

fn stats(online_users: usize) -> OutboundEvent {
    OutboundEvent::CurrentStats { online_users }
}

#[test]
fn distinct_users_are_counted() {
    let mut d = dispatcher(CountPolicy::UsersAndAdminSessions);
    for i in 0..5 {
        d.connect(c(i));
        join_user(&mut d, c(i), &format!("user-{i}"));
    }
    assert_eq!(d.online_count(), 5);
    assert_consistent(&d);
}

#[test]
fn multi_device_user_counts_once() {
    let mut d = dispatcher(CountPolicy::UsersAndAdminSessions);
    d.connect(c(1));
    d.connect(c(2));
    join_user(&mut d, c(1), "u1");
    join_user(&mut d, c(2), "u1");
    assert_eq!(d.online_count(), 1);

    d.disconnect(c(1));
    assert_eq!(d.online_count(), 1);
    assert!(d.registry().rooms.is_user_online(&user("u1")));

    d.disconnect(c(2));
    assert_eq!(d.online_count(), 0);
    assert!(d.registry().rooms.user_connections(&user("u1")).is_none());
    assert_consistent(&d);
}

#[test]
fn admin_only_session_counts_once_and_is_not_double_counted() {
    let mut d = dispatcher(CountPolicy::UsersAndAdminSessions);
    d.connect(c(1));
    join_admin(&mut d, c(1));
    assert_eq!(d.online_count(), 1);

    join_user(&mut d, c(1), "u2");
    assert_eq!(d.online_count(), 1);
    assert_consistent(&d);
}

#[test]
fn admin_identifying_as_online_user_broadcasts_lower_count() {
    let mut d = dispatcher(CountPolicy::UsersAndAdminSessions);
    d.connect(c(1));
    d.connect(c(2));
    join_user(&mut d, c(1), "alice");
    join_admin(&mut d, c(2));
    assert_eq!(d.online_count(), 2);
    d.transport().clear();

    // c2 stops being admin-only; alice was already online
    join_user(&mut d, c(2), "alice");
    assert_eq!(d.online_count(), 1);
    assert_eq!(d.transport().received_by(c(2)), vec![update(1)]);
    assert_consistent(&d);
}

#[test]
fn identifying_under_users_only_policy_stays_silent_without_presence_change() {
    let mut d = dispatcher(CountPolicy::UsersOnly);
    d.connect(c(1));
    d.connect(c(2));
    join_user(&mut d, c(1), "alice");
    join_admin(&mut d, c(2));
    d.transport().clear();

    join_user(&mut d, c(2), "alice");
    assert_eq!(d.online_count(), 1);
    assert!(d.transport().received_by(c(2)).is_empty());
}

#[test]
fn leaving_last_member_deletes_book_room() {
    let mut d = dispatcher(CountPolicy::UsersAndAdminSessions);
    d.connect(c(1));
    join_book(&mut d, c(1), "b1");
    assert!(d.registry().rooms.book_members(&book("b1")).is_some());

    leave_book(&mut d, c(1), "b1");
    assert!(d.registry().rooms.book_members(&book("b1")).is_none());
    assert_eq!(d.registry().rooms.book_room_count(), 0);
    assert!(d.transport().members("book:b1").is_empty());
    assert_consistent(&d);
}

#[test]
fn disconnect_clears_every_trace() {
    let mut d = dispatcher(CountPolicy::UsersAndAdminSessions);
    d.connect(c(1));
    d.connect(c(2));
    join_user(&mut d, c(1), "alice");
    join_admin(&mut d, c(1));
    join_book(&mut d, c(1), "b1");
    join_book(&mut d, c(1), "b2");
    join_book(&mut d, c(2), "b2");

    d.disconnect(c(1));

    let reg = d.registry();
    assert!(reg.connections.get(c(1)).is_none());
    assert!(reg.rooms.book_members(&book("b1")).is_none());
    assert!(!reg.rooms.book_members(&book("b2")).unwrap().contains(&c(1)));
    assert!(reg.rooms.user_connections(&user("alice")).is_none());
    assert!(!reg.admins.contains(c(1)));
    assert_eq!(d.transport().released(), vec![c(1)]);
    assert!(d.transport().members("admin").is_empty());
    assert_eq!(d.transport().members("book:b2"), vec![c(2)]);
    assert_consistent(&d);
}

#[test]
fn malformed_joins_change_nothing() {
    let mut d = dispatcher(CountPolicy::UsersAndAdminSessions);
    d.connect(c(1));
    join_book(&mut d, c(1), "b1");

    d.handle_frame(c(1), &frame("joinBookRoom", serde_json::json!("")));
    d.handle_frame(c(1), r#"{"v":1,"event":"joinBookRoom"}"#);
    d.handle_frame(c(1), &frame("joinUserRoom", serde_json::json!("  ")));
    d.handle_frame(c(1), &frame("leaveBookRoom", serde_json::Value::Null));
    d.handle_frame(c(1), "garbage");

    let reg = d.registry();
    assert_eq!(reg.rooms.book_room_count(), 1);
    assert_eq!(reg.rooms.online_user_count(), 0);
    assert_eq!(
        reg.connections.get(c(1)).map(|r| r.book_rooms.len()),
        Some(1)
    );
    assert!(d.transport().emitted().is_empty());
    assert_consistent(&d);
}

#[test]
fn narrative_scenario_counting_users_only() {
    let mut d = dispatcher(CountPolicy::UsersOnly);
    let (a, b, admin, viewer) = (c(1), c(2), c(3), c(4));
    for conn in [a, b, admin, viewer] {
        d.connect(conn);
    }
    join_user(&mut d, a, "alice");
    join_user(&mut d, b, "bob");
    join_admin(&mut d, admin);
    assert_eq!(d.transport().received_by(admin), vec![update(2), stats(2)]);

    d.transport().clear();
    d.disconnect(a);
    assert_eq!(d.transport().received_by(admin), vec![update(1)]);

    join_book(&mut d, b, "book42");
    join_book(&mut d, viewer, "book42");
    leave_book(&mut d, viewer, "book42");

    let members = d.registry().rooms.book_members(&book("book42")).unwrap();
    assert_eq!(members.len(), 1);
    assert!(members.contains(&b));
    assert_eq!(d.transport().members("book:book42"), vec![b]);
    assert_consistent(&d);
}

#[test]
fn narrative_scenario_counting_admin_sessions() {
    let mut d = dispatcher(CountPolicy::UsersAndAdminSessions);
    let (a, b, admin) = (c(1), c(2), c(3));
    for conn in [a, b, admin] {
        d.connect(conn);
    }
    join_user(&mut d, a, "alice");
    join_user(&mut d, b, "bob");
    join_admin(&mut d, admin);
    assert_eq!(d.transport().received_by(admin), vec![update(3), stats(3)]);

    d.transport().clear();
    d.disconnect(a);
    assert_eq!(d.transport().received_by(admin), vec![update(2)]);
}

#[test]
fn only_first_device_of_a_user_triggers_broadcast() {
    let mut d = dispatcher(CountPolicy::UsersAndAdminSessions);
    d.connect(c(1));
    d.connect(c(2));
    d.connect(c(3));
    join_admin(&mut d, c(9));
    join_admin(&mut d, c(3));
    d.transport().clear();

    join_user(&mut d, c(1), "u1");
    assert_eq!(d.transport().received_by(c(3)), vec![update(2)]);

    d.transport().clear();
    join_user(&mut d, c(2), "u1");
    assert!(d.transport().received_by(c(3)).is_empty());

    // first of two devices leaving: no change in presence
    d.disconnect(c(2));
    assert!(d.transport().received_by(c(3)).is_empty());
}

#[test]
fn repeated_admin_join_unicasts_without_broadcast() {
    let mut d = dispatcher(CountPolicy::UsersAndAdminSessions);
    d.connect(c(1));
    d.connect(c(2));
    join_admin(&mut d, c(1));
    join_admin(&mut d, c(2));
    d.transport().clear();

    join_admin(&mut d, c(2));
    assert_eq!(d.transport().received_by(c(1)), Vec::<OutboundEvent>::new());
    assert_eq!(d.transport().received_by(c(2)), vec![stats(2)]);
    assert_eq!(d.registry().admins.len(), 2);
}

#[test]
fn admin_disconnect_broadcasts_to_remaining_observers() {
    let mut d = dispatcher(CountPolicy::UsersAndAdminSessions);
    d.connect(c(1));
    d.connect(c(2));
    join_admin(&mut d, c(1));
    join_admin(&mut d, c(2));
    d.transport().clear();

    d.disconnect(c(2));
    assert_eq!(d.transport().received_by(c(1)), vec![update(1)]);
    assert!(d.transport().received_by(c(2)).is_empty());
}

#[test]
fn plain_viewer_disconnect_is_silent() {
    let mut d = dispatcher(CountPolicy::UsersAndAdminSessions);
    d.connect(c(1));
    d.connect(c(2));
    join_admin(&mut d, c(1));
    join_book(&mut d, c(2), "b1");
    d.transport().clear();

    d.disconnect(c(2));
    assert!(d.transport().emitted().is_empty());
    assert_eq!(d.registry().rooms.book_room_count(), 0);
}

#[test]
fn double_operations_are_noops() {
    let mut d = dispatcher(CountPolicy::UsersAndAdminSessions);
    d.connect(c(1));
    join_book(&mut d, c(1), "b1");
    join_book(&mut d, c(1), "b1");
    assert_eq!(d.registry().rooms.book_members(&book("b1")).map(|s| s.len()), Some(1));

    leave_book(&mut d, c(1), "never-joined");
    leave_book(&mut d, c(1), "b1");
    leave_book(&mut d, c(1), "b1");
    assert_eq!(d.registry().rooms.book_room_count(), 0);

    d.connect(c(1));
    assert_eq!(d.registry().connections.len(), 1);

    d.disconnect(c(1));
    d.disconnect(c(1));
    assert!(d.registry().connections.is_empty());
    assert_consistent(&d);
}

#[test]
fn events_for_unknown_connections_are_ignored() {
    let mut d = dispatcher(CountPolicy::UsersAndAdminSessions);
    d.connect(c(1));
    d.disconnect(c(1));

    join_user(&mut d, c(1), "late");
    join_admin(&mut d, c(1));
    join_book(&mut d, c(1), "b1");

    let reg = d.registry();
    assert!(reg.connections.is_empty());
    assert_eq!(reg.rooms.online_user_count(), 0);
    assert_eq!(reg.rooms.book_room_count(), 0);
    assert!(reg.admins.is_empty());
    assert!(d.transport().members("user:late").is_empty());
    assert!(d.transport().emitted().is_empty());
}

#[test]
fn reidentified_connection_moves_between_users() {
    let mut d = dispatcher(CountPolicy::UsersOnly);
    d.connect(c(1));
    d.connect(c(2));
    join_admin(&mut d, c(2));
    join_user(&mut d, c(1), "u1");
    d.transport().clear();

    join_user(&mut d, c(1), "u2");
    assert!(!d.registry().rooms.is_user_online(&user("u1")));
    assert!(d.registry().rooms.is_user_online(&user("u2")));
    assert_eq!(d.transport().members("user:u1"), Vec::new());
    assert_eq!(d.transport().members("user:u2"), vec![c(1)]);
    assert_eq!(d.transport().received_by(c(2)), vec![update(1)]);
    assert_consistent(&d);
}

#[test]
fn user_and_book_rooms_are_mirrored_in_the_substrate() {
    let mut d = dispatcher(CountPolicy::UsersAndAdminSessions);
    d.connect(c(1));
    join_user(&mut d, c(1), "42");
    d.handle_frame(c(1), &frame("joinBookRoom", serde_json::json!(7)));

    assert_eq!(d.transport().members("user:42"), vec![c(1)]);
    assert_eq!(d.transport().members("book:7"), vec![c(1)]);
}

#[test]
fn client_error_event_leaves_state_alone() {
    let mut d = dispatcher(CountPolicy::UsersAndAdminSessions);
    d.connect(c(1));
    d.handle_frame(c(1), &frame("error", serde_json::json!("boom")));
    d.transport_error(c(1), "connection reset");

    assert_eq!(d.registry().connections.len(), 1);
    assert!(d.transport().emitted().is_empty());
    assert_consistent(&d);
}

#[test]
fn stats_snapshot_reflects_registry() {
    let mut d = dispatcher(CountPolicy::UsersAndAdminSessions);
    d.connect(c(1));
    d.connect(c(2));
    join_user(&mut d, c(1), "u1");
    join_admin(&mut d, c(2));
    join_book(&mut d, c(1), "b1");

    let s = d.stats();
    assert_eq!(s.online_users, 2);
    assert_eq!(s.connections, 2);
    assert_eq!(s.admin_observers, 1);
    assert_eq!(s.book_rooms, 1);
}
