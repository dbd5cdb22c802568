use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use folio_core::{BookId, ConnectionId, UserId};

use super::connection_table::Connection;

/// Outcome of identifying a connection as a user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Association {
    /// The user had no other connection before this one.
    pub came_online: bool,
    /// Identity the connection carried before, if it was re-identified.
    pub replaced: Option<UserId>,
    /// The replaced identity lost its last connection.
    pub replaced_went_offline: bool,
}

impl Association {
    pub fn presence_changed(&self) -> bool {
        self.came_online || self.replaced_went_offline
    }
}

/// Book room index (`bookId -> connections`) and user presence index
/// (`userId -> connections`). Empty sets are never retained.
#[derive(Debug, Default)]
pub struct RoomIndex {
    books: HashMap<BookId, HashSet<ConnectionId>>,
    users: HashMap<UserId, HashSet<ConnectionId>>,
}

impl RoomIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the connection was not yet in the room.
    pub fn join_book(&mut self, conn: &mut Connection, book: &BookId) -> bool {
        conn.book_rooms.insert(book.clone());
        self.books.entry(book.clone()).or_default().insert(conn.id)
    }

    /// Returns true if the connection was in the room.
    pub fn leave_book(&mut self, conn: &mut Connection, book: &BookId) -> bool {
        let was_member = conn.book_rooms.remove(book);
        remove_member(&mut self.books, book, conn.id);
        was_member
    }

    /// Remove the connection from every book room it occupies.
    pub fn leave_all_books(&mut self, conn: &mut Connection) -> Vec<BookId> {
        let left: Vec<BookId> = conn.book_rooms.drain().collect();
        for book in &left {
            remove_member(&mut self.books, book, conn.id);
        }
        left
    }

    pub fn associate_user(&mut self, conn: &mut Connection, user: UserId) -> Association {
        if conn.user_id.as_ref() == Some(&user) {
            return Association::default();
        }

        let mut outcome = Association::default();
        if let Some(old) = conn.user_id.take() {
            outcome.replaced_went_offline = remove_member(&mut self.users, &old, conn.id);
            outcome.replaced = Some(old);
        }

        let members = self.users.entry(user.clone()).or_default();
        outcome.came_online = members.is_empty();
        members.insert(conn.id);
        conn.user_id = Some(user);
        outcome
    }

    /// Unlink the connection from its user. Returns the user if this was its
    /// last connection (online -> offline transition).
    pub fn disassociate_user(&mut self, conn: &mut Connection) -> Option<UserId> {
        let user = conn.user_id.take()?;
        if remove_member(&mut self.users, &user, conn.id) {
            Some(user)
        } else {
            None
        }
    }

    pub fn book_members(&self, book: &BookId) -> Option<&HashSet<ConnectionId>> {
        self.books.get(book)
    }

    pub fn user_connections(&self, user: &UserId) -> Option<&HashSet<ConnectionId>> {
        self.users.get(user)
    }

    pub fn is_user_online(&self, user: &UserId) -> bool {
        self.users.contains_key(user)
    }

    /// Distinct users with at least one connection.
    pub fn online_user_count(&self) -> usize {
        self.users.len()
    }

    pub fn book_room_count(&self) -> usize {
        self.books.len()
    }

    pub fn books(&self) -> impl Iterator<Item = (&BookId, &HashSet<ConnectionId>)> {
        self.books.iter()
    }

    pub fn users(&self) -> impl Iterator<Item = (&UserId, &HashSet<ConnectionId>)> {
        self.users.iter()
    }
}

/// Remove `id` from `map[key]`, deleting the entry once empty.
/// Returns true if the entry was deleted.
fn remove_member<K: Eq + Hash>(
    map: &mut HashMap<K, HashSet<ConnectionId>>,
    key: &K,
    id: ConnectionId,
) -> bool {
    let Some(set) = map.get_mut(key) else {
        return false;
    };
    if !set.remove(&id) {
        return false;
    }
    if set.is_empty() {
        map.remove(key);
        return true;
    }
    false
}
