use super::{AdminObserverSet, ConnectionTable, RoomIndex};

/// Which sessions contribute to the online count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountPolicy {
    /// Distinct users plus every admin session not already counted as a user.
    UsersAndAdminSessions,
    /// Distinct users only.
    UsersOnly,
}

/// Derives the aggregate online count from the current registry snapshot.
/// Nothing is cached between calls.
#[derive(Debug, Clone, Copy)]
pub struct PresenceCounter {
    policy: CountPolicy,
}

impl PresenceCounter {
    pub fn new(policy: CountPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> CountPolicy {
        self.policy
    }

    pub fn compute_online_count(
        &self,
        connections: &ConnectionTable,
        rooms: &RoomIndex,
        admins: &AdminObserverSet,
    ) -> usize {
        let users = rooms.online_user_count();
        match self.policy {
            CountPolicy::UsersOnly => users,
            CountPolicy::UsersAndAdminSessions => {
                let admin_only = admins
                    .iter()
                    .filter(|id| {
                        let user = connections.get(*id).and_then(|c| c.user_id.as_ref());
                        match user {
                            // dashboard-only session
                            None => true,
                            // identified, but that identity is no longer online
                            Some(u) => !rooms.is_user_online(u),
                        }
                    })
                    .count();
                users + admin_only
            }
        }
    }
}

impl Default for PresenceCounter {
    fn default() -> Self {
        Self::new(CountPolicy::UsersAndAdminSessions)
    }
}
