//! Registry of live WebSocket sessions

use dashmap::DashMap;
use uuid::Uuid;

use crate::util::time::unix_millis;

/// Connection metadata kept for the lifetime of a socket
#[derive(Debug, Clone)]
pub struct SessionInfo {
    pub name: String,
    pub connected_at_ms: u64,
}

/// Live connections, maintained by the WebSocket handler and read by the
/// health endpoint.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: DashMap<Uuid, SessionInfo>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, session_id: Uuid, name: String) {
        self.sessions.insert(
            session_id,
            SessionInfo {
                name,
                connected_at_ms: unix_millis(),
            },
        );
    }

    pub fn remove(&self, session_id: Uuid) -> Option<SessionInfo> {
        self.sessions.remove(&session_id).map(|(_, info)| info)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_insert_and_remove() {
        let registry = SessionRegistry::new();
        let id = Uuid::new_v4();

        registry.insert(id, "tracker".to_string());
        assert_eq!(registry.len(), 1);

        let removed = registry.remove(id).unwrap();
        assert_eq!(removed.name, "tracker");
        assert!(registry.is_empty());
        assert!(registry.remove(id).is_none());
    }
}
