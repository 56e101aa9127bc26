//! Application state shared across routes

use std::sync::Arc;

use crate::app::sessions::SessionRegistry;
use crate::config::Config;
use crate::game::tuning::ArenaTuning;
use crate::game::{Arena, ArenaHandle};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub arena: ArenaHandle,
    pub sessions: Arc<SessionRegistry>,
}

impl AppState {
    /// Build the state and the arena task. The caller spawns the arena;
    /// everything else holds only its handle.
    pub fn new(config: Config) -> (Self, Arena) {
        let config = Arc::new(config);

        let seed = config.arena_seed.unwrap_or_else(rand::random);
        let (arena, handle) = Arena::new(seed, ArenaTuning::default());

        let state = Self {
            config,
            arena: handle,
            sessions: Arc::new(SessionRegistry::new()),
        };

        (state, arena)
    }
}
