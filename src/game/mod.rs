//! Game simulation modules

pub mod arena;
pub mod physics;
pub mod projectile;
pub mod snapshot;
pub mod tank;
pub mod tuning;

pub use arena::{Arena, ArenaHandle};

use crate::ws::protocol::ClientMsg;
use uuid::Uuid;

/// Client message received from a WebSocket session
#[derive(Debug, Clone)]
pub struct PlayerInput {
    pub session_id: Uuid,
    pub msg: ClientMsg,
    pub received_at: u64,
}

/// Turret aim target
#[derive(Debug, Clone, Copy)]
pub enum AimTarget {
    /// World-space point (mouse/pointer position)
    Point { x: f32, y: f32 },
    /// Direct angle in radians
    Angle(f32),
}

/// Latest movement intent for a tank, applied every tick
#[derive(Debug, Clone, Default)]
pub struct InputState {
    pub dx: f32,
    pub dy: f32,
    pub boost: bool,
    pub aim: Option<AimTarget>,
}
