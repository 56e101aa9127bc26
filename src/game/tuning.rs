//! Gameplay tuning constants.
//!
//! Kept separate from runtime/server configuration (bind address, log
//! level). The whole surface is sent to clients at `init` time, so the
//! constants a client predicts with are exactly the ones the server
//! simulates with.

use serde::{Deserialize, Serialize};

/// Tuning for player-controlled tanks.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TankTuning {
    /// World-space collision radius in pixels.
    pub radius: f32,
    /// Movement speed in pixels per second.
    pub speed: f32,
    /// Speed multiplier while boosting.
    pub boost_multiplier: f32,
    /// Fraction of velocity retained after one second of coasting.
    pub friction: f32,
    /// Fraction of the remaining body-angle delta applied per tick.
    pub body_turn_smoothing: f32,
    /// Turret rotation rate in radians per second.
    pub turret_turn_rate: f32,
    /// Velocity fraction reflected on arena-wall contact.
    pub wall_restitution: f32,
    /// Velocity impulse scale on tank-tank contact.
    pub collision_damping: f32,
    pub max_health: i32,
    /// Minimum time between shots in milliseconds.
    pub shoot_cooldown_ms: u64,
    /// Distance from tank center to the projectile spawn point.
    pub muzzle_offset: f32,
    /// Delay between death and respawn in milliseconds.
    pub respawn_ms: u64,
    pub repair_cooldown_ms: u64,
    pub repair_amount: i32,
    /// Score awarded to the attacker for a kill.
    pub kill_score: u32,
}

impl Default for TankTuning {
    fn default() -> Self {
        Self {
            radius: 25.0,
            speed: 250.0,
            boost_multiplier: 1.6,
            friction: 0.2,
            body_turn_smoothing: 0.15,
            turret_turn_rate: 10.0,
            wall_restitution: 0.5,
            collision_damping: 0.5,
            max_health: 100,
            shoot_cooldown_ms: 300,
            muzzle_offset: 35.0,
            respawn_ms: 3000,
            repair_cooldown_ms: 1000,
            repair_amount: 10,
            kill_score: 100,
        }
    }
}

/// Tuning for projectiles.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ProjectileTuning {
    /// World-space collision radius in pixels.
    pub radius: f32,
    /// Speed in pixels per second, fixed at spawn.
    pub speed: f32,
    pub damage: i32,
    /// Lifetime in milliseconds before the projectile is despawned.
    pub lifetime_ms: u64,
    /// Padding around the arena before an escaped projectile is despawned.
    pub bounds_margin: f32,
}

impl Default for ProjectileTuning {
    fn default() -> Self {
        Self {
            radius: 4.0,
            speed: 800.0,
            damage: 20,
            lifetime_ms: 3000,
            bounds_margin: 50.0,
        }
    }
}

/// Arena-level tuning: dimensions, spawn band, population caps.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ArenaTuning {
    pub width: f32,
    pub height: f32,
    /// Margin kept clear of the edges when drawing spawn points.
    pub spawn_margin: f32,
    /// Hard cap on live projectiles; oldest are evicted above it.
    pub max_projectiles: usize,
    pub tank: TankTuning,
    pub projectile: ProjectileTuning,
}

impl Default for ArenaTuning {
    fn default() -> Self {
        Self {
            width: 2000.0,
            height: 2000.0,
            spawn_margin: 100.0,
            max_projectiles: 50,
            tank: TankTuning::default(),
            projectile: ProjectileTuning::default(),
        }
    }
}
