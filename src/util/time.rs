//! Time utilities for game simulation

use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// Get current Unix timestamp in milliseconds
pub fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
        .as_millis() as u64
}

/// Server start time for uptime tracking
static SERVER_START: std::sync::OnceLock<Instant> = std::sync::OnceLock::new();

/// Initialize server start time (call once at startup)
pub fn init_server_time() {
    SERVER_START.get_or_init(Instant::now);
}

/// Get server uptime in seconds
pub fn uptime_secs() -> u64 {
    SERVER_START
        .get()
        .map(|start| start.elapsed().as_secs())
        .unwrap_or(0)
}

/// Tick rate configuration
pub const SIMULATION_TPS: u32 = 120; // physics ticks per second
pub const BROADCAST_TPS: u32 = 60; // state snapshots per second
pub const TICK_DURATION_MICROS: u64 = 1_000_000 / SIMULATION_TPS as u64;
pub const BROADCAST_INTERVAL_MICROS: u64 = 1_000_000 / BROADCAST_TPS as u64;

/// Upper bound on a single integration step. A stalled process (suspension,
/// debugger, long GC on the host) must not produce a giant delta that blows
/// up the integration.
pub const MAX_TICK_DELTA: f32 = 0.1;

/// Convert elapsed wall-clock time into a bounded physics delta in seconds.
pub fn clamp_tick_delta(elapsed: Duration) -> f32 {
    elapsed.as_secs_f32().min(MAX_TICK_DELTA)
}
