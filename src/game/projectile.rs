//! Projectile entity

use uuid::Uuid;

use super::tuning::{ArenaTuning, ProjectileTuning};

/// Active projectile in the arena.
///
/// Velocity is fixed at spawn and never changes; ids come from an
/// arena-owned monotonic counter and are never reused.
#[derive(Debug, Clone)]
pub struct Projectile {
    pub id: u64,
    pub owner_id: Uuid,
    pub x: f32,
    pub y: f32,
    pub vel_x: f32,
    pub vel_y: f32,
    /// Travel angle, retained for client rendering.
    pub angle: f32,
    pub created_at_ms: u64,
}

impl Projectile {
    pub fn new(
        id: u64,
        owner_id: Uuid,
        x: f32,
        y: f32,
        angle: f32,
        now_ms: u64,
        tuning: &ProjectileTuning,
    ) -> Self {
        Self {
            id,
            owner_id,
            x,
            y,
            vel_x: angle.cos() * tuning.speed,
            vel_y: angle.sin() * tuning.speed,
            angle,
            created_at_ms: now_ms,
        }
    }

    /// Integrate straight-line motion. Returns false once the projectile
    /// has left the padded arena box or outlived its lifetime.
    pub fn update(&mut self, dt: f32, now_ms: u64, tuning: &ArenaTuning) -> bool {
        self.x += self.vel_x * dt;
        self.y += self.vel_y * dt;

        if now_ms.saturating_sub(self.created_at_ms) > tuning.projectile.lifetime_ms {
            return false;
        }

        let margin = tuning.projectile.bounds_margin;
        self.x >= -margin
            && self.x <= tuning.width + margin
            && self.y >= -margin
            && self.y <= tuning.height + margin
    }
}
