//! Tank entity: movement, combat and lifecycle state machine

use uuid::Uuid;

use super::physics;
use super::projectile::Projectile;
use super::tuning::{ArenaTuning, TankTuning};
use super::{AimTarget, InputState};

/// Authoritative per-player tank state.
///
/// Every time-dependent operation takes the current time explicitly, so
/// the whole state machine can be driven by a synthetic clock.
#[derive(Debug, Clone)]
pub struct Tank {
    pub id: Uuid,
    pub name: String,

    // Kinematics
    pub x: f32,
    pub y: f32,
    pub vel_x: f32,
    pub vel_y: f32,
    pub body_angle: f32,
    pub target_body_angle: f32,
    pub turret_angle: f32,
    pub target_turret_angle: f32,

    // Combat
    pub health: i32,
    pub alive: bool,
    pub score: u32,
    pub last_shot_ms: u64,
    pub last_repair_ms: u64,
    pub respawn_at_ms: u64,

    pub input: InputState,
}

impl Tank {
    pub fn new(id: Uuid, name: String, x: f32, y: f32, tuning: &TankTuning) -> Self {
        Self {
            id,
            name,
            x,
            y,
            vel_x: 0.0,
            vel_y: 0.0,
            body_angle: 0.0,
            target_body_angle: 0.0,
            turret_angle: 0.0,
            target_turret_angle: 0.0,
            health: tuning.max_health,
            alive: true,
            score: 0,
            last_shot_ms: 0,
            last_repair_ms: 0,
            respawn_at_ms: 0,
            input: InputState::default(),
        }
    }

    /// Translate the input buffer into velocity and rotation targets.
    ///
    /// Velocity is set directly (not force-based). Zero directional intent
    /// keeps the last velocity and leaves the body-angle target alone.
    pub fn apply_input(&mut self, tuning: &TankTuning) {
        let (dx, dy) = (self.input.dx, self.input.dy);
        let magnitude = (dx * dx + dy * dy).sqrt();
        if magnitude > f32::EPSILON {
            let speed = tuning.speed
                * if self.input.boost {
                    tuning.boost_multiplier
                } else {
                    1.0
                };
            self.vel_x = dx / magnitude * speed;
            self.vel_y = dy / magnitude * speed;
            self.target_body_angle = self.vel_y.atan2(self.vel_x);
        }

        match self.input.aim {
            Some(AimTarget::Point { x, y }) => {
                self.target_turret_angle = (y - self.y).atan2(x - self.x);
            }
            Some(AimTarget::Angle(angle)) => {
                self.target_turret_angle = physics::normalize_angle(angle);
            }
            None => {}
        }
    }

    /// Advance one physics step. No-op while dead; the arena drives the
    /// respawn deadline via `respawn_due`.
    pub fn update(&mut self, dt: f32, tuning: &ArenaTuning) {
        if !self.alive {
            return;
        }

        self.apply_input(&tuning.tank);

        // Exponential velocity decay, then integrate
        let decay = tuning.tank.friction.powf(dt);
        self.vel_x *= decay;
        self.vel_y *= decay;
        self.x += self.vel_x * dt;
        self.y += self.vel_y * dt;

        // Body angle: fractional blend toward the target per tick.
        // Turret angle: proportional step scaled by the turn rate and dt.
        // Deltas are normalized first so rotation takes the shorter path.
        let body_delta = physics::angle_delta(self.body_angle, self.target_body_angle);
        self.body_angle =
            physics::normalize_angle(self.body_angle + body_delta * tuning.tank.body_turn_smoothing);

        let turret_delta = physics::angle_delta(self.turret_angle, self.target_turret_angle);
        self.turret_angle = physics::normalize_angle(
            self.turret_angle + turret_delta * tuning.tank.turret_turn_rate * dt,
        );

        self.clamp_to_bounds(tuning);
    }

    /// Keep the tank inside the arena, reflecting the offending velocity
    /// component scaled by the wall restitution.
    fn clamp_to_bounds(&mut self, tuning: &ArenaTuning) {
        let radius = tuning.tank.radius;
        let restitution = tuning.tank.wall_restitution;

        let max_x = tuning.width - radius;
        if self.x < radius {
            self.x = radius;
            if self.vel_x < 0.0 {
                self.vel_x = -self.vel_x * restitution;
            }
        } else if self.x > max_x {
            self.x = max_x;
            if self.vel_x > 0.0 {
                self.vel_x = -self.vel_x * restitution;
            }
        }

        let max_y = tuning.height - radius;
        if self.y < radius {
            self.y = radius;
            if self.vel_y < 0.0 {
                self.vel_y = -self.vel_y * restitution;
            }
        } else if self.y > max_y {
            self.y = max_y;
            if self.vel_y > 0.0 {
                self.vel_y = -self.vel_y * restitution;
            }
        }
    }

    /// Fire a projectile along the current turret direction. Returns
    /// `None` while dead or inside the shot cooldown.
    pub fn shoot(&mut self, now_ms: u64, projectile_id: u64, tuning: &ArenaTuning) -> Option<Projectile> {
        if !self.alive {
            return None;
        }
        if now_ms.saturating_sub(self.last_shot_ms) < tuning.tank.shoot_cooldown_ms {
            return None;
        }

        self.last_shot_ms = now_ms;
        let (sin, cos) = self.turret_angle.sin_cos();
        Some(Projectile::new(
            projectile_id,
            self.id,
            self.x + cos * tuning.tank.muzzle_offset,
            self.y + sin * tuning.tank.muzzle_offset,
            self.turret_angle,
            now_ms,
            &tuning.projectile,
        ))
    }

    /// Apply damage. Returns true when this call was lethal. No-op on a
    /// dead tank. Kill credit is resolved by the arena, which owns both
    /// combatants.
    pub fn take_damage(&mut self, amount: i32, now_ms: u64, tuning: &TankTuning) -> bool {
        if !self.alive {
            return false;
        }

        self.health -= amount;
        if self.health <= 0 {
            self.die(now_ms, tuning);
            true
        } else {
            false
        }
    }

    pub fn die(&mut self, now_ms: u64, tuning: &TankTuning) {
        self.alive = false;
        self.health = 0;
        self.vel_x = 0.0;
        self.vel_y = 0.0;
        self.respawn_at_ms = now_ms + tuning.respawn_ms;
    }

    /// Whether the respawn deadline has elapsed.
    pub fn respawn_due(&self, now_ms: u64) -> bool {
        !self.alive && now_ms > self.respawn_at_ms
    }

    /// Reset to a fresh, fully healed tank at the given spawn point.
    pub fn respawn(&mut self, x: f32, y: f32, tuning: &TankTuning) {
        self.alive = true;
        self.health = tuning.max_health;
        self.x = x;
        self.y = y;
        self.vel_x = 0.0;
        self.vel_y = 0.0;
        self.body_angle = 0.0;
        self.target_body_angle = 0.0;
        self.turret_angle = 0.0;
        self.target_turret_angle = 0.0;
        self.input = InputState::default();
    }

    /// Self-repair, gated by the repair cooldown. Returns the new health
    /// on success.
    pub fn repair(&mut self, now_ms: u64, tuning: &TankTuning) -> Option<i32> {
        if !self.alive {
            return None;
        }
        if now_ms.saturating_sub(self.last_repair_ms) < tuning.repair_cooldown_ms {
            return None;
        }

        self.last_repair_ms = now_ms;
        self.health = (self.health + tuning.repair_amount).min(tuning.max_health);
        Some(self.health)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn arena() -> ArenaTuning {
        ArenaTuning::default()
    }

    fn tank_at(x: f32, y: f32) -> Tank {
        Tank::new(Uuid::new_v4(), "test".to_string(), x, y, &TankTuning::default())
    }

    #[test]
    fn moves_monotonically_under_constant_input() {
        let tuning = arena();
        let mut tank = tank_at(100.0, 100.0);
        tank.input.dx = 1.0;

        let dt = 1.0 / 120.0;
        let mut prev_x = tank.x;
        for _ in 0..120 {
            tank.update(dt, &tuning);
            assert!(tank.x > prev_x);
            prev_x = tank.x;
        }

        // One simulated second at 250 px/s; friction decay applies after
        // the velocity is set each tick, so the result stays below 350.
        assert!(tank.x < 100.0 + tuning.tank.speed);
        assert!(tank.x > 330.0);
        assert_approx_eq!(tank.y, 100.0, 1e-4);
    }

    #[test]
    fn diagonal_input_is_normalized() {
        let tuning = arena();
        let mut tank = tank_at(500.0, 500.0);
        tank.input.dx = 1.0;
        tank.input.dy = 1.0;
        tank.apply_input(&tuning.tank);

        let speed = (tank.vel_x * tank.vel_x + tank.vel_y * tank.vel_y).sqrt();
        assert_approx_eq!(speed, tuning.tank.speed, 1e-2);
    }

    #[test]
    fn boost_scales_speed() {
        let tuning = arena();
        let mut tank = tank_at(500.0, 500.0);
        tank.input.dx = 1.0;
        tank.input.boost = true;
        tank.apply_input(&tuning.tank);

        assert_approx_eq!(tank.vel_x, tuning.tank.speed * tuning.tank.boost_multiplier, 1e-2);
    }

    #[test]
    fn wall_contact_clamps_and_reflects() {
        let tuning = arena();
        let mut tank = tank_at(26.0, 500.0);
        tank.vel_x = -1000.0;

        tank.update(1.0 / 120.0, &tuning);

        assert_eq!(tank.x, tuning.tank.radius);
        assert!(tank.vel_x > 0.0, "velocity must reflect off the wall");
        // Restitution halves the reflected component
        assert!(tank.vel_x < 1000.0 * tuning.tank.wall_restitution);
    }

    #[test]
    fn position_stays_inside_bounds_while_alive() {
        let tuning = arena();
        let mut tank = tank_at(30.0, 30.0);
        tank.input.dx = -1.0;
        tank.input.dy = -1.0;

        for _ in 0..240 {
            tank.update(1.0 / 120.0, &tuning);
            assert!(tank.x >= tuning.tank.radius && tank.x <= tuning.width - tuning.tank.radius);
            assert!(tank.y >= tuning.tank.radius && tank.y <= tuning.height - tuning.tank.radius);
        }
    }

    #[test]
    fn shot_cooldown_gates_fire_rate() {
        let tuning = arena();
        let mut tank = tank_at(500.0, 500.0);

        assert!(tank.shoot(10_000, 1, &tuning).is_some());
        assert!(tank.shoot(10_299, 2, &tuning).is_none());
        assert!(tank.shoot(10_300, 3, &tuning).is_some());
    }

    #[test]
    fn projectile_spawns_at_the_muzzle() {
        let tuning = arena();
        let mut tank = tank_at(500.0, 500.0);
        let p = tank.shoot(10_000, 1, &tuning).unwrap();

        assert_approx_eq!(p.x, 500.0 + tuning.tank.muzzle_offset);
        assert_approx_eq!(p.y, 500.0, 1e-4);
        assert_approx_eq!(p.vel_x, tuning.projectile.speed, 1e-2);
        assert_eq!(p.owner_id, tank.id);
    }

    #[test]
    fn damage_clamps_health_and_kills_at_zero() {
        let tuning = arena();
        let mut tank = tank_at(500.0, 500.0);

        assert!(!tank.take_damage(60, 5_000, &tuning.tank));
        assert_eq!(tank.health, 40);

        assert!(tank.take_damage(60, 5_000, &tuning.tank));
        assert_eq!(tank.health, 0);
        assert!(!tank.alive);
        assert_eq!(tank.respawn_at_ms, 5_000 + tuning.tank.respawn_ms);

        // Dead tanks absorb nothing
        assert!(!tank.take_damage(60, 5_100, &tuning.tank));
        assert_eq!(tank.health, 0);
    }

    #[test]
    fn dead_tank_ignores_physics_until_respawn() {
        let tuning = arena();
        let mut tank = tank_at(500.0, 500.0);
        tank.input.dx = 1.0;
        tank.take_damage(200, 5_000, &tuning.tank);

        let x = tank.x;
        tank.update(1.0 / 120.0, &tuning);
        assert_eq!(tank.x, x);
        assert_eq!(tank.vel_x, 0.0);

        assert!(!tank.respawn_due(5_000 + tuning.tank.respawn_ms));
        assert!(tank.respawn_due(5_001 + tuning.tank.respawn_ms));

        tank.respawn(750.0, 800.0, &tuning.tank);
        assert!(tank.alive);
        assert_eq!(tank.health, tuning.tank.max_health);
        assert_eq!((tank.x, tank.y), (750.0, 800.0));
        assert_eq!(tank.input.dx, 0.0);
    }

    #[test]
    fn repair_applies_once_per_cooldown_window() {
        let tuning = arena();
        let mut tank = tank_at(500.0, 500.0);
        tank.take_damage(30, 10_000, &tuning.tank);
        assert_eq!(tank.health, 70);

        assert_eq!(tank.repair(20_000, &tuning.tank), Some(80));
        // Second call inside the window changes nothing
        assert_eq!(tank.repair(20_500, &tuning.tank), None);
        assert_eq!(tank.health, 80);

        assert_eq!(tank.repair(21_000, &tuning.tank), Some(90));
    }

    #[test]
    fn repair_caps_at_max_health() {
        let tuning = arena();
        let mut tank = tank_at(500.0, 500.0);
        tank.take_damage(5, 10_000, &tuning.tank);

        assert_eq!(tank.repair(20_000, &tuning.tank), Some(tuning.tank.max_health));
    }

    #[test]
    fn turret_tracks_a_point_aim_target() {
        let tuning = arena();
        let mut tank = tank_at(500.0, 500.0);
        tank.input.aim = Some(AimTarget::Point { x: 500.0, y: 600.0 });

        for _ in 0..240 {
            tank.update(1.0 / 120.0, &tuning);
        }

        // Target is straight down (+y)
        assert_approx_eq!(tank.turret_angle, std::f32::consts::FRAC_PI_2, 1e-2);
    }
}
