//! Snapshot construction for network transmission

use std::collections::HashMap;
use uuid::Uuid;

use crate::ws::protocol::{ProjectileSnapshot, ServerMsg, TankSnapshot};

use super::projectile::Projectile;
use super::tank::Tank;

pub fn tank_snapshot(tank: &Tank) -> TankSnapshot {
    TankSnapshot {
        id: tank.id,
        name: tank.name.clone(),
        x: tank.x,
        y: tank.y,
        vel_x: tank.vel_x,
        vel_y: tank.vel_y,
        body_angle: tank.body_angle,
        turret_angle: tank.turret_angle,
        health: tank.health,
        alive: tank.alive,
        score: tank.score,
    }
}

pub fn projectile_snapshot(projectile: &Projectile) -> ProjectileSnapshot {
    ProjectileSnapshot {
        id: projectile.id,
        owner_id: projectile.owner_id,
        x: projectile.x,
        y: projectile.y,
        vel_x: projectile.vel_x,
        vel_y: projectile.vel_y,
        angle: projectile.angle,
    }
}

pub fn tank_snapshots(tanks: &HashMap<Uuid, Tank>) -> Vec<TankSnapshot> {
    tanks.values().map(tank_snapshot).collect()
}

pub fn projectile_snapshots(projectiles: &[Projectile]) -> Vec<ProjectileSnapshot> {
    projectiles.iter().map(projectile_snapshot).collect()
}

/// Build the full-world broadcast message. Pure read/serialize; the
/// broadcast pass performs no simulation.
pub fn world_snapshot(
    tick: u64,
    timestamp: u64,
    tanks: &HashMap<Uuid, Tank>,
    projectiles: &[Projectile],
) -> ServerMsg {
    ServerMsg::StateSnapshot {
        tick,
        timestamp,
        tanks: tank_snapshots(tanks),
        projectiles: projectile_snapshots(projectiles),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::tuning::{ArenaTuning, TankTuning};

    #[test]
    fn world_snapshot_carries_every_entity() {
        let tuning = ArenaTuning::default();
        let mut tanks = HashMap::new();
        for i in 0..3 {
            let id = Uuid::new_v4();
            tanks.insert(
                id,
                Tank::new(id, format!("tank-{i}"), 100.0 * i as f32 + 100.0, 500.0, &tuning.tank),
            );
        }
        let owner = Uuid::new_v4();
        let projectiles: Vec<Projectile> = (0..2)
            .map(|i| Projectile::new(i, owner, 50.0, 50.0, 0.0, 0, &tuning.projectile))
            .collect();

        match world_snapshot(7, 1234, &tanks, &projectiles) {
            ServerMsg::StateSnapshot {
                tick,
                timestamp,
                tanks,
                projectiles,
            } => {
                assert_eq!(tick, 7);
                assert_eq!(timestamp, 1234);
                assert_eq!(tanks.len(), 3);
                assert_eq!(projectiles.len(), 2);
            }
            other => panic!("expected StateSnapshot, got {other:?}"),
        }
    }

    #[test]
    fn tank_snapshot_preserves_simulation_fields() {
        let mut tank = Tank::new(Uuid::new_v4(), "snap".to_string(), 321.5, 654.25, &TankTuning::default());
        tank.vel_x = -40.0;
        tank.body_angle = 0.75;
        tank.turret_angle = -1.5;
        tank.score = 200;

        let snap = tank_snapshot(&tank);
        assert_eq!(snap.id, tank.id);
        assert_eq!(snap.x, tank.x);
        assert_eq!(snap.vel_x, tank.vel_x);
        assert_eq!(snap.body_angle, tank.body_angle);
        assert_eq!(snap.turret_angle, tank.turret_angle);
        assert_eq!(snap.health, tank.health);
        assert_eq!(snap.score, tank.score);
    }
}
