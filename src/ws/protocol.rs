//! WebSocket protocol message definitions
//! These are the wire types for client-server communication

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::game::tuning::ArenaTuning;

/// Messages sent from client to server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMsg {
    /// Enter the arena. Synthesized by the session layer on connect; a
    /// duplicate from the wire is ignored.
    Join {
        name: Option<String>,
    },

    /// Directional movement intent
    Move {
        /// Horizontal intent, clamped to [-1, 1]
        dx: f32,
        /// Vertical intent, clamped to [-1, 1]
        dy: f32,
        /// Boost while held
        boost: bool,
    },

    /// Aim the turret at a world-space point
    Aim {
        x: f32,
        y: f32,
    },

    /// Aim the turret at a direct angle in radians
    AimAngle {
        angle: f32,
    },

    /// Fire, optionally re-aiming at a point first
    Shoot {
        aim_x: Option<f32>,
        aim_y: Option<f32>,
    },

    /// Self-repair request
    Repair,

    /// Ping for latency measurement
    Ping {
        /// Client timestamp
        t: u64,
    },

    /// Leave the arena. Synthesized by the session layer on disconnect.
    Leave,
}

/// Messages sent from server to client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMsg {
    /// First message after joining: own id and the full tuning surface,
    /// so client prediction uses exactly the server's constants
    Init {
        self_id: Uuid,
        server_time: u64,
        config: ArenaTuning,
    },

    /// World contents prior to the join, sent to the joiner only
    ExistingEntities {
        tanks: Vec<TankSnapshot>,
        projectiles: Vec<ProjectileSnapshot>,
    },

    /// A tank entered the arena
    EntityJoined {
        tank: TankSnapshot,
    },

    /// A tank left the arena
    EntityLeft {
        id: Uuid,
        name: String,
    },

    /// Full world state (sent each broadcast tick)
    StateSnapshot {
        /// Server tick number
        tick: u64,
        /// Server wall-clock in milliseconds
        timestamp: u64,
        tanks: Vec<TankSnapshot>,
        projectiles: Vec<ProjectileSnapshot>,
    },

    /// You were hit (sent to the victim)
    Hit {
        damage: i32,
        attacker_id: Uuid,
    },

    /// A tank died (broadcast)
    EntityDied {
        id: Uuid,
        killer_id: Uuid,
    },

    /// Your shot killed someone (sent to the attacker)
    KillConfirmed {
        victim_name: String,
    },

    /// Your tank died
    Died,

    /// Your tank respawned at a fresh position
    Respawned {
        x: f32,
        y: f32,
    },

    /// Your repair succeeded
    Repaired {
        health: i32,
    },

    /// Pong response
    Pong {
        /// Echo back client timestamp
        t: u64,
    },
}

/// Tank state in a snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TankSnapshot {
    pub id: Uuid,
    pub name: String,
    pub x: f32,
    pub y: f32,
    pub vel_x: f32,
    pub vel_y: f32,
    /// Hull rotation in radians
    pub body_angle: f32,
    /// Turret rotation in radians
    pub turret_angle: f32,
    pub health: i32,
    pub alive: bool,
    pub score: u32,
}

/// Projectile state in a snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectileSnapshot {
    pub id: u64,
    pub owner_id: Uuid,
    pub x: f32,
    pub y: f32,
    pub vel_x: f32,
    pub vel_y: f32,
    /// Travel angle for client rendering
    pub angle: f32,
}

/// Who an outbound message is addressed to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipient {
    All,
    One(Uuid),
}

impl Recipient {
    pub fn includes(&self, session_id: Uuid) -> bool {
        match self {
            Recipient::All => true,
            Recipient::One(id) => *id == session_id,
        }
    }
}

/// Envelope carried on the arena's outbound broadcast channel; each
/// connection's writer keeps what is addressed to it.
#[derive(Debug, Clone)]
pub struct Outbound {
    pub to: Recipient,
    pub msg: ServerMsg,
}

impl Outbound {
    pub fn all(msg: ServerMsg) -> Self {
        Self {
            to: Recipient::All,
            msg,
        }
    }

    pub fn one(session_id: Uuid, msg: ServerMsg) -> Self {
        Self {
            to: Recipient::One(session_id),
            msg,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tank_snapshot_roundtrips_through_json() {
        let snapshot = TankSnapshot {
            id: Uuid::new_v4(),
            name: "roundtrip".to_string(),
            x: 123.456,
            y: -0.25,
            vel_x: 17.5,
            vel_y: -200.0,
            body_angle: 1.234,
            turret_angle: -2.5,
            health: 80,
            alive: true,
            score: 300,
        };

        let json = serde_json::to_string(&snapshot).unwrap();
        let back: TankSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(snapshot, back);
    }

    #[test]
    fn projectile_snapshot_roundtrips_through_json() {
        let snapshot = ProjectileSnapshot {
            id: 42,
            owner_id: Uuid::new_v4(),
            x: 900.0,
            y: 1100.5,
            vel_x: 800.0,
            vel_y: 0.0,
            angle: 0.0,
        };

        let json = serde_json::to_string(&snapshot).unwrap();
        let back: ProjectileSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(snapshot, back);
    }

    #[test]
    fn client_messages_parse_from_tagged_json() {
        let msg: ClientMsg =
            serde_json::from_str(r#"{"type":"move","dx":1.0,"dy":-0.5,"boost":true}"#).unwrap();
        assert!(matches!(msg, ClientMsg::Move { boost: true, .. }));

        let msg: ClientMsg =
            serde_json::from_str(r#"{"type":"shoot","aim_x":640.0,"aim_y":480.0}"#).unwrap();
        assert!(matches!(msg, ClientMsg::Shoot { aim_x: Some(_), .. }));

        let msg: ClientMsg = serde_json::from_str(r#"{"type":"repair"}"#).unwrap();
        assert!(matches!(msg, ClientMsg::Repair));
    }

    #[test]
    fn recipient_filtering() {
        let me = Uuid::new_v4();
        let other = Uuid::new_v4();

        assert!(Recipient::All.includes(me));
        assert!(Recipient::One(me).includes(me));
        assert!(!Recipient::One(other).includes(me));
    }
}
