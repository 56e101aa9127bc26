//! Arena state and authoritative tick loop

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{broadcast, mpsc};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::util::time::{
    clamp_tick_delta, unix_millis, BROADCAST_INTERVAL_MICROS, TICK_DURATION_MICROS,
};
use crate::ws::protocol::{ClientMsg, Outbound, ServerMsg};

use super::physics;
use super::projectile::Projectile;
use super::snapshot;
use super::tank::Tank;
use super::tuning::ArenaTuning;
use super::{AimTarget, PlayerInput};

/// Draw a spawn point inside the safe band (arena minus the edge margin).
fn random_spawn(rng: &mut ChaCha8Rng, tuning: &ArenaTuning) -> (f32, f32) {
    let x = rng.gen_range(tuning.spawn_margin..tuning.width - tuning.spawn_margin);
    let y = rng.gen_range(tuning.spawn_margin..tuning.height - tuning.spawn_margin);
    (x, y)
}

/// A projectile-tank contact queued during the scan phase and applied
/// after it, so damage application never aliases the tank map.
struct PendingHit {
    projectile_idx: usize,
    victim_id: Uuid,
    attacker_id: Uuid,
}

/// The authoritative world: every live tank and projectile, plus the
/// monotonic projectile id counter and the spawn RNG.
pub struct ArenaState {
    pub tick: u64,
    pub tanks: HashMap<Uuid, Tank>,
    /// Kept in creation order; oldest first.
    pub projectiles: Vec<Projectile>,
    pub next_projectile_id: u64,
    pub rng: ChaCha8Rng,
    pub tuning: ArenaTuning,
}

impl ArenaState {
    pub fn new(seed: u64, tuning: ArenaTuning) -> Self {
        Self {
            tick: 0,
            tanks: HashMap::new(),
            projectiles: Vec::new(),
            next_projectile_id: 0,
            rng: ChaCha8Rng::seed_from_u64(seed),
            tuning,
        }
    }

    /// Apply one inbound client message. Messages for unknown session ids
    /// (disconnect races) are dropped silently.
    pub fn handle_message(&mut self, input: PlayerInput, now_ms: u64, out: &mut Vec<Outbound>) {
        let session_id = input.session_id;
        match input.msg {
            ClientMsg::Join { name } => self.handle_join(session_id, name, now_ms, out),
            ClientMsg::Leave => self.handle_leave(session_id, out),
            ClientMsg::Move { dx, dy, boost } => {
                if let Some(tank) = self.tanks.get_mut(&session_id) {
                    tank.input.dx = dx.clamp(-1.0, 1.0);
                    tank.input.dy = dy.clamp(-1.0, 1.0);
                    tank.input.boost = boost;
                } else {
                    debug!(session_id = %session_id, "Move for unknown tank, dropping");
                }
            }
            ClientMsg::Aim { x, y } => {
                if let Some(tank) = self.tanks.get_mut(&session_id) {
                    tank.input.aim = Some(AimTarget::Point { x, y });
                }
            }
            ClientMsg::AimAngle { angle } => {
                if let Some(tank) = self.tanks.get_mut(&session_id) {
                    tank.input.aim = Some(AimTarget::Angle(angle));
                }
            }
            ClientMsg::Shoot { aim_x, aim_y } => self.handle_shoot(session_id, aim_x, aim_y, now_ms),
            ClientMsg::Repair => {
                if let Some(tank) = self.tanks.get_mut(&session_id) {
                    if let Some(health) = tank.repair(now_ms, &self.tuning.tank) {
                        out.push(Outbound::one(session_id, ServerMsg::Repaired { health }));
                    }
                }
            }
            ClientMsg::Ping { t } => {
                out.push(Outbound::one(session_id, ServerMsg::Pong { t }));
            }
        }
    }

    fn handle_join(
        &mut self,
        session_id: Uuid,
        name: Option<String>,
        now_ms: u64,
        out: &mut Vec<Outbound>,
    ) {
        if self.tanks.contains_key(&session_id) {
            warn!(session_id = %session_id, "Tank already in arena");
            return;
        }

        // World as it was before this join, for the joiner only
        let existing_tanks = snapshot::tank_snapshots(&self.tanks);
        let existing_projectiles = snapshot::projectile_snapshots(&self.projectiles);

        let (spawn_x, spawn_y) = random_spawn(&mut self.rng, &self.tuning);
        let name = name.unwrap_or_else(|| format!("Tank_{}", &session_id.to_string()[..8]));
        let tank = Tank::new(session_id, name, spawn_x, spawn_y, &self.tuning.tank);
        let joined = snapshot::tank_snapshot(&tank);
        self.tanks.insert(session_id, tank);

        out.push(Outbound::one(
            session_id,
            ServerMsg::Init {
                self_id: session_id,
                server_time: now_ms,
                config: self.tuning,
            },
        ));
        out.push(Outbound::one(
            session_id,
            ServerMsg::ExistingEntities {
                tanks: existing_tanks,
                projectiles: existing_projectiles,
            },
        ));
        out.push(Outbound::all(ServerMsg::EntityJoined { tank: joined }));

        info!(
            session_id = %session_id,
            tank_count = self.tanks.len(),
            "Tank joined arena"
        );
    }

    fn handle_leave(&mut self, session_id: Uuid, out: &mut Vec<Outbound>) {
        if let Some(tank) = self.tanks.remove(&session_id) {
            out.push(Outbound::all(ServerMsg::EntityLeft {
                id: session_id,
                name: tank.name,
            }));

            info!(
                session_id = %session_id,
                tank_count = self.tanks.len(),
                "Tank left arena"
            );
        }
    }

    fn handle_shoot(
        &mut self,
        session_id: Uuid,
        aim_x: Option<f32>,
        aim_y: Option<f32>,
        now_ms: u64,
    ) {
        if let Some(tank) = self.tanks.get_mut(&session_id) {
            if let (Some(x), Some(y)) = (aim_x, aim_y) {
                tank.input.aim = Some(AimTarget::Point { x, y });
            }
            // The projectile leaves along the current turret angle; turret
            // rotation toward a new aim point is rate-limited.
            if let Some(projectile) = tank.shoot(now_ms, self.next_projectile_id, &self.tuning) {
                self.next_projectile_id += 1;
                self.projectiles.push(projectile);
            }
        }
    }

    /// Advance the world by one bounded delta: respawns, entity motion,
    /// bullet-vs-tank, tank-vs-tank, projectile population cap.
    pub fn step(&mut self, now_ms: u64, dt: f32, out: &mut Vec<Outbound>) {
        self.tick += 1;

        for tank in self.tanks.values_mut() {
            if tank.respawn_due(now_ms) {
                let (x, y) = random_spawn(&mut self.rng, &self.tuning);
                tank.respawn(x, y, &self.tuning.tank);
                out.push(Outbound::one(tank.id, ServerMsg::Respawned { x, y }));
            } else {
                tank.update(dt, &self.tuning);
            }
        }

        let tuning = &self.tuning;
        self.projectiles
            .retain_mut(|p| p.update(dt, now_ms, tuning));

        self.resolve_projectile_hits(now_ms, out);
        self.resolve_tank_collisions();
        self.enforce_projectile_cap();
    }

    /// Scan every live projectile against every alive tank except its
    /// owner. A projectile strikes at most one tank per tick: the closest
    /// eligible one in range (deterministic tie-break), and is removed
    /// afterward.
    fn resolve_projectile_hits(&mut self, now_ms: u64, out: &mut Vec<Outbound>) {
        let hit_range = self.tuning.tank.radius + self.tuning.projectile.radius;
        let hit_range_sq = hit_range * hit_range;

        let mut pending: Vec<PendingHit> = Vec::new();
        for (idx, projectile) in self.projectiles.iter().enumerate() {
            let mut closest: Option<(Uuid, f32)> = None;
            for tank in self.tanks.values() {
                if !tank.alive || tank.id == projectile.owner_id {
                    continue;
                }
                let d2 = physics::dist_sq(projectile.x, projectile.y, tank.x, tank.y);
                if d2 <= hit_range_sq && closest.map_or(true, |(_, best)| d2 < best) {
                    closest = Some((tank.id, d2));
                }
            }
            if let Some((victim_id, _)) = closest {
                pending.push(PendingHit {
                    projectile_idx: idx,
                    victim_id,
                    attacker_id: projectile.owner_id,
                });
            }
        }

        let damage = self.tuning.projectile.damage;
        let kill_score = self.tuning.tank.kill_score;
        // Ascending by construction; removed back-to-front below
        let mut struck: Vec<usize> = Vec::with_capacity(pending.len());

        for hit in pending {
            struck.push(hit.projectile_idx);

            let mut lethal = false;
            let mut victim_name = String::new();
            if let Some(victim) = self.tanks.get_mut(&hit.victim_id) {
                // Another projectile may have killed it earlier this tick
                if !victim.alive {
                    continue;
                }
                lethal = victim.take_damage(damage, now_ms, &self.tuning.tank);
                out.push(Outbound::one(
                    hit.victim_id,
                    ServerMsg::Hit {
                        damage,
                        attacker_id: hit.attacker_id,
                    },
                ));
                if lethal {
                    victim_name = victim.name.clone();
                    out.push(Outbound::one(hit.victim_id, ServerMsg::Died));
                }
            }

            if lethal {
                // Attacker may have disconnected between firing and impact
                if let Some(attacker) = self.tanks.get_mut(&hit.attacker_id) {
                    attacker.score += kill_score;
                    out.push(Outbound::one(
                        hit.attacker_id,
                        ServerMsg::KillConfirmed { victim_name },
                    ));
                }
                out.push(Outbound::all(ServerMsg::EntityDied {
                    id: hit.victim_id,
                    killer_id: hit.attacker_id,
                }));
            }
        }

        for idx in struck.into_iter().rev() {
            self.projectiles.remove(idx);
        }
    }

    /// Brute-force pairwise separation of alive tanks: each moves half the
    /// penetration depth along the collision normal, with an opposite
    /// velocity impulse scaled by the collision damping. Approximate, not
    /// momentum-conserving; coincident centers are skipped.
    fn resolve_tank_collisions(&mut self) {
        let ids: Vec<Uuid> = self
            .tanks
            .values()
            .filter(|t| t.alive)
            .map(|t| t.id)
            .collect();

        let radius = self.tuning.tank.radius;
        let damping = self.tuning.tank.collision_damping;

        for i in 0..ids.len() {
            for j in (i + 1)..ids.len() {
                let normal = match (self.tanks.get(&ids[i]), self.tanks.get(&ids[j])) {
                    (Some(a), Some(b)) => {
                        physics::collision_normal(a.x, a.y, b.x, b.y, radius, radius)
                    }
                    _ => None,
                };
                let Some((nx, ny, depth)) = normal else {
                    continue;
                };

                let push = depth * 0.5;
                let impulse = depth * damping;

                if let Some(a) = self.tanks.get_mut(&ids[i]) {
                    a.x -= nx * push;
                    a.y -= ny * push;
                    a.vel_x -= nx * impulse;
                    a.vel_y -= ny * impulse;
                }
                if let Some(b) = self.tanks.get_mut(&ids[j]) {
                    b.x += nx * push;
                    b.y += ny * push;
                    b.vel_x += nx * impulse;
                    b.vel_y += ny * impulse;
                }
            }
        }
    }

    /// Evict oldest projectiles above the population cap. The vector is
    /// in creation order, so the front is oldest. Silent; clients
    /// reconcile through the next snapshot.
    fn enforce_projectile_cap(&mut self) {
        let cap = self.tuning.max_projectiles;
        if self.projectiles.len() > cap {
            let excess = self.projectiles.len() - cap;
            self.projectiles.drain(..excess);
            debug!(evicted = excess, "Projectile cap reached, evicted oldest");
        }
    }

    /// Build the broadcast snapshot. Pure read, no simulation.
    pub fn snapshot_msg(&self, now_ms: u64) -> ServerMsg {
        snapshot::world_snapshot(self.tick, now_ms, &self.tanks, &self.projectiles)
    }
}

/// Handle to the running arena task
#[derive(Clone)]
pub struct ArenaHandle {
    pub input_tx: mpsc::Sender<PlayerInput>,
    pub outbound_tx: broadcast::Sender<Outbound>,
    pub tank_count: Arc<AtomicUsize>,
}

impl ArenaHandle {
    pub fn tank_count(&self) -> usize {
        self.tank_count.load(Ordering::Relaxed)
    }
}

/// The authoritative arena task: single owner of the world state, driven
/// by two independent intervals (simulation tick and network broadcast)
/// multiplexed on one task, so no locking is needed.
pub struct Arena {
    state: ArenaState,
    input_rx: mpsc::Receiver<PlayerInput>,
    outbound_tx: broadcast::Sender<Outbound>,
    tank_count: Arc<AtomicUsize>,
}

impl Arena {
    pub fn new(seed: u64, tuning: ArenaTuning) -> (Self, ArenaHandle) {
        info!(seed, "Creating arena");

        let (input_tx, input_rx) = mpsc::channel(256);
        let (outbound_tx, _) = broadcast::channel(256);
        let tank_count = Arc::new(AtomicUsize::new(0));

        let handle = ArenaHandle {
            input_tx,
            outbound_tx: outbound_tx.clone(),
            tank_count: tank_count.clone(),
        };

        let arena = Self {
            state: ArenaState::new(seed, tuning),
            input_rx,
            outbound_tx,
            tank_count,
        };

        (arena, handle)
    }

    /// Run the authoritative loop until the process exits.
    pub async fn run(mut self) {
        info!("Arena started");

        let mut sim_interval = interval(Duration::from_micros(TICK_DURATION_MICROS));
        sim_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut broadcast_interval = interval(Duration::from_micros(BROADCAST_INTERVAL_MICROS));
        broadcast_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut last_step = Instant::now();
        let mut out: Vec<Outbound> = Vec::new();

        loop {
            tokio::select! {
                _ = sim_interval.tick() => {
                    let now_ms = unix_millis();

                    while let Ok(input) = self.input_rx.try_recv() {
                        self.state.handle_message(input, now_ms, &mut out);
                    }

                    let stepped_at = Instant::now();
                    let dt = clamp_tick_delta(stepped_at - last_step);
                    last_step = stepped_at;

                    self.state.step(now_ms, dt, &mut out);
                    self.tank_count.store(self.state.tanks.len(), Ordering::Relaxed);

                    for outbound in out.drain(..) {
                        let _ = self.outbound_tx.send(outbound);
                    }
                }
                _ = broadcast_interval.tick() => {
                    let msg = self.state.snapshot_msg(unix_millis());
                    let _ = self.outbound_tx.send(Outbound::all(msg));
                }
            }
        }
    }
}
