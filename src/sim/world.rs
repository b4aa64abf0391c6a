//! The world: every entity, the tick driver and collision sweep
//!
//! Entities live in a generational arena. `live` holds the ones being simulated;
//! entities created mid-tick wait in `pending` until the next promotion so the live
//! list never changes while it is being walked. Collision is a brute-force pairwise
//! sweep over live entities plus their edge ghosts.

use std::mem;

use crossbeam_channel::Receiver;
use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use slotmap::SlotMap;

use super::boundary::WorldBoundary;
use super::clock::Clock;
use super::control::{Control, ControlHandle};
use super::entity::{Behavior, Destruction, Entity, EntityId, Origin, SpawnCtx, Star, collide};
use super::state::GameState;
use crate::Settings;
use crate::net::{BulletState, NetworkUpdate, PlayerPose};
use crate::renderer::RenderSink;

pub struct World {
    settings: Settings,
    boundary: WorldBoundary,
    entities: SlotMap<EntityId, Entity>,
    /// Simulated entities, in update order
    live: Vec<EntityId>,
    /// Inserted since the last promotion, in arrival order
    pending: Vec<EntityId>,
    /// Wrapped copies of edge-straddling entities, rebuilt every update
    ghosts: Vec<(EntityId, Vec2)>,
    stars: Vec<Star>,
    clock: Clock,
    rng: Pcg32,
    state: GameState,
    player: Option<EntityId>,
    player_control: ControlHandle,
    remote: Option<EntityId>,
    record_bullets: bool,
    outbound: Vec<BulletState>,
    inbox: Option<Receiver<NetworkUpdate>>,
}

impl World {
    /// World over the system clock
    pub fn new(settings: Settings) -> Self {
        Self::with_clock(settings, Clock::system())
    }

    pub fn with_clock(settings: Settings, clock: Clock) -> Self {
        let seed = settings.seed.unwrap_or_else(rand::random);
        log::info!("World seed: {}", seed);

        Self {
            boundary: WorldBoundary::new(settings.world.width, settings.world.height),
            state: GameState::new(settings.ship.lives),
            settings,
            entities: SlotMap::with_key(),
            live: Vec::new(),
            pending: Vec::new(),
            ghosts: Vec::new(),
            stars: Vec::new(),
            clock,
            rng: Pcg32::seed_from_u64(seed),
            player: None,
            player_control: ControlHandle::new(),
            remote: None,
            record_bullets: false,
            outbound: Vec::new(),
            inbox: None,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn boundary(&self) -> &WorldBoundary {
        &self.boundary
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut Clock {
        &mut self.clock
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn rng_mut(&mut self) -> &mut Pcg32 {
        &mut self.rng
    }

    /// Buttons for the local player's ship; survives respawns
    pub fn player_control(&self) -> &ControlHandle {
        &self.player_control
    }

    /// The local player's ship, while it exists
    pub fn player(&self) -> Option<EntityId> {
        self.player.filter(|&id| self.entities.contains_key(id))
    }

    /// The peer's ship, while it exists
    pub fn remote_player(&self) -> Option<EntityId> {
        self.remote.filter(|&id| self.entities.contains_key(id))
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(id)
    }

    /// Number of live entities
    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn live(&self) -> impl Iterator<Item = (EntityId, &Entity)> + '_ {
        self.live
            .iter()
            .filter_map(|&id| self.entities.get(id).map(|e| (id, e)))
    }

    pub fn ghosts(&self) -> &[(EntityId, Vec2)] {
        &self.ghosts
    }

    pub fn stars(&self) -> &[Star] {
        &self.stars
    }

    /// Live and pending entities simulated here
    pub fn local_count(&self) -> usize {
        self.count_origin(Origin::Local)
    }

    /// Live and pending entities mirrored from the peer
    pub fn remote_count(&self) -> usize {
        self.count_origin(Origin::Remote)
    }

    fn count_origin(&self, origin: Origin) -> usize {
        self.live
            .iter()
            .chain(&self.pending)
            .filter_map(|&id| self.entities.get(id))
            .filter(|e| e.origin == origin)
            .count()
    }

    /// Queue an entity; it joins the simulation at the next promotion
    pub fn insert(&mut self, entity: Entity) -> EntityId {
        if entity.counts_as_target() {
            self.state.target_added();
        }
        let id = self.entities.insert(entity);
        if let Some(Behavior::Turret(turret)) = self.entities.get_mut(id).map(|e| &mut e.behavior) {
            turret.ai.set_active_target(id);
        }
        self.pending.push(id);
        id
    }

    pub fn insert_star(&mut self, position: Vec2) {
        self.stars.push(Star::new(position));
    }

    /// Remove an entity at once. No score or fragments, but a rock or turret still
    /// leaves the target count.
    pub fn erase(&mut self, id: EntityId) -> Option<Entity> {
        self.live.retain(|&other| other != id);
        self.pending.retain(|&other| other != id);
        self.ghosts.retain(|&(other, _)| other != id);
        let entity = self.entities.remove(id)?;
        if entity.counts_as_target() && !entity.is_destroyed() {
            self.state.target_destroyed(0);
        }
        Some(entity)
    }

    /// Empty the world. Lives, score and level are kept; targets go to zero.
    pub fn clear(&mut self) {
        self.entities.clear();
        self.live.clear();
        self.pending.clear();
        self.ghosts.clear();
        self.stars.clear();
        self.outbound.clear();
        self.player = None;
        self.remote = None;
        self.state.targets = 0;
    }

    /// Where a fresh local ship appears: the centre alone, left of it as server,
    /// right of it as client
    pub fn player_spawn_point(&self) -> Vec2 {
        use crate::settings::NetMode;

        let center = self.boundary.center();
        match self.settings.network.mode {
            NetMode::Alone => center,
            NetMode::Server => Vec2::new(center.x * 0.5, center.y),
            NetMode::Client => Vec2::new(center.x * 1.5, center.y),
        }
    }

    /// Queue a new local player ship at `position`
    pub fn spawn_player(&mut self, position: Vec2) -> EntityId {
        let control: Box<dyn Control> = Box::new(self.player_control.clone());
        let ship = Entity::ship(position, Some(control), &self.settings, self.clock.now());
        let id = self.insert(ship);
        if let Some(Behavior::Ship(ship)) = self.entities.get_mut(id).map(|e| &mut e.behavior) {
            if let Some(control) = ship.control.as_mut() {
                control.set_active_target(id);
            }
        }
        self.player = Some(id);
        id
    }

    /// Record every locally fired shell for `take_snapshot`
    pub fn enable_bullet_recording(&mut self) {
        self.record_bullets = true;
    }

    /// Route peer updates from `inbox` into this world
    pub fn set_inbox(&mut self, inbox: Receiver<NetworkUpdate>) {
        self.inbox = Some(inbox);
    }

    /// Apply every update the network thread has posted
    pub fn drain_network(&mut self) -> usize {
        let updates: Vec<NetworkUpdate> = match &self.inbox {
            Some(inbox) => inbox.try_iter().collect(),
            None => return 0,
        };
        let count = updates.len();
        for update in updates {
            self.apply_update(update);
        }
        count
    }

    /// Mirror the peer: move its ship (creating one if needed) and add its shells
    pub fn apply_update(&mut self, update: NetworkUpdate) {
        let now = self.clock.now();
        let pose = update.player;

        let alive = self
            .remote
            .and_then(|id| self.entities.get(id))
            .is_some_and(|e| !e.is_destroyed());
        if !alive {
            let ship = Entity::ship(pose.position, None, &self.settings, now).with_origin(Origin::Remote);
            self.remote = Some(self.insert(ship));
            log::info!("Remote player ship created at {}", pose.position);
        }

        if let Some(ship) = self.remote.and_then(|id| self.entities.get_mut(id)) {
            ship.set_pose(pose.position, pose.velocity, pose.angle);
        }

        for bullet in update.bullets {
            let shell = Entity::shell(bullet.position, bullet.velocity, &self.settings, now)
                .with_origin(Origin::Remote);
            self.insert(shell);
        }
    }

    /// The local player's pose and the local shots fired since the last snapshot
    pub fn take_snapshot(&mut self) -> Option<NetworkUpdate> {
        let ship = self.player().and_then(|id| self.entities.get(id))?;
        let player = PlayerPose {
            position: ship.position,
            velocity: ship.velocity,
            angle: ship.angle,
        };
        Some(NetworkUpdate {
            player,
            bullets: mem::take(&mut self.outbound),
        })
    }

    /// Start or stop the clock, keeping the phase in step
    pub fn toggle_pause(&mut self) {
        use super::state::GamePhase;

        self.clock.toggle();
        self.state.phase = match (self.state.phase, self.clock.running()) {
            (GamePhase::Paused, true) => GamePhase::Playing,
            (GamePhase::Playing, false) => GamePhase::Paused,
            (phase, _) => phase,
        };
        log::info!("Clock {}", if self.clock.running() { "running" } else { "paused" });
    }

    /// Integrate every live entity, reap the dead, promote arrivals, rebuild ghosts
    pub fn update(&mut self) {
        self.aim_turrets();

        let mut spawned = Vec::new();
        let mut fired = Vec::new();

        for &id in &self.live {
            let Some(entity) = self.entities.get_mut(id) else {
                continue;
            };
            if entity.is_destroyed() {
                continue;
            }

            let first = spawned.len();
            let local = entity.origin == Origin::Local;
            let mut ctx = SpawnCtx {
                now: self.clock.now(),
                settings: &self.settings,
                rng: &mut self.rng,
                spawned: &mut spawned,
            };
            entity.update(&mut ctx);

            if self.record_bullets && local {
                fired.extend(spawned[first..].iter().map(|shell| BulletState {
                    position: shell.position,
                    velocity: shell.velocity,
                }));
            }
        }

        self.outbound.extend(fired);
        for entity in spawned {
            self.insert(entity);
        }

        self.reap();
        self.promote();
        self.wrap();
    }

    /// Point every turret at the local player, from the pose of the body its AI governs
    fn aim_turrets(&mut self) {
        let target = self
            .player
            .and_then(|id| self.entities.get(id))
            .filter(|ship| !ship.is_destroyed())
            .map(|ship| ship.position);

        for &id in &self.live {
            let governed = match self.entities.get(id).map(|e| &e.behavior) {
                Some(Behavior::Turret(turret)) => turret.ai.active(),
                _ => continue,
            };
            let barrel = governed
                .and_then(|body| self.entities.get(body))
                .map(|body| (body.position, body.orientation));

            let Some(Behavior::Turret(turret)) = self.entities.get_mut(id).map(|e| &mut e.behavior) else {
                continue;
            };
            match (barrel, target) {
                (Some((position, orientation)), Some(target)) => {
                    turret.ai.decide(position, orientation, target)
                }
                _ => turret.ai.idle(),
            }
        }
    }

    /// Drop destroyed entities, including any that died before promotion
    fn reap(&mut self) {
        let entities = &mut self.entities;
        let mut keep = |id: &EntityId| match entities.get(*id) {
            Some(entity) if entity.is_destroyed() => {
                entities.remove(*id);
                false
            }
            Some(_) => true,
            None => false,
        };
        self.live.retain(&mut keep);
        self.pending.retain(&mut keep);
    }

    /// Newest arrivals go first
    fn promote(&mut self) {
        while let Some(id) = self.pending.pop() {
            self.live.push(id);
        }
    }

    fn wrap(&mut self) {
        self.ghosts.clear();
        for &id in &self.live {
            if let Some(entity) = self.entities.get_mut(id) {
                if let Some(ghost) = self.boundary.remap(entity) {
                    self.ghosts.push((id, ghost));
                }
            }
        }
    }

    /// Test every live pair, then every ghost against live entities and other ghosts
    pub fn collide(&mut self) {
        let n = self.live.len();
        for i in 0..n {
            for j in (i + 1)..n {
                let (a, b) = (self.live[i], self.live[j]);
                if self.test_pair(a, None, b, None) {
                    self.resolve(a, b);
                }
            }
        }

        for g in 0..self.ghosts.len() {
            let (ghost, at) = self.ghosts[g];

            for i in 0..self.live.len() {
                let other = self.live[i];
                if self.test_pair(ghost, Some(at), other, None) {
                    self.resolve(ghost, other);
                }
            }

            for h in (g + 1)..self.ghosts.len() {
                let (other, other_at) = self.ghosts[h];
                if self.test_pair(ghost, Some(at), other, Some(other_at)) {
                    self.resolve(ghost, other);
                }
            }
        }
    }

    /// Collide two distinct entities, optionally relocated for the test.
    ///
    /// A hit only counts when it lands inside the world. Entities destroyed earlier in
    /// the same pass still take part; `destroy` ignores them a second time.
    fn test_pair(&mut self, a: EntityId, a_at: Option<Vec2>, b: EntityId, b_at: Option<Vec2>) -> bool {
        let Some([ea, eb]) = self.entities.get_disjoint_mut([a, b]) else {
            return false;
        };

        let (home_a, home_b) = (ea.position, eb.position);
        if let Some(at) = a_at {
            ea.position = at;
        }
        if let Some(at) = b_at {
            eb.position = at;
        }

        let contact = collide(ea, eb);

        ea.position = home_a;
        eb.position = home_b;

        contact.hit && self.boundary.contains(contact.point)
    }

    fn resolve(&mut self, a: EntityId, b: EntityId) {
        self.destroy(a);
        self.destroy(b);
    }

    /// Destroy an entity with its kind's side effects
    pub fn destroy(&mut self, id: EntityId) -> Destruction {
        let mut spawned = Vec::new();
        let outcome = match self.entities.get_mut(id) {
            Some(entity) => {
                let mut ctx = SpawnCtx {
                    now: self.clock.now(),
                    settings: &self.settings,
                    rng: &mut self.rng,
                    spawned: &mut spawned,
                };
                entity.destroy(&mut ctx)
            }
            None => Destruction::Ignored,
        };

        match outcome {
            Destruction::Target { score } => self.state.target_destroyed(score),
            Destruction::Ship if self.player == Some(id) => self.player_destroyed(),
            Destruction::Ship => log::info!("Remote player ship destroyed"),
            Destruction::Shell | Destruction::Ignored => {}
        }

        for entity in spawned {
            self.insert(entity);
        }
        outcome
    }

    fn player_destroyed(&mut self) {
        let lives = self.state.player_destroyed();
        log::info!("Player destroyed, {} lives left", lives);
        if lives > 0 {
            let at = self.player_spawn_point();
            self.spawn_player(at);
        }
    }

    /// Stars, then live entities, then ghosts at their wrapped positions
    pub fn draw(&mut self, sink: &mut dyn RenderSink) {
        for star in &self.stars {
            star.draw(sink);
        }
        for &id in &self.live {
            if let Some(entity) = self.entities.get_mut(id) {
                entity.draw(sink);
            }
        }
        for &(id, at) in &self.ghosts {
            if let Some(entity) = self.entities.get_mut(id) {
                entity.draw_at(sink, at);
            }
        }
    }

    /// One full frame: network, simulation, collision, draw
    pub fn step(&mut self, sink: &mut dyn RenderSink) {
        self.drain_network();
        self.update();
        self.collide();
        self.draw(sink);
    }

    /// Uniform random point inside the world
    pub fn random_point(&mut self) -> Vec2 {
        let dimension = self.boundary.dimension();
        Vec2::new(
            self.rng.random::<f32>() * dimension.x,
            self.rng.random::<f32>() * dimension.y,
        )
    }
}
