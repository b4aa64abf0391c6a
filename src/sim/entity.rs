//! World entities
//!
//! Every entity shares one set of kinematic fields. What it collides as lives in
//! `Body`; how it moves and what happens when it dies lives in `Behavior`.

use std::f32::consts::{PI, TAU};

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use slotmap::new_key_type;

use super::clip::ClipPolygon;
use super::control::{Control, ShipAction, TurretAction, TurretAi};
use super::geometry::Collision;
use super::vector::Vec2Ext;
use crate::Settings;
use crate::orientation_for_angle;
use crate::renderer::{RenderSink, Rgb};

new_key_type! {
    /// Generation-checked handle into the world arena
    pub struct EntityId;
}

/// Who owns an entity's state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Simulated by this process
    Local,
    /// Mirrored from the network peer
    Remote,
}

/// Collision footprint
#[derive(Debug, Clone)]
pub enum Body {
    Polygon(ClipPolygon),
    Point { radius: f32 },
}

impl Body {
    pub fn radius_sqrd(&self) -> f32 {
        match self {
            Body::Polygon(clip) => clip.radius_sqrd(),
            Body::Point { radius } => radius * radius,
        }
    }

    pub fn is_point(&self) -> bool {
        matches!(self, Body::Point { .. })
    }
}

/// Periodic shell launcher
#[derive(Debug, Clone)]
pub struct Weapon {
    pub muzzle_velocity: f32,
    pub period: f32,
    next_fire: f64,
}

impl Weapon {
    pub fn new(muzzle_velocity: f32, period: f32) -> Self {
        Self {
            muzzle_velocity,
            period,
            next_fire: 0.0,
        }
    }

    /// Consume a shot if the cooldown has passed
    pub fn trigger(&mut self, now: f64) -> bool {
        if now > self.next_fire {
            self.next_fire = now + f64::from(self.period);
            true
        } else {
            false
        }
    }
}

#[derive(Debug)]
pub struct ShipState {
    /// `None` for ships mirrored from the network
    pub control: Option<Box<dyn Control>>,
    pub thrust: f32,
    pub reverse_factor: f32,
    pub turn_rate: f32,
    pub weapon: Weapon,
    /// Seconds of invulnerability left
    pub invulnerable: f32,
}

impl ShipState {
    pub fn is_invulnerable(&self) -> bool {
        self.invulnerable > 0.0
    }
}

#[derive(Debug, Clone)]
pub struct RockState {
    pub size: u32,
    /// radians per second
    pub spin: f32,
}

#[derive(Debug, Clone)]
pub struct TurretState {
    pub ai: TurretAi,
    pub turn_rate: f32,
    pub weapon: Weapon,
}

#[derive(Debug, Clone)]
pub struct ShellState {
    pub range: f32,
    pub travel: f32,
}

#[derive(Debug)]
pub enum Behavior {
    Ship(ShipState),
    Rock(RockState),
    Turret(TurretState),
    Shell(ShellState),
}

/// What a destroy request turned into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destruction {
    /// The entity shrugged it off (invulnerable ship, already dead)
    Ignored,
    Ship,
    /// A rock or turret; `score` is what it was worth
    Target { score: u64 },
    Shell,
}

/// What an update or destroy may need from the world
pub struct SpawnCtx<'a> {
    pub now: f64,
    pub settings: &'a Settings,
    pub rng: &'a mut Pcg32,
    /// New entities; the world queues them for the next promotion
    pub spawned: &'a mut Vec<Entity>,
}

#[derive(Debug)]
pub struct Entity {
    pub position: Vec2,
    /// units per second
    pub velocity: Vec2,
    /// Rotation rate applied at the next integration
    pub rotation: f32,
    pub orientation: Vec2,
    /// Cumulative facing angle
    pub angle: f32,
    pub origin: Origin,
    pub body: Body,
    pub behavior: Behavior,
    /// Clock reading at the last update
    pub last_update: f64,
    destroyed: bool,
}

impl Entity {
    pub fn new(position: Vec2, velocity: Vec2, body: Body, behavior: Behavior, now: f64) -> Self {
        Self {
            position,
            velocity,
            rotation: 0.0,
            orientation: Vec2::new(0.0, -1.0),
            angle: PI,
            origin: Origin::Local,
            body,
            behavior,
            last_update: now,
            destroyed: false,
        }
    }

    pub fn ship(
        position: Vec2,
        control: Option<Box<dyn Control>>,
        settings: &Settings,
        now: f64,
    ) -> Self {
        let behavior = Behavior::Ship(ShipState {
            control,
            thrust: settings.ship.thrust,
            reverse_factor: settings.ship.reverse_factor,
            turn_rate: settings.ship.turn_rate,
            weapon: Weapon::new(
                settings.weapons.muzzle_velocity,
                settings.weapons.ship_fire_period,
            ),
            invulnerable: settings.ship.invulnerable_secs,
        });
        let body = Body::Polygon(ClipPolygon::ship(settings.ship.size));
        Self::new(position, Vec2::ZERO, body, behavior, now)
    }

    pub fn rock(
        position: Vec2,
        velocity: Vec2,
        size: u32,
        settings: &Settings,
        rng: &mut Pcg32,
        now: f64,
    ) -> Self {
        let clip = ClipPolygon::rock(size as f32 * 10.0, size as usize * 2 + 3, rng);
        let max_spin = settings.rocks.max_spin;
        let spin = if max_spin > 0.0 {
            rng.random_range(-max_spin..max_spin)
        } else {
            0.0
        };

        let mut rock = Self::new(
            position,
            velocity,
            Body::Polygon(clip),
            Behavior::Rock(RockState { size, spin }),
            now,
        );
        rock.rotation = spin;
        rock
    }

    pub fn turret(position: Vec2, settings: &Settings, now: f64) -> Self {
        let behavior = Behavior::Turret(TurretState {
            ai: TurretAi::new(settings.turrets.aim_tolerance),
            turn_rate: settings.turrets.turn_rate,
            weapon: Weapon::new(
                settings.weapons.muzzle_velocity,
                settings.weapons.turret_fire_period,
            ),
        });
        Self::new(
            position,
            Vec2::ZERO,
            Body::Polygon(ClipPolygon::turret()),
            behavior,
            now,
        )
    }

    pub fn shell(position: Vec2, velocity: Vec2, settings: &Settings, now: f64) -> Self {
        let behavior = Behavior::Shell(ShellState {
            range: settings.shells.range,
            travel: 0.0,
        });
        let body = Body::Point {
            radius: settings.shells.radius,
        };
        Self::new(position, velocity, body, behavior, now)
    }

    pub fn with_origin(mut self, origin: Origin) -> Self {
        self.origin = origin;
        self
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn radius_sqrd(&self) -> f32 {
        self.body.radius_sqrd()
    }

    pub fn is_ship(&self) -> bool {
        matches!(self.behavior, Behavior::Ship(_))
    }

    pub fn is_turret(&self) -> bool {
        matches!(self.behavior, Behavior::Turret(_))
    }

    /// Rocks and turrets must all die to clear a level
    pub fn counts_as_target(&self) -> bool {
        matches!(self.behavior, Behavior::Rock(_) | Behavior::Turret(_))
    }

    pub fn rock_size(&self) -> Option<u32> {
        match &self.behavior {
            Behavior::Rock(rock) => Some(rock.size),
            _ => None,
        }
    }

    pub fn is_invulnerable(&self) -> bool {
        match &self.behavior {
            Behavior::Ship(ship) => ship.is_invulnerable(),
            _ => false,
        }
    }

    /// Muzzle point just outside the bounding circle along the facing
    pub fn front(&self) -> Vec2 {
        self.position + self.orientation * (self.radius_sqrd() * 1.1).sqrt()
    }

    /// Turn orientation and facing angle together
    pub fn rotate(&mut self, angle: f32) {
        self.orientation = self.orientation.rotated(angle);
        self.angle += angle;
        if self.angle > TAU {
            self.angle -= TAU;
        }
    }

    pub fn translate(&mut self, offset: Vec2) {
        self.position += offset;
    }

    /// Overwrite the pose wholesale (network mirror)
    pub fn set_pose(&mut self, position: Vec2, velocity: Vec2, angle: f32) {
        self.position = position;
        self.velocity = velocity;
        self.angle = angle;
        self.orientation = orientation_for_angle(angle);
    }

    /// Advance by the time since the last update
    pub fn update(&mut self, ctx: &mut SpawnCtx<'_>) {
        let dt = (ctx.now - self.last_update) as f32;
        let mut fire = None;

        match &mut self.behavior {
            Behavior::Ship(ship) => {
                if let Some(control) = &ship.control {
                    if control.state(ShipAction::Forward as usize) {
                        self.velocity += self.orientation * ship.thrust;
                    }
                    if control.state(ShipAction::Backward as usize) {
                        self.velocity -= self.orientation * (ship.thrust * ship.reverse_factor);
                    }
                    if control.state(ShipAction::Left as usize) {
                        self.rotation = -ship.turn_rate;
                    }
                    if control.state(ShipAction::Right as usize) {
                        self.rotation = ship.turn_rate;
                    }
                    if control.state(ShipAction::Fire as usize) && ship.weapon.trigger(ctx.now) {
                        fire = Some(ship.weapon.muzzle_velocity);
                    }
                }
                if ship.invulnerable > 0.0 {
                    ship.invulnerable -= dt;
                }
            }
            Behavior::Turret(turret) => {
                if turret.ai.state(TurretAction::Left as usize) {
                    self.rotation = -turret.turn_rate;
                }
                if turret.ai.state(TurretAction::Right as usize) {
                    self.rotation = turret.turn_rate;
                }
                if turret.ai.state(TurretAction::Fire as usize) && turret.weapon.trigger(ctx.now) {
                    fire = Some(turret.weapon.muzzle_velocity);
                }
            }
            Behavior::Rock(rock) => {
                self.rotation = rock.spin;
            }
            Behavior::Shell(shell) => {
                let displacement = self.velocity * dt;
                shell.travel += displacement.length();
                if shell.travel > shell.range {
                    self.destroyed = true;
                }
            }
        }

        if let Some(muzzle_velocity) = fire {
            let shell = Entity::shell(
                self.front(),
                self.velocity + self.orientation * muzzle_velocity,
                ctx.settings,
                ctx.now,
            )
            .with_origin(self.origin);
            ctx.spawned.push(shell);
        }

        self.rotate(self.rotation * dt);
        self.translate(self.velocity * dt);
        self.rotation = 0.0;
        self.last_update = ctx.now;
    }

    /// Apply a destroy request with this kind's side effects.
    ///
    /// Fragments land in `ctx.spawned`; score and lives are left to the caller.
    pub fn destroy(&mut self, ctx: &mut SpawnCtx<'_>) -> Destruction {
        if self.destroyed {
            return Destruction::Ignored;
        }

        match &self.behavior {
            Behavior::Ship(ship) => {
                if ship.is_invulnerable() {
                    return Destruction::Ignored;
                }
                self.destroyed = true;
                Destruction::Ship
            }
            Behavior::Rock(rock) => {
                let size = rock.size;
                self.destroyed = true;
                if size > ctx.settings.rocks.fragment_threshold {
                    let offset = ctx.settings.rocks.fragment_offset;
                    self.fragment(size / 4, offset, ctx);
                }
                Destruction::Target { score: size as u64 }
            }
            Behavior::Turret(_) => {
                self.destroyed = true;
                let offset = ctx.settings.turrets.fragment_offset;
                self.fragment(1, offset, ctx);
                Destruction::Target {
                    score: ctx.settings.turrets.score,
                }
            }
            Behavior::Shell(_) => {
                self.destroyed = true;
                Destruction::Shell
            }
        }
    }

    /// Four rocks thrown out at right angles from a random start direction
    fn fragment(&self, size: u32, offset: f32, ctx: &mut SpawnCtx<'_>) {
        let speed = ctx.settings.rocks.fragment_speed;
        let mut direction = Vec2::new(0.0, 1.0).rotated(ctx.rng.random::<f32>() * PI);

        for _ in 0..4 {
            let rock = Entity::rock(
                self.position + direction * offset,
                direction * speed + self.velocity,
                size,
                ctx.settings,
                ctx.rng,
                ctx.now,
            )
            .with_origin(self.origin);
            ctx.spawned.push(rock);
            direction = direction.rotated(PI / 2.0);
        }
        log::debug!("Fragmented into 4 rocks of size {} at {}", size, self.position);
    }

    /// Ships flash while invulnerable
    fn visible(&self) -> bool {
        match &self.behavior {
            Behavior::Ship(ship) if ship.invulnerable > 0.0 => {
                ((ship.invulnerable * 10.0) as u64) % 2 == 0
            }
            _ => true,
        }
    }

    /// Draw at the entity's own position
    pub fn draw(&mut self, sink: &mut dyn RenderSink) {
        let position = self.position;
        self.draw_at(sink, position);
    }

    /// Draw at `position`, used for wrapped copies
    pub fn draw_at(&mut self, sink: &mut dyn RenderSink, position: Vec2) {
        if !self.visible() {
            return;
        }

        let color = match self.behavior {
            Behavior::Shell(_) => Rgb::SHELL,
            _ => Rgb::WHITE,
        };

        match &mut self.body {
            Body::Polygon(clip) => {
                clip.transform(self.angle, position);
                sink.draw_polygon(clip.vertices());
                clip.reset();
            }
            Body::Point { radius } => sink.draw_point(position, *radius, color),
        }
    }
}

/// Test two entities for contact.
///
/// Bounding circles are compared first; only overlapping pairs pay for the
/// polygon test. Two point bodies never collide.
pub fn collide(a: &mut Entity, b: &mut Entity) -> Collision {
    let reach = a.radius_sqrd() + b.radius_sqrd();
    if reach < (a.position - b.position).length_squared() {
        return Collision::miss();
    }

    match (&mut a.body, &mut b.body) {
        (Body::Point { .. }, Body::Point { .. }) => Collision::miss(),
        (Body::Polygon(clip_a), Body::Polygon(clip_b)) => {
            clip_a.transform(a.angle, a.position);
            clip_b.transform(b.angle, b.position);
            let result = clip_a.collide(clip_b);
            clip_a.reset();
            clip_b.reset();
            result
        }
        (Body::Polygon(clip), Body::Point { .. }) => {
            clip.transform(a.angle, a.position);
            let result = clip.collide_point(b.position);
            clip.reset();
            result
        }
        (Body::Point { .. }, Body::Polygon(clip)) => {
            clip.transform(b.angle, b.position);
            let result = clip.collide_point(a.position);
            clip.reset();
            result
        }
    }
}

/// Background decoration; never collides
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Star {
    pub position: Vec2,
    pub size: f32,
}

impl Star {
    pub fn new(position: Vec2) -> Self {
        Self {
            position,
            size: 1.0,
        }
    }

    pub fn draw(&self, sink: &mut dyn RenderSink) {
        sink.draw_point(self.position, self.size, Rgb::WHITE);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::FrameStats;
    use crate::sim::control::ControlHandle;
    use rand::SeedableRng;

    fn round(position: Vec2, velocity: Vec2, radius: f32) -> Entity {
        Entity::new(
            position,
            velocity,
            Body::Polygon(ClipPolygon::regular(radius, 16)),
            Behavior::Shell(ShellState {
                range: f32::MAX,
                travel: 0.0,
            }),
            0.0,
        )
    }

    #[test]
    fn test_initial_facing() {
        let e = round(Vec2::ZERO, Vec2::ZERO, 5.0);
        assert_eq!(e.orientation, Vec2::new(0.0, -1.0));
        assert_eq!(e.angle, PI);
        assert!(!e.is_destroyed());
    }

    #[test]
    fn test_rotate_wraps_angle_past_two_pi() {
        let mut e = round(Vec2::ZERO, Vec2::ZERO, 5.0);
        e.rotate(PI + 0.5);
        assert!((e.angle - 0.5).abs() < 1e-5);
        let expected = orientation_for_angle(e.angle);
        assert!((e.orientation - expected).length() < 1e-5);
    }

    #[test]
    fn test_separated_round_bodies_miss() {
        let mut a = round(Vec2::new(0.0, 0.0), Vec2::ZERO, 5.0);
        let mut b = round(Vec2::new(20.0, 0.0), Vec2::ZERO, 5.0);
        assert!(!collide(&mut a, &mut b).hit);
    }

    #[test]
    fn test_overlapping_round_bodies_hit_and_reset() {
        let mut a = round(Vec2::new(0.0, 0.0), Vec2::ZERO, 5.0);
        let mut b = round(Vec2::new(6.0, 1.0), Vec2::ZERO, 5.0);
        assert!(collide(&mut a, &mut b).hit);
        if let Body::Polygon(clip) = &a.body {
            assert_eq!(clip.vertices(), clip.rest_pose());
        }
    }

    #[test]
    fn test_coincident_round_bodies_always_hit() {
        for &(x, y) in &[(0.0, 0.0), (256.0, 256.0), (100.0, 40.0)] {
            let at = Vec2::new(x, y);
            let mut a = round(at, Vec2::ZERO, 5.0);
            let mut b = round(at, Vec2::ZERO, 5.0);
            let contact = collide(&mut a, &mut b);
            assert!(contact.hit);
            assert!((contact.point - at).length() <= 5.0 + 1e-3);
        }
    }

    #[test]
    fn test_point_bodies_never_collide() {
        let settings = Settings::default();
        let mut a = Entity::shell(Vec2::ZERO, Vec2::ZERO, &settings, 0.0);
        let mut b = Entity::shell(Vec2::ZERO, Vec2::ZERO, &settings, 0.0);
        assert!(!collide(&mut a, &mut b).hit);
    }

    #[test]
    fn test_point_inside_polygon_hits_either_order() {
        let settings = Settings::default();
        let mut shell = Entity::shell(Vec2::new(101.0, 99.0), Vec2::ZERO, &settings, 0.0);
        let mut body = round(Vec2::new(100.0, 100.0), Vec2::ZERO, 10.0);
        let c = collide(&mut shell, &mut body);
        assert!(c.hit);
        assert_eq!(c.point, Vec2::new(101.0, 99.0));
        assert!(collide(&mut body, &mut shell).hit);
    }

    #[test]
    fn test_shell_expires_after_range() {
        let settings = Settings::default();
        let mut rng = Pcg32::seed_from_u64(1);
        let mut spawned = Vec::new();
        let mut shell = Entity::shell(Vec2::ZERO, Vec2::new(100.0, 0.0), &settings, 0.0);

        let mut ctx = SpawnCtx {
            now: 4.0,
            settings: &settings,
            rng: &mut rng,
            spawned: &mut spawned,
        };
        shell.update(&mut ctx);
        assert!(!shell.is_destroyed());
        assert!((shell.position.x - 400.0).abs() < 1e-3);

        ctx.now = 5.0;
        shell.update(&mut ctx);
        assert!(shell.is_destroyed());
    }

    #[test]
    fn test_ship_thrust_turn_and_fire() {
        let settings = Settings::default();
        let mut rng = Pcg32::seed_from_u64(1);
        let mut spawned = Vec::new();
        let input = ControlHandle::new();
        let mut ship = Entity::ship(
            Vec2::new(100.0, 100.0),
            Some(Box::new(input.clone())),
            &settings,
            0.0,
        );

        input.press(ShipAction::Forward);
        input.press(ShipAction::Fire);
        let mut ctx = SpawnCtx {
            now: 0.5,
            settings: &settings,
            rng: &mut rng,
            spawned: &mut spawned,
        };
        ship.update(&mut ctx);

        // One thrust impulse along (0, -1)
        assert!((ship.velocity - Vec2::new(0.0, -0.2)).length() < 1e-6);
        assert_eq!(ship.rotation, 0.0);
        assert_eq!(spawned.len(), 1);
        let shell = &spawned[0];
        assert!((shell.velocity.y - (-150.2)).abs() < 1e-3);
        assert!(shell.position.y < 100.0);

        // Cooldown: no second shell until the period passes
        spawned.clear();
        let mut ctx = SpawnCtx {
            now: 0.7,
            settings: &settings,
            rng: &mut rng,
            spawned: &mut spawned,
        };
        ship.update(&mut ctx);
        assert!(spawned.is_empty());

        input.clear();
        input.press(ShipAction::Right);
        let mut ctx = SpawnCtx {
            now: 1.7,
            settings: &settings,
            rng: &mut rng,
            spawned: &mut spawned,
        };
        ship.update(&mut ctx);
        assert!((ship.angle - (PI + 3.6)).abs() < 1e-4 || (ship.angle - (PI + 3.6 - TAU)).abs() < 1e-4);
        assert_eq!(ship.rotation, 0.0);
    }

    #[test]
    fn test_invulnerable_ship_ignores_destroy() {
        let settings = Settings::default();
        let mut rng = Pcg32::seed_from_u64(1);
        let mut spawned = Vec::new();
        let mut ship = Entity::ship(Vec2::ZERO, None, &settings, 0.0);
        let mut ctx = SpawnCtx {
            now: 0.5,
            settings: &settings,
            rng: &mut rng,
            spawned: &mut spawned,
        };

        ship.update(&mut ctx);
        assert_eq!(ship.destroy(&mut ctx), Destruction::Ignored);
        assert!(!ship.is_destroyed());

        ctx.now = 1.25;
        ship.update(&mut ctx);
        assert_eq!(ship.destroy(&mut ctx), Destruction::Ship);
        assert!(ship.is_destroyed());
        assert_eq!(ship.destroy(&mut ctx), Destruction::Ignored);
    }

    #[test]
    fn test_large_rock_splits_into_four() {
        let settings = Settings::default();
        let mut rng = Pcg32::seed_from_u64(9);
        let mut spawned = Vec::new();
        let parent_velocity = Vec2::new(3.0, -2.0);
        let mut rock = Entity::rock(
            Vec2::new(200.0, 200.0),
            parent_velocity,
            16,
            &settings,
            &mut rng,
            0.0,
        );

        let mut ctx = SpawnCtx {
            now: 0.0,
            settings: &settings,
            rng: &mut rng,
            spawned: &mut spawned,
        };
        assert_eq!(rock.destroy(&mut ctx), Destruction::Target { score: 16 });
        assert_eq!(spawned.len(), 4);

        let offsets: Vec<Vec2> = spawned
            .iter()
            .map(|r| r.position - Vec2::new(200.0, 200.0))
            .collect();
        for (r, offset) in spawned.iter().zip(&offsets) {
            assert_eq!(r.rock_size(), Some(4));
            assert!((offset.length() - 30.0).abs() < 1e-3);
            let d = *offset / 30.0;
            assert!((r.velocity - (d * 10.0 + parent_velocity)).length() < 1e-3);
        }
        for pair in offsets.windows(2) {
            // Consecutive offspring are a quarter turn apart
            assert!(pair[0].dot(pair[1]).abs() < 1e-2);
            assert!(pair[0].cross(pair[1]) > 0.0);
        }
    }

    #[test]
    fn test_small_rock_does_not_split() {
        let settings = Settings::default();
        let mut rng = Pcg32::seed_from_u64(9);
        let mut spawned = Vec::new();
        let mut rock = Entity::rock(Vec2::ZERO, Vec2::ZERO, 3, &settings, &mut rng, 0.0);
        let mut ctx = SpawnCtx {
            now: 0.0,
            settings: &settings,
            rng: &mut rng,
            spawned: &mut spawned,
        };
        assert_eq!(rock.destroy(&mut ctx), Destruction::Target { score: 3 });
        assert!(spawned.is_empty());
    }

    #[test]
    fn test_turret_leaves_four_pebbles() {
        let settings = Settings::default();
        let mut rng = Pcg32::seed_from_u64(2);
        let mut spawned = Vec::new();
        let mut turret = Entity::turret(Vec2::new(50.0, 50.0), &settings, 0.0);
        let mut ctx = SpawnCtx {
            now: 0.0,
            settings: &settings,
            rng: &mut rng,
            spawned: &mut spawned,
        };
        assert_eq!(turret.destroy(&mut ctx), Destruction::Target { score: 5 });
        assert_eq!(spawned.len(), 4);
        for r in &spawned {
            assert_eq!(r.rock_size(), Some(1));
            assert!(((r.position - Vec2::new(50.0, 50.0)).length() - 20.0).abs() < 1e-3);
        }
    }

    #[test]
    fn test_rock_keeps_spinning() {
        let settings = Settings::default();
        let mut rng = Pcg32::seed_from_u64(4);
        let mut spawned = Vec::new();
        let mut rock = Entity::rock(Vec2::ZERO, Vec2::new(1.0, 0.0), 2, &settings, &mut rng, 0.0);
        let spin = match &rock.behavior {
            Behavior::Rock(r) => r.spin,
            _ => unreachable!(),
        };
        assert!((-0.5..0.5).contains(&spin));

        let mut ctx = SpawnCtx {
            now: 1.0,
            settings: &settings,
            rng: &mut rng,
            spawned: &mut spawned,
        };
        rock.update(&mut ctx);
        ctx.now = 2.0;
        rock.update(&mut ctx);
        assert!((rock.angle - (PI + 2.0 * spin)).abs() < 1e-4);
        assert!((rock.position.x - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_invulnerable_ship_flickers() {
        let settings = Settings::default();
        let mut ship = Entity::ship(Vec2::new(10.0, 10.0), None, &settings, 0.0);
        let mut stats = FrameStats::new();

        // 1.0 s left: floor(10) is even, drawn
        ship.draw(&mut stats);
        assert_eq!(stats.polygons, 1);

        if let Behavior::Ship(s) = &mut ship.behavior {
            s.invulnerable = 0.15;
        }
        ship.draw(&mut stats);
        assert_eq!(stats.polygons, 1);

        if let Behavior::Ship(s) = &mut ship.behavior {
            s.invulnerable = 0.0;
        }
        ship.draw(&mut stats);
        assert_eq!(stats.polygons, 2);
    }

    #[test]
    fn test_draw_at_uses_given_position() {
        let mut e = round(Vec2::new(10.0, 10.0), Vec2::ZERO, 5.0);
        let mut stats = FrameStats::new();
        e.draw_at(&mut stats, Vec2::new(500.0, 500.0));
        let outline = &stats.outlines[0];
        let mean: Vec2 = outline.iter().copied().sum::<Vec2>() / outline.len() as f32;
        assert!((mean - Vec2::new(500.0, 500.0)).length() < 1e-3);
        if let Body::Polygon(clip) = &e.body {
            assert_eq!(clip.center(), Vec2::ZERO);
        }
    }
}
