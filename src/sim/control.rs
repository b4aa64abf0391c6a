//! Control providers: who presses the buttons on a ship or turret
//!
//! Ships read a `ControlHandle` that the input layer (or a test) flips from any thread.
//! Turrets own a `TurretAi` that the world re-aims every tick.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use glam::Vec2;

use super::entity::EntityId;
use super::geometry::{Ray, separation};

/// Source of per-action on/off state
pub trait Control: Send + Sync + fmt::Debug {
    /// Whether `action` is active; unknown actions read as released
    fn state(&self, action: usize) -> bool;

    /// Tell the controller which entity it is driving
    fn set_active_target(&mut self, target: EntityId);
}

/// Ship actions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShipAction {
    Forward = 0,
    Backward = 1,
    Left = 2,
    Right = 3,
    Fire = 4,
}

/// Turret actions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurretAction {
    Left = 0,
    Right = 1,
    Fire = 2,
}

/// Shared button bits. Clones see the same buttons, so one handle keeps driving the
/// player across respawns.
#[derive(Debug, Clone, Default)]
pub struct ControlHandle {
    bits: Arc<AtomicU32>,
}

impl ControlHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, action: ShipAction, pressed: bool) {
        let mask = 1u32 << action as u32;
        if pressed {
            self.bits.fetch_or(mask, Ordering::Relaxed);
        } else {
            self.bits.fetch_and(!mask, Ordering::Relaxed);
        }
    }

    pub fn press(&self, action: ShipAction) {
        self.set(action, true);
    }

    pub fn release(&self, action: ShipAction) {
        self.set(action, false);
    }

    /// Release everything
    pub fn clear(&self) {
        self.bits.store(0, Ordering::Relaxed);
    }
}

impl Control for ControlHandle {
    fn state(&self, action: usize) -> bool {
        if action >= u32::BITS as usize {
            return false;
        }
        self.bits.load(Ordering::Relaxed) & (1 << action) != 0
    }

    /// Buttons are not tied to a body
    fn set_active_target(&mut self, _target: EntityId) {}
}

/// Aims a turret at a target by sweeping its barrel toward the target's side
#[derive(Debug, Clone)]
pub struct TurretAi {
    state: [bool; 3],
    tolerance: f32,
    active: Option<EntityId>,
}

impl TurretAi {
    pub fn new(tolerance: f32) -> Self {
        Self {
            state: [false; 3],
            tolerance,
            active: None,
        }
    }

    /// The turret this AI aims
    pub fn active(&self) -> Option<EntityId> {
        self.active
    }

    /// Pick this tick's action from the turret pose and the target position.
    ///
    /// The barrel line is the ray from `position` along `orientation`; the sign of the
    /// target's perpendicular offset from it picks the turn direction.
    pub fn decide(&mut self, position: Vec2, orientation: Vec2, target: Vec2) {
        let barrel = Ray::new(position, position + orientation);
        let offset = separation(&barrel, target);

        self.state = [false; 3];
        let action = if offset.abs() < self.tolerance {
            TurretAction::Fire
        } else if offset < 0.0 {
            TurretAction::Left
        } else {
            TurretAction::Right
        };
        self.state[action as usize] = true;
    }

    /// Nothing to aim at
    pub fn idle(&mut self) {
        self.state = [false; 3];
    }
}

impl Control for TurretAi {
    fn state(&self, action: usize) -> bool {
        self.state.get(action).copied().unwrap_or(false)
    }

    fn set_active_target(&mut self, target: EntityId) {
        self.active = Some(target);
    }
}
