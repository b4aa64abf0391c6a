//! Starship Commander - toroidal asteroid-field simulation core
//!
//! Core modules:
//! - `sim`: World simulation (entities, geometry, collisions, level flow)
//! - `net`: Peer datagrams and the receive thread feeding the simulation
//! - `renderer`: Draw contract implemented by whatever owns the display
//! - `settings`: Data-driven tuning loaded from JSON
//! - `error`: Crate error type

pub mod error;
pub mod net;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use error::{Error, Result};
pub use settings::Settings;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// World dimensions in world units
    pub const WORLD_WIDTH: f32 = 512.0;
    pub const WORLD_HEIGHT: f32 = 512.0;

    /// Length of the probe ray used by the point-in-polygon parity test
    pub const POINT_RAY_LENGTH: f32 = 500.0;

    /// Player ship defaults
    pub const SHIP_SIZE: f32 = 20.0;
    pub const SHIP_THRUST: f32 = 0.2;
    /// Reverse thrust as a fraction of forward thrust
    pub const SHIP_REVERSE_FACTOR: f32 = 0.1;
    /// radians per second
    pub const SHIP_TURN_RATE: f32 = 3.6;
    /// Post-spawn invulnerability (seconds)
    pub const SHIP_INVULNERABLE_SECS: f32 = 1.0;
    pub const STARTING_LIVES: u32 = 3;

    /// Weapon defaults
    pub const MUZZLE_VELOCITY: f32 = 150.0;
    pub const SHIP_FIRE_PERIOD: f32 = 0.5;
    pub const TURRET_FIRE_PERIOD: f32 = 2.0;

    /// Shell defaults
    pub const SHELL_RADIUS: f32 = 2.0;
    pub const SHELL_RANGE: f32 = 450.0;

    /// Rock defaults
    pub const ROCK_START_SIZE: u32 = 4;
    /// Rocks larger than this split into four when destroyed
    pub const ROCK_FRAGMENT_THRESHOLD: u32 = 3;
    pub const ROCK_FRAGMENT_OFFSET: f32 = 30.0;
    pub const FRAGMENT_SPEED: f32 = 10.0;
    pub const ROCK_DRIFT_SPEED: f32 = 10.0;
    /// Spin is drawn from [-MAX, MAX)
    pub const ROCK_MAX_SPIN: f32 = 0.5;

    /// Turret defaults
    pub const TURRET_TURN_RATE: f32 = 0.5;
    pub const TURRET_AIM_TOLERANCE: f32 = 0.01;
    pub const TURRET_FRAGMENT_OFFSET: f32 = 20.0;
    pub const TURRET_SCORE: u64 = 5;

    /// Level defaults
    pub const STAR_COUNT: usize = 50;
    /// Spawn ring radius as a fraction of the half-dimensions
    pub const SPAWN_RING_FRACTION: f32 = 0.6;

    /// Network defaults
    pub const NET_PORT: u16 = 31337;
    pub const NET_SEND_INTERVAL: f32 = 0.1;
    pub const NET_RECV_RETRIES: u32 = 16;
    pub const NET_BACKOFF_MS: u64 = 100;
    pub const NET_MAX_DATAGRAM: usize = 16384;
}

/// Convert polar (angle, r) to cartesian, with angle measured from +y toward +x
#[inline]
pub fn polar_to_cartesian(angle: f32, r: f32) -> Vec2 {
    Vec2::new(r * angle.sin(), r * angle.cos())
}

/// Unit facing vector for a cumulative facing angle.
///
/// Entities start facing `(0, -1)` with an angle of π; rotating both together keeps
/// this relation, so a pose received over the wire can be rebuilt from the angle alone.
#[inline]
pub fn orientation_for_angle(angle: f32) -> Vec2 {
    Vec2::new(-angle.sin(), angle.cos())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_polar_measures_from_y_axis() {
        let p = polar_to_cartesian(0.0, 10.0);
        assert!(p.x.abs() < 1e-5);
        assert!((p.y - 10.0).abs() < 1e-5);

        let q = polar_to_cartesian(PI / 2.0, 10.0);
        assert!((q.x - 10.0).abs() < 1e-5);
        assert!(q.y.abs() < 1e-4);
    }

    #[test]
    fn test_initial_orientation_matches_initial_angle() {
        let o = orientation_for_angle(PI);
        assert!(o.x.abs() < 1e-5);
        assert!((o.y + 1.0).abs() < 1e-5);
    }
}
