//! World simulation module
//!
//! All gameplay logic lives here:
//! - Geometry: vectors, segments, clip polygons
//! - Entities and their per-kind behaviour
//! - The toroidal boundary and the world tick (update, wrap, collide, draw)
//! - Level flow and the scoreboard
//!
//! Time comes from a `Clock`; nothing in here touches sockets or a display.

pub mod boundary;
pub mod clip;
pub mod clock;
pub mod control;
pub mod entity;
pub mod geometry;
pub mod level;
pub mod state;
pub mod vector;
pub mod world;

pub use boundary::WorldBoundary;
pub use clip::ClipPolygon;
pub use clock::{Clock, ManualTicks, SystemTicks, TimeSource};
pub use control::{Control, ControlHandle, ShipAction, TurretAction, TurretAi};
pub use entity::{Behavior, Body, Destruction, Entity, EntityId, Origin, Star, collide};
pub use geometry::{Collision, Ray, ray_collide, separation};
pub use level::{check_state, new_game, next_level};
pub use state::{GamePhase, GameState};
pub use vector::Vec2Ext;
pub use world::World;
