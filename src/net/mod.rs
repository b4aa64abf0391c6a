//! Peer-to-peer state exchange
//!
//! Each side sends its own ship pose plus the shells it fired since the last send.
//! Datagrams are JSON; a lost datagram loses its shells.

pub mod link;

pub use link::NetLink;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A ship pose as seen by the peer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerPose {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Cumulative facing angle; orientation is derived from it
    pub angle: f32,
}

/// A freshly fired shell
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BulletState {
    pub position: Vec2,
    pub velocity: Vec2,
}

/// One datagram
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkUpdate {
    pub player: PlayerPose,
    #[serde(default)]
    pub bullets: Vec<BulletState>,
}

impl NetworkUpdate {
    pub fn encode(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }
}
