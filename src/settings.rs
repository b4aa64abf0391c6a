//! Game settings and tuning
//!
//! Loaded from a JSON file at startup. Every field has a default, so a file only needs
//! the values it wants to override.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{Error, Result};

/// How this process takes part in a networked game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NetMode {
    /// Single player, no sockets
    #[default]
    Alone,
    /// Listen for a peer on the configured port
    Server,
    /// Connect to the peer named by `network.host`
    Client,
}

impl NetMode {
    pub fn is_networked(&self) -> bool {
        !matches!(self, NetMode::Alone)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldSettings {
    pub width: f32,
    pub height: f32,
}

impl Default for WorldSettings {
    fn default() -> Self {
        Self {
            width: WORLD_WIDTH,
            height: WORLD_HEIGHT,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShipSettings {
    pub size: f32,
    /// Velocity added per update while thrusting
    pub thrust: f32,
    pub reverse_factor: f32,
    /// radians per second
    pub turn_rate: f32,
    pub invulnerable_secs: f32,
    pub lives: u32,
}

impl Default for ShipSettings {
    fn default() -> Self {
        Self {
            size: SHIP_SIZE,
            thrust: SHIP_THRUST,
            reverse_factor: SHIP_REVERSE_FACTOR,
            turn_rate: SHIP_TURN_RATE,
            invulnerable_secs: SHIP_INVULNERABLE_SECS,
            lives: STARTING_LIVES,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponSettings {
    pub muzzle_velocity: f32,
    pub ship_fire_period: f32,
    pub turret_fire_period: f32,
}

impl Default for WeaponSettings {
    fn default() -> Self {
        Self {
            muzzle_velocity: MUZZLE_VELOCITY,
            ship_fire_period: SHIP_FIRE_PERIOD,
            turret_fire_period: TURRET_FIRE_PERIOD,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellSettings {
    pub radius: f32,
    pub range: f32,
}

impl Default for ShellSettings {
    fn default() -> Self {
        Self {
            radius: SHELL_RADIUS,
            range: SHELL_RANGE,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RockSettings {
    pub start_size: u32,
    pub fragment_threshold: u32,
    pub fragment_offset: f32,
    pub fragment_speed: f32,
    pub drift_speed: f32,
    pub max_spin: f32,
}

impl Default for RockSettings {
    fn default() -> Self {
        Self {
            start_size: ROCK_START_SIZE,
            fragment_threshold: ROCK_FRAGMENT_THRESHOLD,
            fragment_offset: ROCK_FRAGMENT_OFFSET,
            fragment_speed: FRAGMENT_SPEED,
            drift_speed: ROCK_DRIFT_SPEED,
            max_spin: ROCK_MAX_SPIN,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TurretSettings {
    pub turn_rate: f32,
    /// Perpendicular miss distance below which the turret fires
    pub aim_tolerance: f32,
    pub fragment_offset: f32,
    pub score: u64,
}

impl Default for TurretSettings {
    fn default() -> Self {
        Self {
            turn_rate: TURRET_TURN_RATE,
            aim_tolerance: TURRET_AIM_TOLERANCE,
            fragment_offset: TURRET_FRAGMENT_OFFSET,
            score: TURRET_SCORE,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelSettings {
    pub star_count: usize,
    pub spawn_ring_fraction: f32,
    /// Frames per second for the headless loop
    pub frame_rate: u32,
    /// Stop after this many frames (0 = run until killed)
    pub max_frames: u64,
}

impl Default for LevelSettings {
    fn default() -> Self {
        Self {
            star_count: STAR_COUNT,
            spawn_ring_fraction: SPAWN_RING_FRACTION,
            frame_rate: 60,
            max_frames: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkSettings {
    pub mode: NetMode,
    /// Server address, used in client mode
    pub host: String,
    pub port: u16,
    /// Seconds between outbound snapshots
    pub send_interval: f32,
}

impl Default for NetworkSettings {
    fn default() -> Self {
        Self {
            mode: NetMode::Alone,
            host: String::from("127.0.0.1"),
            port: NET_PORT,
            send_interval: NET_SEND_INTERVAL,
        }
    }
}

/// All tunables for a run
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub world: WorldSettings,
    pub ship: ShipSettings,
    pub weapons: WeaponSettings,
    pub shells: ShellSettings,
    pub rocks: RockSettings,
    pub turrets: TurretSettings,
    pub level: LevelSettings,
    pub network: NetworkSettings,
    /// RNG seed; a random one is drawn when absent
    pub seed: Option<u64>,
}

impl Settings {
    /// Parse settings from a JSON string (no validation)
    pub fn from_json(json: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)?;
        let settings = Self::from_json(&json).map_err(|source| Error::Settings {
            path: path.to_path_buf(),
            source,
        })?;
        settings.validate()?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Load settings from `path`, writing the defaults there first if it does not exist
    pub fn load_or_create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            return Self::load(path);
        }
        let settings = Self::default();
        settings.save(path)?;
        Ok(settings)
    }

    /// Write settings as pretty JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self).map_err(|source| Error::SettingsEncode {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, json)?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<()> {
        let tuning = [
            ("world.width", self.world.width),
            ("world.height", self.world.height),
            ("ship.size", self.ship.size),
            ("ship.thrust", self.ship.thrust),
            ("ship.reverse_factor", self.ship.reverse_factor),
            ("ship.turn_rate", self.ship.turn_rate),
            ("ship.invulnerable_secs", self.ship.invulnerable_secs),
            ("weapons.muzzle_velocity", self.weapons.muzzle_velocity),
            ("weapons.ship_fire_period", self.weapons.ship_fire_period),
            ("weapons.turret_fire_period", self.weapons.turret_fire_period),
            ("shells.radius", self.shells.radius),
            ("shells.range", self.shells.range),
            ("rocks.fragment_offset", self.rocks.fragment_offset),
            ("rocks.fragment_speed", self.rocks.fragment_speed),
            ("rocks.drift_speed", self.rocks.drift_speed),
            ("rocks.max_spin", self.rocks.max_spin),
            ("turrets.turn_rate", self.turrets.turn_rate),
            ("turrets.aim_tolerance", self.turrets.aim_tolerance),
            ("turrets.fragment_offset", self.turrets.fragment_offset),
            ("level.spawn_ring_fraction", self.level.spawn_ring_fraction),
            ("network.send_interval", self.network.send_interval),
        ];
        for (name, value) in tuning {
            if !value.is_finite() {
                return Err(Error::InvalidSettings(format!(
                    "{} must be finite, got {}",
                    name, value
                )));
            }
        }
        // Spin is drawn from [-max_spin, max_spin), so its width must be finite too
        if self.rocks.max_spin < 0.0 || !(self.rocks.max_spin * 2.0).is_finite() {
            return Err(Error::InvalidSettings(format!(
                "rock max spin must be a non-negative rate, got {}",
                self.rocks.max_spin
            )));
        }
        if !(self.world.width > 0.0 && self.world.height > 0.0) {
            return Err(Error::InvalidSettings(format!(
                "world dimensions must be positive, got {}x{}",
                self.world.width, self.world.height
            )));
        }
        if self.ship.size <= 0.0 {
            return Err(Error::InvalidSettings("ship size must be positive".into()));
        }
        if self.shells.radius <= 0.0 || self.shells.range <= 0.0 {
            return Err(Error::InvalidSettings(
                "shell radius and range must be positive".into(),
            ));
        }
        if self.rocks.start_size == 0 {
            return Err(Error::InvalidSettings("rock start size must be at least 1".into()));
        }
        if self.network.mode == NetMode::Client && self.network.host.is_empty() {
            return Err(Error::InvalidSettings("client mode needs a host".into()));
        }
        if self.level.frame_rate == 0 {
            return Err(Error::InvalidSettings("frame rate must be non-zero".into()));
        }
        Ok(())
    }
}
