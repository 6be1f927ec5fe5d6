use core::fmt;
use std::time::Duration;

use crate::ship::ShipKind;

pub const BOARD_SIZE: u8 = 10;
pub const NUM_SHIPS: usize = 5;
pub const SHIPS: [ShipKind; NUM_SHIPS] = [
    ShipKind::new("Carrier", 5),
    ShipKind::new("Battleship", 4),
    ShipKind::new("Cruiser", 3),
    ShipKind::new("Destroyer", 3),
    ShipKind::new("Submarine", 2),
];

/// Total number of ship segments in one fleet.
pub const TOTAL_SHIP_CELLS: usize = 5 + 4 + 3 + 3 + 2;

/// Ticks a player gets to fire before the turn is forfeited.
pub const TURN_TICKS: u32 = 10;
/// Ticks of narration between "both fleets ready" and the first shot.
pub const PRE_BATTLE_TICKS: u32 = 3;
pub const TICK: Duration = Duration::from_secs(1);

pub const MIN_PORT: u16 = 10000;
pub const MAX_PORT: u16 = 65535;
pub const DEFAULT_PORT: u16 = 12345;
pub const DEFAULT_ADDRESS: &str = "127.0.0.1";

/// Convert a ship name string to the canonical static name used in the
/// catalog. Returns `None` if the name does not match any defined ship.
pub fn ship_name_static(name: &str) -> Option<&'static str> {
    SHIPS
        .iter()
        .find(|def| def.name().eq_ignore_ascii_case(name))
        .map(|def| def.name())
}

/// Errors returned while validating user-supplied configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Port is outside the accepted `MIN_PORT..=MAX_PORT` range.
    PortOutOfRange(u32),
    /// Port text is not a number.
    InvalidPort(String),
    /// Display name is empty after trimming.
    EmptyName,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::PortOutOfRange(p) => write!(
                f,
                "Port {} is out of range - must be between {} and {}",
                p, MIN_PORT, MAX_PORT
            ),
            ConfigError::InvalidPort(s) => write!(f, "Invalid port '{}' - must be a number", s),
            ConfigError::EmptyName => write!(f, "Player name cannot be empty"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Check that `port` lies in the range players are allowed to use.
pub fn validate_port(port: u32) -> Result<u16, ConfigError> {
    if port < MIN_PORT as u32 || port > MAX_PORT as u32 {
        return Err(ConfigError::PortOutOfRange(port));
    }
    Ok(port as u16)
}

/// Parse and validate a port typed by the user.
pub fn parse_port(input: &str) -> Result<u16, ConfigError> {
    let trimmed = input.trim();
    let port: u32 = trimmed
        .parse()
        .map_err(|_| ConfigError::InvalidPort(trimmed.to_string()))?;
    validate_port(port)
}

/// Runtime settings for one [`Session`](crate::session::Session).
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Display name announced to the peer and used in chat lines.
    pub name: String,
    /// Length of one countdown tick.
    pub tick: Duration,
    pub turn_ticks: u32,
    pub pre_battle_ticks: u32,
    /// Fixed RNG seed for reproducible placement and scripted shots.
    pub seed: Option<u64>,
}

impl SessionConfig {
    pub fn new(name: impl Into<String>) -> Result<Self, ConfigError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ConfigError::EmptyName);
        }
        Ok(Self {
            name: name.trim().to_string(),
            ..Self::default()
        })
    }

    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    pub fn with_turn_ticks(mut self, ticks: u32) -> Self {
        self.turn_ticks = ticks.max(1);
        self
    }

    pub fn with_pre_battle_ticks(mut self, ticks: u32) -> Self {
        self.pre_battle_ticks = ticks.max(1);
        self
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            name: "Player".to_string(),
            tick: TICK,
            turn_ticks: TURN_TICKS,
            pre_battle_ticks: PRE_BATTLE_TICKS,
            seed: None,
        }
    }
}
