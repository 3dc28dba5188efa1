pub mod config;
pub mod error;
pub mod log;
pub mod portable;
pub mod problem;

mod types;

pub use types::*;

pub const EMU_PATH: &str = "cores";
pub const SAVE_PATH: &str = "saves";
pub const STATE_PATH: &str = "states";
pub const SYS_PATH: &str = "system";

pub const CONFIG_FILE: &str = "yearn.toml";
pub const SAVEDATA_EXT: &str = "sav";
pub const STATE_EXT: &str = "state";

/// Number of input ports the frontend tracks
pub const MAX_PORTS: usize = 8;
