use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::YearnError;

/// Frontend configuration, read from a TOML file.
///
/// Every field has a default so a partial (or missing) file is fine.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub system_dir: PathBuf,
    pub save_dir: PathBuf,
    pub state_dir: PathBuf,
    pub cores_dir: PathBuf,
    pub username: String,
    /// One of the RETRO_LANGUAGE_* ids
    pub language: u32,
    pub max_users: u32,
    /// Seconds between battery save flushes, 0 disables
    pub autosave_secs: u64,
    /// Core option overrides, keyed by option key
    pub options: BTreeMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            system_dir: PathBuf::from(crate::SYS_PATH),
            save_dir: PathBuf::from(crate::SAVE_PATH),
            state_dir: PathBuf::from(crate::STATE_PATH),
            cores_dir: PathBuf::from(crate::EMU_PATH),
            username: String::from("yearn"),
            language: 0,
            max_users: 1,
            autosave_secs: 60,
            options: BTreeMap::new(),
        }
    }
}

impl Config {
    pub fn parse(text: &str) -> Result<Config, YearnError> {
        toml::from_str(text).map_err(|e| YearnError::Config(e.to_string()))
    }

    /// Load from `path`, falling back to defaults if the file doesn't exist.
    pub fn load(path: &Path) -> Result<Config, YearnError> {
        match std::fs::read_to_string(path) {
            Ok(text) => {
                debug!("Loading config from '{}'", path.display());
                Self::parse(&text)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("No config at '{}', using defaults", path.display());
                Ok(Config::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Make all directories absolute against `root`.
    pub fn resolve(mut self, root: &Path) -> Config {
        for dir in [
            &mut self.system_dir,
            &mut self.save_dir,
            &mut self.state_dir,
            &mut self.cores_dir,
        ] {
            if dir.is_relative() {
                *dir = root.join(&*dir);
            }
        }
        self
    }

    pub fn autosave_interval(&self) -> Option<Duration> {
        if self.autosave_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(self.autosave_secs))
        }
    }
}
