use log::{debug, error, info, trace, warn};
use std::error::Error;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::{Duration, Instant};

use yearn_core::config::Config;
use yearn_core::error::YearnError;
use yearn_core::problem::Problem;
use yearn_core::{CoreInfo, CoreSource, SAVEDATA_EXT, STATE_EXT};
use yearn_libretro::proxy::{RetroProxy, DEFAULT_FPS};
use yearn_libretrobind::api::{CoreApi, CoreLibrary};
use yearn_libretrobind::bind::{RETRO_DEVICE_JOYPAD, RETRO_SERIALIZATION_QUIRK_CORE_VARIABLE_SIZE};
use yearn_libretrobind::enums::{RetroMemory, RetroRegion};
use yearn_libretrobind::functions;
use yearn_libretrobind::functions::RetroGameInfo;
use yearn_libretrobind::types::RetroSystemAvInfo;
use yearn_libretrobind::utils;

use crate::proxy::libretro::with_proxy;

enum SaveType {
    Timed,
    Full,
}

/// Where a core is in the libretro lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreState {
    /// `retro_init` called, nothing loaded
    Initialised,
    /// Content loaded, frames can run
    Running,
    /// `retro_unload_game` called
    Unloaded,
    /// `retro_deinit` called
    Deinitialised,
}

impl CoreState {
    pub fn name(self) -> &'static str {
        match self {
            CoreState::Initialised => "initialised",
            CoreState::Running => "running",
            CoreState::Unloaded => "unloaded",
            CoreState::Deinitialised => "deinitialised",
        }
    }
}

/// One loaded core session.
///
/// Owns the process wide proxy for its lifetime and drives the core through
/// init, load, run, unload and deinit in that order.
pub struct Core {
    lib: CoreLibrary,
    info: CoreInfo,
    // Content handed to the core stays alive until unload
    game: Option<RetroGameInfo>,
    av: Option<RetroSystemAvInfo>,
    state: CoreState,
    frame_count: u64,
    frame_time: Duration,
    save_path: Option<PathBuf>,
    state_path: Option<PathBuf>,
    save_interval: Option<Duration>,
    save_time: Instant,
    save_mod: bool,
    last_tick: Option<Instant>,
}

impl Core {
    /// Start `game` (or no content at all) on the core in `lib`.
    pub fn new(
        lib: CoreLibrary,
        info: CoreInfo,
        game: Option<&Path>,
        config: &Config,
        error_channel: mpsc::Sender<Problem>,
    ) -> Result<Core, Box<dyn Error>> {
        let libretro_path = match info.source() {
            CoreSource::Dynamic(path) => Some(path.as_path()),
            CoreSource::Static(_) => None,
        };
        let proxy = RetroProxy::new(config, libretro_path, error_channel)?;
        // Refuse before touching the core so a live session keeps working
        crate::proxy::libretro::create(proxy)?;

        let api = *lib.api();
        trace!("Setting up callbacks");
        crate::proxy::functions::retro_set_environment(&api);
        crate::proxy::functions::retro_set_video_refresh(&api);
        crate::proxy::functions::retro_set_input_poll(&api);
        crate::proxy::functions::retro_set_input_state(&api);
        crate::proxy::functions::retro_set_audio_sample(&api);
        crate::proxy::functions::retro_set_audio_sample_batch(&api);

        debug!("Initialising core '{}'", info.name());
        functions::init(&api);

        // From here on Drop takes care of deinit and the proxy
        let mut core = Core {
            lib,
            info,
            game: None,
            av: None,
            state: CoreState::Initialised,
            frame_count: 0,
            frame_time: Duration::from_secs_f64(1.0 / DEFAULT_FPS),
            save_path: None,
            state_path: None,
            save_interval: config.autosave_interval(),
            save_time: Instant::now(),
            save_mod: false,
            last_tick: None,
        };
        core.load(game, config)?;
        Ok(core)
    }

    fn load(&mut self, game: Option<&Path>, config: &Config) -> Result<(), Box<dyn Error>> {
        let api = *self.api();
        let loaded = match game {
            Some(path) => {
                debug!("Loading game: {}", path.display());
                let mut game_info = RetroGameInfo::new(path)?;
                let loaded = functions::load_game(&api, self.info.sys_info(), Some(&mut game_info))?;
                self.game = Some(game_info);
                self.save_path = Self::content_file(&config.save_dir, path, SAVEDATA_EXT);
                self.state_path = Self::content_file(&config.state_dir, path, STATE_EXT);
                loaded
            }
            None => {
                if !with_proxy(|p| p.supports_no_game()).unwrap_or(false) {
                    error!("No game given and core needs content");
                    return Err(Box::new(YearnError::NoGames));
                }
                debug!("Starting core without content");
                functions::load_game(&api, self.info.sys_info(), None)?
            }
        };

        if !loaded {
            error!("Failed to load game");
            return Err(Box::new(YearnError::GameLoadError));
        }
        self.state = CoreState::Running;

        match &self.save_path {
            Some(path) => info!("Save path: {}", path.display()),
            None => warn!("No save path"),
        };
        if let Some(save) = &self.save_path {
            if utils::has_save_memory(&api) {
                if let Err(e) = utils::try_read_into_save_mem(&api, save) {
                    // Keep the mismatched file rather than overwriting it
                    self.save_path = None;
                    return Err(e);
                }
            }
        }

        functions::set_controller_port_device(&api, 0, RETRO_DEVICE_JOYPAD);
        trace!("Getting system AV info");
        let av = functions::get_system_av_info(&api);
        debug!(
            "Screen: {}x{}",
            av.geometry.base_width, av.geometry.base_height
        );
        debug!("Audio sample rate: {} Hz", av.timing.sample_rate);
        crate::proxy::libretro::set_av(av);
        self.set_frame_time(&av);
        self.av = Some(av);
        Ok(())
    }

    /// `<dir>/<game file name>.<ext>`
    fn content_file(dir: &Path, game: &Path, ext: &str) -> Option<PathBuf> {
        match game.file_name() {
            Some(filename) => {
                let mut file = OsString::from(filename);
                file.push(".");
                file.push(ext);
                Some(dir.join(file))
            }
            None => {
                error!("Game has no filename");
                None
            }
        }
    }

    fn set_frame_time(&mut self, av: &RetroSystemAvInfo) {
        match av.frame_time() {
            Some(t) => self.frame_time = t,
            None => warn!("Core reports {} fps, keeping {:?}", av.timing.fps, self.frame_time),
        }
        debug!("Frame time: {:?}", self.frame_time);
    }

    fn api(&self) -> &CoreApi {
        self.lib.api()
    }

    fn require(&self, expected: CoreState) -> Result<(), YearnError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(YearnError::Lifecycle {
                expected: expected.name(),
                actual: self.state.name(),
            })
        }
    }

    pub fn state(&self) -> CoreState {
        self.state
    }

    pub fn info(&self) -> &CoreInfo {
        &self.info
    }

    pub fn av(&self) -> Option<RetroSystemAvInfo> {
        self.av
    }

    pub fn frame_time(&self) -> Duration {
        self.frame_time
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Battery save file for the loaded content.
    pub fn save_path(&self) -> Option<&Path> {
        self.save_path.as_deref()
    }

    /// Default save state file for the loaded content, None without content.
    pub fn state_path(&self) -> Option<&Path> {
        self.state_path.as_deref()
    }

    /// Change how often save RAM is flushed while running, None disables.
    pub fn set_autosave(&mut self, interval: Option<Duration>) {
        self.save_interval = interval;
        self.save_time = Instant::now();
    }

    /// Run a single frame.
    pub fn tick(&mut self) -> Result<(), YearnError> {
        self.require(CoreState::Running)?;
        trace!("Tick core");

        // Called outside the proxy lock as the core may call back in
        let now = Instant::now();
        if let Some(cb) = with_proxy(|p| p.frame_time_callback()).flatten() {
            if let Some(f) = cb.callback {
                let usec = match self.last_tick {
                    Some(last) => (now - last).as_micros() as i64,
                    None => cb.reference,
                };
                unsafe { f(usec) };
            }
        }
        self.last_tick = Some(now);

        functions::run(self.api());
        self.frame_count += 1;

        // The core may have changed timing with SET_SYSTEM_AV_INFO
        if let Some(av) = with_proxy(|p| p.get_av()).flatten() {
            if self.av != Some(av) {
                self.set_frame_time(&av);
                self.av = Some(av);
            }
        }

        if let Some(interval) = self.save_interval {
            if self.save_time.elapsed() >= interval {
                self.do_save(SaveType::Timed);
                self.save_time = Instant::now();
            }
        }

        Ok(())
    }

    pub fn reset(&mut self) -> Result<(), YearnError> {
        self.require(CoreState::Running)?;
        debug!("Resetting core");
        functions::reset(self.api());
        Ok(())
    }

    pub fn serialize(&self) -> Result<Vec<u8>, YearnError> {
        self.require(CoreState::Running)?;
        functions::serialize(self.api())
    }

    /// Restore a snapshot taken with `serialize`.
    ///
    /// The size must match what the core currently reports unless it has
    /// declared variable size states.
    pub fn unserialize(&mut self, data: &[u8]) -> Result<(), YearnError> {
        self.require(CoreState::Running)?;
        let quirks = with_proxy(|p| p.serialization_quirks()).unwrap_or(0);
        if quirks & RETRO_SERIALIZATION_QUIRK_CORE_VARIABLE_SIZE == 0 {
            let expected = functions::serialize_size(self.api());
            if expected != data.len() {
                return Err(YearnError::StateSize {
                    expected,
                    got: data.len(),
                });
            }
        }
        functions::unserialize(self.api(), data)
    }

    pub fn save_state(&self, path: &Path) -> Result<(), Box<dyn Error>> {
        let data = self.serialize()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, &data)?;
        info!("Saved state to '{}' ({} bytes)", path.display(), data.len());
        Ok(())
    }

    pub fn load_state(&mut self, path: &Path) -> Result<(), Box<dyn Error>> {
        let data = std::fs::read(path)?;
        self.unserialize(&data)?;
        info!("Loaded state from '{}'", path.display());
        Ok(())
    }

    pub fn cheat_reset(&mut self) -> Result<(), YearnError> {
        self.require(CoreState::Running)?;
        functions::cheat_reset(self.api());
        Ok(())
    }

    pub fn cheat_set(&mut self, index: u32, enabled: bool, code: &str) -> Result<(), Box<dyn Error>> {
        self.require(CoreState::Running)?;
        functions::cheat_set(self.api(), index, enabled, code)?;
        Ok(())
    }

    /// Copy of a memory region, None if the core doesn't expose it.
    pub fn memory(&self, region: RetroMemory) -> Result<Option<Vec<u8>>, YearnError> {
        self.require(CoreState::Running)?;
        Ok(unsafe { functions::memory(self.api(), region) }.map(|m| m.to_vec()))
    }

    pub fn region(&self) -> Result<Option<RetroRegion>, YearnError> {
        self.require(CoreState::Running)?;
        Ok(functions::region(self.api()))
    }

    pub fn set_controller(&mut self, port: u32, device: u32) -> Result<(), YearnError> {
        self.require(CoreState::Running)?;
        functions::set_controller_port_device(self.api(), port, device);
        Ok(())
    }

    pub fn shutdown_requested(&self) -> bool {
        with_proxy(|p| p.shutdown_requested()).unwrap_or(false)
    }

    /// Flush save RAM and unload the content.
    pub fn unload(&mut self) -> Result<(), YearnError> {
        self.require(CoreState::Running)?;
        self.do_save(SaveType::Full);
        debug!("Unloading game");
        functions::unload_game(self.api());
        self.game = None;
        self.state = CoreState::Unloaded;
        Ok(())
    }

    pub fn deinit(&mut self) -> Result<(), YearnError> {
        match self.state {
            CoreState::Initialised | CoreState::Unloaded => {
                debug!("Deinitialising core");
                functions::deinit(self.api());
                self.state = CoreState::Deinitialised;
                Ok(())
            }
            other => Err(YearnError::Lifecycle {
                expected: CoreState::Unloaded.name(),
                actual: other.name(),
            }),
        }
    }

    fn do_save(&mut self, kind: SaveType) {
        trace!("Starting save");
        if let Some(save) = &self.save_path {
            let save = match kind {
                SaveType::Timed => {
                    self.save_mod = !self.save_mod;
                    let mut timed = save.clone().into_os_string();
                    timed.push(if self.save_mod { ".0" } else { ".1" });
                    PathBuf::from(timed)
                }
                SaveType::Full => save.clone(),
            };
            if !utils::has_save_memory(self.lib.api()) {
                return;
            }
            debug!("Saving data to {}", save.display());
            if let Some(parent) = save.parent() {
                if let Err(e) = std::fs::create_dir_all(parent) {
                    error!("Failed to create '{}': {}", parent.display(), e);
                    return;
                }
            }
            if let Err(e) = utils::save_to_file(self.lib.api(), &save) {
                error!("Failed to save: {}", e);
            }
        }
    }
}

impl Drop for Core {
    fn drop(&mut self) {
        trace!("Dropping core");
        if self.state == CoreState::Running {
            if let Err(e) = self.unload() {
                warn!("Failed to unload game: {}", e);
            }
        }
        if self.state != CoreState::Deinitialised {
            if let Err(e) = self.deinit() {
                warn!("Failed to deinit core: {}", e);
            }
        }
        if crate::proxy::libretro::destroy().is_none() {
            warn!("Proxy already gone when dropping core");
        }
        debug!("Unloaded core '{}'", self.info.name());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_names() {
        assert_eq!(CoreState::Running.name(), "running");
        assert_eq!(CoreState::Deinitialised.name(), "deinitialised");
    }

    #[test]
    fn save_path_from_game() {
        let save = Core::content_file(Path::new("/saves"), Path::new("/roms/tetris.gb"), SAVEDATA_EXT);
        assert_eq!(save, Some(PathBuf::from("/saves/tetris.gb.sav")));
        assert_eq!(Core::content_file(Path::new("/saves"), Path::new("/"), SAVEDATA_EXT), None);
    }

    #[test]
    fn state_path_from_game() {
        let state = Core::content_file(Path::new("/states"), Path::new("/roms/tetris.gb"), STATE_EXT);
        assert_eq!(state, Some(PathBuf::from("/states/tetris.gb.state")));
    }
}
