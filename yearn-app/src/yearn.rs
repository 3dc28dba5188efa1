use log::{debug, error, info, trace, warn};
use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::{mpsc, Once};
use std::time::Instant;

use yearn_core::config::Config;
use yearn_core::error::YearnError;
use yearn_core::problem::Problem;
use yearn_core::{CoreInfo, CoreSource};
use yearn_libretrobind::api::{CoreApi, CoreLibrary};
use yearn_libretrobind::functions::{check_api_version, get_system_info};
use yearn_libretrobind::statics::StaticCore;

use crate::core::Core;
use crate::proxy::libretro::with_proxy;

static CTRLC: Once = Once::new();
static REQUEST_EXIT: AtomicBool = AtomicBool::new(false);
static CTRLC_COUNT: AtomicU8 = AtomicU8::new(0);

fn install_ctrlc() {
    CTRLC.call_once(|| {
        let res = ctrlc::set_handler(|| {
            let attempts = CTRLC_COUNT.fetch_add(1, Ordering::AcqRel);
            info!("Got Ctrl-C {}", attempts);
            if attempts > 3 {
                error!("Shutting down forcibly");
                std::process::exit(1);
            } else {
                REQUEST_EXIT.store(true, Ordering::Release);
            }
        });
        if let Err(e) = res {
            warn!("Error setting Ctrl-C handler: {}", e);
        }
    });
}

/// What to run and for how long.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Content to load, None for cores that run without
    pub game: Option<PathBuf>,
    /// Core name or prefix, otherwise picked by file extension
    pub core: Option<String>,
    /// Stop after this many frames
    pub frames: Option<u64>,
    /// Save state to restore before the first frame
    pub state: Option<PathBuf>,
    /// Restore the content's own state file, if there is one, when no
    /// `state` is given
    pub resume: bool,
    /// Write the content's state file when the run stops
    pub save_state: bool,
    /// Sleep between frames to match the core's frame rate
    pub pace: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Frames,
    Shutdown,
    Interrupted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub frames: u64,
    pub dupes: u64,
    pub stop: StopReason,
}

/// Frontend: knows the available cores and runs sessions on them.
pub struct Yearn {
    config: Config,
    cores: Vec<CoreInfo>,
    statics: Vec<(String, CoreApi)>,
    error_channel: mpsc::Receiver<Problem>,
    error_tx: mpsc::Sender<Problem>,
}

impl Yearn {
    pub fn new(config: Config) -> Self {
        let (error_tx, error_channel) = mpsc::channel();
        let mut yearn = Yearn {
            config,
            cores: Vec::new(),
            statics: Vec::new(),
            error_channel,
            error_tx,
        };
        yearn.find_cores();
        yearn
    }

    fn try_load_core(api: &CoreApi, source: CoreSource) -> Result<CoreInfo, Box<dyn Error>> {
        trace!("Trying to load core: {}", source);
        check_api_version(api)?;
        let info = get_system_info(api)?;
        debug!(
            "Found Core '{} ({})'",
            info.library_name, info.library_version
        );
        let core = CoreInfo::new(source, info);
        debug!("  Supported extensions \"{}\"", core.extensions_str());
        Ok(core)
    }

    fn find_cores(&mut self) {
        trace!("Finding cores");
        for core in StaticCore::linked() {
            if let Some(api) = core.api() {
                match Self::try_load_core(&api, CoreSource::Static(core.prefix().to_string())) {
                    Ok(c) => self.cores.push(c),
                    Err(e) => warn!("Skipping static core '{}': {}", core, e),
                }
            }
        }

        let dir = &self.config.cores_dir;
        match std::fs::read_dir(dir) {
            Ok(paths) => {
                for path in paths {
                    match path {
                        Ok(entry) => {
                            let path = entry.path();
                            let is_lib = path
                                .extension()
                                .map(|e| e == std::env::consts::DLL_EXTENSION)
                                .unwrap_or(false);
                            if !is_lib {
                                continue;
                            }
                            let res = CoreLibrary::open(&path)
                                .map_err(|e| -> Box<dyn Error> { Box::new(e) })
                                .and_then(|lib| {
                                    Self::try_load_core(lib.api(), CoreSource::Dynamic(path.clone()))
                                });
                            match res {
                                Ok(c) => self.cores.push(c),
                                Err(e) => warn!("Skipping '{}': {}", path.display(), e),
                            }
                        }
                        Err(e) => warn!("Error getting path: {}", e),
                    }
                }
            }
            Err(e) => {
                warn!("Failed to read cores directory '{}': {}", dir.display(), e);
            }
        }
        info!("Found {} core(s)", self.cores.len());
    }

    /// Add a core linked into the binary under `<prefix>_retro_*` that isn't
    /// one of the known static cores.
    pub fn register_static(&mut self, prefix: &str, api: CoreApi) -> Result<(), Box<dyn Error>> {
        let core = Self::try_load_core(&api, CoreSource::Static(prefix.to_string()))?;
        self.statics.retain(|(p, _)| p != prefix);
        self.statics.push((prefix.to_string(), api));
        self.cores.retain(|c| c.source() != core.source());
        self.cores.push(core);
        Ok(())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn cores(&self) -> &[CoreInfo] {
        &self.cores
    }

    pub fn cores_for_game(&self, path: &Path) -> Vec<CoreInfo> {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => self
                .cores
                .iter()
                .filter(|c| c.supports(ext))
                .cloned()
                .collect(),
            None => {
                error!("No file extension to determine emulator");
                Vec::new()
            }
        }
    }

    /// Pick a core by name if given, otherwise the first that handles the
    /// game's extension.
    pub fn select_core(&self, game: Option<&Path>, name: Option<&str>) -> Result<CoreInfo, YearnError> {
        let core = match (name, game) {
            (Some(name), _) => self.cores.iter().find(|c| c.is_named(name)).cloned(),
            (None, Some(game)) => self.cores_for_game(game).into_iter().next(),
            (None, None) => None,
        };
        core.ok_or(YearnError::NoCore)
    }

    /// Entry points for `info`. Shared libraries are reopened for every
    /// session.
    pub fn open_core(&self, info: &CoreInfo) -> Result<CoreLibrary, Box<dyn Error>> {
        match info.source() {
            CoreSource::Dynamic(path) => Ok(CoreLibrary::open(path)?),
            CoreSource::Static(prefix) => {
                let api = self
                    .statics
                    .iter()
                    .find(|(p, _)| p == prefix)
                    .map(|(_, api)| *api)
                    .or_else(|| StaticCore::from_name(prefix).and_then(|c| c.api()));
                match api {
                    Some(api) => Ok(CoreLibrary::from_api(api)),
                    None => Err(Box::new(YearnError::StaticCoreUnavailable(prefix.clone()))),
                }
            }
        }
    }

    /// Load a core session without running it.
    pub fn start(&self, game: Option<&Path>, core: Option<&str>) -> Result<Core, Box<dyn Error>> {
        let info = self.select_core(game, core)?;
        info!("Using core '{}' from {}", info.name(), info.source());
        let lib = self.open_core(&info)?;
        Core::new(lib, info, game, &self.config, self.error_tx.clone())
    }

    // Fatal problems end the session, notices are only logged
    fn handle_problems(&self) -> Result<(), YearnError> {
        loop {
            match self.error_channel.try_recv() {
                Ok(Problem::Fatal(e)) => {
                    error!("{}", e);
                    return Err(e);
                }
                Ok(Problem::Notice(n)) => n.log(),
                Err(mpsc::TryRecvError::Empty) => return Ok(()),
                Err(mpsc::TryRecvError::Disconnected) => {
                    error!("error channel disconnected, internal logic error");
                    return Err(YearnError::System);
                }
            }
        }
    }

    pub fn run(&mut self, opts: &RunOptions) -> Result<RunSummary, Box<dyn Error>> {
        debug!("Starting yearn");
        install_ctrlc();
        REQUEST_EXIT.store(false, Ordering::Release);
        CTRLC_COUNT.store(0, Ordering::Release);

        let mut core = self.start(opts.game.as_deref(), opts.core.as_deref())?;
        if let Some(state) = &opts.state {
            core.load_state(state)?;
        } else if opts.resume {
            match core.state_path().map(Path::to_path_buf) {
                Some(state) if state.exists() => core.load_state(&state)?,
                Some(state) => info!("No state at '{}' to resume from", state.display()),
                None => warn!("No content, nothing to resume"),
            }
        }
        self.handle_problems()?;

        let stop = loop {
            if REQUEST_EXIT.load(Ordering::Acquire) {
                break StopReason::Interrupted;
            }
            if opts.frames.map(|n| core.frame_count() >= n).unwrap_or(false) {
                break StopReason::Frames;
            }
            if core.shutdown_requested() {
                break StopReason::Shutdown;
            }

            let start = Instant::now();
            core.tick()?;
            self.handle_problems()?;
            let samples = with_proxy(|p| p.take_audio().len()).unwrap_or(0);
            trace!("{} audio samples this frame", samples);

            if opts.pace {
                let duration = start.elapsed();
                trace!("Time elapsed in tick() is: {:?}", duration);
                match core.frame_time().checked_sub(duration) {
                    Some(t) => std::thread::sleep(t),
                    None => warn!("Dropped frame {:?}", duration),
                }
            }
        };

        let (frames, dupes) = with_proxy(|p| p.frame_counts()).unwrap_or((0, 0));
        if opts.save_state {
            match core.state_path() {
                Some(state) => {
                    if let Err(e) = core.save_state(state) {
                        error!("Failed to save state: {}", e);
                    }
                }
                None => warn!("No content, not saving state"),
            }
        }
        core.unload()?;
        core.deinit()?;
        drop(core);

        info!("Stopped after {} frames ({:?})", frames, stop);
        Ok(RunSummary {
            frames,
            dupes,
            stop,
        })
    }
}
