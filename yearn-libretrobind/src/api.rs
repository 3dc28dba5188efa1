use log::{debug, trace};
use std::ffi::OsStr;
use std::os::raw::{c_char, c_uint, c_void};
use std::sync::Arc;

use crate::bind::*;
use crate::error::BindError;

/// Every function a libretro core exports, in `libretro.h` order.
pub const CORE_FUNCTIONS: [&str; 25] = [
    "retro_set_environment",
    "retro_set_video_refresh",
    "retro_set_audio_sample",
    "retro_set_audio_sample_batch",
    "retro_set_input_poll",
    "retro_set_input_state",
    "retro_init",
    "retro_deinit",
    "retro_api_version",
    "retro_get_system_info",
    "retro_get_system_av_info",
    "retro_set_controller_port_device",
    "retro_reset",
    "retro_run",
    "retro_serialize_size",
    "retro_serialize",
    "retro_unserialize",
    "retro_cheat_reset",
    "retro_cheat_set",
    "retro_load_game",
    "retro_load_game_special",
    "retro_unload_game",
    "retro_get_region",
    "retro_get_memory_data",
    "retro_get_memory_size",
];

/// Link name of `function` for a core exported under `prefix`.
///
/// `symbol_name(Some("mgba"), "retro_run")` is `mgba_retro_run`.
pub fn symbol_name(prefix: Option<&str>, function: &str) -> String {
    match prefix {
        Some(p) => format!("{}_{}", p, function),
        None => String::from(function),
    }
}

/// Resolved entry points of one core.
///
/// Whether they came from a shared library, a prefixed static archive or
/// plain Rust functions, the signatures are the ones declared here.
#[derive(Clone, Copy)]
pub struct CoreApi {
    pub retro_set_environment: unsafe extern "C" fn(retro_environment_t),
    pub retro_set_video_refresh: unsafe extern "C" fn(retro_video_refresh_t),
    pub retro_set_audio_sample: unsafe extern "C" fn(retro_audio_sample_t),
    pub retro_set_audio_sample_batch: unsafe extern "C" fn(retro_audio_sample_batch_t),
    pub retro_set_input_poll: unsafe extern "C" fn(retro_input_poll_t),
    pub retro_set_input_state: unsafe extern "C" fn(retro_input_state_t),
    pub retro_init: unsafe extern "C" fn(),
    pub retro_deinit: unsafe extern "C" fn(),
    pub retro_api_version: unsafe extern "C" fn() -> c_uint,
    pub retro_get_system_info: unsafe extern "C" fn(info: *mut retro_system_info),
    pub retro_get_system_av_info: unsafe extern "C" fn(info: *mut retro_system_av_info),
    pub retro_set_controller_port_device: unsafe extern "C" fn(port: c_uint, device: c_uint),
    pub retro_reset: unsafe extern "C" fn(),
    pub retro_run: unsafe extern "C" fn(),
    pub retro_serialize_size: unsafe extern "C" fn() -> usize,
    pub retro_serialize: unsafe extern "C" fn(data: *mut c_void, size: usize) -> bool,
    pub retro_unserialize: unsafe extern "C" fn(data: *const c_void, size: usize) -> bool,
    pub retro_cheat_reset: unsafe extern "C" fn(),
    pub retro_cheat_set: unsafe extern "C" fn(index: c_uint, enabled: bool, code: *const c_char),
    pub retro_load_game: unsafe extern "C" fn(game: *const retro_game_info) -> bool,
    pub retro_load_game_special: unsafe extern "C" fn(
        game_type: c_uint,
        info: *const retro_game_info,
        num_info: usize,
    ) -> bool,
    pub retro_unload_game: unsafe extern "C" fn(),
    pub retro_get_region: unsafe extern "C" fn() -> c_uint,
    pub retro_get_memory_data: unsafe extern "C" fn(id: c_uint) -> *mut c_void,
    pub retro_get_memory_size: unsafe extern "C" fn(id: c_uint) -> usize,
}

impl CoreApi {
    /// Resolve the plain `retro_*` symbols of a shared library.
    ///
    /// # Safety
    ///
    /// The library must be a libretro core, the symbols are trusted to have
    /// the declared signatures. The returned table must not outlive `lib`.
    pub unsafe fn load(lib: &libloading::Library) -> Result<CoreApi, libloading::Error> {
        Self::load_prefixed(lib, None)
    }

    /// Resolve `<prefix>_retro_*` symbols, as produced when cores are
    /// renamed for static linking.
    ///
    /// # Safety
    ///
    /// See `load`.
    pub unsafe fn load_prefixed(
        lib: &libloading::Library,
        prefix: Option<&str>,
    ) -> Result<CoreApi, libloading::Error> {
        macro_rules! load_symbol {
            ($name:ident) => {{
                let name = symbol_name(prefix, stringify!($name));
                trace!("Resolving {}", name);
                *(lib.get(name.as_bytes())?)
            }};
        }

        Ok(CoreApi {
            retro_set_environment: load_symbol!(retro_set_environment),
            retro_set_video_refresh: load_symbol!(retro_set_video_refresh),
            retro_set_audio_sample: load_symbol!(retro_set_audio_sample),
            retro_set_audio_sample_batch: load_symbol!(retro_set_audio_sample_batch),
            retro_set_input_poll: load_symbol!(retro_set_input_poll),
            retro_set_input_state: load_symbol!(retro_set_input_state),
            retro_init: load_symbol!(retro_init),
            retro_deinit: load_symbol!(retro_deinit),
            retro_api_version: load_symbol!(retro_api_version),
            retro_get_system_info: load_symbol!(retro_get_system_info),
            retro_get_system_av_info: load_symbol!(retro_get_system_av_info),
            retro_set_controller_port_device: load_symbol!(retro_set_controller_port_device),
            retro_reset: load_symbol!(retro_reset),
            retro_run: load_symbol!(retro_run),
            retro_serialize_size: load_symbol!(retro_serialize_size),
            retro_serialize: load_symbol!(retro_serialize),
            retro_unserialize: load_symbol!(retro_unserialize),
            retro_cheat_reset: load_symbol!(retro_cheat_reset),
            retro_cheat_set: load_symbol!(retro_cheat_set),
            retro_load_game: load_symbol!(retro_load_game),
            retro_load_game_special: load_symbol!(retro_load_game_special),
            retro_unload_game: load_symbol!(retro_unload_game),
            retro_get_region: load_symbol!(retro_get_region),
            retro_get_memory_data: load_symbol!(retro_get_memory_data),
            retro_get_memory_size: load_symbol!(retro_get_memory_size),
        })
    }
}

/// A `CoreApi` together with whatever keeps its function pointers alive.
#[derive(Clone)]
pub struct CoreLibrary {
    api: CoreApi,
    // Keeps the pointers in api valid
    lib: Option<Arc<libloading::Library>>,
}

impl CoreLibrary {
    /// Open a shared library core and resolve every entry point up front.
    pub fn open<P>(path: P) -> Result<CoreLibrary, BindError>
    where
        P: AsRef<OsStr>,
    {
        Self::open_prefixed(path, None)
    }

    pub fn open_prefixed<P>(path: P, prefix: Option<&str>) -> Result<CoreLibrary, BindError>
    where
        P: AsRef<OsStr>,
    {
        let lib = crate::functions::load_library(path)?;
        let api = unsafe { CoreApi::load_prefixed(&lib, prefix)? };
        debug!("Resolved {} core functions", CORE_FUNCTIONS.len());
        Ok(CoreLibrary {
            api,
            lib: Some(lib),
        })
    }

    /// Wrap entry points that are part of this binary.
    pub fn from_api(api: CoreApi) -> CoreLibrary {
        CoreLibrary { api, lib: None }
    }

    pub fn api(&self) -> &CoreApi {
        &self.api
    }

    pub fn is_dynamic(&self) -> bool {
        self.lib.is_some()
    }
}
