use std::fmt;

use crate::api::{symbol_name, CoreApi, CORE_FUNCTIONS};

/// Bind a core that was linked into the binary with its `retro_*` symbols
/// renamed to `<prefix>_retro_*`.
///
/// Expands to a module named after the prefix holding the extern block and an
/// `api()` constructor:
///
/// ```ignore
/// yearn_libretrobind::declare_libretro_core!(gambatte);
/// let api = gambatte::api();
/// ```
#[macro_export]
macro_rules! declare_libretro_core {
    ($prefix:ident) => {
        #[allow(dead_code)]
        pub mod $prefix {
            use $crate::bind::*;
            use std::os::raw::{c_char, c_uint, c_void};

            extern "C" {
                #[link_name = concat!(stringify!($prefix), "_retro_set_environment")]
                pub fn retro_set_environment(cb: retro_environment_t);
                #[link_name = concat!(stringify!($prefix), "_retro_set_video_refresh")]
                pub fn retro_set_video_refresh(cb: retro_video_refresh_t);
                #[link_name = concat!(stringify!($prefix), "_retro_set_audio_sample")]
                pub fn retro_set_audio_sample(cb: retro_audio_sample_t);
                #[link_name = concat!(stringify!($prefix), "_retro_set_audio_sample_batch")]
                pub fn retro_set_audio_sample_batch(cb: retro_audio_sample_batch_t);
                #[link_name = concat!(stringify!($prefix), "_retro_set_input_poll")]
                pub fn retro_set_input_poll(cb: retro_input_poll_t);
                #[link_name = concat!(stringify!($prefix), "_retro_set_input_state")]
                pub fn retro_set_input_state(cb: retro_input_state_t);
                #[link_name = concat!(stringify!($prefix), "_retro_init")]
                pub fn retro_init();
                #[link_name = concat!(stringify!($prefix), "_retro_deinit")]
                pub fn retro_deinit();
                #[link_name = concat!(stringify!($prefix), "_retro_api_version")]
                pub fn retro_api_version() -> c_uint;
                #[link_name = concat!(stringify!($prefix), "_retro_get_system_info")]
                pub fn retro_get_system_info(info: *mut retro_system_info);
                #[link_name = concat!(stringify!($prefix), "_retro_get_system_av_info")]
                pub fn retro_get_system_av_info(info: *mut retro_system_av_info);
                #[link_name = concat!(stringify!($prefix), "_retro_set_controller_port_device")]
                pub fn retro_set_controller_port_device(port: c_uint, device: c_uint);
                #[link_name = concat!(stringify!($prefix), "_retro_reset")]
                pub fn retro_reset();
                #[link_name = concat!(stringify!($prefix), "_retro_run")]
                pub fn retro_run();
                #[link_name = concat!(stringify!($prefix), "_retro_serialize_size")]
                pub fn retro_serialize_size() -> usize;
                #[link_name = concat!(stringify!($prefix), "_retro_serialize")]
                pub fn retro_serialize(data: *mut c_void, size: usize) -> bool;
                #[link_name = concat!(stringify!($prefix), "_retro_unserialize")]
                pub fn retro_unserialize(data: *const c_void, size: usize) -> bool;
                #[link_name = concat!(stringify!($prefix), "_retro_cheat_reset")]
                pub fn retro_cheat_reset();
                #[link_name = concat!(stringify!($prefix), "_retro_cheat_set")]
                pub fn retro_cheat_set(index: c_uint, enabled: bool, code: *const c_char);
                #[link_name = concat!(stringify!($prefix), "_retro_load_game")]
                pub fn retro_load_game(game: *const retro_game_info) -> bool;
                #[link_name = concat!(stringify!($prefix), "_retro_load_game_special")]
                pub fn retro_load_game_special(
                    game_type: c_uint,
                    info: *const retro_game_info,
                    num_info: usize,
                ) -> bool;
                #[link_name = concat!(stringify!($prefix), "_retro_unload_game")]
                pub fn retro_unload_game();
                #[link_name = concat!(stringify!($prefix), "_retro_get_region")]
                pub fn retro_get_region() -> c_uint;
                #[link_name = concat!(stringify!($prefix), "_retro_get_memory_data")]
                pub fn retro_get_memory_data(id: c_uint) -> *mut c_void;
                #[link_name = concat!(stringify!($prefix), "_retro_get_memory_size")]
                pub fn retro_get_memory_size(id: c_uint) -> usize;
            }

            pub fn api() -> $crate::api::CoreApi {
                $crate::api::CoreApi {
                    retro_set_environment,
                    retro_set_video_refresh,
                    retro_set_audio_sample,
                    retro_set_audio_sample_batch,
                    retro_set_input_poll,
                    retro_set_input_state,
                    retro_init,
                    retro_deinit,
                    retro_api_version,
                    retro_get_system_info,
                    retro_get_system_av_info,
                    retro_set_controller_port_device,
                    retro_reset,
                    retro_run,
                    retro_serialize_size,
                    retro_serialize,
                    retro_unserialize,
                    retro_cheat_reset,
                    retro_cheat_set,
                    retro_load_game,
                    retro_load_game_special,
                    retro_unload_game,
                    retro_get_region,
                    retro_get_memory_data,
                    retro_get_memory_size,
                }
            }
        }
    };
}

#[cfg(any(feature = "static-fceumm", feature = "static-all"))]
declare_libretro_core!(fceumm);
#[cfg(any(feature = "static-gambatte", feature = "static-all"))]
declare_libretro_core!(gambatte);
#[cfg(any(feature = "static-mgba", feature = "static-all"))]
declare_libretro_core!(mgba);
#[cfg(any(feature = "static-clownmdemu", feature = "static-all"))]
declare_libretro_core!(clownmdemu);
#[cfg(any(feature = "static-melonds", feature = "static-all"))]
declare_libretro_core!(melonds);
#[cfg(any(feature = "static-mupen64plus_next", feature = "static-all"))]
declare_libretro_core!(mupen64plus_next);
#[cfg(any(feature = "static-pcsx_rearmed", feature = "static-all"))]
declare_libretro_core!(pcsx_rearmed);
#[cfg(any(feature = "static-bsnes", feature = "static-all"))]
declare_libretro_core!(bsnes);

// Some(api) when the feature for this core was enabled at build time
macro_rules! linked_api {
    ($feature:tt, $core:ident) => {{
        #[cfg(any(feature = $feature, feature = "static-all"))]
        let api = Some($core::api());
        #[cfg(not(any(feature = $feature, feature = "static-all")))]
        let api = None;
        api
    }};
}

/// Cores that can be linked into the binary under a symbol prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StaticCore {
    Fceumm,
    Gambatte,
    Mgba,
    ClownMdEmu,
    MelonDs,
    Mupen64PlusNext,
    PcsxRearmed,
    Bsnes,
}

impl StaticCore {
    pub const ALL: [StaticCore; 8] = [
        StaticCore::Fceumm,
        StaticCore::Gambatte,
        StaticCore::Mgba,
        StaticCore::ClownMdEmu,
        StaticCore::MelonDs,
        StaticCore::Mupen64PlusNext,
        StaticCore::PcsxRearmed,
        StaticCore::Bsnes,
    ];

    pub fn prefix(self) -> &'static str {
        match self {
            StaticCore::Fceumm => "fceumm",
            StaticCore::Gambatte => "gambatte",
            StaticCore::Mgba => "mgba",
            StaticCore::ClownMdEmu => "clownmdemu",
            StaticCore::MelonDs => "melonds",
            StaticCore::Mupen64PlusNext => "mupen64plus_next",
            StaticCore::PcsxRearmed => "pcsx_rearmed",
            StaticCore::Bsnes => "bsnes",
        }
    }

    pub fn from_name(name: &str) -> Option<StaticCore> {
        StaticCore::ALL
            .iter()
            .copied()
            .find(|c| c.prefix().eq_ignore_ascii_case(name))
    }

    /// Link name of a base `retro_*` function for this core.
    pub fn symbol(self, function: &str) -> String {
        symbol_name(Some(self.prefix()), function)
    }

    pub fn symbols(self) -> Vec<String> {
        CORE_FUNCTIONS.iter().map(|f| self.symbol(f)).collect()
    }

    /// Entry points of the core, None if it wasn't linked into this build.
    pub fn api(self) -> Option<CoreApi> {
        match self {
            StaticCore::Fceumm => linked_api!("static-fceumm", fceumm),
            StaticCore::Gambatte => linked_api!("static-gambatte", gambatte),
            StaticCore::Mgba => linked_api!("static-mgba", mgba),
            StaticCore::ClownMdEmu => linked_api!("static-clownmdemu", clownmdemu),
            StaticCore::MelonDs => linked_api!("static-melonds", melonds),
            StaticCore::Mupen64PlusNext => linked_api!("static-mupen64plus_next", mupen64plus_next),
            StaticCore::PcsxRearmed => linked_api!("static-pcsx_rearmed", pcsx_rearmed),
            StaticCore::Bsnes => linked_api!("static-bsnes", bsnes),
        }
    }

    pub fn is_linked(self) -> bool {
        self.api().is_some()
    }

    /// Every core compiled into this build.
    pub fn linked() -> Vec<StaticCore> {
        StaticCore::ALL
            .iter()
            .copied()
            .filter(|c| c.is_linked())
            .collect()
    }
}

impl fmt::Display for StaticCore {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.prefix())
    }
}
