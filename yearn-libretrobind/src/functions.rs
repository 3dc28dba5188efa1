use log::{debug, trace};
use std::error::Error;
use std::ffi::OsStr;
use std::os::raw::c_void;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use yearn_core::error::YearnError;
use yearn_core::portable::{PString, PStringError};
use yearn_core::RetroSystemInfo;

use crate::api::CoreApi;
use crate::bind::{retro_game_info, retro_system_av_info, retro_system_info, RETRO_API_VERSION};
use crate::enums::{RetroMemory, RetroRegion};
use crate::error::BindError;
use crate::types::*;

pub fn get_system_info(api: &CoreApi) -> Result<RetroSystemInfo, Box<dyn Error>> {
    unsafe {
        let mut info: retro_system_info = std::mem::zeroed();
        (api.retro_get_system_info)(&mut info as *mut retro_system_info);
        // Cores may leave the extension list unset when they take no content
        let library_name = PString::from_ptr(info.library_name)?.into();
        let library_version = PString::from_ptr(info.library_version)?.into();
        let valid_extensions = match PString::from_ptr(info.valid_extensions) {
            Ok(e) => e.into(),
            Err(PStringError::Null) => String::new(),
            Err(e) => return Err(Box::new(e)),
        };
        Ok(RetroSystemInfo {
            library_name,
            library_version,
            valid_extensions,
            need_fullpath: info.need_fullpath,
            block_extract: info.block_extract,
        })
    }
}

pub fn get_system_av_info(api: &CoreApi) -> RetroSystemAvInfo {
    unsafe {
        let mut info: retro_system_av_info = std::mem::zeroed();
        (api.retro_get_system_av_info)(&mut info as *mut retro_system_av_info);
        info.into()
    }
}

pub fn frontend_api_version() -> u32 {
    RETRO_API_VERSION
}

pub fn api_version(api: &CoreApi) -> u32 {
    unsafe { (api.retro_api_version)() }
}

/// Check the core was built against the same API as the frontend.
pub fn check_api_version(api: &CoreApi) -> Result<(), YearnError> {
    let got = api_version(api);
    let expected = frontend_api_version();
    if got == expected {
        Ok(())
    } else {
        Err(YearnError::ApiVersion { expected, got })
    }
}

pub fn init(api: &CoreApi) {
    unsafe { (api.retro_init)() }
}

pub fn deinit(api: &CoreApi) {
    unsafe { (api.retro_deinit)() }
}

pub fn run(api: &CoreApi) {
    unsafe { (api.retro_run)() }
}

pub fn reset(api: &CoreApi) {
    unsafe { (api.retro_reset)() }
}

pub fn unload_game(api: &CoreApi) {
    unsafe { (api.retro_unload_game)() }
}

/// Content handed to `retro_load_game`.
///
/// Owns every string and buffer the raw `retro_game_info` points at, so the
/// raw view is valid for as long as this lives.
pub struct RetroGameInfo {
    path: Option<PString>,
    data: Option<Vec<u8>>,
    meta: Option<PString>,
}

impl RetroGameInfo {
    pub fn new(path: &Path) -> Result<Self, PStringError> {
        Ok(RetroGameInfo {
            path: Some(PString::from_path(path)?),
            data: None,
            meta: None,
        })
    }

    /// Content that only exists in memory.
    pub fn from_data(data: Vec<u8>) -> Self {
        RetroGameInfo {
            path: None,
            data: Some(data),
            meta: None,
        }
    }

    pub fn with_meta(mut self, meta: &str) -> Result<Self, PStringError> {
        self.meta = Some(PString::from_str(meta)?);
        Ok(self)
    }

    /// Read the file at `path` into memory, unless it's already loaded.
    pub fn read_content(&mut self) -> std::io::Result<()> {
        if self.data.is_some() {
            return Ok(());
        }
        if let Some(path) = &self.path {
            let data = std::fs::read(path.to_str())?;
            debug!("Read {} bytes of content", data.len());
            self.data = Some(data);
        }
        Ok(())
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_ref().map(|p| p.to_str())
    }

    pub fn data(&self) -> Option<&[u8]> {
        self.data.as_deref()
    }

    pub fn as_raw(&self) -> retro_game_info {
        let (data, size) = match &self.data {
            Some(d) => (d.as_ptr() as *const c_void, d.len()),
            None => (std::ptr::null(), 0),
        };
        retro_game_info {
            path: self
                .path
                .as_ref()
                .map(|p| p.as_ptr())
                .unwrap_or(std::ptr::null()),
            data,
            size,
            meta: self
                .meta
                .as_ref()
                .map(|m| m.as_ptr())
                .unwrap_or(std::ptr::null()),
        }
    }
}

/// Load content, reading it into memory first unless the core wants to open
/// the file itself. `None` starts the core without content.
pub fn load_game(
    api: &CoreApi,
    info: &RetroSystemInfo,
    game_info: Option<&mut RetroGameInfo>,
) -> Result<bool, Box<dyn Error>> {
    match game_info {
        Some(game) => {
            if !info.need_fullpath {
                game.read_content()?;
            }
            let c_info = game.as_raw();
            trace!("retro_load_game {:?}", c_info);
            Ok(unsafe { (api.retro_load_game)(&c_info as *const retro_game_info) })
        }
        None => Ok(unsafe { (api.retro_load_game)(std::ptr::null()) }),
    }
}

pub fn load_game_special(api: &CoreApi, game_type: u32, games: &[RetroGameInfo]) -> bool {
    let raw: Vec<retro_game_info> = games.iter().map(|g| g.as_raw()).collect();
    unsafe { (api.retro_load_game_special)(game_type, raw.as_ptr(), raw.len()) }
}

pub fn set_controller_port_device(api: &CoreApi, port: u32, device: u32) {
    unsafe { (api.retro_set_controller_port_device)(port, device) }
}

pub fn serialize_size(api: &CoreApi) -> usize {
    unsafe { (api.retro_serialize_size)() }
}

/// Snapshot the running core.
///
/// The buffer is sized from `retro_serialize_size` immediately before the
/// call.
pub fn serialize(api: &CoreApi) -> Result<Vec<u8>, YearnError> {
    let size = serialize_size(api);
    if size == 0 {
        return Err(YearnError::SerializeUnsupported);
    }
    let mut buffer = vec![0u8; size];
    let ok = unsafe { (api.retro_serialize)(buffer.as_mut_ptr() as *mut c_void, size) };
    if ok {
        Ok(buffer)
    } else {
        Err(YearnError::SerializeFailed)
    }
}

pub fn unserialize(api: &CoreApi, data: &[u8]) -> Result<(), YearnError> {
    let ok = unsafe { (api.retro_unserialize)(data.as_ptr() as *const c_void, data.len()) };
    if ok {
        Ok(())
    } else {
        Err(YearnError::UnserializeFailed)
    }
}

pub fn cheat_reset(api: &CoreApi) {
    unsafe { (api.retro_cheat_reset)() }
}

pub fn cheat_set(api: &CoreApi, index: u32, enabled: bool, code: &str) -> Result<(), PStringError> {
    let code = PString::from_str(code)?;
    unsafe { (api.retro_cheat_set)(index, enabled, code.as_ptr()) };
    Ok(())
}

/// Raw region id, see `RetroRegion` for the known values.
pub fn get_region(api: &CoreApi) -> u32 {
    unsafe { (api.retro_get_region)() }
}

pub fn region(api: &CoreApi) -> Option<RetroRegion> {
    RetroRegion::new(get_region(api))
}

pub fn get_memory_size(api: &CoreApi, id: u32) -> usize {
    unsafe { (api.retro_get_memory_size)(id) }
}

pub fn get_memory_data(api: &CoreApi, id: u32) -> *mut c_void {
    unsafe { (api.retro_get_memory_data)(id) }
}

/// Borrow a memory region, None if the core doesn't expose it.
///
/// # Safety
///
/// The slice aliases core memory; it must not be held across calls that let
/// the core run, unload or reallocate the region.
pub unsafe fn memory<'a>(api: &CoreApi, region: RetroMemory) -> Option<&'a mut [u8]> {
    let size = get_memory_size(api, region.id());
    let data = get_memory_data(api, region.id());
    if size == 0 || data.is_null() {
        None
    } else {
        Some(std::slice::from_raw_parts_mut(data as *mut u8, size))
    }
}

// Libraries are not cached as this can cause problems with some emulators that
// don't reinitialise everything correctly causing broken audio etc.
pub fn load_library<P>(path: P) -> Result<Arc<libloading::Library>, BindError>
where
    P: AsRef<OsStr>,
{
    unsafe {
        let key = path.as_ref().to_str().ok_or(YearnError::String)?;
        debug!("Loading library: '{}'", key);
        let lib = libloading::Library::new(key)?;
        Ok(Arc::new(lib))
    }
}
