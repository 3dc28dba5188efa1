use log::{debug, error, warn};
use std::collections::{BTreeMap, HashSet};
use std::os::raw::c_char;
use std::path::Path;
use std::sync::mpsc;

use yearn_core::config::Config;
use yearn_core::portable::{PStr, PStringError, PString};
use yearn_core::problem::Problem;
use yearn_core::MAX_PORTS;
use yearn_libretrobind::bind::{
    retro_frame_time_callback, RETRO_DEVICE_ID_JOYPAD_MASK, RETRO_SERIALIZATION_QUIRK_CORE_VARIABLE_SIZE,
    RETRO_SERIALIZATION_QUIRK_ENDIAN_DEPENDENT, RETRO_SERIALIZATION_QUIRK_FRONT_VARIABLE_SIZE,
    RETRO_SERIALIZATION_QUIRK_INCOMPLETE, RETRO_SERIALIZATION_QUIRK_MUST_INITIALIZE,
    RETRO_SERIALIZATION_QUIRK_PLATFORM_DEPENDENT, RETRO_SERIALIZATION_QUIRK_SINGLE_SESSION,
};
use yearn_libretrobind::enums::{RetroDevice, RetroPadButton, RetroPixelFormat};
use yearn_libretrobind::types::{RetroGameGeometry, RetroSystemAvInfo, RetroSystemTiming};

use crate::vars::RetroVars;

/// Rate assumed before the core reports one
pub const DEFAULT_FPS: f64 = 60.0;

const KNOWN_QUIRKS: u64 = RETRO_SERIALIZATION_QUIRK_INCOMPLETE
    | RETRO_SERIALIZATION_QUIRK_MUST_INITIALIZE
    | RETRO_SERIALIZATION_QUIRK_CORE_VARIABLE_SIZE
    | RETRO_SERIALIZATION_QUIRK_FRONT_VARIABLE_SIZE
    | RETRO_SERIALIZATION_QUIRK_SINGLE_SESSION
    | RETRO_SERIALIZATION_QUIRK_ENDIAN_DEPENDENT
    | RETRO_SERIALIZATION_QUIRK_PLATFORM_DEPENDENT;

#[derive(PartialEq, Eq, Hash)]
pub enum ProxyWarning {
    DevicePort,
    DeviceType,
    VideoSize,
}

/// Last frame the core presented.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub pitch: usize,
    pub data: Vec<u8>,
}

/// Frontend state reachable from the core's callbacks.
pub struct RetroProxy {
    system_dir: PString,
    save_dir: PString,
    libretro_path: Option<PString>,
    username: PString,
    language: u32,
    max_users: u32,
    error_channel: mpsc::Sender<Problem>,
    vars: RetroVars,
    overrides: BTreeMap<String, String>,
    audio_en: bool,
    video_en: bool,
    av: Option<RetroSystemAvInfo>,
    pixel_format: RetroPixelFormat,
    rotation: u32,
    frame: Frame,
    frames: u64,
    dupes: u64,
    audio: Vec<i16>,
    pads: [u16; MAX_PORTS],
    shutdown: bool,
    frame_time: Option<retro_frame_time_callback>,
    support_no_game: bool,
    support_achievements: bool,
    quirks: u64,
    min_audio_latency: u32,
    warnings: HashSet<ProxyWarning>,
}

impl RetroProxy {
    /// `libretro_path` is the shared library the core came from, None for
    /// cores linked into the binary.
    pub fn new(
        config: &Config,
        libretro_path: Option<&Path>,
        error_channel: mpsc::Sender<Problem>,
    ) -> Result<Self, PStringError> {
        Ok(RetroProxy {
            system_dir: PString::from_path(&config.system_dir)?,
            save_dir: PString::from_path(&config.save_dir)?,
            libretro_path: libretro_path.map(PString::from_path).transpose()?,
            username: config.username.parse()?,
            language: config.language,
            max_users: config.max_users,
            error_channel,
            vars: RetroVars::new(),
            overrides: config.options.clone(),
            audio_en: true,
            video_en: true,
            av: None,
            pixel_format: RetroPixelFormat::Xrgb1555,
            rotation: 0,
            frame: Frame::default(),
            frames: 0,
            dupes: 0,
            audio: Vec::new(),
            pads: [0; MAX_PORTS],
            shutdown: false,
            frame_time: None,
            support_no_game: false,
            support_achievements: false,
            quirks: 0,
            min_audio_latency: 0,
            warnings: HashSet::new(),
        })
    }

    pub fn problem(&mut self, p: Problem) {
        if let Err(e) = self.error_channel.send(p) {
            error!("Failed to send to problem channel: {}", e);
        }
    }

    pub fn sys_dir(&self) -> &PString {
        &self.system_dir
    }

    pub fn save_dir(&self) -> &PString {
        &self.save_dir
    }

    pub fn libretro_path(&self) -> Option<&PString> {
        self.libretro_path.as_ref()
    }

    pub fn username(&self) -> &PString {
        &self.username
    }

    pub fn language(&self) -> u32 {
        self.language
    }

    pub fn max_users(&self) -> u32 {
        self.max_users
    }

    pub fn vars(&self) -> &RetroVars {
        &self.vars
    }

    pub fn add_var_v0(&mut self, key: &PStr, descr: &PStr) {
        self.vars.add_v0(key, descr);
    }

    pub fn add_var_v1(
        &mut self,
        key: &PStr,
        descr: &PStr,
        info: Option<&PStr>,
        values: &[(PStr, Option<PStr>)],
        default: Option<&PStr>,
    ) {
        self.vars.add_v1(key, descr, info, values, default);
    }

    /// Called once a core has declared its options.
    pub fn vars_declared(&mut self) {
        self.vars.apply_overrides(&self.overrides);
        self.vars.log_vars();
    }

    pub fn get_var(&self, k: &str) -> Option<*const c_char> {
        self.vars.get_var(k)
    }

    pub fn var_value(&self, k: &str) -> Option<&str> {
        self.vars.get(k).map(|v| v.value())
    }

    pub fn vars_updated(&mut self) -> bool {
        self.vars.updated()
    }

    pub fn set_var(&mut self, k: &str, v: &PStr) -> bool {
        self.vars.set_val(k, v)
    }

    pub fn set_var_visible(&mut self, k: &str, v: bool) -> bool {
        self.vars.set_visible(k, v)
    }

    pub fn audio_enabled(&self) -> bool {
        self.audio_en
    }

    pub fn video_enabled(&self) -> bool {
        self.video_en
    }

    pub fn set_av_enabled(&mut self, video: bool, audio: bool) {
        self.video_en = video;
        self.audio_en = audio;
    }

    pub fn get_av(&self) -> Option<RetroSystemAvInfo> {
        self.av
    }

    pub fn set_av(&mut self, av: Option<RetroSystemAvInfo>) {
        self.av = av;
    }

    pub fn set_geometry(&mut self, geometry: RetroGameGeometry) {
        match self.av.as_mut() {
            Some(av) => av.geometry = geometry,
            None => {
                self.av = Some(RetroSystemAvInfo {
                    geometry,
                    timing: RetroSystemTiming {
                        fps: 0.0,
                        sample_rate: 0.0,
                    },
                })
            }
        }
    }

    /// Frame rate the core runs at, `DEFAULT_FPS` if it hasn't said.
    pub fn fps(&self) -> f64 {
        match self.av {
            Some(av) if av.timing.fps > 0.0 => av.timing.fps,
            _ => DEFAULT_FPS,
        }
    }

    pub fn pixel_format(&self) -> RetroPixelFormat {
        self.pixel_format
    }

    pub fn set_pixel_format(&mut self, fmt: RetroPixelFormat) {
        debug!("Set pixel format to {:?}", fmt);
        self.pixel_format = fmt;
    }

    pub fn rotation(&self) -> u32 {
        self.rotation
    }

    /// Rotation in 90 degree steps counter-clockwise, 0 to 3.
    pub fn set_rotation(&mut self, rotation: u32) -> bool {
        if rotation > 3 {
            warn!("Invalid rotation {}", rotation);
            false
        } else {
            debug!("Rotation set to {} degrees", rotation * 90);
            self.rotation = rotation;
            true
        }
    }

    pub fn request_shutdown(&mut self) {
        debug!("Core requested shutdown");
        self.shutdown = true;
    }

    pub fn shutdown_requested(&self) -> bool {
        self.shutdown
    }

    pub fn set_frame_time_callback(&mut self, cb: retro_frame_time_callback) {
        debug!("Frame time callback, reference {}us", cb.reference);
        self.frame_time = if cb.callback.is_some() { Some(cb) } else { None };
    }

    pub fn frame_time_callback(&self) -> Option<retro_frame_time_callback> {
        self.frame_time
    }

    pub fn set_support_no_game(&mut self, supported: bool) {
        self.support_no_game = supported;
    }

    pub fn supports_no_game(&self) -> bool {
        self.support_no_game
    }

    pub fn set_support_achievements(&mut self, supported: bool) {
        self.support_achievements = supported;
    }

    pub fn supports_achievements(&self) -> bool {
        self.support_achievements
    }

    /// Record the core's quirks, returning the subset the frontend knows.
    pub fn set_serialization_quirks(&mut self, quirks: u64) -> u64 {
        let known = quirks & KNOWN_QUIRKS;
        if known != quirks {
            debug!("Ignoring unknown serialization quirks {:#x}", quirks & !KNOWN_QUIRKS);
        }
        self.quirks = known;
        known
    }

    pub fn serialization_quirks(&self) -> u64 {
        self.quirks
    }

    pub fn set_min_audio_latency(&mut self, ms: u32) {
        self.min_audio_latency = ms;
    }

    pub fn min_audio_latency(&self) -> u32 {
        self.min_audio_latency
    }

    /// Retropad state for `port`, one bit per `RetroPadButton`.
    pub fn set_pad(&mut self, port: usize, bits: u16) {
        if let Some(p) = self.pads.get_mut(port) {
            *p = bits;
        }
    }

    pub fn press(&mut self, port: usize, button: RetroPadButton) {
        if let Some(p) = self.pads.get_mut(port) {
            *p |= button.bit();
        }
    }

    pub fn release(&mut self, port: usize, button: RetroPadButton) {
        if let Some(p) = self.pads.get_mut(port) {
            *p &= !button.bit();
        }
    }

    pub fn input_poll(&mut self) {
        // State is pushed by the frontend with set_pad/press/release
    }

    pub fn input_state(&mut self, port: u32, device: u32, _index: u32, id: u32) -> i16 {
        let bits = match self.pads.get(port as usize) {
            Some(b) => *b,
            None => {
                self.warn_once(ProxyWarning::DevicePort, &format!("Unsupported port {}", port));
                return 0;
            }
        };
        match RetroDevice::new(device) {
            RetroDevice::RetroPad if id == RETRO_DEVICE_ID_JOYPAD_MASK => bits as i16,
            RetroDevice::RetroPad => (bits & RetroPadButton::new(id).bit() != 0) as i16,
            // Centred sticks
            RetroDevice::Analog => 0,
            other => {
                self.warn_once(
                    ProxyWarning::DeviceType,
                    &format!("Unsupported input device {}", other),
                );
                0
            }
        }
    }

    /// Store a frame, None is a dupe of the previous one.
    pub fn video_refresh(&mut self, data: Option<&[u8]>, width: u32, height: u32, pitch: usize) {
        self.frames += 1;
        match data {
            Some(d) => {
                let row = width as usize * self.pixel_format.bytes_per_pixel();
                if row > pitch {
                    self.warn_once(
                        ProxyWarning::VideoSize,
                        &format!("Pitch {} too small for {} pixels", pitch, width),
                    );
                }
                self.frame.width = width;
                self.frame.height = height;
                self.frame.pitch = pitch;
                self.frame.data.clear();
                self.frame.data.extend_from_slice(d);
            }
            None => self.dupes += 1,
        }
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    /// (frames presented, of which dupes)
    pub fn frame_counts(&self) -> (u64, u64) {
        (self.frames, self.dupes)
    }

    pub fn audio_sample(&mut self, left: i16, right: i16) {
        if self.audio_en {
            self.audio.push(left);
            self.audio.push(right);
        }
    }

    pub fn audio_batch(&mut self, samples: &[i16]) {
        if self.audio_en {
            self.audio.extend_from_slice(samples);
        }
    }

    /// Interleaved stereo samples since the last call.
    pub fn take_audio(&mut self) -> Vec<i16> {
        std::mem::take(&mut self.audio)
    }

    pub fn warn_once(&mut self, kind: ProxyWarning, msg: &str) {
        if !self.warnings.contains(&kind) {
            warn!("{}", msg);
            self.warnings.insert(kind);
        }
    }
}
