// Copyright (C) 2010-2020 The RetroArch team
//
// ---------------------------------------------------------------------------------------
// The following license statement only applies to this libretro API header (libretro.h).
// ---------------------------------------------------------------------------------------
//
// Permission is hereby granted, free of charge,
// to any person obtaining a copy of this software and associated documentation files (the "Software"),
// to deal in the Software without restriction, including without limitation the rights to
// use, copy, modify, merge, publish, distribute, sublicense, and/or sell copies of the Software,
// and to permit persons to whom the Software is furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR IMPLIED,
// INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT.
// IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY,
// WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! Transcription of `libretro.h`, laid out the way bindgen emits it so the
//! rest of the frontend can use the C names directly.
//!
//! Every value here is frozen ABI. Append, never renumber.

use std::os::raw::{c_char, c_int, c_uint, c_void};

pub const RETRO_API_VERSION: c_uint = 1;

// Mutually exclusive pixel formats
pub type retro_pixel_format = c_uint;
pub const RETRO_PIXEL_FORMAT_0RGB1555: retro_pixel_format = 0;
pub const RETRO_PIXEL_FORMAT_XRGB8888: retro_pixel_format = 1;
pub const RETRO_PIXEL_FORMAT_RGB565: retro_pixel_format = 2;
pub const RETRO_PIXEL_FORMAT_UNKNOWN: retro_pixel_format = c_uint::MAX;

// Device types
pub const RETRO_DEVICE_TYPE_SHIFT: c_uint = 8;
pub const RETRO_DEVICE_MASK: c_uint = (1 << RETRO_DEVICE_TYPE_SHIFT) - 1;

pub const RETRO_DEVICE_NONE: c_uint = 0;
pub const RETRO_DEVICE_JOYPAD: c_uint = 1;
pub const RETRO_DEVICE_MOUSE: c_uint = 2;
pub const RETRO_DEVICE_KEYBOARD: c_uint = 3;
pub const RETRO_DEVICE_LIGHTGUN: c_uint = 4;
pub const RETRO_DEVICE_ANALOG: c_uint = 5;
pub const RETRO_DEVICE_POINTER: c_uint = 6;

/// `RETRO_DEVICE_SUBCLASS(base, id)`
pub const fn retro_device_subclass(base: c_uint, id: c_uint) -> c_uint {
    ((id + 1) << RETRO_DEVICE_TYPE_SHIFT) | base
}

// Joypad buttons
pub const RETRO_DEVICE_ID_JOYPAD_B: c_uint = 0;
pub const RETRO_DEVICE_ID_JOYPAD_Y: c_uint = 1;
pub const RETRO_DEVICE_ID_JOYPAD_SELECT: c_uint = 2;
pub const RETRO_DEVICE_ID_JOYPAD_START: c_uint = 3;
pub const RETRO_DEVICE_ID_JOYPAD_UP: c_uint = 4;
pub const RETRO_DEVICE_ID_JOYPAD_DOWN: c_uint = 5;
pub const RETRO_DEVICE_ID_JOYPAD_LEFT: c_uint = 6;
pub const RETRO_DEVICE_ID_JOYPAD_RIGHT: c_uint = 7;
pub const RETRO_DEVICE_ID_JOYPAD_A: c_uint = 8;
pub const RETRO_DEVICE_ID_JOYPAD_X: c_uint = 9;
pub const RETRO_DEVICE_ID_JOYPAD_L: c_uint = 10;
pub const RETRO_DEVICE_ID_JOYPAD_R: c_uint = 11;
pub const RETRO_DEVICE_ID_JOYPAD_L2: c_uint = 12;
pub const RETRO_DEVICE_ID_JOYPAD_R2: c_uint = 13;
pub const RETRO_DEVICE_ID_JOYPAD_L3: c_uint = 14;
pub const RETRO_DEVICE_ID_JOYPAD_R3: c_uint = 15;
pub const RETRO_DEVICE_ID_JOYPAD_MASK: c_uint = 256;

// Analog indices
pub const RETRO_DEVICE_INDEX_ANALOG_LEFT: c_uint = 0;
pub const RETRO_DEVICE_INDEX_ANALOG_RIGHT: c_uint = 1;
pub const RETRO_DEVICE_INDEX_ANALOG_BUTTON: c_uint = 2;
pub const RETRO_DEVICE_ID_ANALOG_X: c_uint = 0;
pub const RETRO_DEVICE_ID_ANALOG_Y: c_uint = 1;

// Mouse
pub const RETRO_DEVICE_ID_MOUSE_X: c_uint = 0;
pub const RETRO_DEVICE_ID_MOUSE_Y: c_uint = 1;
pub const RETRO_DEVICE_ID_MOUSE_LEFT: c_uint = 2;
pub const RETRO_DEVICE_ID_MOUSE_RIGHT: c_uint = 3;
pub const RETRO_DEVICE_ID_MOUSE_WHEELUP: c_uint = 4;
pub const RETRO_DEVICE_ID_MOUSE_WHEELDOWN: c_uint = 5;
pub const RETRO_DEVICE_ID_MOUSE_MIDDLE: c_uint = 6;
pub const RETRO_DEVICE_ID_MOUSE_HORIZ_WHEELUP: c_uint = 7;
pub const RETRO_DEVICE_ID_MOUSE_HORIZ_WHEELDOWN: c_uint = 8;
pub const RETRO_DEVICE_ID_MOUSE_BUTTON_4: c_uint = 9;
pub const RETRO_DEVICE_ID_MOUSE_BUTTON_5: c_uint = 10;

// Lightgun
pub const RETRO_DEVICE_ID_LIGHTGUN_SCREEN_X: c_uint = 13;
pub const RETRO_DEVICE_ID_LIGHTGUN_SCREEN_Y: c_uint = 14;
pub const RETRO_DEVICE_ID_LIGHTGUN_IS_OFFSCREEN: c_uint = 15;
pub const RETRO_DEVICE_ID_LIGHTGUN_TRIGGER: c_uint = 2;
pub const RETRO_DEVICE_ID_LIGHTGUN_RELOAD: c_uint = 16;
pub const RETRO_DEVICE_ID_LIGHTGUN_AUX_A: c_uint = 3;
pub const RETRO_DEVICE_ID_LIGHTGUN_AUX_B: c_uint = 4;
pub const RETRO_DEVICE_ID_LIGHTGUN_START: c_uint = 6;
pub const RETRO_DEVICE_ID_LIGHTGUN_SELECT: c_uint = 7;
pub const RETRO_DEVICE_ID_LIGHTGUN_AUX_C: c_uint = 8;
pub const RETRO_DEVICE_ID_LIGHTGUN_DPAD_UP: c_uint = 9;
pub const RETRO_DEVICE_ID_LIGHTGUN_DPAD_DOWN: c_uint = 10;
pub const RETRO_DEVICE_ID_LIGHTGUN_DPAD_LEFT: c_uint = 11;
pub const RETRO_DEVICE_ID_LIGHTGUN_DPAD_RIGHT: c_uint = 12;
// Deprecated relative lightgun ids
pub const RETRO_DEVICE_ID_LIGHTGUN_X: c_uint = 0;
pub const RETRO_DEVICE_ID_LIGHTGUN_Y: c_uint = 1;
pub const RETRO_DEVICE_ID_LIGHTGUN_PAUSE: c_uint = 5;

// Pointer
pub const RETRO_DEVICE_ID_POINTER_X: c_uint = 0;
pub const RETRO_DEVICE_ID_POINTER_Y: c_uint = 1;
pub const RETRO_DEVICE_ID_POINTER_PRESSED: c_uint = 2;
pub const RETRO_DEVICE_ID_POINTER_COUNT: c_uint = 3;

// Environment command flags
pub const RETRO_ENVIRONMENT_EXPERIMENTAL: c_uint = 0x10000;
pub const RETRO_ENVIRONMENT_PRIVATE: c_uint = 0x20000;

// Environment commands
pub const RETRO_ENVIRONMENT_SET_ROTATION: c_uint = 1;
pub const RETRO_ENVIRONMENT_GET_OVERSCAN: c_uint = 2;
pub const RETRO_ENVIRONMENT_GET_CAN_DUPE: c_uint = 3;
pub const RETRO_ENVIRONMENT_SET_MESSAGE: c_uint = 6;
pub const RETRO_ENVIRONMENT_SHUTDOWN: c_uint = 7;
pub const RETRO_ENVIRONMENT_SET_PERFORMANCE_LEVEL: c_uint = 8;
pub const RETRO_ENVIRONMENT_GET_SYSTEM_DIRECTORY: c_uint = 9;
pub const RETRO_ENVIRONMENT_SET_PIXEL_FORMAT: c_uint = 10;
pub const RETRO_ENVIRONMENT_SET_INPUT_DESCRIPTORS: c_uint = 11;
pub const RETRO_ENVIRONMENT_SET_KEYBOARD_CALLBACK: c_uint = 12;
pub const RETRO_ENVIRONMENT_SET_DISK_CONTROL_INTERFACE: c_uint = 13;
pub const RETRO_ENVIRONMENT_SET_HW_RENDER: c_uint = 14;
pub const RETRO_ENVIRONMENT_GET_VARIABLE: c_uint = 15;
pub const RETRO_ENVIRONMENT_SET_VARIABLES: c_uint = 16;
pub const RETRO_ENVIRONMENT_GET_VARIABLE_UPDATE: c_uint = 17;
pub const RETRO_ENVIRONMENT_SET_SUPPORT_NO_GAME: c_uint = 18;
pub const RETRO_ENVIRONMENT_GET_LIBRETRO_PATH: c_uint = 19;
pub const RETRO_ENVIRONMENT_SET_FRAME_TIME_CALLBACK: c_uint = 21;
pub const RETRO_ENVIRONMENT_SET_AUDIO_CALLBACK: c_uint = 22;
pub const RETRO_ENVIRONMENT_GET_RUMBLE_INTERFACE: c_uint = 23;
pub const RETRO_ENVIRONMENT_GET_INPUT_DEVICE_CAPABILITIES: c_uint = 24;
pub const RETRO_ENVIRONMENT_GET_SENSOR_INTERFACE: c_uint = 25 | RETRO_ENVIRONMENT_EXPERIMENTAL;
pub const RETRO_ENVIRONMENT_GET_CAMERA_INTERFACE: c_uint = 26 | RETRO_ENVIRONMENT_EXPERIMENTAL;
pub const RETRO_ENVIRONMENT_GET_LOG_INTERFACE: c_uint = 27;
pub const RETRO_ENVIRONMENT_GET_PERF_INTERFACE: c_uint = 28;
pub const RETRO_ENVIRONMENT_GET_LOCATION_INTERFACE: c_uint = 29;
pub const RETRO_ENVIRONMENT_GET_CORE_ASSETS_DIRECTORY: c_uint = 30;
pub const RETRO_ENVIRONMENT_GET_SAVE_DIRECTORY: c_uint = 31;
pub const RETRO_ENVIRONMENT_SET_SYSTEM_AV_INFO: c_uint = 32;
pub const RETRO_ENVIRONMENT_SET_PROC_ADDRESS_CALLBACK: c_uint = 33;
pub const RETRO_ENVIRONMENT_SET_SUBSYSTEM_INFO: c_uint = 34;
pub const RETRO_ENVIRONMENT_SET_CONTROLLER_INFO: c_uint = 35;
pub const RETRO_ENVIRONMENT_SET_MEMORY_MAPS: c_uint = 36;
pub const RETRO_ENVIRONMENT_SET_GEOMETRY: c_uint = 37;
pub const RETRO_ENVIRONMENT_GET_USERNAME: c_uint = 38;
pub const RETRO_ENVIRONMENT_GET_LANGUAGE: c_uint = 39;
pub const RETRO_ENVIRONMENT_GET_CURRENT_SOFTWARE_FRAMEBUFFER: c_uint = 40;
pub const RETRO_ENVIRONMENT_GET_HW_RENDER_INTERFACE: c_uint = 41;
pub const RETRO_ENVIRONMENT_SET_SUPPORT_ACHIEVEMENTS: c_uint = 42;
pub const RETRO_ENVIRONMENT_SET_HW_RENDER_CONTEXT_NEGOTIATION_INTERFACE: c_uint = 43;
pub const RETRO_ENVIRONMENT_SET_SERIALIZATION_QUIRKS: c_uint = 44;
pub const RETRO_ENVIRONMENT_SET_HW_SHARED_CONTEXT: c_uint = 44 | RETRO_ENVIRONMENT_EXPERIMENTAL;
pub const RETRO_ENVIRONMENT_GET_VFS_INTERFACE: c_uint = 45;
pub const RETRO_ENVIRONMENT_GET_LED_INTERFACE: c_uint = 46;
pub const RETRO_ENVIRONMENT_GET_AUDIO_VIDEO_ENABLE: c_uint = 47;
pub const RETRO_ENVIRONMENT_GET_MIDI_INTERFACE: c_uint = 48;
pub const RETRO_ENVIRONMENT_GET_FASTFORWARDING: c_uint = 49;
pub const RETRO_ENVIRONMENT_GET_TARGET_REFRESH_RATE: c_uint = 50;
pub const RETRO_ENVIRONMENT_GET_INPUT_BITMASKS: c_uint = 51;
pub const RETRO_ENVIRONMENT_GET_CORE_OPTIONS_VERSION: c_uint = 52;
pub const RETRO_ENVIRONMENT_SET_CORE_OPTIONS: c_uint = 53;
pub const RETRO_ENVIRONMENT_SET_CORE_OPTIONS_INTL: c_uint = 54;
pub const RETRO_ENVIRONMENT_SET_CORE_OPTIONS_DISPLAY: c_uint = 55;
pub const RETRO_ENVIRONMENT_GET_PREFERRED_HW_RENDER: c_uint = 56;
pub const RETRO_ENVIRONMENT_GET_DISK_CONTROL_INTERFACE_VERSION: c_uint = 57;
pub const RETRO_ENVIRONMENT_SET_DISK_CONTROL_EXT_INTERFACE: c_uint = 58;
pub const RETRO_ENVIRONMENT_GET_MESSAGE_INTERFACE_VERSION: c_uint = 59;
pub const RETRO_ENVIRONMENT_SET_MESSAGE_EXT: c_uint = 60;
pub const RETRO_ENVIRONMENT_GET_INPUT_MAX_USERS: c_uint = 61;
pub const RETRO_ENVIRONMENT_SET_AUDIO_BUFFER_STATUS_CALLBACK: c_uint = 62;
pub const RETRO_ENVIRONMENT_SET_MINIMUM_AUDIO_LATENCY: c_uint = 63;
pub const RETRO_ENVIRONMENT_SET_FASTFORWARDING_OVERRIDE: c_uint = 64;
pub const RETRO_ENVIRONMENT_SET_CONTENT_INFO_OVERRIDE: c_uint = 65;
pub const RETRO_ENVIRONMENT_GET_GAME_INFO_EXT: c_uint = 66;
pub const RETRO_ENVIRONMENT_SET_CORE_OPTIONS_V2: c_uint = 67;
pub const RETRO_ENVIRONMENT_SET_CORE_OPTIONS_V2_INTL: c_uint = 68;
pub const RETRO_ENVIRONMENT_SET_CORE_OPTIONS_UPDATE_DISPLAY_CALLBACK: c_uint = 69;
pub const RETRO_ENVIRONMENT_SET_VARIABLE: c_uint = 70;
pub const RETRO_ENVIRONMENT_GET_THROTTLE_STATE: c_uint = 71;

// Language
pub type retro_language = c_uint;
pub const RETRO_LANGUAGE_ENGLISH: retro_language = 0;
pub const RETRO_LANGUAGE_JAPANESE: retro_language = 1;
pub const RETRO_LANGUAGE_FRENCH: retro_language = 2;
pub const RETRO_LANGUAGE_SPANISH: retro_language = 3;
pub const RETRO_LANGUAGE_GERMAN: retro_language = 4;
pub const RETRO_LANGUAGE_ITALIAN: retro_language = 5;
pub const RETRO_LANGUAGE_DUTCH: retro_language = 6;
pub const RETRO_LANGUAGE_PORTUGUESE_BRAZIL: retro_language = 7;
pub const RETRO_LANGUAGE_PORTUGUESE_PORTUGAL: retro_language = 8;
pub const RETRO_LANGUAGE_RUSSIAN: retro_language = 9;
pub const RETRO_LANGUAGE_KOREAN: retro_language = 10;
pub const RETRO_LANGUAGE_CHINESE_TRADITIONAL: retro_language = 11;
pub const RETRO_LANGUAGE_CHINESE_SIMPLIFIED: retro_language = 12;

// Memory types
pub const RETRO_MEMORY_MASK: c_uint = 0xff;
pub const RETRO_MEMORY_SAVE_RAM: c_uint = 0;
pub const RETRO_MEMORY_RTC: c_uint = 1;
pub const RETRO_MEMORY_SYSTEM_RAM: c_uint = 2;
pub const RETRO_MEMORY_VIDEO_RAM: c_uint = 3;

// Region
pub const RETRO_REGION_NTSC: c_uint = 0;
pub const RETRO_REGION_PAL: c_uint = 1;

// Serialization quirks
pub const RETRO_SERIALIZATION_QUIRK_INCOMPLETE: u64 = 1 << 0;
pub const RETRO_SERIALIZATION_QUIRK_MUST_INITIALIZE: u64 = 1 << 1;
pub const RETRO_SERIALIZATION_QUIRK_CORE_VARIABLE_SIZE: u64 = 1 << 2;
pub const RETRO_SERIALIZATION_QUIRK_FRONT_VARIABLE_SIZE: u64 = 1 << 3;
pub const RETRO_SERIALIZATION_QUIRK_SINGLE_SESSION: u64 = 1 << 4;
pub const RETRO_SERIALIZATION_QUIRK_ENDIAN_DEPENDENT: u64 = 1 << 5;
pub const RETRO_SERIALIZATION_QUIRK_PLATFORM_DEPENDENT: u64 = 1 << 6;

pub const RETRO_NUM_CORE_OPTION_VALUES_MAX: usize = 128;

// Log levels
pub type retro_log_level = c_uint;
pub const retro_log_level_RETRO_LOG_DEBUG: retro_log_level = 0;
pub const retro_log_level_RETRO_LOG_INFO: retro_log_level = 1;
pub const retro_log_level_RETRO_LOG_WARN: retro_log_level = 2;
pub const retro_log_level_RETRO_LOG_ERROR: retro_log_level = 3;
pub const retro_log_level_RETRO_LOG_DUMMY: retro_log_level = c_int::MAX as c_uint;

/// Game info passed to retro_load_game()
#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct retro_game_info {
    pub path: *const c_char,
    pub data: *const c_void,
    pub size: usize,
    pub meta: *const c_char,
}

/// System info returned by retro_get_system_info()
#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct retro_system_info {
    pub library_name: *const c_char,
    pub library_version: *const c_char,
    pub valid_extensions: *const c_char,
    pub need_fullpath: bool,
    pub block_extract: bool,
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct retro_game_geometry {
    pub base_width: c_uint,
    pub base_height: c_uint,
    pub max_width: c_uint,
    pub max_height: c_uint,
    pub aspect_ratio: f32,
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct retro_system_timing {
    pub fps: f64,
    pub sample_rate: f64,
}

/// Audio/Video info returned by retro_get_system_av_info()
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct retro_system_av_info {
    pub geometry: retro_game_geometry,
    pub timing: retro_system_timing,
}

/// Variable for core options
#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct retro_variable {
    pub key: *const c_char,
    pub value: *const c_char,
}

pub type retro_log_printf_t =
    Option<unsafe extern "C" fn(level: retro_log_level, fmt: *const c_char, ...)>;

#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct retro_log_callback {
    pub log: retro_log_printf_t,
}

#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct retro_message {
    pub msg: *const c_char,
    pub frames: c_uint,
}

pub type retro_message_target = c_uint;
pub const retro_message_target_RETRO_MESSAGE_TARGET_ALL: retro_message_target = 0;
pub const retro_message_target_RETRO_MESSAGE_TARGET_OSD: retro_message_target = 1;
pub const retro_message_target_RETRO_MESSAGE_TARGET_LOG: retro_message_target = 2;

pub type retro_message_type = c_uint;
pub const retro_message_type_RETRO_MESSAGE_TYPE_NOTIFICATION: retro_message_type = 0;
pub const retro_message_type_RETRO_MESSAGE_TYPE_NOTIFICATION_ALT: retro_message_type = 1;
pub const retro_message_type_RETRO_MESSAGE_TYPE_STATUS: retro_message_type = 2;
pub const retro_message_type_RETRO_MESSAGE_TYPE_PROGRESS: retro_message_type = 3;

#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct retro_message_ext {
    pub msg: *const c_char,
    pub duration: c_uint,
    pub priority: c_uint,
    pub level: retro_log_level,
    pub target: retro_message_target,
    pub type_: retro_message_type,
    pub progress: i8,
}

#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct retro_input_descriptor {
    pub port: c_uint,
    pub device: c_uint,
    pub index: c_uint,
    pub id: c_uint,
    pub description: *const c_char,
}

#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct retro_controller_description {
    pub desc: *const c_char,
    pub id: c_uint,
}

#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct retro_controller_info {
    pub types: *const retro_controller_description,
    pub num_types: c_uint,
}

#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct retro_memory_descriptor {
    pub flags: u64,
    pub ptr: *mut c_void,
    pub offset: usize,
    pub start: usize,
    pub select: usize,
    pub disconnect: usize,
    pub len: usize,
    pub addrspace: *const c_char,
}

#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct retro_memory_map {
    pub descriptors: *const retro_memory_descriptor,
    pub num_descriptors: c_uint,
}

#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct retro_core_option_value {
    pub value: *const c_char,
    pub label: *const c_char,
}

#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct retro_core_option_definition {
    pub key: *const c_char,
    pub desc: *const c_char,
    pub info: *const c_char,
    pub values: [retro_core_option_value; RETRO_NUM_CORE_OPTION_VALUES_MAX],
    pub default_value: *const c_char,
}

#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct retro_core_options_intl {
    pub us: *mut retro_core_option_definition,
    pub local: *mut retro_core_option_definition,
}

#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct retro_core_option_display {
    pub key: *const c_char,
    pub visible: bool,
}

#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct retro_system_content_info_override {
    pub extensions: *const c_char,
    pub need_fullpath: bool,
    pub persistent_data: bool,
}

pub type retro_usec_t = i64;
pub type retro_frame_time_callback_t = Option<unsafe extern "C" fn(usec: retro_usec_t)>;

#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct retro_frame_time_callback {
    pub callback: retro_frame_time_callback_t,
    pub reference: retro_usec_t,
}

// Callbacks set by frontend
pub type retro_environment_t = Option<unsafe extern "C" fn(cmd: c_uint, data: *mut c_void) -> bool>;
pub type retro_video_refresh_t =
    Option<unsafe extern "C" fn(data: *const c_void, width: c_uint, height: c_uint, pitch: usize)>;
pub type retro_audio_sample_t = Option<unsafe extern "C" fn(left: i16, right: i16)>;
pub type retro_audio_sample_batch_t =
    Option<unsafe extern "C" fn(data: *const i16, frames: usize) -> usize>;
pub type retro_input_poll_t = Option<unsafe extern "C" fn()>;
pub type retro_input_state_t =
    Option<unsafe extern "C" fn(port: c_uint, device: c_uint, index: c_uint, id: c_uint) -> i16>;
