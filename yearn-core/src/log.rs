use log::log;
use num_derive::{FromPrimitive, ToPrimitive};
use num_traits::FromPrimitive;
use std::ffi::CStr;

// Mirrors enum retro_log_level without depending on the bindings crate.
#[repr(u32)]
#[derive(FromPrimitive, ToPrimitive, Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum LogLevel {
    Debug = 0,
    Info = 1,
    Warn = 2,
    Error = 3,
}

impl LogLevel {
    pub fn to_level(level: u32) -> log::Level {
        match FromPrimitive::from_u32(level) {
            Some(LogLevel::Debug) => log::Level::Debug,
            Some(LogLevel::Info) => log::Level::Info,
            Some(LogLevel::Warn) => log::Level::Warn,
            Some(LogLevel::Error) => log::Level::Error,
            None => log::Level::Warn,
        }
    }
}

/// Receives formatted core log messages from the C shim and forwards them to
/// the Rust logger.
///
/// # Safety
///
/// This function is unsafe for the same reasons as `CStr::from_ptr()`.
#[no_mangle]
pub unsafe extern "C" fn yearn_log(level: u32, msg: *const ::std::os::raw::c_char) {
    if msg.is_null() {
        return;
    }

    let l = LogLevel::to_level(level);
    let msg = CStr::from_ptr(msg).to_string_lossy();

    log!(target: "core", l, "{}", msg.trim_end_matches('\n'));
}

extern "C" {
    /// printf-style entry point handed to cores as `retro_log_printf_t`.
    pub fn yearn_log_shim(level: ::std::os::raw::c_uint, fmt: *const ::std::os::raw::c_char, ...);
}

#[cfg(test)]
mod tests {
    use super::LogLevel;

    #[test]
    fn maps_retro_levels() {
        assert_eq!(LogLevel::to_level(0), log::Level::Debug);
        assert_eq!(LogLevel::to_level(1), log::Level::Info);
        assert_eq!(LogLevel::to_level(2), log::Level::Warn);
        assert_eq!(LogLevel::to_level(3), log::Level::Error);
    }

    #[test]
    fn unknown_level_is_warn() {
        assert_eq!(LogLevel::to_level(i32::MAX as u32), log::Level::Warn);
        assert_eq!(LogLevel::to_level(4), log::Level::Warn);
    }
}
