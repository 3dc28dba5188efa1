use log::{debug, error, info, log, trace, warn};
use std::os::raw::{c_uint, c_void};
use std::time::Duration;

use yearn_core::log::{yearn_log_shim, LogLevel};
use yearn_core::portable::{PStr, PStringError};
use yearn_core::problem::{Notice, Problem};
use yearn_libretrobind::bind::{
    retro_controller_info, retro_core_option_definition, retro_input_descriptor, retro_memory_map,
    retro_message, retro_message_ext, retro_message_target_RETRO_MESSAGE_TARGET_LOG,
    retro_system_content_info_override, retro_variable, RETRO_DEVICE_ANALOG, RETRO_DEVICE_JOYPAD,
};
use yearn_libretrobind::enums::{identify_button, RetroDevice, RetroEnvironment, RetroPixelFormat};

use crate::environment::EnvRequest;
use crate::proxy::{RetroProxy, DEFAULT_FPS};

/// Version of the SET_MESSAGE_EXT interface
const MESSAGE_INTERFACE_VERSION: c_uint = 1;
/// Only v1 option definitions are understood
const CORE_OPTIONS_VERSION: c_uint = 1;

unsafe fn set_variables_v0(
    vars: &[retro_variable],
    proxy: &mut RetroProxy,
) -> Result<(), PStringError> {
    for var in vars {
        let key = PStr::from_ptr(var.key)?;
        let descr = PStr::from_ptr(var.value)?;
        proxy.add_var_v0(&key, &descr);
    }
    proxy.vars_declared();
    Ok(())
}

unsafe fn set_variables_v1(
    defs: &[retro_core_option_definition],
    proxy: &mut RetroProxy,
) -> Result<(), PStringError> {
    for def in defs {
        let key = PStr::from_ptr(def.key)?;
        let descr = PStr::from_ptr(def.desc)?;
        let info = PStr::from_ptr_opt(def.info)?;

        let mut values = Vec::new();
        for v in def.values.iter().take_while(|v| !v.value.is_null()) {
            values.push((PStr::from_ptr(v.value)?, PStr::from_ptr_opt(v.label)?));
        }

        let default = PStr::from_ptr_opt(def.default_value)?;
        proxy.add_var_v1(&key, &descr, info.as_ref(), &values, default.as_ref());
    }
    proxy.vars_declared();
    Ok(())
}

fn message_duration(frames: u32, proxy: &RetroProxy) -> Duration {
    Duration::try_from_secs_f64(frames as f64 / proxy.fps())
        .unwrap_or_else(|_| Duration::from_secs_f64(frames as f64 / DEFAULT_FPS))
}

unsafe fn set_message(msg: &retro_message, proxy: &mut RetroProxy) -> bool {
    match PStr::from_ptr(msg.msg) {
        Ok(message) => {
            debug!("'{}' for {} frames", message, msg.frames);
            let duration = message_duration(msg.frames, proxy);
            proxy.problem(Problem::notice(Notice::new(message.into(), duration)));
            true
        }
        Err(e) => {
            warn!("Bad message from core: {}", e);
            false
        }
    }
}

unsafe fn set_message_ext(msg: &retro_message_ext, proxy: &mut RetroProxy) -> bool {
    match PStr::from_ptr(msg.msg) {
        Ok(message) => {
            let level = LogLevel::to_level(msg.level);
            log!(target: "core", level, "{}", message);
            if msg.target != retro_message_target_RETRO_MESSAGE_TARGET_LOG {
                let mut notice = Notice::new(
                    message.into(),
                    Duration::from_millis(msg.duration as u64),
                );
                notice.priority = msg.priority;
                proxy.problem(Problem::notice(notice));
            }
            true
        }
        Err(e) => {
            warn!("Bad message from core: {}", e);
            false
        }
    }
}

/// Libretro Environment callback
///
/// # Safety
///
/// Safety depends on `data` matching the type expected by the command.
pub unsafe fn retro_environment_callback_inner(
    cmd: c_uint,
    data: *mut c_void,
    proxy: &mut RetroProxy,
) -> bool {
    match EnvRequest::decode(cmd, data) {
        Some(req) => dispatch(req, proxy),
        None => {
            error!("Unknown libretro environment command: {}", cmd);
            false
        }
    }
}

/// Handle one decoded environment request, true if it was handled.
///
/// # Safety
///
/// Strings and arrays reachable from the request must be valid, as they are
/// for requests made by `EnvRequest::decode`.
pub unsafe fn dispatch(req: EnvRequest, proxy: &mut RetroProxy) -> bool {
    trace!("Environment {:?}", req.command());
    match req {
        EnvRequest::SetRotation(r) => proxy.set_rotation(r),
        EnvRequest::GetOverscan(o) => {
            *o = false;
            true
        }
        EnvRequest::GetCanDupe(d) => {
            *d = true;
            true
        }
        EnvRequest::SetMessage(msg) => set_message(msg, proxy),
        EnvRequest::SetMessageExt(msg) => set_message_ext(msg, proxy),
        EnvRequest::GetMessageInterfaceVersion(v) => {
            *v = MESSAGE_INTERFACE_VERSION;
            true
        }
        EnvRequest::Shutdown => {
            proxy.request_shutdown();
            true
        }
        EnvRequest::SetPerformanceLevel(level) => {
            info!("Performance level: {}", level);
            true
        }
        EnvRequest::GetSystemDirectory(dir) | EnvRequest::GetCoreAssetsDirectory(dir) => {
            *dir = proxy.sys_dir().as_ptr();
            true
        }
        EnvRequest::GetSaveDirectory(dir) => {
            *dir = proxy.save_dir().as_ptr();
            true
        }
        EnvRequest::GetLibretroPath(path) => match proxy.libretro_path() {
            Some(p) => {
                *path = p.as_ptr();
                true
            }
            None => false,
        },
        EnvRequest::GetUsername(name) => {
            *name = proxy.username().as_ptr();
            true
        }
        EnvRequest::SetPixelFormat(fmt) => match RetroPixelFormat::new(fmt) {
            Some(f) => {
                proxy.set_pixel_format(f);
                true
            }
            None => {
                warn!("Tried to use unknown pixel format {}", fmt);
                false
            }
        },
        EnvRequest::SetInputDescriptors(descriptors) => {
            log_mappings(descriptors);
            true
        }
        EnvRequest::GetVariable(var) => match PStr::from_ptr(var.key) {
            Ok(key) => match proxy.get_var(key.as_str()) {
                Some(value) => {
                    var.value = value;
                    true
                }
                None => {
                    var.value = std::ptr::null();
                    false
                }
            },
            Err(_) => false,
        },
        EnvRequest::SetVariables(vars) => {
            debug!("Setting core options (v0)");
            set_variables_v0(vars, proxy)
                .map_err(|e| {
                    error!("Variable error: {}", e);
                })
                .is_ok()
        }
        EnvRequest::GetVariableUpdate(updated) => {
            *updated = proxy.vars_updated();
            if *updated {
                debug!("Variables updated");
            }
            true
        }
        EnvRequest::SetVariable(None) => {
            trace!("Set variable supported");
            // No update on null, just checking support
            true
        }
        EnvRequest::SetVariable(Some(var)) => {
            match (PStr::from_ptr(var.key), PStr::from_ptr(var.value)) {
                (Ok(key), Ok(val)) => proxy.set_var(key.as_str(), &val),
                _ => {
                    warn!("Set variable with invalid key or value");
                    false
                }
            }
        }
        EnvRequest::GetCoreOptionsVersion(v) => {
            *v = CORE_OPTIONS_VERSION;
            true
        }
        EnvRequest::SetCoreOptions(defs) => {
            debug!("Setting core options (v1)");
            set_variables_v1(defs, proxy)
                .map_err(|e| {
                    error!("Variable error: {}", e);
                })
                .is_ok()
        }
        EnvRequest::SetCoreOptionsIntl(defs) => {
            debug!("Setting core options (v1-intl)");
            set_variables_v1(defs, proxy)
                .map_err(|e| {
                    error!("Variable error: {}", e);
                })
                .is_ok()
        }
        EnvRequest::SetCoreOptionsDisplay(disp) => match PStr::from_ptr(disp.key) {
            Ok(key) => {
                proxy.set_var_visible(key.as_str(), disp.visible);
                true
            }
            Err(_) => false,
        },
        EnvRequest::SetSupportNoGame(s) => {
            proxy.set_support_no_game(s);
            true
        }
        EnvRequest::SetSupportAchievements(s) => {
            proxy.set_support_achievements(s);
            true
        }
        EnvRequest::SetFrameTimeCallback(cb) => {
            proxy.set_frame_time_callback(*cb);
            true
        }
        EnvRequest::GetInputDeviceCapabilities(caps) => {
            *caps = (1 << RETRO_DEVICE_JOYPAD) | (1 << RETRO_DEVICE_ANALOG);
            true
        }
        EnvRequest::GetLogInterface(cb) => {
            cb.log = Some(yearn_log_shim);
            true
        }
        EnvRequest::SetSystemAvInfo(av) => {
            debug!("New AV info {:?}", av);
            proxy.set_av(Some((*av).into()));
            true
        }
        EnvRequest::SetGeometry(geometry) => {
            debug!(
                "Geometry {}x{} (max {}x{})",
                geometry.base_width, geometry.base_height, geometry.max_width, geometry.max_height
            );
            proxy.set_geometry((*geometry).into());
            true
        }
        EnvRequest::SetControllerInfo(info) => {
            log_controllers(info);
            true
        }
        EnvRequest::SetMemoryMaps(maps) => {
            log_memory_map(maps);
            true
        }
        EnvRequest::SetContentInfoOverride(overrides) => {
            log_content_overrides(overrides);
            true
        }
        EnvRequest::GetLanguage(lang) => {
            *lang = proxy.language();
            true
        }
        EnvRequest::GetAudioVideoEnable(avint) => {
            let mut val = 0;
            // Bit 0 - Video enable
            if proxy.video_enabled() {
                val |= 1
            }
            // Bit 1 - Audio enable
            if proxy.audio_enabled() {
                val |= 2
            }
            *avint = val;
            true
        }
        EnvRequest::GetFastforwarding(ff) => {
            *ff = false;
            true
        }
        EnvRequest::GetTargetRefreshRate(rate) => {
            *rate = proxy.fps() as f32;
            true
        }
        EnvRequest::GetInputBitmasks => true,
        EnvRequest::GetInputMaxUsers(users) => {
            *users = proxy.max_users();
            true
        }
        EnvRequest::SetSerializationQuirks(quirks) => {
            *quirks = proxy.set_serialization_quirks(*quirks);
            true
        }
        EnvRequest::SetMinimumAudioLatency(ms) => {
            debug!("Minimum audio latency {}ms", ms);
            proxy.set_min_audio_latency(ms);
            true
        }
        EnvRequest::NullData(c) => {
            warn!("{:?} called without data", c);
            false
        }
        EnvRequest::Unsupported(c) => {
            let id = c.id();
            let e_str = if RetroEnvironment::is_experimental(id) {
                "Experimental"
            } else {
                "Stable"
            };
            let p_str = if RetroEnvironment::is_private(id) {
                "Private"
            } else {
                "Public"
            };
            warn!("Unsupported command: {:?} ({},{})", c, p_str, e_str);
            false
        }
    }
}

pub fn log_mappings(mappings: &[retro_input_descriptor]) {
    let mut lines = Vec::new();
    let mut col0 = 0;
    let mut col1 = 0;
    let mut col2 = 0;

    for mapping in mappings {
        let c0 = format!("{}", mapping.port);
        let c1 = RetroDevice::identify(mapping.device);
        let c2 = identify_button(mapping.device, mapping.id);
        let c3 = match unsafe { PStr::from_ptr(mapping.description) } {
            Ok(d) => d.to_string(),
            Err(_) => String::from("?"),
        };

        col0 = std::cmp::max(c0.len(), col0);
        col1 = std::cmp::max(c1.len(), col1);
        col2 = std::cmp::max(c2.len(), col2);

        lines.push((c0, c1, c2, c3));
    }

    for l in lines {
        info!(
            "Port {:>w0$} - {:>w1$} {:>w2$} <=> {}",
            l.0,
            l.1,
            l.2,
            l.3,
            w0 = col0,
            w1 = col1,
            w2 = col2,
        );
    }
}

fn log_controllers(ports: &[retro_controller_info]) {
    for (port, info) in ports.iter().enumerate() {
        info!("Port {} controllers", port);
        let types = unsafe { std::slice::from_raw_parts(info.types, info.num_types as usize) };
        for controller in types {
            match unsafe { PStr::from_ptr(controller.desc) } {
                Ok(name) => info!("  {} ({})", name, RetroDevice::identify(controller.id)),
                Err(_) => warn!("Invalid string for controller name"),
            }
        }
    }
}

fn log_memory_map(map: &retro_memory_map) {
    if map.descriptors.is_null() || map.num_descriptors == 0 {
        return;
    }
    debug!("Memory map:");
    let descriptors =
        unsafe { std::slice::from_raw_parts(map.descriptors, map.num_descriptors as usize) };
    for d in descriptors {
        let end = d.start + d.len;
        match unsafe { PStr::from_ptr_opt(d.addrspace) } {
            Ok(Some(name)) => debug!("  {:#010x} -> {:#010x} {}", d.start, end, name),
            _ => debug!("  {:#010x} -> {:#010x}", d.start, end),
        }
    }
}

fn log_content_overrides(overrides: &[retro_system_content_info_override]) {
    for o in overrides {
        if let Ok(ext) = unsafe { PStr::from_ptr(o.extensions) } {
            debug!(
                "Content override '{}': fullpath {}, persistent {}",
                ext, o.need_fullpath, o.persistent_data
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::{CStr, CString};
    use std::os::raw::c_char;
    use std::ptr;
    use std::sync::mpsc;

    use yearn_core::config::Config;
    use yearn_libretrobind::bind::*;

    fn proxy_with(config: &Config) -> (RetroProxy, mpsc::Receiver<Problem>) {
        let (tx, rx) = mpsc::channel();
        (RetroProxy::new(config, None, tx).unwrap(), rx)
    }

    fn proxy() -> (RetroProxy, mpsc::Receiver<Problem>) {
        proxy_with(&Config::default())
    }

    fn env<T>(proxy: &mut RetroProxy, cmd: c_uint, data: &mut T) -> bool {
        unsafe { retro_environment_callback_inner(cmd, data as *mut T as *mut c_void, proxy) }
    }

    fn declare_v0(proxy: &mut RetroProxy, defs: &[(&str, &str)]) {
        let owned: Vec<(CString, CString)> = defs
            .iter()
            .map(|(k, v)| (CString::new(*k).unwrap(), CString::new(*v).unwrap()))
            .collect();
        let mut vars: Vec<retro_variable> = owned
            .iter()
            .map(|(k, v)| retro_variable {
                key: k.as_ptr(),
                value: v.as_ptr(),
            })
            .collect();
        vars.push(retro_variable {
            key: ptr::null(),
            value: ptr::null(),
        });
        let ok = unsafe {
            retro_environment_callback_inner(
                RETRO_ENVIRONMENT_SET_VARIABLES,
                vars.as_mut_ptr() as *mut c_void,
                proxy,
            )
        };
        assert!(ok);
    }

    fn get_var(proxy: &mut RetroProxy, key: &str) -> Option<String> {
        let key = CString::new(key).unwrap();
        let mut var = retro_variable {
            key: key.as_ptr(),
            value: ptr::null(),
        };
        if env(proxy, RETRO_ENVIRONMENT_GET_VARIABLE, &mut var) {
            Some(unsafe { CStr::from_ptr(var.value) }.to_str().unwrap().to_string())
        } else {
            assert!(var.value.is_null());
            None
        }
    }

    #[test]
    fn unknown_command_rejected() {
        let (mut p, _rx) = proxy();
        let mut dummy = 0u32;
        assert!(!env(&mut p, 4, &mut dummy));
        assert!(!env(&mut p, 0x7fff, &mut dummy));
    }

    #[test]
    fn unsupported_command_rejected() {
        let (mut p, _rx) = proxy();
        let mut dummy = [0u8; 64];
        assert!(!env(&mut p, RETRO_ENVIRONMENT_SET_HW_RENDER, &mut dummy));
        assert!(!env(&mut p, RETRO_ENVIRONMENT_GET_RUMBLE_INTERFACE, &mut dummy));
    }

    #[test]
    fn simple_queries() {
        let (mut p, _rx) = proxy();

        let mut b = true;
        assert!(env(&mut p, RETRO_ENVIRONMENT_GET_OVERSCAN, &mut b));
        assert!(!b);
        assert!(env(&mut p, RETRO_ENVIRONMENT_GET_CAN_DUPE, &mut b));
        assert!(b);
        assert!(env(&mut p, RETRO_ENVIRONMENT_GET_FASTFORWARDING, &mut b));
        assert!(!b);

        let mut v: c_uint = 0;
        assert!(env(&mut p, RETRO_ENVIRONMENT_GET_CORE_OPTIONS_VERSION, &mut v));
        assert_eq!(v, 1);
        assert!(env(&mut p, RETRO_ENVIRONMENT_GET_MESSAGE_INTERFACE_VERSION, &mut v));
        assert_eq!(v, 1);
        assert!(env(&mut p, RETRO_ENVIRONMENT_GET_INPUT_MAX_USERS, &mut v));
        assert_eq!(v, 1);

        let mut caps = 0u64;
        assert!(env(&mut p, RETRO_ENVIRONMENT_GET_INPUT_DEVICE_CAPABILITIES, &mut caps));
        assert_eq!(caps, (1 << RETRO_DEVICE_JOYPAD) | (1 << RETRO_DEVICE_ANALOG));

        let mut avint = 0;
        assert!(env(&mut p, RETRO_ENVIRONMENT_GET_AUDIO_VIDEO_ENABLE, &mut avint));
        assert_eq!(avint, 3);

        let mut rate = 0.0f32;
        assert!(env(&mut p, RETRO_ENVIRONMENT_GET_TARGET_REFRESH_RATE, &mut rate));
        assert_eq!(rate, 60.0);

        assert!(unsafe {
            retro_environment_callback_inner(
                RETRO_ENVIRONMENT_GET_INPUT_BITMASKS,
                ptr::null_mut(),
                &mut p,
            )
        });
    }

    #[test]
    fn configured_values_reported() {
        let config = Config {
            username: String::from("player1"),
            language: RETRO_LANGUAGE_GERMAN,
            max_users: 2,
            ..Config::default()
        };
        let (mut p, _rx) = proxy_with(&config);

        let mut lang: c_uint = 0;
        assert!(env(&mut p, RETRO_ENVIRONMENT_GET_LANGUAGE, &mut lang));
        assert_eq!(lang, RETRO_LANGUAGE_GERMAN);

        let mut name: *const c_char = ptr::null();
        assert!(env(&mut p, RETRO_ENVIRONMENT_GET_USERNAME, &mut name));
        assert_eq!(unsafe { CStr::from_ptr(name) }.to_str().unwrap(), "player1");

        let mut dir: *const c_char = ptr::null();
        assert!(env(&mut p, RETRO_ENVIRONMENT_GET_SYSTEM_DIRECTORY, &mut dir));
        assert_eq!(unsafe { CStr::from_ptr(dir) }.to_str().unwrap(), "system");
        assert!(env(&mut p, RETRO_ENVIRONMENT_GET_SAVE_DIRECTORY, &mut dir));
        assert_eq!(unsafe { CStr::from_ptr(dir) }.to_str().unwrap(), "saves");

        // Assets live alongside the BIOS files
        let mut assets: *const c_char = ptr::null();
        assert!(env(&mut p, RETRO_ENVIRONMENT_GET_CORE_ASSETS_DIRECTORY, &mut assets));
        assert_eq!(unsafe { CStr::from_ptr(assets) }.to_str().unwrap(), "system");
        assert!(env(&mut p, RETRO_ENVIRONMENT_GET_SYSTEM_DIRECTORY, &mut dir));
        assert_eq!(assets, dir);

        // Linked in, so there is no library path
        assert!(!env(&mut p, RETRO_ENVIRONMENT_GET_LIBRETRO_PATH, &mut dir));
    }

    #[test]
    fn pixel_formats() {
        let (mut p, _rx) = proxy();
        let mut fmt = RETRO_PIXEL_FORMAT_RGB565;
        assert!(env(&mut p, RETRO_ENVIRONMENT_SET_PIXEL_FORMAT, &mut fmt));
        assert_eq!(p.pixel_format(), RetroPixelFormat::Rgb565);

        let mut fmt = RETRO_PIXEL_FORMAT_UNKNOWN;
        assert!(!env(&mut p, RETRO_ENVIRONMENT_SET_PIXEL_FORMAT, &mut fmt));
        assert_eq!(p.pixel_format(), RetroPixelFormat::Rgb565);
    }

    #[test]
    fn rotation() {
        let (mut p, _rx) = proxy();
        let mut rot: c_uint = 1;
        assert!(env(&mut p, RETRO_ENVIRONMENT_SET_ROTATION, &mut rot));
        let mut rot: c_uint = 7;
        assert!(!env(&mut p, RETRO_ENVIRONMENT_SET_ROTATION, &mut rot));
        assert_eq!(p.rotation(), 1);
    }

    #[test]
    fn shutdown_flag() {
        let (mut p, _rx) = proxy();
        assert!(!p.shutdown_requested());
        let ok = unsafe {
            retro_environment_callback_inner(RETRO_ENVIRONMENT_SHUTDOWN, ptr::null_mut(), &mut p)
        };
        assert!(ok);
        assert!(p.shutdown_requested());
    }

    #[test]
    fn variables_v0() {
        let (mut p, _rx) = proxy();
        declare_v0(
            &mut p,
            &[
                ("core_palette", "Palette; default|mono|sepia"),
                ("core_turbo", "Turbo; disabled|enabled"),
            ],
        );

        assert_eq!(get_var(&mut p, "core_palette").as_deref(), Some("default"));
        assert_eq!(get_var(&mut p, "missing"), None);

        let mut updated = false;
        assert!(env(&mut p, RETRO_ENVIRONMENT_GET_VARIABLE_UPDATE, &mut updated));
        assert!(updated);
        assert!(env(&mut p, RETRO_ENVIRONMENT_GET_VARIABLE_UPDATE, &mut updated));
        assert!(!updated);

        let key = CString::new("core_turbo").unwrap();
        let good = CString::new("enabled").unwrap();
        let bad = CString::new("maybe").unwrap();
        let mut var = retro_variable {
            key: key.as_ptr(),
            value: bad.as_ptr(),
        };
        assert!(!env(&mut p, RETRO_ENVIRONMENT_SET_VARIABLE, &mut var));
        var.value = good.as_ptr();
        assert!(env(&mut p, RETRO_ENVIRONMENT_SET_VARIABLE, &mut var));
        assert_eq!(get_var(&mut p, "core_turbo").as_deref(), Some("enabled"));

        assert!(env(&mut p, RETRO_ENVIRONMENT_GET_VARIABLE_UPDATE, &mut updated));
        assert!(updated);

        // Support query
        assert!(unsafe {
            retro_environment_callback_inner(
                RETRO_ENVIRONMENT_SET_VARIABLE,
                ptr::null_mut(),
                &mut p,
            )
        });
    }

    #[test]
    fn variables_v1_with_override() {
        let mut config = Config::default();
        config
            .options
            .insert(String::from("core_speed"), String::from("fast"));
        let (mut p, _rx) = proxy_with(&config);

        let key = CString::new("core_speed").unwrap();
        let desc = CString::new("Speed").unwrap();
        let slow = CString::new("slow").unwrap();
        let fast = CString::new("fast").unwrap();
        let label = CString::new("Fast (unstable)").unwrap();

        let blank = retro_core_option_value {
            value: ptr::null(),
            label: ptr::null(),
        };
        let mut values = [blank; RETRO_NUM_CORE_OPTION_VALUES_MAX];
        values[0].value = slow.as_ptr();
        values[1].value = fast.as_ptr();
        values[1].label = label.as_ptr();
        let mut defs = [
            retro_core_option_definition {
                key: key.as_ptr(),
                desc: desc.as_ptr(),
                info: ptr::null(),
                values,
                default_value: slow.as_ptr(),
            },
            retro_core_option_definition {
                key: ptr::null(),
                desc: ptr::null(),
                info: ptr::null(),
                values: [blank; RETRO_NUM_CORE_OPTION_VALUES_MAX],
                default_value: ptr::null(),
            },
        ];
        let ok = unsafe {
            retro_environment_callback_inner(
                RETRO_ENVIRONMENT_SET_CORE_OPTIONS,
                defs.as_mut_ptr() as *mut c_void,
                &mut p,
            )
        };
        assert!(ok);
        assert_eq!(get_var(&mut p, "core_speed").as_deref(), Some("fast"));

        let mut display = retro_core_option_display {
            key: key.as_ptr(),
            visible: false,
        };
        assert!(env(&mut p, RETRO_ENVIRONMENT_SET_CORE_OPTIONS_DISPLAY, &mut display));
        assert!(!p.vars().get("core_speed").unwrap().is_visible());
    }

    #[test]
    fn message_becomes_notice() {
        let (mut p, rx) = proxy();
        let text = CString::new("Saved").unwrap();
        let mut msg = retro_message {
            msg: text.as_ptr(),
            frames: 120,
        };
        assert!(env(&mut p, RETRO_ENVIRONMENT_SET_MESSAGE, &mut msg));
        match rx.try_recv() {
            Ok(Problem::Notice(n)) => {
                assert_eq!(n.message, "Saved");
                assert_eq!(n.duration, Duration::from_secs(2));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn message_with_tiny_fps() {
        let (mut p, rx) = proxy();
        let mut av = retro_system_av_info {
            geometry: retro_game_geometry {
                base_width: 160,
                base_height: 144,
                max_width: 160,
                max_height: 144,
                aspect_ratio: 0.0,
            },
            timing: retro_system_timing {
                fps: 1e-300,
                sample_rate: 32768.0,
            },
        };
        assert!(env(&mut p, RETRO_ENVIRONMENT_SET_SYSTEM_AV_INFO, &mut av));

        let text = CString::new("Slow").unwrap();
        let mut msg = retro_message {
            msg: text.as_ptr(),
            frames: 120,
        };
        assert!(env(&mut p, RETRO_ENVIRONMENT_SET_MESSAGE, &mut msg));
        match rx.try_recv() {
            Ok(Problem::Notice(n)) => assert_eq!(n.duration, Duration::from_secs(2)),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn message_ext_targets() {
        let (mut p, rx) = proxy();
        let text = CString::new("Disk 2").unwrap();
        let mut msg = retro_message_ext {
            msg: text.as_ptr(),
            duration: 1500,
            priority: 3,
            level: retro_log_level_RETRO_LOG_INFO,
            target: retro_message_target_RETRO_MESSAGE_TARGET_ALL,
            type_: retro_message_type_RETRO_MESSAGE_TYPE_NOTIFICATION,
            progress: -1,
        };
        assert!(env(&mut p, RETRO_ENVIRONMENT_SET_MESSAGE_EXT, &mut msg));
        match rx.try_recv() {
            Ok(Problem::Notice(n)) => {
                assert_eq!(n.duration, Duration::from_millis(1500));
                assert_eq!(n.priority, 3);
            }
            other => panic!("unexpected {:?}", other),
        }

        msg.target = retro_message_target_RETRO_MESSAGE_TARGET_LOG;
        assert!(env(&mut p, RETRO_ENVIRONMENT_SET_MESSAGE_EXT, &mut msg));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn av_info_and_geometry() {
        let (mut p, _rx) = proxy();
        let mut av = retro_system_av_info {
            geometry: retro_game_geometry {
                base_width: 320,
                base_height: 240,
                max_width: 640,
                max_height: 480,
                aspect_ratio: 4.0 / 3.0,
            },
            timing: retro_system_timing {
                fps: 50.0,
                sample_rate: 44100.0,
            },
        };
        assert!(env(&mut p, RETRO_ENVIRONMENT_SET_SYSTEM_AV_INFO, &mut av));
        assert_eq!(p.fps(), 50.0);

        let mut geometry = retro_game_geometry {
            base_width: 640,
            base_height: 480,
            max_width: 640,
            max_height: 480,
            aspect_ratio: 0.0,
        };
        assert!(env(&mut p, RETRO_ENVIRONMENT_SET_GEOMETRY, &mut geometry));
        let stored = p.get_av().unwrap();
        assert_eq!(stored.geometry.base_width, 640);
        assert_eq!(stored.timing.fps, 50.0);
    }

    #[test]
    fn log_interface_installed() {
        let (mut p, _rx) = proxy();
        let mut cb = retro_log_callback { log: None };
        assert!(env(&mut p, RETRO_ENVIRONMENT_GET_LOG_INTERFACE, &mut cb));
        assert!(cb.log.is_some());
    }

    #[test]
    fn frame_time_callback_stored() {
        unsafe extern "C" fn tick(_usec: retro_usec_t) {}

        let (mut p, _rx) = proxy();
        let mut cb = retro_frame_time_callback {
            callback: Some(tick),
            reference: 16_667,
        };
        assert!(env(&mut p, RETRO_ENVIRONMENT_SET_FRAME_TIME_CALLBACK, &mut cb));
        assert_eq!(p.frame_time_callback().unwrap().reference, 16_667);
    }

    #[test]
    fn flags_recorded() {
        let (mut p, _rx) = proxy();
        let mut yes = true;
        assert!(env(&mut p, RETRO_ENVIRONMENT_SET_SUPPORT_NO_GAME, &mut yes));
        assert!(env(&mut p, RETRO_ENVIRONMENT_SET_SUPPORT_ACHIEVEMENTS, &mut yes));
        assert!(p.supports_no_game());
        assert!(p.supports_achievements());

        let mut quirks = RETRO_SERIALIZATION_QUIRK_INCOMPLETE | (1 << 63);
        assert!(env(&mut p, RETRO_ENVIRONMENT_SET_SERIALIZATION_QUIRKS, &mut quirks));
        assert_eq!(quirks, RETRO_SERIALIZATION_QUIRK_INCOMPLETE);

        let mut latency: c_uint = 64;
        assert!(env(&mut p, RETRO_ENVIRONMENT_SET_MINIMUM_AUDIO_LATENCY, &mut latency));
        assert_eq!(p.min_audio_latency(), 64);
    }

    #[test]
    fn null_data_rejected() {
        let (mut p, _rx) = proxy();
        let ok = unsafe {
            retro_environment_callback_inner(
                RETRO_ENVIRONMENT_GET_VARIABLE,
                ptr::null_mut(),
                &mut p,
            )
        };
        assert!(!ok);
    }
}
