//! Typed view of `retro_environment_t` calls.
//!
//! Cores pass a command id and an untyped pointer whose meaning depends on
//! the id. `EnvRequest::decode` turns that pair into a variant holding a
//! correctly typed reference, so the rest of the frontend never casts.

use std::os::raw::{c_char, c_int, c_uint, c_void};

use yearn_libretrobind::bind::*;
use yearn_libretrobind::enums::RetroEnvironment;

/// Environment call with its payload.
///
/// `Get*` variants hold a mutable reference the frontend writes its answer
/// into. Arrays the core terminates with an empty entry are exposed as
/// slices without the terminator.
#[derive(Debug)]
pub enum EnvRequest<'a> {
    SetRotation(c_uint),
    GetOverscan(&'a mut bool),
    GetCanDupe(&'a mut bool),
    SetMessage(&'a retro_message),
    SetMessageExt(&'a retro_message_ext),
    GetMessageInterfaceVersion(&'a mut c_uint),
    Shutdown,
    SetPerformanceLevel(c_uint),
    GetSystemDirectory(&'a mut *const c_char),
    GetSaveDirectory(&'a mut *const c_char),
    GetCoreAssetsDirectory(&'a mut *const c_char),
    GetLibretroPath(&'a mut *const c_char),
    GetUsername(&'a mut *const c_char),
    SetPixelFormat(retro_pixel_format),
    SetInputDescriptors(&'a [retro_input_descriptor]),
    GetVariable(&'a mut retro_variable),
    SetVariables(&'a [retro_variable]),
    GetVariableUpdate(&'a mut bool),
    /// None asks whether SET_VARIABLE is supported at all
    SetVariable(Option<&'a retro_variable>),
    GetCoreOptionsVersion(&'a mut c_uint),
    SetCoreOptions(&'a [retro_core_option_definition]),
    /// Only the `us` table, which every core must provide
    SetCoreOptionsIntl(&'a [retro_core_option_definition]),
    SetCoreOptionsDisplay(&'a retro_core_option_display),
    SetSupportNoGame(bool),
    SetSupportAchievements(bool),
    SetFrameTimeCallback(&'a retro_frame_time_callback),
    GetInputDeviceCapabilities(&'a mut u64),
    GetLogInterface(&'a mut retro_log_callback),
    SetSystemAvInfo(&'a retro_system_av_info),
    SetGeometry(&'a retro_game_geometry),
    SetControllerInfo(&'a [retro_controller_info]),
    SetMemoryMaps(&'a retro_memory_map),
    SetContentInfoOverride(&'a [retro_system_content_info_override]),
    GetLanguage(&'a mut c_uint),
    GetAudioVideoEnable(&'a mut c_int),
    GetFastforwarding(&'a mut bool),
    GetTargetRefreshRate(&'a mut f32),
    GetInputBitmasks,
    GetInputMaxUsers(&'a mut c_uint),
    SetSerializationQuirks(&'a mut u64),
    SetMinimumAudioLatency(c_uint),
    /// Known command that needs a payload but was given NULL
    NullData(RetroEnvironment),
    /// Known command the frontend doesn't implement
    Unsupported(RetroEnvironment),
}

// Entries up to (not including) the first one `end` accepts
unsafe fn terminated<'a, T>(ptr: *const T, end: impl Fn(&T) -> bool) -> &'a [T] {
    let mut len = 0;
    while !end(&*ptr.add(len)) {
        len += 1;
    }
    std::slice::from_raw_parts(ptr, len)
}

impl<'a> EnvRequest<'a> {
    /// Decode an environment call. Unknown ids are None.
    ///
    /// # Safety
    ///
    /// `data` must be null or point at the type the libretro API defines for
    /// `cmd`, valid for `'a`.
    pub unsafe fn decode(cmd: c_uint, data: *mut c_void) -> Option<EnvRequest<'a>> {
        use EnvRequest as R;
        use RetroEnvironment as E;

        let env = RetroEnvironment::new(cmd)?;

        // Commands whose payload is optional or ignored
        match env {
            E::Shutdown => return Some(R::Shutdown),
            E::GetInputBitmasks => return Some(R::GetInputBitmasks),
            E::SetVariable => {
                return Some(R::SetVariable((data as *const retro_variable).as_ref()))
            }
            _ => {}
        }

        if data.is_null() {
            return Some(match env {
                E::SetRotation
                | E::GetOverscan
                | E::GetCanDupe
                | E::SetMessage
                | E::SetMessageExt
                | E::GetMessageInterfaceVersion
                | E::SetPerformanceLevel
                | E::GetSystemDirectory
                | E::GetSaveDirectory
                | E::GetCoreAssetsDirectory
                | E::GetLibretroPath
                | E::GetUsername
                | E::SetPixelFormat
                | E::SetInputDescriptors
                | E::GetVariable
                | E::SetVariables
                | E::GetVariableUpdate
                | E::GetCoreOptionsVersion
                | E::SetCoreOptions
                | E::SetCoreOptionsIntl
                | E::SetCoreOptionsDisplay
                | E::SetSupportNoGame
                | E::SetSupportAchievements
                | E::SetFrameTimeCallback
                | E::GetInputDeviceCapabilities
                | E::GetLogInterface
                | E::SetSystemAvInfo
                | E::SetGeometry
                | E::SetControllerInfo
                | E::SetMemoryMaps
                | E::SetContentInfoOverride
                | E::GetLanguage
                | E::GetAudioVideoEnable
                | E::GetFastforwarding
                | E::GetTargetRefreshRate
                | E::GetInputMaxUsers
                | E::SetSerializationQuirks
                | E::SetMinimumAudioLatency => R::NullData(env),
                _ => R::Unsupported(env),
            });
        }

        let req = match env {
            E::SetRotation => R::SetRotation(*(data as *const c_uint)),
            E::GetOverscan => R::GetOverscan(&mut *(data as *mut bool)),
            E::GetCanDupe => R::GetCanDupe(&mut *(data as *mut bool)),
            E::SetMessage => R::SetMessage(&*(data as *const retro_message)),
            E::SetMessageExt => R::SetMessageExt(&*(data as *const retro_message_ext)),
            E::GetMessageInterfaceVersion => {
                R::GetMessageInterfaceVersion(&mut *(data as *mut c_uint))
            }
            E::SetPerformanceLevel => R::SetPerformanceLevel(*(data as *const c_uint)),
            E::GetSystemDirectory => R::GetSystemDirectory(&mut *(data as *mut *const c_char)),
            E::GetSaveDirectory => R::GetSaveDirectory(&mut *(data as *mut *const c_char)),
            E::GetCoreAssetsDirectory => {
                R::GetCoreAssetsDirectory(&mut *(data as *mut *const c_char))
            }
            E::GetLibretroPath => R::GetLibretroPath(&mut *(data as *mut *const c_char)),
            E::GetUsername => R::GetUsername(&mut *(data as *mut *const c_char)),
            E::SetPixelFormat => R::SetPixelFormat(*(data as *const retro_pixel_format)),
            E::SetInputDescriptors => R::SetInputDescriptors(terminated(
                data as *const retro_input_descriptor,
                |d| d.description.is_null(),
            )),
            E::GetVariable => R::GetVariable(&mut *(data as *mut retro_variable)),
            E::SetVariables => R::SetVariables(terminated(
                data as *const retro_variable,
                |v| v.key.is_null(),
            )),
            E::GetVariableUpdate => R::GetVariableUpdate(&mut *(data as *mut bool)),
            E::GetCoreOptionsVersion => R::GetCoreOptionsVersion(&mut *(data as *mut c_uint)),
            E::SetCoreOptions => R::SetCoreOptions(terminated(
                data as *const retro_core_option_definition,
                |d| d.key.is_null(),
            )),
            E::SetCoreOptionsIntl => {
                let intl = &*(data as *const retro_core_options_intl);
                if intl.us.is_null() {
                    R::NullData(env)
                } else {
                    R::SetCoreOptionsIntl(terminated(
                        intl.us as *const retro_core_option_definition,
                        |d| d.key.is_null(),
                    ))
                }
            }
            E::SetCoreOptionsDisplay => {
                R::SetCoreOptionsDisplay(&*(data as *const retro_core_option_display))
            }
            E::SetSupportNoGame => R::SetSupportNoGame(*(data as *const bool)),
            E::SetSupportAchievements => R::SetSupportAchievements(*(data as *const bool)),
            E::SetFrameTimeCallback => {
                R::SetFrameTimeCallback(&*(data as *const retro_frame_time_callback))
            }
            E::GetInputDeviceCapabilities => {
                R::GetInputDeviceCapabilities(&mut *(data as *mut u64))
            }
            E::GetLogInterface => R::GetLogInterface(&mut *(data as *mut retro_log_callback)),
            E::SetSystemAvInfo => R::SetSystemAvInfo(&*(data as *const retro_system_av_info)),
            E::SetGeometry => R::SetGeometry(&*(data as *const retro_game_geometry)),
            E::SetControllerInfo => R::SetControllerInfo(terminated(
                data as *const retro_controller_info,
                |c| c.types.is_null(),
            )),
            E::SetMemoryMaps => R::SetMemoryMaps(&*(data as *const retro_memory_map)),
            E::SetContentInfoOverride => R::SetContentInfoOverride(terminated(
                data as *const retro_system_content_info_override,
                |o| o.extensions.is_null(),
            )),
            E::GetLanguage => R::GetLanguage(&mut *(data as *mut c_uint)),
            E::GetAudioVideoEnable => R::GetAudioVideoEnable(&mut *(data as *mut c_int)),
            E::GetFastforwarding => R::GetFastforwarding(&mut *(data as *mut bool)),
            E::GetTargetRefreshRate => R::GetTargetRefreshRate(&mut *(data as *mut f32)),
            E::GetInputMaxUsers => R::GetInputMaxUsers(&mut *(data as *mut c_uint)),
            E::SetSerializationQuirks => R::SetSerializationQuirks(&mut *(data as *mut u64)),
            E::SetMinimumAudioLatency => R::SetMinimumAudioLatency(*(data as *const c_uint)),
            other => R::Unsupported(other),
        };
        Some(req)
    }

    /// The command this request came from.
    pub fn command(&self) -> RetroEnvironment {
        use EnvRequest as R;
        use RetroEnvironment as E;

        match self {
            R::SetRotation(_) => E::SetRotation,
            R::GetOverscan(_) => E::GetOverscan,
            R::GetCanDupe(_) => E::GetCanDupe,
            R::SetMessage(_) => E::SetMessage,
            R::SetMessageExt(_) => E::SetMessageExt,
            R::GetMessageInterfaceVersion(_) => E::GetMessageInterfaceVersion,
            R::Shutdown => E::Shutdown,
            R::SetPerformanceLevel(_) => E::SetPerformanceLevel,
            R::GetSystemDirectory(_) => E::GetSystemDirectory,
            R::GetSaveDirectory(_) => E::GetSaveDirectory,
            R::GetCoreAssetsDirectory(_) => E::GetCoreAssetsDirectory,
            R::GetLibretroPath(_) => E::GetLibretroPath,
            R::GetUsername(_) => E::GetUsername,
            R::SetPixelFormat(_) => E::SetPixelFormat,
            R::SetInputDescriptors(_) => E::SetInputDescriptors,
            R::GetVariable(_) => E::GetVariable,
            R::SetVariables(_) => E::SetVariables,
            R::GetVariableUpdate(_) => E::GetVariableUpdate,
            R::SetVariable(_) => E::SetVariable,
            R::GetCoreOptionsVersion(_) => E::GetCoreOptionsVersion,
            R::SetCoreOptions(_) => E::SetCoreOptions,
            R::SetCoreOptionsIntl(_) => E::SetCoreOptionsIntl,
            R::SetCoreOptionsDisplay(_) => E::SetCoreOptionsDisplay,
            R::SetSupportNoGame(_) => E::SetSupportNoGame,
            R::SetSupportAchievements(_) => E::SetSupportAchievements,
            R::SetFrameTimeCallback(_) => E::SetFrameTimeCallback,
            R::GetInputDeviceCapabilities(_) => E::GetInputDeviceCapabilities,
            R::GetLogInterface(_) => E::GetLogInterface,
            R::SetSystemAvInfo(_) => E::SetSystemAvInfo,
            R::SetGeometry(_) => E::SetGeometry,
            R::SetControllerInfo(_) => E::SetControllerInfo,
            R::SetMemoryMaps(_) => E::SetMemoryMaps,
            R::SetContentInfoOverride(_) => E::SetContentInfoOverride,
            R::GetLanguage(_) => E::GetLanguage,
            R::GetAudioVideoEnable(_) => E::GetAudioVideoEnable,
            R::GetFastforwarding(_) => E::GetFastforwarding,
            R::GetTargetRefreshRate(_) => E::GetTargetRefreshRate,
            R::GetInputBitmasks => E::GetInputBitmasks,
            R::GetInputMaxUsers(_) => E::GetInputMaxUsers,
            R::SetSerializationQuirks(_) => E::SetSerializationQuirks,
            R::SetMinimumAudioLatency(_) => E::SetMinimumAudioLatency,
            R::NullData(e) | R::Unsupported(e) => *e,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CString;
    use std::ptr;

    fn decode<'a, T>(cmd: c_uint, data: &'a mut T) -> EnvRequest<'a> {
        unsafe { EnvRequest::decode(cmd, data as *mut T as *mut c_void) }.unwrap()
    }

    #[test]
    fn unknown_ids() {
        for cmd in [0, 4, 5, 20, 72, 0xffff] {
            assert!(unsafe { EnvRequest::decode(cmd, ptr::null_mut()) }.is_none());
        }
    }

    #[test]
    fn scalar_payloads() {
        let mut rot: c_uint = 3;
        match decode(RETRO_ENVIRONMENT_SET_ROTATION, &mut rot) {
            EnvRequest::SetRotation(r) => assert_eq!(r, 3),
            other => panic!("unexpected {:?}", other),
        }

        let mut fmt = RETRO_PIXEL_FORMAT_XRGB8888;
        match decode(RETRO_ENVIRONMENT_SET_PIXEL_FORMAT, &mut fmt) {
            EnvRequest::SetPixelFormat(f) => assert_eq!(f, RETRO_PIXEL_FORMAT_XRGB8888),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn writes_through_reference() {
        let mut dupe = false;
        if let EnvRequest::GetCanDupe(d) = decode(RETRO_ENVIRONMENT_GET_CAN_DUPE, &mut dupe) {
            *d = true;
        } else {
            panic!("wrong variant");
        }
        assert!(dupe);
    }

    #[test]
    fn terminated_arrays() {
        let k0 = CString::new("a").unwrap();
        let v0 = CString::new("A; x|y").unwrap();
        let k1 = CString::new("b").unwrap();
        let v1 = CString::new("B; 1|2").unwrap();
        let mut vars = [
            retro_variable {
                key: k0.as_ptr(),
                value: v0.as_ptr(),
            },
            retro_variable {
                key: k1.as_ptr(),
                value: v1.as_ptr(),
            },
            retro_variable {
                key: ptr::null(),
                value: ptr::null(),
            },
        ];
        let req = unsafe {
            EnvRequest::decode(RETRO_ENVIRONMENT_SET_VARIABLES, vars.as_mut_ptr() as *mut c_void)
        };
        match req {
            Some(EnvRequest::SetVariables(v)) => assert_eq!(v.len(), 2),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn controller_info_stops_at_null_types() {
        let name = CString::new("Joypad").unwrap();
        let pads = [retro_controller_description {
            desc: name.as_ptr(),
            id: RETRO_DEVICE_JOYPAD,
        }];
        let mut ports = [
            retro_controller_info {
                types: pads.as_ptr(),
                num_types: 1,
            },
            retro_controller_info {
                types: pads.as_ptr(),
                num_types: 1,
            },
            // Terminator, num_types is ignored
            retro_controller_info {
                types: ptr::null(),
                num_types: 5,
            },
            retro_controller_info {
                types: pads.as_ptr(),
                num_types: 1,
            },
        ];
        let req = unsafe {
            EnvRequest::decode(
                RETRO_ENVIRONMENT_SET_CONTROLLER_INFO,
                ports.as_mut_ptr() as *mut c_void,
            )
        };
        match req {
            Some(EnvRequest::SetControllerInfo(c)) => {
                assert_eq!(c.len(), 2);
                assert_eq!(c[1].num_types, 1);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn content_override_stops_at_null_extensions() {
        let exts = CString::new("gb|gbc").unwrap();
        let mut overrides = [
            retro_system_content_info_override {
                extensions: exts.as_ptr(),
                need_fullpath: true,
                persistent_data: false,
            },
            retro_system_content_info_override {
                extensions: ptr::null(),
                need_fullpath: true,
                persistent_data: true,
            },
        ];
        let req = unsafe {
            EnvRequest::decode(
                RETRO_ENVIRONMENT_SET_CONTENT_INFO_OVERRIDE,
                overrides.as_mut_ptr() as *mut c_void,
            )
        };
        match req {
            Some(EnvRequest::SetContentInfoOverride(o)) => {
                assert_eq!(o.len(), 1);
                assert!(o[0].need_fullpath);
            }
            other => panic!("unexpected {:?}", other),
        }

        // Only the terminator
        match decode(RETRO_ENVIRONMENT_SET_CONTENT_INFO_OVERRIDE, &mut overrides[1]) {
            EnvRequest::SetContentInfoOverride(o) => assert!(o.is_empty()),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn null_payloads() {
        let req = unsafe { EnvRequest::decode(RETRO_ENVIRONMENT_GET_VARIABLE, ptr::null_mut()) };
        assert!(matches!(
            req,
            Some(EnvRequest::NullData(RetroEnvironment::GetVariable))
        ));

        let req = unsafe { EnvRequest::decode(RETRO_ENVIRONMENT_SET_VARIABLE, ptr::null_mut()) };
        assert!(matches!(req, Some(EnvRequest::SetVariable(None))));

        let req = unsafe { EnvRequest::decode(RETRO_ENVIRONMENT_SHUTDOWN, ptr::null_mut()) };
        assert!(matches!(req, Some(EnvRequest::Shutdown)));
    }

    #[test]
    fn unsupported_commands() {
        let mut dummy = [0u8; 64];
        for cmd in [
            RETRO_ENVIRONMENT_SET_HW_RENDER,
            RETRO_ENVIRONMENT_GET_VFS_INTERFACE,
            RETRO_ENVIRONMENT_GET_SENSOR_INTERFACE,
            RETRO_ENVIRONMENT_SET_CORE_OPTIONS_V2,
        ] {
            let req = decode(cmd, &mut dummy);
            assert!(matches!(req, EnvRequest::Unsupported(_)), "cmd {}", cmd);
            assert_eq!(req.command().id(), cmd);
        }
    }

    #[test]
    fn intl_uses_us_table() {
        let key = CString::new("opt").unwrap();
        let desc = CString::new("Option").unwrap();
        let blank = retro_core_option_value {
            value: ptr::null(),
            label: ptr::null(),
        };
        let mut defs = [
            retro_core_option_definition {
                key: key.as_ptr(),
                desc: desc.as_ptr(),
                info: ptr::null(),
                values: [blank; RETRO_NUM_CORE_OPTION_VALUES_MAX],
                default_value: ptr::null(),
            },
            retro_core_option_definition {
                key: ptr::null(),
                desc: ptr::null(),
                info: ptr::null(),
                values: [blank; RETRO_NUM_CORE_OPTION_VALUES_MAX],
                default_value: ptr::null(),
            },
        ];
        let mut intl = retro_core_options_intl {
            us: defs.as_mut_ptr(),
            local: ptr::null_mut(),
        };
        match decode(RETRO_ENVIRONMENT_SET_CORE_OPTIONS_INTL, &mut intl) {
            EnvRequest::SetCoreOptionsIntl(d) => assert_eq!(d.len(), 1),
            other => panic!("unexpected {:?}", other),
        }
    }
}
