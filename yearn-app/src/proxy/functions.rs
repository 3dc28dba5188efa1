use log::{error, trace};
use std::os::raw::{c_uint, c_void};

use yearn_libretro::callbacks::retro_environment_callback_inner;
use yearn_libretrobind::api::CoreApi;

// Cores hand this back instead of a pointer when rendering on the GPU
const RETRO_HW_FRAME_BUFFER_VALID: usize = usize::MAX;

unsafe extern "C" fn retro_environment_callback(cmd: c_uint, data: *mut c_void) -> bool {
    match crate::proxy::libretro::with_proxy(|p| retro_environment_callback_inner(cmd, data, p)) {
        Some(b) => b,
        None => {
            error!("Callback executed before core loaded");
            false
        }
    }
}

pub(crate) fn retro_set_environment(api: &CoreApi) {
    unsafe { (api.retro_set_environment)(Some(retro_environment_callback)) }
}

unsafe extern "C" fn retro_video_refresh_callback(
    data: *const c_void,
    width: c_uint,
    height: c_uint,
    pitch: usize,
) {
    trace!("video refresh {}x{} {}pitch", width, height, pitch);
    let frame = if data.is_null() || data as usize == RETRO_HW_FRAME_BUFFER_VALID {
        None
    } else {
        Some(std::slice::from_raw_parts(
            data as *const u8,
            pitch * height as usize,
        ))
    };

    if crate::proxy::libretro::with_proxy(|p| p.video_refresh(frame, width, height, pitch))
        .is_none()
    {
        error!("Callback executed before core loaded")
    }
}

pub(crate) fn retro_set_video_refresh(api: &CoreApi) {
    unsafe { (api.retro_set_video_refresh)(Some(retro_video_refresh_callback)) }
}

unsafe extern "C" fn retro_input_poll_callback() {
    if crate::proxy::libretro::with_proxy(|p| p.input_poll()).is_none() {
        error!("Callback executed before core loaded")
    }
}

pub(crate) fn retro_set_input_poll(api: &CoreApi) {
    unsafe { (api.retro_set_input_poll)(Some(retro_input_poll_callback)) }
}

unsafe extern "C" fn retro_input_state_callback(
    port: c_uint,
    device: c_uint,
    index: c_uint,
    id: c_uint,
) -> i16 {
    match crate::proxy::libretro::with_proxy(|p| p.input_state(port, device, index, id)) {
        Some(v) => v,
        None => {
            error!("Callback executed before core loaded");
            0
        }
    }
}

pub(crate) fn retro_set_input_state(api: &CoreApi) {
    unsafe { (api.retro_set_input_state)(Some(retro_input_state_callback)) }
}

unsafe extern "C" fn retro_audio_sample_callback(left: i16, right: i16) {
    if crate::proxy::libretro::with_proxy(|p| p.audio_sample(left, right)).is_none() {
        error!("Callback executed before core loaded");
    }
}

pub(crate) fn retro_set_audio_sample(api: &CoreApi) {
    unsafe { (api.retro_set_audio_sample)(Some(retro_audio_sample_callback)) }
}

unsafe extern "C" fn retro_audio_sample_batch_callback(data: *const i16, frames: usize) -> usize {
    trace!("audio samples");
    if data.is_null() {
        return 0;
    }
    // A frame holds a sample for both left and right
    let slice = std::slice::from_raw_parts(data, frames * 2);
    match crate::proxy::libretro::with_proxy(|p| {
        p.audio_batch(slice);
        frames
    }) {
        Some(n) => n,
        None => {
            error!("Callback executed before core loaded");
            0
        }
    }
}

pub(crate) fn retro_set_audio_sample_batch(api: &CoreApi) {
    unsafe { (api.retro_set_audio_sample_batch)(Some(retro_audio_sample_batch_callback)) }
}
