use lazy_static::lazy_static;
use log::{error, trace, warn};
use std::ops::DerefMut;
use std::sync::{Mutex, MutexGuard};

use yearn_core::error::YearnError;
use yearn_libretro::proxy::RetroProxy;
use yearn_libretrobind::types::RetroSystemAvInfo;

// Callbacks carry no user pointer, so the state for the one running core
// lives here.
lazy_static! {
    static ref PROXY: Mutex<Option<RetroProxy>> = Mutex::new(None);
}

fn lock() -> MutexGuard<'static, Option<RetroProxy>> {
    match PROXY.lock() {
        Ok(g) => g,
        Err(e) => {
            error!("Poisoned mutex for libretro proxy");
            e.into_inner()
        }
    }
}

/// Run `f` against the current proxy, None if no core is loaded.
///
/// Must not be called while already inside `f`.
pub fn with_proxy<F, T>(f: F) -> Option<T>
where
    F: FnOnce(&mut RetroProxy) -> T,
{
    let mut guard = lock();
    guard.deref_mut().as_mut().map(f)
}

/// Install the proxy for a new session.
///
/// Fails if another session still holds it, leaving that session untouched.
pub(crate) fn create(proxy: RetroProxy) -> Result<(), YearnError> {
    trace!("Creating proxy object for libretro callbacks");
    let mut guard = lock();
    if guard.is_some() {
        error!("Core session already active");
        return Err(YearnError::SessionActive);
    }
    *guard = Some(proxy);
    Ok(())
}

pub(crate) fn set_av(av: RetroSystemAvInfo) {
    trace!("Setting AV info to proxy '{:?}'", av);
    match lock().as_mut() {
        Some(proxy) => {
            proxy.set_av(Some(av));
        }
        None => {
            warn!("Trying to set AV info with no proxy");
        }
    }
}

pub(crate) fn destroy() -> Option<RetroProxy> {
    trace!("Destroying proxy object");
    lock().take()
}
