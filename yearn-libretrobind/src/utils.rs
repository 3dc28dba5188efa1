use log::{debug, error, info};
use std::error::Error;
use std::path::Path;

use yearn_core::error::YearnError;

use crate::api::CoreApi;
use crate::bind::RETRO_MEMORY_SAVE_RAM;

pub fn has_save_memory(api: &CoreApi) -> bool {
    crate::functions::get_memory_size(api, RETRO_MEMORY_SAVE_RAM) != 0
        && !crate::functions::get_memory_data(api, RETRO_MEMORY_SAVE_RAM).is_null()
}

/// Copy battery save data into the core, if there is any to load.
///
/// A missing file is not an error, one with the wrong size is.
pub fn try_read_into_save_mem(api: &CoreApi, save_path: &Path) -> Result<(), Box<dyn Error>> {
    match std::fs::read(save_path) {
        Ok(data) => {
            let save_size = crate::functions::get_memory_size(api, RETRO_MEMORY_SAVE_RAM);
            let save_ptr = crate::functions::get_memory_data(api, RETRO_MEMORY_SAVE_RAM);
            if save_size == data.len() && !save_ptr.is_null() {
                unsafe {
                    std::ptr::copy_nonoverlapping(data.as_ptr(), save_ptr as *mut u8, save_size);
                }
                debug!("Save data loaded from '{}'", save_path.display());
                Ok(())
            } else {
                error!(
                    "Save length {} doesn't match expected length {}",
                    data.len(),
                    save_size
                );
                Err(Box::new(YearnError::MismatchSave {
                    expected: save_size,
                    got: data.len(),
                }))
            }
        }
        Err(_) => {
            info!("No save data to load");
            Ok(())
        }
    }
}

pub fn save_to_file(api: &CoreApi, save_path: &Path) -> Result<(), Box<dyn Error>> {
    let save_size = crate::functions::get_memory_size(api, RETRO_MEMORY_SAVE_RAM);
    let save_ptr = crate::functions::get_memory_data(api, RETRO_MEMORY_SAVE_RAM);
    if save_size == 0 || save_ptr.is_null() {
        debug!("Core has no save memory");
        return Ok(());
    }
    let save_slice = unsafe { std::slice::from_raw_parts(save_ptr as *const u8, save_size) };
    std::fs::write(save_path, save_slice)?;
    info!("Saved to '{}'", save_path.display());
    Ok(())
}
