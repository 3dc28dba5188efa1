pub mod core;
pub mod yearn;

mod proxy {
    pub mod functions;
    pub mod libretro;
}

pub use crate::core::{Core, CoreState};
pub use crate::proxy::libretro::with_proxy;
pub use crate::yearn::{RunOptions, RunSummary, StopReason, Yearn};
