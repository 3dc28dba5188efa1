use log::{info, warn};
use std::fmt::Display;
use std::time::Duration;

use crate::error::YearnError;

/// On-screen style message raised by a core through SET_MESSAGE.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub message: String,
    pub duration: Duration,
    pub priority: u32,
}

impl Notice {
    pub fn new(message: String, duration: Duration) -> Self {
        Notice {
            message,
            duration,
            priority: 0,
        }
    }

    pub fn log(&self) {
        if self.priority > 0 {
            warn!("{}", self);
        } else {
            info!("{}", self);
        }
    }
}

impl Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(f, "'{}' ({:.1}s)", self.message, self.duration.as_secs_f32())
    }
}

/// Raised from inside callbacks, where errors can't be returned to the core.
#[derive(Debug)]
pub enum Problem {
    Fatal(YearnError),
    Notice(Notice),
}

impl Problem {
    pub fn fatal(e: YearnError) -> Problem {
        Problem::Fatal(e)
    }

    pub fn notice(n: Notice) -> Problem {
        Problem::Notice(n)
    }
}
