use std::time::Duration;

use crate::bind::{retro_game_geometry, retro_system_av_info, retro_system_timing};

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RetroGameGeometry {
    pub base_width: u32,
    pub base_height: u32,
    pub max_width: u32,
    pub max_height: u32,
    pub aspect_ratio: f32,
}

impl RetroGameGeometry {
    /// Display aspect, falling back to square pixels when the core leaves it
    /// at zero (or anything non-positive).
    pub fn aspect(&self) -> f32 {
        if self.aspect_ratio > 0.0 {
            self.aspect_ratio
        } else if self.base_height != 0 {
            self.base_width as f32 / self.base_height as f32
        } else {
            1.0
        }
    }
}

impl From<retro_game_geometry> for RetroGameGeometry {
    fn from(g: retro_game_geometry) -> Self {
        RetroGameGeometry {
            base_width: g.base_width,
            base_height: g.base_height,
            max_width: g.max_width,
            max_height: g.max_height,
            aspect_ratio: g.aspect_ratio,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RetroSystemTiming {
    pub fps: f64,
    pub sample_rate: f64,
}

impl From<retro_system_timing> for RetroSystemTiming {
    fn from(t: retro_system_timing) -> Self {
        RetroSystemTiming {
            fps: t.fps,
            sample_rate: t.sample_rate,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RetroSystemAvInfo {
    pub geometry: RetroGameGeometry,
    pub timing: RetroSystemTiming,
}

impl RetroSystemAvInfo {
    /// Wall clock time for one `retro_run`, None if the core reports a
    /// nonsensical rate.
    pub fn frame_time(&self) -> Option<Duration> {
        if self.timing.fps.is_finite() && self.timing.fps > 0.0 {
            Duration::try_from_secs_f64(1.0 / self.timing.fps).ok()
        } else {
            None
        }
    }
}

impl From<retro_system_av_info> for RetroSystemAvInfo {
    fn from(info: retro_system_av_info) -> Self {
        RetroSystemAvInfo {
            geometry: info.geometry.into(),
            timing: info.timing.into(),
        }
    }
}
