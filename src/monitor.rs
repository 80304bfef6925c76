// src/monitor.rs

//! The backend-neutral monitor contract.

use crate::units::{dpi_to_scale, IVec2, UVec2, Vec2};
use crate::video_mode::VideoMode;
use anyhow::Result;

/// Canonical monitor record built by both enumerators.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MonitorInfo {
    pub name: String,
    /// Physical size in millimetres.
    pub physical_size: UVec2,
    /// Size in pixels.
    pub size: UVec2,
    /// Top-left corner on the virtual desktop.
    pub position: IVec2,
    pub is_primary: bool,
    pub video_mode: VideoMode,
    pub video_modes: Vec<VideoMode>,
}

impl MonitorInfo {
    /// Index of the current mode in the supported list, if it is listed.
    pub fn current_mode_index(&self) -> Option<usize> {
        self.video_modes.iter().position(|m| *m == self.video_mode)
    }
}

/// A physical monitor as seen at enumeration time.
///
/// Monitors are immutable snapshots. Only `dpi` and `scale` reach back into
/// the engine, and they fail with `WindowError::EngineReleased` once the
/// engine is gone.
pub trait Monitor {
    fn info(&self) -> &MonitorInfo;

    fn dpi(&self) -> Result<Vec2>;

    fn scale(&self) -> Result<Vec2> {
        self.dpi().map(dpi_to_scale)
    }

    fn physical_size(&self) -> UVec2 {
        self.info().physical_size
    }

    fn size(&self) -> UVec2 {
        self.info().size
    }

    fn position(&self) -> IVec2 {
        self.info().position
    }

    fn name(&self) -> &str {
        &self.info().name
    }

    fn is_primary(&self) -> bool {
        self.info().is_primary
    }

    fn video_mode(&self) -> VideoMode {
        self.info().video_mode
    }

    fn video_modes(&self) -> &[VideoMode] {
        &self.info().video_modes
    }
}
