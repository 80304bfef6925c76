// src/lib.rs

//! Monitor discovery and native window management over X11/RandR and Win32.
//!
//! Everything starts at [`WindowingEngine::create`], which opens the native
//! connection, enumerates monitors and hands out an `Rc` to the engine.

pub mod config;
pub mod engine;
pub mod error;
pub mod frame;
pub mod monitor;
pub mod platform;
pub mod units;
pub mod video_mode;
pub mod window;

pub use config::{Config, CONFIG};
pub use engine::WindowingEngine;
pub use error::WindowError;
pub use frame::FrameInsets;
pub use monitor::{Monitor, MonitorInfo};
pub use platform::{NativePlatform, Platform};
pub use units::{dpi_to_scale, refresh_rate, split_bit_depth, IVec2, Rect, UVec2, Vec2, BASE_DPI};
pub use video_mode::{DisplayDepth, VideoMode};
pub use window::{Window, WindowDescriptor, WindowStyle};
