// src/window.rs

//! The backend-neutral window contract.
//!
//! `X11Window` and `Win32Window` implement [`Window`]; client code is written
//! against the trait and the engine picks the concrete type through
//! `Platform::Window`. Every operation on a window whose native handle was
//! already destroyed (for instance by the user closing it) returns
//! [`WindowError::WindowDestroyed`](crate::error::WindowError::WindowDestroyed).

use crate::config::{WindowConfig, CONFIG};
use crate::units::{dpi_to_scale, IVec2, UVec2, Vec2};
use anyhow::Result;
use bitflags::bitflags;
use std::fmt;

bitflags! {
    /// Native style bits that affect the window frame.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct WindowStyle: u8 {
        /// Title bar and border drawn by the system or window manager.
        const DECORATED = 1 << 0;
        const RESIZABLE = 1 << 1;
        const VISIBLE   = 1 << 2;
    }
}

impl WindowStyle {
    pub fn from_flags(decorated: bool, visible: bool) -> Self {
        let mut style = WindowStyle::empty();
        style.set(WindowStyle::DECORATED | WindowStyle::RESIZABLE, decorated);
        style.set(WindowStyle::VISIBLE, visible);
        style
    }
}

/// Parameters for creating a window.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowDescriptor {
    pub title: String,
    /// Client-area size in pixels.
    pub size: UVec2,
    pub position: IVec2,
    pub decorated: bool,
    /// Show the window as soon as it is created.
    pub visible: bool,
}

impl WindowDescriptor {
    pub fn from_config(config: &WindowConfig) -> Self {
        Self {
            title: config.default_title.clone(),
            size: config.default_size,
            position: config.default_position,
            decorated: config.decorated,
            visible: config.show_on_create,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_size(mut self, size: UVec2) -> Self {
        self.size = size;
        self
    }

    pub fn with_position(mut self, position: IVec2) -> Self {
        self.position = position;
        self
    }

    pub fn with_decorated(mut self, decorated: bool) -> Self {
        self.decorated = decorated;
        self
    }

    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    pub fn style(&self) -> WindowStyle {
        WindowStyle::from_flags(self.decorated, self.visible)
    }
}

impl Default for WindowDescriptor {
    fn default() -> Self {
        Self::from_config(&CONFIG.window)
    }
}

/// A native application window.
///
/// Sizes are client-area sizes unless the method says otherwise. Dropping
/// the value destroys the native window if it is still alive.
pub trait Window {
    /// Native handle type (`xlib::Window` on X11, `HWND` on Win32).
    type Handle: Copy + fmt::Debug;

    fn title(&self) -> Result<String>;
    fn set_title(&mut self, title: &str) -> Result<()>;

    /// Client-area size in pixels.
    fn size(&self) -> Result<UVec2>;
    /// Resizes so that the client area becomes `size`.
    fn set_size(&mut self, size: UVec2) -> Result<()>;
    /// Size including the frame.
    fn outer_size(&self) -> Result<UVec2>;

    /// Position of the outer frame on the virtual desktop.
    fn position(&self) -> Result<IVec2>;
    /// Moves the window without forcing a repaint.
    fn set_position(&mut self, position: IVec2) -> Result<()>;

    fn decorated(&self) -> bool;
    /// Switches between a framed and a borderless window. No-op when the
    /// state does not change.
    fn set_decorated(&mut self, decorated: bool) -> Result<()>;

    fn dpi(&self) -> Result<Vec2>;
    fn scale(&self) -> Result<Vec2> {
        self.dpi().map(dpi_to_scale)
    }

    fn restore(&mut self) -> Result<()>;
    fn maximize(&mut self) -> Result<()>;
    fn minimize(&mut self) -> Result<()>;
    fn show(&mut self) -> Result<()>;
    fn hide(&mut self) -> Result<()>;

    fn platform_handle(&self) -> Self::Handle;

    /// `false` once the native window has been destroyed.
    fn is_alive(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_defaults_follow_window_config() {
        let config = WindowConfig::default();
        let desc = WindowDescriptor::from_config(&config);
        assert_eq!(desc.title, "kat");
        assert_eq!(desc.size, UVec2::new(800, 600));
        assert!(desc.decorated);
        assert!(desc.visible);
    }

    #[test]
    fn test_descriptor_builders() {
        let desc = WindowDescriptor::from_config(&WindowConfig::default())
            .with_title("game")
            .with_size(UVec2::new(1280, 720))
            .with_position(IVec2::new(-100, 40))
            .with_decorated(false)
            .with_visible(false);
        assert_eq!(desc.title, "game");
        assert_eq!(desc.size, UVec2::new(1280, 720));
        assert_eq!(desc.position, IVec2::new(-100, 40));
        assert_eq!(desc.style(), WindowStyle::empty());
    }

    #[test]
    fn test_style_from_flags() {
        assert_eq!(
            WindowStyle::from_flags(true, true),
            WindowStyle::DECORATED | WindowStyle::RESIZABLE | WindowStyle::VISIBLE
        );
        assert_eq!(WindowStyle::from_flags(false, true), WindowStyle::VISIBLE);
    }
}
