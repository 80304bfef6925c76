// src/frame.rs

//! Portable model of window decoration chrome.
//!
//! A window's requested size is its client area. The outer rectangle adds the
//! frame insets, which depend on the window style and the DPI scale. Win32
//! computes the same thing with `AdjustWindowRectExForDpi`; X11 prefers the
//! window manager's `_NET_FRAME_EXTENTS` and falls back to this model.

use crate::units::{UVec2, Vec2};
use crate::window::WindowStyle;
use serde::{Deserialize, Serialize};

/// Frame thickness on each edge, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FrameInsets {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl FrameInsets {
    pub const NONE: Self = Self::new(0, 0, 0, 0);

    pub const fn new(left: u32, top: u32, right: u32, bottom: u32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Insets for a window of the given style, scaling the 96-DPI `base`
    /// insets by `scale`. Undecorated windows have no frame.
    pub fn for_style(style: WindowStyle, base: FrameInsets, scale: Vec2) -> Self {
        if !style.contains(WindowStyle::DECORATED) {
            return Self::NONE;
        }
        let sx = |v: u32| (v as f32 * scale.x).round() as u32;
        let sy = |v: u32| (v as f32 * scale.y).round() as u32;
        Self::new(sx(base.left), sy(base.top), sx(base.right), sy(base.bottom))
    }

    #[inline]
    pub fn horizontal(&self) -> u32 {
        self.left.saturating_add(self.right)
    }

    #[inline]
    pub fn vertical(&self) -> u32 {
        self.top.saturating_add(self.bottom)
    }
}

/// Outer window size for a client-area size.
pub fn client_to_outer(client: UVec2, insets: FrameInsets) -> UVec2 {
    UVec2::new(
        client.x.saturating_add(insets.horizontal()),
        client.y.saturating_add(insets.vertical()),
    )
}

/// Client-area size for an outer window size. Saturates at zero.
pub fn outer_to_client(outer: UVec2, insets: FrameInsets) -> UVec2 {
    UVec2::new(
        outer.x.saturating_sub(insets.horizontal()),
        outer.y.saturating_sub(insets.vertical()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: FrameInsets = FrameInsets::new(8, 31, 8, 8);

    #[test]
    fn test_undecorated_window_has_no_frame() {
        let insets = FrameInsets::for_style(WindowStyle::empty(), BASE, Vec2::splat(2.0));
        assert_eq!(insets, FrameInsets::NONE);
        let client = UVec2::new(640, 480);
        assert_eq!(client_to_outer(client, insets), client);
    }

    #[test]
    fn test_insets_scale_with_dpi() {
        let insets = FrameInsets::for_style(WindowStyle::DECORATED, BASE, Vec2::splat(1.5));
        assert_eq!(insets, FrameInsets::new(12, 47, 12, 12));
    }

    #[test]
    fn test_client_outer_round_trip() {
        for scale in [1.0f32, 1.25, 1.5, 2.0] {
            let insets = FrameInsets::for_style(
                WindowStyle::DECORATED | WindowStyle::RESIZABLE,
                BASE,
                Vec2::splat(scale),
            );
            let client = UVec2::new(1280, 720);
            let outer = client_to_outer(client, insets);
            assert_eq!(outer.x, client.x + insets.horizontal());
            assert_eq!(outer.y, client.y + insets.vertical());
            assert_eq!(outer_to_client(outer, insets), client, "scale={}", scale);
        }
    }

    #[test]
    fn test_outer_smaller_than_frame_saturates() {
        let client = outer_to_client(UVec2::new(4, 4), BASE);
        assert_eq!(client, UVec2::ZERO);
    }

    #[test]
    fn test_oversized_configured_frame_saturates() {
        let config = crate::config::Config::from_json(
            r#"{ "window": { "frame": { "left": 4294967295, "top": 4294967295, "right": 1, "bottom": 1 } } }"#,
        )
        .unwrap();
        let insets = config.window.frame;
        assert_eq!(insets.horizontal(), u32::MAX);
        assert_eq!(insets.vertical(), u32::MAX);
        assert_eq!(
            client_to_outer(UVec2::new(640, 480), insets),
            UVec2::new(u32::MAX, u32::MAX)
        );
        assert_eq!(outer_to_client(UVec2::new(640, 480), insets), UVec2::ZERO);
    }
}
