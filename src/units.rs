// src/units.rs

//! Small geometry types and the numeric conversions shared by every backend.
//!
//! Both backends go through these functions so that a scale factor, a split
//! colour depth or a refresh rate means exactly the same thing on X11 and on
//! Win32.

use crate::video_mode::DisplayDepth;
use serde::{Deserialize, Serialize};
use std::ops::Div;

/// DPI that corresponds to a scale factor of 1.0.
pub const BASE_DPI: f32 = 96.0;

/// Unsigned 2D extent (pixel sizes, resolutions, millimetre sizes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct UVec2 {
    pub x: u32,
    pub y: u32,
}

impl UVec2 {
    pub const ZERO: Self = Self { x: 0, y: 0 };

    #[inline]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// Signed 2D position, relative to the virtual desktop origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct IVec2 {
    pub x: i32,
    pub y: i32,
}

impl IVec2 {
    pub const ORIGIN: Self = Self { x: 0, y: 0 };

    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Per-axis floating point pair, used for DPI and scale factors.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub const fn splat(v: f32) -> Self {
        Self { x: v, y: v }
    }
}

impl Div<f32> for Vec2 {
    type Output = Vec2;

    fn div(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x / rhs, self.y / rhs)
    }
}

impl From<UVec2> for Vec2 {
    fn from(v: UVec2) -> Self {
        Vec2::new(v.x as f32, v.y as f32)
    }
}

/// Axis-aligned rectangle on the virtual desktop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub origin: IVec2,
    pub extent: UVec2,
}

impl Rect {
    pub const fn new(origin: IVec2, extent: UVec2) -> Self {
        Self { origin, extent }
    }

    #[inline]
    pub fn right(&self) -> i32 {
        self.origin.x.saturating_add(self.extent.x as i32)
    }

    #[inline]
    pub fn bottom(&self) -> i32 {
        self.origin.y.saturating_add(self.extent.y as i32)
    }
}

/// Converts a DPI pair into a scale factor pair (`dpi / 96`).
#[inline]
pub fn dpi_to_scale(dpi: Vec2) -> Vec2 {
    dpi / BASE_DPI
}

/// Splits a native pixel depth into per-channel bit counts.
///
/// A 32-bit depth is treated as 24 bits of colour plus an unused alpha
/// channel. Leftover bits go to green first, then red.
pub fn split_bit_depth(total_bits: u32) -> DisplayDepth {
    let bits = if total_bits == 32 { 24 } else { total_bits };
    let base = bits / 3;
    let remainder = bits % 3;

    DisplayDepth {
        red: base + u32::from(remainder == 2),
        green: base + u32::from(remainder >= 1),
        blue: base,
    }
}

/// Refresh rate in whole Hz from a mode's pixel clock and total timings.
///
/// Returns 0 when either total is zero.
pub fn refresh_rate(dot_clock: u64, h_total: u32, v_total: u32) -> i32 {
    if h_total == 0 || v_total == 0 {
        return 0;
    }
    let frame_pixels = u64::from(h_total) * u64::from(v_total);
    (dot_clock as f64 / frame_pixels as f64).round() as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dpi_to_scale_at_base_dpi_is_identity() {
        assert_eq!(dpi_to_scale(Vec2::splat(96.0)), Vec2::new(1.0, 1.0));
    }

    #[test]
    fn test_dpi_to_scale_doubles_at_192() {
        assert_eq!(dpi_to_scale(Vec2::splat(192.0)), Vec2::new(2.0, 2.0));
    }

    #[test]
    fn test_dpi_to_scale_is_per_axis() {
        let scale = dpi_to_scale(Vec2::new(144.0, 96.0));
        assert_eq!(scale, Vec2::new(1.5, 1.0));
    }

    #[test]
    fn test_split_bit_depth_common_depths() {
        assert_eq!(split_bit_depth(24), DisplayDepth::new(8, 8, 8));
        assert_eq!(split_bit_depth(32), DisplayDepth::new(8, 8, 8));
        assert_eq!(split_bit_depth(16), DisplayDepth::new(5, 6, 5));
        assert_eq!(split_bit_depth(15), DisplayDepth::new(5, 5, 5));
    }

    #[test]
    fn test_split_bit_depth_remainder_two_goes_to_green_then_red() {
        // 8 = 2*3 + 2
        assert_eq!(split_bit_depth(8), DisplayDepth::new(3, 3, 2));
        // 30 = 10*3, no remainder
        assert_eq!(split_bit_depth(30), DisplayDepth::new(10, 10, 10));
    }

    #[test]
    fn test_split_bit_depth_channels_sum_to_normalized_depth() {
        for bits in 0..=48u32 {
            let depth = split_bit_depth(bits);
            let expected = if bits == 32 { 24 } else { bits };
            assert_eq!(depth.red + depth.green + depth.blue, expected, "bits={}", bits);
        }
    }

    #[test]
    fn test_refresh_rate_1080p60() {
        assert_eq!(refresh_rate(148_500_000, 2200, 1125), 60);
    }

    #[test]
    fn test_refresh_rate_rounds_to_nearest() {
        // 59.94 Hz NTSC-style timing rounds to 60.
        assert_eq!(refresh_rate(148_351_648, 2200, 1125), 60);
        // 74.25 MHz / (1650 * 750) = 60.0
        assert_eq!(refresh_rate(74_250_000, 1650, 750), 60);
    }

    #[test]
    fn test_refresh_rate_zero_totals_yield_zero() {
        assert_eq!(refresh_rate(148_500_000, 0, 1125), 0);
        assert_eq!(refresh_rate(148_500_000, 2200, 0), 0);
        assert_eq!(refresh_rate(0, 0, 0), 0);
    }

    #[test]
    fn test_rect_edges() {
        let rect = Rect::new(IVec2::new(-1920, 0), UVec2::new(1920, 1080));
        assert_eq!(rect.right(), 0);
        assert_eq!(rect.bottom(), 1080);
    }
}
