// src/video_mode.rs

//! Canonical video mode record shared by both backends.

use crate::units::{split_bit_depth, UVec2};
use std::fmt;

/// Bits per colour channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DisplayDepth {
    pub red: u32,
    pub green: u32,
    pub blue: u32,
}

impl DisplayDepth {
    pub const fn new(red: u32, green: u32, blue: u32) -> Self {
        Self { red, green, blue }
    }

    /// Builds a depth from a native bits-per-pixel value.
    pub fn from_bits(total_bits: u32) -> Self {
        split_bit_depth(total_bits)
    }

    /// Sum of the three channels.
    pub fn total_bits(&self) -> u32 {
        self.red + self.green + self.blue
    }
}

/// A resolution, refresh rate and colour depth triple.
///
/// `refresh_rate` is 0 when the native layer could not provide one.
/// Equality is exact on all three fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct VideoMode {
    pub resolution: UVec2,
    pub refresh_rate: i32,
    pub depth: DisplayDepth,
}

impl VideoMode {
    pub const fn new(resolution: UVec2, refresh_rate: i32, depth: DisplayDepth) -> Self {
        Self {
            resolution,
            refresh_rate,
            depth,
        }
    }
}

impl fmt::Display for VideoMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} x {} @ {} [{},{},{}]",
            self.resolution.x,
            self.resolution.y,
            self.refresh_rate,
            self.depth.red,
            self.depth.green,
            self.depth.blue
        )
    }
}
