// src/platform/topology/display_device.rs

//! Walks the Win32 adapter/display list and builds canonical monitors.
//!
//! Win32 reports display adapters (`\\.\DISPLAY1`) and, below each adapter,
//! the displays attached to it. Device capabilities, device modes and the
//! monitor handle are all looked up through the adapter's device name.

use crate::monitor::MonitorInfo;
use crate::units::{IVec2, Rect, UVec2, Vec2};
use crate::video_mode::{DisplayDepth, VideoMode};
use log::{debug, warn};

/// One `DISPLAY_DEVICEW` entry.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DisplayDeviceRecord {
    pub device_name: String,
    /// Human-readable description.
    pub device_string: String,
    pub active: bool,
    pub attached_to_desktop: bool,
}

/// One `DEVMODEW` entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeviceModeRecord {
    pub resolution: UVec2,
    pub refresh_rate: u32,
    pub bits_per_pixel: u32,
    /// Only meaningful for the current-settings mode.
    pub position: IVec2,
}

impl DeviceModeRecord {
    pub fn video_mode(&self) -> VideoMode {
        VideoMode::new(
            self.resolution,
            self.refresh_rate as i32,
            DisplayDepth::from_bits(self.bits_per_pixel),
        )
    }
}

/// Device context capabilities of an adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeviceCaps {
    /// Millimetres.
    pub physical_size: UVec2,
    /// Pixels.
    pub size: UVec2,
}

/// Read access to the Win32 display device API. Implemented over the
/// `windows` crate by the Win32 backend and over plain vectors in tests.
pub trait DisplayDeviceSource {
    type MonitorHandle: Copy;

    /// Adapter `index`, or `None` past the end of the list.
    fn adapter(&self, index: u32) -> Option<DisplayDeviceRecord>;
    /// Display `index` of `adapter`, or `None` past the end of the list.
    fn display(&self, adapter: &str, index: u32) -> Option<DisplayDeviceRecord>;
    fn device_caps(&self, adapter: &str) -> Option<DeviceCaps>;
    /// Supported mode `index`, or `None` past the end of the list.
    fn device_mode(&self, adapter: &str, index: u32) -> Option<DeviceModeRecord>;
    fn current_mode(&self, adapter: &str) -> Option<DeviceModeRecord>;
    /// Monitor handle intersecting `rect` whose device name is `adapter`.
    fn monitor_handle(&self, adapter: &str, rect: Rect) -> Option<Self::MonitorHandle>;
    fn monitor_dpi(&self, handle: Self::MonitorHandle) -> Option<Vec2>;
}

/// One canonical monitor plus the Win32 identities it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumeratedDisplay<H> {
    pub adapter_name: String,
    pub display_name: String,
    pub handle: Option<H>,
    pub dpi: Vec2,
    pub info: MonitorInfo,
}

/// Enumerates every active display of every active, desktop-attached
/// adapter. An adapter without displays stands in as its own display.
/// Displays without current settings or a device context are skipped.
/// Monitors whose handle cannot be found report `fallback_dpi`.
pub fn enumerate<S: DisplayDeviceSource + ?Sized>(
    source: &S,
    fallback_dpi: f32,
) -> Vec<EnumeratedDisplay<S::MonitorHandle>> {
    let mut monitors = Vec::new();

    let mut adapter_index = 0;
    while let Some(adapter) = source.adapter(adapter_index) {
        adapter_index += 1;
        debug!("Adapter: {} ; {}", adapter.device_name, adapter.device_string);

        if !adapter.active {
            debug!("{} inactive", adapter.device_name);
            continue;
        }
        if !adapter.attached_to_desktop {
            debug!("{} not attached to the desktop", adapter.device_name);
            continue;
        }

        let mut display_index = 0;
        while let Some(display) = source.display(&adapter.device_name, display_index) {
            display_index += 1;
            if !display.active {
                debug!("Display {} inactive", display.device_name);
                continue;
            }
            if let Some(monitor) = build_monitor(source, &adapter, &display, fallback_dpi) {
                monitors.push(monitor);
            }
        }

        if display_index == 0 {
            debug!("{} has no displays, using the adapter itself", adapter.device_name);
            if let Some(monitor) = build_monitor(source, &adapter, &adapter, fallback_dpi) {
                monitors.push(monitor);
            }
        }
    }

    monitors
}

fn build_monitor<S: DisplayDeviceSource + ?Sized>(
    source: &S,
    adapter: &DisplayDeviceRecord,
    display: &DisplayDeviceRecord,
    fallback_dpi: f32,
) -> Option<EnumeratedDisplay<S::MonitorHandle>> {
    let adapter_name = adapter.device_name.as_str();

    let Some(current) = source.current_mode(adapter_name) else {
        warn!("No current display settings for {}, skipping", adapter_name);
        return None;
    };
    let Some(caps) = source.device_caps(adapter_name) else {
        warn!("No device context for {}, skipping", adapter_name);
        return None;
    };

    let video_modes: Vec<VideoMode> = (0..)
        .map_while(|i| source.device_mode(adapter_name, i))
        .map(|m| m.video_mode())
        .collect();

    let position = current.position;
    let rect = Rect::new(position, current.resolution);
    let handle = source.monitor_handle(adapter_name, rect);
    let dpi = handle
        .and_then(|h| source.monitor_dpi(h))
        .unwrap_or_else(|| {
            debug!("No monitor DPI for {}, using {}", adapter_name, fallback_dpi);
            Vec2::splat(fallback_dpi)
        });

    let name = if display.device_string.is_empty() {
        display.device_name.clone()
    } else {
        display.device_string.clone()
    };

    debug!(
        "Monitor {} ({}) at ({}, {}) {}x{}, dpi {}x{}",
        name, display.device_name, position.x, position.y, caps.size.x, caps.size.y, dpi.x, dpi.y
    );

    Some(EnumeratedDisplay {
        adapter_name: adapter.device_name.clone(),
        display_name: display.device_name.clone(),
        handle,
        dpi,
        info: MonitorInfo {
            name,
            physical_size: caps.physical_size,
            size: caps.size,
            position,
            is_primary: position == IVec2::ORIGIN,
            video_mode: current.video_mode(),
            video_modes,
        },
    })
}
