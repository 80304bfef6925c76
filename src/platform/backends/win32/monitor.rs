// src/platform/backends/win32/monitor.rs

use super::{from_wide, widestring, Win32Platform};
use crate::engine::WindowingEngine;
use crate::error::WindowError;
use crate::monitor::{Monitor, MonitorInfo};
use crate::platform::topology::display_device::{
    DeviceCaps, DeviceModeRecord, DisplayDeviceRecord, DisplayDeviceSource, EnumeratedDisplay,
};
use crate::units::{IVec2, Rect, UVec2, Vec2};
use anyhow::Result;
use log::{debug, trace};
use std::rc::Weak;

use windows::core::PCWSTR;
use windows::Win32::Foundation::{BOOL, LPARAM, RECT};
use windows::Win32::Graphics::Gdi::{
    CreateDCW, DeleteDC, EnumDisplayDevicesW, EnumDisplayMonitors, EnumDisplaySettingsW,
    GetDeviceCaps, GetMonitorInfoW, DEVMODEW, DISPLAY_DEVICEW, DISPLAY_DEVICE_ACTIVE,
    DISPLAY_DEVICE_ATTACHED_TO_DESKTOP, ENUM_CURRENT_SETTINGS, ENUM_DISPLAY_SETTINGS_MODE, HDC,
    HMONITOR, HORZRES, HORZSIZE, MONITORINFOEXW, VERTRES, VERTSIZE,
};
use windows::Win32::UI::HiDpi::{GetDpiForMonitor, MDT_EFFECTIVE_DPI};

fn display_device(parent: Option<&[u16]>, index: u32) -> Option<DisplayDeviceRecord> {
    let mut device = DISPLAY_DEVICEW {
        cb: std::mem::size_of::<DISPLAY_DEVICEW>() as u32,
        ..Default::default()
    };
    let parent = parent.map_or(PCWSTR::null(), |p| PCWSTR(p.as_ptr()));
    // SAFETY: `device.cb` is initialized and `parent` is NUL-terminated or null.
    let found = unsafe { EnumDisplayDevicesW(parent, index, &mut device, 0) }.as_bool();
    if !found {
        return None;
    }
    Some(DisplayDeviceRecord {
        device_name: from_wide(&device.DeviceName),
        device_string: from_wide(&device.DeviceString),
        active: device.StateFlags.contains(DISPLAY_DEVICE_ACTIVE),
        attached_to_desktop: device.StateFlags.contains(DISPLAY_DEVICE_ATTACHED_TO_DESKTOP),
    })
}

fn device_mode(adapter: &str, mode: ENUM_DISPLAY_SETTINGS_MODE) -> Option<DeviceModeRecord> {
    let name = widestring(adapter);
    let mut dm = DEVMODEW {
        dmSize: std::mem::size_of::<DEVMODEW>() as u16,
        ..Default::default()
    };
    // SAFETY: `dm.dmSize` is initialized and `name` is NUL-terminated.
    let found = unsafe { EnumDisplaySettingsW(PCWSTR(name.as_ptr()), mode, &mut dm) }.as_bool();
    if !found {
        return None;
    }
    // SAFETY: display devices fill the positional arm of the union.
    let position = unsafe { dm.Anonymous1.Anonymous2.dmPosition };
    Some(DeviceModeRecord {
        resolution: UVec2::new(dm.dmPelsWidth, dm.dmPelsHeight),
        refresh_rate: dm.dmDisplayFrequency,
        bits_per_pixel: dm.dmBitsPerPel,
        position: IVec2::new(position.x, position.y),
    })
}

struct MonitorSearch {
    device_name: String,
    found: Option<HMONITOR>,
}

unsafe extern "system" fn match_monitor(
    monitor: HMONITOR,
    _hdc: HDC,
    _rect: *mut RECT,
    data: LPARAM,
) -> BOOL {
    let search = &mut *(data.0 as *mut MonitorSearch);
    let mut info = MONITORINFOEXW::default();
    info.monitorInfo.cbSize = std::mem::size_of::<MONITORINFOEXW>() as u32;
    if GetMonitorInfoW(monitor, &mut info.monitorInfo as *mut _ as *mut _).as_bool()
        && from_wide(&info.szDevice) == search.device_name
    {
        search.found = Some(monitor);
        return BOOL(0);
    }
    BOOL(1)
}

/// [`DisplayDeviceSource`] over the live Win32 display API.
pub struct Win32DisplayDevices;

impl DisplayDeviceSource for Win32DisplayDevices {
    type MonitorHandle = HMONITOR;

    fn adapter(&self, index: u32) -> Option<DisplayDeviceRecord> {
        display_device(None, index)
    }

    fn display(&self, adapter: &str, index: u32) -> Option<DisplayDeviceRecord> {
        display_device(Some(&widestring(adapter)), index)
    }

    fn device_caps(&self, adapter: &str) -> Option<DeviceCaps> {
        let driver = widestring("DISPLAY");
        let device = widestring(adapter);
        // SAFETY: both strings are NUL-terminated; the DC is deleted below.
        unsafe {
            let hdc = CreateDCW(
                PCWSTR(driver.as_ptr()),
                PCWSTR(device.as_ptr()),
                PCWSTR::null(),
                None,
            );
            if hdc.is_invalid() {
                return None;
            }
            let caps = DeviceCaps {
                physical_size: UVec2::new(
                    GetDeviceCaps(hdc, HORZSIZE).max(0) as u32,
                    GetDeviceCaps(hdc, VERTSIZE).max(0) as u32,
                ),
                size: UVec2::new(
                    GetDeviceCaps(hdc, HORZRES).max(0) as u32,
                    GetDeviceCaps(hdc, VERTRES).max(0) as u32,
                ),
            };
            let _ = DeleteDC(hdc);
            Some(caps)
        }
    }

    fn device_mode(&self, adapter: &str, index: u32) -> Option<DeviceModeRecord> {
        device_mode(adapter, ENUM_DISPLAY_SETTINGS_MODE(index))
    }

    fn current_mode(&self, adapter: &str) -> Option<DeviceModeRecord> {
        device_mode(adapter, ENUM_CURRENT_SETTINGS)
    }

    fn monitor_handle(&self, adapter: &str, rect: Rect) -> Option<HMONITOR> {
        let clip = RECT {
            left: rect.origin.x,
            top: rect.origin.y,
            right: rect.right(),
            bottom: rect.bottom(),
        };
        let mut search = MonitorSearch {
            device_name: adapter.to_string(),
            found: None,
        };
        // SAFETY: `search` outlives the enumeration; the callback only runs
        // inside this call.
        unsafe {
            let _ = EnumDisplayMonitors(
                HDC::default(),
                Some(&clip as *const RECT),
                Some(match_monitor),
                LPARAM(&mut search as *mut MonitorSearch as isize),
            );
        }
        trace!("Monitor handle for {}: {:?}", adapter, search.found);
        search.found
    }

    fn monitor_dpi(&self, handle: HMONITOR) -> Option<Vec2> {
        let (mut x, mut y) = (0u32, 0u32);
        // SAFETY: `handle` came from EnumDisplayMonitors.
        match unsafe { GetDpiForMonitor(handle, MDT_EFFECTIVE_DPI, &mut x, &mut y) } {
            Ok(()) => Some(Vec2::new(x as f32, y as f32)),
            Err(e) => {
                debug!("GetDpiForMonitor failed: {}", e);
                None
            }
        }
    }
}

/// A monitor found through the Win32 display device API.
#[derive(Debug)]
pub struct Win32Monitor {
    engine: Weak<WindowingEngine<Win32Platform>>,
    adapter_name: String,
    display_name: String,
    handle: Option<HMONITOR>,
    dpi: Vec2,
    info: MonitorInfo,
}

impl Win32Monitor {
    pub(super) fn new(
        engine: Weak<WindowingEngine<Win32Platform>>,
        display: EnumeratedDisplay<HMONITOR>,
    ) -> Self {
        Self {
            engine,
            adapter_name: display.adapter_name,
            display_name: display.display_name,
            handle: display.handle,
            dpi: display.dpi,
            info: display.info,
        }
    }

    /// Adapter device name, e.g. `\\.\DISPLAY1`.
    pub fn adapter_name(&self) -> &str {
        &self.adapter_name
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn handle(&self) -> Option<HMONITOR> {
        self.handle
    }
}

impl Monitor for Win32Monitor {
    fn info(&self) -> &MonitorInfo {
        &self.info
    }

    /// Effective DPI captured at enumeration, unless the configuration
    /// overrides it.
    fn dpi(&self) -> Result<Vec2> {
        let engine = self.engine.upgrade().ok_or(WindowError::EngineReleased)?;
        let dpi = &engine.platform().config().dpi;
        Ok(dpi.override_dpi.map_or(self.dpi, Vec2::splat))
    }
}
