// src/platform/backends/x11/monitor.rs
#![allow(non_snake_case)] // Allow non-snake case for X11 types

use super::connection::Connection;
use super::X11Platform;
use crate::engine::WindowingEngine;
use crate::error::WindowError;
use crate::monitor::{Monitor, MonitorInfo};
use crate::platform::topology::randr::{
    CrtcId, ModeCache, ModeId, ModeRecord, OutputId, OutputRecord, RandrMonitorRecord, RandrSource,
    ReconciledMonitor,
};
use crate::units::{IVec2, UVec2, Vec2};
use anyhow::{anyhow, Result};
use log::{debug, warn};
use std::rc::Weak;
use std::slice;

use libc::c_int;
use x11::{xlib, xrandr};

/// Borrows `len` elements at `ptr`, treating null or non-positive lengths as
/// empty.
///
/// # Safety
///
/// `ptr` must point to at least `len` initialized elements that outlive `'a`.
unsafe fn raw_slice<'a, T>(ptr: *const T, len: c_int) -> &'a [T] {
    if ptr.is_null() || len <= 0 {
        &[]
    } else {
        slice::from_raw_parts(ptr, len as usize)
    }
}

/// RandR screen resources snapshot, freed on drop.
///
/// Must be dropped before the `Connection` it was fetched from.
#[derive(Debug)]
pub struct ScreenResources {
    ptr: *mut xrandr::XRRScreenResources,
}

impl ScreenResources {
    pub fn new(connection: &Connection) -> Result<Self> {
        // SAFETY: valid display and root window.
        let ptr = unsafe { xrandr::XRRGetScreenResources(connection.display(), connection.root()) };
        if ptr.is_null() {
            return Err(anyhow!(
                "XRRGetScreenResources failed. Is the RandR extension available?"
            ));
        }
        Ok(Self { ptr })
    }

    #[inline]
    pub fn raw(&self) -> *mut xrandr::XRRScreenResources {
        self.ptr
    }

    pub fn outputs(&self) -> &[xrandr::RROutput] {
        // SAFETY: the arrays live as long as the snapshot.
        unsafe { raw_slice((*self.ptr).outputs, (*self.ptr).noutput) }
    }

    pub fn modes(&self) -> &[xrandr::XRRModeInfo] {
        // SAFETY: the arrays live as long as the snapshot.
        unsafe { raw_slice((*self.ptr).modes, (*self.ptr).nmode) }
    }

    /// Builds the mode id lookup table used by every enumeration pass.
    pub fn mode_cache(&self) -> ModeCache {
        ModeCache::from_records(self.modes().iter().map(|m| ModeRecord {
            id: m.id as ModeId,
            resolution: UVec2::new(m.width, m.height),
            dot_clock: m.dotClock as u64,
            h_total: m.hTotal,
            v_total: m.vTotal,
        }))
    }
}

impl Drop for ScreenResources {
    fn drop(&mut self) {
        if !self.ptr.is_null() {
            debug!("Freeing RandR screen resources");
            // SAFETY: allocated by XRRGetScreenResources, freed once.
            unsafe { xrandr::XRRFreeScreenResources(self.ptr) };
            self.ptr = std::ptr::null_mut();
        }
    }
}

/// [`RandrSource`] over a live X connection.
pub struct XrandrSource<'a> {
    connection: &'a Connection,
    resources: &'a ScreenResources,
}

impl<'a> XrandrSource<'a> {
    pub fn new(connection: &'a Connection, resources: &'a ScreenResources) -> Self {
        Self {
            connection,
            resources,
        }
    }
}

impl RandrSource for XrandrSource<'_> {
    fn monitor_groupings(&self) -> Vec<RandrMonitorRecord> {
        let mut count: c_int = 0;
        // SAFETY: valid display and root; the list is freed below.
        let infos = unsafe {
            xrandr::XRRGetMonitors(
                self.connection.display(),
                self.connection.root(),
                xlib::False,
                &mut count,
            )
        };
        if infos.is_null() {
            warn!("XRRGetMonitors returned no monitors");
            return Vec::new();
        }

        // SAFETY: `infos` holds `count` entries until XRRFreeMonitors.
        let groupings = unsafe {
            raw_slice(infos, count)
                .iter()
                .map(|m| RandrMonitorRecord {
                    position: IVec2::new(m.x, m.y),
                    size: UVec2::new(m.width.max(0) as u32, m.height.max(0) as u32),
                    primary: m.primary != 0,
                    outputs: raw_slice(m.outputs, m.noutput)
                        .iter()
                        .map(|o| *o as OutputId)
                        .collect(),
                })
                .collect()
        };
        unsafe { xrandr::XRRFreeMonitors(infos) };
        groupings
    }

    fn output_ids(&self) -> Vec<OutputId> {
        self.resources
            .outputs()
            .iter()
            .map(|o| *o as OutputId)
            .collect()
    }

    fn output(&self, id: OutputId) -> Option<OutputRecord> {
        // SAFETY: valid display and resources; the info is freed below.
        let info = unsafe {
            xrandr::XRRGetOutputInfo(
                self.connection.display(),
                self.resources.raw(),
                id as xrandr::RROutput,
            )
        };
        if info.is_null() {
            return None;
        }

        // SAFETY: `info` is valid until XRRFreeOutputInfo.
        let record = unsafe {
            let o = &*info;
            let name_bytes = raw_slice(o.name as *const u8, o.nameLen);
            OutputRecord {
                id,
                name: String::from_utf8_lossy(name_bytes).into_owned(),
                connected: o.connection != xrandr::RR_Disconnected as u16,
                crtc: (o.crtc != 0).then_some(o.crtc as CrtcId),
                physical_size: UVec2::new(o.mm_width as u32, o.mm_height as u32),
                modes: raw_slice(o.modes, o.nmode)
                    .iter()
                    .map(|m| *m as ModeId)
                    .collect(),
            }
        };
        unsafe { xrandr::XRRFreeOutputInfo(info) };
        Some(record)
    }

    fn crtc_mode(&self, crtc: CrtcId) -> Option<ModeId> {
        // SAFETY: valid display and resources; the info is freed below.
        let info = unsafe {
            xrandr::XRRGetCrtcInfo(
                self.connection.display(),
                self.resources.raw(),
                crtc as xrandr::RRCrtc,
            )
        };
        if info.is_null() {
            return None;
        }
        let mode = unsafe { (*info).mode };
        unsafe { xrandr::XRRFreeCrtcInfo(info) };
        (mode != 0).then_some(mode as ModeId)
    }

    fn screen_depth(&self) -> u32 {
        self.connection.depth()
    }
}

/// A monitor found through RandR.
#[derive(Debug)]
pub struct X11Monitor {
    engine: Weak<WindowingEngine<X11Platform>>,
    output: OutputId,
    crtc: Option<CrtcId>,
    info: MonitorInfo,
}

impl X11Monitor {
    pub(super) fn new(engine: Weak<WindowingEngine<X11Platform>>, reconciled: ReconciledMonitor) -> Self {
        Self {
            engine,
            output: reconciled.output,
            crtc: reconciled.crtc,
            info: reconciled.info,
        }
    }

    /// RandR output id.
    pub fn output(&self) -> OutputId {
        self.output
    }

    /// CRTC driving the output, if it is lit.
    pub fn crtc(&self) -> Option<CrtcId> {
        self.crtc
    }
}

impl Monitor for X11Monitor {
    fn info(&self) -> &MonitorInfo {
        &self.info
    }

    /// X11 has no per-monitor DPI; every monitor reports the screen DPI.
    fn dpi(&self) -> Result<Vec2> {
        let engine = self.engine.upgrade().ok_or(WindowError::EngineReleased)?;
        Ok(engine.platform().dpi())
    }
}
