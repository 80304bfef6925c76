// src/platform/topology/randr.rs

//! Reconciles RandR's monitor/output/CRTC/mode graph into canonical monitors.
//!
//! RandR describes a screen in several layers: monitor groupings (bounding
//! boxes carrying the primary flag) reference outputs (connectors), an output
//! is driven by a CRTC, and the CRTC scans out one mode. Modes are referenced
//! by id and resolved through a [`ModeCache`] built once per connection.

use crate::monitor::MonitorInfo;
use crate::units::{refresh_rate, IVec2, UVec2};
use crate::video_mode::{DisplayDepth, VideoMode};
use log::{debug, warn};
use std::collections::HashMap;

pub type OutputId = u64;
pub type CrtcId = u64;
pub type ModeId = u64;

/// A RandR monitor grouping.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RandrMonitorRecord {
    pub position: IVec2,
    pub size: UVec2,
    pub primary: bool,
    pub outputs: Vec<OutputId>,
}

/// A RandR output (connector).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OutputRecord {
    pub id: OutputId,
    pub name: String,
    pub connected: bool,
    /// CRTC driving the output; `None` when the output is not lit.
    pub crtc: Option<CrtcId>,
    /// Physical size in millimetres.
    pub physical_size: UVec2,
    /// Supported mode ids, in the order RandR reports them.
    pub modes: Vec<ModeId>,
}

/// Timing data of one RandR mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ModeRecord {
    pub id: ModeId,
    pub resolution: UVec2,
    pub dot_clock: u64,
    pub h_total: u32,
    pub v_total: u32,
}

impl ModeRecord {
    pub fn video_mode(&self, depth: DisplayDepth) -> VideoMode {
        VideoMode::new(
            self.resolution,
            refresh_rate(self.dot_clock, self.h_total, self.v_total),
            depth,
        )
    }
}

/// Mode id lookup table, built from the screen resources once.
#[derive(Debug, Clone, Default)]
pub struct ModeCache {
    modes: HashMap<ModeId, ModeRecord>,
}

impl ModeCache {
    pub fn from_records(records: impl IntoIterator<Item = ModeRecord>) -> Self {
        Self {
            modes: records.into_iter().map(|m| (m.id, m)).collect(),
        }
    }

    pub fn get(&self, id: ModeId) -> Option<&ModeRecord> {
        self.modes.get(&id)
    }

    pub fn video_mode(&self, id: ModeId, depth: DisplayDepth) -> Option<VideoMode> {
        self.get(id).map(|m| m.video_mode(depth))
    }

    pub fn len(&self) -> usize {
        self.modes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modes.is_empty()
    }
}

/// Read access to a RandR screen. Implemented over Xlib by the X11 backend
/// and over plain vectors in tests.
pub trait RandrSource {
    fn monitor_groupings(&self) -> Vec<RandrMonitorRecord>;
    /// Every output id of the screen resources snapshot.
    fn output_ids(&self) -> Vec<OutputId>;
    /// `None` when the output info cannot be fetched.
    fn output(&self, id: OutputId) -> Option<OutputRecord>;
    /// Mode currently scanned out by `crtc`, if any.
    fn crtc_mode(&self, crtc: CrtcId) -> Option<ModeId>;
    /// Default depth of the screen in bits per pixel.
    fn screen_depth(&self) -> u32;
}

/// One canonical monitor plus the RandR ids it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconciledMonitor {
    pub output: OutputId,
    pub crtc: Option<CrtcId>,
    pub info: MonitorInfo,
}

/// Builds one monitor per connected output that belongs to a grouping.
///
/// An output referenced by several groupings takes the geometry of the last
/// one. Mode ids missing from `cache` are left out of the supported list; a
/// missing CRTC or current mode gives a zero-sized 0 Hz current mode.
pub fn reconcile<S: RandrSource + ?Sized>(source: &S, cache: &ModeCache) -> Vec<ReconciledMonitor> {
    let groupings = source.monitor_groupings();
    let mut grouping_of: HashMap<OutputId, &RandrMonitorRecord> = HashMap::new();
    for grouping in &groupings {
        for output in &grouping.outputs {
            grouping_of.insert(*output, grouping);
        }
    }
    debug!(
        "RandR: {} monitor groupings covering {} outputs",
        groupings.len(),
        grouping_of.len()
    );

    let depth = DisplayDepth::from_bits(source.screen_depth());
    let mut monitors = Vec::new();

    for id in source.output_ids() {
        let Some(output) = source.output(id) else {
            warn!("RandR: could not query output {}, skipping", id);
            continue;
        };
        if !output.connected {
            debug!("RandR: output {} ({}) disconnected", id, output.name);
            continue;
        }
        let Some(grouping) = grouping_of.get(&id) else {
            debug!("RandR: output {} ({}) is not part of any monitor", id, output.name);
            continue;
        };

        let video_modes: Vec<VideoMode> = output
            .modes
            .iter()
            .filter_map(|mode| {
                let vm = cache.video_mode(*mode, depth);
                if vm.is_none() {
                    debug!("RandR: output {} lists unknown mode {}", id, mode);
                }
                vm
            })
            .collect();

        let video_mode = output
            .crtc
            .and_then(|crtc| source.crtc_mode(crtc))
            .and_then(|mode| cache.video_mode(mode, depth))
            .unwrap_or_else(|| {
                debug!("RandR: output {} has no current mode", id);
                VideoMode::new(UVec2::ZERO, 0, depth)
            });

        debug!(
            "RandR: monitor {} at ({}, {}) {}x{}, primary={}",
            output.name,
            grouping.position.x,
            grouping.position.y,
            grouping.size.x,
            grouping.size.y,
            grouping.primary
        );

        monitors.push(ReconciledMonitor {
            output: id,
            crtc: output.crtc,
            info: MonitorInfo {
                name: output.name,
                physical_size: output.physical_size,
                size: grouping.size,
                position: grouping.position,
                is_primary: grouping.primary,
                video_mode,
                video_modes,
            },
        });
    }

    monitors
}

#[cfg(test)]
mod tests {
    use super::*;

    const MODE_1080P60: ModeRecord = ModeRecord {
        id: 0x40,
        resolution: UVec2::new(1920, 1080),
        dot_clock: 148_500_000,
        h_total: 2200,
        v_total: 1125,
    };
    const MODE_720P60: ModeRecord = ModeRecord {
        id: 0x41,
        resolution: UVec2::new(1280, 720),
        dot_clock: 74_250_000,
        h_total: 1650,
        v_total: 750,
    };
    const MODE_BROKEN: ModeRecord = ModeRecord {
        id: 0x42,
        resolution: UVec2::new(640, 480),
        dot_clock: 25_175_000,
        h_total: 0,
        v_total: 525,
    };

    #[derive(Default)]
    struct FakeScreen {
        groupings: Vec<RandrMonitorRecord>,
        outputs: Vec<OutputRecord>,
        unreadable: Vec<OutputId>,
        crtcs: HashMap<CrtcId, ModeId>,
        depth: u32,
    }

    impl RandrSource for FakeScreen {
        fn monitor_groupings(&self) -> Vec<RandrMonitorRecord> {
            self.groupings.clone()
        }

        fn output_ids(&self) -> Vec<OutputId> {
            self.outputs
                .iter()
                .map(|o| o.id)
                .chain(self.unreadable.iter().copied())
                .collect()
        }

        fn output(&self, id: OutputId) -> Option<OutputRecord> {
            self.outputs.iter().find(|o| o.id == id).cloned()
        }

        fn crtc_mode(&self, crtc: CrtcId) -> Option<ModeId> {
            self.crtcs.get(&crtc).copied()
        }

        fn screen_depth(&self) -> u32 {
            self.depth
        }
    }

    fn cache() -> ModeCache {
        ModeCache::from_records([MODE_1080P60, MODE_720P60, MODE_BROKEN])
    }

    fn output(id: OutputId, name: &str, crtc: Option<CrtcId>) -> OutputRecord {
        OutputRecord {
            id,
            name: name.to_string(),
            connected: true,
            crtc,
            physical_size: UVec2::new(600, 340),
            modes: vec![MODE_1080P60.id, MODE_720P60.id],
        }
    }

    fn grouping(x: i32, primary: bool, outputs: Vec<OutputId>) -> RandrMonitorRecord {
        RandrMonitorRecord {
            position: IVec2::new(x, 0),
            size: UVec2::new(1920, 1080),
            primary,
            outputs,
        }
    }

    fn dual_head() -> FakeScreen {
        FakeScreen {
            groupings: vec![grouping(0, true, vec![1]), grouping(1920, false, vec![2])],
            outputs: vec![output(1, "DP-1", Some(10)), output(2, "HDMI-1", Some(11))],
            crtcs: HashMap::from([(10, MODE_1080P60.id), (11, MODE_720P60.id)]),
            depth: 24,
            ..Default::default()
        }
    }

    #[test_log::test]
    fn it_should_build_one_monitor_per_grouped_output() {
        let monitors = reconcile(&dual_head(), &cache());
        assert_eq!(monitors.len(), 2);

        let first = &monitors[0].info;
        assert_eq!(first.name, "DP-1");
        assert!(first.is_primary);
        assert_eq!(first.position, IVec2::new(0, 0));
        assert_eq!(first.physical_size, UVec2::new(600, 340));
        assert_eq!(first.video_mode.resolution, UVec2::new(1920, 1080));
        assert_eq!(first.video_mode.refresh_rate, 60);
        assert_eq!(first.video_mode.depth, DisplayDepth::new(8, 8, 8));
        assert_eq!(first.video_modes.len(), 2);
        assert_eq!(first.current_mode_index(), Some(0));

        let second = &monitors[1];
        assert_eq!(second.output, 2);
        assert_eq!(second.crtc, Some(11));
        assert!(!second.info.is_primary);
        assert_eq!(second.info.position, IVec2::new(1920, 0));
        assert_eq!(second.info.video_mode.resolution, UVec2::new(1280, 720));
        assert_eq!(second.info.current_mode_index(), Some(1));
    }

    #[test_log::test]
    fn it_should_skip_disconnected_outputs() {
        let mut screen = dual_head();
        screen.outputs[1].connected = false;
        let monitors = reconcile(&screen, &cache());
        assert_eq!(monitors.len(), 1);
        assert_eq!(monitors[0].info.name, "DP-1");
    }

    #[test]
    fn it_should_skip_outputs_outside_every_grouping() {
        let mut screen = dual_head();
        screen.outputs.push(output(3, "VGA-1", None));
        let monitors = reconcile(&screen, &cache());
        assert_eq!(monitors.len(), 2);
        assert!(monitors.iter().all(|m| m.output != 3));
    }

    #[test]
    fn it_should_skip_unreadable_outputs() {
        let mut screen = dual_head();
        screen.groupings[0].outputs.push(99);
        screen.unreadable.push(99);
        assert_eq!(reconcile(&screen, &cache()).len(), 2);
    }

    #[test]
    fn it_should_let_the_last_grouping_win_for_shared_outputs() {
        let mut screen = dual_head();
        screen.groupings.push(grouping(3840, false, vec![1]));
        let monitors = reconcile(&screen, &cache());
        let dp1 = monitors.iter().find(|m| m.output == 1).unwrap();
        assert_eq!(dp1.info.position, IVec2::new(3840, 0));
        assert!(!dp1.info.is_primary);
    }

    #[test]
    fn it_should_skip_mode_ids_missing_from_the_cache() {
        let mut screen = dual_head();
        screen.outputs[0].modes = vec![0x99, MODE_720P60.id, MODE_BROKEN.id];
        let monitors = reconcile(&screen, &cache());
        let modes = &monitors[0].info.video_modes;
        assert_eq!(modes.len(), 2);
        assert_eq!(modes[0].resolution, UVec2::new(1280, 720));
        assert_eq!(modes[1].refresh_rate, 0);
    }

    #[test]
    fn it_should_fall_back_when_there_is_no_current_mode() {
        let mut screen = dual_head();
        screen.outputs[0].crtc = None;
        screen.crtcs.insert(11, 0x77);
        screen.depth = 16;
        let monitors = reconcile(&screen, &cache());

        let expected = VideoMode::new(UVec2::ZERO, 0, DisplayDepth::new(5, 6, 5));
        assert_eq!(monitors[0].info.video_mode, expected);
        assert_eq!(monitors[1].info.video_mode, expected);
        assert_eq!(monitors[0].info.current_mode_index(), None);
    }

    #[test]
    fn it_should_keep_an_output_that_reports_no_modes() {
        let mut screen = dual_head();
        screen.outputs[1].modes = vec![];
        screen.outputs[1].crtc = None;
        let monitors = reconcile(&screen, &cache());

        assert_eq!(monitors.len(), 2);
        let hdmi = &monitors[1].info;
        assert_eq!(hdmi.name, "HDMI-1");
        assert!(hdmi.video_modes.is_empty());
        assert_eq!(hdmi.video_mode.resolution, UVec2::ZERO);
        assert_eq!(hdmi.video_mode.refresh_rate, 0);
        assert_eq!(hdmi.video_mode.depth, DisplayDepth::new(8, 8, 8));
        assert_eq!(hdmi.current_mode_index(), None);
    }

    #[test]
    fn it_should_accept_an_empty_screen() {
        let screen = FakeScreen::default();
        assert!(reconcile(&screen, &ModeCache::default()).is_empty());
    }
}
