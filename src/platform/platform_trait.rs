// src/platform/platform_trait.rs
//
// Defines the `Platform` trait, which abstracts over the native windowing
// system (X11/RandR or Win32) behind the `WindowingEngine` façade.

use crate::engine::WindowingEngine;
use crate::monitor::Monitor;
use crate::window::{Window, WindowDescriptor};
use anyhow::Result;
use std::rc::{Rc, Weak};

/// Per-backend engine state.
///
/// A platform value is created first, moved into the engine, and then
/// `setup` is called exactly once with a weak reference to that engine.
/// All methods take `&self`; mutable state lives in `Cell`/`RefCell` so the
/// engine can be shared through `Rc` by monitors and windows.
pub trait Platform: Sized + 'static {
    type Monitor: Monitor;
    type Window: Window;

    /// One-time initialization that needs the engine: the first monitor
    /// enumeration and, on Win32, window class registration.
    ///
    /// Fails with `WindowError::AlreadySetUp` on a second call.
    fn setup(&self, engine: &Weak<WindowingEngine<Self>>) -> Result<()>;

    /// Returns the monitor list cached by `setup`.
    ///
    /// Fails with `WindowError::NotSetUp` before `setup`.
    fn monitors(&self) -> Result<Vec<Rc<Self::Monitor>>>;

    /// Drains the events that are already queued. Never blocks.
    fn process_events(&self) -> Result<()>;

    /// `true` once a quit signal was seen or any window of this engine was
    /// destroyed. Dropping a window wrapper counts and is observed by the
    /// next `process_events`. Never cleared.
    fn is_app_exit(&self) -> bool;

    /// Creates a native window.
    ///
    /// Fails with `WindowError::NotSetUp` before `setup`.
    fn create_window(
        &self,
        engine: &Rc<WindowingEngine<Self>>,
        descriptor: &WindowDescriptor,
    ) -> Result<Self::Window>;
}
