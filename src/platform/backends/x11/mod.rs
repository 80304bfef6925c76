// src/platform/backends/x11/mod.rs

//! X11/RandR backend.
//!
//! One Xlib connection per engine. Monitors come from RandR; DPI comes from
//! the `Xft.dpi` X resource since X11 has no per-monitor DPI.

pub mod connection;
pub mod event;
pub mod monitor;
pub mod window;

pub use connection::Connection;
pub use monitor::X11Monitor;
pub use window::X11Window;

use crate::config::Config;
use crate::engine::WindowingEngine;
use crate::error::WindowError;
use crate::platform::platform_trait::Platform;
use crate::platform::registry::WindowRegistry;
use crate::platform::topology::randr::{self, ModeCache};
use crate::units::{dpi_to_scale, Vec2};
use crate::window::WindowDescriptor;
use anyhow::{Context, Result};
use log::{debug, info};
use monitor::{ScreenResources, XrandrSource};
use once_cell::unsync::OnceCell;
use std::cell::Cell;
use std::rc::{Rc, Weak};
use x11::xlib;

/// Atoms interned once per connection.
#[derive(Debug, Clone, Copy)]
pub struct WmAtoms {
    pub wm_protocols: xlib::Atom,
    pub wm_delete_window: xlib::Atom,
    pub net_wm_name: xlib::Atom,
    pub utf8_string: xlib::Atom,
    pub motif_wm_hints: xlib::Atom,
    pub net_wm_state: xlib::Atom,
    pub net_wm_state_maximized_horz: xlib::Atom,
    pub net_wm_state_maximized_vert: xlib::Atom,
    pub net_frame_extents: xlib::Atom,
}

impl WmAtoms {
    fn intern(connection: &Connection) -> Result<Self> {
        Ok(Self {
            wm_protocols: connection.intern_atom("WM_PROTOCOLS")?,
            wm_delete_window: connection.intern_atom("WM_DELETE_WINDOW")?,
            net_wm_name: connection.intern_atom("_NET_WM_NAME")?,
            utf8_string: connection.intern_atom("UTF8_STRING")?,
            motif_wm_hints: connection.intern_atom("_MOTIF_WM_HINTS")?,
            net_wm_state: connection.intern_atom("_NET_WM_STATE")?,
            net_wm_state_maximized_horz: connection.intern_atom("_NET_WM_STATE_MAXIMIZED_HORZ")?,
            net_wm_state_maximized_vert: connection.intern_atom("_NET_WM_STATE_MAXIMIZED_VERT")?,
            net_frame_extents: connection.intern_atom("_NET_FRAME_EXTENTS")?,
        })
    }
}

/// Engine state for X11.
///
/// Field order matters: the screen resources are freed before the display
/// connection closes.
pub struct X11Platform {
    config: Config,
    monitors: OnceCell<Vec<Rc<X11Monitor>>>,
    registry: WindowRegistry<xlib::Window>,
    atoms: WmAtoms,
    mode_cache: ModeCache,
    app_exit: Cell<bool>,
    resources: ScreenResources,
    connection: Connection,
}

impl X11Platform {
    /// Opens the display and takes the RandR snapshot the mode cache is
    /// built from.
    pub fn new(config: &Config) -> Result<Self> {
        let connection = Connection::new().context("Failed to connect to the X server")?;
        let resources =
            ScreenResources::new(&connection).context("Failed to read RandR screen resources")?;
        let mode_cache = resources.mode_cache();
        debug!("RandR mode cache holds {} modes", mode_cache.len());
        let atoms = WmAtoms::intern(&connection)?;

        Ok(Self {
            config: config.clone(),
            monitors: OnceCell::new(),
            registry: WindowRegistry::new(),
            atoms,
            mode_cache,
            app_exit: Cell::new(false),
            resources,
            connection,
        })
    }

    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn atoms(&self) -> &WmAtoms {
        &self.atoms
    }

    pub fn registry(&self) -> &WindowRegistry<xlib::Window> {
        &self.registry
    }

    pub fn mode_cache(&self) -> &ModeCache {
        &self.mode_cache
    }

    /// Screen DPI: the configured override, else `Xft.dpi`, else the
    /// configured fallback.
    pub fn dpi(&self) -> Vec2 {
        let native = if self.config.dpi.override_dpi.is_some() {
            None
        } else {
            self.connection.xft_dpi()
        };
        Vec2::splat(self.config.dpi.resolve(native))
    }

    pub fn scale(&self) -> Vec2 {
        dpi_to_scale(self.dpi())
    }

    fn ensure_setup(&self) -> Result<(), WindowError> {
        self.monitors.get().map(|_| ()).ok_or(WindowError::NotSetUp)
    }
}

impl Platform for X11Platform {
    type Monitor = X11Monitor;
    type Window = X11Window;

    fn setup(&self, engine: &Weak<WindowingEngine<Self>>) -> Result<()> {
        if self.monitors.get().is_some() {
            return Err(WindowError::AlreadySetUp.into());
        }

        let source = XrandrSource::new(&self.connection, &self.resources);
        let monitors: Vec<Rc<X11Monitor>> = randr::reconcile(&source, &self.mode_cache)
            .into_iter()
            .map(|m| Rc::new(X11Monitor::new(engine.clone(), m)))
            .collect();
        info!("X11: found {} monitors", monitors.len());

        self.monitors
            .set(monitors)
            .map_err(|_| WindowError::AlreadySetUp)?;
        Ok(())
    }

    fn monitors(&self) -> Result<Vec<Rc<X11Monitor>>> {
        Ok(self.monitors.get().ok_or(WindowError::NotSetUp)?.clone())
    }

    fn process_events(&self) -> Result<()> {
        event::process_pending_events(self)
    }

    fn is_app_exit(&self) -> bool {
        self.app_exit.get()
    }

    fn create_window(
        &self,
        engine: &Rc<WindowingEngine<Self>>,
        descriptor: &WindowDescriptor,
    ) -> Result<X11Window> {
        self.ensure_setup()?;
        X11Window::new(engine, descriptor)
    }
}

impl Drop for X11Platform {
    fn drop(&mut self) {
        info!("Shutting down X11 platform");
    }
}
