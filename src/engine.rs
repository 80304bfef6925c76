// src/engine.rs

//! The `WindowingEngine` façade.
//!
//! The engine is the root owner of all native state. It is only handed out
//! as an `Rc`, built with `Rc::new_cyclic` so that its own weak reference
//! exists before the backend runs `setup`. Monitors created during setup
//! keep that weak reference; windows keep a strong one.
//!
//! The engine is not thread-safe. It is `!Send` and `!Sync` (through `Rc`
//! and `Cell`) and must stay on the thread that created it, which on Win32
//! is also the thread whose message queue `process_events` drains.

use crate::config::{Config, CONFIG};
use crate::platform::backends::NativePlatform;
use crate::platform::Platform;
use crate::window::WindowDescriptor;
use anyhow::{Context, Result};
use log::{debug, info};
use std::rc::{Rc, Weak};

pub struct WindowingEngine<P: Platform = NativePlatform> {
    self_ref: Weak<Self>,
    platform: P,
}

impl WindowingEngine {
    /// Creates the engine for the native platform with the process-wide
    /// [`CONFIG`].
    pub fn create() -> Result<Rc<Self>> {
        Self::create_with_config(&CONFIG)
    }

    pub fn create_with_config(config: &Config) -> Result<Rc<Self>> {
        info!("Creating windowing engine");
        let platform =
            NativePlatform::new(config).context("Failed to initialize native windowing platform")?;
        Self::with_platform(platform)
    }
}

impl<P: Platform> WindowingEngine<P> {
    /// Wraps an already constructed platform and runs its `setup`.
    pub fn with_platform(platform: P) -> Result<Rc<Self>> {
        let engine = Rc::new_cyclic(|weak| WindowingEngine {
            self_ref: weak.clone(),
            platform,
        });
        engine
            .platform
            .setup(&engine.self_ref)
            .context("Windowing platform setup failed")?;
        debug!("Windowing engine ready");
        Ok(engine)
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn downgrade(&self) -> Weak<Self> {
        self.self_ref.clone()
    }

    pub fn monitors(&self) -> Result<Vec<Rc<P::Monitor>>> {
        self.platform.monitors()
    }

    pub fn process_events(&self) -> Result<()> {
        self.platform.process_events()
    }

    pub fn is_app_exit(&self) -> bool {
        self.platform.is_app_exit()
    }

    /// Creates a window. The window holds a strong reference to the engine.
    pub fn create_window(self: &Rc<Self>, descriptor: &WindowDescriptor) -> Result<P::Window> {
        self.platform.create_window(self, descriptor)
    }
}

impl<P: Platform> Drop for WindowingEngine<P> {
    fn drop(&mut self) {
        info!("Dropping windowing engine");
    }
}
