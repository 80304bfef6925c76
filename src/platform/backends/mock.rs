// src/platform/backends/mock.rs

use crate::config::Config;
use crate::engine::WindowingEngine;
use crate::error::WindowError;
use crate::frame::{client_to_outer, FrameInsets};
use crate::monitor::{Monitor, MonitorInfo};
use crate::platform::platform_trait::Platform;
use crate::platform::registry::{WindowRegistry, WindowState};
use crate::units::{IVec2, UVec2, Vec2};
use crate::window::{Window, WindowDescriptor, WindowStyle};
use anyhow::Result;
use log::trace;
use once_cell::unsync::OnceCell;
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::rc::{Rc, Weak};

/// Native events the mock can be fed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockEvent {
    /// The user closed the window with this handle.
    Close(u32),
    /// The application was asked to quit.
    Quit,
    /// The native window with this handle is gone.
    Destroyed(u32),
    /// Traffic that carries no lifecycle meaning.
    Noise,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowState {
    Normal,
    Maximized,
    Minimized,
    Hidden,
}

pub struct MockPlatform {
    config: Config,
    fixtures: Vec<MonitorInfo>,
    monitors: OnceCell<Vec<Rc<MockMonitor>>>,
    registry: WindowRegistry<u32>,
    events: RefCell<VecDeque<MockEvent>>,
    next_handle: Cell<u32>,
    destroy_calls: RefCell<HashMap<u32, usize>>,
    app_exit: Cell<bool>,
}

impl MockPlatform {
    pub fn new(fixtures: Vec<MonitorInfo>) -> Self {
        Self::with_config(fixtures, Config::default())
    }

    pub fn with_config(fixtures: Vec<MonitorInfo>, config: Config) -> Self {
        Self {
            config,
            fixtures,
            monitors: OnceCell::new(),
            registry: WindowRegistry::new(),
            events: RefCell::new(VecDeque::new()),
            next_handle: Cell::new(1),
            destroy_calls: RefCell::new(HashMap::new()),
            app_exit: Cell::new(false),
        }
    }

    pub fn push_event(&self, event: MockEvent) {
        self.events.borrow_mut().push_back(event);
    }

    pub fn pending_events(&self) -> usize {
        self.events.borrow().len()
    }

    /// Number of times the native window `handle` was destroyed.
    pub fn destroy_calls(&self, handle: u32) -> usize {
        self.destroy_calls.borrow().get(&handle).copied().unwrap_or(0)
    }

    pub fn registry(&self) -> &WindowRegistry<u32> {
        &self.registry
    }

    pub fn dpi(&self) -> Vec2 {
        Vec2::splat(self.config.dpi.resolve(None))
    }

    fn destroy_native(&self, handle: u32) {
        trace!("MockPlatform: destroying window {}", handle);
        *self.destroy_calls.borrow_mut().entry(handle).or_insert(0) += 1;
        self.events.borrow_mut().push_back(MockEvent::Destroyed(handle));
    }
}

impl Platform for MockPlatform {
    type Monitor = MockMonitor;
    type Window = MockWindow;

    fn setup(&self, engine: &Weak<WindowingEngine<Self>>) -> Result<()> {
        let monitors = self
            .fixtures
            .iter()
            .map(|info| {
                Rc::new(MockMonitor {
                    engine: engine.clone(),
                    info: info.clone(),
                })
            })
            .collect();
        self.monitors
            .set(monitors)
            .map_err(|_| WindowError::AlreadySetUp)?;
        Ok(())
    }

    fn monitors(&self) -> Result<Vec<Rc<MockMonitor>>> {
        Ok(self.monitors.get().ok_or(WindowError::NotSetUp)?.clone())
    }

    fn process_events(&self) -> Result<()> {
        loop {
            // The borrow ends before the event is handled.
            let Some(event) = self.events.borrow_mut().pop_front() else {
                break;
            };
            match event {
                MockEvent::Close(handle) => {
                    if self.registry.mark_destroyed(handle) {
                        self.destroy_native(handle);
                        self.app_exit.set(true);
                    }
                }
                MockEvent::Destroyed(handle) => {
                    self.registry.mark_destroyed(handle);
                    if self.registry.unregister(handle) {
                        self.app_exit.set(true);
                    }
                }
                MockEvent::Quit => self.app_exit.set(true),
                MockEvent::Noise => trace!("MockPlatform: ignoring event"),
            }
        }
        Ok(())
    }

    fn is_app_exit(&self) -> bool {
        self.app_exit.get()
    }

    fn create_window(
        &self,
        engine: &Rc<WindowingEngine<Self>>,
        descriptor: &WindowDescriptor,
    ) -> Result<MockWindow> {
        if self.monitors.get().is_none() {
            return Err(WindowError::NotSetUp.into());
        }
        let handle = self.next_handle.get();
        self.next_handle.set(handle + 1);
        let state = self.registry.register(handle);
        Ok(MockWindow {
            engine: Rc::clone(engine),
            handle,
            state,
            title: descriptor.title.clone(),
            size: descriptor.size,
            position: descriptor.position,
            decorated: descriptor.decorated,
            show_state: if descriptor.visible {
                ShowState::Normal
            } else {
                ShowState::Hidden
            },
        })
    }
}

#[derive(Debug)]
pub struct MockMonitor {
    engine: Weak<WindowingEngine<MockPlatform>>,
    info: MonitorInfo,
}

impl Monitor for MockMonitor {
    fn info(&self) -> &MonitorInfo {
        &self.info
    }

    fn dpi(&self) -> Result<Vec2> {
        let engine = self.engine.upgrade().ok_or(WindowError::EngineReleased)?;
        Ok(engine.platform().dpi())
    }
}

pub struct MockWindow {
    engine: Rc<WindowingEngine<MockPlatform>>,
    handle: u32,
    state: Rc<WindowState>,
    title: String,
    size: UVec2,
    position: IVec2,
    decorated: bool,
    show_state: ShowState,
}

impl MockWindow {
    pub fn show_state(&self) -> ShowState {
        self.show_state
    }

    fn style(&self) -> WindowStyle {
        WindowStyle::from_flags(self.decorated, self.show_state != ShowState::Hidden)
    }

    fn set_show_state(&mut self, show_state: ShowState) -> Result<()> {
        self.state.ensure_alive()?;
        self.show_state = show_state;
        Ok(())
    }
}

impl Window for MockWindow {
    type Handle = u32;

    fn title(&self) -> Result<String> {
        self.state.ensure_alive()?;
        Ok(self.title.clone())
    }

    fn set_title(&mut self, title: &str) -> Result<()> {
        self.state.ensure_alive()?;
        self.title = title.to_string();
        Ok(())
    }

    fn size(&self) -> Result<UVec2> {
        self.state.ensure_alive()?;
        Ok(self.size)
    }

    fn set_size(&mut self, size: UVec2) -> Result<()> {
        self.state.ensure_alive()?;
        self.size = size;
        Ok(())
    }

    fn outer_size(&self) -> Result<UVec2> {
        let scale = self.scale()?;
        let platform = self.engine.platform();
        let insets = FrameInsets::for_style(self.style(), platform.config.window.frame, scale);
        Ok(client_to_outer(self.size, insets))
    }

    fn position(&self) -> Result<IVec2> {
        self.state.ensure_alive()?;
        Ok(self.position)
    }

    fn set_position(&mut self, position: IVec2) -> Result<()> {
        self.state.ensure_alive()?;
        self.position = position;
        Ok(())
    }

    fn decorated(&self) -> bool {
        self.decorated
    }

    fn set_decorated(&mut self, decorated: bool) -> Result<()> {
        self.state.ensure_alive()?;
        self.decorated = decorated;
        Ok(())
    }

    fn dpi(&self) -> Result<Vec2> {
        self.state.ensure_alive()?;
        Ok(self.engine.platform().dpi())
    }

    fn restore(&mut self) -> Result<()> {
        self.set_show_state(ShowState::Normal)
    }

    fn maximize(&mut self) -> Result<()> {
        self.set_show_state(ShowState::Maximized)
    }

    fn minimize(&mut self) -> Result<()> {
        self.set_show_state(ShowState::Minimized)
    }

    fn show(&mut self) -> Result<()> {
        self.set_show_state(ShowState::Normal)
    }

    fn hide(&mut self) -> Result<()> {
        self.set_show_state(ShowState::Hidden)
    }

    fn platform_handle(&self) -> u32 {
        self.handle
    }

    fn is_alive(&self) -> bool {
        self.state.is_alive()
    }
}

impl Drop for MockWindow {
    fn drop(&mut self) {
        let platform = self.engine.platform();
        if self.state.mark_destroyed() {
            platform.destroy_native(self.handle);
        }
    }
}
