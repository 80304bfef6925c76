// src/platform/backends/win32/mod.rs

//! Win32 backend.
//!
//! The process is declared per-monitor-v2 DPI aware at construction. `setup`
//! enumerates monitors and registers the window class shared by every
//! window. Native window messages reach the platform's window registry
//! through a pointer stored in each window's `GWLP_USERDATA`.

pub mod monitor;
pub mod window;
mod wndproc;

pub use monitor::Win32Monitor;
pub use window::Win32Window;

use crate::config::Config;
use crate::engine::WindowingEngine;
use crate::error::WindowError;
use crate::platform::platform_trait::Platform;
use crate::platform::registry::WindowRegistry;
use crate::platform::topology::display_device;
use crate::window::WindowDescriptor;
use anyhow::{anyhow, Context, Result};
use log::{debug, info, warn};
use monitor::Win32DisplayDevices;
use once_cell::unsync::OnceCell;
use std::cell::Cell;
use std::rc::{Rc, Weak};

use windows::core::PCWSTR;
use windows::Win32::Foundation::{HINSTANCE, HWND};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::HiDpi::{
    SetProcessDpiAwarenessContext, DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2,
};
use windows::Win32::UI::WindowsAndMessaging::{
    DispatchMessageW, PeekMessageW, RegisterClassExW, TranslateMessage, UnregisterClassW,
    CS_HREDRAW, CS_VREDRAW, MSG, PM_REMOVE, WM_QUIT, WNDCLASSEXW,
};

/// NUL-terminated UTF-16 copy of `value`.
pub(crate) fn widestring(value: &str) -> Vec<u16> {
    use std::os::windows::ffi::OsStrExt;
    std::ffi::OsStr::new(value)
        .encode_wide()
        .chain(std::iter::once(0))
        .collect()
}

/// Decodes a fixed-size UTF-16 buffer up to its first NUL.
pub(crate) fn from_wide(buffer: &[u16]) -> String {
    let len = buffer.iter().position(|c| *c == 0).unwrap_or(buffer.len());
    String::from_utf16_lossy(&buffer[..len])
}

/// Registry key for a window handle.
pub(crate) fn hwnd_key(hwnd: HWND) -> isize {
    hwnd.0 as isize
}

/// Engine state for Win32.
pub struct Win32Platform {
    config: Config,
    instance: HINSTANCE,
    class_name: Vec<u16>,
    class_registered: Cell<bool>,
    monitors: OnceCell<Vec<Rc<Win32Monitor>>>,
    // Boxed so the address handed to the window procedure never moves.
    registry: Box<WindowRegistry<isize>>,
    app_exit: Cell<bool>,
}

impl Win32Platform {
    pub fn new(config: &Config) -> Result<Self> {
        // SAFETY: plain Win32 calls without pointer arguments.
        unsafe {
            if let Err(e) = SetProcessDpiAwarenessContext(DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2)
            {
                // Already set by the manifest or an earlier call.
                warn!("SetProcessDpiAwarenessContext failed: {}", e);
            }
        }
        let module =
            unsafe { GetModuleHandleW(PCWSTR::null()) }.context("GetModuleHandleW failed")?;
        debug!("Win32 module instance {:?}", module);

        Ok(Self {
            config: config.clone(),
            instance: module.into(),
            class_name: widestring(&config.window.class_name),
            class_registered: Cell::new(false),
            monitors: OnceCell::new(),
            registry: Box::new(WindowRegistry::new()),
            app_exit: Cell::new(false),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn instance(&self) -> HINSTANCE {
        self.instance
    }

    pub fn registry(&self) -> &WindowRegistry<isize> {
        &self.registry
    }

    pub(crate) fn class_name(&self) -> PCWSTR {
        PCWSTR(self.class_name.as_ptr())
    }

    fn register_window_class(&self) -> Result<()> {
        let wc = WNDCLASSEXW {
            cbSize: std::mem::size_of::<WNDCLASSEXW>() as u32,
            style: CS_HREDRAW | CS_VREDRAW,
            lpfnWndProc: Some(wndproc::window_proc),
            hInstance: self.instance,
            lpszClassName: self.class_name(),
            ..Default::default()
        };
        // SAFETY: `wc` and the class name outlive the call.
        let atom = unsafe { RegisterClassExW(&wc) };
        if atom == 0 {
            return Err(anyhow!(
                "RegisterClassExW failed for class {}: {}",
                self.config.window.class_name,
                windows::core::Error::from_win32()
            ));
        }
        self.class_registered.set(true);
        info!("Registered window class {}", self.config.window.class_name);
        Ok(())
    }

    fn ensure_setup(&self) -> Result<(), WindowError> {
        self.monitors.get().map(|_| ()).ok_or(WindowError::NotSetUp)
    }
}

impl Platform for Win32Platform {
    type Monitor = Win32Monitor;
    type Window = Win32Window;

    fn setup(&self, engine: &Weak<WindowingEngine<Self>>) -> Result<()> {
        if self.monitors.get().is_some() {
            return Err(WindowError::AlreadySetUp.into());
        }

        let displays = display_device::enumerate(&Win32DisplayDevices, self.config.dpi.fallback_dpi);
        let monitors: Vec<Rc<Win32Monitor>> = displays
            .into_iter()
            .map(|d| Rc::new(Win32Monitor::new(engine.clone(), d)))
            .collect();
        info!("Win32: found {} monitors", monitors.len());

        self.register_window_class()?;

        self.monitors
            .set(monitors)
            .map_err(|_| WindowError::AlreadySetUp)?;
        Ok(())
    }

    fn monitors(&self) -> Result<Vec<Rc<Win32Monitor>>> {
        Ok(self.monitors.get().ok_or(WindowError::NotSetUp)?.clone())
    }

    /// Drains the thread's message queue without waiting. `WM_QUIT` sets the
    /// exit flag and ends the pass.
    fn process_events(&self) -> Result<()> {
        let mut msg = MSG::default();
        // SAFETY: `msg` is a valid out-parameter for every call.
        unsafe {
            while PeekMessageW(&mut msg, HWND::default(), 0, 0, PM_REMOVE).into() {
                if msg.message == WM_QUIT {
                    info!("WM_QUIT received, exiting");
                    self.app_exit.set(true);
                    break;
                }
                let _ = TranslateMessage(&msg);
                DispatchMessageW(&msg);
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
    ) -> Result<Win32Window> {
        self.ensure_setup()?;
        Win32Window::new(engine, descriptor)
    }
}

impl Drop for Win32Platform {
    fn drop(&mut self) {
        if self.class_registered.get() {
            // SAFETY: the class was registered by this platform and no
            // window of it outlives the engine.
            if let Err(e) = unsafe { UnregisterClassW(self.class_name(), self.instance) } {
                warn!("UnregisterClassW failed: {}", e);
            }
        }
        info!("Shutting down Win32 platform");
    }
}
