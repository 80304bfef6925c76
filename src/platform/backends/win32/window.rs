// src/platform/backends/win32/window.rs

use super::{hwnd_key, widestring, Win32Platform};
use crate::engine::WindowingEngine;
use crate::platform::registry::WindowState;
use crate::units::{IVec2, UVec2, Vec2};
use crate::window::{Window, WindowDescriptor};
use anyhow::{Context, Result};
use log::{debug, info, trace, warn};
use std::ffi::c_void;
use std::rc::Rc;

use windows::core::PCWSTR;
use windows::Win32::Foundation::{BOOL, HWND, RECT};
use windows::Win32::UI::HiDpi::{AdjustWindowRectExForDpi, GetDpiForWindow};
use windows::Win32::UI::WindowsAndMessaging::{
    CreateWindowExW, DestroyWindow, GetClientRect, GetWindowLongPtrW, GetWindowRect,
    GetWindowTextLengthW, GetWindowTextW, MoveWindow, SetWindowLongPtrW, SetWindowPos,
    SetWindowTextW, ShowWindow, GWL_STYLE, SHOW_WINDOW_CMD, SWP_FRAMECHANGED, SWP_NOACTIVATE,
    SWP_NOMOVE, SWP_NOSIZE, SWP_NOZORDER, SW_HIDE, SW_MAXIMIZE, SW_MINIMIZE, SW_RESTORE,
    SW_SHOWNORMAL, WINDOW_EX_STYLE, WINDOW_STYLE, WS_EX_APPWINDOW, WS_OVERLAPPEDWINDOW, WS_POPUP,
};

const EX_STYLE: WINDOW_EX_STYLE = WS_EX_APPWINDOW;

fn native_style(decorated: bool) -> WINDOW_STYLE {
    if decorated {
        WS_OVERLAPPEDWINDOW
    } else {
        WS_POPUP
    }
}

fn rect_size(rect: &RECT) -> UVec2 {
    UVec2::new(
        (rect.right - rect.left).max(0) as u32,
        (rect.bottom - rect.top).max(0) as u32,
    )
}

/// A top-level window of the engine's window class.
///
/// Sizes passed in and out are client-area sizes; the frame is added with
/// `AdjustWindowRectExForDpi` at the window's current DPI.
pub struct Win32Window {
    engine: Rc<WindowingEngine<Win32Platform>>,
    hwnd: HWND,
    state: Rc<WindowState>,
    decorated: bool,
}

impl Win32Window {
    pub(super) fn new(
        engine: &Rc<WindowingEngine<Win32Platform>>,
        descriptor: &WindowDescriptor,
    ) -> Result<Self> {
        let platform = engine.platform();
        let title = widestring(&descriptor.title);
        let style = native_style(descriptor.decorated);
        let registry = platform.registry() as *const _ as *const c_void;
        info!(
            "Creating Win32 window '{}': {}x{} at ({}, {})",
            descriptor.title,
            descriptor.size.x,
            descriptor.size.y,
            descriptor.position.x,
            descriptor.position.y
        );

        // SAFETY: the class is registered during setup; the registry pointer
        // stays valid for as long as the engine, which this window keeps alive.
        let hwnd = unsafe {
            CreateWindowExW(
                EX_STYLE,
                platform.class_name(),
                PCWSTR(title.as_ptr()),
                style,
                descriptor.position.x,
                descriptor.position.y,
                descriptor.size.x as i32,
                descriptor.size.y as i32,
                None,
                None,
                platform.instance(),
                Some(registry),
            )
        }
        .context("CreateWindowExW failed")?;
        debug!("HWND created: {:?}", hwnd);

        let state = platform.registry().register(hwnd_key(hwnd));
        let mut window = Win32Window {
            engine: Rc::clone(engine),
            hwnd,
            state,
            decorated: descriptor.decorated,
        };

        window.set_size(descriptor.size)?;
        if descriptor.visible {
            window.show()?;
        }
        Ok(window)
    }

    fn platform(&self) -> &Win32Platform {
        self.engine.platform()
    }

    fn window_rect(&self) -> Result<RECT> {
        self.state.ensure_alive()?;
        let mut rect = RECT::default();
        // SAFETY: live window.
        unsafe { GetWindowRect(self.hwnd, &mut rect) }.context("GetWindowRect failed")?;
        Ok(rect)
    }

    fn show_window(&mut self, command: SHOW_WINDOW_CMD) -> Result<()> {
        self.state.ensure_alive()?;
        trace!("ShowWindow({:?}, {:?})", self.hwnd, command);
        // SAFETY: live window. The return value is the previous visibility.
        let _ = unsafe { ShowWindow(self.hwnd, command) };
        Ok(())
    }
}

impl Window for Win32Window {
    type Handle = HWND;

    fn title(&self) -> Result<String> {
        self.state.ensure_alive()?;
        // SAFETY: live window; the buffer has room for the terminator.
        unsafe {
            let len = GetWindowTextLengthW(self.hwnd).max(0) as usize;
            let mut buffer = vec![0u16; len + 1];
            let copied = GetWindowTextW(self.hwnd, &mut buffer).max(0) as usize;
            Ok(String::from_utf16_lossy(&buffer[..copied]))
        }
    }

    fn set_title(&mut self, title: &str) -> Result<()> {
        self.state.ensure_alive()?;
        let wide = widestring(title);
        // SAFETY: live window and NUL-terminated title.
        unsafe { SetWindowTextW(self.hwnd, PCWSTR(wide.as_ptr())) }
            .context("SetWindowTextW failed")?;
        debug!("Window title set to: {}", title);
        Ok(())
    }

    fn size(&self) -> Result<UVec2> {
        self.state.ensure_alive()?;
        let mut rect = RECT::default();
        // SAFETY: live window.
        unsafe { GetClientRect(self.hwnd, &mut rect) }.context("GetClientRect failed")?;
        Ok(rect_size(&rect))
    }

    /// Grows the requested client size by the frame at the window's DPI and
    /// resizes the outer window to match.
    fn set_size(&mut self, size: UVec2) -> Result<()> {
        self.state.ensure_alive()?;
        let mut rect = RECT {
            left: 0,
            top: 0,
            right: size.x as i32,
            bottom: size.y as i32,
        };
        // SAFETY: live window; `rect` is a valid in/out parameter.
        unsafe {
            let dpi = GetDpiForWindow(self.hwnd);
            AdjustWindowRectExForDpi(
                &mut rect,
                native_style(self.decorated),
                BOOL::from(false),
                EX_STYLE,
                dpi,
            )
            .context("AdjustWindowRectExForDpi failed")?;
            SetWindowPos(
                self.hwnd,
                HWND::default(),
                0,
                0,
                rect.right - rect.left,
                rect.bottom - rect.top,
                SWP_NOMOVE | SWP_NOZORDER | SWP_NOACTIVATE,
            )
            .context("SetWindowPos failed")?;
        }
        debug!(
            "Window {:?} client {}x{}, outer {}x{}",
            self.hwnd,
            size.x,
            size.y,
            rect.right - rect.left,
            rect.bottom - rect.top
        );
        Ok(())
    }

    fn outer_size(&self) -> Result<UVec2> {
        Ok(rect_size(&self.window_rect()?))
    }

    fn position(&self) -> Result<IVec2> {
        let rect = self.window_rect()?;
        Ok(IVec2::new(rect.left, rect.top))
    }

    fn set_position(&mut self, position: IVec2) -> Result<()> {
        let outer = rect_size(&self.window_rect()?);
        // SAFETY: live window.
        unsafe {
            MoveWindow(
                self.hwnd,
                position.x,
                position.y,
                outer.x as i32,
                outer.y as i32,
                BOOL::from(false),
            )
        }
        .context("MoveWindow failed")?;
        Ok(())
    }

    fn decorated(&self) -> bool {
        self.decorated
    }

    /// Swaps the frame style and keeps the client area at its current size.
    fn set_decorated(&mut self, decorated: bool) -> Result<()> {
        if self.decorated == decorated {
            return Ok(());
        }
        let client = self.size()?;
        let frame_bits = (WS_OVERLAPPEDWINDOW | WS_POPUP).0 as isize;
        // SAFETY: live window.
        unsafe {
            let current = GetWindowLongPtrW(self.hwnd, GWL_STYLE);
            let style = (current & !frame_bits) | native_style(decorated).0 as isize;
            SetWindowLongPtrW(self.hwnd, GWL_STYLE, style);
            SetWindowPos(
                self.hwnd,
                HWND::default(),
                0,
                0,
                0,
                0,
                SWP_FRAMECHANGED | SWP_NOMOVE | SWP_NOSIZE | SWP_NOZORDER | SWP_NOACTIVATE,
            )
            .context("SetWindowPos failed")?;
        }
        self.decorated = decorated;
        self.set_size(client)
    }

    /// Per-window DPI, unless the configuration overrides it.
    fn dpi(&self) -> Result<Vec2> {
        self.state.ensure_alive()?;
        // SAFETY: live window. Returns 0 for an invalid handle.
        let native = unsafe { GetDpiForWindow(self.hwnd) };
        let dpi = self.platform().config().dpi.resolve(Some(native as f32));
        Ok(Vec2::splat(dpi))
    }

    fn restore(&mut self) -> Result<()> {
        self.show_window(SW_RESTORE)
    }

    fn maximize(&mut self) -> Result<()> {
        self.show_window(SW_MAXIMIZE)
    }

    fn minimize(&mut self) -> Result<()> {
        self.show_window(SW_MINIMIZE)
    }

    fn show(&mut self) -> Result<()> {
        self.show_window(SW_SHOWNORMAL)
    }

    fn hide(&mut self) -> Result<()> {
        self.show_window(SW_HIDE)
    }

    fn platform_handle(&self) -> HWND {
        self.hwnd
    }

    fn is_alive(&self) -> bool {
        self.state.is_alive()
    }
}

impl Drop for Win32Window {
    fn drop(&mut self) {
        if self.state.mark_destroyed() {
            info!("Destroying Win32 window {:?}", self.hwnd);
            // SAFETY: the window was still alive and is destroyed once.
            if let Err(e) = unsafe { DestroyWindow(self.hwnd) } {
                warn!("DestroyWindow failed for {:?}: {}", self.hwnd, e);
            }
        } else {
            debug!("Win32 window {:?} already destroyed", self.hwnd);
        }
        self.platform().registry().unregister(hwnd_key(self.hwnd));
    }
}
