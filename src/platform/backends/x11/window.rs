// src/platform/backends/x11/window.rs
#![allow(non_snake_case)] // Allow non-snake case for X11 types

use super::X11Platform;
use crate::engine::WindowingEngine;
use crate::frame::{client_to_outer, FrameInsets};
use crate::platform::registry::WindowState;
use crate::units::{IVec2, UVec2, Vec2};
use crate::window::{Window, WindowDescriptor, WindowStyle};
use anyhow::{anyhow, Context, Result};
use log::{debug, info, trace, warn};
use std::ffi::CString;
use std::mem;
use std::ptr;
use std::rc::Rc;

// X11 library imports
use libc::{c_char, c_int, c_long, c_uchar, c_uint, c_ulong, c_void};
use x11::xlib;

/// `_MOTIF_WM_HINTS` flag marking the decorations field as valid.
const MWM_HINTS_DECORATIONS: c_ulong = 1 << 1;
/// `_NET_WM_STATE` client message actions.
const NET_WM_STATE_REMOVE: c_long = 0;
const NET_WM_STATE_ADD: c_long = 1;
/// Source indication for EWMH requests: a normal application.
const NET_WM_SOURCE_APPLICATION: c_long = 1;

/// How a maximize change reaches the window manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MaximizeUpdate {
    /// A `_NET_WM_STATE` client message with this action. Mapped windows only.
    Request(c_long),
    /// Write `_NET_WM_STATE` on the window, read by the manager at map time.
    Property(bool),
}

fn maximize_update(visible: bool, maximized: bool) -> MaximizeUpdate {
    match (visible, maximized) {
        (true, true) => MaximizeUpdate::Request(NET_WM_STATE_ADD),
        (true, false) => MaximizeUpdate::Request(NET_WM_STATE_REMOVE),
        (false, maximized) => MaximizeUpdate::Property(maximized),
    }
}

/// An X11 top-level window.
///
/// Created on the engine's connection and registered in the platform's
/// window registry, so a close request handled by the event pump marks this
/// wrapper dead instead of leaving it with a stale id.
pub struct X11Window {
    engine: Rc<WindowingEngine<X11Platform>>,
    id: xlib::Window,
    state: Rc<WindowState>,
    title: String,
    decorated: bool,
    visible: bool,
    maximized: bool,
}

impl X11Window {
    /// Creates, configures and (if requested) maps a new window.
    pub(super) fn new(
        engine: &Rc<WindowingEngine<X11Platform>>,
        descriptor: &WindowDescriptor,
    ) -> Result<Self> {
        let platform = engine.platform();
        let connection = platform.connection();
        let display = connection.display();
        let size = UVec2::new(descriptor.size.x.max(1), descriptor.size.y.max(1));
        info!(
            "Creating X11 window '{}': {}x{} at ({}, {})",
            descriptor.title, size.x, size.y, descriptor.position.x, descriptor.position.y
        );

        // SAFETY: valid display and root window from the engine's connection.
        let id = unsafe {
            let mut attributes: xlib::XSetWindowAttributes = mem::zeroed();
            attributes.event_mask = xlib::StructureNotifyMask | xlib::ExposureMask | xlib::KeyPressMask;

            xlib::XCreateWindow(
                display,
                connection.root(),
                descriptor.position.x,
                descriptor.position.y,
                size.x as c_uint,
                size.y as c_uint,
                0,
                xlib::CopyFromParent as c_int,
                xlib::InputOutput as c_uint,
                ptr::null_mut(),
                xlib::CWEventMask,
                &mut attributes,
            )
        };
        if id == 0 {
            return Err(anyhow!("XCreateWindow failed"));
        }
        debug!("X window created (ID: {})", id);

        let state = platform.registry().register(id);
        let mut window = X11Window {
            engine: Rc::clone(engine),
            id,
            state,
            title: String::new(),
            decorated: true,
            visible: false,
            maximized: false,
        };

        window.setup_protocols_and_hints(descriptor.position)?;
        window.set_title(&descriptor.title)?;
        if !descriptor.decorated {
            window.set_decorated(false)?;
        }
        if descriptor.visible {
            window.show()?;
        }
        connection.flush();
        Ok(window)
    }

    fn platform(&self) -> &X11Platform {
        self.engine.platform()
    }

    fn display(&self) -> *mut xlib::Display {
        self.platform().connection().display()
    }

    /// Registers `WM_DELETE_WINDOW` and asks the window manager to honour
    /// the requested position.
    fn setup_protocols_and_hints(&mut self, position: IVec2) -> Result<()> {
        let display = self.display();
        let atoms = *self.platform().atoms();
        // SAFETY: valid display and live window.
        unsafe {
            let mut protocols = [atoms.wm_delete_window];
            if xlib::XSetWMProtocols(display, self.id, protocols.as_mut_ptr(), 1) == 0 {
                warn!("XSetWMProtocols failed. Window close events might not be received.");
            } else {
                debug!("WM_PROTOCOLS (WM_DELETE_WINDOW) registered.");
            }

            let mut size_hints: xlib::XSizeHints = mem::zeroed();
            size_hints.flags = xlib::PPosition;
            size_hints.x = position.x;
            size_hints.y = position.y;
            xlib::XSetWMNormalHints(display, self.id, &mut size_hints);
        }
        Ok(())
    }

    fn attributes(&self) -> Result<xlib::XWindowAttributes> {
        self.state.ensure_alive()?;
        // SAFETY: valid display and live window.
        unsafe {
            let mut attributes: xlib::XWindowAttributes = mem::zeroed();
            if xlib::XGetWindowAttributes(self.display(), self.id, &mut attributes) == 0 {
                return Err(anyhow!("XGetWindowAttributes failed for window {}", self.id));
            }
            Ok(attributes)
        }
    }

    /// Frame extents reported by the window manager through
    /// `_NET_FRAME_EXTENTS`, if it sets them.
    fn frame_extents(&self) -> Option<FrameInsets> {
        let display = self.display();
        let atom = self.platform().atoms().net_frame_extents;
        // SAFETY: valid display and live window; the property is freed below.
        unsafe {
            let mut actual_type: xlib::Atom = 0;
            let mut actual_format: c_int = 0;
            let mut nitems: c_ulong = 0;
            let mut bytes_after: c_ulong = 0;
            let mut prop: *mut c_uchar = ptr::null_mut();
            let status = xlib::XGetWindowProperty(
                display,
                self.id,
                atom,
                0,
                4,
                xlib::False,
                xlib::XA_CARDINAL,
                &mut actual_type,
                &mut actual_format,
                &mut nitems,
                &mut bytes_after,
                &mut prop,
            );
            if prop.is_null() {
                return None;
            }
            let insets = if status == xlib::Success as c_int && actual_format == 32 && nitems == 4 {
                // Format-32 properties are returned as C longs.
                let values = std::slice::from_raw_parts(prop as *const c_long, 4);
                let edge = |v: c_long| v.max(0) as u32;
                Some(FrameInsets::new(
                    edge(values[0]),
                    edge(values[2]),
                    edge(values[1]),
                    edge(values[3]),
                ))
            } else {
                None
            };
            xlib::XFree(prop as *mut c_void);
            insets
        }
    }

    fn style(&self) -> WindowStyle {
        WindowStyle::from_flags(self.decorated, self.visible)
    }

    fn insets(&self) -> Result<FrameInsets> {
        if let Some(extents) = self.frame_extents() {
            return Ok(extents);
        }
        let base = self.platform().config().window.frame;
        Ok(FrameInsets::for_style(self.style(), base, self.scale()?))
    }

    /// Sends an EWMH `_NET_WM_STATE` request for the two maximized atoms.
    fn send_maximize_state(&self, action: c_long) -> Result<()> {
        self.state.ensure_alive()?;
        let platform = self.platform();
        let atoms = platform.atoms();
        let display = self.display();
        // SAFETY: valid display; the event is fully initialized below.
        unsafe {
            let mut message: xlib::XClientMessageEvent = mem::zeroed();
            message.type_ = xlib::ClientMessage;
            message.send_event = xlib::True;
            message.display = display;
            message.window = self.id;
            message.message_type = atoms.net_wm_state;
            message.format = 32;
            message.data.set_long(0, action);
            message.data.set_long(1, atoms.net_wm_state_maximized_horz as c_long);
            message.data.set_long(2, atoms.net_wm_state_maximized_vert as c_long);
            message.data.set_long(3, NET_WM_SOURCE_APPLICATION);

            let mut event = xlib::XEvent {
                client_message: message,
            };
            xlib::XSendEvent(
                display,
                platform.connection().root(),
                xlib::False,
                xlib::SubstructureRedirectMask | xlib::SubstructureNotifyMask,
                &mut event,
            );
            xlib::XFlush(display);
        }
        Ok(())
    }

    /// Window managers only act on `_NET_WM_STATE` requests for mapped
    /// windows. An unmapped window gets the property written directly and
    /// the window manager reads it when the window is mapped.
    fn set_maximized(&mut self, maximized: bool) -> Result<()> {
        match maximize_update(self.visible, maximized) {
            MaximizeUpdate::Request(action) => self.send_maximize_state(action)?,
            MaximizeUpdate::Property(maximized) => self.write_maximize_property(maximized)?,
        }
        self.maximized = maximized;
        Ok(())
    }

    fn write_maximize_property(&self, maximized: bool) -> Result<()> {
        self.state.ensure_alive()?;
        let atoms = *self.platform().atoms();
        let display = self.display();
        let states: [c_ulong; 2] = [
            atoms.net_wm_state_maximized_horz as c_ulong,
            atoms.net_wm_state_maximized_vert as c_ulong,
        ];
        // SAFETY: valid display and live window; format-32 data is passed as longs.
        unsafe {
            if maximized {
                xlib::XChangeProperty(
                    display,
                    self.id,
                    atoms.net_wm_state,
                    xlib::XA_ATOM,
                    32,
                    xlib::PropModeReplace,
                    states.as_ptr() as *const u8,
                    states.len() as c_int,
                );
            } else {
                xlib::XDeleteProperty(display, self.id, atoms.net_wm_state);
            }
            xlib::XFlush(display);
        }
        debug!("Window {} unmapped, _NET_WM_STATE maximized={}", self.id, maximized);
        Ok(())
    }
}

impl Window for X11Window {
    type Handle = xlib::Window;

    fn title(&self) -> Result<String> {
        self.state.ensure_alive()?;
        Ok(self.title.clone())
    }

    /// Updates both `WM_NAME` and the UTF-8 `_NET_WM_NAME`.
    fn set_title(&mut self, title: &str) -> Result<()> {
        self.state.ensure_alive()?;
        trace!("Setting window title to '{}' for window ID: {}", title, self.id);
        let display = self.display();
        let atoms = *self.platform().atoms();
        let title_c_str = CString::new(title).context("Failed to create CString for title")?;
        // SAFETY: valid display and live window.
        unsafe {
            xlib::XStoreName(display, self.id, title_c_str.as_ptr() as *mut c_char);
            xlib::XChangeProperty(
                display,
                self.id,
                atoms.net_wm_name,
                atoms.utf8_string,
                8, // format is 8-bit for UTF8_STRING
                xlib::PropModeReplace,
                title_c_str.as_ptr() as *const u8,
                title_c_str.as_bytes().len() as c_int,
            );
            xlib::XFlush(display);
        }
        self.title = title.to_string();
        debug!("Window title set to: {}", title);
        Ok(())
    }

    fn size(&self) -> Result<UVec2> {
        let attributes = self.attributes()?;
        Ok(UVec2::new(
            attributes.width.max(0) as u32,
            attributes.height.max(0) as u32,
        ))
    }

    /// X11 windows are sized by their client area, so the target is applied
    /// directly.
    fn set_size(&mut self, size: UVec2) -> Result<()> {
        self.state.ensure_alive()?;
        let display = self.display();
        // SAFETY: valid display and live window.
        unsafe {
            xlib::XResizeWindow(display, self.id, size.x.max(1), size.y.max(1));
            xlib::XFlush(display);
        }
        debug!("Window {} resized to {}x{}", self.id, size.x, size.y);
        Ok(())
    }

    fn outer_size(&self) -> Result<UVec2> {
        let size = self.size()?;
        Ok(client_to_outer(size, self.insets()?))
    }

    fn position(&self) -> Result<IVec2> {
        self.state.ensure_alive()?;
        let platform = self.platform();
        let display = self.display();
        let (mut x, mut y): (c_int, c_int) = (0, 0);
        let mut child: xlib::Window = 0;
        // SAFETY: valid display, live window and root.
        let ok = unsafe {
            xlib::XTranslateCoordinates(
                display,
                self.id,
                platform.connection().root(),
                0,
                0,
                &mut x,
                &mut y,
                &mut child,
            )
        };
        if ok == 0 {
            return Err(anyhow!("XTranslateCoordinates failed for window {}", self.id));
        }
        let insets = self.frame_extents().unwrap_or(FrameInsets::NONE);
        Ok(IVec2::new(x - insets.left as i32, y - insets.top as i32))
    }

    fn set_position(&mut self, position: IVec2) -> Result<()> {
        self.state.ensure_alive()?;
        let display = self.display();
        // SAFETY: valid display and live window.
        unsafe {
            xlib::XMoveWindow(display, self.id, position.x, position.y);
            xlib::XFlush(display);
        }
        Ok(())
    }

    fn decorated(&self) -> bool {
        self.decorated
    }

    /// Toggles window manager decorations through `_MOTIF_WM_HINTS`.
    fn set_decorated(&mut self, decorated: bool) -> Result<()> {
        if self.decorated == decorated {
            return Ok(());
        }
        self.state.ensure_alive()?;
        let display = self.display();
        let hints_atom = self.platform().atoms().motif_wm_hints;
        // flags, functions, decorations, input_mode, status
        let hints: [c_ulong; 5] = [MWM_HINTS_DECORATIONS, 0, c_ulong::from(decorated), 0, 0];
        // SAFETY: valid display and live window; format-32 data is passed as longs.
        unsafe {
            xlib::XChangeProperty(
                display,
                self.id,
                hints_atom,
                hints_atom,
                32,
                xlib::PropModeReplace,
                hints.as_ptr() as *const u8,
                hints.len() as c_int,
            );
            xlib::XFlush(display);
        }
        self.decorated = decorated;
        debug!("Window {} style now {:?}", self.id, self.style());
        Ok(())
    }

    fn dpi(&self) -> Result<Vec2> {
        self.state.ensure_alive()?;
        Ok(self.platform().dpi())
    }

    fn restore(&mut self) -> Result<()> {
        if self.maximized {
            self.set_maximized(false)?;
        }
        self.show()
    }

    fn maximize(&mut self) -> Result<()> {
        self.set_maximized(true)
    }

    fn minimize(&mut self) -> Result<()> {
        self.state.ensure_alive()?;
        let platform = self.platform();
        let display = self.display();
        // SAFETY: valid display and live window.
        let ok = unsafe { xlib::XIconifyWindow(display, self.id, platform.connection().screen()) };
        if ok == 0 {
            warn!("XIconifyWindow failed for window {}", self.id);
        }
        Ok(())
    }

    fn show(&mut self) -> Result<()> {
        self.state.ensure_alive()?;
        let display = self.display();
        // SAFETY: valid display and live window.
        unsafe {
            xlib::XMapWindow(display, self.id);
            xlib::XFlush(display);
        }
        self.visible = true;
        Ok(())
    }

    fn hide(&mut self) -> Result<()> {
        self.state.ensure_alive()?;
        let display = self.display();
        // SAFETY: valid display and live window.
        unsafe {
            xlib::XUnmapWindow(display, self.id);
            xlib::XFlush(display);
        }
        self.visible = false;
        Ok(())
    }

    fn platform_handle(&self) -> xlib::Window {
        self.id
    }

    fn is_alive(&self) -> bool {
        self.state.is_alive()
    }
}

impl Drop for X11Window {
    fn drop(&mut self) {
        let platform = self.engine.platform();
        if self.state.mark_destroyed() {
            info!("Destroying X11 window (ID: {})", self.id);
            let display = platform.connection().display();
            // SAFETY: the window is alive and the display outlives it.
            unsafe {
                xlib::XDestroyWindow(display, self.id);
                xlib::XFlush(display);
            }
        } else {
            debug!("X11 window {} already destroyed", self.id);
        }
        // The registry entry is removed when DestroyNotify arrives.
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mapped_window_requests_state_change() {
        assert_eq!(
            maximize_update(true, true),
            MaximizeUpdate::Request(NET_WM_STATE_ADD)
        );
        assert_eq!(
            maximize_update(true, false),
            MaximizeUpdate::Request(NET_WM_STATE_REMOVE)
        );
    }

    #[test]
    fn test_unmapped_window_writes_state_property() {
        assert_eq!(maximize_update(false, true), MaximizeUpdate::Property(true));
        assert_eq!(maximize_update(false, false), MaximizeUpdate::Property(false));
    }
}
