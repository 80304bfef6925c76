// src/platform/backends/x11/connection.rs
#![allow(non_snake_case)] // Allow non-snake case for X11 types

use anyhow::{anyhow, Result};
use log::{debug, info, warn};
use std::ffi::{CStr, CString};
use std::mem;
use std::ptr;

// X11 library imports
use libc::{c_char, c_int};
use x11::xlib;

/// Owns an X11 `Display` pointer and closes it on drop.
#[derive(Debug)]
struct ManagedDisplay {
    ptr: *mut xlib::Display,
}

impl ManagedDisplay {
    /// Opens the display named by the `DISPLAY` environment variable.
    fn new() -> Result<Self> {
        let display_ptr = unsafe { xlib::XOpenDisplay(ptr::null()) };
        if display_ptr.is_null() {
            Err(anyhow!(
                "Failed to open X display. Check DISPLAY environment variable or X server status."
            ))
        } else {
            debug!("X display opened: {:p}", display_ptr);
            Ok(Self { ptr: display_ptr })
        }
    }

    #[inline]
    fn raw(&self) -> *mut xlib::Display {
        self.ptr
    }
}

impl Drop for ManagedDisplay {
    fn drop(&mut self) {
        if !self.ptr.is_null() {
            info!("Closing X11 display connection: {:p}", self.ptr);
            unsafe {
                let status = xlib::XCloseDisplay(self.ptr);
                if status != 0 {
                    warn!(
                        "XCloseDisplay returned non-zero status: {}. Display may not have closed cleanly.",
                        status
                    );
                }
            }
        }
    }
}

/// Connection to the X server plus the default screen it was opened on.
///
/// The display is closed when the connection is dropped. Anything that
/// holds server-side resources tied to this display (RandR screen
/// resources, windows) must be released first.
#[derive(Debug)]
pub struct Connection {
    managed_display: ManagedDisplay,
    screen: c_int,
    root: xlib::Window,
    depth: c_int,
}

impl Connection {
    /// Connects to the X server and records the default screen, its root
    /// window and its default depth.
    pub fn new() -> Result<Self> {
        info!("Establishing X11 server connection.");

        let managed_display = ManagedDisplay::new()?;
        let display = managed_display.raw();

        // SAFETY: `display` was just opened and is non-null.
        let (screen, root, depth, width, height) = unsafe {
            let screen = xlib::XDefaultScreen(display);
            (
                screen,
                xlib::XRootWindow(display, screen),
                xlib::XDefaultDepth(display, screen),
                xlib::XDisplayWidth(display, screen),
                xlib::XDisplayHeight(display, screen),
            )
        };
        if root == 0 {
            return Err(anyhow!("No root window for screen {}.", screen));
        }

        // SAFETY: XDisplayString returns a pointer owned by the display.
        let name = unsafe {
            let raw = xlib::XDisplayString(display);
            if raw.is_null() {
                String::new()
            } else {
                CStr::from_ptr(raw).to_string_lossy().into_owned()
            }
        };
        debug!("Opened display {}", name);
        debug!("Using default screen (#{})", screen);
        debug!("Screen virtual size: {} x {}, depth {}", width, height, depth);

        info!("X11 server connection established successfully.");
        Ok(Connection {
            managed_display,
            screen,
            root,
            depth,
        })
    }

    /// Returns the raw X11 display pointer.
    ///
    /// # Safety
    ///
    /// The pointer is only valid while this `Connection` is alive.
    #[inline]
    pub fn display(&self) -> *mut xlib::Display {
        self.managed_display.raw()
    }

    #[inline]
    pub fn screen(&self) -> c_int {
        self.screen
    }

    #[inline]
    pub fn root(&self) -> xlib::Window {
        self.root
    }

    /// Default depth of the screen in bits per pixel.
    #[inline]
    pub fn depth(&self) -> u32 {
        self.depth.max(0) as u32
    }

    /// Interns `name`, creating the atom if it does not exist.
    pub fn intern_atom(&self, name: &str) -> Result<xlib::Atom> {
        let c_name = CString::new(name).map_err(|e| anyhow!("Invalid atom name {}: {}", name, e))?;
        // SAFETY: valid display and NUL-terminated name.
        let atom = unsafe { xlib::XInternAtom(self.display(), c_name.as_ptr(), xlib::False) };
        if atom == 0 {
            return Err(anyhow!("XInternAtom failed for {}", name));
        }
        Ok(atom)
    }

    /// Reads `Xft.dpi` from the X resource database.
    ///
    /// Returns `None` when the server has no resource string or the
    /// resource is missing or unparsable.
    pub fn xft_dpi(&self) -> Option<f32> {
        let display = self.display();
        // SAFETY: valid display; the database is destroyed before returning.
        unsafe {
            xlib::XrmInitialize();
            let resource_string = xlib::XResourceManagerString(display);
            if resource_string.is_null() {
                debug!("X11: no resource manager string, Xft.dpi unavailable");
                return None;
            }
            let db = xlib::XrmGetStringDatabase(resource_string);
            if db.is_null() {
                return None;
            }

            let mut type_return: *mut c_char = ptr::null_mut();
            let mut value_return: xlib::XrmValue = mem::zeroed();
            let found = xlib::XrmGetResource(
                db,
                b"Xft.dpi\0".as_ptr() as *const c_char,
                b"Xft.Dpi\0".as_ptr() as *const c_char,
                &mut type_return,
                &mut value_return,
            );

            let mut dpi = None;
            if found == xlib::True && !value_return.addr.is_null() {
                let is_string = !type_return.is_null()
                    && CStr::from_ptr(type_return).to_bytes() == b"String";
                if is_string {
                    let text = CStr::from_ptr(value_return.addr as *const c_char);
                    dpi = text.to_str().ok().and_then(|s| s.trim().parse::<f32>().ok());
                }
            }
            xlib::XrmDestroyDatabase(db);

            match dpi {
                Some(value) => debug!("X11: Xft.dpi = {}", value),
                None => debug!("X11: Xft.dpi not set"),
            }
            dpi
        }
    }

    pub fn flush(&self) {
        // SAFETY: valid display.
        unsafe {
            xlib::XFlush(self.display());
        }
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        debug!("Dropping X11 Connection. ManagedDisplay will close the display.");
    }
}
