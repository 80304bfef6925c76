// src/platform/backends/x11/event.rs
#![allow(non_snake_case)] // Allow non-snake case for X11 types

use super::X11Platform;
use anyhow::Result;
use log::{debug, info, trace};
use std::mem;

use x11::xlib;

/// Drains the events already queued on the X connection.
///
/// `XPending` flushes the output buffer and reports how many events can be
/// read without blocking, so the loop never waits for new events.
///
/// A `WM_DELETE_WINDOW` request for a live window destroys that window and
/// sets the exit flag. A `DestroyNotify` for any window of this engine,
/// including one whose wrapper was dropped, marks it dead, removes it from
/// the registry and sets the exit flag.
pub fn process_pending_events(platform: &X11Platform) -> Result<()> {
    let display = platform.connection.display();
    let atoms = platform.atoms;

    // SAFETY: `display` is valid for the lifetime of `platform`.
    while unsafe { xlib::XPending(display) } > 0 {
        let mut xevent: xlib::XEvent = unsafe { mem::zeroed() };
        // SAFETY: XPending reported at least one event, so this does not block.
        unsafe { xlib::XNextEvent(display, &mut xevent) };

        // SAFETY: `type_` is the common discriminant of every XEvent variant.
        let event_type = unsafe { xevent.type_ };

        match event_type {
            xlib::ClientMessage => {
                // SAFETY: event type confirmed as ClientMessage.
                let client_message_event = unsafe { xevent.client_message };
                if client_message_event.message_type == atoms.wm_protocols
                    && client_message_event.data.as_longs()[0] as xlib::Atom
                        == atoms.wm_delete_window
                {
                    let window = client_message_event.window;
                    info!("XEvent: WM_DELETE_WINDOW received for window {}.", window);
                    if platform.registry.mark_destroyed(window) {
                        // SAFETY: the window was alive and registered.
                        unsafe { xlib::XDestroyWindow(display, window) };
                        info!("Destroyed X11 window {} on close request", window);
                        platform.app_exit.set(true);
                    } else {
                        debug!("Close request for unknown or dead window {}", window);
                    }
                } else {
                    trace!(
                        "XEvent: Ignored ClientMessage (type: {}, format: {}) on window {}",
                        client_message_event.message_type,
                        client_message_event.format,
                        client_message_event.window
                    );
                }
            }
            xlib::DestroyNotify => {
                // SAFETY: event type confirmed as DestroyNotify.
                let destroy_event = unsafe { xevent.destroy_window };
                let window = destroy_event.window;
                platform.registry.mark_destroyed(window);
                if platform.registry.unregister(window) {
                    info!("XEvent: DestroyNotify for window {}, exiting", window);
                    platform.app_exit.set(true);
                } else {
                    trace!("XEvent: DestroyNotify for unknown window {}", window);
                }
            }
            xlib::ConfigureNotify => {
                // SAFETY: event type confirmed as ConfigureNotify.
                let configure_event = unsafe { xevent.configure };
                trace!(
                    "XEvent: ConfigureNotify (win: {}, {}x{} at {},{})",
                    configure_event.window,
                    configure_event.width,
                    configure_event.height,
                    configure_event.x,
                    configure_event.y
                );
            }
            xlib::MapNotify | xlib::UnmapNotify | xlib::Expose | xlib::ReparentNotify => {
                trace!("XEvent: type {} ignored", event_type);
            }
            _ => {
                trace!("XEvent: Unhandled event type {}", event_type);
            }
        }
    }
    Ok(())
}
