// src/platform/backends/win32/wndproc.rs

use super::hwnd_key;
use crate::platform::registry::WindowRegistry;
use log::{debug, info, trace};

use windows::Win32::Foundation::{HWND, LPARAM, LRESULT, WPARAM};
use windows::Win32::UI::WindowsAndMessaging::{
    DefWindowProcW, DestroyWindow, GetWindowLongPtrW, PostQuitMessage, SetWindowLongPtrW,
    CREATESTRUCTW, GWLP_USERDATA, WM_CLOSE, WM_DESTROY, WM_NCCREATE, WM_NCDESTROY,
};

/// Window procedure of the engine's window class.
///
/// `WM_NCCREATE` stores the registry pointer passed to `CreateWindowExW` in
/// the window's user data. Later messages read it back to mark the window
/// dead when it is closed or destroyed.
pub(super) unsafe extern "system" fn window_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    if msg == WM_NCCREATE {
        let create = &*(lparam.0 as *const CREATESTRUCTW);
        SetWindowLongPtrW(hwnd, GWLP_USERDATA, create.lpCreateParams as isize);
        return DefWindowProcW(hwnd, msg, wparam, lparam);
    }

    let registry = GetWindowLongPtrW(hwnd, GWLP_USERDATA) as *const WindowRegistry<isize>;
    if registry.is_null() {
        return DefWindowProcW(hwnd, msg, wparam, lparam);
    }
    // SAFETY: set at WM_NCCREATE from the platform's boxed registry, which
    // outlives every window of the engine.
    let registry = &*registry;

    match msg {
        WM_CLOSE => {
            info!("WM_CLOSE received for {:?}", hwnd);
            if registry.mark_destroyed(hwnd_key(hwnd)) {
                let _ = DestroyWindow(hwnd);
            } else {
                debug!("WM_CLOSE for unknown or dead window {:?}", hwnd);
            }
            LRESULT(0)
        }
        WM_DESTROY => {
            trace!("WM_DESTROY for {:?}", hwnd);
            registry.mark_destroyed(hwnd_key(hwnd));
            PostQuitMessage(0);
            LRESULT(0)
        }
        WM_NCDESTROY => {
            SetWindowLongPtrW(hwnd, GWLP_USERDATA, 0);
            DefWindowProcW(hwnd, msg, wparam, lparam)
        }
        _ => DefWindowProcW(hwnd, msg, wparam, lparam),
    }
}
