// src/platform/backends/mod.rs

//! Backend implementations of the `Platform` trait.
//!
//! Exactly one native backend is compiled per target and exported as
//! `NativePlatform`, which is the default platform of `WindowingEngine`.

#[cfg(test)]
pub mod mock;
#[cfg(windows)]
pub mod win32;
#[cfg(all(unix, not(target_os = "macos")))]
pub mod x11;

#[cfg(windows)]
pub type NativePlatform = win32::Win32Platform;
#[cfg(all(unix, not(target_os = "macos")))]
pub type NativePlatform = x11::X11Platform;

#[cfg(not(any(windows, all(unix, not(target_os = "macos")))))]
compile_error!("kat-window supports X11 (Linux/BSD) and Win32 targets only");
