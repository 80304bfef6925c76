// src/platform/mod.rs
//
// Native platform backends, the `Platform` trait they implement, and the
// backend-independent pieces they share.

pub mod backends;
pub mod platform_trait;
pub mod registry;
pub mod topology;

pub use backends::NativePlatform;
pub use platform_trait::Platform;
pub use registry::{WindowRegistry, WindowState};
