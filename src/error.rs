// src/error.rs

use thiserror::Error;

/// Precondition violations detected by the windowing layer.
///
/// Native call failures are reported through `anyhow` with context; these
/// variants cover misuse that would otherwise dereference released native
/// state. Callers can recover the variant with `downcast_ref::<WindowError>()`.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowError {
    #[error("Windowing engine was released while a dependent object was still in use")]
    EngineReleased,
    #[error("Platform state used before setup()")]
    NotSetUp,
    #[error("Platform setup() called more than once")]
    AlreadySetUp,
    #[error("Native window was already destroyed")]
    WindowDestroyed,
}
