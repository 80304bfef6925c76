// src/platform/registry.rs

//! Maps native window handles to the shared state of their wrappers.
//!
//! Native event handling (the Win32 window procedure, the X11 event pump)
//! only sees handles. The registry lets it reach the wrapper's
//! [`WindowState`] without the wrapper having to stay at a fixed address.
//! Entries are weak: a dropped wrapper never keeps its state alive.

use crate::error::WindowError;
use log::trace;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::rc::{Rc, Weak};

/// State shared between a window wrapper and native event handling.
#[derive(Debug)]
pub struct WindowState {
    alive: Cell<bool>,
}

impl WindowState {
    fn new() -> Self {
        Self {
            alive: Cell::new(true),
        }
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.alive.get()
    }

    /// Marks the native window as destroyed. Returns `true` if it was alive.
    pub fn mark_destroyed(&self) -> bool {
        self.alive.replace(false)
    }

    pub fn ensure_alive(&self) -> Result<(), WindowError> {
        if self.is_alive() {
            Ok(())
        } else {
            Err(WindowError::WindowDestroyed)
        }
    }
}

#[derive(Debug)]
pub struct WindowRegistry<H> {
    windows: RefCell<HashMap<H, Weak<WindowState>>>,
}

impl<H> Default for WindowRegistry<H> {
    fn default() -> Self {
        Self {
            windows: RefCell::new(HashMap::new()),
        }
    }
}

impl<H: Copy + Eq + Hash + Debug> WindowRegistry<H> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a freshly created native window and returns its state.
    pub fn register(&self, handle: H) -> Rc<WindowState> {
        let state = Rc::new(WindowState::new());
        let previous = self
            .windows
            .borrow_mut()
            .insert(handle, Rc::downgrade(&state));
        if previous.is_some() {
            // Handle reused by the native layer; the stale entry is replaced.
            trace!("Window handle {:?} re-registered", handle);
        }
        state
    }

    /// Removes `handle`. Returns `true` if it was registered, whether or
    /// not its wrapper is still alive.
    pub fn unregister(&self, handle: H) -> bool {
        self.windows.borrow_mut().remove(&handle).is_some()
    }

    pub fn lookup(&self, handle: H) -> Option<Rc<WindowState>> {
        self.windows.borrow().get(&handle).and_then(Weak::upgrade)
    }

    /// Marks a registered window as destroyed. Returns `true` only if the
    /// handle belonged to a live window.
    pub fn mark_destroyed(&self, handle: H) -> bool {
        match self.lookup(handle) {
            Some(state) => state.mark_destroyed(),
            None => false,
        }
    }

    pub fn contains(&self, handle: H) -> bool {
        self.lookup(handle).is_some()
    }

    pub fn len(&self) -> usize {
        self.windows
            .borrow()
            .values()
            .filter(|w| w.strong_count() > 0)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_lookup() {
        let registry = WindowRegistry::<u32>::new();
        let state = registry.register(7);
        assert!(registry.contains(7));
        assert!(Rc::ptr_eq(&state, &registry.lookup(7).unwrap()));
        assert!(registry.lookup(8).is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_mark_destroyed_only_once() {
        let registry = WindowRegistry::<u32>::new();
        let state = registry.register(1);
        assert!(state.ensure_alive().is_ok());
        assert!(registry.mark_destroyed(1));
        assert!(!state.is_alive());
        assert_eq!(state.ensure_alive(), Err(WindowError::WindowDestroyed));
        assert!(!registry.mark_destroyed(1));
    }

    #[test]
    fn test_unknown_handle_is_ignored() {
        let registry = WindowRegistry::<u32>::new();
        assert!(!registry.mark_destroyed(42));
    }

    #[test]
    fn test_dropped_state_is_not_reachable() {
        let registry = WindowRegistry::<u32>::new();
        let state = registry.register(3);
        drop(state);
        assert!(registry.lookup(3).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_unregister_removes_entry() {
        let registry = WindowRegistry::<u32>::new();
        let _state = registry.register(5);
        assert!(registry.unregister(5));
        assert!(!registry.contains(5));
        assert!(!registry.unregister(5));
    }

    #[test]
    fn test_unregister_reports_entries_whose_wrapper_is_gone() {
        let registry = WindowRegistry::<u32>::new();
        drop(registry.register(6));
        assert!(!registry.contains(6));
        assert!(registry.unregister(6));
    }
}
