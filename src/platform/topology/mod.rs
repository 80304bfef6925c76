// src/platform/topology/mod.rs

//! Backend-independent monitor discovery.
//!
//! Each module holds an enumeration algorithm written against a small
//! record-source trait. The native backends implement the trait over the
//! real API; tests implement it over fixtures. Both modules are compiled on
//! every target.

pub mod display_device;
pub mod randr;
