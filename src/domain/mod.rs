//! Domain Module
//!
//! Core record types and the host inspection port.

pub mod ports;

pub use ports::*;
