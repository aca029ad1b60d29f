//! API Module
//!
//! REST surface for storage layout reports and health probes.

pub mod rest;
pub mod server;

pub use rest::*;
pub use server::*;
