//! Hardware Module
//!
//! Host storage introspection backing the storage layout report.

pub mod discovery;

pub use discovery::*;
