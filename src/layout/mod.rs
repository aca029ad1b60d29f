//! Storage Layout Module
//!
//! Maps host enumeration data to the normalized storage layout and serves
//! cached reports.

pub mod mapper;
pub mod raid;
pub mod service;

pub use mapper::*;
pub use raid::*;
pub use service::*;
