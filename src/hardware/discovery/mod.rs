//! Hardware Discovery Module
//!
//! Enumerates disks, block devices and filesystem sizes, either from the
//! live Linux host or from a captured snapshot.

pub mod df;
pub mod lsblk;
pub mod scanner;
pub mod snapshot;

pub use scanner::*;
pub use snapshot::*;
