//! OS notification scheduler interface for notistack
//!
//! This crate defines the capability-based boundary between the stack core
//! and the platform notification service. It contains no platform code itself;
//! see `notistack-host-emulated` for in-process implementations.

mod capabilities;
mod mock;
mod traits;

pub use capabilities::*;
pub use mock::*;
pub use traits::*;
