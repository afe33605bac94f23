//! Core of notistack
//!
//! This crate contains:
//! - The notification stack (staging with eviction, pruning, persistence)
//! - Reconciliation against the OS scheduler at pause and resume
//! - Per-platform controllers (local stack, or direct scheduling)
//! - The facade the application calls

mod controller;
mod error;
mod events;
mod facade;
mod stack;

pub use controller::*;
pub use error::*;
pub use events::*;
pub use facade::*;
pub use stack::*;
