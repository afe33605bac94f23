//! Shared types for notistack
//!
//! This crate defines the data model shared by the stack, the persistence
//! layer and the scheduler adapters:
//! - Stack entries and their derived predicates
//! - Send requests (absolute/relative fire time, id or symbolic type)
//! - Channel specs and OS-facing notification payloads
//! - Schedule status reported by the OS scheduler

mod channel;
mod entry;
mod request;

pub use channel::*;
pub use entry::*;
pub use request::*;
