//! Core error type

use notistack_host_api::HostError;
use notistack_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Persistence failed: {0}")]
    Store(#[from] StoreError),

    #[error("Scheduler failed: {0}")]
    Host(#[from] HostError),
}

pub type CoreResult<T> = Result<T, CoreError>;
