//! Base error type.
//!
//! Sub-crates define their own error enums and wrap `VfError` where they
//! surface core failures.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum VfError {
    #[error("configuration error: {0}")]
    Config(String),
}

/// Shorthand result type for `vf-core`.
pub type VfResult<T> = Result<T, VfError>;
