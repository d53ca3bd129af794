//! Error handling for Grove.
//!
//! This module provides the unified error type and result alias used
//! across all Grove components.

mod grove;

pub use grove::{ErrorCode, GroveError};

/// Result type alias for Grove operations.
pub type GroveResult<T> = std::result::Result<T, GroveError>;
