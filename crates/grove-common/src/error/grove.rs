//! Layer error types.
//!
//! Errors are grouped into categories by the high byte of their code:
//! general faults, store faults, encoding faults, contract violations
//! (programming errors by the caller) and configuration problems.

use std::fmt;
use thiserror::Error;

/// Error codes for categorizing errors.
///
/// These codes can be used for programmatic error handling and
/// are stable across versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ErrorCode {
    // General errors (0x0000 - 0x00FF)
    /// Unknown or unspecified error.
    Unknown = 0x0000,
    /// Internal error (bug).
    Internal = 0x0001,
    /// Operation not supported.
    NotSupported = 0x0002,
    /// Invalid argument provided.
    InvalidArgument = 0x0003,

    // Storage errors (0x0100 - 0x01FF)
    /// Key not found.
    KeyNotFound = 0x0100,
    /// Key too large.
    KeyTooLarge = 0x0101,
    /// Value too large.
    ValueTooLarge = 0x0102,
    /// Stored bytes could not be interpreted.
    Corruption = 0x0103,

    // Encoding errors (0x0200 - 0x02FF)
    /// A tuple element could not be decoded.
    TupleDecode = 0x0200,
    /// A decoded element does not fit its column.
    TypeMismatch = 0x0201,

    // Contract violations (0x0300 - 0x03FF)
    /// Cursor operation invalid in the current state.
    CursorState = 0x0300,
    /// Row field count differs from its row type.
    RowShapeMismatch = 0x0301,
    /// Tuple element count differs from the row type.
    TupleSizeMismatch = 0x0302,
    /// Spatial column declared with an unusable type.
    SpatialColumnType = 0x0303,

    // Configuration errors (0x0400 - 0x04FF)
    /// Collation scheme name could not be resolved.
    UnknownCollation = 0x0400,
    /// Invalid configuration or storage description.
    InvalidConfig = 0x0401,
}

impl ErrorCode {
    /// Returns the numeric code.
    #[inline]
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }

    /// Returns the error category name.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match (*self as u16) >> 8 {
            0x00 => "General",
            0x01 => "Storage",
            0x02 => "Encoding",
            0x03 => "Contract",
            0x04 => "Configuration",
            _ => "Unknown",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// The main error type for Grove.
///
/// # Example
///
/// ```rust
/// use grove_common::error::{GroveError, GroveResult};
///
/// fn lookup(name: &str) -> GroveResult<u32> {
///     Err(GroveError::UnknownCollation { scheme: name.to_string() })
/// }
///
/// assert!(lookup("klingon_ci").unwrap_err().is_configuration());
/// ```
#[derive(Debug, Error)]
pub enum GroveError {
    // ==========================================================================
    // General Errors
    // ==========================================================================
    /// Internal error - this indicates a bug.
    #[error("internal error: {message}")]
    Internal {
        /// Error message.
        message: String,
    },

    /// Operation not supported.
    #[error("operation not supported: {operation}")]
    NotSupported {
        /// The unsupported operation.
        operation: String,
    },

    /// Invalid argument provided.
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// Error message.
        message: String,
    },

    // ==========================================================================
    // Storage Errors
    // ==========================================================================
    /// Key not found.
    #[error("key not found")]
    KeyNotFound,

    /// Key exceeds the maximum size.
    #[error("key size {size} exceeds maximum {max_size}")]
    KeyTooLarge {
        /// Actual key size.
        size: usize,
        /// Maximum allowed size.
        max_size: usize,
    },

    /// Value exceeds the maximum size.
    #[error("value size {size} exceeds maximum {max_size}")]
    ValueTooLarge {
        /// Actual value size.
        size: usize,
        /// Maximum allowed size.
        max_size: usize,
    },

    /// Stored bytes are not what this layer wrote.
    #[error("data corruption detected: {message}")]
    Corruption {
        /// Description of the corruption.
        message: String,
    },

    // ==========================================================================
    // Encoding Errors
    // ==========================================================================
    /// A tuple could not be decoded.
    #[error("tuple decode failed at byte {position}: {message}")]
    TupleDecode {
        /// Byte offset of the failing element.
        position: usize,
        /// What went wrong.
        message: String,
    },

    /// A decoded element does not fit its column.
    #[error("type mismatch for column '{column}': expected {expected}, got {actual}")]
    TypeMismatch {
        /// Column name.
        column: String,
        /// Expected type.
        expected: String,
        /// Actual element type.
        actual: String,
    },

    // ==========================================================================
    // Contract Violations
    // ==========================================================================
    /// Cursor operation called in the wrong state.
    #[error("cursor cannot {operation} while {state}")]
    CursorState {
        /// The attempted operation.
        operation: &'static str,
        /// The cursor state at the time.
        state: String,
    },

    /// Row has a different number of fields than its row type.
    #[error("row has {actual} fields but its row type declares {expected}")]
    RowShapeMismatch {
        /// Column count of the row type.
        expected: usize,
        /// Field count of the row.
        actual: usize,
    },

    /// Tuple has a different number of elements than the row type.
    #[error("tuple has {actual} elements but the row type declares {expected}")]
    TupleSizeMismatch {
        /// Column count of the row type.
        expected: usize,
        /// Element count of the tuple.
        actual: usize,
    },

    /// Spatial column has a type that cannot produce coordinates.
    #[error("spatial column '{column}' has unsupported type {data_type}")]
    SpatialColumnType {
        /// Column name.
        column: String,
        /// Declared type.
        data_type: String,
    },

    // ==========================================================================
    // Configuration Errors
    // ==========================================================================
    /// Collation scheme could not be resolved.
    #[error("unknown collation scheme '{scheme}'")]
    UnknownCollation {
        /// The requested scheme name.
        scheme: String,
    },

    /// Invalid configuration.
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// Error message.
        message: String,
    },
}

impl GroveError {
    /// Returns the error code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Internal { .. } => ErrorCode::Internal,
            Self::NotSupported { .. } => ErrorCode::NotSupported,
            Self::InvalidArgument { .. } => ErrorCode::InvalidArgument,
            Self::KeyNotFound => ErrorCode::KeyNotFound,
            Self::KeyTooLarge { .. } => ErrorCode::KeyTooLarge,
            Self::ValueTooLarge { .. } => ErrorCode::ValueTooLarge,
            Self::Corruption { .. } => ErrorCode::Corruption,
            Self::TupleDecode { .. } => ErrorCode::TupleDecode,
            Self::TypeMismatch { .. } => ErrorCode::TypeMismatch,
            Self::CursorState { .. } => ErrorCode::CursorState,
            Self::RowShapeMismatch { .. } => ErrorCode::RowShapeMismatch,
            Self::TupleSizeMismatch { .. } => ErrorCode::TupleSizeMismatch,
            Self::SpatialColumnType { .. } => ErrorCode::SpatialColumnType,
            Self::UnknownCollation { .. } => ErrorCode::UnknownCollation,
            Self::InvalidConfig { .. } => ErrorCode::InvalidConfig,
        }
    }

    /// Returns true if this error signals a caller defect rather than bad data.
    #[must_use]
    pub const fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            Self::CursorState { .. }
                | Self::RowShapeMismatch { .. }
                | Self::TupleSizeMismatch { .. }
                | Self::SpatialColumnType { .. }
        )
    }

    /// Returns true if this error comes from configuration or DDL input.
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::UnknownCollation { .. } | Self::InvalidConfig { .. }
        )
    }

    /// Returns true if this error is retryable.
    ///
    /// Nothing in this layer is; retries belong to the transaction owner.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        false
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Creates a not-supported error.
    #[must_use]
    pub fn not_supported(operation: impl Into<String>) -> Self {
        Self::NotSupported {
            operation: operation.into(),
        }
    }

    /// Creates an invalid argument error.
    #[must_use]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Creates a corruption error.
    #[must_use]
    pub fn corruption(message: impl Into<String>) -> Self {
        Self::Corruption {
            message: message.into(),
        }
    }

    /// Creates an invalid configuration error.
    #[must_use]
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Creates a tuple decode error at the given byte offset.
    #[must_use]
    pub fn tuple_decode(position: usize, message: impl Into<String>) -> Self {
        Self::TupleDecode {
            position,
            message: message.into(),
        }
    }
}
