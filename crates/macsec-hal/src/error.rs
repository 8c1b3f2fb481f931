//! Error types for hardware table access.
//!
//! Every failure names the table and index involved so the caller can
//! surface exactly which row a bulk sweep or transactional sequence died on.

use thiserror::Error;

use crate::types::{Direction, LutKind};

/// Error type for row commit/readback operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HalError {
    /// The indirect-access busy bit never cleared within the bounded retry
    /// count. Treated as a permanent fault for this call.
    #[error("{dir} {kind} LUT index {index}: busy poll retries exhausted")]
    RetryExhausted {
        dir: Direction,
        kind: LutKind,
        index: u16,
    },

    /// Row index beyond the table depth for this part.
    #[error("{kind} LUT index {index} out of range (depth {depth})")]
    IndexOutOfRange {
        kind: LutKind,
        index: u16,
        depth: u16,
    },

    /// Key-table write exceeded its retry bound.
    #[cfg(feature = "key-program")]
    #[error("{dir} key table index {index}: busy poll retries exhausted")]
    KeyRetryExhausted { dir: Direction, index: u16 },

    /// Key-table index beyond the table depth.
    #[cfg(feature = "key-program")]
    #[error("key table index {index} out of range (depth {depth})")]
    KeyIndexOutOfRange { index: u16, depth: u16 },
}

/// Result type for hardware table operations.
pub type HalResult<T> = Result<T, HalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_names_table_and_index() {
        let err = HalError::RetryExhausted {
            dir: Direction::Rx,
            kind: LutKind::Sci,
            index: 7,
        };
        let msg = err.to_string();
        assert!(msg.contains("Rx"));
        assert!(msg.contains("SCI"));
        assert!(msg.contains('7'));
    }
}
