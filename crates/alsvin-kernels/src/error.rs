//! Kernel error types.

use alsvin_types::BackendTag;
use thiserror::Error;

/// Errors reported by kernel entry points.
///
/// Precondition violations are programming errors on the caller's side; the
/// statevector is untouched when an error is returned.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum KernelError {
    /// Wires out of range, wrong arity, duplicate wires, or a buffer whose
    /// length is not `2^n`.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The requested backend does not implement the operation.
    #[error("kernel {kernel} does not implement {operation}")]
    Unsupported {
        /// Backend the operation was requested from.
        kernel: BackendTag,
        /// Name of the unimplemented operation.
        operation: &'static str,
    },
}

/// Result type for kernel operations.
pub type KernelResult<T> = Result<T, KernelError>;
