//! Registry error types.

use alsvin_types::{BackendTag, CpuMemoryModel};
use thiserror::Error;

use crate::interval::QubitInterval;

/// Errors reported by the kernel-selection registry.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DispatchError {
    /// The backend is not in the allow-list of the memory model.
    #[error("kernel {kernel} is not allowed for memory model {memory_model}")]
    KernelNotAllowed {
        /// Backend that was rejected.
        kernel: BackendTag,
        /// Memory model whose allow-list was consulted.
        memory_model: CpuMemoryModel,
    },

    /// The interval overlaps an existing assignment at the same priority.
    #[error("interval {interval} conflicts with an existing assignment at priority {priority}")]
    IntervalConflict {
        /// Priority of the rejected assignment.
        priority: u32,
        /// Interval of the rejected assignment.
        interval: QubitInterval,
    },

    /// No assignment record exists for the operation and dispatch key.
    #[error("no kernel assignment exists for {operation} under the given dispatch key")]
    KeyNotFound {
        /// Name of the operation.
        operation: &'static str,
    },

    /// No interval covers the requested qubit count.
    #[error("no kernel covers {num_qubits} qubits for {operation}")]
    NoKernelForQubitCount {
        /// Name of the operation.
        operation: &'static str,
        /// Qubit count that could not be resolved.
        num_qubits: usize,
    },
}

/// Result type for registry operations.
pub type DispatchResult<T> = Result<T, DispatchError>;
