//! Kernel-selection registry for the Alsvin statevector core.
//!
//! For a given operation, threading context, memory model, and qubit count,
//! the registry resolves which kernel backend should run. Assignments are
//! priority-ranked [`DispatchElement`]s over qubit-count intervals; the
//! highest-priority element whose interval contains the qubit count wins.
//! Resolved per-operation maps are memoized in a small bounded cache that
//! every mutation invalidates.
//!
//! One process-wide registry exists per operation kind
//! ([`gate_kernel_map`], [`generator_kernel_map`], [`matrix_kernel_map`]),
//! lazily initialized with the default kernel policy.

pub mod defaults;
pub mod error;
pub mod interval;
pub mod map;
pub mod priority;

use std::sync::{Mutex, OnceLock};

use alsvin_gates::{GateOp, GeneratorOp, MatrixOp, Operation};

pub use error::{DispatchError, DispatchResult};
pub use interval::QubitInterval;
pub use map::{OperationKernelMap, KERNEL_MAP_CACHE_SIZE};
pub use priority::{DispatchElement, PriorityDispatchSet};

/// Operations with a process-wide kernel registry.
pub trait DispatchedOperation: Operation {
    /// The singleton registry for this operation kind.
    fn operation_kernel_map() -> &'static Mutex<OperationKernelMap<Self>>;
}

/// Singleton registry for an operation kind.
pub fn operation_kernel_map<Op: DispatchedOperation>() -> &'static Mutex<OperationKernelMap<Op>> {
    Op::operation_kernel_map()
}

static GATE_KERNEL_MAP: OnceLock<Mutex<OperationKernelMap<GateOp>>> = OnceLock::new();
static GENERATOR_KERNEL_MAP: OnceLock<Mutex<OperationKernelMap<GeneratorOp>>> = OnceLock::new();
static MATRIX_KERNEL_MAP: OnceLock<Mutex<OperationKernelMap<MatrixOp>>> = OnceLock::new();

/// Process-wide registry for gate operations.
pub fn gate_kernel_map() -> &'static Mutex<OperationKernelMap<GateOp>> {
    GATE_KERNEL_MAP.get_or_init(|| Mutex::new(defaults::gate_map_with_defaults()))
}

/// Process-wide registry for generator operations.
pub fn generator_kernel_map() -> &'static Mutex<OperationKernelMap<GeneratorOp>> {
    GENERATOR_KERNEL_MAP.get_or_init(|| Mutex::new(defaults::generator_map_with_defaults()))
}

/// Process-wide registry for matrix operations.
pub fn matrix_kernel_map() -> &'static Mutex<OperationKernelMap<MatrixOp>> {
    MATRIX_KERNEL_MAP.get_or_init(|| Mutex::new(defaults::matrix_map_with_defaults()))
}

impl DispatchedOperation for GateOp {
    fn operation_kernel_map() -> &'static Mutex<OperationKernelMap<GateOp>> {
        gate_kernel_map()
    }
}

impl DispatchedOperation for GeneratorOp {
    fn operation_kernel_map() -> &'static Mutex<OperationKernelMap<GeneratorOp>> {
        generator_kernel_map()
    }
}

impl DispatchedOperation for MatrixOp {
    fn operation_kernel_map() -> &'static Mutex<OperationKernelMap<MatrixOp>> {
        matrix_kernel_map()
    }
}
