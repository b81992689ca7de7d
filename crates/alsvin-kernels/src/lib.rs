//! Kernel backends for the Alsvin statevector core.
//!
//! A kernel mutates a caller-owned buffer of `2^n` complex amplitudes in
//! place. Four backends coexist:
//!
//! - [`KernelsLM`]: memoryless bit arithmetic; amplitude indices are derived
//!   on the fly from reverse-wire parity masks.
//! - [`KernelsPI`]: precomputed indices; the inner/outer index lists are
//!   materialized once per call and then walked.
//! - [`KernelsParallelLM`]: rayon-partitioned variants of the LM kernels for
//!   single-qubit and diagonal operations.
//! - [`KernelsAvx2`] (x86_64 only): AVX2 specializations of PauliX, RZ, and
//!   IsingZZ.
//!
//! Backends are stateless; every entry point is a free function of
//! `(state, num_qubits, wires, inverse, params…)`. Which backend handles
//! which operation at runtime is decided by the dispatch registry in
//! `alsvin-dispatch`; [`dispatch`] holds the per-tag trampoline functions it
//! resolves into.

pub mod backend;
pub mod bits;
pub mod dispatch;
pub mod error;
pub mod lm;
pub mod parallel;
pub mod pi;

#[cfg(target_arch = "x86_64")]
pub mod avx2;

mod check;

pub use backend::{
    common_alignment, descriptors, BackendDescriptor, PauliGenerator,
};
pub use error::{KernelError, KernelResult};
pub use lm::KernelsLM;
pub use parallel::KernelsParallelLM;
pub use pi::KernelsPI;

#[cfg(target_arch = "x86_64")]
pub use avx2::KernelsAvx2;
