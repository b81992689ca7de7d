//! Shared scalar types for the Alsvin statevector core.
//!
//! This crate defines the vocabulary the rest of the workspace speaks:
//! the [`Precision`] axis (binary32 / binary64 statevectors), the
//! [`BackendTag`] identifying a kernel implementation, and the
//! [`Threading`] / [`CpuMemoryModel`] pair that forms a dispatch key.

pub mod memory;
pub mod precision;
pub mod tags;

pub use memory::CpuMemoryModel;
pub use precision::{Precision, PrecisionKind};
pub use tags::{dispatch_key, BackendTag, Threading};
