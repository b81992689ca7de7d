//! Default kernel policy.
//!
//! LM is the universal priority-0 fallback for every operation it
//! implements; operations outside LM's set fall back to PI. On top of
//! that, ParallelLM takes over its operations under multi-threaded
//! dispatch keys at large qubit counts, and the AVX2 specializations are
//! installed for aligned memory models when the CPU supports them. The
//! thresholds encode where the specialized backends win in practice.

use alsvin_gates::{GateOp, GeneratorOp, MatrixOp, Operation};
use alsvin_kernels::{descriptors, BackendDescriptor};
use alsvin_types::{BackendTag, CpuMemoryModel, Threading};
use tracing::debug;

use crate::interval::QubitInterval;
use crate::map::OperationKernelMap;

/// Qubit count from which intra-kernel parallelism pays off.
const PARALLEL_QUBIT_THRESHOLD: usize = 14;

/// Qubit count from which the AVX2 kernels pay off.
const SIMD_QUBIT_THRESHOLD: usize = 6;

/// Priority of the CPU-detected SIMD overrides.
const SIMD_PRIORITY: u32 = 10;

fn descriptor(tag: BackendTag) -> Option<&'static BackendDescriptor> {
    descriptors().iter().copied().find(|d| d.tag == tag)
}

fn simd_memory_models() -> [CpuMemoryModel; 2] {
    [CpuMemoryModel::Aligned256, CpuMemoryModel::Aligned512]
}

#[cfg(target_arch = "x86_64")]
fn avx2_available() -> bool {
    alsvin_kernels::avx2::is_available()
}

#[cfg(not(target_arch = "x86_64"))]
fn avx2_available() -> bool {
    false
}

/// Gate registry populated with the default policy.
pub fn gate_map_with_defaults() -> OperationKernelMap<GateOp> {
    let mut map = OperationKernelMap::new();
    let lm = descriptor(BackendTag::Lm).map(|d| d.gates).unwrap_or(&[]);
    let parallel = descriptor(BackendTag::ParallelLm)
        .map(|d| d.gates)
        .unwrap_or(&[]);

    for &op in GateOp::ALL {
        let fallback = if lm.contains(&op) {
            BackendTag::Lm
        } else {
            BackendTag::Pi
        };
        map.assign_fallback(op, QubitInterval::full(), fallback)
            .expect("default fallback assignment");
    }

    for &op in parallel {
        map.assign_for_all_memory_models(
            op,
            Threading::MultiThread,
            QubitInterval::at_least(PARALLEL_QUBIT_THRESHOLD),
            BackendTag::ParallelLm,
        )
        .expect("default ParallelLM assignment");
    }

    if avx2_available() {
        debug!("AVX2 detected, installing SIMD gate kernels");
        let avx2 = descriptor(BackendTag::Avx2).map(|d| d.gates).unwrap_or(&[]);
        for &op in avx2 {
            for memory_model in simd_memory_models() {
                for threading in Threading::ALL {
                    map.assign_kernel_for_op(
                        op,
                        threading,
                        memory_model,
                        SIMD_PRIORITY,
                        QubitInterval::at_least(SIMD_QUBIT_THRESHOLD),
                        BackendTag::Avx2,
                    )
                    .expect("default AVX2 assignment");
                }
            }
        }
    }

    map
}

/// Generator registry populated with the default policy.
pub fn generator_map_with_defaults() -> OperationKernelMap<GeneratorOp> {
    let mut map = OperationKernelMap::new();
    let lm = descriptor(BackendTag::Lm)
        .map(|d| d.generators)
        .unwrap_or(&[]);
    let parallel = descriptor(BackendTag::ParallelLm)
        .map(|d| d.generators)
        .unwrap_or(&[]);

    for &op in GeneratorOp::ALL {
        let fallback = if lm.contains(&op) {
            BackendTag::Lm
        } else {
            BackendTag::Pi
        };
        map.assign_fallback(op, QubitInterval::full(), fallback)
            .expect("default fallback assignment");
    }

    for &op in parallel {
        map.assign_for_all_memory_models(
            op,
            Threading::MultiThread,
            QubitInterval::at_least(PARALLEL_QUBIT_THRESHOLD),
            BackendTag::ParallelLm,
        )
        .expect("default ParallelLM assignment");
    }

    map
}

/// Matrix registry populated with the default policy.
pub fn matrix_map_with_defaults() -> OperationKernelMap<MatrixOp> {
    let mut map = OperationKernelMap::new();

    for &op in MatrixOp::ALL {
        map.assign_fallback(op, QubitInterval::full(), BackendTag::Lm)
            .expect("default fallback assignment");
    }

    // Precomputed indices amortize over the larger gather/scatter of a
    // many-wire matrix.
    for memory_model in CpuMemoryModel::ALL {
        map.assign_for_all_threading(
            MatrixOp::MultiQubitOp,
            memory_model,
            QubitInterval::at_least(10),
            BackendTag::Pi,
        )
        .expect("default PI matrix assignment");
    }

    map.assign_for_all_memory_models(
        MatrixOp::SingleQubitOp,
        Threading::MultiThread,
        QubitInterval::at_least(PARALLEL_QUBIT_THRESHOLD),
        BackendTag::ParallelLm,
    )
    .expect("default ParallelLM matrix assignment");

    map
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_gate_resolves_at_every_key() {
        let mut map = gate_map_with_defaults();
        for threading in Threading::ALL {
            for memory_model in CpuMemoryModel::ALL {
                for num_qubits in [0, 1, 4, 20] {
                    let resolved = map.kernel_map(num_qubits, threading, memory_model).unwrap();
                    assert_eq!(resolved.len(), GateOp::ALL.len());
                }
            }
        }
    }

    #[test]
    fn test_lm_gaps_fall_back_to_pi() {
        let mut map = gate_map_with_defaults();
        let resolved = map
            .kernel_map(4, Threading::SingleThread, CpuMemoryModel::Unaligned)
            .unwrap();
        assert_eq!(resolved[&GateOp::Toffoli], BackendTag::Pi);
        assert_eq!(resolved[&GateOp::CSWAP], BackendTag::Pi);
        assert_eq!(resolved[&GateOp::DoubleExcitation], BackendTag::Pi);
        assert_eq!(resolved[&GateOp::Hadamard], BackendTag::Lm);
    }

    #[test]
    fn test_multithread_prefers_parallel_lm_at_scale() {
        let mut map = gate_map_with_defaults();
        let resolved = map
            .kernel_map(
                PARALLEL_QUBIT_THRESHOLD,
                Threading::MultiThread,
                CpuMemoryModel::Unaligned,
            )
            .unwrap();
        assert_eq!(resolved[&GateOp::Hadamard], BackendTag::ParallelLm);

        let resolved = map
            .kernel_map(4, Threading::MultiThread, CpuMemoryModel::Unaligned)
            .unwrap();
        assert_eq!(resolved[&GateOp::Hadamard], BackendTag::Lm);
    }

    #[test]
    fn test_generator_defaults_cover_all_ops() {
        let mut map = generator_map_with_defaults();
        let resolved = map
            .kernel_map(5, Threading::SingleThread, CpuMemoryModel::Unaligned)
            .unwrap();
        assert_eq!(resolved.len(), GeneratorOp::ALL.len());
        assert_eq!(resolved[&GeneratorOp::DoubleExcitation], BackendTag::Pi);
        assert_eq!(resolved[&GeneratorOp::MultiRZ], BackendTag::Lm);
    }

    #[test]
    fn test_matrix_defaults() {
        let mut map = matrix_map_with_defaults();
        let resolved = map
            .kernel_map(12, Threading::SingleThread, CpuMemoryModel::Unaligned)
            .unwrap();
        assert_eq!(resolved[&MatrixOp::MultiQubitOp], BackendTag::Pi);
        assert_eq!(resolved[&MatrixOp::SingleQubitOp], BackendTag::Lm);
    }
}
