//! Registry behavior against locally constructed kernel maps.

use alsvin_dispatch::defaults::gate_map_with_defaults;
use alsvin_dispatch::{DispatchError, QubitInterval};
use alsvin_gates::{GateOp, Operation};
use alsvin_types::{BackendTag, CpuMemoryModel, Threading};

#[test]
fn test_assignment_is_monotonic_over_its_interval() {
    let mut map = gate_map_with_defaults();
    map.assign_kernel_for_op(
        GateOp::Hadamard,
        Threading::SingleThread,
        CpuMemoryModel::Unaligned,
        5,
        QubitInterval::closed(3, 8),
        BackendTag::Pi,
    )
    .unwrap();

    for num_qubits in 3..=8 {
        let resolved = map
            .kernel_map(num_qubits, Threading::SingleThread, CpuMemoryModel::Unaligned)
            .unwrap();
        assert_eq!(resolved[&GateOp::Hadamard], BackendTag::Pi);
    }
    for num_qubits in [0, 2, 9, 30] {
        let resolved = map
            .kernel_map(num_qubits, Threading::SingleThread, CpuMemoryModel::Unaligned)
            .unwrap();
        assert_eq!(resolved[&GateOp::Hadamard], BackendTag::Lm);
    }
}

#[test]
fn test_higher_priority_shadows_lower() {
    let mut map = gate_map_with_defaults();
    map.assign_kernel_for_op(
        GateOp::PauliZ,
        Threading::SingleThread,
        CpuMemoryModel::Unaligned,
        3,
        QubitInterval::full(),
        BackendTag::Pi,
    )
    .unwrap();
    map.assign_kernel_for_op(
        GateOp::PauliZ,
        Threading::SingleThread,
        CpuMemoryModel::Unaligned,
        4,
        QubitInterval::closed(5, 5),
        BackendTag::ParallelLm,
    )
    .unwrap();

    let resolved = map
        .kernel_map(5, Threading::SingleThread, CpuMemoryModel::Unaligned)
        .unwrap();
    assert_eq!(resolved[&GateOp::PauliZ], BackendTag::ParallelLm);

    let resolved = map
        .kernel_map(6, Threading::SingleThread, CpuMemoryModel::Unaligned)
        .unwrap();
    assert_eq!(resolved[&GateOp::PauliZ], BackendTag::Pi);
}

#[test]
fn test_aligned512_accepts_avx512_assignments() {
    // An AVX-512 tag can be routed even without compiled-in kernels; the
    // registry only checks the allow-list.
    let mut map = gate_map_with_defaults();
    map.assign_kernel_for_op(
        GateOp::PauliX,
        Threading::SingleThread,
        CpuMemoryModel::Aligned512,
        5,
        QubitInterval::at_least(3),
        BackendTag::Avx512,
    )
    .unwrap();

    let resolved = map
        .kernel_map(4, Threading::SingleThread, CpuMemoryModel::Aligned512)
        .unwrap();
    assert_eq!(resolved[&GateOp::PauliX], BackendTag::Avx512);

    // Below the interval the defaults take over again (LM, unless the
    // host CPU's AVX2 override also starts there; it starts at 6, so 2
    // always falls through to the fallback).
    let resolved = map
        .kernel_map(2, Threading::SingleThread, CpuMemoryModel::Aligned512)
        .unwrap();
    assert_eq!(resolved[&GateOp::PauliX], BackendTag::Lm);

    // The same tag is rejected for unaligned buffers.
    let result = map.assign_kernel_for_op(
        GateOp::PauliX,
        Threading::SingleThread,
        CpuMemoryModel::Unaligned,
        5,
        QubitInterval::at_least(3),
        BackendTag::Avx512,
    );
    assert!(matches!(result, Err(DispatchError::KernelNotAllowed { .. })));
}

#[test]
fn test_shorthand_priorities() {
    let mut map = gate_map_with_defaults();

    // All-threading shorthand lands at priority 1 for one memory model.
    map.assign_for_all_threading(
        GateOp::S,
        CpuMemoryModel::Aligned256,
        QubitInterval::full(),
        BackendTag::Pi,
    )
    .unwrap();

    // All-memory-model shorthand lands at priority 2 and shadows it.
    map.assign_for_all_memory_models(
        GateOp::S,
        Threading::SingleThread,
        QubitInterval::closed(0, 4),
        BackendTag::ParallelLm,
    )
    .unwrap();

    let resolved = map
        .kernel_map(3, Threading::SingleThread, CpuMemoryModel::Aligned256)
        .unwrap();
    assert_eq!(resolved[&GateOp::S], BackendTag::ParallelLm);

    let resolved = map
        .kernel_map(8, Threading::SingleThread, CpuMemoryModel::Aligned256)
        .unwrap();
    assert_eq!(resolved[&GateOp::S], BackendTag::Pi);

    let resolved = map
        .kernel_map(8, Threading::MultiThread, CpuMemoryModel::Aligned256)
        .unwrap();
    assert_eq!(resolved[&GateOp::S], BackendTag::Pi);
}

#[test]
fn test_cache_transparency() {
    // Every query returns the same result before and after memoization.
    let mut map = gate_map_with_defaults();
    let cold = map
        .kernel_map(7, Threading::SingleThread, CpuMemoryModel::Unaligned)
        .unwrap();
    let warm = map
        .kernel_map(7, Threading::SingleThread, CpuMemoryModel::Unaligned)
        .unwrap();
    assert_eq!(cold, warm);
    assert!(map.cached_entries() >= 1);
}

#[test]
fn test_mutation_invalidates_cached_queries() {
    let mut map = gate_map_with_defaults();
    let before = map
        .kernel_map(6, Threading::SingleThread, CpuMemoryModel::Unaligned)
        .unwrap();
    assert_eq!(before[&GateOp::CNOT], BackendTag::Lm);

    map.assign_kernel_for_op(
        GateOp::CNOT,
        Threading::SingleThread,
        CpuMemoryModel::Unaligned,
        9,
        QubitInterval::full(),
        BackendTag::Pi,
    )
    .unwrap();
    assert_eq!(map.cached_entries(), 0);

    let after = map
        .kernel_map(6, Threading::SingleThread, CpuMemoryModel::Unaligned)
        .unwrap();
    assert_eq!(after[&GateOp::CNOT], BackendTag::Pi);

    map.remove_kernel_for_op(
        GateOp::CNOT,
        Threading::SingleThread,
        CpuMemoryModel::Unaligned,
        9,
    )
    .unwrap();
    let restored = map
        .kernel_map(6, Threading::SingleThread, CpuMemoryModel::Unaligned)
        .unwrap();
    assert_eq!(restored[&GateOp::CNOT], BackendTag::Lm);
}

#[test]
fn test_singletons_resolve() {
    // Smoke test only; the singletons share process-wide state, so the
    // behavioral assertions live on locally constructed maps above.
    let resolved = alsvin_dispatch::gate_kernel_map()
        .lock()
        .unwrap()
        .kernel_map(4, Threading::SingleThread, CpuMemoryModel::Unaligned)
        .unwrap();
    assert_eq!(resolved.len(), GateOp::ALL.len());

    let resolved = alsvin_dispatch::generator_kernel_map()
        .lock()
        .unwrap()
        .kernel_map(4, Threading::SingleThread, CpuMemoryModel::Unaligned)
        .unwrap();
    assert!(!resolved.is_empty());

    let resolved = alsvin_dispatch::matrix_kernel_map()
        .lock()
        .unwrap()
        .kernel_map(4, Threading::SingleThread, CpuMemoryModel::Unaligned)
        .unwrap();
    assert_eq!(resolved.len(), 3);
}
