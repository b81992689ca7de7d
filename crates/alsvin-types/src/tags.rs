//! Backend tags, threading options, and dispatch-key packing.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity tag of a kernel backend.
///
/// Tags are part of the stable wire format: external drivers serialize them
/// when recording which backend executed which operation. A tag may exist
/// without a compiled-in implementation (see `Avx512`), in which case it is
/// assignable in the dispatch registry but yields an `Unsupported` error
/// when invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BackendTag {
    /// Memoryless bit-arithmetic backend.
    Lm,
    /// Precomputed-index backend.
    Pi,
    /// Rayon-partitioned variant of the LM backend.
    ParallelLm,
    /// AVX2 SIMD backend (x86_64).
    Avx2,
    /// AVX-512 SIMD backend tag; no kernels in this workspace.
    Avx512,
}

impl BackendTag {
    /// Human-readable backend name.
    pub fn name(&self) -> &'static str {
        match self {
            BackendTag::Lm => "LM",
            BackendTag::Pi => "PI",
            BackendTag::ParallelLm => "ParallelLM",
            BackendTag::Avx2 => "AVX2",
            BackendTag::Avx512 => "AVX512",
        }
    }
}

impl fmt::Display for BackendTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Threading context of the calling statevector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Threading {
    /// One gate at a time, one thread.
    SingleThread,
    /// Intra-kernel parallelism permitted.
    MultiThread,
}

impl Threading {
    /// All threading options, in dispatch-key index order.
    pub const ALL: [Threading; 2] = [Threading::SingleThread, Threading::MultiThread];

    /// Index used in dispatch-key packing.
    #[inline]
    pub fn index(&self) -> u32 {
        match self {
            Threading::SingleThread => 0,
            Threading::MultiThread => 1,
        }
    }
}

impl fmt::Display for Threading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Threading::SingleThread => f.write_str("SingleThread"),
            Threading::MultiThread => f.write_str("MultiThread"),
        }
    }
}

/// Pack a threading option and a memory model into a dispatch key.
///
/// The packing `(threading << 16) | memory_model` is part of the stable
/// interface; external drivers may persist keys.
#[inline]
pub fn dispatch_key(threading: Threading, memory_model: crate::CpuMemoryModel) -> u32 {
    (threading.index() << 16) | memory_model.index()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CpuMemoryModel;

    #[test]
    fn test_backend_names() {
        assert_eq!(BackendTag::Lm.name(), "LM");
        assert_eq!(BackendTag::ParallelLm.name(), "ParallelLM");
        assert_eq!(BackendTag::Avx512.to_string(), "AVX512");
    }

    #[test]
    fn test_dispatch_key_packing() {
        assert_eq!(
            dispatch_key(Threading::SingleThread, CpuMemoryModel::Unaligned),
            0
        );
        assert_eq!(
            dispatch_key(Threading::SingleThread, CpuMemoryModel::Aligned512),
            2
        );
        assert_eq!(
            dispatch_key(Threading::MultiThread, CpuMemoryModel::Unaligned),
            1 << 16
        );
        assert_eq!(
            dispatch_key(Threading::MultiThread, CpuMemoryModel::Aligned256),
            (1 << 16) | 1
        );
    }

    #[test]
    fn test_dispatch_keys_distinct() {
        let mut keys = vec![];
        for threading in Threading::ALL {
            for memory_model in CpuMemoryModel::ALL {
                keys.push(dispatch_key(threading, memory_model));
            }
        }
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), 6);
    }
}
