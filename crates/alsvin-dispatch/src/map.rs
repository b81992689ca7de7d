//! The operation → kernel registry with its bounded resolution cache.

use std::collections::VecDeque;

use alsvin_gates::Operation;
use alsvin_types::{dispatch_key, BackendTag, CpuMemoryModel, Threading};
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::error::{DispatchError, DispatchResult};
use crate::interval::QubitInterval;
use crate::priority::{DispatchElement, PriorityDispatchSet};

/// Capacity of the resolved-map cache.
pub const KERNEL_MAP_CACHE_SIZE: usize = 16;

struct CacheEntry<Op> {
    num_qubits: usize,
    dispatch_key: u32,
    resolved: FxHashMap<Op, BackendTag>,
}

/// Registry mapping `(operation, dispatch key)` to priority-ranked kernel
/// assignments.
///
/// Mutations go through [`assign_kernel_for_op`](Self::assign_kernel_for_op)
/// and [`remove_kernel_for_op`](Self::remove_kernel_for_op), both of which
/// invalidate the cache. Resolution via [`kernel_map`](Self::kernel_map)
/// memoizes per `(num_qubits, dispatch_key)`; the oldest entry is evicted
/// once the cache is full.
pub struct OperationKernelMap<Op: Operation> {
    kernel_map: FxHashMap<(Op, u32), PriorityDispatchSet>,
    cache: VecDeque<CacheEntry<Op>>,
    allowed_kernels: FxHashMap<CpuMemoryModel, Vec<BackendTag>>,
}

impl<Op: Operation> OperationKernelMap<Op> {
    /// An empty registry with the default per-memory-model allow-lists.
    ///
    /// Every model admits the scalar backends; SIMD backends are admitted
    /// only by the models that satisfy their load alignment.
    pub fn new() -> Self {
        let mut allowed_kernels = FxHashMap::default();
        allowed_kernels.insert(
            CpuMemoryModel::Unaligned,
            vec![BackendTag::Lm, BackendTag::Pi, BackendTag::ParallelLm],
        );
        allowed_kernels.insert(
            CpuMemoryModel::Aligned256,
            vec![
                BackendTag::Lm,
                BackendTag::Pi,
                BackendTag::ParallelLm,
                BackendTag::Avx2,
            ],
        );
        allowed_kernels.insert(
            CpuMemoryModel::Aligned512,
            vec![
                BackendTag::Lm,
                BackendTag::Pi,
                BackendTag::ParallelLm,
                BackendTag::Avx2,
                BackendTag::Avx512,
            ],
        );

        Self {
            kernel_map: FxHashMap::default(),
            cache: VecDeque::new(),
            allowed_kernels,
        }
    }

    /// Assign `kernel` to `op` for one dispatch key at an explicit
    /// priority over `interval`.
    ///
    /// The interval must be disjoint with every existing assignment of the
    /// same priority for that key.
    pub fn assign_kernel_for_op(
        &mut self,
        op: Op,
        threading: Threading,
        memory_model: CpuMemoryModel,
        priority: u32,
        interval: QubitInterval,
        kernel: BackendTag,
    ) -> DispatchResult<()> {
        let allowed = &self.allowed_kernels[&memory_model];
        if !allowed.contains(&kernel) {
            return Err(DispatchError::KernelNotAllowed {
                kernel,
                memory_model,
            });
        }

        let key = (op, dispatch_key(threading, memory_model));
        let set = self.kernel_map.entry(key).or_default();
        if set.conflict(priority, &interval) {
            return Err(DispatchError::IntervalConflict { priority, interval });
        }

        debug!(
            operation = op.name(),
            %threading,
            %memory_model,
            priority,
            %interval,
            %kernel,
            "assigning kernel"
        );
        self.cache.clear();
        set.insert(DispatchElement {
            priority,
            interval,
            kernel,
        });
        Ok(())
    }

    /// Assign `kernel` for every threading option of one memory model, at
    /// priority 1.
    pub fn assign_for_all_threading(
        &mut self,
        op: Op,
        memory_model: CpuMemoryModel,
        interval: QubitInterval,
        kernel: BackendTag,
    ) -> DispatchResult<()> {
        for threading in Threading::ALL {
            self.assign_kernel_for_op(op, threading, memory_model, 1, interval, kernel)?;
        }
        Ok(())
    }

    /// Assign `kernel` for every memory model of one threading option, at
    /// priority 2.
    pub fn assign_for_all_memory_models(
        &mut self,
        op: Op,
        threading: Threading,
        interval: QubitInterval,
        kernel: BackendTag,
    ) -> DispatchResult<()> {
        for memory_model in CpuMemoryModel::ALL {
            self.assign_kernel_for_op(op, threading, memory_model, 2, interval, kernel)?;
        }
        Ok(())
    }

    /// Assign `kernel` for every dispatch key at priority 0, the universal
    /// fallback level.
    pub fn assign_fallback(
        &mut self,
        op: Op,
        interval: QubitInterval,
        kernel: BackendTag,
    ) -> DispatchResult<()> {
        for threading in Threading::ALL {
            for memory_model in CpuMemoryModel::ALL {
                self.assign_kernel_for_op(op, threading, memory_model, 0, interval, kernel)?;
            }
        }
        Ok(())
    }

    /// Remove every assignment of `op` at exactly `priority` under one
    /// dispatch key.
    pub fn remove_kernel_for_op(
        &mut self,
        op: Op,
        threading: Threading,
        memory_model: CpuMemoryModel,
        priority: u32,
    ) -> DispatchResult<()> {
        let key = (op, dispatch_key(threading, memory_model));
        let set = self
            .kernel_map
            .get_mut(&key)
            .ok_or(DispatchError::KeyNotFound {
                operation: op.name(),
            })?;

        debug!(
            operation = op.name(),
            %threading,
            %memory_model,
            priority,
            "removing kernel assignments"
        );
        set.clear_priority(priority);
        self.cache.clear();
        Ok(())
    }

    /// Resolve the kernel for every known operation at `num_qubits`.
    ///
    /// Results are memoized per `(num_qubits, dispatch_key)`.
    pub fn kernel_map(
        &mut self,
        num_qubits: usize,
        threading: Threading,
        memory_model: CpuMemoryModel,
    ) -> DispatchResult<FxHashMap<Op, BackendTag>> {
        let key = dispatch_key(threading, memory_model);

        if let Some(entry) = self
            .cache
            .iter()
            .find(|entry| entry.num_qubits == num_qubits && entry.dispatch_key == key)
        {
            return Ok(entry.resolved.clone());
        }

        let mut resolved = FxHashMap::default();
        for &op in Op::ALL {
            let set = self.kernel_map.get(&(op, key)).ok_or(
                DispatchError::NoKernelForQubitCount {
                    operation: op.name(),
                    num_qubits,
                },
            )?;
            let kernel =
                set.kernel_for(num_qubits)
                    .ok_or(DispatchError::NoKernelForQubitCount {
                        operation: op.name(),
                        num_qubits,
                    })?;
            resolved.insert(op, kernel);
        }

        debug!(num_qubits, dispatch_key = key, "caching resolved kernel map");
        if self.cache.len() == KERNEL_MAP_CACHE_SIZE {
            self.cache.pop_back();
        }
        self.cache.push_front(CacheEntry {
            num_qubits,
            dispatch_key: key,
            resolved: resolved.clone(),
        });
        Ok(resolved)
    }

    /// Number of memoized kernel maps currently held.
    pub fn cached_entries(&self) -> usize {
        self.cache.len()
    }
}

impl<Op: Operation> Default for OperationKernelMap<Op> {
    fn default() -> Self {
        Self::new()
    }
}
