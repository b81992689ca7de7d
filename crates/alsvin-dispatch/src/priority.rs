//! Priority-ordered dispatch elements.

use alsvin_types::BackendTag;
use serde::{Deserialize, Serialize};

use crate::interval::QubitInterval;

/// One kernel assignment: a backend bound to a qubit-count interval at a
/// given priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchElement {
    /// Priority of the assignment; higher wins.
    pub priority: u32,
    /// Qubit counts the assignment covers.
    pub interval: QubitInterval,
    /// Backend to dispatch to.
    pub kernel: BackendTag,
}

/// Dispatch elements of one `(operation, dispatch key)` pair, kept in
/// decreasing priority order.
///
/// Invariant: within one priority level all intervals are pairwise
/// disjoint, so resolution is unambiguous.
#[derive(Debug, Clone, Default)]
pub struct PriorityDispatchSet {
    ordered: Vec<DispatchElement>,
}

impl PriorityDispatchSet {
    /// An empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `interval` overlaps an existing element at `priority`.
    pub fn conflict(&self, priority: u32, interval: &QubitInterval) -> bool {
        self.ordered
            .iter()
            .filter(|element| element.priority == priority)
            .any(|element| !element.interval.is_disjoint(interval))
    }

    /// Insert an element, keeping the decreasing priority order. Elements
    /// of equal priority stay in insertion order.
    pub fn insert(&mut self, element: DispatchElement) {
        let position = self
            .ordered
            .partition_point(|existing| existing.priority >= element.priority);
        self.ordered.insert(position, element);
    }

    /// Backend of the highest-priority element covering `num_qubits`.
    pub fn kernel_for(&self, num_qubits: usize) -> Option<BackendTag> {
        self.ordered
            .iter()
            .find(|element| element.interval.contains(num_qubits))
            .map(|element| element.kernel)
    }

    /// Remove every element at exactly `priority`.
    pub fn clear_priority(&mut self, priority: u32) {
        self.ordered.retain(|element| element.priority != priority);
    }

    /// Whether the set holds no elements.
    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    /// The elements in decreasing priority order.
    pub fn elements(&self) -> &[DispatchElement] {
        &self.ordered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(priority: u32, min: usize, max: usize, kernel: BackendTag) -> DispatchElement {
        DispatchElement {
            priority,
            interval: QubitInterval::closed(min, max),
            kernel,
        }
    }

    #[test]
    fn test_highest_priority_wins() {
        let mut set = PriorityDispatchSet::new();
        set.insert(DispatchElement {
            priority: 0,
            interval: QubitInterval::full(),
            kernel: BackendTag::Lm,
        });
        set.insert(element(5, 3, usize::MAX, BackendTag::Avx2));

        assert_eq!(set.kernel_for(2), Some(BackendTag::Lm));
        assert_eq!(set.kernel_for(3), Some(BackendTag::Avx2));
        assert_eq!(set.kernel_for(20), Some(BackendTag::Avx2));
    }

    #[test]
    fn test_insertion_order_is_priority_sorted() {
        let mut set = PriorityDispatchSet::new();
        set.insert(element(1, 0, 5, BackendTag::Pi));
        set.insert(element(3, 0, 5, BackendTag::Avx2));
        set.insert(element(2, 0, 5, BackendTag::Lm));

        let priorities: Vec<u32> = set.elements().iter().map(|e| e.priority).collect();
        assert_eq!(priorities, vec![3, 2, 1]);
    }

    #[test]
    fn test_conflict_same_priority_only() {
        let mut set = PriorityDispatchSet::new();
        set.insert(element(1, 0, 10, BackendTag::Lm));

        assert!(set.conflict(1, &QubitInterval::closed(5, 20)));
        assert!(!set.conflict(1, &QubitInterval::closed(11, 20)));
        assert!(!set.conflict(2, &QubitInterval::closed(5, 20)));
    }

    #[test]
    fn test_clear_priority() {
        let mut set = PriorityDispatchSet::new();
        set.insert(element(1, 0, 10, BackendTag::Lm));
        set.insert(element(1, 11, 20, BackendTag::Pi));
        set.insert(element(2, 0, 20, BackendTag::Avx2));

        set.clear_priority(1);
        assert_eq!(set.elements().len(), 1);
        assert_eq!(set.kernel_for(5), Some(BackendTag::Avx2));

        set.clear_priority(2);
        assert!(set.is_empty());
        assert_eq!(set.kernel_for(5), None);
    }
}
