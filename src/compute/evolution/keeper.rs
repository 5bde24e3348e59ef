//! Bounded retention of the best candidates seen so far.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::fmt;

use crate::ast::{Node, NodeRef};

/// Keeps the `capacity` greatest items submitted to it.
///
/// Backed by a min-heap, so the worst kept item sits on top and each
/// submission costs `O(log n)`. At capacity, a candidate that is not
/// strictly greater than the current worst is discarded.
#[derive(Debug, Clone)]
pub struct EliteKeeper<T: Ord> {
    heap: BinaryHeap<Reverse<T>>,
    capacity: usize,
}

impl<T: Ord> EliteKeeper<T> {
    /// Create an empty keeper. A capacity of 0 is treated as 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            heap: BinaryHeap::with_capacity(capacity),
            capacity,
        }
    }

    /// Offer a candidate. Returns `true` if it was kept.
    pub fn submit(&mut self, item: T) -> bool {
        if self.heap.len() < self.capacity {
            self.heap.push(Reverse(item));
            return true;
        }
        match self.heap.peek() {
            Some(Reverse(worst)) if item > *worst => {
                self.heap.pop();
                self.heap.push(Reverse(item));
                true
            }
            _ => false,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn best(&self) -> Option<&T> {
        self.heap.iter().map(|Reverse(item)| item).max()
    }

    pub fn worst(&self) -> Option<&T> {
        self.heap.peek().map(|Reverse(item)| item)
    }

    /// Drop every item, keeping the capacity.
    pub fn clear(&mut self) {
        self.heap.clear();
    }

    /// Submit every item of another keeper.
    pub fn merge(&mut self, other: EliteKeeper<T>) {
        self.extend(other.heap.into_iter().map(|Reverse(item)| item));
    }

    /// Consume the keeper, best first.
    pub fn into_sorted_vec(self) -> Vec<T> {
        // Sorted ascending by `Reverse`, so the greatest item comes first.
        self.heap
            .into_sorted_vec()
            .into_iter()
            .map(|Reverse(item)| item)
            .collect()
    }
}

impl<T: Ord + Clone> EliteKeeper<T> {
    /// Point-in-time copy of the kept items, best first.
    pub fn snapshot(&self) -> Vec<T> {
        self.clone().into_sorted_vec()
    }
}

impl<T: Ord> Extend<T> for EliteKeeper<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for item in iter {
            self.submit(item);
        }
    }
}

/// A scored candidate expression.
///
/// Ordered so that a lower difference compares greater, which makes
/// "greater" mean "better" throughout the keeper and the tournament.
#[derive(Debug, Clone)]
pub struct ComputedResult {
    pub expression: NodeRef,
    pub size: usize,
    pub difference: f64,
}

impl ComputedResult {
    pub fn new(expression: NodeRef, size: usize, difference: f64) -> Self {
        Self {
            expression,
            size,
            difference,
        }
    }
}

impl Default for ComputedResult {
    /// Worst possible result, used to seed tournaments.
    fn default() -> Self {
        Self {
            expression: Node::error("no candidate"),
            size: 1,
            difference: f64::MAX,
        }
    }
}

impl PartialEq for ComputedResult {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ComputedResult {}

impl PartialOrd for ComputedResult {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ComputedResult {
    fn cmp(&self, other: &Self) -> Ordering {
        other.difference.total_cmp(&self.difference)
    }
}

impl fmt::Display for ComputedResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (size {}, difference {})",
            self.expression, self.size, self.difference
        )
    }
}
