//! Top-k selection for ranked hits

use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// One ranked search result.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub id: u64,
    pub display_name: String,
    pub similarity: f64,
}

/// Entry in the top-k min-heap.
///
/// Ordering: similarity ascending, then id descending (reversed). With
/// `Reverse<HeapEntry>` the heap root is the worst kept hit (lowest
/// similarity, highest id), which is the one to evict when a better
/// candidate arrives.
struct HeapEntry {
    similarity: f64,
    id: u64,
    display_name: String,
}

impl Eq for HeapEntry {}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == std::cmp::Ordering::Equal
    }
}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.similarity
            .total_cmp(&other.similarity)
            .then_with(|| other.id.cmp(&self.id))
    }
}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// Min-heap of the k best hits seen so far.
pub struct TopKHeap {
    k: usize,
    heap: BinaryHeap<Reverse<HeapEntry>>,
}

impl TopKHeap {
    pub fn new(k: usize) -> Self {
        TopKHeap {
            k,
            heap: BinaryHeap::with_capacity(k.saturating_add(1)),
        }
    }

    /// Offer a candidate. Admits while below capacity, otherwise only when
    /// it beats the current worst (full entry order, so an equal score keeps
    /// the lower id).
    pub fn offer(&mut self, id: u64, display_name: &str, similarity: f64) {
        if self.k == 0 {
            return;
        }
        if self.heap.len() < self.k {
            self.heap.push(Reverse(HeapEntry {
                similarity,
                id,
                display_name: display_name.to_string(),
            }));
            return;
        }
        if let Some(root) = self.heap.peek() {
            let beats_worst = similarity
                .total_cmp(&root.0.similarity)
                .then_with(|| root.0.id.cmp(&id))
                .is_gt();
            if beats_worst {
                self.heap.pop();
                self.heap.push(Reverse(HeapEntry {
                    similarity,
                    id,
                    display_name: display_name.to_string(),
                }));
            }
        }
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Drain into hits sorted by similarity descending, then id ascending.
    pub fn into_ranked(self) -> Vec<SearchHit> {
        let mut entries: Vec<HeapEntry> = self.heap.into_vec().into_iter().map(|r| r.0).collect();
        entries.sort_by(|a, b| {
            b.similarity
                .total_cmp(&a.similarity)
                .then_with(|| a.id.cmp(&b.id))
        });
        entries
            .into_iter()
            .map(|e| SearchHit {
                id: e.id,
                display_name: e.display_name,
                similarity: e.similarity,
            })
            .collect()
    }
}
