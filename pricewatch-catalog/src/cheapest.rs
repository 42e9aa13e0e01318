use crate::record::SharedRecord;
use std::cmp::Ordering;

/// Heap order: price first, record id breaks ties
fn cmp_records(a: &SharedRecord, b: &SharedRecord) -> Ordering {
    a.price_value()
        .total_cmp(&b.price_value())
        .then_with(|| a.id().cmp(&b.id()))
}

/// Array-backed binary min-heap over `(price_value, id)`
#[derive(Debug, Clone, Default)]
pub struct CheapestIndex {
    heap: Vec<SharedRecord>,
}

impl CheapestIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bulk-load and heapify bottom-up in O(n)
    pub fn build_from_collection<I>(records: I) -> Self
    where
        I: IntoIterator<Item = SharedRecord>,
    {
        let mut index = Self {
            heap: records.into_iter().collect(),
        };
        for i in (0..index.heap.len() / 2).rev() {
            index.sift_down(i);
        }
        index
    }

    pub fn insert(&mut self, record: SharedRecord) {
        self.heap.push(record);
        self.sift_up(self.heap.len() - 1);
    }

    pub fn extract_min(&mut self) -> Option<SharedRecord> {
        if self.heap.is_empty() {
            return None;
        }

        let min = self.heap.swap_remove(0);
        if !self.heap.is_empty() {
            self.sift_down(0);
        }
        Some(min)
    }

    pub fn peek(&self) -> Option<&SharedRecord> {
        self.heap.first()
    }

    /// The `n` cheapest records in ascending order, leaving `self` untouched
    pub fn top_n(&self, n: usize) -> Vec<SharedRecord> {
        let mut scratch = self.clone();
        let count = n.min(scratch.len());

        let mut out = Vec::with_capacity(count);
        while out.len() < count {
            match scratch.extract_min() {
                Some(record) => out.push(record),
                None => break,
            }
        }
        out
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Check that no child sorts before its parent
    pub fn is_valid(&self) -> bool {
        (1..self.heap.len())
            .all(|i| cmp_records(&self.heap[(i - 1) / 2], &self.heap[i]) != Ordering::Greater)
    }

    fn sift_up(&mut self, mut index: usize) {
        while index > 0 {
            let parent = (index - 1) / 2;
            if cmp_records(&self.heap[index], &self.heap[parent]) == Ordering::Less {
                self.heap.swap(index, parent);
                index = parent;
            } else {
                break;
            }
        }
    }

    fn sift_down(&mut self, mut index: usize) {
        let len = self.heap.len();
        loop {
            let left = 2 * index + 1;
            let right = left + 1;
            let mut smallest = index;

            if left < len && cmp_records(&self.heap[left], &self.heap[smallest]).is_lt() {
                smallest = left;
            }
            if right < len && cmp_records(&self.heap[right], &self.heap[smallest]).is_lt() {
                smallest = right;
            }
            if smallest == index {
                break;
            }

            self.heap.swap(index, smallest);
            index = smallest;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Record, RecordDraft, RecordId};
    use pricewatch_shared::Store;
    use std::sync::Arc;

    fn priced(id: u64, price: u64) -> SharedRecord {
        Arc::new(Record::new(
            RecordId(id),
            RecordDraft::new(format!("item {}", id), price.to_string(), Store::Alkosto),
        ))
    }

    fn prices(records: &[SharedRecord]) -> Vec<f64> {
        records.iter().map(|r| r.price_value()).collect()
    }

    #[test]
    fn test_top_n_cheapest() {
        let mut heap = CheapestIndex::new();
        for (i, price) in [100, 50, 75, 20, 60].iter().enumerate() {
            heap.insert(priced(i as u64, *price));
        }

        assert_eq!(prices(&heap.top_n(3)), vec![20.0, 50.0, 60.0]);
        // the source heap is untouched
        assert_eq!(heap.len(), 5);
        assert_eq!(heap.peek().unwrap().price_value(), 20.0);
        assert_eq!(heap.top_n(10).len(), 5);
        assert!(heap.top_n(0).is_empty());
    }

    #[test]
    fn test_extract_min_drains_in_order() {
        let mut heap = CheapestIndex::build_from_collection(
            [9, 3, 7, 1, 8, 2].iter().enumerate().map(|(i, p)| priced(i as u64, *p)),
        );
        assert!(heap.is_valid());

        let mut drained = Vec::new();
        while let Some(record) = heap.extract_min() {
            assert!(heap.is_valid());
            drained.push(record.price_value());
        }
        assert_eq!(drained, vec![1.0, 2.0, 3.0, 7.0, 8.0, 9.0]);
        assert!(heap.peek().is_none());
        assert!(heap.extract_min().is_none());
    }

    #[test]
    fn test_ties_break_by_id() {
        let heap = CheapestIndex::build_from_collection(vec![
            priced(4, 10),
            priced(2, 10),
            priced(9, 5),
            priced(1, 10),
        ]);

        let ids: Vec<_> = heap.top_n(4).iter().map(|r| r.id()).collect();
        assert_eq!(ids, vec![RecordId(9), RecordId(1), RecordId(2), RecordId(4)]);
    }

    #[test]
    fn test_empty_heap() {
        let heap = CheapestIndex::new();
        assert!(heap.peek().is_none());
        assert!(heap.top_n(5).is_empty());
        assert!(heap.is_valid());
    }
}
