//! An array backed binary min-heap.
//!
//! The children of index `i` live at `2i + 1` and `2i + 2`, the parent at `(i - 1) / 2`. Items
//! are compared with their `Ord` implementation; the Huffman builder orders by weight first and
//! insertion sequence second so that equal weights leave in FIFO order.

#[derive(Debug, Clone)]
pub(crate) struct MinHeap<T> {
    elements: Vec<T>,
}

impl<T: Ord> MinHeap<T> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        MinHeap {
            elements: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.elements.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub(crate) fn insert(&mut self, item: T) {
        self.elements.push(item);
        let mut i = self.elements.len() - 1;
        while i > 0 {
            let parent = (i - 1) / 2;
            if self.elements[i] >= self.elements[parent] {
                break;
            }
            self.elements.swap(i, parent);
            i = parent;
        }
    }

    pub(crate) fn extract_min(&mut self) -> Option<T> {
        let last = self.elements.pop()?;
        if self.elements.is_empty() {
            return Some(last);
        }

        let min = core::mem::replace(&mut self.elements[0], last);
        self.sift_down(0);
        Some(min)
    }

    fn sift_down(&mut self, mut i: usize) {
        let len = self.elements.len();
        loop {
            let left = 2 * i + 1;
            if left >= len {
                return;
            }

            let right = left + 1;
            let smaller = if right < len && self.elements[right] < self.elements[left] {
                right
            } else {
                left
            };

            if self.elements[i] <= self.elements[smaller] {
                return;
            }
            self.elements.swap(i, smaller);
            i = smaller;
        }
    }

    #[cfg(test)]
    fn is_valid(&self) -> bool {
        (1..self.elements.len()).all(|i| self.elements[(i - 1) / 2] <= self.elements[i])
    }
}

#[cfg(test)]
mod tests {
    use super::MinHeap;

    /// A small xorshift generator, deterministic per seed.
    fn numbers(mut seed: u64, count: usize) -> Vec<u64> {
        (0..count)
            .map(|_| {
                seed ^= seed << 13;
                seed ^= seed >> 7;
                seed ^= seed << 17;
                seed % 1000
            })
            .collect()
    }

    #[test]
    fn single_element() {
        let mut heap = MinHeap::with_capacity(1);
        heap.insert(7u32);
        assert_eq!(heap.extract_min(), Some(7));
        assert!(heap.is_empty());
        assert_eq!(heap.extract_min(), None);
    }

    #[test]
    fn extracts_in_sorted_order() {
        for seed in 1..50 {
            let values = numbers(seed, 64);
            let mut heap = MinHeap::with_capacity(values.len());
            for &v in &values {
                heap.insert(v);
                assert!(heap.is_valid());
            }

            let mut sorted = values.clone();
            sorted.sort_unstable();
            let mut drained = vec![];
            while let Some(v) = heap.extract_min() {
                assert!(heap.is_valid());
                drained.push(v);
            }
            assert_eq!(drained, sorted);
        }
    }

    #[test]
    fn interleaved_operations_keep_invariant() {
        let mut heap = MinHeap::with_capacity(16);
        let mut shadow: Vec<u64> = vec![];
        for (step, v) in numbers(0x5eed, 500).into_iter().enumerate() {
            if step % 3 == 2 {
                let min = shadow.iter().copied().min();
                if let Some(min) = min {
                    let pos = shadow.iter().position(|&x| x == min).unwrap();
                    shadow.swap_remove(pos);
                }
                assert_eq!(heap.extract_min(), min);
            } else {
                let before = heap.len();
                heap.insert(v);
                shadow.push(v);
                assert_eq!(heap.len(), before + 1);
            }
            assert!(heap.is_valid());
            assert_eq!(heap.len(), shadow.len());
        }
    }

    #[test]
    fn equal_keys_resolved_by_secondary_order() {
        let mut heap = MinHeap::with_capacity(4);
        heap.insert((3u64, 0u32));
        heap.insert((1, 1));
        heap.insert((3, 2));
        heap.insert((1, 3));
        assert_eq!(heap.extract_min(), Some((1, 1)));
        assert_eq!(heap.extract_min(), Some((1, 3)));
        assert_eq!(heap.extract_min(), Some((3, 0)));
        assert_eq!(heap.extract_min(), Some((3, 2)));
    }
}
