use std::collections::VecDeque;

/// Fixed-capacity FIFO for one series.
///
/// `push` never evicts on its own so that several parallel buffers can be
/// trimmed together by their owner; `evict_overflow` drops exactly the
/// points beyond capacity from the front.
#[derive(Debug, Clone)]
pub struct RingBuffer<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> RingBuffer<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, item: T) {
        self.items.push_back(item);
    }

    /// Number of points currently held beyond capacity
    pub fn overflow(&self) -> usize {
        self.items.len().saturating_sub(self.capacity)
    }

    /// Remove `count` points from the front (oldest first)
    pub fn evict_front(&mut self, count: usize) {
        let count = count.min(self.items.len());
        self.items.drain(..count);
    }

    /// Trim to capacity, returning how many points were removed
    pub fn evict_overflow(&mut self) -> usize {
        let excess = self.overflow();
        self.evict_front(excess);
        excess
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    pub fn back(&self) -> Option<&T> {
        self.items.back()
    }

    pub fn clear(&mut self) {
        self.items.clear();
        // A burst larger than capacity may have grown the deque; give that back
        self.items.shrink_to(self.capacity);
    }
}

impl<T: Clone> RingBuffer<T> {
    pub fn to_vec(&self) -> Vec<T> {
        self.items.iter().cloned().collect()
    }
}
