//! Ordered step collection: priority-keyed buckets with stable insertion
//! order inside each bucket and one linear view across all of them.

use thiserror::Error;

use crate::priority::Priority;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("invalid priorities are unorderable and rejected at insertion")]
    InvalidPriority,
}

#[derive(Debug)]
struct Bucket<T> {
    key: Priority,
    items: Vec<T>,
}

/// Associates items with `Priority` keys. Buckets stay sorted by key
/// (binary-search insertion, so lookups are O(log K)); appending to an
/// existing bucket is O(1) and preserves insertion order, the only
/// tie-break.
#[derive(Debug)]
pub struct PriorityList<T> {
    buckets: Vec<Bucket<T>>,
}

impl<T> Default for PriorityList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> PriorityList<T> {
    pub fn new() -> Self {
        Self { buckets: Vec::new() }
    }

    /// Appends `item` under `priority`. Invalid priorities would make the
    /// linear order ill-defined and are rejected here rather than tolerated.
    pub fn add(&mut self, priority: Priority, item: T) -> Result<(), ScheduleError> {
        if priority.is_invalid() {
            return Err(ScheduleError::InvalidPriority);
        }
        match self.buckets.binary_search_by(|bucket| bucket.key.cmp_valid(&priority)) {
            Ok(found) => self.buckets[found].items.push(item),
            Err(slot) => self.buckets.insert(slot, Bucket { key: priority, items: vec![item] }),
        }
        Ok(())
    }

    /// Distinct priorities in ascending order.
    pub fn priorities(&self) -> impl Iterator<Item = &Priority> {
        self.buckets.iter().map(|bucket| &bucket.key)
    }

    /// Items registered under one priority, in insertion order.
    pub fn items(&self, priority: &Priority) -> &[T] {
        if priority.is_invalid() {
            return &[];
        }
        match self.buckets.binary_search_by(|bucket| bucket.key.cmp_valid(priority)) {
            Ok(found) => self.buckets[found].items.as_slice(),
            Err(_) => &[],
        }
    }

    pub fn len(&self) -> usize {
        self.buckets.iter().map(|bucket| bucket.items.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// The one linear order: priority ascending, insertion order ascending.
    /// The view walks the sorted buckets incrementally; nothing is re-sorted
    /// per element, so callers may interleave reads with side effects.
    pub fn ordered(&self) -> Ordered<'_, T> {
        Ordered { buckets: &self.buckets, bucket: 0, index: 0 }
    }
}

pub struct Ordered<'a, T> {
    buckets: &'a [Bucket<T>],
    bucket: usize,
    index: usize,
}

impl<'a, T> Iterator for Ordered<'a, T> {
    type Item = (&'a Priority, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(bucket) = self.buckets.get(self.bucket) {
            if let Some(item) = bucket.items.get(self.index) {
                self.index += 1;
                return Some((&bucket.key, item));
            }
            self.bucket += 1;
            self.index = 0;
        }
        None
    }
}
