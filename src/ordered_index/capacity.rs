use super::OrderedIndex;
use crate::raw::RawIndex;

impl OrderedIndex {
    /// Creates an empty index with room for at least `capacity` records.
    ///
    /// # Examples
    ///
    /// ```
    /// use roster_tree::OrderedIndex;
    ///
    /// let index = OrderedIndex::with_capacity(32);
    /// assert!(index.is_empty());
    /// assert!(index.capacity() >= 32);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(capacity) for memory allocation.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        OrderedIndex {
            raw: RawIndex::with_capacity(capacity),
        }
    }

    /// Returns how many records the index can hold without reallocating.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.raw.capacity()
    }
}
