use smallvec::SmallVec;

/// A vector that stores up to `N` elements inline and spills to the heap beyond that.
///
/// Commands keep their variable length payloads in these, so a pooled
/// command that is cleared and refilled with at most `N` elements never
/// touches the allocator. Once spilled, the heap storage is kept across
/// [`clear`](Self::clear) calls as well.
#[derive(Debug, Clone)]
pub struct PooledVec<T, const N: usize> {
    inner: SmallVec<[T; N]>,
}

impl<T, const N: usize> Default for PooledVec<T, N> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const N: usize> PooledVec<T, N> {
    /// The number of elements that fit without a heap allocation.
    pub const INLINE_CAPACITY: usize = N;

    #[inline]
    pub fn new() -> Self {
        Self {
            inner: SmallVec::new(),
        }
    }

    /// Removes all elements, keeping the storage.
    #[inline]
    pub fn clear(&mut self) {
        self.inner.clear();
    }

    /// Makes sure at least `capacity` elements fit without reallocating.
    #[inline]
    pub fn reserve(&mut self, capacity: usize) {
        let len = self.inner.len();
        if capacity > len {
            self.inner.reserve(capacity - len);
        }
    }

    #[inline]
    pub fn push(&mut self, value: T) {
        self.inner.push(value);
    }

    /// The current contents. Valid until the next mutation.
    #[inline]
    pub fn contents(&self) -> &[T] {
        &self.inner
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.inner.capacity()
    }

    /// Returns `true` if the elements live on the heap.
    #[inline]
    pub fn spilled(&self) -> bool {
        self.inner.spilled()
    }

    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.inner.iter()
    }
}

impl<T: Copy, const N: usize> PooledVec<T, N> {
    /// Replaces the contents with a copy of `values`.
    pub fn assign(&mut self, values: &[T]) {
        self.clear();
        self.reserve(values.len());
        self.inner.extend_from_slice(values);
    }
}

impl<'a, T, const N: usize> IntoIterator for &'a PooledVec<T, N> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stays_inline_up_to_capacity() {
        let mut values = PooledVec::<u32, 4>::new();
        for i in 0..4 {
            values.push(i);
        }

        assert!(!values.spilled());
        assert_eq!(values.contents(), &[0, 1, 2, 3]);
    }

    #[test]
    fn test_spills_past_capacity() {
        let mut values = PooledVec::<u32, 2>::new();
        values.assign(&[1, 2, 3]);

        assert!(values.spilled());
        assert_eq!(values.contents(), &[1, 2, 3]);
    }

    #[test]
    fn test_clear_keeps_heap_storage() {
        let mut values = PooledVec::<u32, 2>::new();
        values.assign(&[1, 2, 3, 4, 5]);
        let capacity = values.capacity();

        values.clear();
        assert!(values.is_empty());
        values.assign(&[6, 7, 8]);

        assert_eq!(values.capacity(), capacity);
        assert_eq!(values.contents(), &[6, 7, 8]);
    }

    #[test]
    fn test_reserve_within_inline_capacity_does_not_allocate() {
        let mut values = PooledVec::<u32, 9>::new();
        values.reserve(9);
        assert!(!values.spilled());

        values.reserve(10);
        assert!(values.spilled());
        assert!(values.capacity() >= 10);
    }

    #[test]
    fn test_zero_inline_capacity() {
        let mut values = PooledVec::<u32, 0>::new();
        assert_eq!(PooledVec::<u32, 0>::INLINE_CAPACITY, 0);
        assert!(!values.spilled());

        values.push(1);
        assert!(values.spilled());
    }
}
