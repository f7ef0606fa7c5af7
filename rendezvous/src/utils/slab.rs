/// A simple slab allocator.
///
/// A `Slab` stores values of type `T` in a contiguous vector and returns
/// stable indices that can be reused after removal. Freed indices are
/// kept on a stack so that the most recently freed slot is reused first.
///
/// The wait table keeps one slab per bucket: each parked thread occupies
/// one slot for as long as it is blocked.
pub(crate) struct Slab<T> {
    /// Storage for items. `None` marks a free slot.
    items: Vec<Option<T>>,
    /// Stack of free indices that can be reused.
    free: Vec<usize>,
}

impl<T> Slab<T> {
    /// Creates a new `Slab` with a fixed initial capacity.
    ///
    /// # Arguments
    ///
    /// * `size` - Initial number of slots to allocate.
    pub(crate) fn new(size: usize) -> Self {
        let items = (0..size).map(|_| None).collect();
        let free = (0..size).rev().collect();

        Self { items, free }
    }

    /// Inserts a value into the slab and returns its index.
    ///
    /// If a free slot is available, it is reused. Otherwise, the slab
    /// grows exponentially.
    pub(crate) fn insert(&mut self, item: T) -> usize {
        let index = match self.free.pop() {
            Some(i) => i,
            None => {
                let len = self.items.len();
                let new_len = if len == 0 { 1 } else { 2 * len };

                self.items.resize_with(new_len, || None);
                self.free.extend(((len + 1)..new_len).rev());

                len
            }
        };

        self.items[index] = Some(item);
        index
    }

    /// Removes and returns the value stored at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds or the slot is not in use.
    pub(crate) fn remove(&mut self, index: usize) -> T {
        assert!(index < self.items.len(), "Index out of range");

        let item = self.items[index].take().expect("Item is not set");
        self.free.push(index);

        item
    }

    /// Returns a mutable reference to the value at `index`, if the slot is in use.
    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.items.get_mut(index).and_then(Option::as_mut)
    }

    /// Iterates mutably over every occupied slot, in index order.
    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.items.iter_mut().filter_map(Option::as_mut)
    }

    /// Returns the number of occupied slots.
    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.items.len() - self.free.len()
    }
}

#[cfg(test)]
mod tests {
    use super::Slab;

    #[test]
    fn test_insert_reuses_freed_slot() {
        let mut slab = Slab::new(2);

        let a = slab.insert("a");
        let b = slab.insert("b");
        assert_ne!(a, b);

        assert_eq!(slab.remove(a), "a");
        let c = slab.insert("c");
        assert_eq!(c, a);
        assert_eq!(slab.len(), 2);
    }

    #[test]
    fn test_grows_past_initial_capacity() {
        let mut slab = Slab::new(0);

        let indices: Vec<_> = (0..9).map(|i| slab.insert(i)).collect();
        assert_eq!(slab.len(), 9);

        for (value, index) in indices.iter().enumerate() {
            assert_eq!(slab.get_mut(*index).copied(), Some(value));
        }
    }

    #[test]
    fn test_iter_mut_skips_free_slots() {
        let mut slab = Slab::new(4);

        let first = slab.insert(1);
        slab.insert(2);
        slab.insert(3);
        slab.remove(first);

        for item in slab.iter_mut() {
            *item *= 10;
        }

        let mut seen: Vec<_> = slab.iter_mut().map(|v| *v).collect();
        seen.sort();
        assert_eq!(seen, vec![20, 30]);
    }

    #[test]
    #[should_panic(expected = "Item is not set")]
    fn test_remove_twice_panics() {
        let mut slab = Slab::new(1);

        let index = slab.insert(());
        slab.remove(index);
        slab.remove(index);
    }
}
