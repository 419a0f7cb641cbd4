//! Sequence helpers: chunking, key-based deduplication and in-place moves.

use std::collections::HashSet;
use std::hash::Hash;

/// Read-only helpers available on any slice (and so on `Vec`).
pub trait SliceExt<T> {
    /// Split into consecutive chunks of `size` elements; only the last chunk
    /// may be shorter. A `size` of zero yields no chunks.
    fn chunked(&self, size: usize) -> Vec<Vec<T>>
    where
        T: Clone;

    /// Keep the first element seen for each distinct key, preserving order.
    ///
    /// Deduplicating on several fields is a matter of returning a tuple:
    ///
    /// ```
    /// use kitbag_types::SliceExt;
    ///
    /// let people = [("Darren", "Jones", 36), ("Darren", "Jones", 42), ("Mark", "Chadwick", 22)];
    /// let unique = people.uniques_by(|p| (p.0, p.1));
    /// assert_eq!(unique, vec![("Darren", "Jones", 36), ("Mark", "Chadwick", 22)]);
    /// ```
    fn uniques_by<K, F>(&self, key: F) -> Vec<T>
    where
        T: Clone,
        K: Hash + Eq,
        F: FnMut(&T) -> K;
}

impl<T> SliceExt<T> for [T] {
    fn chunked(&self, size: usize) -> Vec<Vec<T>>
    where
        T: Clone,
    {
        if size == 0 {
            return Vec::new();
        }
        self.chunks(size).map(<[T]>::to_vec).collect()
    }

    fn uniques_by<K, F>(&self, mut key: F) -> Vec<T>
    where
        T: Clone,
        K: Hash + Eq,
        F: FnMut(&T) -> K,
    {
        let mut seen = HashSet::new();
        self.iter()
            .filter(|item| seen.insert(key(item)))
            .cloned()
            .collect()
    }
}

/// In-place helpers on `Vec`.
pub trait VecExt<T> {
    /// Remove the first element equal to `element`. Returns whether one was removed.
    fn remove_first(&mut self, element: &T) -> bool
    where
        T: PartialEq;

    /// Move the first element equal to `element` to `new_index`.
    fn move_element(&mut self, element: &T, new_index: usize) -> bool
    where
        T: PartialEq;

    /// Move the element at `from` so it ends up at `to`.
    ///
    /// Returns `false` and leaves the vector untouched if either index is out
    /// of range.
    fn move_index(&mut self, from: usize, to: usize) -> bool;
}

impl<T> VecExt<T> for Vec<T> {
    fn remove_first(&mut self, element: &T) -> bool
    where
        T: PartialEq,
    {
        match self.iter().position(|item| item == element) {
            Some(index) => {
                self.remove(index);
                true
            }
            None => false,
        }
    }

    fn move_element(&mut self, element: &T, new_index: usize) -> bool
    where
        T: PartialEq,
    {
        match self.iter().position(|item| item == element) {
            Some(index) => self.move_index(index, new_index),
            None => false,
        }
    }

    fn move_index(&mut self, from: usize, to: usize) -> bool {
        if from >= self.len() || to >= self.len() {
            return false;
        }
        if from == to {
            return true;
        }
        if from.abs_diff(to) == 1 {
            self.swap(from, to);
            return true;
        }
        let item = self.remove(from);
        self.insert(to, item);
        true
    }
}
