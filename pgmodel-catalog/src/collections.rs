//! Small ordered collections used by the dependency index.

use std::hash::Hash;

use rustc_hash::FxHashMap;

/// A multimap whose value lists preserve insertion order.
///
/// The dependency index needs two removal shapes: by-(key, value) when a
/// single constraint is dropped, and wholesale by-key when a column
/// disappears. Element removal deletes the key entry once its list becomes
/// empty, so `contains_key` always reflects whether any dependents remain.
#[derive(Debug, Clone)]
pub struct Multimap<K, V> {
    entries: FxHashMap<K, Vec<V>>,
}

impl<K: Eq + Hash, V: PartialEq> Multimap<K, V> {
    pub fn new() -> Self {
        Multimap {
            entries: FxHashMap::default(),
        }
    }

    /// Append `value` to the list under `key`.
    pub fn add(&mut self, key: K, value: V) {
        self.entries.entry(key).or_default().push(value);
    }

    /// Values under `key` in insertion order, or an empty slice.
    pub fn get(&self, key: &K) -> &[V] {
        self.entries.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    /// Remove every value under `key`.
    pub fn remove_key(&mut self, key: &K) -> Option<Vec<V>> {
        self.entries.remove(key)
    }

    /// Remove the first occurrence of `value` under `key`, dropping the key
    /// entry entirely when its list becomes empty.
    pub fn remove_value(&mut self, key: &K, value: &V) {
        if let Some(values) = self.entries.get_mut(key) {
            if let Some(position) = values.iter().position(|v| v == value) {
                values.remove(position);
            }
            if values.is_empty() {
                self.entries.remove(key);
            }
        }
    }

    /// Number of keys with at least one value.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(key, values)` pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &[V])> {
        self.entries.iter().map(|(k, v)| (k, v.as_slice()))
    }
}

impl<K: Eq + Hash, V: PartialEq> Default for Multimap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_keep_insertion_order() {
        let mut map = Multimap::new();
        map.add("k", 3);
        map.add("k", 1);
        map.add("k", 2);
        assert_eq!(map.get(&"k"), &[3, 1, 2]);
    }

    #[test]
    fn remove_value_preserves_remaining_order() {
        let mut map = Multimap::new();
        map.add("k", 3);
        map.add("k", 1);
        map.add("k", 2);
        map.remove_value(&"k", &1);
        assert_eq!(map.get(&"k"), &[3, 2]);
    }

    #[test]
    fn remove_value_collapses_empty_lists() {
        let mut map = Multimap::new();
        map.add("k", 1);
        map.remove_value(&"k", &1);
        assert!(!map.contains_key(&"k"));
        assert!(map.get(&"k").is_empty());
        assert!(map.is_empty());
    }

    #[test]
    fn remove_value_on_missing_entries_is_a_no_op() {
        let mut map: Multimap<&str, i32> = Multimap::new();
        map.remove_value(&"k", &1);
        map.add("k", 1);
        map.remove_value(&"k", &2);
        assert_eq!(map.get(&"k"), &[1]);
    }

    #[test]
    fn remove_key_takes_the_whole_list() {
        let mut map = Multimap::new();
        map.add("k", 1);
        map.add("k", 2);
        assert_eq!(map.remove_key(&"k"), Some(vec![1, 2]));
        assert!(map.is_empty());
    }
}
