//! Ordered containers keyed by structural equality.
//!
//! Grid entities (points, edges, placements) are plain value types, so the
//! containers here compare keys by value rather than identity. Iteration
//! order is the key order, which keeps variable declaration deterministic
//! across runs.

use core::ops::Index;
use std::collections::{BTreeMap, BTreeSet};

/// An ordered map with value-equality keys.
///
/// Indexing with a missing key panics. Rule code treats a missing entry as a
/// programming error, so the panic surfaces it at the point of use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueMap<K: Ord, V>(BTreeMap<K, V>);

// Not derived: the derive would bound both K and V by Default.
impl<K: Ord, V> Default for ValueMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord, V> ValueMap<K, V> {
    #[must_use]
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Builds a map over `keys`, deriving each value from its key.
    pub fn from_keys<I, F>(keys: I, mut f: F) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Clone,
        F: FnMut(&K) -> V,
    {
        Self(
            keys.into_iter()
                .map(|k| {
                    let v = f(&k);
                    (k, v)
                })
                .collect(),
        )
    }

    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.0.insert(key, value)
    }

    #[must_use]
    pub fn get(&self, key: &K) -> Option<&V> {
        self.0.get(key)
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        self.0.get_mut(key)
    }

    #[must_use]
    pub fn contains_key(&self, key: &K) -> bool {
        self.0.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.0.keys()
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.0.values()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.0.iter()
    }
}

impl<K: Ord, V> Index<&K> for ValueMap<K, V> {
    type Output = V;

    fn index(&self, key: &K) -> &Self::Output {
        self.0.get(key).expect("key not present in ValueMap")
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for ValueMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<K: Ord, V> IntoIterator for ValueMap<K, V> {
    type Item = (K, V);
    type IntoIter = std::collections::btree_map::IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a, K: Ord, V> IntoIterator for &'a ValueMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = std::collections::btree_map::Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// An ordered set with value-equality elements.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ValueSet<K: Ord>(BTreeSet<K>);

impl<K: Ord> Default for ValueSet<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord> ValueSet<K> {
    #[must_use]
    pub fn new() -> Self {
        Self(BTreeSet::new())
    }

    pub fn insert(&mut self, value: K) -> bool {
        self.0.insert(value)
    }

    #[must_use]
    pub fn contains(&self, value: &K) -> bool {
        self.0.contains(value)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &K> {
        self.0.iter()
    }
}

impl<K: Ord> FromIterator<K> for ValueSet<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<K: Ord> IntoIterator for ValueSet<K> {
    type Item = K;
    type IntoIter = std::collections::btree_set::IntoIter<K>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a, K: Ord> IntoIterator for &'a ValueSet<K> {
    type Item = &'a K;
    type IntoIter = std::collections::btree_set::Iter<'a, K>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Disjoint-set forest over arbitrary ordered values.
///
/// Elements are added lazily on first `find` or `union`.
#[derive(Debug, Clone, Default)]
pub struct UnionFind<T: Ord + Clone> {
    parents: BTreeMap<T, T>,
}

impl<T: Ord + Clone> UnionFind<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            parents: BTreeMap::new(),
        }
    }

    /// Returns the representative of `value`'s set, with path compression.
    pub fn find(&mut self, value: &T) -> T {
        match self.parents.get(value) {
            None => value.clone(),
            Some(parent) => {
                let parent = parent.clone();
                let root = self.find(&parent);
                if root != parent {
                    self.parents.insert(value.clone(), root.clone());
                }
                root
            }
        }
    }

    pub fn union(&mut self, a: &T, b: &T) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra != rb {
            self.parents.insert(ra, rb);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_map_index() {
        let map: ValueMap<i32, i32> = [(1, 10), (2, 20)].into_iter().collect();
        assert_eq!(map[&1], 10);
        assert_eq!(map.get(&3), None);
    }

    #[test]
    #[should_panic(expected = "key not present")]
    fn test_value_map_index_missing() {
        let map: ValueMap<i32, i32> = ValueMap::new();
        let _ = map[&1];
    }

    #[test]
    fn test_value_map_iteration_order() {
        let map = ValueMap::from_keys([3, 1, 2], |k| *k * 10);
        let keys: Vec<_> = map.keys().copied().collect();
        assert_eq!(keys, vec![1, 2, 3]);
    }

    #[test]
    fn test_default_needs_no_default_values() {
        struct Opaque;
        let map: ValueMap<i32, Opaque> = ValueMap::default();
        assert!(map.is_empty());
        let set: ValueSet<(i32, i32)> = ValueSet::default();
        assert!(set.is_empty());
    }

    #[test]
    fn test_value_set() {
        let mut set = ValueSet::new();
        assert!(set.insert((1, 2)));
        assert!(!set.insert((1, 2)));
        assert!(set.contains(&(1, 2)));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_union_find_groups() {
        let mut uf = UnionFind::new();
        uf.union(&1, &2);
        uf.union(&3, &4);
        uf.union(&2, &3);
        assert_eq!(uf.find(&1), uf.find(&4));
        assert_ne!(uf.find(&1), uf.find(&5));
    }
}
