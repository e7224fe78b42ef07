//! Insertion-ordered set of unique values
//!
//! Provides [`OrderedSet`], the collection behind every selection in the
//! dashboard state. Operations return new sets and never mutate in place, so
//! a previous selection can be kept around for diffing.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::Hash;

/// Immutable, insertion-ordered set
///
/// Equality is order-sensitive: two sets with the same members in a
/// different order are different selections. Use [`OrderedSet::same_members`]
/// for plain set equality.
#[derive(Clone, Serialize, Deserialize)]
#[serde(
    transparent,
    bound(
        serialize = "T: Serialize",
        deserialize = "T: Deserialize<'de> + Eq + Hash"
    )
)]
pub struct OrderedSet<T>(IndexSet<T>);

impl<T> OrderedSet<T> {
    /// Create empty set
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(IndexSet::new())
    }

    /// Number of members
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the set has no members
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// First member in insertion order
    #[inline]
    #[must_use]
    pub fn first(&self) -> Option<&T> {
        self.0.first()
    }

    /// Iterate in insertion order
    #[inline]
    pub fn iter(&self) -> indexmap::set::Iter<'_, T> {
        self.0.iter()
    }
}

impl<T: Eq + Hash + Clone> OrderedSet<T> {
    /// Check membership
    #[inline]
    #[must_use]
    pub fn has<Q>(&self, value: &Q) -> bool
    where
        T: std::borrow::Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.0.contains(value)
    }

    /// New set with `value` appended (no-op if already present)
    #[must_use]
    pub fn add(&self, value: T) -> Self {
        let mut next = self.0.clone();
        next.insert(value);
        Self(next)
    }

    /// New set without `value`, keeping the order of the others
    #[must_use]
    pub fn delete<Q>(&self, value: &Q) -> Self
    where
        T: std::borrow::Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let mut next = self.0.clone();
        next.shift_remove(value);
        Self(next)
    }

    /// Members of `self` followed by members of `other` not yet present
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        let mut next = self.0.clone();
        next.extend(other.0.iter().cloned());
        Self(next)
    }

    /// Members of `self` that are not in `other`
    #[must_use]
    pub fn subtract(&self, other: &Self) -> Self {
        self.0
            .iter()
            .filter(|value| !other.0.contains(*value))
            .cloned()
            .collect()
    }

    /// Members of `self` that are also in `other`, in `self` order
    #[must_use]
    pub fn intersect(&self, other: &Self) -> Self {
        self.0
            .iter()
            .filter(|value| other.0.contains(*value))
            .cloned()
            .collect()
    }

    /// Set equality ignoring order
    #[must_use]
    pub fn same_members(&self, other: &Self) -> bool {
        self.len() == other.len() && self.0.iter().all(|value| other.0.contains(value))
    }

    /// Check if every member is also in `other`
    #[must_use]
    pub fn is_subset(&self, other: &Self) -> bool {
        self.0.is_subset(&other.0)
    }

    /// Members as an owned vector, in order
    #[must_use]
    pub fn to_vec(&self) -> Vec<T> {
        self.0.iter().cloned().collect()
    }
}

impl<T> Default for OrderedSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: PartialEq> PartialEq for OrderedSet<T> {
    fn eq(&self, other: &Self) -> bool {
        self.0.len() == other.0.len() && self.0.iter().eq(other.0.iter())
    }
}

impl<T: Eq> Eq for OrderedSet<T> {}

impl<T: fmt::Debug> fmt::Debug for OrderedSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.0.iter()).finish()
    }
}

impl<T: Eq + Hash> FromIterator<T> for OrderedSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<T> IntoIterator for OrderedSet<T> {
    type Item = T;
    type IntoIter = indexmap::set::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a OrderedSet<T> {
    type Item = &'a T;
    type IntoIter = indexmap::set::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<T: Eq + Hash, const N: usize> From<[T; N]> for OrderedSet<T> {
    fn from(values: [T; N]) -> Self {
        values.into_iter().collect()
    }
}

impl<T: Eq + Hash> From<Vec<T>> for OrderedSet<T> {
    fn from(values: Vec<T>) -> Self {
        values.into_iter().collect()
    }
}

impl From<&[&str]> for OrderedSet<String> {
    fn from(values: &[&str]) -> Self {
        values.iter().map(|value| (*value).to_string()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(values: &[&str]) -> OrderedSet<String> {
        OrderedSet::from(values)
    }

    #[test]
    fn construction_drops_duplicates_and_keeps_first_position() {
        let values = set(&["b", "a", "b", "c"]);
        assert_eq!(values.to_vec(), vec!["b", "a", "c"]);
        assert_eq!(values.first().map(String::as_str), Some("b"));
    }

    #[test]
    fn add_is_noop_for_existing_member() {
        let values = set(&["a", "b"]);
        assert_eq!(values.add("a".to_string()), values);
        assert_eq!(values.add("c".to_string()).to_vec(), vec!["a", "b", "c"]);
    }

    #[test]
    fn delete_keeps_remaining_order() {
        let values = set(&["a", "b", "c"]);
        assert_eq!(values.delete("b").to_vec(), vec!["a", "c"]);
        // Original untouched
        assert_eq!(values.len(), 3);
    }

    #[test]
    fn union_appends_new_members() {
        let left = set(&["c", "a"]);
        let right = set(&["a", "b"]);
        assert_eq!(left.union(&right).to_vec(), vec!["c", "a", "b"]);
    }

    #[test]
    fn subtract_and_intersect_keep_left_order() {
        let left = set(&["d", "a", "c", "b"]);
        let right = set(&["b", "c"]);
        assert_eq!(left.subtract(&right).to_vec(), vec!["d", "a"]);
        assert_eq!(left.intersect(&right).to_vec(), vec!["c", "b"]);
    }

    #[test]
    fn equality_is_order_sensitive() {
        let left = set(&["a", "b"]);
        let right = set(&["b", "a"]);
        assert_ne!(left, right);
        assert!(left.same_members(&right));
    }

    #[test]
    fn serializes_as_sequence() {
        let values = set(&["x", "y"]);
        let json = serde_json::to_string(&values).unwrap();
        assert_eq!(json, r#"["x","y"]"#);

        let back: OrderedSet<String> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, values);
    }

    #[test]
    fn empty_set() {
        let values: OrderedSet<String> = OrderedSet::default();
        assert!(values.is_empty());
        assert!(values.first().is_none());
    }
}
