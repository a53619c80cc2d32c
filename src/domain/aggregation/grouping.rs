//! Insertion-ordered grouping
//!
//! Groups are emitted in the order their key was first seen, never in hash
//! iteration order, so identical input always serializes identically.

use std::collections::HashMap;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

#[derive(Debug)]
pub struct OrderedGroups<K, V> {
    index: HashMap<K, usize>,
    groups: Vec<V>,
}

impl<K, V> Default for OrderedGroups<K, V> {
    fn default() -> Self {
        Self {
            index: HashMap::new(),
            groups: Vec::new(),
        }
    }
}

impl<K: Eq + Hash, V> OrderedGroups<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the group for `key`, creating it at the end if unseen
    pub fn get_or_insert_with(&mut self, key: K, make: impl FnOnce() -> V) -> &mut V {
        let position = match self.index.get(&key) {
            Some(position) => *position,
            None => {
                self.groups.push(make());
                let position = self.groups.len() - 1;
                self.index.insert(key, position);
                position
            }
        };

        &mut self.groups[position]
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let position = *self.index.get(key)?;
        self.groups.get_mut(position)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn into_values(self) -> Vec<V> {
        self.groups
    }
}

/// One platform a game is held on at a given location
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformVersion {
    pub platform_name: String,
    pub platform_id: i64,
}

/// Adds a platform version unless one with the same id is already listed
pub fn push_platform_version(versions: &mut Vec<PlatformVersion>, platform_id: i64, platform_name: &str) {
    if versions.iter().any(|v| v.platform_id == platform_id) {
        return;
    }

    versions.push(PlatformVersion {
        platform_name: platform_name.to_string(),
        platform_id,
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_groups_follow_first_seen_order() {
        let mut groups: OrderedGroups<&str, Vec<i32>> = OrderedGroups::new();

        for (key, value) in [("b", 1), ("a", 2), ("b", 3), ("c", 4), ("a", 5)] {
            groups.get_or_insert_with(key, Vec::new).push(value);
        }

        assert_eq!(groups.len(), 3);
        assert!(groups.contains_key(&"c"));
        assert_eq!(groups.into_values(), vec![vec![1, 3], vec![2, 5], vec![4]]);
    }

    #[test]
    fn test_get_mut_missing() {
        let mut groups: OrderedGroups<i64, ()> = OrderedGroups::new();
        assert!(groups.get_mut(&1).is_none());
        assert!(groups.is_empty());
    }

    #[test]
    fn test_platform_versions_are_deduplicated() {
        let mut versions = Vec::new();
        push_platform_version(&mut versions, 130, "Nintendo Switch");
        push_platform_version(&mut versions, 6, "PC");
        push_platform_version(&mut versions, 130, "Nintendo Switch");

        assert_eq!(versions.len(), 2);
        assert_eq!(versions[0].platform_id, 130);
        assert_eq!(versions[1].platform_name, "PC");
    }
}
