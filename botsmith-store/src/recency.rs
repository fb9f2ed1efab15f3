//! Ordered map with explicit recency semantics.
//!
//! [`RecencyMap`] keeps entries in touch order: the least-recently-touched
//! entry is first, the most-recently-touched last. Insertion and
//! [`touch`](RecencyMap::touch) both move an entry to the end;
//! [`pop_oldest`](RecencyMap::pop_oldest) removes from the front. This
//! makes session eviction order a named property instead of an incidental
//! container behavior.
//!
//! Lookups are O(n); the map holds at most the per-bot session cap.
//!
//! Serialization emits a JSON object whose keys appear in recency order
//! (oldest first), and deserialization restores that order, so a snapshot
//! round-trip preserves eviction order.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::marker::PhantomData;

/// Insertion-ordered map with move-to-end-on-touch semantics.
#[derive(Debug, Clone, PartialEq)]
pub struct RecencyMap<K, V> {
    entries: Vec<(K, V)>,
}

impl<K, V> Default for RecencyMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> RecencyMap<K, V> {
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<K: Eq, V> RecencyMap<K, V> {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.position(key).is_some()
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.position(key).map(|idx| &self.entries[idx].1)
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        self.position(key).map(|idx| &mut self.entries[idx].1)
    }

    /// Insert or replace a value, marking the key most-recently-touched.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let previous = self.remove(&key);
        self.entries.push((key, value));
        previous
    }

    /// Mark a key most-recently-touched. Returns false for absent keys.
    pub fn touch(&mut self, key: &K) -> bool {
        match self.position(key) {
            Some(idx) => {
                let entry = self.entries.remove(idx);
                self.entries.push(entry);
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.position(key).map(|idx| self.entries.remove(idx).1)
    }

    /// Remove and return the least-recently-touched entry.
    pub fn pop_oldest(&mut self) -> Option<(K, V)> {
        if self.entries.is_empty() {
            None
        } else {
            Some(self.entries.remove(0))
        }
    }

    /// Entries from least- to most-recently-touched.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    /// Keys from least- to most-recently-touched.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.iter().map(|(k, _)| k)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn position(&self, key: &K) -> Option<usize> {
        self.entries.iter().position(|(k, _)| k == key)
    }
}

impl<K: Serialize, V: Serialize> Serialize for RecencyMap<K, V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de, K, V> Deserialize<'de> for RecencyMap<K, V>
where
    K: Deserialize<'de> + Eq,
    V: Deserialize<'de>,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct MapVisitor<K, V>(PhantomData<(K, V)>);

        impl<'de, K, V> Visitor<'de> for MapVisitor<K, V>
        where
            K: Deserialize<'de> + Eq,
            V: Deserialize<'de>,
        {
            type Value = RecencyMap<K, V>;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a map in recency order")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut map = RecencyMap::new();
                while let Some((key, value)) = access.next_entry()? {
                    map.insert(key, value);
                }
                Ok(map)
            }
        }

        deserializer.deserialize_map(MapVisitor(PhantomData))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(map: &RecencyMap<String, u32>) -> Vec<&str> {
        map.keys().map(String::as_str).collect()
    }

    #[test]
    fn insert_appends_in_order() {
        let mut map = RecencyMap::new();
        map.insert("a".to_string(), 1);
        map.insert("b".to_string(), 2);
        map.insert("c".to_string(), 3);
        assert_eq!(keys(&map), vec!["a", "b", "c"]);
        assert_eq!(map.len(), 3);
    }

    #[test]
    fn touch_moves_entry_to_end() {
        let mut map = RecencyMap::new();
        map.insert("a".to_string(), 1);
        map.insert("b".to_string(), 2);
        map.insert("c".to_string(), 3);

        assert!(map.touch(&"a".to_string()));
        assert_eq!(keys(&map), vec!["b", "c", "a"]);
        assert!(!map.touch(&"missing".to_string()));
    }

    #[test]
    fn reinsert_moves_entry_to_end_and_returns_previous() {
        let mut map = RecencyMap::new();
        map.insert("a".to_string(), 1);
        map.insert("b".to_string(), 2);

        let previous = map.insert("a".to_string(), 10);
        assert_eq!(previous, Some(1));
        assert_eq!(keys(&map), vec!["b", "a"]);
        assert_eq!(map.get(&"a".to_string()), Some(&10));
    }

    #[test]
    fn pop_oldest_removes_from_front() {
        let mut map = RecencyMap::new();
        map.insert("a".to_string(), 1);
        map.insert("b".to_string(), 2);
        map.touch(&"a".to_string());

        assert_eq!(map.pop_oldest(), Some(("b".to_string(), 2)));
        assert_eq!(map.pop_oldest(), Some(("a".to_string(), 1)));
        assert_eq!(map.pop_oldest(), None);
    }

    #[test]
    fn serde_roundtrip_preserves_recency_order() {
        let mut map = RecencyMap::new();
        map.insert("first".to_string(), 1);
        map.insert("second".to_string(), 2);
        map.insert("third".to_string(), 3);
        map.touch(&"first".to_string());

        let json = serde_json::to_string(&map).unwrap();
        // Keys must appear oldest-first in the document.
        let second = json.find("second").unwrap();
        let third = json.find("third").unwrap();
        let first = json.find("first").unwrap();
        assert!(second < third && third < first);

        let back: RecencyMap<String, u32> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, map);
        assert_eq!(
            back.keys().collect::<Vec<_>>(),
            vec!["second", "third", "first"]
        );
    }
}
