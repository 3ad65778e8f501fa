use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// Items collected during one run, unique by key.
#[derive(Debug)]
pub struct CollectionDict<T> {
    entries: HashMap<String, T>,
}

impl<T> CollectionDict<T> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Inserts `item`, or folds it into the existing entry. Returns `true` for a new key.
    pub fn upsert(&mut self, key: String, item: T, merge: impl FnOnce(&mut T, T)) -> bool {
        match self.entries.entry(key) {
            Entry::Occupied(mut entry) => {
                merge(entry.get_mut(), item);
                false
            }
            Entry::Vacant(entry) => {
                entry.insert(item);
                true
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_values(self) -> Vec<T> {
        self.entries.into_values().collect()
    }
}

impl<T> Default for CollectionDict<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn replace(held: &mut u32, new: u32) {
        *held = new;
    }

    #[test]
    fn test_same_key_is_counted_once() {
        let mut dict = CollectionDict::new();
        assert!(dict.upsert("punks".to_string(), 1, replace));
        assert!(!dict.upsert("punks".to_string(), 2, replace));
        assert!(dict.upsert("apes".to_string(), 3, replace));

        assert_eq!(dict.len(), 2);
        assert!(!dict.is_empty());
        let mut values = dict.into_values();
        values.sort();
        assert_eq!(values, vec![2, 3]);
    }

    #[test]
    fn test_upsert_uses_merge() {
        let mut dict = CollectionDict::new();
        dict.upsert("a".to_string(), 5, replace);
        dict.upsert("a".to_string(), 1, |held, new| *held = (*held).max(new));
        assert_eq!(dict.into_values(), vec![5]);
    }
}
