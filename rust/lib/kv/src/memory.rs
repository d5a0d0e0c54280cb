use std::collections::BTreeMap;

use parking_lot::RwLock;

use crate::error::KVError;
use crate::traits::KVStore;

/// In-process KVStore. Nothing is persisted; dropping the store drops the data.
///
/// BTreeMap keeps `scan` ordered without an extra sort.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl KVStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, KVError> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), KVError> {
        self.entries.write().insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), KVError> {
        self.entries.write().remove(key);
        Ok(())
    }

    fn batch_set(&self, entries: &[(&str, &[u8])]) -> Result<(), KVError> {
        let mut map = self.entries.write();
        for (key, value) in entries {
            map.insert(key.to_string(), value.to_vec());
        }
        Ok(())
    }

    fn batch_delete(&self, keys: &[&str]) -> Result<(), KVError> {
        let mut map = self.entries.write();
        for key in keys {
            map.remove(*key);
        }
        Ok(())
    }

    fn scan(&self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>, KVError> {
        let map = self.entries.read();
        Ok(map
            .range(prefix.to_string()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_and_len() {
        let store = MemoryStore::new();
        assert!(store.is_empty());

        store.set("current_user", br#"{"id":1}"#).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(
            store.get("current_user").unwrap().as_deref(),
            Some(br#"{"id":1}"#.as_slice())
        );
    }

    #[test]
    fn scan_stops_at_prefix_boundary() {
        let store = MemoryStore::new();
        store.set("a:1", b"x").unwrap();
        store.set("a:2", b"y").unwrap();
        store.set("ab", b"z").unwrap();
        store.set("b:1", b"w").unwrap();

        let got = store.scan("a:").unwrap();
        assert_eq!(got.len(), 2);
        assert_eq!(got[0].0, "a:1");
        assert_eq!(got[1].0, "a:2");
    }

    #[test]
    fn batch_delete_ignores_missing() {
        let store = MemoryStore::new();
        store.set("k1", b"v").unwrap();
        store.batch_delete(&["k1", "k2"]).unwrap();
        assert!(store.is_empty());
    }
}
