use std::sync::Arc;

use crate::error::KVError;
use crate::traits::KVStore;

/// ScopedKV wraps another store and confines every key to `{len}:{scope}:`.
///
/// Reads, writes and scans only ever see keys inside the scope, and keys
/// come back from `scan` with the scope prefix stripped. Scopes may contain
/// `:` (origins do), so the byte length goes first: no scope's prefix is a
/// prefix of another's, and two scopes over the same backing store never
/// observe each other's entries.
pub struct ScopedKV {
    inner: Arc<dyn KVStore>,
    prefix: String,
}

impl ScopedKV {
    pub fn new(inner: Arc<dyn KVStore>, scope: &str) -> Self {
        Self {
            inner,
            prefix: format!("{}:{}:", scope.len(), scope),
        }
    }

    fn key(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }
}

impl KVStore for ScopedKV {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, KVError> {
        self.inner.get(&self.key(key))
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), KVError> {
        self.inner.set(&self.key(key), value)
    }

    fn delete(&self, key: &str) -> Result<(), KVError> {
        self.inner.delete(&self.key(key))
    }

    fn batch_set(&self, entries: &[(&str, &[u8])]) -> Result<(), KVError> {
        let keys: Vec<String> = entries.iter().map(|(k, _)| self.key(k)).collect();
        let scoped: Vec<(&str, &[u8])> = keys
            .iter()
            .zip(entries)
            .map(|(k, (_, v))| (k.as_str(), *v))
            .collect();
        self.inner.batch_set(&scoped)
    }

    fn batch_delete(&self, keys: &[&str]) -> Result<(), KVError> {
        let owned: Vec<String> = keys.iter().map(|k| self.key(k)).collect();
        let refs: Vec<&str> = owned.iter().map(String::as_str).collect();
        self.inner.batch_delete(&refs)
    }

    fn scan(&self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>, KVError> {
        let entries = self.inner.scan(&self.key(prefix))?;
        Ok(entries
            .into_iter()
            .filter_map(|(k, v)| k.strip_prefix(&self.prefix).map(|k| (k.to_string(), v)))
            .collect())
    }
}
