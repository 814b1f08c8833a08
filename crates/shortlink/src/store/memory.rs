use crate::{RecordStore, StoreError, SystemClock, TimeSource};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Default)]
struct Record {
    fields: HashMap<String, String>,
    expires_at: Option<u64>,
}

impl Record {
    fn is_expired(&self, now_secs: u64) -> bool {
        self.expires_at.is_some_and(|at| now_secs >= at)
    }
}

/// In-process implementation of [`RecordStore`].
///
/// Records are hashes of string fields guarded by a single mutex, so every
/// operation (including [`RecordStore::create_field_if_absent`]) is atomic
/// with respect to every other clone of the same store. Cloning is cheap and
/// shares the underlying records.
///
/// Expiry is evaluated lazily against the injected [`TimeSource`]: an expired
/// record is dropped the next time its key is touched, or by
/// [`Self::purge_expired`].
///
/// # Example
/// ```
/// use shortlink::{MemoryStore, RecordStore};
///
/// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
/// let store = MemoryStore::new();
/// assert!(store.create_field_if_absent("abc123", "url", "https://a.example").await.unwrap());
/// assert!(!store.create_field_if_absent("abc123", "url", "https://b.example").await.unwrap());
/// assert_eq!(
///     store.get_field("abc123", "url").await.unwrap().as_deref(),
///     Some("https://a.example")
/// );
/// # });
/// ```
#[derive(Clone, Debug)]
pub struct MemoryStore<T = SystemClock> {
    records: Arc<Mutex<HashMap<String, Record>>>,
    clock: T,
}

impl MemoryStore {
    /// Creates an empty store expiring records against the system clock.
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> MemoryStore<T>
where
    T: TimeSource<u64>,
{
    /// Creates an empty store expiring records against `clock`.
    pub fn with_clock(clock: T) -> Self {
        Self {
            records: Arc::new(Mutex::new(HashMap::new())),
            clock,
        }
    }

    /// Number of live (non-expired) records.
    pub fn len(&self) -> usize {
        let now = self.now_secs();
        self.records
            .lock()
            .values()
            .filter(|record| !record.is_expired(now))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every expired record and returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = self.now_secs();
        let mut records = self.records.lock();
        let before = records.len();
        records.retain(|_, record| !record.is_expired(now));
        before - records.len()
    }

    /// Expiry timestamp of `key`, if one is scheduled and the record is live.
    pub fn expiry_of(&self, key: &str) -> Option<u64> {
        let now = self.now_secs();
        let mut records = self.records.lock();
        evict_expired(&mut records, key, now);
        records.get(key).and_then(|record| record.expires_at)
    }

    fn now_secs(&self) -> u64 {
        self.clock.current_millis() / 1000
    }
}

fn evict_expired(records: &mut HashMap<String, Record>, key: &str, now_secs: u64) {
    if records.get(key).is_some_and(|record| record.is_expired(now_secs)) {
        records.remove(key);
    }
}

impl<T> RecordStore for MemoryStore<T>
where
    T: TimeSource<u64> + Send + Sync,
{
    async fn create_field_if_absent(
        &self,
        key: &str,
        field: &str,
        value: &str,
    ) -> Result<bool, StoreError> {
        let now = self.now_secs();
        let mut records = self.records.lock();
        evict_expired(&mut records, key, now);
        let record = records.entry(key.to_owned()).or_default();
        if record.fields.contains_key(field) {
            return Ok(false);
        }
        record.fields.insert(field.to_owned(), value.to_owned());
        Ok(true)
    }

    async fn set_fields(&self, key: &str, fields: &[(&str, String)]) -> Result<(), StoreError> {
        let now = self.now_secs();
        let mut records = self.records.lock();
        evict_expired(&mut records, key, now);
        let record = records.entry(key.to_owned()).or_default();
        for (field, value) in fields {
            record.fields.insert((*field).to_owned(), value.clone());
        }
        Ok(())
    }

    async fn expire_at(&self, key: &str, unix_secs: u64) -> Result<(), StoreError> {
        let now = self.now_secs();
        let mut records = self.records.lock();
        evict_expired(&mut records, key, now);
        if let Some(record) = records.get_mut(key) {
            record.expires_at = Some(unix_secs);
        }
        evict_expired(&mut records, key, now);
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool, StoreError> {
        let now = self.now_secs();
        let mut records = self.records.lock();
        evict_expired(&mut records, key, now);
        Ok(records.contains_key(key))
    }

    async fn increment_field(
        &self,
        key: &str,
        field: &str,
        delta: i64,
    ) -> Result<Option<i64>, StoreError> {
        let now = self.now_secs();
        let mut records = self.records.lock();
        evict_expired(&mut records, key, now);
        let Some(record) = records.get_mut(key) else {
            return Ok(None);
        };
        let current = match record.fields.get(field) {
            Some(value) => value.parse::<i64>().map_err(|_| StoreError::NotAnInteger {
                key: key.to_owned(),
                field: field.to_owned(),
            })?,
            None => 0,
        };
        let next = current
            .checked_add(delta)
            .ok_or_else(|| StoreError::Overflow {
                key: key.to_owned(),
                field: field.to_owned(),
            })?;
        record.fields.insert(field.to_owned(), next.to_string());
        Ok(Some(next))
    }

    async fn get_field(&self, key: &str, field: &str) -> Result<Option<String>, StoreError> {
        let now = self.now_secs();
        let mut records = self.records.lock();
        evict_expired(&mut records, key, now);
        Ok(records
            .get(key)
            .and_then(|record| record.fields.get(field))
            .cloned())
    }

    async fn get_all_fields(&self, key: &str) -> Result<HashMap<String, String>, StoreError> {
        let now = self.now_secs();
        let mut records = self.records.lock();
        evict_expired(&mut records, key, now);
        Ok(records
            .get(key)
            .map(|record| record.fields.clone())
            .unwrap_or_default())
    }
}
