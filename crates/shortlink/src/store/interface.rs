use crate::StoreError;
use core::future::Future;
use std::collections::HashMap;
use std::sync::Arc;

/// The shared key-value store holding ShortLink records.
///
/// Records are hashes of string fields keyed by token. The allocator only
/// relies on [`Self::create_field_if_absent`] for uniqueness; it must be a
/// single atomic create-if-absent across every process sharing the store.
/// Every other operation is plain I/O.
///
/// Methods return `Send` futures so an allocation can run on any worker of a
/// multi-threaded runtime. Timeouts are applied by the caller; an adapter may
/// also report [`StoreError::Timeout`] itself.
pub trait RecordStore: Send + Sync {
    /// Atomically sets `field` of `key` to `value` only if that field does not
    /// exist yet.
    ///
    /// Returns `Ok(true)` when this call created the field and `Ok(false)`
    /// when it already existed. Concurrent callers racing on the same
    /// `(key, field)` observe exactly one `true`.
    fn create_field_if_absent(
        &self,
        key: &str,
        field: &str,
        value: &str,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// Sets several fields of `key`, overwriting existing values.
    fn set_fields(
        &self,
        key: &str,
        fields: &[(&str, String)],
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Schedules deletion of `key` at `unix_secs`.
    fn expire_at(
        &self,
        key: &str,
        unix_secs: u64,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Returns whether a record exists under `key`.
    fn exists(&self, key: &str) -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// Atomically adds `delta` to the integer stored in `field` of an
    /// existing record and returns the new value. A missing field counts as
    /// zero.
    ///
    /// Returns `Ok(None)` without writing anything when no record exists
    /// under `key`, so a counter bump racing an expiry cannot resurrect the
    /// record without its expiry. A Redis adapter needs a script
    /// (`EXISTS` + `HINCRBY`) rather than a bare `HINCRBY` for this.
    fn increment_field(
        &self,
        key: &str,
        field: &str,
        delta: i64,
    ) -> impl Future<Output = Result<Option<i64>, StoreError>> + Send;

    /// Reads one field; `None` when the record or the field is absent.
    fn get_field(
        &self,
        key: &str,
        field: &str,
    ) -> impl Future<Output = Result<Option<String>, StoreError>> + Send;

    /// Reads every field of `key`; empty when the record is absent.
    fn get_all_fields(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<HashMap<String, String>, StoreError>> + Send;
}

impl<S: RecordStore> RecordStore for Arc<S> {
    fn create_field_if_absent(
        &self,
        key: &str,
        field: &str,
        value: &str,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send {
        (**self).create_field_if_absent(key, field, value)
    }

    fn set_fields(
        &self,
        key: &str,
        fields: &[(&str, String)],
    ) -> impl Future<Output = Result<(), StoreError>> + Send {
        (**self).set_fields(key, fields)
    }

    fn expire_at(
        &self,
        key: &str,
        unix_secs: u64,
    ) -> impl Future<Output = Result<(), StoreError>> + Send {
        (**self).expire_at(key, unix_secs)
    }

    fn exists(&self, key: &str) -> impl Future<Output = Result<bool, StoreError>> + Send {
        (**self).exists(key)
    }

    fn increment_field(
        &self,
        key: &str,
        field: &str,
        delta: i64,
    ) -> impl Future<Output = Result<Option<i64>, StoreError>> + Send {
        (**self).increment_field(key, field, delta)
    }

    fn get_field(
        &self,
        key: &str,
        field: &str,
    ) -> impl Future<Output = Result<Option<String>, StoreError>> + Send {
        (**self).get_field(key, field)
    }

    fn get_all_fields(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<HashMap<String, String>, StoreError>> + Send {
        (**self).get_all_fields(key)
    }
}
