use crate::{MemoryStore, RecordStore, StoreError, TimeSource};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Clone, Default)]
struct StepClock {
    millis: Arc<AtomicU64>,
}

impl StepClock {
    fn at_secs(secs: u64) -> Self {
        let clock = Self::default();
        clock.set_secs(secs);
        clock
    }

    fn set_secs(&self, secs: u64) {
        self.millis.store(secs * 1000, Ordering::Relaxed);
    }
}

impl TimeSource<u64> for StepClock {
    fn current_millis(&self) -> u64 {
        self.millis.load(Ordering::Relaxed)
    }
}

#[tokio::test]
async fn create_if_absent_only_succeeds_once() {
    let store = MemoryStore::new();
    assert!(store.create_field_if_absent("k", "url", "a").await.unwrap());
    assert!(!store.create_field_if_absent("k", "url", "b").await.unwrap());
    assert_eq!(store.get_field("k", "url").await.unwrap().as_deref(), Some("a"));
}

#[tokio::test]
async fn create_if_absent_is_per_field() {
    let store = MemoryStore::new();
    assert!(store.create_field_if_absent("k", "url", "a").await.unwrap());
    assert!(store.create_field_if_absent("k", "other", "b").await.unwrap());
    assert_eq!(store.get_all_fields("k").await.unwrap().len(), 2);
}

#[tokio::test]
async fn set_fields_overwrites_and_extends() {
    let store = MemoryStore::new();
    store.create_field_if_absent("k", "url", "a").await.unwrap();
    store
        .set_fields("k", &[("count", "0".to_owned()), ("url", "b".to_owned())])
        .await
        .unwrap();
    let fields = store.get_all_fields("k").await.unwrap();
    assert_eq!(fields["url"], "b");
    assert_eq!(fields["count"], "0");
}

#[tokio::test]
async fn missing_records_read_as_empty() {
    let store = MemoryStore::new();
    assert!(!store.exists("nope").await.unwrap());
    assert_eq!(store.get_field("nope", "url").await.unwrap(), None);
    assert!(store.get_all_fields("nope").await.unwrap().is_empty());
    assert!(store.is_empty());
}

#[tokio::test]
async fn increment_counts_from_zero() {
    let store = MemoryStore::new();
    store.create_field_if_absent("k", "url", "a").await.unwrap();
    assert_eq!(store.increment_field("k", "count", 1).await.unwrap(), Some(1));
    assert_eq!(store.increment_field("k", "count", 1).await.unwrap(), Some(2));
    assert_eq!(store.increment_field("k", "count", 5).await.unwrap(), Some(7));
    assert_eq!(
        store.get_field("k", "count").await.unwrap().as_deref(),
        Some("7")
    );
}

#[tokio::test]
async fn increment_on_missing_record_writes_nothing() {
    let store = MemoryStore::new();
    assert_eq!(store.increment_field("k", "count", 1).await.unwrap(), None);
    assert!(!store.exists("k").await.unwrap());
    assert!(store.is_empty());
}

#[tokio::test]
async fn increment_after_expiry_does_not_resurrect_record() {
    let clock = StepClock::at_secs(1_000);
    let store = MemoryStore::with_clock(clock.clone());
    store.create_field_if_absent("k", "url", "a").await.unwrap();
    store.expire_at("k", 1_010).await.unwrap();

    clock.set_secs(1_010);
    assert_eq!(store.increment_field("k", "count", 1).await.unwrap(), None);
    assert!(!store.exists("k").await.unwrap());
    assert_eq!(store.expiry_of("k"), None);
    assert!(store.is_empty());
}

#[tokio::test]
async fn increment_rejects_non_integers() {
    let store = MemoryStore::new();
    store.create_field_if_absent("k", "url", "x").await.unwrap();
    let err = store.increment_field("k", "url", 1).await.unwrap_err();
    assert_eq!(
        err,
        StoreError::NotAnInteger {
            key: "k".to_owned(),
            field: "url".to_owned()
        }
    );
}

#[tokio::test]
async fn increment_reports_overflow() {
    let store = MemoryStore::new();
    store
        .set_fields("k", &[("count", i64::MAX.to_string())])
        .await
        .unwrap();
    assert!(matches!(
        store.increment_field("k", "count", 1).await,
        Err(StoreError::Overflow { .. })
    ));
}

#[tokio::test]
async fn records_expire_at_deadline() {
    let clock = StepClock::at_secs(1_000);
    let store = MemoryStore::with_clock(clock.clone());
    store.create_field_if_absent("k", "url", "a").await.unwrap();
    store.expire_at("k", 1_010).await.unwrap();
    assert_eq!(store.expiry_of("k"), Some(1_010));

    clock.set_secs(1_009);
    assert!(store.exists("k").await.unwrap());

    clock.set_secs(1_010);
    assert!(!store.exists("k").await.unwrap());
    assert_eq!(store.get_field("k", "url").await.unwrap(), None);
}

#[tokio::test]
async fn expired_token_can_be_claimed_again() {
    let clock = StepClock::at_secs(100);
    let store = MemoryStore::with_clock(clock.clone());
    store.create_field_if_absent("k", "url", "a").await.unwrap();
    store.expire_at("k", 200).await.unwrap();

    clock.set_secs(200);
    assert!(store.create_field_if_absent("k", "url", "b").await.unwrap());
    assert_eq!(store.get_field("k", "url").await.unwrap().as_deref(), Some("b"));
    assert_eq!(store.expiry_of("k"), None);
}

#[tokio::test]
async fn expire_in_the_past_deletes_immediately() {
    let store = MemoryStore::with_clock(StepClock::at_secs(500));
    store.create_field_if_absent("k", "url", "a").await.unwrap();
    store.expire_at("k", 10).await.unwrap();
    assert!(!store.exists("k").await.unwrap());
}

#[tokio::test]
async fn expire_on_missing_key_is_a_no_op() {
    let store = MemoryStore::new();
    store.expire_at("nope", u64::MAX).await.unwrap();
    assert!(!store.exists("nope").await.unwrap());
}

#[tokio::test]
async fn purge_expired_sweeps_all_keys() {
    let clock = StepClock::at_secs(0);
    let store = MemoryStore::with_clock(clock.clone());
    for key in ["a", "b", "c"] {
        store.create_field_if_absent(key, "url", key).await.unwrap();
    }
    store.expire_at("a", 5).await.unwrap();
    store.expire_at("b", 5).await.unwrap();
    store.expire_at("c", 50).await.unwrap();

    clock.set_secs(10);
    assert_eq!(store.len(), 1);
    assert_eq!(store.purge_expired(), 2);
    assert_eq!(store.len(), 1);
    assert!(store.exists("c").await.unwrap());
}

#[tokio::test]
async fn clones_share_records() {
    let store = MemoryStore::new();
    let other = store.clone();
    assert!(store.create_field_if_absent("k", "url", "a").await.unwrap());
    assert!(!other.create_field_if_absent("k", "url", "b").await.unwrap());
    assert_eq!(other.len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_creates_have_one_winner() {
    const CONTENDERS: usize = 64;
    let store = Arc::new(MemoryStore::new());

    let handles: Vec<_> = (0..CONTENDERS)
        .map(|i| {
            let store = Arc::clone(&store);
            tokio::spawn(async move {
                store
                    .create_field_if_absent("hot", "url", &i.to_string())
                    .await
                    .unwrap()
            })
        })
        .collect();

    let mut winners = 0;
    for handle in handles {
        if handle.await.unwrap() {
            winners += 1;
        }
    }
    assert_eq!(winners, 1);
}
