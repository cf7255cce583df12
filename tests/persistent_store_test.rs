use cookiepersist::base::cookieerror::PersistenceError;
use cookiepersist::cookies::record;
use cookiepersist::cookies::{
    CookieMonster, CookieStore, FailureSink, HttpCookie, JsonFilePersister, MemoryPersister,
    Origin, PersistentCookieStore, PersistentStoreConfig, Persister, Snapshot, Verbosity,
};
use std::fs;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Mutex, Weak};
use std::thread;
use std::time::Duration;
use tempfile::tempdir;

#[derive(Default)]
struct RecordingSink {
    persist_failures: AtomicUsize,
    restore_failures: AtomicUsize,
}

impl RecordingSink {
    fn persist_failures(&self) -> usize {
        self.persist_failures.load(Ordering::SeqCst)
    }

    fn restore_failures(&self) -> usize {
        self.restore_failures.load(Ordering::SeqCst)
    }
}

impl FailureSink for RecordingSink {
    fn on_persist_failure(&self, _error: &PersistenceError) {
        self.persist_failures.fetch_add(1, Ordering::SeqCst);
    }

    fn on_restore_failure(&self, _error: &PersistenceError) {
        self.restore_failures.fetch_add(1, Ordering::SeqCst);
    }
}

/// Delegates to a `MemoryPersister` unless told to fail.
#[derive(Default)]
struct FlakyPersister {
    inner: MemoryPersister,
    fail_reads: bool,
    fail_writes: AtomicBool,
}

impl Persister for FlakyPersister {
    fn write(&self, snapshot: &Snapshot) -> Result<(), PersistenceError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(PersistenceError::backend("disk full"));
        }
        self.inner.write(snapshot)
    }

    fn read(&self) -> Result<Option<Snapshot>, PersistenceError> {
        if self.fail_reads {
            return Err(PersistenceError::backend("unreadable"));
        }
        self.inner.read()
    }
}

/// Reads the store back from inside the failure callback.
#[derive(Default)]
struct ReadingSink {
    store: Mutex<Weak<PersistentCookieStore>>,
    seen: AtomicUsize,
}

impl FailureSink for ReadingSink {
    fn on_persist_failure(&self, _error: &PersistenceError) {
        let store = self.store.lock().unwrap().upgrade();
        if let Some(store) = store {
            self.seen.store(store.cookies().len(), Ordering::SeqCst);
        }
    }

    fn on_restore_failure(&self, _error: &PersistenceError) {}
}

fn sid_cookie() -> HttpCookie {
    HttpCookie::new("sid", "abc").unwrap().with_max_age(3600)
}

fn build(persister: Arc<dyn Persister>, sink: Arc<RecordingSink>) -> PersistentCookieStore {
    let config = PersistentStoreConfig::new()
        .with_store(Arc::new(CookieMonster::new()))
        .with_persister(persister)
        .with_failure_sink(sink)
        .with_verbosity(Verbosity::Verbose);
    PersistentCookieStore::with_config(config).unwrap()
}

#[test]
fn test_add_survives_reconstruction() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("cookies.json");
    let origin = Origin::from("http://example.com");

    let store = PersistentCookieStore::open(&path);
    store.add(&origin, sid_cookie());

    let cookies = store.get(&origin);
    assert_eq!(cookies.len(), 1);
    assert_eq!(cookies[0].name, "sid");
    assert_eq!(cookies[0].value, "abc");
    assert_eq!(cookies[0].max_age, 3600);
    drop(store);

    let reopened = PersistentCookieStore::open(&path);
    let cookies = reopened.get(&origin);
    assert_eq!(cookies.len(), 1);
    assert_eq!(cookies[0].name, "sid");
    assert_eq!(cookies[0].value, "abc");
    assert_eq!(cookies[0].max_age, 3600);
}

#[test]
fn test_file_roundtrip_preserves_fields_and_order() {
    let dir = tempdir().unwrap();
    let persister = JsonFilePersister::new(dir.path().join("cookies.json"));

    let mut full = HttpCookie::new("pref", "1")
        .unwrap()
        .with_domain("example.com")
        .with_path("/app")
        .with_secure(true);
    full.comment = Some("preferences".to_string());
    full.port_list = Some("80,8080".to_string());
    full.discard = true;

    let mut snapshot = Snapshot::new();
    snapshot.insert(
        Origin::from("http://example.com"),
        record::encode_all(&[full, sid_cookie(), HttpCookie::new("a", "2").unwrap()]),
    );
    snapshot.insert(
        Origin::from("http://other.com"),
        record::encode_all(&[HttpCookie::new("lang", "en").unwrap()]),
    );

    persister.write(&snapshot).unwrap();
    assert_eq!(persister.read().unwrap(), Some(snapshot));
}

#[test]
fn test_remove_twice_persists_once() {
    let persister = Arc::new(MemoryPersister::new());
    let sink = Arc::new(RecordingSink::default());
    let store = build(persister.clone(), sink);
    let origin = Origin::from("http://example.com");

    store.add(&origin, sid_cookie());
    assert_eq!(persister.write_count(), 1);

    assert!(store.remove(&origin, &sid_cookie()));
    assert_eq!(persister.write_count(), 2);

    assert!(!store.remove(&origin, &sid_cookie()));
    assert_eq!(persister.write_count(), 2);
    assert_eq!(persister.snapshot(), Some(Snapshot::new()));
}

#[test]
fn test_restore_failure_leaves_empty_usable_store() {
    let persister = Arc::new(FlakyPersister {
        fail_reads: true,
        ..Default::default()
    });
    let sink = Arc::new(RecordingSink::default());
    let store = build(persister.clone(), sink.clone());

    assert!(store.cookies().is_empty());
    assert_eq!(sink.restore_failures(), 1);
    assert_eq!(sink.persist_failures(), 0);

    let origin = Origin::from("http://example.com");
    store.add(&origin, sid_cookie());
    assert_eq!(store.get(&origin).len(), 1);
    assert_eq!(persister.inner.write_count(), 1);
}

#[test]
fn test_persist_failure_keeps_cookie_in_memory() {
    let persister = Arc::new(FlakyPersister::default());
    persister.fail_writes.store(true, Ordering::SeqCst);
    let sink = Arc::new(RecordingSink::default());
    let store = build(persister.clone(), sink.clone());
    let origin = Origin::from("http://example.com");

    store.add(&origin, sid_cookie());

    assert_eq!(store.get(&origin).len(), 1);
    assert_eq!(sink.persist_failures(), 1);
    assert_eq!(sink.restore_failures(), 0);
    assert!(persister.inner.snapshot().is_none());
}

#[test]
fn test_failed_persist_is_caught_up_by_next_mutation() {
    let persister = Arc::new(FlakyPersister::default());
    let sink = Arc::new(RecordingSink::default());
    let store = build(persister.clone(), sink.clone());
    let origin = Origin::from("http://example.com");

    persister.fail_writes.store(true, Ordering::SeqCst);
    store.add(&origin, sid_cookie());
    persister.fail_writes.store(false, Ordering::SeqCst);
    store.add(&origin, HttpCookie::new("theme", "dark").unwrap());

    let snapshot = persister.inner.snapshot().unwrap();
    let names: Vec<&str> = snapshot[&origin].iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["sid", "theme"]);
    assert_eq!(sink.persist_failures(), 1);
}

#[test]
fn test_first_run_is_not_a_failure() {
    let dir = tempdir().unwrap();
    let persister = Arc::new(JsonFilePersister::new(dir.path().join("cookies.json")));
    assert!(persister.read().unwrap().is_none());

    let sink = Arc::new(RecordingSink::default());
    let store = build(persister, sink.clone());

    assert!(store.cookies().is_empty());
    assert!(store.origins().is_empty());
    assert_eq!(sink.restore_failures(), 0);
}

#[test]
fn test_corrupt_file_starts_empty_and_is_overwritten() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("cookies.json");
    fs::write(&path, "definitely not a snapshot").unwrap();

    let sink = Arc::new(RecordingSink::default());
    let store = build(Arc::new(JsonFilePersister::new(&path)), sink.clone());
    assert_eq!(sink.restore_failures(), 1);
    assert!(store.cookies().is_empty());

    let origin = Origin::from("http://example.com");
    store.add(&origin, sid_cookie());
    assert_eq!(sink.persist_failures(), 0);

    let reopened = build(Arc::new(JsonFilePersister::new(&path)), sink.clone());
    assert_eq!(reopened.get(&origin).len(), 1);
    assert_eq!(sink.restore_failures(), 1);
}

#[test]
fn test_bad_record_in_snapshot_fails_restore() {
    let origin = Origin::from("http://example.com");
    let mut snapshot = Snapshot::new();
    let mut records = record::encode_all(&[sid_cookie()]);
    records.push(Default::default());
    snapshot.insert(origin.clone(), records);

    let sink = Arc::new(RecordingSink::default());
    let store = build(Arc::new(MemoryPersister::with_snapshot(snapshot)), sink.clone());

    assert_eq!(sink.restore_failures(), 1);
    assert!(store.get(&origin).is_empty());
}

#[test]
fn test_concurrent_adds_all_reach_the_snapshot() {
    let persister = Arc::new(MemoryPersister::new());
    let sink = Arc::new(RecordingSink::default());
    let store = Arc::new(build(persister.clone(), sink.clone()));

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let store = store.clone();
            thread::spawn(move || {
                let origin = Origin::from(format!("http://host{}.example.com", t));
                for i in 0..25 {
                    let cookie = HttpCookie::new(format!("c{}", i), "v").unwrap();
                    store.add(&origin, cookie);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let snapshot = persister.snapshot().unwrap();
    assert_eq!(snapshot.len(), 8);
    assert!(snapshot.values().all(|records| records.len() == 25));
    assert_eq!(persister.write_count(), 200);
    assert_eq!(store.cookies().len(), 200);
    assert_eq!(sink.persist_failures(), 0);
}

#[test]
fn test_persistent_store_wraps_persistent_store() {
    let outer_persister = Arc::new(MemoryPersister::new());
    let inner_persister = Arc::new(MemoryPersister::new());
    let inner = PersistentCookieStore::new(
        Arc::new(CookieMonster::new()),
        inner_persister.clone(),
        Arc::new(RecordingSink::default()),
    );
    let outer = PersistentCookieStore::new(
        Arc::new(inner),
        outer_persister.clone(),
        Arc::new(RecordingSink::default()),
    );
    outer.add(&Origin::from("http://example.com"), sid_cookie());

    assert_eq!(outer_persister.write_count(), 1);
    assert_eq!(inner_persister.write_count(), 1);
}

#[test]
fn test_failure_sink_can_read_the_store() {
    let persister = Arc::new(FlakyPersister::default());
    persister.fail_writes.store(true, Ordering::SeqCst);
    let sink = Arc::new(ReadingSink::default());
    let store = Arc::new(PersistentCookieStore::new(
        Arc::new(CookieMonster::new()),
        persister,
        sink.clone(),
    ));
    *sink.store.lock().unwrap() = Arc::downgrade(&store);

    let (done_tx, done_rx) = mpsc::channel();
    let worker = {
        let store = store.clone();
        thread::spawn(move || {
            store.add(&Origin::from("http://example.com"), sid_cookie());
            store.remove_all();
            done_tx.send(()).unwrap();
        })
    };

    assert!(done_rx.recv_timeout(Duration::from_secs(5)).is_ok());
    worker.join().unwrap();
    // remove_all reported last, after the store was emptied
    assert_eq!(sink.seen.load(Ordering::SeqCst), 0);
    assert!(store.cookies().is_empty());
}

#[test]
fn test_failure_sink_sees_the_added_cookie() {
    let persister = Arc::new(FlakyPersister::default());
    persister.fail_writes.store(true, Ordering::SeqCst);
    let sink = Arc::new(ReadingSink::default());
    let store = Arc::new(PersistentCookieStore::new(
        Arc::new(CookieMonster::new()),
        persister,
        sink.clone(),
    ));
    *sink.store.lock().unwrap() = Arc::downgrade(&store);

    let (done_tx, done_rx) = mpsc::channel();
    let worker = {
        let store = store.clone();
        thread::spawn(move || {
            store.add(&Origin::from("http://example.com"), sid_cookie());
            done_tx.send(()).unwrap();
        })
    };

    assert!(done_rx.recv_timeout(Duration::from_secs(5)).is_ok());
    worker.join().unwrap();
    assert_eq!(sink.seen.load(Ordering::SeqCst), 1);
}

#[test]
fn test_cookie_with_unusual_name_survives_reconstruction() {
    let persister = Arc::new(MemoryPersister::new());
    let origin = Origin::from("http://example.com");

    let store = build(persister.clone(), Arc::new(RecordingSink::default()));
    store.add(&origin, sid_cookie());
    let mut spaced = HttpCookie::new("placeholder", "v").unwrap();
    spaced.name = "my cookie".to_string();
    store.add(&origin, spaced);
    assert_eq!(store.cookies().len(), 2);
    drop(store);

    let sink = Arc::new(RecordingSink::default());
    let reopened = build(persister, sink.clone());
    let names: Vec<String> = reopened.get(&origin).into_iter().map(|c| c.name).collect();
    assert_eq!(names, vec!["sid", "my cookie"]);
    assert_eq!(sink.restore_failures(), 0);
}
