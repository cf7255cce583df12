//! A cookie store that mirrors every mutation to durable storage.
//!
//! [`PersistentCookieStore`] wraps any [`CookieStore`]. Reads are passed
//! through untouched. Every mutation goes to the wrapped store first, then
//! the complete cookie set is exported and handed to a [`Persister`]
//! (always a full overwrite, never a diff). At construction the persisted
//! snapshot is restored into the wrapped store.
//!
//! Persistence never fails a cookie operation: write and read errors are
//! routed to a [`FailureSink`] and the in-memory store stays authoritative.
//!
//! # Concurrency
//! Mutations hold an exclusive lock across the in-memory update and the
//! export-and-persist tail, so concurrent `add` calls cannot interleave
//! their snapshots. Reads share the lock with each other. The failure sink
//! is called after the lock is released, so it may read the store.
//!
//! # Example
//! ```no_run
//! use cookiepersist::cookies::{CookieStore, HttpCookie, Origin, PersistentCookieStore};
//!
//! let store = PersistentCookieStore::open("/path/to/cookies.json");
//! let origin = Origin::from("http://example.com");
//! store.add(&origin, HttpCookie::new("sid", "abc")?.with_max_age(3600));
//!
//! // A later process sees the same cookie.
//! let reopened = PersistentCookieStore::open("/path/to/cookies.json");
//! assert_eq!(reopened.get(&origin).len(), 1);
//! # Ok::<(), cookiepersist::base::cookieerror::RecordError>(())
//! ```

use crate::base::cookieerror::{ConfigurationError, PersistenceError};
use crate::cookies::failure::{FailureSink, NoopFailureSink};
use crate::cookies::httpcookie::HttpCookie;
use crate::cookies::monster::CookieMonster;
use crate::cookies::origin::Origin;
use crate::cookies::persistence::{export_cookies, import_cookies, JsonFilePersister, Persister};
use crate::cookies::store::CookieStore;
use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Log tag used when none is configured.
pub const DEFAULT_LOG_TAG: &str = "PersistentCookieStore";

/// How much the store logs through `tracing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Nothing.
    Silent,
    /// Persist and restore failures, as `warn` events.
    #[default]
    Errors,
    /// Failures plus a `debug` event for every operation.
    Verbose,
}

/// Configuration options for [`PersistentCookieStore`].
#[derive(Clone)]
pub struct PersistentStoreConfig {
    /// The in-memory store to mirror.
    pub store: Option<Arc<dyn CookieStore>>,

    /// Where snapshots are written to and restored from.
    pub persister: Option<Arc<dyn Persister>>,

    /// Receives persist and restore failures.
    pub failure_sink: Option<Arc<dyn FailureSink>>,

    /// Recorded as the `tag` field of every log event.
    pub log_tag: String,

    pub verbosity: Verbosity,
}

impl Default for PersistentStoreConfig {
    fn default() -> Self {
        Self {
            store: None,
            persister: None,
            failure_sink: None,
            log_tag: DEFAULT_LOG_TAG.to_string(),
            verbosity: Verbosity::default(),
        }
    }
}

impl std::fmt::Debug for PersistentStoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistentStoreConfig")
            .field("store", &self.store.is_some())
            .field("persister", &self.persister.is_some())
            .field("failure_sink", &self.failure_sink.is_some())
            .field("log_tag", &self.log_tag)
            .field("verbosity", &self.verbosity)
            .finish()
    }
}

impl PersistentStoreConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_store(mut self, store: Arc<dyn CookieStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_persister(mut self, persister: Arc<dyn Persister>) -> Self {
        self.persister = Some(persister);
        self
    }

    pub fn with_failure_sink(mut self, failure_sink: Arc<dyn FailureSink>) -> Self {
        self.failure_sink = Some(failure_sink);
        self
    }

    pub fn with_log_tag(mut self, log_tag: impl Into<String>) -> Self {
        self.log_tag = log_tag.into();
        self
    }

    pub fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }
}

/// Thread-safe wrapper that persists a [`CookieStore`] after every mutation.
pub struct PersistentCookieStore {
    store: Arc<dyn CookieStore>,
    persister: Arc<dyn Persister>,
    failure_sink: Arc<dyn FailureSink>,
    log_tag: String,
    verbosity: Verbosity,
    // Serializes mutate-then-persist; guards no data of its own.
    lock: RwLock<()>,
}

impl PersistentCookieStore {
    /// Wrap `store` and restore whatever `persister` holds into it.
    pub fn new(
        store: Arc<dyn CookieStore>,
        persister: Arc<dyn Persister>,
        failure_sink: Arc<dyn FailureSink>,
    ) -> Self {
        Self::build(
            store,
            persister,
            failure_sink,
            DEFAULT_LOG_TAG.to_string(),
            Verbosity::default(),
        )
    }

    /// Validate `config` and build the store from it.
    ///
    /// Fails with the first missing collaborator, checked in the order
    /// store, persister, failure sink, log tag.
    pub fn with_config(config: PersistentStoreConfig) -> Result<Self, ConfigurationError> {
        let store = config.store.ok_or(ConfigurationError::MissingStore)?;
        let persister = config
            .persister
            .ok_or(ConfigurationError::MissingPersister)?;
        let failure_sink = config
            .failure_sink
            .ok_or(ConfigurationError::MissingFailureSink)?;
        if config.log_tag.trim().is_empty() {
            return Err(ConfigurationError::EmptyLogTag);
        }

        Ok(Self::build(
            store,
            persister,
            failure_sink,
            config.log_tag,
            config.verbosity,
        ))
    }

    /// Zero-configuration store: a fresh [`CookieMonster`] persisted to a
    /// JSON file at `path`, failures ignored.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self::build(
            Arc::new(CookieMonster::new()),
            Arc::new(JsonFilePersister::new(path)),
            Arc::new(NoopFailureSink),
            "DefaultPersistentCookieStore".to_string(),
            Verbosity::Errors,
        )
    }

    fn build(
        store: Arc<dyn CookieStore>,
        persister: Arc<dyn Persister>,
        failure_sink: Arc<dyn FailureSink>,
        log_tag: String,
        verbosity: Verbosity,
    ) -> Self {
        let this = Self {
            store,
            persister,
            failure_sink,
            log_tag,
            verbosity,
            lock: RwLock::new(()),
        };
        if this.is_verbose() {
            tracing::debug!(tag = %this.log_tag, "creating persistent cookie store");
        }
        this.restore();
        this
    }

    /// The wrapped in-memory store. Mutating it directly bypasses persistence.
    pub fn inner(&self) -> &Arc<dyn CookieStore> {
        &self.store
    }

    pub fn log_tag(&self) -> &str {
        &self.log_tag
    }

    /// Export and persist the current cookie set right away, returning the
    /// outcome instead of reporting it to the failure sink.
    pub fn persist_now(&self) -> Result<(), PersistenceError> {
        let _guard = self.write_lock();
        self.persister.write(&export_cookies(self.store.as_ref()))
    }

    fn is_verbose(&self) -> bool {
        self.verbosity == Verbosity::Verbose
    }

    fn logs_errors(&self) -> bool {
        self.verbosity != Verbosity::Silent
    }

    fn read_lock(&self) -> RwLockReadGuard<'_, ()> {
        self.lock.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_lock(&self) -> RwLockWriteGuard<'_, ()> {
        self.lock.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Caller must hold the write lock.
    fn persist(&self) -> Result<(), PersistenceError> {
        let snapshot = export_cookies(self.store.as_ref());
        self.persister.write(&snapshot)?;
        if self.is_verbose() {
            tracing::debug!(tag = %self.log_tag, origins = snapshot.len(), "persisted cookies");
        }
        Ok(())
    }

    /// Caller must not hold the lock, so a sink may read the store.
    fn report_persist(&self, outcome: Result<(), PersistenceError>) {
        if let Err(e) = outcome {
            if self.logs_errors() {
                tracing::warn!(tag = %self.log_tag, error = %e, "failed to persist cookies");
            }
            self.failure_sink.on_persist_failure(&e);
        }
    }

    fn restore(&self) {
        let restored = {
            let _guard = self.write_lock();
            self.persister.read().and_then(|snapshot| match snapshot {
                Some(snapshot) => {
                    import_cookies(self.store.as_ref(), &snapshot).map_err(PersistenceError::from)
                }
                None => Ok(0),
            })
        };

        match restored {
            Ok(count) => {
                if self.is_verbose() {
                    tracing::debug!(tag = %self.log_tag, count, "restored cookies");
                }
            }
            Err(e) => {
                if self.logs_errors() {
                    tracing::warn!(tag = %self.log_tag, error = %e, "failed to restore cookies");
                }
                self.failure_sink.on_restore_failure(&e);
            }
        }
    }
}

impl std::fmt::Debug for PersistentCookieStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistentCookieStore")
            .field("log_tag", &self.log_tag)
            .field("verbosity", &self.verbosity)
            .finish_non_exhaustive()
    }
}

impl CookieStore for PersistentCookieStore {
    fn add(&self, origin: &Origin, cookie: HttpCookie) {
        let outcome = {
            let _guard = self.write_lock();
            if self.is_verbose() {
                tracing::debug!(tag = %self.log_tag, origin = %origin, cookie = %cookie, "add");
            }

            self.store.add(origin, cookie);
            self.persist()
        };
        self.report_persist(outcome);
    }

    fn get(&self, origin: &Origin) -> Vec<HttpCookie> {
        let _guard = self.read_lock();
        let cookies = self.store.get(origin);
        if self.is_verbose() {
            tracing::debug!(tag = %self.log_tag, origin = %origin, count = cookies.len(), "get");
        }
        cookies
    }

    fn cookies(&self) -> Vec<HttpCookie> {
        let _guard = self.read_lock();
        let cookies = self.store.cookies();
        if self.is_verbose() {
            tracing::debug!(tag = %self.log_tag, count = cookies.len(), "cookies");
        }
        cookies
    }

    fn origins(&self) -> Vec<Origin> {
        let _guard = self.read_lock();
        let origins = self.store.origins();
        if self.is_verbose() {
            tracing::debug!(tag = %self.log_tag, count = origins.len(), "origins");
        }
        origins
    }

    fn remove(&self, origin: &Origin, cookie: &HttpCookie) -> bool {
        let (removed, outcome) = {
            let _guard = self.write_lock();
            let removed = self.store.remove(origin, cookie);
            if self.is_verbose() {
                tracing::debug!(tag = %self.log_tag, origin = %origin, cookie = %cookie, removed, "remove");
            }

            let outcome = if removed { self.persist() } else { Ok(()) };
            (removed, outcome)
        };
        self.report_persist(outcome);
        removed
    }

    fn remove_all(&self) -> bool {
        let (removed, outcome) = {
            let _guard = self.write_lock();
            let removed = self.store.remove_all();
            if self.is_verbose() {
                tracing::debug!(tag = %self.log_tag, removed, "remove_all");
            }

            let outcome = if removed { self.persist() } else { Ok(()) };
            (removed, outcome)
        };
        self.report_persist(outcome);
        removed
    }
}
