//! Cookie storage and persistence.
//!
//! This module provides:
//!
//! - **Cookies**: the live cookie value ([`HttpCookie`]) and the [`Origin`] it is grouped under
//! - **Storage**: the [`CookieStore`] capability and an in-memory jar ([`CookieMonster`])
//! - **Records**: plain, serializable cookie records ([`record`])
//! - **Persistence**: snapshot persisters ([`persistence`]) and failure sinks ([`failure`])
//! - **Synchronization**: [`PersistentCookieStore`], which mirrors every mutation of a
//!   wrapped store to a persister
//!
//! # Architecture
//!
//! | Component | Type | Responsibility |
//! |-----------|------|----------------|
//! | In-memory store | [`CookieMonster`] | Bucketing, identity, expiry |
//! | Record codec | [`record::encode`] / [`record::decode`] | Cookie <-> plain record |
//! | Persister | [`JsonFilePersister`] | Durable snapshot read/write |
//! | Failure sink | [`FailureSink`] | Persist/restore failure callbacks |
//! | Synchronizing store | [`PersistentCookieStore`] | Restore at start, persist after each mutation |
//!
//! # Wiring custom collaborators
//!
//! ```rust
//! use std::sync::Arc;
//! use cookiepersist::cookies::{
//!     CookieMonster, CookieStore, HttpCookie, MemoryPersister, Origin,
//!     PersistentCookieStore, PersistentStoreConfig, TracingFailureSink, Verbosity,
//! };
//!
//! let config = PersistentStoreConfig::new()
//!     .with_store(Arc::new(CookieMonster::new()))
//!     .with_persister(Arc::new(MemoryPersister::new()))
//!     .with_failure_sink(Arc::new(TracingFailureSink))
//!     .with_log_tag("session-cookies")
//!     .with_verbosity(Verbosity::Verbose);
//!
//! let store = PersistentCookieStore::with_config(config)?;
//! store.add(&Origin::from("http://example.com"), HttpCookie::new("sid", "abc")?);
//! assert_eq!(store.cookies().len(), 1);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod failure;
pub mod httpcookie;
pub mod monster;
pub mod origin;
pub mod persistence;
pub mod persistent;
pub mod record;
pub mod store;

pub use failure::{FailureSink, FnFailureSink, NoopFailureSink, TracingFailureSink};
pub use httpcookie::HttpCookie;
pub use monster::CookieMonster;
pub use origin::Origin;
pub use persistence::{JsonFilePersister, MemoryPersister, Persister};
pub use persistent::{PersistentCookieStore, PersistentStoreConfig, Verbosity};
pub use record::{CookieRecord, Snapshot};
pub use store::CookieStore;
