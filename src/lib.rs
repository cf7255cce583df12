//! # cookiepersist
//!
//! Durable HTTP cookie storage for Rust HTTP clients.
//!
//! `cookiepersist` keeps an in-memory cookie collection, grouped by origin,
//! and writes the full cookie set to a backing store after every mutation so
//! it survives process restarts. Cookie matching and expiry stay with the
//! wrapped in-memory store; the on-disk format stays with a pluggable
//! persister.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cookiepersist::cookies::{CookieStore, HttpCookie, Origin, PersistentCookieStore};
//!
//! let store = PersistentCookieStore::open("cookies.json");
//! let origin = Origin::from("http://example.com");
//! store.add(&origin, HttpCookie::parse("sid=abc; Max-Age=3600")?);
//! println!("{} cookie(s) for {}", store.get(&origin).len(), origin);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Modules
//!
//! - [`base`] - Error definitions
//! - [`cookies`] - Cookies, stores, records, persisters and the persistent store
//!
//! ## Guarantees
//!
//! - Every successful mutation is flushed synchronously, no shutdown step is needed
//! - Persistence failures never surface from cookie operations; they go to a failure sink
//! - A failed restore leaves an empty, usable store
//! - One store per backing file; there is no cross-process locking

pub mod base;
pub mod cookies;
