//! Cookie persistence - save and load cookie snapshots.
//!
//! A [`Persister`] writes and reads a whole [`Snapshot`] at once. Two
//! implementations ship with the crate:
//! - [`JsonFilePersister`]: one JSON file holding the entire snapshot.
//! - [`MemoryPersister`]: keeps the last snapshot in memory.
//!
//! [`export_cookies`] and [`import_cookies`] move a snapshot in and out of a
//! [`CookieStore`].

use crate::base::cookieerror::{PersistenceError, RecordError};
use crate::cookies::httpcookie::HttpCookie;
use crate::cookies::origin::Origin;
use crate::cookies::record::{self, Snapshot};
use crate::cookies::store::CookieStore;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Durable storage for cookie snapshots.
///
/// Implementations must be `Send + Sync`; methods take `&self`.
pub trait Persister: Send + Sync {
    /// Replace whatever was stored before with `snapshot`.
    fn write(&self, snapshot: &Snapshot) -> Result<(), PersistenceError>;

    /// Read the stored snapshot. `Ok(None)` means nothing was ever written.
    fn read(&self) -> Result<Option<Snapshot>, PersistenceError>;
}

/// Stores the snapshot as a single JSON document.
///
/// # Example
/// ```no_run
/// use cookiepersist::cookies::persistence::{JsonFilePersister, Persister};
///
/// let persister = JsonFilePersister::new("/path/to/cookies.json").atomic(true);
/// let restored = persister.read()?;
/// # Ok::<(), cookiepersist::base::cookieerror::PersistenceError>(())
/// ```
#[derive(Debug, Clone)]
pub struct JsonFilePersister {
    path: PathBuf,
    atomic: bool,
}

impl JsonFilePersister {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            atomic: false,
        }
    }

    /// Write to `<path>.tmp` and rename over the target, so a crash mid-write
    /// leaves the previous snapshot intact.
    pub fn atomic(mut self, atomic: bool) -> Self {
        self.atomic = atomic;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".tmp");
        PathBuf::from(name)
    }
}

impl Persister for JsonFilePersister {
    fn write(&self, snapshot: &Snapshot) -> Result<(), PersistenceError> {
        let json = serde_json::to_vec_pretty(snapshot)?;

        if self.atomic {
            let tmp = self.temp_path();
            fs::write(&tmp, &json).map_err(|e| PersistenceError::io(&tmp, e))?;
            fs::rename(&tmp, &self.path).map_err(|e| PersistenceError::io(&self.path, e))
        } else {
            fs::write(&self.path, &json).map_err(|e| PersistenceError::io(&self.path, e))
        }
    }

    fn read(&self) -> Result<Option<Snapshot>, PersistenceError> {
        let json = match fs::read(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(PersistenceError::io(&self.path, e)),
        };

        let snapshot = serde_json::from_slice(&json)?;
        Ok(Some(snapshot))
    }
}

/// Keeps the most recent snapshot in memory.
#[derive(Debug, Default)]
pub struct MemoryPersister {
    state: Mutex<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    snapshot: Option<Snapshot>,
    writes: usize,
}

impl MemoryPersister {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start out as if `snapshot` had been written by an earlier session.
    pub fn with_snapshot(snapshot: Snapshot) -> Self {
        Self {
            state: Mutex::new(MemoryState {
                snapshot: Some(snapshot),
                writes: 0,
            }),
        }
    }

    pub fn snapshot(&self) -> Option<Snapshot> {
        self.lock().snapshot.clone()
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> usize {
        self.lock().writes
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Persister for MemoryPersister {
    fn write(&self, snapshot: &Snapshot) -> Result<(), PersistenceError> {
        let mut state = self.lock();
        state.snapshot = Some(snapshot.clone());
        state.writes += 1;
        Ok(())
    }

    fn read(&self) -> Result<Option<Snapshot>, PersistenceError> {
        Ok(self.lock().snapshot.clone())
    }
}

/// Build a full snapshot of `store`: every origin with its cookie list.
pub fn export_cookies(store: &dyn CookieStore) -> Snapshot {
    store
        .origins()
        .into_iter()
        .map(|origin| {
            let records = record::encode_all(&store.get(&origin));
            (origin, records)
        })
        .collect()
}

/// Add every cookie in `snapshot` to `store`, keeping per-origin order.
///
/// All records are decoded before anything is added, so a bad record leaves
/// `store` untouched. Returns the number of cookies handed to the store.
pub fn import_cookies(store: &dyn CookieStore, snapshot: &Snapshot) -> Result<usize, RecordError> {
    let decoded: Vec<(&Origin, Vec<HttpCookie>)> = snapshot
        .iter()
        .map(|(origin, records)| record::decode_all(records).map(|cookies| (origin, cookies)))
        .collect::<Result<_, RecordError>>()?;

    let mut count = 0;
    for (origin, cookies) in decoded {
        for cookie in cookies {
            store.add(origin, cookie);
            count += 1;
        }
    }
    Ok(count)
}
