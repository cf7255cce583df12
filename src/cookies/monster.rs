use crate::base::cookieerror::CookieParseError;
use crate::cookies::httpcookie::HttpCookie;
use crate::cookies::origin::Origin;
use crate::cookies::store::CookieStore;
use dashmap::DashMap;
use std::sync::Arc;

/// Maximum cookies per origin (Chromium's per-domain default).
const MAX_COOKIES_PER_ORIGIN: usize = 50;

/// The default in-memory cookie store.
///
/// Cookies are bucketed by [`Origin`] and kept in insertion order within a
/// bucket. Expired cookies are never returned, and a cookie that arrives
/// already expired deletes any stored cookie with the same identity.
#[derive(Clone)]
pub struct CookieMonster {
    // Map<Origin, List<Cookie>>
    store: Arc<DashMap<Origin, Vec<HttpCookie>>>,
}

impl Default for CookieMonster {
    fn default() -> Self {
        Self::new()
    }
}

impl CookieMonster {
    pub fn new() -> Self {
        Self {
            store: Arc::new(DashMap::new()),
        }
    }

    /// Parse a `Set-Cookie` line and store the result under `origin`.
    pub fn parse_and_save_cookie(
        &self,
        origin: &Origin,
        cookie_line: &str,
    ) -> Result<(), CookieParseError> {
        let cookie = HttpCookie::parse(cookie_line)?;
        self.add(origin, cookie);
        Ok(())
    }

    /// Get total cookie count, expired entries included.
    pub fn total_cookie_count(&self) -> usize {
        self.store.iter().map(|e| e.value().len()).sum()
    }

    fn drop_if_empty(&self, origin: &Origin) {
        self.store.remove_if(origin, |_, cookies| cookies.is_empty());
    }

    fn sorted_origins(&self) -> Vec<Origin> {
        let mut origins: Vec<Origin> = self
            .store
            .iter()
            .filter(|e| !e.value().is_empty())
            .map(|e| e.key().clone())
            .collect();
        origins.sort();
        origins
    }
}

impl CookieStore for CookieMonster {
    fn add(&self, origin: &Origin, cookie: HttpCookie) {
        let mut entry = self.store.entry(origin.clone()).or_default();

        // Remove existing if name/domain/path match
        entry.retain(|c| !c.same_identity(&cookie));

        if cookie.has_expired() {
            drop(entry);
            self.drop_if_empty(origin);
            return;
        }

        // Enforce per-origin limit by evicting the oldest cookie
        while entry.len() >= MAX_COOKIES_PER_ORIGIN {
            if let Some(oldest_idx) = entry
                .iter()
                .enumerate()
                .min_by_key(|(_, c)| c.creation_time)
                .map(|(i, _)| i)
            {
                entry.remove(oldest_idx);
            } else {
                break;
            }
        }

        entry.push(cookie);
    }

    fn get(&self, origin: &Origin) -> Vec<HttpCookie> {
        self.store
            .get(origin)
            .map(|entry| {
                entry
                    .iter()
                    .filter(|c| !c.has_expired())
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    fn cookies(&self) -> Vec<HttpCookie> {
        self.sorted_origins()
            .iter()
            .flat_map(|origin| self.get(origin))
            .collect()
    }

    fn origins(&self) -> Vec<Origin> {
        self.sorted_origins()
    }

    fn remove(&self, origin: &Origin, cookie: &HttpCookie) -> bool {
        let removed = match self.store.get_mut(origin) {
            Some(mut entry) => match entry.iter().position(|c| c.same_identity(cookie)) {
                Some(idx) => {
                    entry.remove(idx);
                    true
                }
                None => false,
            },
            None => false,
        };

        if removed {
            self.drop_if_empty(origin);
        }
        removed
    }

    fn remove_all(&self) -> bool {
        let any = self.store.iter().any(|e| !e.value().is_empty());
        self.store.clear();
        any
    }
}
