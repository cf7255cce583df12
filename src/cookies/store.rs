//! The in-memory cookie store capability.
//!
//! A [`CookieStore`] owns cookie matching and expiry semantics. The
//! persistence layer only ever goes through this trait, so any store that is
//! internally synchronized can be wrapped.

use crate::cookies::httpcookie::HttpCookie;
use crate::cookies::origin::Origin;

/// Add / list / remove cookies grouped by [`Origin`].
///
/// Methods take `&self`; implementations manage their own synchronization.
pub trait CookieStore: Send + Sync {
    /// Store `cookie` under `origin`, replacing a cookie with the same identity.
    fn add(&self, origin: &Origin, cookie: HttpCookie);

    /// Cookies that apply to `origin`, in the store's order.
    fn get(&self, origin: &Origin) -> Vec<HttpCookie>;

    /// Every unexpired cookie held by the store.
    fn cookies(&self) -> Vec<HttpCookie>;

    /// Every origin that currently holds cookies.
    fn origins(&self) -> Vec<Origin>;

    /// Remove `cookie` from `origin`. Returns whether it was present.
    fn remove(&self, origin: &Origin, cookie: &HttpCookie) -> bool;

    /// Remove every cookie. Returns whether anything was removed.
    fn remove_all(&self) -> bool;
}
