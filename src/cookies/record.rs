//! Plain, serialization-friendly cookie records.
//!
//! A [`CookieRecord`] carries the same fields as an [`HttpCookie`] and nothing
//! else, so any durable medium can hold it and read it back. [`encode`] is
//! total; [`decode`] rejects a record that does not name a valid cookie.

use crate::base::cookieerror::RecordError;
use crate::cookies::httpcookie::{HttpCookie, MAX_AGE_UNSPECIFIED};
use crate::cookies::origin::Origin;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use time::OffsetDateTime;

/// Full persisted state: every origin and its cookies, in store order.
pub type Snapshot = BTreeMap<Origin, Vec<CookieRecord>>;

/// Serializable representation of a cookie for persistence.
///
/// Every field defaults, so a record missing fields still deserializes; an
/// empty record is rejected by [`decode`] instead.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct CookieRecord {
    pub name: String,
    pub value: String,
    pub domain: Option<String>,
    pub path: Option<String>,
    pub max_age: i64,
    pub version: u32,
    pub secure: bool,
    pub http_only: bool,
    pub discard: bool,
    pub expired: bool,
    pub comment: Option<String>,
    pub comment_url: Option<String>,
    pub port_list: Option<String>,
    /// Creation instant, so max-age keeps counting across restarts.
    pub created_unix_secs: Option<i64>,
}

impl Default for CookieRecord {
    fn default() -> Self {
        Self {
            name: String::new(),
            value: String::new(),
            domain: None,
            path: None,
            max_age: MAX_AGE_UNSPECIFIED,
            version: 1,
            secure: false,
            http_only: false,
            discard: false,
            expired: false,
            comment: None,
            comment_url: None,
            port_list: None,
            created_unix_secs: None,
        }
    }
}

/// Copy every field of a live cookie into a plain record.
pub fn encode(cookie: &HttpCookie) -> CookieRecord {
    CookieRecord {
        name: cookie.name.clone(),
        value: cookie.value.clone(),
        domain: cookie.domain.clone(),
        path: cookie.path.clone(),
        max_age: cookie.max_age,
        version: cookie.version,
        secure: cookie.secure,
        http_only: cookie.http_only,
        discard: cookie.discard,
        expired: cookie.has_expired(),
        comment: cookie.comment.clone(),
        comment_url: cookie.comment_url.clone(),
        port_list: cookie.port_list.clone(),
        created_unix_secs: Some(cookie.creation_time.unix_timestamp()),
    }
}

/// Rebuild a live cookie. Records without a creation instant count from now.
///
/// Only a nameless record is rejected; any name a live cookie can carry
/// decodes back unchanged.
pub fn decode(record: &CookieRecord) -> Result<HttpCookie, RecordError> {
    if record.name.is_empty() {
        return Err(RecordError::Empty);
    }

    let creation_time = record
        .created_unix_secs
        .and_then(|secs| OffsetDateTime::from_unix_timestamp(secs).ok())
        .unwrap_or_else(OffsetDateTime::now_utc);

    Ok(HttpCookie {
        name: record.name.clone(),
        value: record.value.clone(),
        domain: record.domain.clone(),
        path: record.path.clone(),
        max_age: record.max_age,
        version: record.version,
        secure: record.secure,
        http_only: record.http_only,
        discard: record.discard,
        comment: record.comment.clone(),
        comment_url: record.comment_url.clone(),
        port_list: record.port_list.clone(),
        creation_time,
    })
}

/// Encode in order.
pub fn encode_all(cookies: &[HttpCookie]) -> Vec<CookieRecord> {
    cookies.iter().map(encode).collect()
}

/// Decode in order; the first bad record fails the whole batch.
pub fn decode_all(records: &[CookieRecord]) -> Result<Vec<HttpCookie>, RecordError> {
    records.iter().map(decode).collect()
}
