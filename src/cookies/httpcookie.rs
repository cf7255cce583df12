use crate::base::cookieerror::{CookieParseError, RecordError};
use std::fmt;
use time::OffsetDateTime;

/// Max-age of a cookie that lives until the end of the session.
pub const MAX_AGE_UNSPECIFIED: i64 = -1;

/// Characters that may not appear in a cookie name.
const NAME_SEPARATORS: &str = "()<>@,;:\\\"/[]?={} \t";

/// A live HTTP cookie.
///
/// Covers both RFC 2965 attributes (version, comment, port list, discard) and
/// the attributes browsers still send today. Identity inside a store is the
/// `(name, domain, path)` triple, see [`HttpCookie::same_identity`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpCookie {
    pub name: String,
    pub value: String,
    pub domain: Option<String>,
    pub path: Option<String>,
    /// Lifetime in seconds counted from `creation_time`. Negative means
    /// session-only, zero means already expired.
    pub max_age: i64,
    pub version: u32,
    pub secure: bool,
    pub http_only: bool,
    pub discard: bool,
    pub comment: Option<String>,
    pub comment_url: Option<String>,
    /// Free-form port list, e.g. `"80,8080"`.
    pub port_list: Option<String>,
    pub creation_time: OffsetDateTime,
}

impl HttpCookie {
    /// Create a session cookie, rejecting names a server could never send.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Result<Self, RecordError> {
        let name = name.into();
        validate_name(&name)?;
        Ok(Self {
            name,
            value: value.into(),
            domain: None,
            path: None,
            max_age: MAX_AGE_UNSPECIFIED,
            version: 1,
            secure: false,
            http_only: false,
            discard: false,
            comment: None,
            comment_url: None,
            port_list: None,
            creation_time: OffsetDateTime::now_utc(),
        })
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_max_age(mut self, max_age: i64) -> Self {
        self.max_age = max_age;
        self
    }

    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// Parse a single `Set-Cookie` header line.
    ///
    /// `Expires` is converted to a max-age relative to now; `Max-Age` wins
    /// when both are present.
    pub fn parse(line: &str) -> Result<Self, CookieParseError> {
        let parsed = cookie::Cookie::parse(line)?;
        let now = OffsetDateTime::now_utc();

        let mut c = HttpCookie::new(parsed.name(), parsed.value())?;
        c.creation_time = now;
        // Set-Cookie (RFC 6265) carries no Version attribute.
        c.version = 0;
        c.domain = parsed.domain().map(|d| d.to_string());
        c.path = parsed.path().map(|p| p.to_string());
        c.secure = parsed.secure().unwrap_or(false);
        c.http_only = parsed.http_only().unwrap_or(false);

        c.max_age = if let Some(max_age) = parsed.max_age() {
            max_age.whole_seconds().max(0)
        } else if let Some(expires) = parsed.expires().and_then(|e| e.datetime()) {
            (expires - now).whole_seconds().max(0)
        } else {
            MAX_AGE_UNSPECIFIED
        };

        Ok(c)
    }

    pub fn is_session(&self) -> bool {
        self.max_age < 0
    }

    pub fn has_expired_at(&self, now: OffsetDateTime) -> bool {
        if self.max_age == 0 {
            return true;
        }
        if self.max_age < 0 {
            return false;
        }
        (now - self.creation_time).whole_seconds() > self.max_age
    }

    pub fn has_expired(&self) -> bool {
        self.has_expired_at(OffsetDateTime::now_utc())
    }

    /// Same cookie as far as a store is concerned: names and domains match
    /// case-insensitively, paths exactly.
    pub fn same_identity(&self, other: &HttpCookie) -> bool {
        self.name.eq_ignore_ascii_case(&other.name)
            && eq_ignore_case_opt(self.domain.as_deref(), other.domain.as_deref())
            && self.path == other.path
    }
}

impl fmt::Display for HttpCookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)
    }
}

fn eq_ignore_case_opt(a: Option<&str>, b: Option<&str>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
        (None, None) => true,
        _ => false,
    }
}

/// A cookie name must be a non-empty token that does not start with `$`.
pub fn validate_name(name: &str) -> Result<(), RecordError> {
    if name.is_empty() {
        return Err(RecordError::Empty);
    }
    let is_token = name
        .chars()
        .all(|ch| ch.is_ascii_graphic() && !NAME_SEPARATORS.contains(ch));
    if !is_token || name.starts_with('$') {
        return Err(RecordError::InvalidName(name.to_string()));
    }
    Ok(())
}
