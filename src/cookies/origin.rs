use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// The key cookies are grouped under, usually the URI they were received from.
///
/// Opaque on purpose: no parsing or normalization happens here, two origins
/// are the same key only if their strings are identical.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Origin(String);

impl Origin {
    pub fn new(origin: impl Into<String>) -> Self {
        Self(origin.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse the origin as a URL, if it is one.
    pub fn to_url(&self) -> Option<Url> {
        Url::parse(&self.0).ok()
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Origin {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Origin {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Uses the URL's serialized form as-is.
impl From<&Url> for Origin {
    fn from(url: &Url) -> Self {
        Self(url.as_str().to_string())
    }
}

impl AsRef<str> for Origin {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
