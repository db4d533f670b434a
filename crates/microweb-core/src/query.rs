//! Query string parsing.
//!
//! [`QueryMap::parse`] turns a raw path-plus-query (or a bare query string)
//! into decoded key/value pairs. Decoding is lenient: malformed percent
//! escapes never fail a request, the raw segment text is kept instead.

use std::collections::hash_map::{Entry, Iter};
use std::collections::HashMap;

/// Decoded query parameters of a single request.
///
/// Keys and values are form-decoded (`+` is a space, `%XX` is a UTF-8 byte).
/// When a key repeats, the first occurrence wins.
///
/// # Example
///
/// ```
/// use microweb_core::QueryMap;
///
/// let query = QueryMap::parse("/greeting?name=Ada+Lovelace&name=Grace&debug");
/// assert_eq!(query.get("name"), Some("Ada Lovelace"));
/// assert_eq!(query.get("debug"), Some(""));
/// assert_eq!(query.get("missing"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryMap {
    params: HashMap<String, String>,
}

impl QueryMap {
    /// Creates an empty query map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a path containing `?`, or a bare query string.
    ///
    /// Everything after the first `?` is parsed. Input without a `?` is a
    /// bare query string unless it is a path (starts with `/`) or an
    /// absolute URL, in which case the map is empty. Values may contain
    /// `/`. A trailing `?` also yields an empty map.
    ///
    /// ```
    /// use microweb_core::QueryMap;
    ///
    /// assert_eq!(QueryMap::parse("next=/home&x=1").get("x"), Some("1"));
    /// assert!(QueryMap::parse("/home").is_empty());
    /// ```
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let query = match raw.split_once('?') {
            Some((_, query)) => query,
            None if raw.starts_with('/') || after_scheme(raw).is_some() => "",
            None => raw,
        };
        Self::parse_query(query)
    }

    /// Parses a query string that has already been split from its path.
    #[must_use]
    pub fn parse_query(query: &str) -> Self {
        let mut map = Self::new();
        for segment in query.split('&').filter(|s| !s.is_empty()) {
            let (key, value) = segment.split_once('=').unwrap_or((segment, ""));
            map.insert_first(decode_component(key), decode_component(value));
        }
        map
    }

    /// Returns the decoded value for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Returns true if `key` was present in the query, even with an empty value.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.params.contains_key(key)
    }

    /// Number of distinct keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Returns true if the query carried no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Iterates over the decoded pairs in no particular order.
    pub fn iter(&self) -> Iter<'_, String, String> {
        self.params.iter()
    }

    /// Inserts a pair unless the key is already present.
    ///
    /// Returns false when an earlier value was kept.
    pub fn insert_first(&mut self, key: impl Into<String>, value: impl Into<String>) -> bool {
        match self.params.entry(key.into()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(value.into());
                true
            }
        }
    }
}

impl<'a> IntoIterator for &'a QueryMap {
    type Item = (&'a String, &'a String);
    type IntoIter = Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.params.iter()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (key, value) in iter {
            map.insert_first(key, value);
        }
        map
    }
}

/// A request target split into its path and decoded query.
///
/// Accepts origin-form targets (`/path?x=1`) as well as absolute URLs
/// (`http://host:8080/path?x=1`); the scheme and authority are dropped.
///
/// # Example
///
/// ```
/// use microweb_core::RequestTarget;
///
/// let target = RequestTarget::parse("http://localhost:36000/stocks?symbol=ibm");
/// assert_eq!(target.path(), "/stocks");
/// assert_eq!(target.query().get("symbol"), Some("ibm"));
///
/// assert_eq!(RequestTarget::parse("").path(), "/");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTarget {
    path: String,
    query: QueryMap,
}

impl RequestTarget {
    /// Parses a request target or absolute URL.
    ///
    /// Scheme and authority are only stripped from a leading
    /// `scheme://`; a `://` inside the query of an origin-form target is
    /// left alone.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let without_authority = match after_scheme(raw) {
            Some(rest) => rest.find(['/', '?']).map_or("", |i| &rest[i..]),
            None => raw,
        };

        let (path, query) = match without_authority.split_once('?') {
            Some((path, query)) => (path, QueryMap::parse_query(query)),
            None => (without_authority, QueryMap::new()),
        };

        let path = if path.is_empty() {
            "/".to_string()
        } else {
            path.to_string()
        };

        Self { path, query }
    }

    /// The path component, never empty.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The decoded query parameters.
    #[must_use]
    pub const fn query(&self) -> &QueryMap {
        &self.query
    }

    /// Consumes the target, returning its parts.
    #[must_use]
    pub fn into_parts(self) -> (String, QueryMap) {
        (self.path, self.query)
    }
}

/// The text after `scheme://` when `raw` starts with a URI scheme.
fn after_scheme(raw: &str) -> Option<&str> {
    let (scheme, rest) = raw.split_once("://")?;
    let mut chars = scheme.chars();
    let valid = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    valid.then_some(rest)
}

/// Form-decodes one key or value, keeping the raw text on malformed input.
fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    if !has_well_formed_escapes(&spaced) {
        tracing::debug!(component = %raw, "malformed percent-encoding, keeping raw text");
        return raw.to_string();
    }
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => {
            tracing::debug!(component = %raw, "percent-encoding is not valid UTF-8, keeping raw text");
            raw.to_string()
        }
    }
}

fn has_well_formed_escapes(s: &str) -> bool {
    let bytes = s.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = bytes.get(i + 1..i + 3);
            if !hex.is_some_and(|h| h.iter().all(u8::is_ascii_hexdigit)) {
                return false;
            }
            i += 3;
        } else {
            i += 1;
        }
    }
    true
}
