//! Navigable-location seam.
//!
//! The location is shared mutable state owned by whoever embeds the player
//! (a browser address bar, a deep link, a CLI argument). It is only ever
//! reached through the [`Location`] trait so that origin resolution can be
//! exercised without a real one.

use parking_lot::Mutex;
use reqwest::Url;
use streamgate_common::{Error, Result};

/// Ordered key/value query parameters.
///
/// Keeps insertion order, and [`set`](Self::set) replaces the first
/// occurrence of a key while dropping any duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocationParams(Vec<(String, String)>);

impl LocationParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn set(&mut self, key: &str, value: &str) {
        match self.0.iter().position(|(k, _)| k == key) {
            Some(index) => {
                self.0[index].1 = value.to_string();
                let mut seen = false;
                self.0.retain(|(k, _)| {
                    if k != key {
                        return true;
                    }
                    let keep = !seen;
                    seen = true;
                    keep
                });
            }
            None => self.0.push((key.to_string(), value.to_string())),
        }
    }

    pub fn remove(&mut self, key: &str) {
        self.0.retain(|(k, _)| k != key);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for LocationParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Read/replace access to the caller's navigable location.
pub trait Location: Send + Sync {
    /// Current query parameters.
    fn parameters(&self) -> LocationParams;

    /// Replace the query parameters in place, without a full navigation.
    fn replace(&self, params: LocationParams);
}

/// In-process location backed by a URL.
///
/// Counts replacements so callers can observe rewrite behaviour.
#[derive(Debug)]
pub struct MemoryLocation {
    inner: Mutex<MemoryLocationInner>,
}

#[derive(Debug)]
struct MemoryLocationInner {
    url: Url,
    replacements: usize,
}

impl MemoryLocation {
    pub fn parse(href: &str) -> Result<Self> {
        let url = Url::parse(href)
            .map_err(|e| Error::invalid_config(format!("invalid location {href}: {e}")))?;
        Ok(Self {
            inner: Mutex::new(MemoryLocationInner {
                url,
                replacements: 0,
            }),
        })
    }

    /// Full location, including the query string.
    pub fn href(&self) -> String {
        self.inner.lock().url.to_string()
    }

    /// Number of [`Location::replace`] calls observed so far.
    pub fn replacements(&self) -> usize {
        self.inner.lock().replacements
    }

    /// Simulate an external change of a single parameter (the user editing
    /// the address). Not counted as a replacement.
    pub fn navigate_param(&self, key: &str, value: &str) {
        let mut inner = self.inner.lock();
        let mut params = params_of(&inner.url);
        params.set(key, value);
        write_params(&mut inner.url, &params);
    }
}

impl Location for MemoryLocation {
    fn parameters(&self) -> LocationParams {
        params_of(&self.inner.lock().url)
    }

    fn replace(&self, params: LocationParams) {
        let mut inner = self.inner.lock();
        write_params(&mut inner.url, &params);
        inner.replacements += 1;
    }
}

fn params_of(url: &Url) -> LocationParams {
    url.query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

fn write_params(url: &mut Url, params: &LocationParams) {
    if params.is_empty() {
        url.set_query(None);
        return;
    }
    url.query_pairs_mut().clear().extend_pairs(params.iter());
}
