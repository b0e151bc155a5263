//! Client-side cookie storage.
//!
//! A cookie is a (name, value) pair the client replays on every subsequent
//! request until the server forgets it.

use indexmap::IndexMap;

/// A single cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    /// The cookie's name, used as the header key on emit.
    pub name: String,
    /// The cookie's current value.
    pub value: String,
}

/// The client's cookie jar: a name-keyed map of [`Cookie`]s.
#[derive(Debug, Clone, Default)]
pub struct CookieJar {
    cookies: IndexMap<String, Cookie>,
}

impl CookieJar {
    /// An empty jar.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets (inserting or overwriting) a cookie by name.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.cookies.insert(name.clone(), Cookie { name, value: value.into() });
    }

    /// Looks up a cookie by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Cookie> {
        self.cookies.get(name)
    }

    /// Removes a cookie by name, if present.
    pub fn forget(&mut self, name: &str) {
        self.cookies.shift_remove(name);
    }

    /// Iterates over all cookies currently held.
    pub fn iter(&self) -> impl Iterator<Item = &Cookie> {
        self.cookies.values()
    }

    /// The number of cookies currently held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    /// Whether the jar holds no cookies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }
}
