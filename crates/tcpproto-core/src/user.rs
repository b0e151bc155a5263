//! The opaque user record attached to every request.
//!
//! The core never populates this itself; it is a slot the default
//! authenticator and application callbacks are free to fill in.

/// A request's associated user, if any has been established.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct User {
    /// Application-defined numeric identifier.
    pub id: i64,
    /// Display or login name.
    pub username: String,
    /// Contact address.
    pub email: String,
    /// Whether the request's authenticator considers this user signed in.
    pub is_authenticated: bool,
    /// Whether this user has administrative privileges.
    pub is_admin: bool,
}
