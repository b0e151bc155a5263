//! Vault cryptography.
//!
//! Two independent primitives, both called out by name in the wire protocol:
//!
//! - [`vault`] — AES-256-GCM tokens the server issues to itself and
//!   round-trips through the client. The server is the only party that ever
//!   decrypts these; the client stores and replays them verbatim.
//! - [`client_vault`] — RSA-OAEP-SHA512 secrets the client encrypts to the
//!   server's public key. The server is the only party that can decrypt
//!   these.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod client_vault;
pub mod error;
pub mod vault;

pub use client_vault::{decrypt, encrypt, load_private_key, load_public_key};
pub use error::CryptoError;
pub use vault::{Vault, derive_key};
