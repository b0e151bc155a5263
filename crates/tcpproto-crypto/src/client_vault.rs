//! The client-originated asymmetric vault (§4.F.2): RSA-OAEP-SHA512 secrets
//! the client encrypts to the server's public key, with an empty OAEP
//! label.

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use pkcs8::DecodePrivateKey;
use rand::rngs::OsRng;
use rsa::{Oaep, RsaPrivateKey, RsaPublicKey};
use sha2::Sha512;
use spki::DecodePublicKey;

use crate::error::CryptoError;

fn oaep() -> Oaep {
    Oaep::new::<Sha512>()
}

/// Loads a PKCS#8 PEM-encoded RSA private key from `path`.
///
/// # Errors
///
/// Returns [`CryptoError::KeyLoad`] if the file is missing or not a valid
/// PKCS#8 PEM private key.
pub fn load_private_key(path: &std::path::Path) -> Result<RsaPrivateKey, CryptoError> {
    let pem = std::fs::read_to_string(path).map_err(|e| CryptoError::KeyLoad(e.to_string()))?;
    RsaPrivateKey::from_pkcs8_pem(&pem).map_err(|e| CryptoError::KeyLoad(e.to_string()))
}

/// Loads a SubjectPublicKeyInfo PEM-encoded RSA public key from `path`.
///
/// # Errors
///
/// Returns [`CryptoError::KeyLoad`] if the file is missing or not a valid
/// SPKI PEM public key.
pub fn load_public_key(path: &std::path::Path) -> Result<RsaPublicKey, CryptoError> {
    let pem = std::fs::read_to_string(path).map_err(|e| CryptoError::KeyLoad(e.to_string()))?;
    RsaPublicKey::from_public_key_pem(&pem).map_err(|e| CryptoError::KeyLoad(e.to_string()))
}

/// Encrypts `plaintext` to `public_key` with RSA-OAEP-SHA512 and an empty
/// label, returning the standard-base64 ciphertext.
///
/// Unlike the behavior this protocol's source implementation exhibits (which
/// silently logs and returns an empty ciphertext), an oversize plaintext is
/// a hard failure here: a caller that ignored it would silently vault
/// nothing.
///
/// # Errors
///
/// Returns [`CryptoError::MessageTooLargeForKey`] if `plaintext` does not
/// fit in one OAEP block for this key's modulus size.
pub fn encrypt(public_key: &RsaPublicKey, plaintext: &[u8]) -> Result<String, CryptoError> {
    let ciphertext = public_key
        .encrypt(&mut OsRng, oaep(), plaintext)
        .map_err(|_| CryptoError::MessageTooLargeForKey)?;
    Ok(BASE64.encode(ciphertext))
}

/// Decrypts a base64, RSA-OAEP-SHA512 ciphertext produced by [`encrypt`].
///
/// # Errors
///
/// - [`CryptoError::VaultBase64Failure`] if `ciphertext` is not valid
///   base64.
/// - [`CryptoError::RsaDecryptFailure`] if OAEP decryption or authentication
///   fails.
pub fn decrypt(private_key: &RsaPrivateKey, ciphertext: &str) -> Result<Vec<u8>, CryptoError> {
    let raw = BASE64.decode(ciphertext).map_err(|_| CryptoError::VaultBase64Failure)?;
    private_key.decrypt(oaep(), &raw).map_err(|_| CryptoError::RsaDecryptFailure)
}
