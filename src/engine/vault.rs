use aes_gcm::{
    aead::{Aead, AeadCore, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};
use crate::{Result, Error};

const NONCE_LEN: usize = 12;

fn cipher(key: &[u8]) -> Result<Aes256Gcm> {
    if key.len() != 32 {
        return Err(Error::Vault("key must be 32 bytes".to_string()));
    }
    Aes256Gcm::new_from_slice(key).map_err(|e| Error::Vault(e.to_string()))
}

/// Seals a snapshot document with AES-256-GCM under a 32-byte key.
///
/// Returns hex of the random nonce followed by the ciphertext.
pub fn seal(document: &str, key: &[u8]) -> Result<String> {
    let cipher = cipher(key)?;
    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
    let ciphertext = cipher.encrypt(&nonce, document.as_bytes()).map_err(|e| Error::Vault(e.to_string()))?;

    let mut sealed = nonce.to_vec();
    sealed.extend_from_slice(&ciphertext);
    Ok(hex::encode(sealed))
}

/// Opens text produced by [`seal`]. Fails on a wrong key or any tampering.
pub fn open(sealed_hex: &str, key: &[u8]) -> Result<String> {
    let cipher = cipher(key)?;
    let sealed = hex::decode(sealed_hex.trim()).map_err(|e| Error::Vault(e.to_string()))?;
    if sealed.len() < NONCE_LEN {
        return Err(Error::Vault("sealed snapshot too short".to_string()));
    }

    let (nonce_bytes, ciphertext) = sealed.split_at(NONCE_LEN);
    let plain = cipher
        .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
        .map_err(|_| Error::Vault("cannot open snapshot (wrong key or tampered data)".to_string()))?;
    String::from_utf8(plain).map_err(|e| Error::Vault(e.to_string()))
}
