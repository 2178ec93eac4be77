//! AEAD adapters for the two benchmarked ciphers.
//! Every sealed message is laid out as `nonce (12 bytes) || ciphertext || tag (16 bytes)`
//! and is produced with an empty associated data.

use std::fmt;

use aes_gcm::aead::consts::U12;
use aes_gcm::aead::generic_array::GenericArray;
use aes_gcm::aead::{AeadCore, AeadInPlace, KeyInit};
use aes_gcm::Aes256Gcm;
use anyhow::{anyhow, bail, Result};
use chacha20poly1305::ChaCha20Poly1305;
use rand::rngs::OsRng;
use rand::RngCore;
use serde::Serialize;

pub const KEY_LEN: usize = 32;
pub const NONCE_LEN: usize = 12;
pub const TAG_LEN: usize = 16;

/// The ciphers under test, in the order the benchmark runs them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum CipherKind {
    #[serde(rename = "AES-GCM")]
    AesGcm,
    #[serde(rename = "ChaCha20-Poly1305")]
    ChaCha20Poly1305,
}

impl CipherKind {
    pub const ALL: [CipherKind; 2] = [CipherKind::AesGcm, CipherKind::ChaCha20Poly1305];

    pub fn name(self) -> &'static str {
        match self {
            CipherKind::AesGcm => "AES-GCM",
            CipherKind::ChaCha20Poly1305 => "ChaCha20-Poly1305",
        }
    }

    /// Name used inside ciphertext file names.
    pub fn file_tag(self) -> String {
        self.name().replace(' ', "")
    }

    fn index(self) -> usize {
        match self {
            CipherKind::AesGcm => 0,
            CipherKind::ChaCha20Poly1305 => 1,
        }
    }

    /// Encrypts `plaintext` under a fresh random nonce and returns `nonce || ciphertext || tag`.
    pub fn encrypt(self, key: &CipherKey, plaintext: &[u8]) -> Result<Vec<u8>> {
        let mut nonce = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce);
        self.encrypt_with_nonce(key, &nonce, plaintext)
    }

    /// Inverse of [`CipherKind::encrypt`]: splits off the nonce prefix and opens the rest.
    pub fn decrypt(self, key: &CipherKey, sealed: &[u8]) -> Result<Vec<u8>> {
        match self {
            CipherKind::AesGcm => open::<Aes256Gcm>(self, key.as_bytes(), sealed),
            CipherKind::ChaCha20Poly1305 => open::<ChaCha20Poly1305>(self, key.as_bytes(), sealed),
        }
    }

    fn encrypt_with_nonce(self, key: &CipherKey, nonce: &[u8; NONCE_LEN], plaintext: &[u8]) -> Result<Vec<u8>> {
        match self {
            CipherKind::AesGcm => seal::<Aes256Gcm>(self, key.as_bytes(), nonce, plaintext),
            CipherKind::ChaCha20Poly1305 => seal::<ChaCha20Poly1305>(self, key.as_bytes(), nonce, plaintext),
        }
    }
}

impl fmt::Display for CipherKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn seal<C>(kind: CipherKind, key: &[u8], nonce: &[u8; NONCE_LEN], plaintext: &[u8]) -> Result<Vec<u8>>
where
    C: KeyInit + AeadInPlace + AeadCore<NonceSize = U12>,
{
    let cipher = C::new_from_slice(key).map_err(|e| anyhow!("{kind}: {e}"))?;
    let mut out = Vec::with_capacity(NONCE_LEN + plaintext.len() + TAG_LEN);
    out.extend_from_slice(nonce);
    out.extend_from_slice(plaintext);
    let tag = cipher
        .encrypt_in_place_detached(GenericArray::from_slice(nonce), b"", &mut out[NONCE_LEN..])
        .map_err(|e| anyhow!("{kind} encryption failed: {e}"))?;
    out.extend_from_slice(&tag);
    Ok(out)
}

fn open<C>(kind: CipherKind, key: &[u8], sealed: &[u8]) -> Result<Vec<u8>>
where
    C: KeyInit + AeadInPlace + AeadCore<NonceSize = U12>,
{
    if sealed.len() < NONCE_LEN + TAG_LEN {
        bail!("{kind}: sealed message is {} bytes, shorter than nonce and tag", sealed.len());
    }
    let cipher = C::new_from_slice(key).map_err(|e| anyhow!("{kind}: {e}"))?;
    let (nonce, rest) = sealed.split_at(NONCE_LEN);
    let (body, tag) = rest.split_at(rest.len() - TAG_LEN);
    let mut plaintext = body.to_vec();
    cipher
        .decrypt_in_place_detached(
            GenericArray::from_slice(nonce),
            b"",
            &mut plaintext,
            GenericArray::from_slice(tag),
        )
        .map_err(|e| anyhow!("{kind} decryption failed: {e}"))?;
    Ok(plaintext)
}

/// A 256-bit secret key.
#[derive(Clone)]
pub struct CipherKey([u8; KEY_LEN]);

impl CipherKey {
    pub fn generate() -> Self {
        let mut key = [0u8; KEY_LEN];
        OsRng.fill_bytes(&mut key);
        CipherKey(key)
    }

    #[cfg(test)]
    fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        CipherKey(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for CipherKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CipherKey(..)")
    }
}

/// One key per cipher, generated once for a whole benchmark run.
#[derive(Debug, Clone)]
pub struct KeySet {
    keys: [CipherKey; CipherKind::ALL.len()],
}

impl KeySet {
    pub fn generate() -> Self {
        KeySet {
            keys: CipherKind::ALL.map(|_| CipherKey::generate()),
        }
    }

    pub fn get(&self, kind: CipherKind) -> &CipherKey {
        &self.keys[kind.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() -> Result<()> {
        let keys = KeySet::generate();
        for kind in CipherKind::ALL {
            for plaintext in [&b""[..], b"Hello World", &[0xa5; 4097][..]] {
                let sealed = kind.encrypt(keys.get(kind), plaintext)?;
                assert_eq!(sealed.len(), NONCE_LEN + plaintext.len() + TAG_LEN);
                assert_eq!(kind.decrypt(keys.get(kind), &sealed)?, plaintext);
            }
        }
        Ok(())
    }

    #[test]
    fn test_nonce_is_fresh_per_call() -> Result<()> {
        for kind in CipherKind::ALL {
            let key = CipherKey::generate();
            let a = kind.encrypt(&key, b"same input")?;
            let b = kind.encrypt(&key, b"same input")?;
            assert_ne!(a[..NONCE_LEN], b[..NONCE_LEN]);
            assert_ne!(a, b);
        }
        Ok(())
    }

    #[test]
    fn test_aes_gcm_known_answer() -> Result<()> {
        // GCM test cases 13 and 14: zero key, zero IV.
        let key = CipherKey::from_bytes([0u8; KEY_LEN]);
        let nonce = [0u8; NONCE_LEN];

        let sealed = CipherKind::AesGcm.encrypt_with_nonce(&key, &nonce, b"")?;
        assert_eq!(hex::encode(&sealed[NONCE_LEN..]), "530f8afbc74536b9a963b4f1c4cb738b");

        let sealed = CipherKind::AesGcm.encrypt_with_nonce(&key, &nonce, &[0u8; 16])?;
        assert_eq!(&sealed[..NONCE_LEN], &nonce);
        assert_eq!(
            hex::encode(&sealed[NONCE_LEN..]),
            "cea7403d4d606b6e074ec5d3baf39d18d0d1c8a799996bf0265b98b5d48ab919"
        );
        Ok(())
    }

    #[test]
    fn test_tampered_ciphertext_is_rejected() -> Result<()> {
        for kind in CipherKind::ALL {
            let key = CipherKey::generate();
            let mut sealed = kind.encrypt(&key, b"attack at dawn")?;
            let last = sealed.len() - 1;
            sealed[last] ^= 0x01;
            assert!(kind.decrypt(&key, &sealed).is_err());
        }
        Ok(())
    }

    #[test]
    fn test_wrong_key_and_short_input() -> Result<()> {
        let keys = KeySet::generate();
        let sealed = CipherKind::ChaCha20Poly1305.encrypt(keys.get(CipherKind::ChaCha20Poly1305), b"x")?;
        assert!(CipherKind::ChaCha20Poly1305.decrypt(keys.get(CipherKind::AesGcm), &sealed).is_err());
        assert!(CipherKind::AesGcm.decrypt(keys.get(CipherKind::AesGcm), &[0u8; 27]).is_err());
        Ok(())
    }

    #[test]
    fn test_names() {
        assert_eq!(CipherKind::AesGcm.to_string(), "AES-GCM");
        assert_eq!(CipherKind::ChaCha20Poly1305.file_tag(), "ChaCha20-Poly1305");
        assert_eq!(CipherKey::generate().as_bytes().len(), KEY_LEN);
    }
}
