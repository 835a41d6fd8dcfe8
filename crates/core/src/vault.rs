//! Credential vault: authenticated encryption for long-lived access tokens.
//!
//! Tokens are sealed with AES-256-GCM before they ever reach the tenant
//! record store. The wire layout of a sealed blob is
//! `IV(16) || TAG(16) || CIPHERTEXT`, hex-encoded at rest. Historical
//! records may carry the same bytes base64-encoded, so [`Vault::decrypt`]
//! auto-detects between the two encodings; anything else is a hard
//! decode failure.

use aes_gcm::aead::consts::U16;
use aes_gcm::aead::{AeadInPlace, KeyInit};
use aes_gcm::aes::Aes256;
use aes_gcm::{AesGcm, Key, Nonce, Tag};
use base64::Engine as _;
use rand::RngCore;
use sha2::Sha512;

/// AES-256-GCM with a 16-byte nonce (the blob format predates the
/// 12-byte convention and is frozen for compatibility).
type Cipher = AesGcm<Aes256, U16>;

/// Nonce length in bytes.
const IV_LEN: usize = 16;

/// Authentication tag length in bytes.
const TAG_LEN: usize = 16;

/// Minimum raw blob length: IV + TAG with an empty ciphertext.
const MIN_BLOB_LEN: usize = IV_LEN + TAG_LEN;

/// Associated data binding ciphertexts to their purpose. A blob sealed
/// here cannot be replayed against a different AES-GCM context.
const PURPOSE_AAD: &[u8] = b"comanda.credential.v1";

/// PBKDF2 iteration count for passphrase-derived keys.
const KDF_ITERATIONS: u32 = 100_000;

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Failures while sealing or opening a credential blob.
///
/// Decryption failures are deliberately fine-grained so callers can log
/// the exact reason; none of them should ever be collapsed into a
/// silent empty result.
#[derive(Debug, thiserror::Error)]
pub enum VaultError {
    /// Key material is missing or malformed (bad hex, wrong length,
    /// missing salt for passphrase derivation).
    #[error("Vault key configuration error: {0}")]
    KeyConfig(String),

    /// The blob is shorter than IV + TAG and cannot be sliced.
    #[error("Encrypted blob too short: {len} bytes (minimum {MIN_BLOB_LEN})")]
    TooShort { len: usize },

    /// The blob is neither valid hex nor valid base64.
    #[error("Encrypted blob uses an unknown encoding")]
    UnknownEncoding,

    /// The authentication tag did not verify (corrupt or foreign blob).
    #[error("Decryption failed: authentication tag mismatch")]
    AuthFailed,

    /// The recovered plaintext is not valid UTF-8.
    #[error("Decrypted value is not valid UTF-8")]
    NotUtf8,
}

// ---------------------------------------------------------------------------
// Vault
// ---------------------------------------------------------------------------

/// Symmetric vault for credential fields.
///
/// Cheap to clone; holds only the 32-byte key.
#[derive(Clone)]
pub struct Vault {
    key: [u8; 32],
}

impl std::fmt::Debug for Vault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print key material.
        f.debug_struct("Vault").finish_non_exhaustive()
    }
}

impl Vault {
    /// Create a vault from a raw 32-byte key.
    pub fn new(key: [u8; 32]) -> Self {
        Self { key }
    }

    /// Create a vault from a 64-character hex-encoded key.
    pub fn from_hex_key(hex_key: &str) -> Result<Self, VaultError> {
        let bytes = hex::decode(hex_key.trim())
            .map_err(|_| VaultError::KeyConfig("key is not valid hex".into()))?;
        let key: [u8; 32] = bytes
            .try_into()
            .map_err(|_| VaultError::KeyConfig("key must be exactly 32 bytes".into()))?;
        Ok(Self { key })
    }

    /// Derive a vault key from a passphrase via PBKDF2-HMAC-SHA512.
    ///
    /// The salt is supplied by the deployment (environment), never
    /// hard-coded. Used only when a direct hex key is absent.
    pub fn from_passphrase(passphrase: &str, salt: &str) -> Result<Self, VaultError> {
        if salt.is_empty() {
            return Err(VaultError::KeyConfig("key derivation salt is empty".into()));
        }
        let mut key = [0u8; 32];
        pbkdf2::pbkdf2_hmac::<Sha512>(
            passphrase.as_bytes(),
            salt.as_bytes(),
            KDF_ITERATIONS,
            &mut key,
        );
        Ok(Self { key })
    }

    /// Build a vault from environment variables.
    ///
    /// | Env Var                 | Meaning                              |
    /// |-------------------------|--------------------------------------|
    /// | `CREDENTIAL_KEY`        | 64 hex chars, used directly          |
    /// | `CREDENTIAL_PASSPHRASE` | fallback passphrase (requires salt)  |
    /// | `CREDENTIAL_SALT`       | KDF salt for the passphrase path     |
    pub fn from_env() -> Result<Self, VaultError> {
        if let Ok(hex_key) = std::env::var("CREDENTIAL_KEY") {
            return Self::from_hex_key(&hex_key);
        }
        let passphrase = std::env::var("CREDENTIAL_PASSPHRASE").map_err(|_| {
            VaultError::KeyConfig("neither CREDENTIAL_KEY nor CREDENTIAL_PASSPHRASE is set".into())
        })?;
        let salt = std::env::var("CREDENTIAL_SALT")
            .map_err(|_| VaultError::KeyConfig("CREDENTIAL_SALT must be set".into()))?;
        Self::from_passphrase(&passphrase, &salt)
    }

    // -----------------------------------------------------------------------
    // Seal / open
    // -----------------------------------------------------------------------

    /// Encrypt a plaintext credential into a hex-encoded blob.
    ///
    /// The empty string passes through unchanged so that unset optional
    /// fields never produce a sealed-empty blob.
    pub fn encrypt(&self, plaintext: &str) -> Result<String, VaultError> {
        if plaintext.is_empty() {
            return Ok(String::new());
        }

        let cipher = Cipher::new(Key::<Cipher>::from_slice(&self.key));

        let mut iv = [0u8; IV_LEN];
        rand::rng().fill_bytes(&mut iv);
        let nonce = Nonce::<U16>::from_slice(&iv);

        let mut buffer = plaintext.as_bytes().to_vec();
        let tag = cipher
            .encrypt_in_place_detached(nonce, PURPOSE_AAD, &mut buffer)
            .map_err(|_| VaultError::AuthFailed)?;

        let mut blob = Vec::with_capacity(MIN_BLOB_LEN + buffer.len());
        blob.extend_from_slice(&iv);
        blob.extend_from_slice(&tag);
        blob.extend_from_slice(&buffer);
        Ok(hex::encode(blob))
    }

    /// Decrypt a blob produced by [`encrypt`](Self::encrypt).
    ///
    /// Accepts the blob hex- or base64-encoded (auto-detected). Each
    /// failure mode maps to a distinct [`VaultError`] variant so the
    /// caller can log exactly what was wrong.
    pub fn decrypt(&self, blob: &str) -> Result<String, VaultError> {
        if blob.is_empty() {
            return Ok(String::new());
        }

        let raw = decode_blob(blob)?;
        if raw.len() < MIN_BLOB_LEN {
            return Err(VaultError::TooShort { len: raw.len() });
        }

        let (iv, rest) = raw.split_at(IV_LEN);
        let (tag, ciphertext) = rest.split_at(TAG_LEN);

        let cipher = Cipher::new(Key::<Cipher>::from_slice(&self.key));
        let nonce = Nonce::<U16>::from_slice(iv);

        let mut buffer = ciphertext.to_vec();
        cipher
            .decrypt_in_place_detached(nonce, PURPOSE_AAD, &mut buffer, Tag::from_slice(tag))
            .map_err(|_| VaultError::AuthFailed)?;

        String::from_utf8(buffer).map_err(|_| VaultError::NotUtf8)
    }

    /// Whether a stored value is a blob this vault can open.
    ///
    /// Defined purely as "does decrypt succeed". Used before writes to
    /// avoid double-encrypting a value that is already ciphertext.
    pub fn is_encrypted(&self, value: &str) -> bool {
        self.decrypt(value).is_ok()
    }
}

// ---------------------------------------------------------------------------
// Encoding normalization
// ---------------------------------------------------------------------------

/// Decode a blob string to raw bytes, auto-detecting hex vs base64.
///
/// Hex wins when the string could be either (the primary at-rest
/// encoding); base64 is tried second for historical records.
fn decode_blob(blob: &str) -> Result<Vec<u8>, VaultError> {
    let trimmed = blob.trim();

    if trimmed.len() % 2 == 0 && trimmed.bytes().all(|b| b.is_ascii_hexdigit()) {
        if let Ok(raw) = hex::decode(trimmed) {
            return Ok(raw);
        }
    }

    base64::engine::general_purpose::STANDARD
        .decode(trimmed)
        .map_err(|_| VaultError::UnknownEncoding)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn test_vault() -> Vault {
        Vault::new([7u8; 32])
    }

    // -- Round trip --------------------------------------------------------

    #[test]
    fn decrypt_inverts_encrypt() {
        let vault = test_vault();
        let blob = vault.encrypt("EAAG-access-token-123").unwrap();
        assert_eq!(vault.decrypt(&blob).unwrap(), "EAAG-access-token-123");
    }

    #[test]
    fn empty_string_passes_through() {
        let vault = test_vault();
        assert_eq!(vault.encrypt("").unwrap(), "");
        assert_eq!(vault.decrypt("").unwrap(), "");
    }

    #[test]
    fn round_trips_unicode() {
        let vault = test_vault();
        let blob = vault.encrypt("contraseña-ñ-日本語").unwrap();
        assert_eq!(vault.decrypt(&blob).unwrap(), "contraseña-ñ-日本語");
    }

    #[test]
    fn blob_is_hex_with_iv_and_tag_prefix() {
        let vault = test_vault();
        let blob = vault.encrypt("x").unwrap();
        assert!(blob.bytes().all(|b| b.is_ascii_hexdigit()));
        // IV(16) + TAG(16) + 1 byte ciphertext = 33 bytes = 66 hex chars.
        assert_eq!(blob.len(), 66);
    }

    #[test]
    fn each_encryption_uses_a_fresh_nonce() {
        let vault = test_vault();
        let a = vault.encrypt("same-token").unwrap();
        let b = vault.encrypt("same-token").unwrap();
        assert_ne!(a, b);
        // Both still open to the same plaintext.
        assert_eq!(vault.decrypt(&a).unwrap(), vault.decrypt(&b).unwrap());
    }

    // -- Encoding tolerance ------------------------------------------------

    #[test]
    fn hex_and_base64_encodings_decrypt_identically() {
        let vault = test_vault();
        let hex_blob = vault.encrypt("legacy-token").unwrap();
        let raw = hex::decode(&hex_blob).unwrap();
        let b64_blob = base64::engine::general_purpose::STANDARD.encode(&raw);

        assert_eq!(vault.decrypt(&hex_blob).unwrap(), "legacy-token");
        assert_eq!(vault.decrypt(&b64_blob).unwrap(), "legacy-token");
    }

    #[test]
    fn unknown_encoding_is_rejected() {
        let vault = test_vault();
        let err = vault.decrypt("not/valid!!encoding~~~").unwrap_err();
        assert_matches!(err, VaultError::UnknownEncoding);
    }

    // -- Validation --------------------------------------------------------

    #[test]
    fn blob_shorter_than_iv_plus_tag_is_rejected() {
        let vault = test_vault();
        // 62 hex chars = 31 raw bytes, one short of the minimum.
        let err = vault.decrypt(&"ab".repeat(31)).unwrap_err();
        assert_matches!(err, VaultError::TooShort { len: 31 });
    }

    #[test]
    fn tampered_ciphertext_fails_authentication() {
        let vault = test_vault();
        let blob = vault.encrypt("token").unwrap();
        let mut raw = hex::decode(&blob).unwrap();
        let last = raw.len() - 1;
        raw[last] ^= 0xff;
        let err = vault.decrypt(&hex::encode(raw)).unwrap_err();
        assert_matches!(err, VaultError::AuthFailed);
    }

    #[test]
    fn foreign_key_fails_authentication() {
        let blob = test_vault().encrypt("token").unwrap();
        let other = Vault::new([9u8; 32]);
        assert_matches!(other.decrypt(&blob).unwrap_err(), VaultError::AuthFailed);
    }

    // -- is_encrypted ------------------------------------------------------

    #[test]
    fn is_encrypted_detects_own_blobs() {
        let vault = test_vault();
        let blob = vault.encrypt("token").unwrap();
        assert!(vault.is_encrypted(&blob));
        assert!(!vault.is_encrypted("plaintext-token"));
    }

    // -- Key material ------------------------------------------------------

    #[test]
    fn from_hex_key_rejects_wrong_length() {
        assert_matches!(
            Vault::from_hex_key("abcd").unwrap_err(),
            VaultError::KeyConfig(_)
        );
    }

    #[test]
    fn from_hex_key_rejects_non_hex() {
        assert_matches!(
            Vault::from_hex_key(&"zz".repeat(32)).unwrap_err(),
            VaultError::KeyConfig(_)
        );
    }

    #[test]
    fn passphrase_derivation_is_deterministic() {
        let a = Vault::from_passphrase("secret", "salt-1").unwrap();
        let b = Vault::from_passphrase("secret", "salt-1").unwrap();
        let blob = a.encrypt("token").unwrap();
        assert_eq!(b.decrypt(&blob).unwrap(), "token");
    }

    #[test]
    fn passphrase_requires_salt() {
        assert_matches!(
            Vault::from_passphrase("secret", "").unwrap_err(),
            VaultError::KeyConfig(_)
        );
    }

    #[test]
    fn different_salts_derive_different_keys() {
        let a = Vault::from_passphrase("secret", "salt-1").unwrap();
        let b = Vault::from_passphrase("secret", "salt-2").unwrap();
        let blob = a.encrypt("token").unwrap();
        assert_matches!(b.decrypt(&blob).unwrap_err(), VaultError::AuthFailed);
    }
}
