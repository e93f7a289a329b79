//! Passphrase-encrypted token file, for hosts without a usable keychain.
//!
//! The file is a small JSON envelope. The token is sealed with
//! ChaCha20-Poly1305 under a key derived from the passphrase with Argon2id;
//! a fresh salt and nonce are drawn for every write.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use argon2::Argon2;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chacha20poly1305::aead::{Aead, KeyInit};
use chacha20poly1305::{ChaCha20Poly1305, Key, Nonce};
use chrono::{DateTime, Utc};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::Token;

use super::{CredentialStore, StoreError};

const ENVELOPE_VERSION: u8 = 1;
const SALT_LEN: usize = 16;
const NONCE_LEN: usize = 12;
const KEY_LEN: usize = 32;

#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    version: u8,
    salt: String,
    nonce: String,
    ciphertext: String,
    saved_at: DateTime<Utc>,
}

pub struct EncryptedFileStore {
    path: PathBuf,
    passphrase: String,
}

impl EncryptedFileStore {
    pub fn new(path: impl Into<PathBuf>, passphrase: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            passphrase: passphrase.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn derive_key(&self, salt: &[u8]) -> Result<[u8; KEY_LEN], StoreError> {
        let mut key = [0u8; KEY_LEN];
        Argon2::default()
            .hash_password_into(self.passphrase.as_bytes(), salt, &mut key)
            .map_err(|e| StoreError::Crypto(e.to_string()))?;
        Ok(key)
    }

    fn seal(&self, token: &Token) -> Result<Envelope, StoreError> {
        let mut salt = [0u8; SALT_LEN];
        let mut nonce = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut salt);
        OsRng.fill_bytes(&mut nonce);

        let key = self.derive_key(&salt)?;
        let cipher = ChaCha20Poly1305::new(Key::from_slice(&key));
        let ciphertext = cipher
            .encrypt(Nonce::from_slice(&nonce), token.as_str().as_bytes())
            .map_err(|e| StoreError::Crypto(e.to_string()))?;

        Ok(Envelope {
            version: ENVELOPE_VERSION,
            salt: STANDARD.encode(salt),
            nonce: STANDARD.encode(nonce),
            ciphertext: STANDARD.encode(ciphertext),
            saved_at: Utc::now(),
        })
    }

    fn open(&self, envelope: &Envelope) -> Result<Token, StoreError> {
        if envelope.version != ENVELOPE_VERSION {
            return Err(StoreError::Format(format!(
                "unsupported version {}",
                envelope.version
            )));
        }

        let decode = |field: &str, value: &str| {
            STANDARD
                .decode(value)
                .map_err(|e| StoreError::Format(format!("{}: {}", field, e)))
        };
        let salt = decode("salt", &envelope.salt)?;
        let nonce = decode("nonce", &envelope.nonce)?;
        let ciphertext = decode("ciphertext", &envelope.ciphertext)?;
        if nonce.len() != NONCE_LEN {
            return Err(StoreError::Format(format!("nonce must be {} bytes", NONCE_LEN)));
        }

        let key = self.derive_key(&salt)?;
        let cipher = ChaCha20Poly1305::new(Key::from_slice(&key));
        let plaintext = cipher
            .decrypt(Nonce::from_slice(&nonce), ciphertext.as_slice())
            .map_err(|_| StoreError::Crypto("wrong passphrase or corrupted file".to_string()))?;

        let value = String::from_utf8(plaintext)
            .map_err(|e| StoreError::Format(format!("token is not UTF-8: {}", e)))?;
        Ok(Token::new(value))
    }

    fn write_private(&self, contents: &str) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let tmp = self.path.with_extension("json.tmp");
        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = options.open(&tmp)?;
        file.write_all(contents.as_bytes())?;
        file.sync_all()?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl CredentialStore for EncryptedFileStore {
    fn get(&self) -> Result<Option<Token>, StoreError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let envelope: Envelope =
            serde_json::from_str(&contents).map_err(|e| StoreError::Format(e.to_string()))?;
        self.open(&envelope).map(Some)
    }

    fn set(&self, token: &Token) -> Result<(), StoreError> {
        let envelope = self.seal(token)?;
        let contents = serde_json::to_string_pretty(&envelope)
            .map_err(|e| StoreError::Format(e.to_string()))?;
        self.write_private(&contents)?;
        debug!(path = %self.path.display(), "Stored encrypted token");
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
