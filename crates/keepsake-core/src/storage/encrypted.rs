//! Encrypted key-value storage adapter.
//!
//! A byte-oriented get/set/delete/clear primitive over the SQLite store,
//! with AES-256-GCM encryption at rest. Values written under a different
//! master key (for example after keystore loss) fail authentication on
//! read and are treated as absent rather than as an error.

use aes_gcm::{
    aead::{Aead, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use rand::RngCore;
use sqlx::{Row, SqlitePool};

use crate::domain::security::MasterKey;
use crate::error::{Error, Result};
use crate::storage::database::Database;

/// Size of an AES-GCM nonce in bytes
const NONCE_SIZE: usize = 12;

/// Encrypted byte store over a single `state_entries` table.
///
/// Opened once per process with the provisioned master key;
/// single-process access mode (no other process may open the same store
/// file). Cheap to clone, the pool is shared.
#[derive(Clone)]
pub struct EncryptedStore {
    pool: SqlitePool,
    key: MasterKey,
}

impl EncryptedStore {
    /// Open the encrypted store over an initialized database.
    pub fn new(database: &Database, key: MasterKey) -> Self {
        Self {
            pool: database.pool().clone(),
            key,
        }
    }

    fn cipher(&self) -> Result<Aes256Gcm> {
        Aes256Gcm::new_from_slice(self.key.as_bytes())
            .map_err(|e| Error::Crypto(e.to_string()))
    }

    /// Read and decrypt the value stored under `key`.
    ///
    /// Returns `None` for absent rows and for rows that cannot be decoded
    /// or fail AEAD authentication (tampered data, or data written under a
    /// previous master key). Only database failures propagate.
    pub async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let row = sqlx::query("SELECT nonce, ciphertext FROM state_entries WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let nonce_b64: String = row.get("nonce");
        let ciphertext_b64: String = row.get("ciphertext");

        match self.decrypt(&nonce_b64, &ciphertext_b64) {
            Ok(plaintext) => Ok(Some(plaintext)),
            Err(e) => {
                tracing::warn!(
                    key = %key,
                    error = %e,
                    "Stored entry is unreadable, treating as absent"
                );
                Ok(None)
            }
        }
    }

    /// Encrypt and store `value` under `key`, replacing any existing value.
    pub async fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        let mut nonce_bytes = [0u8; NONCE_SIZE];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = self
            .cipher()?
            .encrypt(nonce, value)
            .map_err(|e| Error::Crypto(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO state_entries (key, nonce, ciphertext)
            VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET
                nonce = excluded.nonce,
                ciphertext = excluded.ciphertext,
                updated_at = CURRENT_TIMESTAMP
            "#,
        )
        .bind(key)
        .bind(STANDARD.encode(nonce_bytes))
        .bind(STANDARD.encode(&ciphertext))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Delete the value stored under `key`. Deleting an absent key is a
    /// no-op.
    pub async fn delete(&self, key: &str) -> Result<()> {
        sqlx::query("DELETE FROM state_entries WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Remove every entry in the store.
    pub async fn clear_all(&self) -> Result<()> {
        sqlx::query("DELETE FROM state_entries")
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    fn decrypt(&self, nonce_b64: &str, ciphertext_b64: &str) -> Result<Vec<u8>> {
        let nonce_bytes = STANDARD
            .decode(nonce_b64)
            .map_err(|e| Error::Crypto(format!("Invalid nonce: {}", e)))?;

        if nonce_bytes.len() != NONCE_SIZE {
            return Err(Error::Crypto(format!(
                "Invalid nonce length: expected {}, got {}",
                NONCE_SIZE,
                nonce_bytes.len()
            )));
        }

        let ciphertext = STANDARD
            .decode(ciphertext_b64)
            .map_err(|e| Error::Crypto(format!("Invalid ciphertext: {}", e)))?;

        let nonce = Nonce::from_slice(&nonce_bytes);
        self.cipher()?
            .decrypt(nonce, ciphertext.as_ref())
            .map_err(|_| Error::Crypto("Decryption failed (wrong key or corrupted data)".to_string()))
    }
}

impl std::fmt::Debug for EncryptedStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptedStore")
            .field("key", &"[REDACTED]")
            .finish()
    }
}
