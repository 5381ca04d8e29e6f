use std::path::{Path, PathBuf};

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::info;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Failed to access object store: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse object metadata: {0}")]
    MetadataError(#[from] serde_json::Error),
    #[error("Failed to sign object url: {0}")]
    SigningError(#[from] jsonwebtoken::errors::Error),
    #[error("Invalid or expired object token")]
    InvalidToken,
    #[error("Invalid object key: {0}")]
    InvalidKey(String),
    #[error("Object not found: {0}")]
    NotFound(String),
}

/// Filesystem-backed object store for receipt images.
///
/// Objects live under `root_dir` keyed by their object path, with a JSON
/// metadata sidecar per object. Download links are time-limited: a signed
/// token bound to the object key is appended to the URL and verified when
/// the object is served.
#[derive(Clone)]
pub struct ReceiptStore {
    root_dir: PathBuf,
    base_url: String,
    signing_key: String,
    url_ttl: Duration,
}

#[derive(Debug, Serialize, Deserialize)]
struct ObjectMetadata {
    content_type: String,
    size: u64,
    #[serde(with = "time::serde::rfc3339")]
    stored_at: OffsetDateTime,
}

#[derive(Debug, Serialize, Deserialize)]
struct ObjectTokenClaims {
    sub: String,
    exp: i64,
}

impl ReceiptStore {
    pub fn new(
        root_dir: PathBuf,
        base_url: impl Into<String>,
        signing_key: impl Into<String>,
        url_ttl: Duration,
    ) -> Self {
        Self {
            root_dir,
            base_url: base_url.into(),
            signing_key: signing_key.into(),
            url_ttl,
        }
    }

    pub async fn initialize(&self) -> Result<(), StorageError> {
        fs::create_dir_all(&self.root_dir).await?;

        let gitignore_path = self.root_dir.join(".gitignore");
        if !gitignore_path.exists() {
            fs::write(&gitignore_path, "*\n!.gitignore\n").await?;
        }

        info!("Object store initialized at: {}", self.root_dir.display());
        Ok(())
    }

    pub async fn put_object(
        &self,
        key: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<(), StorageError> {
        let object_path = self.object_path(key)?;
        if let Some(parent) = object_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let mut file = fs::File::create(&object_path).await?;
        file.write_all(bytes).await?;
        file.flush().await?;

        let metadata = ObjectMetadata {
            content_type: content_type.to_string(),
            size: bytes.len() as u64,
            stored_at: OffsetDateTime::now_utc(),
        };
        let metadata_json = serde_json::to_string_pretty(&metadata)?;
        fs::write(self.metadata_path(&object_path), metadata_json).await?;

        info!("Stored object {} ({} bytes)", key, bytes.len());
        Ok(())
    }

    pub async fn get_object(&self, key: &str) -> Result<(Vec<u8>, String), StorageError> {
        let object_path = self.object_path(key)?;
        let metadata_path = self.metadata_path(&object_path);

        if !object_path.exists() || !metadata_path.exists() {
            return Err(StorageError::NotFound(key.to_string()));
        }

        let metadata: ObjectMetadata =
            serde_json::from_str(&fs::read_to_string(&metadata_path).await?)?;
        let bytes = fs::read(&object_path).await?;

        Ok((bytes, metadata.content_type))
    }

    /// A retrievable URL for the object, valid for the configured TTL.
    pub fn signed_url(&self, key: &str) -> Result<String, StorageError> {
        let claims = ObjectTokenClaims {
            sub: key.to_string(),
            exp: (OffsetDateTime::now_utc() + self.url_ttl).unix_timestamp(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.signing_key.as_bytes()),
        )?;

        Ok(format!("{}/files/{}?token={}", self.base_url, key, token))
    }

    /// Check that a download token is unexpired and bound to this key.
    pub fn verify_token(&self, key: &str, token: &str) -> Result<(), StorageError> {
        let data = decode::<ObjectTokenClaims>(
            token,
            &DecodingKey::from_secret(self.signing_key.as_bytes()),
            &Validation::default(),
        )
        .map_err(|_| StorageError::InvalidToken)?;

        if data.claims.sub != key {
            return Err(StorageError::InvalidToken);
        }

        Ok(())
    }

    fn object_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        // Keys are relative paths; anything that could escape the root is rejected.
        let is_valid = !key.is_empty()
            && !key.starts_with('/')
            && Path::new(key)
                .components()
                .all(|c| matches!(c, std::path::Component::Normal(_)));
        if !is_valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }

        Ok(self.root_dir.join(key))
    }

    fn metadata_path(&self, object_path: &Path) -> PathBuf {
        let mut path = object_path.as_os_str().to_owned();
        path.push(".meta.json");
        PathBuf::from(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(root: &Path) -> ReceiptStore {
        ReceiptStore::new(
            root.to_path_buf(),
            "http://127.0.0.1:8000",
            "test-signing-key",
            Duration::minutes(15),
        )
    }

    #[tokio::test]
    async fn put_then_get_roundtrips_bytes_and_content_type() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        store.initialize().await.unwrap();

        store
            .put_object("receipts/abc-receipt.png", b"fake-png", "image/png")
            .await
            .unwrap();

        let (bytes, content_type) = store.get_object("receipts/abc-receipt.png").await.unwrap();
        assert_eq!(bytes, b"fake-png");
        assert_eq!(content_type, "image/png");
    }

    #[tokio::test]
    async fn missing_object_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        store.initialize().await.unwrap();

        let err = store.get_object("receipts/nope.png").await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
    }

    #[test]
    fn signed_url_token_verifies_for_its_key_only() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());

        let url = store.signed_url("receipts/abc-receipt.png").unwrap();
        let token = url.split("token=").nth(1).unwrap();

        assert!(store.verify_token("receipts/abc-receipt.png", token).is_ok());
        assert!(matches!(
            store.verify_token("receipts/other.png", token).unwrap_err(),
            StorageError::InvalidToken
        ));
    }

    #[test]
    fn expired_token_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let expired = ReceiptStore::new(
            dir.path().to_path_buf(),
            "http://127.0.0.1:8000",
            "test-signing-key",
            Duration::hours(-2),
        );

        let url = expired.signed_url("receipts/abc-receipt.png").unwrap();
        let token = url.split("token=").nth(1).unwrap();

        assert!(matches!(
            expired
                .verify_token("receipts/abc-receipt.png", token)
                .unwrap_err(),
            StorageError::InvalidToken
        ));
    }

    #[test]
    fn keys_escaping_the_root_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());

        for key in ["../secrets", "/etc/passwd", "receipts/../../x", ""] {
            assert!(matches!(
                store.object_path(key).unwrap_err(),
                StorageError::InvalidKey(_)
            ));
        }
    }
}
