//! Disk-backed blob store. Payloads live beneath `base_path/{shard}/{shard}/{key}`
//! with two-level MD5 sharding to keep per-directory file counts low. Access
//! links are signed with HMAC-SHA256 and served by whatever fronts `public_url`.

use super::{BlobStore, StoreError, StoreResult};
use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose};
use bytes::Bytes;
use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
    time::Duration,
};
use tokio::{fs, io::AsyncWriteExt};
use tracing::debug;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

const MAX_BLOB_KEY_LEN: usize = 1024;

#[derive(Clone)]
pub struct DiskBlobStore {
    /// Base directory on disk where blob payloads are stored.
    base_path: PathBuf,

    /// External base URL that presigned links point at.
    public_url: String,

    /// Secret for HMAC link signatures.
    signing_secret: String,
}

impl DiskBlobStore {
    pub fn new(
        base_path: impl Into<PathBuf>,
        public_url: String,
        signing_secret: String,
    ) -> Self {
        Self {
            base_path: base_path.into(),
            public_url,
            signing_secret,
        }
    }

    /// Basic key validation to avoid trivial path traversal vectors.
    /// Keys are server-generated UUID-based names, so anything outside
    /// that shape is rejected outright.
    fn ensure_key_safe(&self, key: &str) -> StoreResult<()> {
        if key.is_empty() || key.len() > MAX_BLOB_KEY_LEN {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        if key.contains('/') || key.contains("..") {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        if key
            .bytes()
            .any(|b| b.is_ascii_control() || b == b'\\' || b == b'\0')
        {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(())
    }

    /// Two-level shard identifiers: first two bytes of MD5(key) as hex.
    fn shards(key: &str) -> (String, String) {
        let digest = md5::compute(key);
        (format!("{:02x}", digest[0]), format!("{:02x}", digest[1]))
    }

    /// Fully-qualified payload path `base_path/{shard}/{shard}/{key}`.
    fn blob_path(&self, key: &str) -> PathBuf {
        let (shard_a, shard_b) = Self::shards(key);
        let mut path = self.base_path.clone();
        path.push(shard_a);
        path.push(shard_b);
        path.push(key);
        path
    }

    /// HMAC-SHA256 over `key\nexpires_at`, base64 url-safe encoded.
    fn sign(&self, key: &str, expires_at: i64) -> String {
        let mut mac = HmacSha256::new_from_slice(self.signing_secret.as_bytes())
            .expect("HMAC accepts keys of any length");
        mac.update(key.as_bytes());
        mac.update(b"\n");
        mac.update(expires_at.to_string().as_bytes());
        general_purpose::URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes())
    }

    /// Remove empty shard directories up to (not including) the base path.
    /// Stops on the first non-empty or missing directory.
    async fn prune_empty_dirs(&self, start: &Path) {
        let mut current = start.to_path_buf();
        while current.starts_with(&self.base_path) && current != self.base_path {
            match fs::remove_dir(&current).await {
                Ok(_) => {
                    if let Some(parent) = current.parent() {
                        current = parent.to_path_buf();
                    } else {
                        break;
                    }
                }
                Err(err) if err.kind() == ErrorKind::NotFound => break,
                Err(err) if err.kind() == ErrorKind::DirectoryNotEmpty => break,
                Err(err) => {
                    debug!("failed to prune directory {}: {}", current.display(), err);
                    break;
                }
            }
        }
    }
}

#[async_trait]
impl BlobStore for DiskBlobStore {
    /// Write the payload durably: temp file, fsync, atomic rename.
    async fn put(&self, key: &str, data: Bytes) -> StoreResult<()> {
        self.ensure_key_safe(key)?;

        let file_path = self.blob_path(key);
        let parent = file_path
            .parent()
            .map(Path::to_path_buf)
            .ok_or_else(|| StoreError::InvalidKey(key.to_string()))?;
        fs::create_dir_all(&parent).await?;

        let tmp_path = parent.join(format!(".tmp-{}", Uuid::new_v4()));
        let mut file = fs::File::create(&tmp_path).await?;
        if let Err(err) = file.write_all(&data).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(StoreError::Io(err));
        }
        if let Err(err) = file.sync_all().await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(StoreError::Io(err));
        }

        if let Err(err) = fs::rename(&tmp_path, &file_path).await {
            if err.kind() == ErrorKind::AlreadyExists {
                fs::remove_file(&file_path).await?;
                fs::rename(&tmp_path, &file_path).await?;
            } else {
                let _ = fs::remove_file(&tmp_path).await;
                return Err(StoreError::Io(err));
            }
        }

        Ok(())
    }

    async fn get(&self, key: &str) -> StoreResult<Bytes> {
        self.ensure_key_safe(key)?;
        match fs::read(self.blob_path(key)).await {
            Ok(bytes) => Ok(Bytes::from(bytes)),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                Err(StoreError::BlobNotFound(key.to_string()))
            }
            Err(err) => Err(StoreError::Io(err)),
        }
    }

    /// Remove the payload; a missing file is treated as already deleted.
    async fn delete(&self, key: &str) -> StoreResult<()> {
        self.ensure_key_safe(key)?;
        let file_path = self.blob_path(key);
        match fs::remove_file(&file_path).await {
            Ok(_) => debug!("removed blob file {}", file_path.display()),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!("blob file {} already missing", file_path.display());
            }
            Err(err) => return Err(StoreError::Io(err)),
        }

        if let Some(parent) = file_path.parent() {
            self.prune_empty_dirs(parent).await;
        }

        Ok(())
    }

    async fn presigned_url(&self, key: &str, expires_in: Duration) -> StoreResult<String> {
        self.ensure_key_safe(key)?;
        let expires_at = Utc::now().timestamp() + expires_in.as_secs() as i64;
        let signature = self.sign(key, expires_at);
        Ok(format!(
            "{}/{}?expires={}&signature={}",
            self.public_url.trim_end_matches('/'),
            key,
            expires_at,
            signature
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::blob_key;

    fn store(dir: &Path) -> DiskBlobStore {
        DiskBlobStore::new(
            dir,
            "http://localhost:3000/blobs".to_string(),
            "test-secret".to_string(),
        )
    }

    #[tokio::test]
    async fn put_get_delete_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        let key = blob_key("11111111-2222-3333-4444-555555555555");

        store.put(&key, Bytes::from_static(b"payload")).await.unwrap();
        assert_eq!(store.get(&key).await.unwrap().as_ref(), b"payload");

        store.delete(&key).await.unwrap();
        assert!(matches!(
            store.get(&key).await,
            Err(StoreError::BlobNotFound(_))
        ));
    }

    #[tokio::test]
    async fn put_overwrites_existing_blob() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());

        store.put("a.jpg", Bytes::from_static(b"one")).await.unwrap();
        store.put("a.jpg", Bytes::from_static(b"two")).await.unwrap();
        assert_eq!(store.get("a.jpg").await.unwrap().as_ref(), b"two");
    }

    #[tokio::test]
    async fn delete_of_absent_key_is_success() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        store.delete("never-written.jpg").await.unwrap();
    }

    #[tokio::test]
    async fn delete_prunes_empty_shard_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());

        store.put("a.jpg", Bytes::from_static(b"x")).await.unwrap();
        store.delete("a.jpg").await.unwrap();

        let mut entries = fs::read_dir(dir.path()).await.unwrap();
        assert!(entries.next_entry().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn rejects_path_traversal_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());

        for key in ["", "../etc/passwd", "a/b.jpg", "a\\b.jpg"] {
            assert!(matches!(
                store.put(key, Bytes::from_static(b"x")).await,
                Err(StoreError::InvalidKey(_))
            ));
        }
    }

    #[tokio::test]
    async fn presigned_url_carries_key_expiry_and_signature() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());

        let url = store
            .presigned_url("some-id.jpg", Duration::from_secs(3600))
            .await
            .unwrap();
        assert!(url.starts_with("http://localhost:3000/blobs/some-id.jpg?expires="));

        let expires: i64 = url
            .split("expires=")
            .nth(1)
            .and_then(|rest| rest.split('&').next())
            .unwrap()
            .parse()
            .unwrap();
        let now = Utc::now().timestamp();
        assert!(expires >= now + 3598 && expires <= now + 3602);

        let signature = url.split("signature=").nth(1).unwrap();
        assert_eq!(signature, store.sign("some-id.jpg", expires));
    }

    #[tokio::test]
    async fn signature_depends_on_key_and_expiry() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());

        let sig = store.sign("a.jpg", 1_000);
        assert_ne!(sig, store.sign("b.jpg", 1_000));
        assert_ne!(sig, store.sign("a.jpg", 1_001));
    }

    #[tokio::test]
    async fn healthy_round_trips_a_probe_blob() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        store.healthy().await.unwrap();
    }
}
