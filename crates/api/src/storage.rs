//! Object storage for uploaded files.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

/// Errors from the object store.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("object storage is not configured")]
    NotConfigured,

    #[error("object already exists: {0}")]
    AlreadyExists(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("storage returned status {status}: {message}")]
    Status { status: u16, message: String },
}

/// A bucket of publicly readable objects.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `bytes` at `path` without overwriting and return its public URL.
    async fn upload(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> Result<String, StorageError>;
}

/// Store used when no storage URL is configured; every upload fails.
#[derive(Debug, Clone, Default)]
pub struct UnconfiguredStore;

#[async_trait]
impl ObjectStore for UnconfiguredStore {
    async fn upload(&self, _path: &str, _bytes: Vec<u8>, _content_type: &str) -> Result<String, StorageError> {
        Err(StorageError::NotConfigured)
    }
}

/// Bucket behind a storage REST API (`/storage/v1/object/...`).
#[derive(Debug, Clone)]
pub struct HttpObjectStore {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    bucket: String,
}

impl HttpObjectStore {
    pub fn new(base_url: &str, api_key: Option<String>, bucket: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            bucket: bucket.into(),
        }
    }

    fn public_url(&self, path: &str) -> String {
        format!("{}/storage/v1/object/public/{}/{}", self.base_url, self.bucket, path)
    }
}

#[async_trait]
impl ObjectStore for HttpObjectStore {
    async fn upload(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> Result<String, StorageError> {
        let url = format!("{}/storage/v1/object/{}/{}", self.base_url, self.bucket, path);

        let mut request = self
            .client
            .post(&url)
            .header("content-type", content_type)
            .header("cache-control", "max-age=3600")
            .header("x-upsert", "false")
            .body(bytes);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key).header("apikey", key);
        }

        let response = request.send().await?;
        let status = response.status();
        if status == reqwest::StatusCode::CONFLICT {
            return Err(StorageError::AlreadyExists(path.to_string()));
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(StorageError::Status {
                status: status.as_u16(),
                message,
            });
        }

        info!("Uploaded {} to bucket {}", path, self.bucket);
        Ok(self.public_url(path))
    }
}

/// In-memory bucket.
#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    objects: Mutex<HashMap<String, (Vec<u8>, String)>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored bytes and content type of an object.
    pub fn get(&self, path: &str) -> Option<(Vec<u8>, String)> {
        self.objects.lock().ok()?.get(path).cloned()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn upload(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> Result<String, StorageError> {
        let mut objects = self
            .objects
            .lock()
            .map_err(|_| StorageError::NotConfigured)?;
        if objects.contains_key(path) {
            return Err(StorageError::AlreadyExists(path.to_string()));
        }
        objects.insert(path.to_string(), (bytes, content_type.to_string()));
        Ok(format!("memory://{}", path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_url() {
        let store = HttpObjectStore::new("https://storage.example/", None, "chatbot-files");
        assert_eq!(
            store.public_url("uploads/1-a.png"),
            "https://storage.example/storage/v1/object/public/chatbot-files/uploads/1-a.png"
        );
    }

    #[tokio::test]
    async fn test_memory_store_refuses_overwrite() {
        let store = MemoryObjectStore::new();
        store.upload("a", vec![1], "image/png").await.unwrap();
        assert!(matches!(
            store.upload("a", vec![2], "image/png").await,
            Err(StorageError::AlreadyExists(_))
        ));
        assert_eq!(store.get("a"), Some((vec![1], "image/png".to_string())));
    }
}
