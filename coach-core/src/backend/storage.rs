//! Photo Storage
//!
//! Blob storage for progress photos. Objects live in one public bucket and are
//! addressed by `<client_id>/<date>_<pose>.<ext>` style paths.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use reqwest::Method;
use serde_json::json;

use super::rest::RestContext;
use crate::domain::{DomainError, DomainResult};

/// Path segments keep their slashes; everything else unsafe is escaped
const PATH_SET: &AsciiSet = &CONTROLS.add(b' ').add(b'"').add(b'#').add(b'<').add(b'>').add(b'?').add(b'`').add(b'{').add(b'}');

/// MIME type for an uploaded file name, defaulting to `application/octet-stream`
pub fn content_type_for(file_name: &str) -> String {
    mime_guess::from_path(file_name)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait PhotoStorage: Send + Sync {
    /// Store (or overwrite) an object, returning its path
    async fn upload(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> DomainResult<String>;

    /// Publicly reachable URL of an object
    fn public_url(&self, path: &str) -> String;

    /// Delete objects; missing paths are ignored
    async fn remove(&self, paths: &[String]) -> DomainResult<()>;
}

/// The single storage client shared by repositories
pub type SharedStorage = Arc<dyn PhotoStorage>;

/// Storage API over HTTP
#[derive(Clone)]
pub struct RestStorage {
    ctx: RestContext,
}

impl RestStorage {
    pub fn new(ctx: RestContext) -> Self {
        Self { ctx }
    }

    fn object_url(&self, path: &str) -> String {
        let encoded = utf8_percent_encode(path.trim_start_matches('/'), PATH_SET);
        self.ctx
            .config()
            .storage_url(&format!("object/{}/{}", self.ctx.config().photo_bucket, encoded))
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl PhotoStorage for RestStorage {
    async fn upload(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> DomainResult<String> {
        if bytes.is_empty() {
            return Err(DomainError::InvalidInput("empty photo upload".into()));
        }
        let size = bytes.len();
        let request = self
            .ctx
            .request(Method::POST, &self.object_url(path))
            .header("Content-Type", content_type)
            .header("x-upsert", "true")
            .body(bytes);
        self.ctx.send(request).await?;
        log::info!("[STORAGE] uploaded {} ({} bytes)", path, size);
        Ok(path.to_string())
    }

    fn public_url(&self, path: &str) -> String {
        let encoded = utf8_percent_encode(path.trim_start_matches('/'), PATH_SET);
        self.ctx
            .config()
            .storage_url(&format!("object/public/{}/{}", self.ctx.config().photo_bucket, encoded))
    }

    async fn remove(&self, paths: &[String]) -> DomainResult<()> {
        if paths.is_empty() {
            return Ok(());
        }
        let url = self
            .ctx
            .config()
            .storage_url(&format!("object/{}", self.ctx.config().photo_bucket));
        let request = self
            .ctx
            .request(Method::DELETE, &url)
            .json(&json!({ "prefixes": paths }));
        self.ctx.send(request).await?;
        log::info!("[STORAGE] removed {} object(s)", paths.len());
        Ok(())
    }
}

/// In-process object store
#[derive(Default)]
pub struct MemoryStorage {
    objects: Mutex<HashMap<String, (String, Vec<u8>)>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.objects.lock().map(|o| o.contains_key(path)).unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.objects.lock().map(|o| o.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Content type recorded for an object
    pub fn content_type(&self, path: &str) -> Option<String> {
        self.objects
            .lock()
            .ok()
            .and_then(|o| o.get(path).map(|(ct, _)| ct.clone()))
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl PhotoStorage for MemoryStorage {
    async fn upload(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> DomainResult<String> {
        if bytes.is_empty() {
            return Err(DomainError::InvalidInput("empty photo upload".into()));
        }
        let mut objects = self
            .objects
            .lock()
            .map_err(|e| DomainError::Internal(e.to_string()))?;
        objects.insert(path.to_string(), (content_type.to_string(), bytes));
        Ok(path.to_string())
    }

    fn public_url(&self, path: &str) -> String {
        format!("memory://{}", path)
    }

    async fn remove(&self, paths: &[String]) -> DomainResult<()> {
        let mut objects = self
            .objects
            .lock()
            .map_err(|e| DomainError::Internal(e.to_string()))?;
        for path in paths {
            objects.remove(path);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BackendConfig;

    fn rest() -> RestStorage {
        RestStorage::new(RestContext::new(BackendConfig::new("https://demo.example.co", "anon")).unwrap())
    }

    #[test]
    fn test_content_type_for() {
        assert_eq!(content_type_for("front.jpg"), "image/jpeg");
        assert_eq!(content_type_for("side.PNG"), "image/png");
        assert_eq!(content_type_for("blob"), "application/octet-stream");
    }

    #[test]
    fn test_public_url() {
        assert_eq!(
            rest().public_url("c1/2024-05-01_front.jpg"),
            "https://demo.example.co/storage/v1/object/public/progress-photos/c1/2024-05-01_front.jpg"
        );
    }

    #[test]
    fn test_object_url_escapes_spaces() {
        assert_eq!(
            rest().object_url("c1/my photo.jpg"),
            "https://demo.example.co/storage/v1/object/progress-photos/c1/my%20photo.jpg"
        );
    }

    #[tokio::test]
    async fn test_memory_storage_roundtrip() {
        let storage = MemoryStorage::new();
        let path = storage.upload("c1/a.jpg", vec![1, 2, 3], "image/jpeg").await.unwrap();
        assert!(storage.contains(&path));
        assert_eq!(storage.content_type(&path).as_deref(), Some("image/jpeg"));
        storage.remove(&[path.clone(), "missing".into()]).await.unwrap();
        assert!(storage.is_empty());
    }

    #[tokio::test]
    async fn test_empty_upload_rejected() {
        let storage = MemoryStorage::new();
        assert!(storage.upload("c1/a.jpg", Vec::new(), "image/jpeg").await.is_err());
    }
}
