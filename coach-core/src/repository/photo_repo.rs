//! Progress Photo Repository
//!
//! A photo is an object in the photo bucket plus a `progress_photos` row pointing at it.

use chrono::NaiveDate;
use uuid::Uuid;

use super::table_repo::TableRepository;
use super::traits::Repository;
use crate::backend::{content_type_for, Query, SharedBackend, SharedStorage};
use crate::domain::{photo_pair, DomainResult, PhotoPair, PhotoPose, ProgressPhoto};

#[derive(Clone)]
pub struct PhotoRepository {
    rows: TableRepository<ProgressPhoto>,
    storage: SharedStorage,
}

/// Object path for a new photo: `<client>/<date>_<pose>_<id>.<ext>`
pub fn photo_path(client_id: Uuid, date: NaiveDate, pose: PhotoPose, photo_id: Uuid, file_name: &str) -> String {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .filter(|ext| !ext.is_empty() && ext.len() <= 5)
        .unwrap_or_else(|| "jpg".to_string());
    format!("{}/{}_{}_{}.{}", client_id, date, pose.as_str(), photo_id.simple(), ext)
}

impl PhotoRepository {
    pub fn new(backend: SharedBackend, storage: SharedStorage) -> Self {
        Self {
            rows: TableRepository::new(backend),
            storage,
        }
    }

    /// Upload the image, then record its row
    pub async fn upload(
        &self,
        client_id: Uuid,
        date: NaiveDate,
        pose: PhotoPose,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> DomainResult<ProgressPhoto> {
        let id = Uuid::new_v4();
        let path = photo_path(client_id, date, pose, id, file_name);
        let content_type = content_type_for(file_name);
        let path = self.storage.upload(&path, bytes, &content_type).await?;

        let photo = ProgressPhoto {
            id,
            client_id,
            date,
            pose,
            url: self.storage.public_url(&path),
            storage_path: path,
        };
        match self.rows.create(&photo).await {
            Ok(stored) => Ok(stored),
            Err(e) => {
                log::warn!("[PHOTO] row insert failed, removing object {}: {}", photo.storage_path, e);
                if let Err(cleanup) = self.storage.remove(&[photo.storage_path.clone()]).await {
                    log::error!("[PHOTO] orphan object {} left behind: {}", photo.storage_path, cleanup);
                }
                Err(e)
            }
        }
    }

    /// A client's photos, oldest first
    pub async fn list(&self, client_id: Uuid) -> DomainResult<Vec<ProgressPhoto>> {
        let query = Query::new()
            .eq("client_id", client_id)
            .order("date", true);
        self.rows.list(&query).await
    }

    /// Delete the row, then the stored object
    pub async fn delete(&self, photo: &ProgressPhoto) -> DomainResult<()> {
        self.rows.delete(photo.id).await?;
        self.storage.remove(&[photo.storage_path.clone()]).await?;
        log::info!("[PHOTO] deleted {}", photo.storage_path);
        Ok(())
    }

    /// Earliest and latest photo of `pose`
    pub async fn before_after(&self, client_id: Uuid, pose: PhotoPose) -> DomainResult<Option<PhotoPair>> {
        let photos = self.list(client_id).await?;
        Ok(photo_pair(&photos, pose))
    }
}
