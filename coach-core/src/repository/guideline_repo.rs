//! Guideline Repository
//!
//! Guidelines keep a contiguous `order_index` (0..n) after every create, delete and reorder.

use serde_json::json;
use uuid::Uuid;

use super::table_repo::TableRepository;
use super::traits::Repository;
use crate::backend::{Query, SharedBackend};
use crate::domain::{DomainError, DomainResult, Guideline};
use crate::validation;

#[derive(Clone)]
pub struct GuidelineRepository {
    rows: TableRepository<Guideline>,
}

impl GuidelineRepository {
    pub fn new(backend: SharedBackend) -> Self {
        Self {
            rows: TableRepository::new(backend),
        }
    }

    /// Everything, for the admin editor
    pub async fn list_all(&self) -> DomainResult<Vec<Guideline>> {
        self.rows.list(&Query::new().order("order_index", true)).await
    }

    /// What clients see
    pub async fn list_published(&self) -> DomainResult<Vec<Guideline>> {
        let query = Query::new()
            .eq("published", true)
            .order("order_index", true);
        self.rows.list(&query).await
    }

    /// Append a new guideline at the end
    pub async fn create(&self, title: &str, content: &str) -> DomainResult<Guideline> {
        let title = validation::template_name(title)?;
        let count = self.list_all().await?.len();
        let mut guideline = Guideline::new(title, content.to_string());
        guideline.order_index = count as i32;
        self.rows.create(&guideline).await
    }

    pub async fn update(&self, guideline: &Guideline) -> DomainResult<Guideline> {
        validation::template_name(&guideline.title)?;
        self.rows.update(guideline).await
    }

    /// Delete and close the gap in ordering
    pub async fn delete(&self, id: Uuid) -> DomainResult<()> {
        self.rows.delete(id).await?;
        let remaining: Vec<Uuid> = self.list_all().await?.iter().map(|g| g.id).collect();
        self.reorder(&remaining).await
    }

    /// Set `order_index` to each id's position in `ids`
    pub async fn reorder(&self, ids: &[Uuid]) -> DomainResult<()> {
        let current = self.list_all().await?;
        if ids.len() != current.len() || !current.iter().all(|g| ids.contains(&g.id)) {
            return Err(DomainError::InvalidInput("La lista de pautas no coincide.".into()));
        }
        for (position, id) in ids.iter().enumerate() {
            let unchanged = current
                .iter()
                .any(|g| g.id == *id && g.order_index == position as i32);
            if unchanged {
                continue;
            }
            self.rows
                .backend()
                .update("guidelines", &Query::new().eq("id", *id), json!({ "order_index": position }))
                .await?;
        }
        log::debug!("[GUIDELINE] reordered {} guidelines", ids.len());
        Ok(())
    }

    /// Move one guideline from position `from` to `to`
    pub async fn move_guideline(&self, from: usize, to: usize) -> DomainResult<()> {
        let mut ids: Vec<Uuid> = self.list_all().await?.iter().map(|g| g.id).collect();
        if from >= ids.len() || to >= ids.len() {
            return Err(DomainError::InvalidInput("Posición fuera de rango.".into()));
        }
        let id = ids.remove(from);
        ids.insert(to, id);
        self.reorder(&ids).await
    }
}
