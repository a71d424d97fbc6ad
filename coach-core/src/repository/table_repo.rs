//! Table Repository
//!
//! Generic [`Repository`] for any entity stored one-row-per-value in its own table.

use std::marker::PhantomData;

use async_trait::async_trait;

use super::traits::Repository;
use crate::backend::{fetch, insert_all, remove, Query, SharedBackend};
use crate::domain::{DomainError, DomainResult, Entity};

pub struct TableRepository<T: Entity> {
    backend: SharedBackend,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Entity> Clone for TableRepository<T> {
    fn clone(&self) -> Self {
        Self::new(self.backend.clone())
    }
}

impl<T: Entity> TableRepository<T> {
    pub fn new(backend: SharedBackend) -> Self {
        Self {
            backend,
            _entity: PhantomData,
        }
    }

    pub fn backend(&self) -> &SharedBackend {
        &self.backend
    }

    fn by_id(id: T::Id) -> Query {
        Query::new().eq("id", id.to_string())
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl<T: Entity + 'static> Repository<T> for TableRepository<T> {
    async fn create(&self, entity: &T) -> DomainResult<T> {
        let stored = insert_all(self.backend.as_ref(), std::slice::from_ref(entity)).await?;
        stored
            .into_iter()
            .next()
            .ok_or_else(|| DomainError::Internal(format!("insert into {} returned no row", T::TABLE)))
    }

    async fn find_by_id(&self, id: T::Id) -> DomainResult<Option<T>> {
        let rows = fetch::<T>(self.backend.as_ref(), &Self::by_id(id).limit(1)).await?;
        Ok(rows.into_iter().next())
    }

    async fn list(&self, query: &Query) -> DomainResult<Vec<T>> {
        fetch::<T>(self.backend.as_ref(), query).await
    }

    async fn update(&self, entity: &T) -> DomainResult<T> {
        let patch = serde_json::to_value(entity)?;
        let rows = self.backend.update(T::TABLE, &Self::by_id(entity.id()), patch).await?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DomainError::NotFound(format!("{} {}", T::TABLE, entity.id())))?;
        serde_json::from_value(row).map_err(DomainError::from)
    }

    async fn upsert(&self, entity: &T) -> DomainResult<T> {
        match self.find_by_id(entity.id()).await? {
            Some(_) => self.update(entity).await,
            None => self.create(entity).await,
        }
    }

    async fn delete(&self, id: T::Id) -> DomainResult<()> {
        remove::<T>(self.backend.as_ref(), &Self::by_id(id)).await
    }
}
