//! Backend Layer
//!
//! Narrow, untyped access to the hosted backend: row tables, blob storage and auth.
//! Repositories build typed contracts on top of [`Backend`].

mod query;
mod timeout;
mod rest;
mod memory;
mod auth;
mod storage;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::{DomainError, DomainResult, Entity};

pub use query::{Filter, OrderBy, Query};
pub use timeout::{sleep, with_timeout, REQUEST_TIMEOUT};
pub use rest::{RestBackend, RestContext};
pub use memory::MemoryBackend;
pub use auth::{decode_claims, AuthClient, AuthEvent, AuthSession, AuthUser, JwtClaims};
pub use storage::{content_type_for, MemoryStorage, PhotoStorage, RestStorage, SharedStorage};

/// Row-oriented access to named tables
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait Backend: Send + Sync {
    /// Rows matching `query`
    async fn select(&self, table: &str, query: &Query) -> DomainResult<Vec<Value>>;

    /// Insert rows, returning them as stored
    async fn insert(&self, table: &str, rows: Vec<Value>) -> DomainResult<Vec<Value>>;

    /// Merge `patch` into every row matching `query`, returning the updated rows
    async fn update(&self, table: &str, query: &Query, patch: Value) -> DomainResult<Vec<Value>>;

    /// Delete every row matching `query`
    async fn delete(&self, table: &str, query: &Query) -> DomainResult<()>;
}

/// The single backend instance shared by every repository and controller
pub type SharedBackend = Arc<dyn Backend>;

// ========================
// Typed helpers
// ========================

fn decode_rows<T: Entity>(rows: Vec<Value>) -> DomainResult<Vec<T>> {
    rows.into_iter()
        .map(|row| serde_json::from_value(row).map_err(DomainError::from))
        .collect()
}

fn encode_rows<T: Entity>(rows: &[T]) -> DomainResult<Vec<Value>> {
    rows.iter()
        .map(|row| serde_json::to_value(row).map_err(DomainError::from))
        .collect()
}

/// Select and decode rows of `T`
pub async fn fetch<T: Entity>(backend: &dyn Backend, query: &Query) -> DomainResult<Vec<T>> {
    if query.is_empty_match() {
        return Ok(Vec::new());
    }
    let rows = backend.select(T::TABLE, query).await?;
    decode_rows(rows)
}

/// Insert rows of `T` in one request
pub async fn insert_all<T: Entity>(backend: &dyn Backend, rows: &[T]) -> DomainResult<Vec<T>> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }
    let stored = backend.insert(T::TABLE, encode_rows(rows)?).await?;
    decode_rows(stored)
}

/// Delete rows of `T` matching `query`
pub async fn remove<T: Entity>(backend: &dyn Backend, query: &Query) -> DomainResult<()> {
    if query.is_empty_match() {
        return Ok(());
    }
    backend.delete(T::TABLE, query).await
}
