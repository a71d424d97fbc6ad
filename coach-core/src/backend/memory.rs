//! In-Memory Backend
//!
//! Tables held as JSON rows. Evaluates the same [`Query`] as the REST backend,
//! records every call and can be told to fail, which makes partial-failure paths testable.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

use super::query::Query;
use super::Backend;
use crate::domain::{DomainError, DomainResult};

#[derive(Default)]
pub struct MemoryBackend {
    tables: Mutex<HashMap<String, Vec<Value>>>,
    /// Tables whose inserts fail with the stored error
    failing_inserts: Mutex<HashMap<String, DomainError>>,
    /// "op:table" entries in call order
    calls: Mutex<Vec<String>>,
}

fn poisoned<E: std::fmt::Display>(e: E) -> DomainError {
    DomainError::Internal(format!("memory backend lock poisoned: {}", e))
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every later insert into `table` fail with `error`
    pub fn fail_inserts_into(&self, table: &str, error: DomainError) {
        if let Ok(mut failing) = self.failing_inserts.lock() {
            failing.insert(table.to_string(), error);
        }
    }

    pub fn clear_failures(&self) {
        if let Ok(mut failing) = self.failing_inserts.lock() {
            failing.clear();
        }
    }

    /// Every row currently stored in `table`
    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.tables
            .lock()
            .map(|tables| tables.get(table).cloned().unwrap_or_default())
            .unwrap_or_default()
    }

    /// Calls made so far, e.g. `["insert:diets", "insert:meals"]`
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn record(&self, op: &str, table: &str) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(format!("{}:{}", op, table));
        }
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl Backend for MemoryBackend {
    async fn select(&self, table: &str, query: &Query) -> DomainResult<Vec<Value>> {
        self.record("select", table);
        let tables = self.tables.lock().map_err(poisoned)?;
        Ok(tables.get(table).map(|rows| query.apply(rows)).unwrap_or_default())
    }

    async fn insert(&self, table: &str, rows: Vec<Value>) -> DomainResult<Vec<Value>> {
        self.record("insert", table);
        if let Some(error) = self.failing_inserts.lock().map_err(poisoned)?.get(table) {
            return Err(error.clone());
        }

        let mut stored = Vec::with_capacity(rows.len());
        for mut row in rows {
            let object = row
                .as_object_mut()
                .ok_or_else(|| DomainError::InvalidInput(format!("row for {} is not an object", table)))?;
            if object.get("id").map_or(true, Value::is_null) {
                object.insert("id".to_string(), Value::String(Uuid::new_v4().to_string()));
            }
            stored.push(row);
        }

        let mut tables = self.tables.lock().map_err(poisoned)?;
        tables.entry(table.to_string()).or_default().extend(stored.iter().cloned());
        Ok(stored)
    }

    async fn update(&self, table: &str, query: &Query, patch: Value) -> DomainResult<Vec<Value>> {
        self.record("update", table);
        let patch = patch
            .as_object()
            .cloned()
            .ok_or_else(|| DomainError::InvalidInput("update patch must be an object".into()))?;

        let mut tables = self.tables.lock().map_err(poisoned)?;
        let mut updated = Vec::new();
        if let Some(rows) = tables.get_mut(table) {
            for row in rows.iter_mut().filter(|r| query.matches(r)) {
                if let Some(object) = row.as_object_mut() {
                    for (key, value) in &patch {
                        object.insert(key.clone(), value.clone());
                    }
                }
                updated.push(row.clone());
            }
        }
        Ok(updated)
    }

    async fn delete(&self, table: &str, query: &Query) -> DomainResult<()> {
        self.record("delete", table);
        let mut tables = self.tables.lock().map_err(poisoned)?;
        if let Some(rows) = tables.get_mut(table) {
            rows.retain(|r| !query.matches(r));
        }
        Ok(())
    }
}
