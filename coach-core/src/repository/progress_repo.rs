//! Progress Repository
//!
//! Daily weight/water entries and performed workout sets.
//!
//! The daily entry is read-then-insert-else-update with no uniqueness guard, so two
//! overlapping writes for the same day can both insert.

use chrono::NaiveDate;
use serde_json::json;
use uuid::Uuid;

use super::table_repo::TableRepository;
use super::traits::Repository;
use crate::backend::{Query, SharedBackend};
use crate::domain::{DomainError, DomainResult, Entity, ProgressEntry, WeightTrend, WorkoutLog};
use crate::validation;

#[derive(Clone)]
pub struct ProgressRepository {
    entries: TableRepository<ProgressEntry>,
    logs: TableRepository<WorkoutLog>,
}

impl ProgressRepository {
    pub fn new(backend: SharedBackend) -> Self {
        Self {
            entries: TableRepository::new(backend.clone()),
            logs: TableRepository::new(backend),
        }
    }

    /// The client's entry for `date`, if one was logged
    pub async fn entry_for(&self, client_id: Uuid, date: NaiveDate) -> DomainResult<Option<ProgressEntry>> {
        let query = Query::new()
            .eq("client_id", client_id)
            .eq("date", date)
            .limit(1);
        Ok(self.entries.list(&query).await?.into_iter().next())
    }

    async fn patch_entry(&self, id: Uuid, patch: serde_json::Value) -> DomainResult<ProgressEntry> {
        let rows = self
            .entries
            .backend()
            .update(<ProgressEntry as Entity>::TABLE, &Query::new().eq("id", id), patch)
            .await?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DomainError::NotFound(format!("progress {}", id)))?;
        serde_json::from_value(row).map_err(DomainError::from)
    }

    /// Record the weight for `today`, updating the day's entry when there is one
    pub async fn log_weight(&self, client_id: Uuid, today: NaiveDate, weight_kg: f64) -> DomainResult<ProgressEntry> {
        let weight_kg = validation::weight_kg(weight_kg)?;
        match self.entry_for(client_id, today).await? {
            Some(existing) => {
                log::info!("[PROGRESS] weight {} on {} (update)", weight_kg, today);
                self.patch_entry(existing.id, json!({ "weight_kg": weight_kg })).await
            }
            None => {
                log::info!("[PROGRESS] weight {} on {} (insert)", weight_kg, today);
                let mut entry = ProgressEntry::new(client_id, today);
                entry.weight_kg = Some(weight_kg);
                self.entries.create(&entry).await
            }
        }
    }

    /// Add a glass/bottle of water to `today`'s total
    pub async fn add_water(&self, client_id: Uuid, today: NaiveDate, ml: i32) -> DomainResult<ProgressEntry> {
        let ml = validation::water_ml(ml)?;
        match self.entry_for(client_id, today).await? {
            Some(existing) => {
                let total = existing.water_ml + ml;
                self.patch_entry(existing.id, json!({ "water_ml": total })).await
            }
            None => {
                let mut entry = ProgressEntry::new(client_id, today);
                entry.water_ml = ml;
                self.entries.create(&entry).await
            }
        }
    }

    /// Entries between `from` and `to` inclusive, oldest first
    pub async fn history(&self, client_id: Uuid, from: NaiveDate, to: NaiveDate) -> DomainResult<Vec<ProgressEntry>> {
        if from > to {
            return Err(DomainError::InvalidInput("El rango de fechas no es válido.".into()));
        }
        let query = Query::new()
            .eq("client_id", client_id)
            .gte("date", from)
            .lte("date", to)
            .order("date", true);
        self.entries.list(&query).await
    }

    pub async fn weight_trend(&self, client_id: Uuid, from: NaiveDate, to: NaiveDate) -> DomainResult<Option<WeightTrend>> {
        let entries = self.history(client_id, from, to).await?;
        Ok(WeightTrend::from_entries(&entries))
    }

    // ========================
    // Workout logs
    // ========================

    pub async fn log_set(&self, log: &WorkoutLog) -> DomainResult<WorkoutLog> {
        if log.reps < 0 || log.set_number < 1 {
            return Err(DomainError::InvalidInput("Serie o repeticiones no válidas.".into()));
        }
        if let Some(weight) = log.weight_kg {
            if !weight.is_finite() || weight < 0.0 {
                return Err(DomainError::InvalidInput("El peso no es válido.".into()));
            }
        }
        self.logs.create(log).await
    }

    /// Sets performed on `date`, grouped by exercise then set number
    pub async fn logs_for_day(&self, client_id: Uuid, date: NaiveDate) -> DomainResult<Vec<WorkoutLog>> {
        let query = Query::new()
            .eq("client_id", client_id)
            .eq("date", date)
            .order("exercise_id", true)
            .order("set_number", true);
        self.logs.list(&query).await
    }

    /// Most recent sets for an exercise, newest first
    pub async fn recent_logs_for_exercise(&self, client_id: Uuid, exercise_id: Uuid, limit: usize) -> DomainResult<Vec<WorkoutLog>> {
        let query = Query::new()
            .eq("client_id", client_id)
            .eq("exercise_id", exercise_id)
            .order("date", false)
            .order("set_number", true)
            .limit(limit);
        self.logs.list(&query).await
    }

    pub async fn delete_log(&self, id: Uuid) -> DomainResult<()> {
        self.logs.delete(id).await
    }
}
