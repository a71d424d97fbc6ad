//! Profile Repository
//!
//! Own-profile reads, role lookup and the admin's client roster.

use serde_json::json;
use uuid::Uuid;

use super::table_repo::TableRepository;
use super::traits::Repository;
use crate::backend::{Query, SharedBackend};
use crate::domain::{DomainError, DomainResult, Profile, Role};

#[derive(Clone)]
pub struct ProfileRepository {
    rows: TableRepository<Profile>,
}

impl ProfileRepository {
    pub fn new(backend: SharedBackend) -> Self {
        Self {
            rows: TableRepository::new(backend),
        }
    }

    /// Profile of the signed-in user
    pub async fn get(&self, user_id: Uuid) -> DomainResult<Option<Profile>> {
        self.rows.find_by_id(user_id).await
    }

    /// Role of a user; a missing profile is an error
    pub async fn role_of(&self, user_id: Uuid) -> DomainResult<Role> {
        self.get(user_id)
            .await?
            .map(|p| p.role)
            .ok_or_else(|| DomainError::NotFound(format!("profile {}", user_id)))
    }

    /// Every client, active first then by name
    pub async fn list_clients(&self) -> DomainResult<Vec<Profile>> {
        let query = Query::new()
            .eq("role", Role::Client.as_str())
            .order("active", false)
            .order("full_name", true);
        self.rows.list(&query).await
    }

    pub async fn update_client(&self, profile: &Profile) -> DomainResult<Profile> {
        if profile.full_name.trim().is_empty() {
            return Err(DomainError::InvalidInput("El nombre es obligatorio.".into()));
        }
        let updated = self.rows.update(profile).await?;
        log::info!("[PROFILE] updated {}", profile.id);
        Ok(updated)
    }

    /// Activate or deactivate a client without touching other columns
    pub async fn set_active(&self, client_id: Uuid, active: bool) -> DomainResult<()> {
        let rows = self
            .rows
            .backend()
            .update("profiles", &Query::new().eq("id", client_id), json!({ "active": active }))
            .await?;
        if rows.is_empty() {
            return Err(DomainError::NotFound(format!("profile {}", client_id)));
        }
        log::info!("[PROFILE] {} active={}", client_id, active);
        Ok(())
    }
}
