//! Plan Duplication Operations
//!
//! Copies of a stored plan with fresh identities, persisted level by level.

use async_trait::async_trait;
use uuid::Uuid;

use super::plan_persistence::PlanPersistenceOperations;
use crate::domain::{DomainResult, PlanKind, PlanRoot, PlanTree};

/// Trait for duplicating stored plans
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait PlanDuplicationOperations<K: PlanKind> {
    /// Load a plan and store an independent " (Copia)" copy of it
    async fn duplicate(&self, source_id: Uuid) -> DomainResult<PlanTree<K>>;

    /// Store a copy of a template bound to a client
    async fn assign_to_client(&self, template_id: Uuid, client_id: Uuid) -> DomainResult<PlanTree<K>>;
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl<K: PlanKind> PlanDuplicationOperations<K> for super::plan_repo::PlanRepository<K> {
    async fn duplicate(&self, source_id: Uuid) -> DomainResult<PlanTree<K>> {
        let source = self.load_tree(source_id).await?;
        let copy = source.duplicate();
        self.insert_tree(&copy).await?;
        log::info!(
            "[PLAN] duplicated {} {} -> {} \"{}\"",
            K::LABEL,
            source_id,
            copy.id(),
            copy.root.name()
        );
        Ok(copy)
    }

    async fn assign_to_client(&self, template_id: Uuid, client_id: Uuid) -> DomainResult<PlanTree<K>> {
        let template = self.load_tree(template_id).await?;
        let copy = template.assign_copy(client_id);
        self.insert_tree(&copy).await?;
        log::info!(
            "[PLAN] assigned {} {} to client {} as {}",
            K::LABEL,
            template_id,
            client_id,
            copy.id()
        );
        Ok(copy)
    }
}
