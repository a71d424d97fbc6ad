//! Plan Persistence Operations
//!
//! Writes go level by level, parents before children. Nothing is rolled back:
//! a failed level leaves the earlier levels stored and reports how far it got.

use async_trait::async_trait;
use uuid::Uuid;

use crate::backend::{fetch, insert_all, remove, Query};
use crate::domain::{DomainError, DomainResult, Entity, PlanKind, PlanNode, PlanTree};

/// Root, groups, leaves, substitutions
const LEVELS: usize = 4;

fn partial(completed: usize, total: usize, cause: DomainError) -> DomainError {
    if completed == 0 {
        return cause;
    }
    log::error!("[PLAN] write stopped after {}/{} levels: {}", completed, total, cause);
    DomainError::PartialWrite {
        completed,
        total,
        cause: Box::new(cause),
    }
}

/// Trait for plan write operations
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait PlanPersistenceOperations<K: PlanKind> {
    /// Insert a tree that does not exist yet (root first)
    async fn insert_tree(&self, tree: &PlanTree<K>) -> DomainResult<()>;

    /// Replace-all save: update the root, drop existing descendants, reinsert the tree
    async fn save_tree(&self, tree: &mut PlanTree<K>) -> DomainResult<()>;

    /// Delete a plan and everything below it (children first)
    async fn delete_tree(&self, id: Uuid) -> DomainResult<()>;
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl<K: PlanKind> PlanPersistenceOperations<K> for super::plan_repo::PlanRepository<K> {
    async fn insert_tree(&self, tree: &PlanTree<K>) -> DomainResult<()> {
        let backend = self.backend.as_ref();
        let levels = tree.levels();

        insert_all(backend, std::slice::from_ref(&levels.root))
            .await
            .map_err(|e| partial(0, LEVELS, e))?;
        insert_all(backend, &levels.groups)
            .await
            .map_err(|e| partial(1, LEVELS, e))?;
        insert_all(backend, &levels.leaves)
            .await
            .map_err(|e| partial(2, LEVELS, e))?;
        insert_all(backend, &levels.substitutions)
            .await
            .map_err(|e| partial(3, LEVELS, e))?;

        log::info!("[PLAN] inserted {} {} ({} rows)", K::LABEL, tree.id(), tree.node_count());
        Ok(())
    }

    async fn save_tree(&self, tree: &mut PlanTree<K>) -> DomainResult<()> {
        let backend = self.backend.as_ref();
        let id = tree.id();
        tree.normalize_order();

        let patch = serde_json::to_value(&tree.root)?;
        let updated = backend
            .update(<K::Root as Entity>::TABLE, &Query::new().eq("id", id), patch)
            .await?;
        if updated.is_empty() {
            return Err(DomainError::NotFound(format!("{} {}", K::LABEL, id)));
        }

        delete_descendants::<K>(backend, id).await?;

        // Root is already stored, so the child levels count from 1
        let levels = tree.levels();
        insert_all(backend, &levels.groups)
            .await
            .map_err(|e| partial(1, LEVELS, e))?;
        insert_all(backend, &levels.leaves)
            .await
            .map_err(|e| partial(2, LEVELS, e))?;
        insert_all(backend, &levels.substitutions)
            .await
            .map_err(|e| partial(3, LEVELS, e))?;

        log::info!("[PLAN] saved {} {} ({} rows)", K::LABEL, id, tree.node_count());
        Ok(())
    }

    async fn delete_tree(&self, id: Uuid) -> DomainResult<()> {
        let backend = self.backend.as_ref();
        delete_descendants::<K>(backend, id).await?;
        remove::<K::Root>(backend, &Query::new().eq("id", id)).await?;
        log::info!("[PLAN] deleted {} {}", K::LABEL, id);
        Ok(())
    }
}

/// Remove substitutions, leaves and groups below a root, deepest level first
async fn delete_descendants<K: PlanKind>(backend: &dyn crate::backend::Backend, root_id: Uuid) -> DomainResult<()> {
    let groups = fetch::<K::Group>(
        backend,
        &Query::new().eq(<K::Group as PlanNode>::PARENT_COLUMN, root_id),
    )
    .await?;
    let group_ids: Vec<Uuid> = groups.iter().map(|g| g.id()).collect();

    let leaves = fetch::<K::Leaf>(
        backend,
        &Query::new().is_in(<K::Leaf as PlanNode>::PARENT_COLUMN, &group_ids),
    )
    .await?;
    let leaf_ids: Vec<Uuid> = leaves.iter().map(|l| l.id()).collect();

    remove::<K::Substitution>(
        backend,
        &Query::new().is_in(<K::Substitution as PlanNode>::PARENT_COLUMN, &leaf_ids),
    )
    .await?;
    remove::<K::Leaf>(
        backend,
        &Query::new().is_in(<K::Leaf as PlanNode>::PARENT_COLUMN, &group_ids),
    )
    .await?;
    remove::<K::Group>(
        backend,
        &Query::new().eq(<K::Group as PlanNode>::PARENT_COLUMN, root_id),
    )
    .await
}
