//! Plan Repository - Core Reads

use std::marker::PhantomData;

use uuid::Uuid;

use crate::backend::{fetch, Query, SharedBackend};
use crate::domain::{DietKind, DomainError, DomainResult, Entity, PlanKind, PlanNode, PlanTree, WorkoutKind};

/// Plan trees of one family (diets or workouts)
pub struct PlanRepository<K: PlanKind> {
    pub(super) backend: SharedBackend,
    _kind: PhantomData<fn() -> K>,
}

pub type DietRepository = PlanRepository<DietKind>;
pub type WorkoutRepository = PlanRepository<WorkoutKind>;

impl<K: PlanKind> Clone for PlanRepository<K> {
    fn clone(&self) -> Self {
        Self::new(self.backend.clone())
    }
}

impl<K: PlanKind> PlanRepository<K> {
    pub fn new(backend: SharedBackend) -> Self {
        Self {
            backend,
            _kind: PhantomData,
        }
    }

    /// Root row only
    pub async fn find_root(&self, id: Uuid) -> DomainResult<Option<K::Root>> {
        let rows = fetch::<K::Root>(self.backend.as_ref(), &Query::new().eq("id", id).limit(1)).await?;
        Ok(rows.into_iter().next())
    }

    /// Root plus every descendant, siblings ordered by `order_index`
    pub async fn load_tree(&self, id: Uuid) -> DomainResult<PlanTree<K>> {
        let backend = self.backend.as_ref();
        let root = self
            .find_root(id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("{} {}", K::LABEL, id)))?;

        let groups = fetch::<K::Group>(
            backend,
            &Query::new()
                .eq(<K::Group as PlanNode>::PARENT_COLUMN, id)
                .order("order_index", true),
        )
        .await?;
        let group_ids: Vec<Uuid> = groups.iter().map(|g| g.id()).collect();

        let leaves = fetch::<K::Leaf>(
            backend,
            &Query::new()
                .is_in(<K::Leaf as PlanNode>::PARENT_COLUMN, &group_ids)
                .order("order_index", true),
        )
        .await?;
        let leaf_ids: Vec<Uuid> = leaves.iter().map(|l| l.id()).collect();

        let substitutions = fetch::<K::Substitution>(
            backend,
            &Query::new()
                .is_in(<K::Substitution as PlanNode>::PARENT_COLUMN, &leaf_ids)
                .order("order_index", true),
        )
        .await?;

        log::debug!(
            "[PLAN] loaded {} {}: {} groups, {} leaves, {} substitutions",
            K::LABEL,
            id,
            groups.len(),
            leaves.len(),
            substitutions.len()
        );
        Ok(PlanTree::from_rows(root, groups, leaves, substitutions))
    }

    /// Templates, newest first
    pub async fn list_templates(&self) -> DomainResult<Vec<K::Root>> {
        let query = Query::new()
            .eq("is_template", true)
            .order("created_at", false);
        fetch::<K::Root>(self.backend.as_ref(), &query).await
    }

    /// Plans assigned to a client, newest first
    pub async fn list_for_client(&self, client_id: Uuid) -> DomainResult<Vec<K::Root>> {
        let query = Query::new()
            .eq("client_id", client_id)
            .order("created_at", false);
        fetch::<K::Root>(self.backend.as_ref(), &query).await
    }

    /// The client's current plan (most recently created), loaded in full
    pub async fn current_for_client(&self, client_id: Uuid) -> DomainResult<Option<PlanTree<K>>> {
        let latest = self.list_for_client(client_id).await?.into_iter().next();
        match latest {
            Some(root) => self.load_tree(root.id()).await.map(Some),
            None => Ok(None),
        }
    }
}
