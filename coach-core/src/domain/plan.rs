//! Plan Trees
//!
//! Diet and workout plans share one shape:
//! plan -> groups (meals / days) -> leaves (foods / exercises) -> substitutions.
//! Siblings are ordered by a dense `order_index` starting at 0.

use std::collections::HashMap;
use std::collections::HashSet;
use uuid::Uuid;

use super::entity::Entity;

/// Suffix appended to the name of a duplicated plan
pub const COPY_SUFFIX: &str = " (Copia)";

/// Top-level plan row
pub trait PlanRoot: Entity<Id = Uuid> + std::fmt::Debug {
    fn set_id(&mut self, id: Uuid);
    fn name(&self) -> &str;
    fn set_name(&mut self, name: String);
    fn client_id(&self) -> Option<Uuid>;
    /// Turn a template copy into a plan owned by a client
    fn bind_to_client(&mut self, client_id: Uuid);
}

/// Any row below the plan root
pub trait PlanNode: Entity<Id = Uuid> + std::fmt::Debug {
    /// Column holding the parent reference
    const PARENT_COLUMN: &'static str;

    fn set_id(&mut self, id: Uuid);
    fn parent_id(&self) -> Uuid;
    fn set_parent_id(&mut self, parent_id: Uuid);
    fn order_index(&self) -> i32;
    fn set_order_index(&mut self, index: i32);
}

/// Ties the four row types of one plan family together
pub trait PlanKind: Send + Sync + 'static {
    type Root: PlanRoot;
    type Group: PlanNode;
    type Leaf: PlanNode;
    type Substitution: PlanNode;

    /// Human label for logs ("diet", "workout")
    const LABEL: &'static str;
}

/// A leaf (food / exercise) with its substitutions
#[derive(Debug, Clone)]
pub struct LeafBranch<K: PlanKind> {
    pub node: K::Leaf,
    pub substitutions: Vec<K::Substitution>,
}

/// A group (meal / day) with its leaves
#[derive(Debug, Clone)]
pub struct GroupBranch<K: PlanKind> {
    pub node: K::Group,
    pub leaves: Vec<LeafBranch<K>>,
}

/// A fully loaded plan
#[derive(Debug, Clone)]
pub struct PlanTree<K: PlanKind> {
    pub root: K::Root,
    pub groups: Vec<GroupBranch<K>>,
}

/// Flat rows of a tree, one vector per level, parents before children
pub struct PlanLevels<K: PlanKind> {
    pub root: K::Root,
    pub groups: Vec<K::Group>,
    pub leaves: Vec<K::Leaf>,
    pub substitutions: Vec<K::Substitution>,
}

// ========================
// Ordering helpers
// ========================

fn reindex<T>(list: &mut [T], set: impl Fn(&mut T, i32)) {
    for (position, entry) in list.iter_mut().enumerate() {
        set(entry, position as i32);
    }
}

fn move_within<T>(list: &mut Vec<T>, from: usize, to: usize) -> bool {
    if from >= list.len() || to >= list.len() {
        return false;
    }
    let entry = list.remove(from);
    list.insert(to, entry);
    true
}

// ========================
// Leaf
// ========================

impl<K: PlanKind> LeafBranch<K> {
    pub fn new(node: K::Leaf) -> Self {
        Self { node, substitutions: Vec::new() }
    }

    /// Insert a substitution at `index` (clamped to the end)
    pub fn insert_substitution(&mut self, index: usize, mut substitution: K::Substitution) {
        substitution.set_parent_id(self.node.id());
        let index = index.min(self.substitutions.len());
        self.substitutions.insert(index, substitution);
        reindex(&mut self.substitutions, |s, i| s.set_order_index(i));
    }

    pub fn push_substitution(&mut self, substitution: K::Substitution) {
        let end = self.substitutions.len();
        self.insert_substitution(end, substitution);
    }

    pub fn remove_substitution(&mut self, index: usize) -> Option<K::Substitution> {
        if index >= self.substitutions.len() {
            return None;
        }
        let removed = self.substitutions.remove(index);
        reindex(&mut self.substitutions, |s, i| s.set_order_index(i));
        Some(removed)
    }
}

// ========================
// Group
// ========================

impl<K: PlanKind> GroupBranch<K> {
    pub fn new(node: K::Group) -> Self {
        Self { node, leaves: Vec::new() }
    }

    /// Insert a leaf at `index` (clamped to the end)
    pub fn insert_leaf(&mut self, index: usize, mut leaf: LeafBranch<K>) {
        leaf.node.set_parent_id(self.node.id());
        let index = index.min(self.leaves.len());
        self.leaves.insert(index, leaf);
        reindex(&mut self.leaves, |l, i| l.node.set_order_index(i));
    }

    pub fn push_leaf(&mut self, leaf: LeafBranch<K>) {
        let end = self.leaves.len();
        self.insert_leaf(end, leaf);
    }

    pub fn remove_leaf(&mut self, index: usize) -> Option<LeafBranch<K>> {
        if index >= self.leaves.len() {
            return None;
        }
        let removed = self.leaves.remove(index);
        reindex(&mut self.leaves, |l, i| l.node.set_order_index(i));
        Some(removed)
    }

    pub fn move_leaf(&mut self, from: usize, to: usize) -> bool {
        let moved = move_within(&mut self.leaves, from, to);
        reindex(&mut self.leaves, |l, i| l.node.set_order_index(i));
        moved
    }
}

// ========================
// Tree
// ========================

impl<K: PlanKind> PlanTree<K> {
    pub fn new(root: K::Root) -> Self {
        Self { root, groups: Vec::new() }
    }

    pub fn id(&self) -> Uuid {
        self.root.id()
    }

    /// Insert a group at `index` (clamped to the end)
    pub fn insert_group(&mut self, index: usize, mut group: GroupBranch<K>) {
        group.node.set_parent_id(self.root.id());
        let index = index.min(self.groups.len());
        self.groups.insert(index, group);
        reindex(&mut self.groups, |g, i| g.node.set_order_index(i));
    }

    pub fn push_group(&mut self, group: GroupBranch<K>) {
        let end = self.groups.len();
        self.insert_group(end, group);
    }

    pub fn remove_group(&mut self, index: usize) -> Option<GroupBranch<K>> {
        if index >= self.groups.len() {
            return None;
        }
        let removed = self.groups.remove(index);
        reindex(&mut self.groups, |g, i| g.node.set_order_index(i));
        Some(removed)
    }

    pub fn move_group(&mut self, from: usize, to: usize) -> bool {
        let moved = move_within(&mut self.groups, from, to);
        reindex(&mut self.groups, |g, i| g.node.set_order_index(i));
        moved
    }

    /// Rewrite every `order_index` to match list position
    pub fn normalize_order(&mut self) {
        reindex(&mut self.groups, |g, i| g.node.set_order_index(i));
        for group in &mut self.groups {
            reindex(&mut group.leaves, |l, i| l.node.set_order_index(i));
            for leaf in &mut group.leaves {
                reindex(&mut leaf.substitutions, |s, i| s.set_order_index(i));
            }
        }
    }

    /// Root plus every descendant
    pub fn node_count(&self) -> usize {
        1 + self
            .groups
            .iter()
            .map(|g| 1 + g.leaves.iter().map(|l| 1 + l.substitutions.len()).sum::<usize>())
            .sum::<usize>()
    }

    /// Every identity in the tree, root first, depth first
    pub fn all_ids(&self) -> Vec<Uuid> {
        let mut ids = vec![self.root.id()];
        for group in &self.groups {
            ids.push(group.node.id());
            for leaf in &group.leaves {
                ids.push(leaf.node.id());
                ids.extend(leaf.substitutions.iter().map(|s| s.id()));
            }
        }
        ids
    }

    pub fn has_unique_ids(&self) -> bool {
        let ids = self.all_ids();
        let unique: HashSet<Uuid> = ids.iter().copied().collect();
        unique.len() == ids.len()
    }

    /// Split into per-level rows for parent-before-child persistence
    pub fn levels(&self) -> PlanLevels<K> {
        let mut levels = PlanLevels {
            root: self.root.clone(),
            groups: Vec::new(),
            leaves: Vec::new(),
            substitutions: Vec::new(),
        };
        for group in &self.groups {
            levels.groups.push(group.node.clone());
            for leaf in &group.leaves {
                levels.leaves.push(leaf.node.clone());
                levels.substitutions.extend(leaf.substitutions.iter().cloned());
            }
        }
        levels
    }

    /// Rebuild a tree from flat rows; rows whose parent is missing are dropped
    pub fn from_rows(
        root: K::Root,
        groups: Vec<K::Group>,
        leaves: Vec<K::Leaf>,
        substitutions: Vec<K::Substitution>,
    ) -> Self {
        let mut subs_by_leaf: HashMap<Uuid, Vec<K::Substitution>> = HashMap::new();
        for sub in substitutions {
            subs_by_leaf.entry(sub.parent_id()).or_default().push(sub);
        }
        let mut leaves_by_group: HashMap<Uuid, Vec<LeafBranch<K>>> = HashMap::new();
        for leaf in leaves {
            let mut subs = subs_by_leaf.remove(&leaf.id()).unwrap_or_default();
            subs.sort_by_key(|s| s.order_index());
            leaves_by_group
                .entry(leaf.parent_id())
                .or_default()
                .push(LeafBranch { node: leaf, substitutions: subs });
        }

        let root_id = root.id();
        let mut branches: Vec<GroupBranch<K>> = groups
            .into_iter()
            .filter(|g| g.parent_id() == root_id)
            .map(|g| {
                let mut leaves = leaves_by_group.remove(&g.id()).unwrap_or_default();
                leaves.sort_by_key(|l| l.node.order_index());
                GroupBranch { node: g, leaves }
            })
            .collect();
        branches.sort_by_key(|g| g.node.order_index());

        if !leaves_by_group.is_empty() || !subs_by_leaf.is_empty() {
            log::debug!(
                "[PLAN] {} {}: dropped {} orphan leaf groups, {} orphan substitution groups",
                K::LABEL,
                root_id,
                leaves_by_group.len(),
                subs_by_leaf.len()
            );
        }

        Self { root, groups: branches }
    }

    // ========================
    // Duplication
    // ========================

    /// Independent copy with fresh identities and a " (Copia)" name
    pub fn duplicate(&self) -> Self {
        self.duplicate_with_ids(Uuid::new_v4)
    }

    /// Copy for a client: same name, bound to `client_id`, fresh identities
    pub fn assign_copy(&self, client_id: Uuid) -> Self {
        let mut copy = self.clone_with_ids(&mut Uuid::new_v4);
        copy.root.bind_to_client(client_id);
        copy
    }

    /// Duplicate drawing identities from `next_id`
    pub fn duplicate_with_ids(&self, mut next_id: impl FnMut() -> Uuid) -> Self {
        let mut copy = self.clone_with_ids(&mut next_id);
        let name = format!("{}{}", self.root.name(), COPY_SUFFIX);
        copy.root.set_name(name);
        copy
    }

    fn clone_with_ids(&self, next_id: &mut impl FnMut() -> Uuid) -> Self {
        let mut root = self.root.clone();
        let root_id = next_id();
        root.set_id(root_id);

        let groups = self
            .groups
            .iter()
            .map(|group| {
                let mut node = group.node.clone();
                let group_id = next_id();
                node.set_id(group_id);
                node.set_parent_id(root_id);

                let leaves = group
                    .leaves
                    .iter()
                    .map(|leaf| {
                        let mut leaf_node = leaf.node.clone();
                        let leaf_id = next_id();
                        leaf_node.set_id(leaf_id);
                        leaf_node.set_parent_id(group_id);

                        let substitutions = leaf
                            .substitutions
                            .iter()
                            .map(|sub| {
                                let mut copy = sub.clone();
                                copy.set_id(next_id());
                                copy.set_parent_id(leaf_id);
                                copy
                            })
                            .collect();
                        LeafBranch { node: leaf_node, substitutions }
                    })
                    .collect();
                GroupBranch { node, leaves }
            })
            .collect();

        Self { root, groups }
    }
}
