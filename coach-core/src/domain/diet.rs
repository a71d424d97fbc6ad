//! Diet Plan Entities
//!
//! diets -> meals -> foods -> food_substitutions

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::entity::Entity;
use super::plan::{PlanKind, PlanNode, PlanRoot};

/// Marker tying the diet row types together
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DietKind;

impl PlanKind for DietKind {
    type Root = DietPlan;
    type Group = Meal;
    type Leaf = Food;
    type Substitution = FoodSubstitution;
    const LABEL: &'static str = "diet";
}

/// A diet plan; a template when `client_id` is None
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DietPlan {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub client_id: Option<Uuid>,
    #[serde(default)]
    pub is_template: bool,
    #[serde(default)]
    pub target_calories: Option<i32>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl DietPlan {
    pub fn template(name: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            description: None,
            client_id: None,
            is_template: true,
            target_calories: None,
            notes: None,
            created_at: None,
        }
    }
}

impl Entity for DietPlan {
    type Id = Uuid;
    const TABLE: &'static str = "diets";

    fn id(&self) -> Self::Id {
        self.id
    }
}

impl PlanRoot for DietPlan {
    fn set_id(&mut self, id: Uuid) {
        self.id = id;
        self.created_at = None;
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn set_name(&mut self, name: String) {
        self.name = name;
    }

    fn client_id(&self) -> Option<Uuid> {
        self.client_id
    }

    fn bind_to_client(&mut self, client_id: Uuid) {
        self.client_id = Some(client_id);
        self.is_template = false;
    }
}

/// A meal within a diet (breakfast, lunch, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meal {
    pub id: Uuid,
    pub diet_id: Uuid,
    pub name: String,
    /// Suggested time, e.g. "08:30"
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    pub order_index: i32,
}

impl Meal {
    pub fn new(diet_id: Uuid, name: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            diet_id,
            name,
            time: None,
            notes: None,
            order_index: 0,
        }
    }
}

/// A food within a meal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Food {
    pub id: Uuid,
    pub meal_id: Uuid,
    pub name: String,
    /// Free text amount, e.g. "150 g"
    pub quantity: String,
    #[serde(default)]
    pub calories: Option<f64>,
    #[serde(default)]
    pub protein_g: Option<f64>,
    #[serde(default)]
    pub carbs_g: Option<f64>,
    #[serde(default)]
    pub fat_g: Option<f64>,
    pub order_index: i32,
}

impl Food {
    pub fn new(meal_id: Uuid, name: String, quantity: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            meal_id,
            name,
            quantity,
            calories: None,
            protein_g: None,
            carbs_g: None,
            fat_g: None,
            order_index: 0,
        }
    }
}

/// An alternative for a food
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodSubstitution {
    pub id: Uuid,
    pub food_id: Uuid,
    pub name: String,
    pub quantity: String,
    pub order_index: i32,
}

impl FoodSubstitution {
    pub fn new(food_id: Uuid, name: String, quantity: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            food_id,
            name,
            quantity,
            order_index: 0,
        }
    }
}

macro_rules! plan_node {
    ($ty:ty, $table:literal, $parent:ident) => {
        impl Entity for $ty {
            type Id = Uuid;
            const TABLE: &'static str = $table;

            fn id(&self) -> Self::Id {
                self.id
            }
        }

        impl PlanNode for $ty {
            const PARENT_COLUMN: &'static str = stringify!($parent);

            fn set_id(&mut self, id: Uuid) {
                self.id = id;
            }

            fn parent_id(&self) -> Uuid {
                self.$parent
            }

            fn set_parent_id(&mut self, parent_id: Uuid) {
                self.$parent = parent_id;
            }

            fn order_index(&self) -> i32 {
                self.order_index
            }

            fn set_order_index(&mut self, index: i32) {
                self.order_index = index;
            }
        }
    };
}

pub(crate) use plan_node;

plan_node!(Meal, "meals", diet_id);
plan_node!(Food, "foods", meal_id);
plan_node!(FoodSubstitution, "food_substitutions", food_id);

/// Macro totals for a meal, skipping foods without values
pub fn meal_calories(foods: &[Food]) -> f64 {
    foods.iter().filter_map(|f| f.calories).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::plan::{GroupBranch, LeafBranch, PlanTree, COPY_SUFFIX};
    use std::collections::HashSet;

    type DietTree = PlanTree<DietKind>;

    /// 2 meals x 3 foods, one substitution on the first food of each meal
    fn sample_tree() -> DietTree {
        let mut tree = DietTree::new(DietPlan::template("Volumen".to_string()));
        for meal_name in ["Desayuno", "Comida"] {
            let mut meal = GroupBranch::new(Meal::new(Uuid::nil(), meal_name.to_string()));
            for (i, food_name) in ["Avena", "Huevos", "Fruta"].iter().enumerate() {
                let food = Food::new(Uuid::nil(), food_name.to_string(), format!("{} g", (i + 1) * 50));
                let mut leaf = LeafBranch::<DietKind>::new(food);
                if i == 0 {
                    let food_id = leaf.node.id;
                    leaf.push_substitution(FoodSubstitution::new(food_id, "Pan".into(), "60 g".into()));
                }
                meal.push_leaf(leaf);
            }
            tree.push_group(meal);
        }
        tree
    }

    #[test]
    fn test_tree_shape_and_order() {
        let tree = sample_tree();
        assert_eq!(tree.node_count(), 1 + 2 + 6 + 2);
        let meal_order: Vec<i32> = tree.groups.iter().map(|g| g.node.order_index).collect();
        assert_eq!(meal_order, vec![0, 1]);
        for group in &tree.groups {
            let food_order: Vec<i32> = group.leaves.iter().map(|l| l.node.order_index).collect();
            assert_eq!(food_order, vec![0, 1, 2]);
            assert_eq!(group.node.diet_id, tree.root.id);
        }
        assert!(tree.has_unique_ids());
    }

    #[test]
    fn test_duplicate_uses_fresh_disjoint_ids() {
        let tree = sample_tree();
        let copy = tree.duplicate();

        let source: HashSet<Uuid> = tree.all_ids().into_iter().collect();
        let copied = copy.all_ids();
        assert_eq!(copied.len(), tree.node_count());
        assert!(copy.has_unique_ids());
        assert!(copied.iter().all(|id| !source.contains(id)));
    }

    #[test]
    fn test_duplicate_keeps_fields_and_order() {
        let tree = sample_tree();
        let copy = tree.duplicate();

        assert_eq!(copy.root.name, format!("Volumen{}", COPY_SUFFIX));
        assert_eq!(copy.root.name, "Volumen (Copia)");
        assert_eq!(copy.root.is_template, tree.root.is_template);
        for (src, dst) in tree.groups.iter().zip(&copy.groups) {
            assert_eq!(src.node.name, dst.node.name);
            assert_eq!(src.node.order_index, dst.node.order_index);
            for (src_leaf, dst_leaf) in src.leaves.iter().zip(&dst.leaves) {
                assert_eq!(src_leaf.node.name, dst_leaf.node.name);
                assert_eq!(src_leaf.node.quantity, dst_leaf.node.quantity);
                assert_eq!(src_leaf.node.order_index, dst_leaf.node.order_index);
                assert_eq!(src_leaf.substitutions.len(), dst_leaf.substitutions.len());
            }
        }
    }

    #[test]
    fn test_duplicate_remaps_parents() {
        let tree = sample_tree();
        let copy = tree.duplicate();

        for group in &copy.groups {
            assert_eq!(group.node.diet_id, copy.root.id);
            for leaf in &group.leaves {
                assert_eq!(leaf.node.meal_id, group.node.id);
                for sub in &leaf.substitutions {
                    assert_eq!(sub.food_id, leaf.node.id);
                }
            }
        }
    }

    #[test]
    fn test_duplicate_leaves_source_untouched() {
        let tree = sample_tree();
        let before = tree.all_ids();
        let first = tree.duplicate();
        let second = tree.duplicate();
        assert_eq!(tree.all_ids(), before);
        assert_eq!(tree.root.name, "Volumen");
        let a: HashSet<Uuid> = first.all_ids().into_iter().collect();
        assert!(second.all_ids().iter().all(|id| !a.contains(id)));
    }

    #[test]
    fn test_assign_copy_binds_client_and_keeps_name() {
        let tree = sample_tree();
        let client = Uuid::new_v4();
        let assigned = tree.assign_copy(client);
        assert_eq!(assigned.root.client_id, Some(client));
        assert!(!assigned.root.is_template);
        assert_eq!(assigned.root.name, "Volumen");
        assert_ne!(assigned.root.id, tree.root.id);
    }

    #[test]
    fn test_remove_and_move_keep_order_dense() {
        let mut tree = sample_tree();
        let removed = tree.groups[0].remove_leaf(1).unwrap();
        assert_eq!(removed.node.name, "Huevos");
        let order: Vec<i32> = tree.groups[0].leaves.iter().map(|l| l.node.order_index).collect();
        assert_eq!(order, vec![0, 1]);

        assert!(tree.move_group(1, 0));
        assert_eq!(tree.groups[0].node.name, "Comida");
        assert_eq!(tree.groups[0].node.order_index, 0);
        assert_eq!(tree.groups[1].node.order_index, 1);
        assert!(!tree.move_group(0, 5));
    }

    #[test]
    fn test_from_rows_sorts_and_drops_orphans() {
        let tree = sample_tree();
        let levels = tree.levels();
        let mut groups = levels.groups.clone();
        groups.reverse();
        let mut leaves = levels.leaves.clone();
        leaves.push(Food::new(Uuid::new_v4(), "Huérfano".into(), "1".into()));

        let rebuilt = DietTree::from_rows(levels.root.clone(), groups, leaves, levels.substitutions.clone());
        assert_eq!(rebuilt.node_count(), tree.node_count());
        assert_eq!(rebuilt.all_ids(), tree.all_ids());
    }

    #[test]
    fn test_meal_calories_skips_missing() {
        let mut a = Food::new(Uuid::nil(), "a".into(), "1".into());
        a.calories = Some(120.0);
        let b = Food::new(Uuid::nil(), "b".into(), "1".into());
        assert_eq!(meal_calories(&[a, b]), 120.0);
    }
}
