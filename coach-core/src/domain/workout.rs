//! Workout Plan Entities
//!
//! workouts -> workout_days -> exercises -> exercise_substitutions

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::diet::plan_node;
use super::entity::Entity;
use super::plan::{PlanKind, PlanNode, PlanRoot};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WorkoutKind;

impl PlanKind for WorkoutKind {
    type Root = WorkoutPlan;
    type Group = WorkoutDay;
    type Leaf = Exercise;
    type Substitution = ExerciseSubstitution;
    const LABEL: &'static str = "workout";
}

/// A workout plan; a template when `client_id` is None
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutPlan {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub client_id: Option<Uuid>,
    #[serde(default)]
    pub is_template: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl WorkoutPlan {
    pub fn template(name: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            description: None,
            client_id: None,
            is_template: true,
            created_at: None,
        }
    }
}

impl Entity for WorkoutPlan {
    type Id = Uuid;
    const TABLE: &'static str = "workouts";

    fn id(&self) -> Self::Id {
        self.id
    }
}

impl PlanRoot for WorkoutPlan {
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

/// One training day ("Día 1 - Pierna")
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutDay {
    pub id: Uuid,
    pub workout_id: Uuid,
    pub name: String,
    #[serde(default)]
    pub notes: Option<String>,
    pub order_index: i32,
}

impl WorkoutDay {
    pub fn new(workout_id: Uuid, name: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            workout_id,
            name,
            notes: None,
            order_index: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    pub id: Uuid,
    pub day_id: Uuid,
    pub name: String,
    pub sets: i32,
    /// Free text so ranges like "8-12" fit
    pub reps: String,
    #[serde(default)]
    pub rest_seconds: Option<i32>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub video_url: Option<String>,
    pub order_index: i32,
}

impl Exercise {
    pub fn new(day_id: Uuid, name: String, sets: i32, reps: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            day_id,
            name,
            sets,
            reps,
            rest_seconds: None,
            notes: None,
            video_url: None,
            order_index: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseSubstitution {
    pub id: Uuid,
    pub exercise_id: Uuid,
    pub name: String,
    #[serde(default)]
    pub notes: Option<String>,
    pub order_index: i32,
}

impl ExerciseSubstitution {
    pub fn new(exercise_id: Uuid, name: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            exercise_id,
            name,
            notes: None,
            order_index: 0,
        }
    }
}

plan_node!(WorkoutDay, "workout_days", workout_id);
plan_node!(Exercise, "exercises", day_id);
plan_node!(ExerciseSubstitution, "exercise_substitutions", exercise_id);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::plan::{GroupBranch, LeafBranch, PlanTree};

    #[test]
    fn test_workout_duplicate_remaps_days_and_exercises() {
        let mut tree = PlanTree::<WorkoutKind>::new(WorkoutPlan::template("Fuerza".into()));
        let mut day = GroupBranch::new(WorkoutDay::new(Uuid::nil(), "Pierna".into()));
        let mut squat = LeafBranch::<WorkoutKind>::new(Exercise::new(Uuid::nil(), "Sentadilla".into(), 4, "8-10".into()));
        let squat_id = squat.node.id;
        squat.push_substitution(ExerciseSubstitution::new(squat_id, "Prensa".into()));
        day.push_leaf(squat);
        tree.push_group(day);

        let copy = tree.duplicate();
        assert_eq!(copy.root.name, "Fuerza (Copia)");
        let day = &copy.groups[0];
        assert_eq!(day.node.workout_id, copy.root.id);
        assert_eq!(day.leaves[0].node.day_id, day.node.id);
        assert_eq!(day.leaves[0].substitutions[0].exercise_id, day.leaves[0].node.id);
        assert_eq!(day.leaves[0].node.reps, "8-10");
        assert_ne!(day.leaves[0].node.id, squat_id);
    }

    #[test]
    fn test_parent_columns() {
        assert_eq!(WorkoutDay::PARENT_COLUMN, "workout_id");
        assert_eq!(Exercise::PARENT_COLUMN, "day_id");
        assert_eq!(ExerciseSubstitution::TABLE, "exercise_substitutions");
    }
}
