//! Domain Layer
//!
//! Contains all domain entities and core abstractions.
//! This layer has NO backend dependencies (only serde, chrono and uuid).

mod entity;
mod profile;
mod plan;
mod diet;
mod workout;
mod progress;
mod guideline;

pub use entity::{Entity, DomainError, DomainResult};
pub use profile::{Profile, Role};
pub use plan::{
    GroupBranch, LeafBranch, PlanKind, PlanLevels, PlanNode, PlanRoot, PlanTree, COPY_SUFFIX,
};
pub use diet::{meal_calories, DietKind, DietPlan, Food, FoodSubstitution, Meal};
pub use workout::{Exercise, ExerciseSubstitution, WorkoutDay, WorkoutKind, WorkoutPlan};
pub use progress::{
    photo_pair, PhotoPair, PhotoPose, ProgressEntry, ProgressPhoto, WeightTrend, WorkoutLog,
};
pub use guideline::Guideline;

/// Diet plan tree
pub type DietTree = PlanTree<DietKind>;
/// Workout plan tree
pub type WorkoutTree = PlanTree<WorkoutKind>;
