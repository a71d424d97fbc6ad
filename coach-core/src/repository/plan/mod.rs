//! Plan Repository Module
//!
//! Persistence of diet and workout plan trees, split into specialized sub-modules:
//! - plan_repo: Loading trees and listing plans
//! - plan_persistence: Level-by-level inserts, replace-all save, delete
//! - plan_duplication: Template duplication and assignment to clients

mod plan_repo;
mod plan_persistence;
mod plan_duplication;

pub use plan_repo::{DietRepository, PlanRepository, WorkoutRepository};

// Re-export all operation traits so they can be used by importing PlanRepository
pub use plan_persistence::PlanPersistenceOperations;
pub use plan_duplication::PlanDuplicationOperations;
