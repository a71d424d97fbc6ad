//! Repository Layer
//!
//! Typed data access on top of the untyped backend client.

mod traits;
mod table_repo;
mod plan;
mod profile_repo;
mod progress_repo;
mod photo_repo;
mod guideline_repo;

#[cfg(test)]
mod tests;

pub use traits::Repository;
pub use table_repo::TableRepository;
pub use plan::{
    DietRepository, PlanDuplicationOperations, PlanPersistenceOperations, PlanRepository,
    WorkoutRepository,
};
pub use profile_repo::ProfileRepository;
pub use progress_repo::ProgressRepository;
pub use photo_repo::{photo_path, PhotoRepository};
pub use guideline_repo::GuidelineRepository;
