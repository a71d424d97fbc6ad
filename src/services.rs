//! Backend Services
//!
//! The backend client is constructed once at startup and handed to every repository.
//! Views reach it through context, never through globals.

use std::sync::Arc;

use coach_core::backend::{AuthClient, RestBackend, RestContext, RestStorage, SharedBackend, SharedStorage};
use coach_core::repository::{
    DietRepository, GuidelineRepository, PhotoRepository, ProfileRepository, ProgressRepository,
    WorkoutRepository,
};
use coach_core::{BackendConfig, DomainResult};
use leptos::prelude::*;

pub struct Services {
    pub auth: AuthClient,
    pub profiles: ProfileRepository,
    pub diets: DietRepository,
    pub workouts: WorkoutRepository,
    pub progress: ProgressRepository,
    pub photos: PhotoRepository,
    pub guidelines: GuidelineRepository,
}

pub type SharedServices = Arc<Services>;

impl Services {
    pub fn connect(config: BackendConfig) -> DomainResult<Self> {
        let ctx = RestContext::new(config)?;
        let backend: SharedBackend = Arc::new(RestBackend::new(ctx.clone()));
        let storage: SharedStorage = Arc::new(RestStorage::new(ctx.clone()));
        log::info!("[APP] backend at {}", ctx.config().url);

        Ok(Self {
            auth: AuthClient::new(ctx),
            profiles: ProfileRepository::new(backend.clone()),
            diets: DietRepository::new(backend.clone()),
            workouts: WorkoutRepository::new(backend.clone()),
            progress: ProgressRepository::new(backend.clone()),
            photos: PhotoRepository::new(backend.clone(), storage),
            guidelines: GuidelineRepository::new(backend),
        })
    }
}

/// Services provided by the app shell
pub fn use_services() -> SharedServices {
    expect_context::<SharedServices>()
}
