//! Global Application State Store
//!
//! Admin-side lists shared between the templates and clients screens, using Leptos
//! reactive_stores for fine-grained reactivity.

use coach_core::domain::{DietPlan, Profile, WorkoutPlan};
use leptos::prelude::*;
use reactive_stores::Store;
use uuid::Uuid;

/// Global application state with field-level reactivity
#[derive(Clone, Debug, Default, Store)]
pub struct AppState {
    /// Diet templates, newest first
    pub diet_templates: Vec<DietPlan>,
    /// Workout templates, newest first
    pub workout_templates: Vec<WorkoutPlan>,
    /// Client roster (active first, then by name)
    pub clients: Vec<Profile>,
}

/// Type alias for the store
pub type AppStore = Store<AppState>;

/// Get the app store from context
pub fn use_app_store() -> AppStore {
    expect_context::<AppStore>()
}

// ========================
// Store Helper Functions
// ========================

/// New template goes to the top, matching the newest-first listing
pub fn store_add_diet_template(store: &AppStore, plan: DietPlan) {
    store.diet_templates().write().insert(0, plan);
}

pub fn store_remove_diet_template(store: &AppStore, id: Uuid) {
    store.diet_templates().write().retain(|p| p.id != id);
}

pub fn store_add_workout_template(store: &AppStore, plan: WorkoutPlan) {
    store.workout_templates().write().insert(0, plan);
}

pub fn store_remove_workout_template(store: &AppStore, id: Uuid) {
    store.workout_templates().write().retain(|p| p.id != id);
}

/// Keep the listed root in step with a saved tree
pub fn store_replace_diet_template(store: &AppStore, plan: DietPlan) {
    if let Some(entry) = store.diet_templates().write().iter_mut().find(|p| p.id == plan.id) {
        *entry = plan;
    }
}

pub fn store_replace_workout_template(store: &AppStore, plan: WorkoutPlan) {
    if let Some(entry) = store.workout_templates().write().iter_mut().find(|p| p.id == plan.id) {
        *entry = plan;
    }
}

/// Replace a client in the roster by ID
pub fn store_update_client(store: &AppStore, updated: Profile) {
    if let Some(client) = store.clients().write().iter_mut().find(|c| c.id == updated.id) {
        *client = updated;
    }
}

/// Display name of a roster entry, for assignment confirmations
pub fn store_client_name(store: &AppStore, id: Uuid) -> Option<String> {
    store
        .clients()
        .read_untracked()
        .iter()
        .find(|c| c.id == id)
        .map(|c| c.display_name().to_string())
}
