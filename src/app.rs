//! Coach Frontend App
//!
//! Main application component: backend wiring, session restore, role routing.

use std::sync::Arc;

use chrono::Utc;
use coach_core::backend::AuthEvent;
use coach_core::cache::Reconciled;
use coach_core::domain::Role;
use coach_core::BackendConfig;
use gloo_timers::future::TimeoutFuture;
use leptos::prelude::*;
use leptos::task::spawn_local;
use reactive_stores::Store;
use uuid::Uuid;

use crate::components::{
    BottomNav, ClientsAdmin, DiagnosticsPanel, DietView, GuidelinesView, LoginView, ProgressView,
    TemplatesAdmin, WorkoutView,
};
use crate::context::{AppContext, View};
use crate::hooks::install_resume_listeners;
use crate::services::{use_services, Services, SharedServices};
use crate::storage;
use crate::store::AppState;

/// How long a toast stays up
const NOTICE_MS: u32 = 3_500;

#[component]
pub fn App() -> impl IntoView {
    let services = BackendConfig::from_build_env().and_then(Services::connect);

    match services {
        Ok(services) => {
            provide_context::<SharedServices>(Arc::new(services));
            view! { <Shell /> }.into_any()
        }
        Err(e) => {
            log::error!("[APP] backend configuration: {}", e);
            view! {
                <div class="config-error">
                    <h1>"Coach"</h1>
                    <p>"La aplicación no está configurada correctamente."</p>
                    <p class="detail">{e.to_string()}</p>
                </div>
            }
            .into_any()
        }
    }
}

/// Restore a stored session, seeding the role from the cache when it matches
fn restore_session(services: &SharedServices) -> Option<(Uuid, Option<Role>)> {
    let session = storage::load_session()?;
    if let Err(e) = services.auth.restore(&session, Utc::now().timestamp()) {
        log::info!("[AUTH] stored session dropped: {}", e);
        storage::clear_session();
        storage::role_cache().clear();
        return None;
    }
    let user_id = session.user_id();
    let role = storage::role_cache()
        .read()
        .filter(|cached| cached.user_id == user_id)
        .map(|cached| cached.role);
    log::info!("[AUTH] restored session for {} (cached role: {:?})", user_id, role);
    Some((user_id, role))
}

#[component]
fn Shell() -> impl IntoView {
    let services = use_services();
    let restored = restore_session(&services);

    let (user_id, set_user_id) = signal(restored.map(|(id, _)| id));
    let (role, set_role) = signal(restored.and_then(|(_, role)| role));
    let initial_view = restored
        .and_then(|(_, role)| role)
        .map(View::home)
        .unwrap_or(View::Diet);
    let (current_view, set_view) = signal(initial_view);

    let ctx = AppContext::new((user_id, set_user_id), (role, set_role), (current_view, set_view));
    provide_context(ctx);
    provide_context(Store::new(AppState::default()));

    install_resume_listeners(ctx);

    // Auth state changes from the client (token refresh failures, remote sign-out)
    services.auth.subscribe(move |event| match event {
        AuthEvent::SignedIn(id) => {
            log::info!("[AUTH] signed in {}", id);
        }
        AuthEvent::SignedOut => {
            log::info!("[AUTH] signed out");
            ctx.set_user(None);
        }
    });

    // Fresh profile for whoever is signed in; the role cache follows it
    {
        let services = services.clone();
        Effect::new(move |_| {
            let Some(id) = user_id.get() else {
                return;
            };
            let services = services.clone();
            spawn_local(async move {
                match services.profiles.get(id).await {
                    Ok(Some(profile)) => {
                        if let Reconciled::Updated { previous: Some(previous) } = storage::role_cache().reconcile(&profile) {
                            log::warn!("[ROLE] cached {:?} replaced by {:?}", previous, profile.role);
                        }
                        if ctx.user_id.get_untracked() == Some(id) {
                            ctx.set_role(profile.role);
                            ctx.profile.set(Some(profile));
                        }
                    }
                    Ok(None) => {
                        log::error!("[APP] no profile for {}", id);
                        ctx.notify("No se encontró tu perfil.");
                    }
                    Err(e) => {
                        log::error!("[APP] profile load failed: {}", e);
                        // Without a cached role there is nothing to show yet
                        if ctx.role.get_untracked().is_none() {
                            ctx.notify(e.user_message());
                            storage::clear_session();
                            ctx.set_user(None);
                        }
                    }
                }
            });
        });
    }

    // Toast auto-dismiss
    Effect::new(move |_| {
        if ctx.notice.get().is_none() {
            return;
        }
        spawn_local(async move {
            TimeoutFuture::new(NOTICE_MS).await;
            ctx.notice.set(None);
        });
    });

    view! {
        <div class="app-layout">
            <Show when=move || user_id.get().is_some() fallback=|| view! { <LoginView /> }>
                <Show
                    when=move || role.get().is_some()
                    fallback=|| view! { <div class="app-loading"><div class="spinner"></div></div> }
                >
                    <main class="main-content">
                        {move || match current_view.get() {
                            View::Diet => view! { <DietView /> }.into_any(),
                            View::Workout => view! { <WorkoutView /> }.into_any(),
                            View::Progress => view! { <ProgressView /> }.into_any(),
                            View::Guidelines => view! { <GuidelinesView /> }.into_any(),
                            View::Templates => view! { <TemplatesAdmin /> }.into_any(),
                            View::Clients => view! { <ClientsAdmin /> }.into_any(),
                            View::Diagnostics => view! { <DiagnosticsPanel /> }.into_any(),
                        }}
                    </main>
                    <BottomNav />
                </Show>
            </Show>
            {move || ctx.notice.get().map(|message| view! {
                <div class="toast" on:click=move |_| ctx.notice.set(None)>{message}</div>
            })}
        </div>
    }
}
