//! Clients Admin
//!
//! Client roster with inline profile editing, activation and the plans assigned to
//! each client.

use coach_core::domain::Profile;
use coach_core::DomainResult;
use leptos::prelude::*;
use leptos::task::spawn_local;
use uuid::Uuid;

use super::skeleton::{EmptyState, Skeleton};
use crate::context::AppContext;
use crate::hooks::use_page_data;
use crate::services::{use_services, SharedServices};
use crate::store::{store_update_client, use_app_store, AppStateStoreFields};

/// Same order the roster query uses: active first, then by name
fn sort_roster(clients: &mut [Profile]) {
    clients.sort_by(|a, b| {
        b.active
            .cmp(&a.active)
            .then_with(|| a.full_name.to_lowercase().cmp(&b.full_name.to_lowercase()))
    });
}

/// Names of the plans assigned to one client, newest first
#[derive(Clone, Debug, Default)]
struct AssignedPlans {
    diets: Vec<String>,
    workouts: Vec<String>,
}

async fn load_assigned(services: SharedServices, client_id: Uuid) -> DomainResult<AssignedPlans> {
    let diets = services.diets.list_for_client(client_id).await?;
    let workouts = services.workouts.list_for_client(client_id).await?;
    Ok(AssignedPlans {
        diets: diets.into_iter().map(|d| d.name).collect(),
        workouts: workouts.into_iter().map(|w| w.name).collect(),
    })
}

#[component]
pub fn ClientsAdmin() -> impl IntoView {
    let services = use_services();
    let store = use_app_store();
    let (show_inactive, set_show_inactive) = signal(false);
    let (expanded, set_expanded) = signal::<Option<Uuid>>(None);

    let page = {
        let services = services.clone();
        use_page_data(
            "clients",
            Vec::new,
            move |_identity| {
                let services = services.clone();
                async move { services.profiles.list_clients().await }
            },
            move |clients| *store.clients().write() = clients,
        )
    };
    let first_load = page.first_load;

    let visible = move || {
        let all = show_inactive.get();
        store
            .clients()
            .read()
            .iter()
            .filter(|c| all || c.active)
            .cloned()
            .collect::<Vec<_>>()
    };

    view! {
        <section class="clients-admin">
            <header class="view-header">
                <h2>"Clientes"</h2>
                <button class="small" on:click=move |_| page.refetch()>"↻"</button>
            </header>
            <label class="toggle">
                <input
                    type="checkbox"
                    prop:checked=move || show_inactive.get()
                    on:change=move |ev| set_show_inactive.set(event_target_checked(&ev))
                />
                "Mostrar inactivos"
            </label>
            <Show when=move || !first_load.get() fallback=|| view! { <Skeleton rows=5 /> }>
                {
                    let services = services.clone();
                    move || {
                        let clients = visible();
                        if clients.is_empty() {
                            return view! { <EmptyState message="No hay clientes." error=page.error on_retry=move |_: ()| page.refetch() /> }.into_any();
                        }
                        let services = services.clone();
                        view! {
                            <ul class="client-list">
                                {clients.into_iter().map(|client| {
                                    let id = client.id;
                                    view! {
                                        <ClientCard
                                            client=client
                                            services=services.clone()
                                            open=Signal::derive(move || expanded.get() == Some(id))
                                            on_toggle=move |_: ()| set_expanded.update(|e| {
                                                *e = if *e == Some(id) { None } else { Some(id) };
                                            })
                                        />
                                    }
                                }).collect_view()}
                            </ul>
                        }.into_any()
                    }
                }
            </Show>
        </section>
    }
}

#[component]
fn ClientCard(
    client: Profile,
    services: SharedServices,
    open: Signal<bool>,
    #[prop(into)] on_toggle: Callback<()>,
) -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext should be provided");
    let store = use_app_store();
    let id = client.id;
    let (assigned, set_assigned) = signal::<Option<AssignedPlans>>(None);

    // Fetch assigned plans the first time the card opens
    {
        let services = services.clone();
        Effect::new(move |_| {
            if !open.get() || assigned.get_untracked().is_some() {
                return;
            }
            let services = services.clone();
            spawn_local(async move {
                match load_assigned(services, id).await {
                    Ok(plans) => set_assigned.set(Some(plans)),
                    Err(e) => log::warn!("[CLIENTS] assigned plans for {} failed: {}", id, e),
                }
            });
        });
    }

    let on_toggle_active = {
        let services = services.clone();
        let active = client.active;
        move |_| {
            let services = services.clone();
            spawn_local(async move {
                match services.profiles.set_active(id, !active).await {
                    Ok(()) => {
                        let clients_field = store.clients();
                        let mut clients = clients_field.write();
                        if let Some(c) = clients.iter_mut().find(|c| c.id == id) {
                            c.active = !active;
                        }
                        sort_roster(&mut clients);
                    }
                    Err(e) => ctx.notify(e.user_message()),
                }
            });
        }
    };

    let form_client = client.clone();
    view! {
        <li class=if client.active { "client-card" } else { "client-card inactive" }>
            <div class="client-head" on:click=move |_| on_toggle.run(())>
                <span class="client-name">{client.display_name().to_string()}</span>
                <span class="client-email">{client.email.clone()}</span>
            </div>
            <Show when=move || open.get()>
                <ClientForm client=form_client.clone() services=services.clone() />
                <div class="client-plans">
                    {move || match assigned.get() {
                        None => view! { <Skeleton rows=1 /> }.into_any(),
                        Some(plans) => view! {
                            <p>"Dieta: " {plans.diets.first().cloned().unwrap_or_else(|| "sin asignar".into())}</p>
                            <p>"Rutina: " {plans.workouts.first().cloned().unwrap_or_else(|| "sin asignar".into())}</p>
                        }.into_any(),
                    }}
                </div>
                <button class="small" on:click=on_toggle_active.clone()>
                    {if form_client.active { "Desactivar" } else { "Activar" }}
                </button>
            </Show>
        </li>
    }
}

#[component]
fn ClientForm(client: Profile, services: SharedServices) -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext should be provided");
    let store = use_app_store();
    let (name, set_name) = signal(client.full_name.clone());
    let (phone, set_phone) = signal(client.phone.clone().unwrap_or_default());
    let (goal, set_goal) = signal(client.goal_weight_kg.map(|g| g.to_string()).unwrap_or_default());
    let (water, set_water) = signal(client.water_goal_ml.map(|w| w.to_string()).unwrap_or_default());
    let base = StoredValue::new(client);

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let mut updated = base.get_value();
        updated.full_name = name.get_untracked().trim().to_string();
        let phone_text = phone.get_untracked();
        updated.phone = Some(phone_text.trim().to_string()).filter(|p| !p.is_empty());

        let goal_text = goal.get_untracked();
        updated.goal_weight_kg = if goal_text.trim().is_empty() {
            None
        } else {
            match coach_core::validation::parse_weight(&goal_text) {
                Ok(kg) => Some(kg),
                Err(e) => {
                    ctx.notify(e.user_message());
                    return;
                }
            }
        };
        let water_text = water.get_untracked();
        updated.water_goal_ml = if water_text.trim().is_empty() {
            None
        } else {
            match water_text.trim().parse::<i32>() {
                Ok(ml) if ml > 0 => Some(ml),
                _ => {
                    ctx.notify("Objetivo de agua no válido.");
                    return;
                }
            }
        };

        let services = services.clone();
        spawn_local(async move {
            match services.profiles.update_client(&updated).await {
                Ok(stored) => {
                    base.set_value(stored.clone());
                    store_update_client(&store, stored);
                    ctx.notify("Cliente guardado.");
                }
                Err(e) => ctx.notify(e.user_message()),
            }
        });
    };

    view! {
        <form class="client-form" on:submit=on_submit>
            <label>"Nombre"
                <input type="text" prop:value=move || name.get() on:input=move |ev| set_name.set(event_target_value(&ev)) />
            </label>
            <label>"Teléfono"
                <input type="tel" prop:value=move || phone.get() on:input=move |ev| set_phone.set(event_target_value(&ev)) />
            </label>
            <label>"Peso objetivo (kg)"
                <input type="text" inputmode="decimal" prop:value=move || goal.get() on:input=move |ev| set_goal.set(event_target_value(&ev)) />
            </label>
            <label>"Agua diaria (ml)"
                <input type="text" inputmode="numeric" prop:value=move || water.get() on:input=move |ev| set_water.set(event_target_value(&ev)) />
            </label>
            <button type="submit" class="small primary">"Guardar"</button>
        </form>
    }
}
