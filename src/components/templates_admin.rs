//! Templates Admin
//!
//! Diet and workout templates: create, duplicate, delete, assign to a client, and open
//! the tree editor.

use coach_core::domain::{DietPlan, PlanTree, Profile, WorkoutPlan};
use coach_core::repository::{PlanDuplicationOperations, PlanPersistenceOperations};
use coach_core::{validation, DomainResult};
use leptos::prelude::*;
use leptos::task::spawn_local;
use uuid::Uuid;

use super::confirm_delete::ConfirmDelete;
use super::skeleton::{EmptyState, Skeleton};
use super::template_editor::TemplateEditor;
use crate::context::AppContext;
use crate::hooks::use_page_data;
use crate::services::{use_services, SharedServices};
use crate::store::{
    store_add_diet_template, store_add_workout_template, store_client_name,
    store_remove_diet_template, store_remove_workout_template, use_app_store, AppStateStoreFields,
    AppStore,
};

/// Which plan family a screen or row works on
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlanFamily {
    Diet,
    Workout,
}

impl PlanFamily {
    pub fn label(&self) -> &'static str {
        match self {
            PlanFamily::Diet => "Dietas",
            PlanFamily::Workout => "Rutinas",
        }
    }
}

/// Everything the admin lists need in one load
#[derive(Clone, Debug, Default)]
struct TemplatesPage {
    diets: Vec<DietPlan>,
    workouts: Vec<WorkoutPlan>,
    clients: Vec<Profile>,
}

async fn load_page(services: SharedServices) -> DomainResult<TemplatesPage> {
    let diets = services.diets.list_templates().await?;
    let workouts = services.workouts.list_templates().await?;
    let clients = services.profiles.list_clients().await?;
    Ok(TemplatesPage { diets, workouts, clients })
}

/// Row shown for either family
#[derive(Clone, Debug, PartialEq)]
struct TemplateRow {
    id: Uuid,
    name: String,
    description: Option<String>,
}

fn rows(store: &AppStore, family: PlanFamily) -> Vec<TemplateRow> {
    match family {
        PlanFamily::Diet => store
            .diet_templates()
            .read()
            .iter()
            .map(|p| TemplateRow { id: p.id, name: p.name.clone(), description: p.description.clone() })
            .collect(),
        PlanFamily::Workout => store
            .workout_templates()
            .read()
            .iter()
            .map(|p| TemplateRow { id: p.id, name: p.name.clone(), description: p.description.clone() })
            .collect(),
    }
}

async fn create_template(services: SharedServices, store: AppStore, family: PlanFamily, name: String) -> DomainResult<()> {
    let name = validation::template_name(&name)?;
    match family {
        PlanFamily::Diet => {
            let tree = PlanTree::new(DietPlan::template(name));
            services.diets.insert_tree(&tree).await?;
            store_add_diet_template(&store, tree.root);
        }
        PlanFamily::Workout => {
            let tree = PlanTree::new(WorkoutPlan::template(name));
            services.workouts.insert_tree(&tree).await?;
            store_add_workout_template(&store, tree.root);
        }
    }
    Ok(())
}

async fn duplicate_template(services: SharedServices, store: AppStore, family: PlanFamily, id: Uuid) -> DomainResult<()> {
    match family {
        PlanFamily::Diet => {
            let copy = services.diets.duplicate(id).await?;
            store_add_diet_template(&store, copy.root);
        }
        PlanFamily::Workout => {
            let copy = services.workouts.duplicate(id).await?;
            store_add_workout_template(&store, copy.root);
        }
    }
    Ok(())
}

async fn delete_template(services: SharedServices, store: AppStore, family: PlanFamily, id: Uuid) -> DomainResult<()> {
    match family {
        PlanFamily::Diet => {
            services.diets.delete_tree(id).await?;
            store_remove_diet_template(&store, id);
        }
        PlanFamily::Workout => {
            services.workouts.delete_tree(id).await?;
            store_remove_workout_template(&store, id);
        }
    }
    Ok(())
}

async fn assign_template(services: SharedServices, family: PlanFamily, id: Uuid, client_id: Uuid) -> DomainResult<()> {
    match family {
        PlanFamily::Diet => services.diets.assign_to_client(id, client_id).await.map(|_| ()),
        PlanFamily::Workout => services.workouts.assign_to_client(id, client_id).await.map(|_| ()),
    }
}

#[component]
pub fn TemplatesAdmin() -> impl IntoView {
    let services = use_services();
    let store = use_app_store();
    let (family, set_family) = signal(PlanFamily::Diet);
    let editing = RwSignal::new(None::<(PlanFamily, Uuid)>);

    let page = {
        let services = services.clone();
        use_page_data(
            "templates",
            Vec::new,
            move |_identity| load_page(services.clone()),
            move |loaded: TemplatesPage| {
                *store.diet_templates().write() = loaded.diets;
                *store.workout_templates().write() = loaded.workouts;
                *store.clients().write() = loaded.clients;
            },
        )
    };
    let first_load = page.first_load;

    view! {
        <section class="templates-admin">
            <Show
                when=move || editing.get().is_none()
                fallback=move || editing.get().map(|(family, id)| view! {
                    <TemplateEditor family=family id=id on_close=move |_| editing.set(None) />
                })
            >
                <header class="view-header">
                    <h2>"Plantillas"</h2>
                    <button class="small" on:click=move |_| page.refetch()>"↻"</button>
                </header>
                <div class="family-tabs">
                    {[PlanFamily::Diet, PlanFamily::Workout].into_iter().map(|f| view! {
                        <button
                            class=move || if family.get() == f { "family-tab active" } else { "family-tab" }
                            on:click=move |_| set_family.set(f)
                        >
                            {f.label()}
                        </button>
                    }).collect_view()}
                </div>
                <NewTemplateForm family=family />
                {
                let services = services.clone();
                view! {
                <Show when=move || !first_load.get() fallback=|| view! { <Skeleton rows=4 /> }>
                    {
                        let services = services.clone();
                        move || {
                            let current = family.get();
                            let list = rows(&store, current);
                            if list.is_empty() {
                                return view! { <EmptyState message="Todavía no hay plantillas." error=page.error on_retry=move |_: ()| page.refetch() /> }.into_any();
                            }
                            let services = services.clone();
                            view! {
                                <ul class="template-list">
                                    {list.into_iter().map(|row| view! {
                                        <TemplateCard
                                            family=current
                                            row=row
                                            services=services.clone()
                                            on_edit=move |id: Uuid| editing.set(Some((current, id)))
                                        />
                                    }).collect_view()}
                                </ul>
                            }.into_any()
                        }
                    }
                </Show>
                }
                }
            </Show>
        </section>
    }
}

#[component]
fn NewTemplateForm(family: ReadSignal<PlanFamily>) -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext should be provided");
    let services = use_services();
    let store = use_app_store();
    let (name, set_name) = signal(String::new());

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let services = services.clone();
        let (current, text) = (family.get_untracked(), name.get_untracked());
        spawn_local(async move {
            match create_template(services, store, current, text).await {
                Ok(()) => set_name.set(String::new()),
                Err(e) => ctx.notify(e.user_message()),
            }
        });
    };

    view! {
        <form class="new-template-form" on:submit=on_submit>
            <input
                type="text"
                placeholder=move || match family.get() {
                    PlanFamily::Diet => "Nueva dieta...",
                    PlanFamily::Workout => "Nueva rutina...",
                }
                prop:value=move || name.get()
                on:input=move |ev| set_name.set(event_target_value(&ev))
            />
            <button type="submit" class="small primary">"Crear"</button>
        </form>
    }
}

#[component]
fn TemplateCard(
    family: PlanFamily,
    row: TemplateRow,
    services: SharedServices,
    #[prop(into)] on_edit: Callback<Uuid>,
) -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext should be provided");
    let store = use_app_store();
    let id = row.id;
    let (assignee, set_assignee) = signal(String::new());
    let (busy, set_busy) = signal(false);

    let on_duplicate = {
        let services = services.clone();
        move |_| {
            let services = services.clone();
            set_busy.set(true);
            spawn_local(async move {
                if let Err(e) = duplicate_template(services, store, family, id).await {
                    ctx.notify(e.user_message());
                }
                set_busy.set(false);
            });
        }
    };

    let on_delete = {
        let services = services.clone();
        move |_| {
            let services = services.clone();
            spawn_local(async move {
                if let Err(e) = delete_template(services, store, family, id).await {
                    ctx.notify(e.user_message());
                }
            });
        }
    };

    let on_assign = move |_| {
        let Ok(client_id) = Uuid::parse_str(&assignee.get_untracked()) else {
            ctx.notify("Elige un cliente.");
            return;
        };
        let services = services.clone();
        set_busy.set(true);
        spawn_local(async move {
            match assign_template(services, family, id, client_id).await {
                Ok(()) => {
                    let who = store_client_name(&store, client_id).unwrap_or_else(|| client_id.to_string());
                    ctx.notify(format!("Asignada a {}", who));
                    set_assignee.set(String::new());
                }
                Err(e) => ctx.notify(e.user_message()),
            }
            set_busy.set(false);
        });
    };

    view! {
        <li class="template-card">
            <div class="template-head" on:click=move |_| on_edit.run(id)>
                <span class="template-name">{row.name.clone()}</span>
                {row.description.clone().map(|d| view! { <span class="template-desc">{d}</span> })}
            </div>
            <div class="template-actions">
                <button class="small" on:click=move |_| on_edit.run(id)>"Editar"</button>
                <button class="small" disabled=move || busy.get() on:click=on_duplicate>"Duplicar"</button>
                <ConfirmDelete what="la plantilla" on_confirm=on_delete />
            </div>
            <div class="template-assign">
                <select on:change=move |ev| set_assignee.set(event_target_value(&ev)) prop:value=move || assignee.get()>
                    <option value="">"Asignar a..."</option>
                    {move || store.clients().read().iter().filter(|c| c.active).map(|c| view! {
                        <option value=c.id.to_string()>{c.display_name().to_string()}</option>
                    }).collect_view()}
                </select>
                <button class="small" disabled=move || busy.get() || assignee.get().is_empty() on:click=on_assign>
                    "Asignar"
                </button>
            </div>
        </li>
    }
}
