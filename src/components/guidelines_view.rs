//! Guidelines View
//!
//! Clients read the published guidelines; admins also create, edit, publish, reorder
//! and delete them.

use coach_core::domain::{Guideline, Role};
use leptos::prelude::*;
use leptos::task::spawn_local;

use super::confirm_delete::ConfirmDelete;
use super::skeleton::{EmptyState, Skeleton};
use crate::context::AppContext;
use crate::hooks::use_page_data;
use crate::markdown::{parse_markdown, summary};
use crate::services::use_services;

/// Characters of body shown on a collapsed card
const SUMMARY_CHARS: usize = 140;

/// Move within the local list the same way the repository does remotely
fn move_local(list: &mut Vec<Guideline>, from: usize, to: usize) {
    if from >= list.len() || to >= list.len() || from == to {
        return;
    }
    let item = list.remove(from);
    list.insert(to, item);
    for (index, guideline) in list.iter_mut().enumerate() {
        guideline.order_index = index as i32;
    }
}

#[component]
pub fn GuidelinesView() -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext should be provided");
    let services = use_services();
    let guidelines = RwSignal::new(Vec::<Guideline>::new());
    let (expanded, set_expanded) = signal::<Option<uuid::Uuid>>(None);
    let is_admin = move || ctx.role.get() == Some(Role::Admin);

    let page = {
        let services = services.clone();
        use_page_data(
            "guidelines",
            move || vec![ctx.role.get().map(|r| r.as_str()).unwrap_or_default().to_string()],
            move |_identity| {
                let services = services.clone();
                let admin = ctx.role.get_untracked() == Some(Role::Admin);
                async move {
                    if admin {
                        services.guidelines.list_all().await
                    } else {
                        services.guidelines.list_published().await
                    }
                }
            },
            move |loaded| guidelines.set(loaded),
        )
    };
    let first_load = page.first_load;

    let reorder = {
        let services = services.clone();
        move |from: usize, to: usize| {
            let services = services.clone();
            spawn_local(async move {
                match services.guidelines.move_guideline(from, to).await {
                    Ok(()) => guidelines.update(|list| move_local(list, from, to)),
                    Err(e) => ctx.notify(e.user_message()),
                }
            });
        }
    };

    let remove = {
        let services = services.clone();
        move |id: uuid::Uuid| {
            let services = services.clone();
            spawn_local(async move {
                match services.guidelines.delete(id).await {
                    Ok(()) => guidelines.update(|list| {
                        list.retain(|g| g.id != id);
                        for (index, g) in list.iter_mut().enumerate() {
                            g.order_index = index as i32;
                        }
                    }),
                    Err(e) => ctx.notify(e.user_message()),
                }
            });
        }
    };

    let toggle_published = {
        let services = services.clone();
        move |mut guideline: Guideline| {
            guideline.published = !guideline.published;
            let services = services.clone();
            spawn_local(async move {
                match services.guidelines.update(&guideline).await {
                    Ok(stored) => guidelines.update(|list| {
                        if let Some(g) = list.iter_mut().find(|g| g.id == stored.id) {
                            *g = stored;
                        }
                    }),
                    Err(e) => ctx.notify(e.user_message()),
                }
            });
        }
    };

    view! {
        <section class="guidelines-view">
            <header class="view-header">
                <h2>"Pautas"</h2>
                <button class="small" on:click=move |_| page.refetch()>"↻"</button>
            </header>
            <Show when=is_admin>
                <GuidelineForm guidelines=guidelines />
            </Show>
            <Show when=move || !first_load.get() fallback=|| view! { <Skeleton rows=3 /> }>
                {
                let reorder = reorder.clone();
                let remove = remove.clone();
                let toggle_published = toggle_published.clone();
                view! {
                <Show
                    when=move || guidelines.with(|g| !g.is_empty())
                    fallback=move || view! { <EmptyState message="No hay pautas publicadas." error=page.error on_retry=move |_: ()| page.refetch() /> }
                >
                    <ul class="guideline-list">
                        {
                            let reorder = reorder.clone();
                            let remove = remove.clone();
                            let toggle_published = toggle_published.clone();
                            move || {
                                let count = guidelines.with(|g| g.len());
                                guidelines.get().into_iter().enumerate().map(|(index, g)| {
                                    let id = g.id;
                                    let open = move || expanded.get() == Some(id);
                                    let body_html = parse_markdown(&g.content);
                                    let short = summary(&g.content, SUMMARY_CHARS);
                                    let reorder_up = reorder.clone();
                                    let reorder_down = reorder.clone();
                                    let remove = remove.clone();
                                    let toggle_published = toggle_published.clone();
                                    let target = g.clone();
                                    view! {
                                        <li class=if g.published { "guideline-card" } else { "guideline-card draft" }>
                                            <div
                                                class="guideline-head"
                                                on:click=move |_| set_expanded.set(if open() { None } else { Some(id) })
                                            >
                                                <h3>{g.title.clone()}</h3>
                                                <Show when=is_admin>
                                                    <span class="guideline-admin" on:click=|ev| ev.stop_propagation()>
                                                        <button
                                                            class="small"
                                                            disabled=index == 0
                                                            on:click={
                                                                let reorder_up = reorder_up.clone();
                                                                move |_| reorder_up(index, index.saturating_sub(1))
                                                            }
                                                        >"↑"</button>
                                                        <button
                                                            class="small"
                                                            disabled={index + 1 >= count}
                                                            on:click={
                                                                let reorder_down = reorder_down.clone();
                                                                move |_| reorder_down(index, index + 1)
                                                            }
                                                        >"↓"</button>
                                                        <button
                                                            class="small"
                                                            on:click={
                                                                let toggle_published = toggle_published.clone();
                                                                let target = target.clone();
                                                                move |_| toggle_published(target.clone())
                                                            }
                                                        >
                                                            {if target.published { "Ocultar" } else { "Publicar" }}
                                                        </button>
                                                        <ConfirmDelete
                                                            what="la pauta"
                                                            on_confirm={
                                                                let remove = remove.clone();
                                                                move |_| remove(id)
                                                            }
                                                        />
                                                    </span>
                                                </Show>
                                            </div>
                                            <Show
                                                when=open
                                                fallback={
                                                    let short = short.clone();
                                                    move || view! { <p class="guideline-summary">{short.clone()}</p> }
                                                }
                                            >
                                                <div class="guideline-body" inner_html=body_html.clone()></div>
                                            </Show>
                                        </li>
                                    }
                                }).collect_view()
                            }
                        }
                    </ul>
                </Show>
                }
                }
            </Show>
        </section>
    }
}

/// New-guideline form for admins
#[component]
fn GuidelineForm(guidelines: RwSignal<Vec<Guideline>>) -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext should be provided");
    let services = use_services();
    let (title, set_title) = signal(String::new());
    let (content, set_content) = signal(String::new());
    let (preview, set_preview) = signal(false);

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let services = services.clone();
        let (title_text, body) = (title.get_untracked(), content.get_untracked());
        spawn_local(async move {
            match services.guidelines.create(&title_text, &body).await {
                Ok(created) => {
                    guidelines.update(|list| list.push(created));
                    set_title.set(String::new());
                    set_content.set(String::new());
                    set_preview.set(false);
                }
                Err(e) => ctx.notify(e.user_message()),
            }
        });
    };

    view! {
        <form class="guideline-form card" on:submit=on_submit>
            <input
                type="text"
                placeholder="Título"
                prop:value=move || title.get()
                on:input=move |ev| set_title.set(event_target_value(&ev))
            />
            <Show
                when=move || preview.get()
                fallback=move || view! {
                    <textarea
                        placeholder="Contenido (Markdown)"
                        prop:value=move || content.get()
                        on:input=move |ev| set_content.set(event_target_value(&ev))
                    ></textarea>
                }
            >
                <div class="guideline-body" inner_html=move || parse_markdown(&content.get())></div>
            </Show>
            <div class="form-actions">
                <button type="button" class="small" on:click=move |_| set_preview.update(|p| *p = !*p)>
                    {move || if preview.get() { "Editar" } else { "Vista previa" }}
                </button>
                <button type="submit" class="small primary">"Añadir pauta"</button>
            </div>
        </form>
    }
}
