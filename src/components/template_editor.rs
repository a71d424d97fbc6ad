//! Template Editor
//!
//! Edits a whole plan tree in memory and saves it in one go. Field edits commit on
//! `change` so the tree re-renders only when an input loses focus.

use std::str::FromStr;

use coach_core::domain::{
    DietPlan, DietTree, Exercise, ExerciseSubstitution, Food, FoodSubstitution, GroupBranch, LeafBranch,
    Meal, WorkoutDay, WorkoutPlan, WorkoutTree,
};
use coach_core::repository::PlanPersistenceOperations;
use leptos::prelude::*;
use leptos::task::spawn_local;
use uuid::Uuid;

use super::skeleton::Skeleton;
use super::templates_admin::PlanFamily;
use crate::context::AppContext;
use crate::services::use_services;
use crate::store::{store_replace_diet_template, store_replace_workout_template, use_app_store};

/// Trimmed text, `None` when blank
fn optional_text(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() { None } else { Some(trimmed.to_string()) }
}

/// Number typed with either decimal separator, `None` when blank or invalid
fn optional_number<T: FromStr>(value: &str) -> Option<T> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.replace(',', ".").parse().ok()
}

fn display<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

#[component]
pub fn TemplateEditor(family: PlanFamily, id: Uuid, #[prop(into)] on_close: Callback<()>) -> impl IntoView {
    match family {
        PlanFamily::Diet => view! { <DietEditor id=id on_close=on_close /> }.into_any(),
        PlanFamily::Workout => view! { <WorkoutEditor id=id on_close=on_close /> }.into_any(),
    }
}

/// Save bar shared by both editors
#[component]
fn EditorHeader(
    #[prop(into)] title: Signal<String>,
    dirty: ReadSignal<bool>,
    saving: ReadSignal<bool>,
    #[prop(into)] on_save: Callback<()>,
    on_close: Callback<()>,
) -> impl IntoView {
    view! {
        <header class="editor-header">
            <button class="small link" on:click=move |_| on_close.run(())>"← Volver"</button>
            <h2>{move || title.get()}</h2>
            <button
                class="small primary"
                disabled=move || saving.get() || !dirty.get()
                on:click=move |_| on_save.run(())
            >
                {move || if saving.get() { "Guardando..." } else { "Guardar" }}
            </button>
        </header>
    }
}

/// One or two text fields and an add button
#[component]
fn AddRowForm(
    placeholder: &'static str,
    #[prop(optional)] second: Option<&'static str>,
    #[prop(into)] on_add: Callback<(String, String)>,
) -> impl IntoView {
    let (first_value, set_first_value) = signal(String::new());
    let (second_value, set_second_value) = signal(String::new());

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let Some(text) = optional_text(&first_value.get_untracked()) else {
            return;
        };
        on_add.run((text, second_value.get_untracked().trim().to_string()));
        set_first_value.set(String::new());
        set_second_value.set(String::new());
    };

    view! {
        <form class="add-row-form" on:submit=on_submit>
            <input
                type="text"
                placeholder=placeholder
                prop:value=move || first_value.get()
                on:input=move |ev| set_first_value.set(event_target_value(&ev))
            />
            {second.map(|hint| view! {
                <input
                    type="text"
                    placeholder=hint
                    prop:value=move || second_value.get()
                    on:input=move |ev| set_second_value.set(event_target_value(&ev))
                />
            })}
            <button type="submit" class="small">"+"</button>
        </form>
    }
}

/// Up, down and remove for an ordered row
#[component]
fn RowControls(index: usize, count: usize, #[prop(into)] on_move: Callback<(usize, usize)>, #[prop(into)] on_remove: Callback<usize>) -> impl IntoView {
    view! {
        <span class="row-controls">
            <button class="small" disabled=index == 0 on:click=move |_| on_move.run((index, index.saturating_sub(1)))>"↑"</button>
            <button class="small" disabled=index + 1 >= count on:click=move |_| on_move.run((index, index + 1))>"↓"</button>
            <button class="small delete-btn" on:click=move |_| on_remove.run(index)>"×"</button>
        </span>
    }
}

// ========================
// Diet
// ========================

#[component]
fn DietEditor(id: Uuid, on_close: Callback<()>) -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext should be provided");
    let services = use_services();
    let store = use_app_store();
    let tree = RwSignal::new(None::<DietTree>);
    let (dirty, set_dirty) = signal(false);
    let (saving, set_saving) = signal(false);

    {
        let services = services.clone();
        spawn_local(async move {
            match services.diets.load_tree(id).await {
                Ok(loaded) => tree.set(Some(loaded)),
                Err(e) => {
                    log::error!("[EDITOR] load diet {} failed: {}", id, e);
                    ctx.notify(e.user_message());
                    on_close.run(());
                }
            }
        });
    }

    // Mutate the loaded tree and mark it unsaved
    let edit = move |f: &dyn Fn(&mut DietTree)| {
        tree.update(|t| {
            if let Some(t) = t.as_mut() {
                f(t);
            }
        });
        set_dirty.set(true);
    };

    let on_save = move |_: ()| {
        let Some(mut current) = tree.get_untracked() else {
            return;
        };
        let services = services.clone();
        set_saving.set(true);
        spawn_local(async move {
            match services.diets.save_tree(&mut current).await {
                Ok(()) => {
                    store_replace_diet_template(&store, current.root.clone());
                    tree.set(Some(current));
                    set_dirty.set(false);
                }
                Err(e) => ctx.notify(e.user_message()),
            }
            set_saving.set(false);
        });
    };

    let title = Signal::derive(move || tree.with(|t| t.as_ref().map(|t| t.root.name.clone())).unwrap_or_default());

    view! {
        <div class="template-editor">
            <EditorHeader title=title dirty=dirty saving=saving on_save=on_save on_close=on_close />
            {move || match tree.get() {
                None => view! { <Skeleton rows=5 /> }.into_any(),
                Some(current) => {
                    let meal_count = current.groups.len();
                    view! {
                        <DietRootFields root=current.root.clone() on_change=move |root: DietPlan| edit(&|t| t.root = root.clone()) />
                        <ol class="editor-groups">
                            {current.groups.into_iter().enumerate().map(|(mi, meal)| {
                                let food_count = meal.leaves.len();
                                view! {
                                    <li class="editor-group">
                                        <div class="editor-row">
                                            <input
                                                type="text"
                                                prop:value=meal.node.name.clone()
                                                on:change=move |ev| {
                                                    let name = event_target_value(&ev);
                                                    edit(&|t| t.groups[mi].node.name = name.trim().to_string());
                                                }
                                            />
                                            <input
                                                type="text"
                                                class="short"
                                                placeholder="Hora"
                                                prop:value=meal.node.time.clone().unwrap_or_default()
                                                on:change=move |ev| {
                                                    let time = optional_text(&event_target_value(&ev));
                                                    edit(&|t| t.groups[mi].node.time = time.clone());
                                                }
                                            />
                                            <RowControls
                                                index=mi
                                                count=meal_count
                                                on_move=move |(from, to): (usize, usize)| edit(&|t| { t.move_group(from, to); })
                                                on_remove=move |i: usize| edit(&|t| { t.remove_group(i); })
                                            />
                                        </div>
                                        <ul class="editor-leaves">
                                            {meal.leaves.into_iter().enumerate().map(|(fi, food)| view! {
                                                <li class="editor-leaf">
                                                    <div class="editor-row">
                                                        <input
                                                            type="text"
                                                            prop:value=food.node.name.clone()
                                                            on:change=move |ev| {
                                                                let name = event_target_value(&ev);
                                                                edit(&|t| t.groups[mi].leaves[fi].node.name = name.trim().to_string());
                                                            }
                                                        />
                                                        <input
                                                            type="text"
                                                            class="short"
                                                            placeholder="Cantidad"
                                                            prop:value=food.node.quantity.clone()
                                                            on:change=move |ev| {
                                                                let quantity = event_target_value(&ev);
                                                                edit(&|t| t.groups[mi].leaves[fi].node.quantity = quantity.trim().to_string());
                                                            }
                                                        />
                                                        <input
                                                            type="text"
                                                            class="short"
                                                            inputmode="decimal"
                                                            placeholder="kcal"
                                                            prop:value=display(food.node.calories)
                                                            on:change=move |ev| {
                                                                let kcal = optional_number::<f64>(&event_target_value(&ev));
                                                                edit(&|t| t.groups[mi].leaves[fi].node.calories = kcal);
                                                            }
                                                        />
                                                        <RowControls
                                                            index=fi
                                                            count=food_count
                                                            on_move=move |(from, to): (usize, usize)| edit(&|t| { t.groups[mi].move_leaf(from, to); })
                                                            on_remove=move |i: usize| edit(&|t| { t.groups[mi].remove_leaf(i); })
                                                        />
                                                    </div>
                                                    <ul class="editor-subs">
                                                        {food.substitutions.iter().enumerate().map(|(si, sub)| view! {
                                                            <li>
                                                                {format!("↔ {} ({})", sub.name, sub.quantity)}
                                                                <button
                                                                    class="small delete-btn"
                                                                    on:click=move |_| edit(&|t| { t.groups[mi].leaves[fi].remove_substitution(si); })
                                                                >"×"</button>
                                                            </li>
                                                        }).collect_view()}
                                                    </ul>
                                                    <AddRowForm
                                                        placeholder="Sustituto"
                                                        second="Cantidad"
                                                        on_add=move |(name, quantity): (String, String)| edit(&|t| {
                                                            let leaf = &mut t.groups[mi].leaves[fi];
                                                            let sub = FoodSubstitution::new(leaf.node.id, name.clone(), quantity.clone());
                                                            leaf.push_substitution(sub);
                                                        })
                                                    />
                                                </li>
                                            }).collect_view()}
                                        </ul>
                                        <AddRowForm
                                            placeholder="Alimento"
                                            second="Cantidad"
                                            on_add=move |(name, quantity): (String, String)| edit(&|t| {
                                                let meal = &mut t.groups[mi];
                                                let food = Food::new(meal.node.id, name.clone(), quantity.clone());
                                                meal.push_leaf(LeafBranch::new(food));
                                            })
                                        />
                                    </li>
                                }
                            }).collect_view()}
                        </ol>
                        <AddRowForm
                            placeholder="Nueva comida"
                            on_add=move |(name, _): (String, String)| edit(&|t| {
                                let meal = Meal::new(t.root.id, name.clone());
                                t.push_group(GroupBranch::new(meal));
                            })
                        />
                    }.into_any()
                }
            }}
        </div>
    }
}

#[component]
fn DietRootFields(root: DietPlan, #[prop(into)] on_change: Callback<DietPlan>) -> impl IntoView {
    let base = StoredValue::new(root.clone());
    let commit = move |f: &dyn Fn(&mut DietPlan)| {
        let mut next = base.get_value();
        f(&mut next);
        on_change.run(next);
    };

    view! {
        <div class="editor-root">
            <input
                type="text"
                prop:value=root.name.clone()
                on:change=move |ev| {
                    let name = event_target_value(&ev);
                    if let Ok(name) = coach_core::validation::template_name(&name) {
                        commit(&|r| r.name = name.clone());
                    }
                }
            />
            <input
                type="text"
                inputmode="numeric"
                placeholder="Objetivo kcal"
                prop:value=display(root.target_calories)
                on:change=move |ev| {
                    let kcal = optional_number::<i32>(&event_target_value(&ev));
                    commit(&|r| r.target_calories = kcal);
                }
            />
            <textarea
                placeholder="Descripción"
                prop:value=root.description.clone().unwrap_or_default()
                on:change=move |ev| {
                    let text = optional_text(&event_target_value(&ev));
                    commit(&|r| r.description = text.clone());
                }
            ></textarea>
            <textarea
                placeholder="Notas para el cliente"
                prop:value=root.notes.clone().unwrap_or_default()
                on:change=move |ev| {
                    let text = optional_text(&event_target_value(&ev));
                    commit(&|r| r.notes = text.clone());
                }
            ></textarea>
        </div>
    }
}

// ========================
// Workout
// ========================

#[component]
fn WorkoutEditor(id: Uuid, on_close: Callback<()>) -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext should be provided");
    let services = use_services();
    let store = use_app_store();
    let tree = RwSignal::new(None::<WorkoutTree>);
    let (dirty, set_dirty) = signal(false);
    let (saving, set_saving) = signal(false);

    {
        let services = services.clone();
        spawn_local(async move {
            match services.workouts.load_tree(id).await {
                Ok(loaded) => tree.set(Some(loaded)),
                Err(e) => {
                    log::error!("[EDITOR] load workout {} failed: {}", id, e);
                    ctx.notify(e.user_message());
                    on_close.run(());
                }
            }
        });
    }

    let edit = move |f: &dyn Fn(&mut WorkoutTree)| {
        tree.update(|t| {
            if let Some(t) = t.as_mut() {
                f(t);
            }
        });
        set_dirty.set(true);
    };

    let on_save = move |_: ()| {
        let Some(mut current) = tree.get_untracked() else {
            return;
        };
        let services = services.clone();
        set_saving.set(true);
        spawn_local(async move {
            match services.workouts.save_tree(&mut current).await {
                Ok(()) => {
                    store_replace_workout_template(&store, current.root.clone());
                    tree.set(Some(current));
                    set_dirty.set(false);
                }
                Err(e) => ctx.notify(e.user_message()),
            }
            set_saving.set(false);
        });
    };

    let title = Signal::derive(move || tree.with(|t| t.as_ref().map(|t| t.root.name.clone())).unwrap_or_default());

    view! {
        <div class="template-editor">
            <EditorHeader title=title dirty=dirty saving=saving on_save=on_save on_close=on_close />
            {move || match tree.get() {
                None => view! { <Skeleton rows=5 /> }.into_any(),
                Some(current) => {
                    let day_count = current.groups.len();
                    view! {
                        <WorkoutRootFields root=current.root.clone() on_change=move |root: WorkoutPlan| edit(&|t| t.root = root.clone()) />
                        <ol class="editor-groups">
                            {current.groups.into_iter().enumerate().map(|(di, day)| {
                                let exercise_count = day.leaves.len();
                                view! {
                                    <li class="editor-group">
                                        <div class="editor-row">
                                            <input
                                                type="text"
                                                prop:value=day.node.name.clone()
                                                on:change=move |ev| {
                                                    let name = event_target_value(&ev);
                                                    edit(&|t| t.groups[di].node.name = name.trim().to_string());
                                                }
                                            />
                                            <RowControls
                                                index=di
                                                count=day_count
                                                on_move=move |(from, to): (usize, usize)| edit(&|t| { t.move_group(from, to); })
                                                on_remove=move |i: usize| edit(&|t| { t.remove_group(i); })
                                            />
                                        </div>
                                        <textarea
                                            placeholder="Notas del día"
                                            prop:value=day.node.notes.clone().unwrap_or_default()
                                            on:change=move |ev| {
                                                let notes = optional_text(&event_target_value(&ev));
                                                edit(&|t| t.groups[di].node.notes = notes.clone());
                                            }
                                        ></textarea>
                                        <ul class="editor-leaves">
                                            {day.leaves.into_iter().enumerate().map(|(ei, exercise)| view! {
                                                <li class="editor-leaf">
                                                    <div class="editor-row">
                                                        <input
                                                            type="text"
                                                            prop:value=exercise.node.name.clone()
                                                            on:change=move |ev| {
                                                                let name = event_target_value(&ev);
                                                                edit(&|t| t.groups[di].leaves[ei].node.name = name.trim().to_string());
                                                            }
                                                        />
                                                        <input
                                                            type="text"
                                                            class="short"
                                                            inputmode="numeric"
                                                            placeholder="Series"
                                                            prop:value=exercise.node.sets.to_string()
                                                            on:change=move |ev| {
                                                                if let Some(sets) = optional_number::<i32>(&event_target_value(&ev)) {
                                                                    edit(&|t| t.groups[di].leaves[ei].node.sets = sets);
                                                                }
                                                            }
                                                        />
                                                        <input
                                                            type="text"
                                                            class="short"
                                                            placeholder="Reps"
                                                            prop:value=exercise.node.reps.clone()
                                                            on:change=move |ev| {
                                                                let reps = event_target_value(&ev);
                                                                edit(&|t| t.groups[di].leaves[ei].node.reps = reps.trim().to_string());
                                                            }
                                                        />
                                                        <input
                                                            type="text"
                                                            class="short"
                                                            inputmode="numeric"
                                                            placeholder="Descanso s"
                                                            prop:value=display(exercise.node.rest_seconds)
                                                            on:change=move |ev| {
                                                                let rest = optional_number::<i32>(&event_target_value(&ev));
                                                                edit(&|t| t.groups[di].leaves[ei].node.rest_seconds = rest);
                                                            }
                                                        />
                                                        <RowControls
                                                            index=ei
                                                            count=exercise_count
                                                            on_move=move |(from, to): (usize, usize)| edit(&|t| { t.groups[di].move_leaf(from, to); })
                                                            on_remove=move |i: usize| edit(&|t| { t.groups[di].remove_leaf(i); })
                                                        />
                                                    </div>
                                                    <input
                                                        type="url"
                                                        placeholder="Vídeo de técnica (URL)"
                                                        prop:value=exercise.node.video_url.clone().unwrap_or_default()
                                                        on:change=move |ev| {
                                                            let url = optional_text(&event_target_value(&ev));
                                                            edit(&|t| t.groups[di].leaves[ei].node.video_url = url.clone());
                                                        }
                                                    />
                                                    <ul class="editor-subs">
                                                        {exercise.substitutions.iter().enumerate().map(|(si, sub)| view! {
                                                            <li>
                                                                {format!("↔ {}", sub.name)}
                                                                <button
                                                                    class="small delete-btn"
                                                                    on:click=move |_| edit(&|t| { t.groups[di].leaves[ei].remove_substitution(si); })
                                                                >"×"</button>
                                                            </li>
                                                        }).collect_view()}
                                                    </ul>
                                                    <AddRowForm
                                                        placeholder="Alternativa"
                                                        on_add=move |(name, _): (String, String)| edit(&|t| {
                                                            let leaf = &mut t.groups[di].leaves[ei];
                                                            let sub = ExerciseSubstitution::new(leaf.node.id, name.clone());
                                                            leaf.push_substitution(sub);
                                                        })
                                                    />
                                                </li>
                                            }).collect_view()}
                                        </ul>
                                        <AddRowForm
                                            placeholder="Ejercicio"
                                            second="Reps (p. ej. 8-12)"
                                            on_add=move |(name, reps): (String, String)| edit(&|t| {
                                                let day = &mut t.groups[di];
                                                let reps = if reps.is_empty() { "10".to_string() } else { reps.clone() };
                                                let exercise = Exercise::new(day.node.id, name.clone(), 3, reps);
                                                day.push_leaf(LeafBranch::new(exercise));
                                            })
                                        />
                                    </li>
                                }
                            }).collect_view()}
                        </ol>
                        <AddRowForm
                            placeholder="Nuevo día"
                            on_add=move |(name, _): (String, String)| edit(&|t| {
                                let day = WorkoutDay::new(t.root.id, name.clone());
                                t.push_group(GroupBranch::new(day));
                            })
                        />
                    }.into_any()
                }
            }}
        </div>
    }
}

#[component]
fn WorkoutRootFields(root: WorkoutPlan, #[prop(into)] on_change: Callback<WorkoutPlan>) -> impl IntoView {
    let base = StoredValue::new(root.clone());
    let commit = move |f: &dyn Fn(&mut WorkoutPlan)| {
        let mut next = base.get_value();
        f(&mut next);
        on_change.run(next);
    };

    view! {
        <div class="editor-root">
            <input
                type="text"
                prop:value=root.name.clone()
                on:change=move |ev| {
                    let name = event_target_value(&ev);
                    if let Ok(name) = coach_core::validation::template_name(&name) {
                        commit(&|r| r.name = name.clone());
                    }
                }
            />
            <textarea
                placeholder="Descripción"
                prop:value=root.description.clone().unwrap_or_default()
                on:change=move |ev| {
                    let text = optional_text(&event_target_value(&ev));
                    commit(&|r| r.description = text.clone());
                }
            ></textarea>
        </div>
    }
}
