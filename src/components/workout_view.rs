//! Workout View
//!
//! The client's current routine, one training day at a time, with per-set logging for
//! today.

use chrono::{Local, NaiveDate};
use coach_core::domain::{Exercise, ExerciseSubstitution, WorkoutLog, WorkoutTree};
use coach_core::{DomainError, DomainResult};
use leptos::prelude::*;
use leptos::task::spawn_local;
use uuid::Uuid;

use super::skeleton::{EmptyState, Skeleton};
use crate::context::AppContext;
use crate::hooks::use_page_data;
use crate::services::{use_services, SharedServices};

/// Routine plus the sets already logged today
#[derive(Clone, Debug, Default)]
struct WorkoutPage {
    tree: Option<WorkoutTree>,
    logs: Vec<WorkoutLog>,
}

async fn load_page(services: SharedServices, identity: String, today: NaiveDate) -> DomainResult<WorkoutPage> {
    let client_id = Uuid::parse_str(&identity).map_err(|e| DomainError::InvalidInput(e.to_string()))?;
    let tree = services.workouts.current_for_client(client_id).await?;
    let logs = services.progress.logs_for_day(client_id, today).await?;
    Ok(WorkoutPage { tree, logs })
}

/// Next set number for an exercise given today's logs
fn next_set_number(logs: &[WorkoutLog], exercise_id: Uuid) -> i32 {
    logs.iter()
        .filter(|l| l.exercise_id == exercise_id)
        .map(|l| l.set_number)
        .max()
        .unwrap_or(0)
        + 1
}

fn prescription(exercise: &Exercise) -> String {
    let mut text = format!("{} × {}", exercise.sets, exercise.reps);
    if let Some(rest) = exercise.rest_seconds {
        text.push_str(&format!(" · descanso {} s", rest));
    }
    text
}

#[component]
pub fn WorkoutView() -> impl IntoView {
    let services = use_services();
    let today = Local::now().date_naive();
    let page_state = RwSignal::new(WorkoutPage::default());
    let (selected_day, set_selected_day) = signal(0usize);

    let page = {
        let services = services.clone();
        use_page_data(
            "workout",
            move || vec![today.to_string()],
            move |identity| load_page(services.clone(), identity, today),
            move |loaded| page_state.set(loaded),
        )
    };
    let first_load = page.first_load;

    view! {
        <section class="workout-view">
            <header class="view-header">
                <h2>{move || page_state.with(|p| p.tree.as_ref().map(|t| t.root.name.clone())).unwrap_or_else(|| "Mi rutina".into())}</h2>
                <button class="small" on:click=move |_| page.refetch()>"↻"</button>
            </header>
            <Show when=move || !first_load.get() fallback=|| view! { <Skeleton rows=5 /> }>
                {
                    let services = services.clone();
                    move || match page_state.with(|p| p.tree.clone()) {
                        None => view! { <EmptyState message="Tu entrenador aún no te ha asignado una rutina." error=page.error on_retry=move |_: ()| page.refetch() /> }.into_any(),
                        Some(tree) => {
                            let day_count = tree.groups.len();
                            let index = selected_day.get().min(day_count.saturating_sub(1));
                            let services = services.clone();
                            view! {
                                <div class="day-tabs">
                                    {tree.groups.iter().enumerate().map(|(i, day)| view! {
                                        <button
                                            class=move || if selected_day.get() == i { "day-tab active" } else { "day-tab" }
                                            on:click=move |_| set_selected_day.set(i)
                                        >
                                            {day.node.name.clone()}
                                        </button>
                                    }).collect_view()}
                                </div>
                                {tree.groups.get(index).cloned().map(|day| view! {
                                    {day.node.notes.clone().map(|n| view! { <p class="day-notes">{n}</p> })}
                                    <ul class="exercise-list">
                                        {day.leaves.into_iter().map(|leaf| view! {
                                            <ExerciseCard
                                                exercise=leaf.node
                                                substitutions=leaf.substitutions
                                                page_state=page_state
                                                services=services.clone()
                                                today=today
                                            />
                                        }).collect_view()}
                                    </ul>
                                })}
                            }.into_any()
                        }
                    }
                }
            </Show>
        </section>
    }
}

#[component]
fn ExerciseCard(
    exercise: Exercise,
    substitutions: Vec<ExerciseSubstitution>,
    page_state: RwSignal<WorkoutPage>,
    services: SharedServices,
    today: NaiveDate,
) -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext should be provided");
    let exercise_id = exercise.id;
    let (reps, set_reps) = signal(String::new());
    let (weight, set_weight) = signal(String::new());
    let (history, set_history) = signal::<Option<Vec<WorkoutLog>>>(None);

    let logged = move || {
        page_state.with(|p| {
            p.logs
                .iter()
                .filter(|l| l.exercise_id == exercise_id)
                .cloned()
                .collect::<Vec<_>>()
        })
    };

    let on_log = {
        let services = services.clone();
        move |ev: web_sys::SubmitEvent| {
            ev.prevent_default();
            let Some(client_id) = ctx.user_id.get_untracked() else {
                return;
            };
            let Ok(reps_done) = reps.get_untracked().trim().parse::<i32>() else {
                ctx.notify("Indica las repeticiones realizadas.");
                return;
            };
            let weight_text = weight.get_untracked();
            let weight_kg = if weight_text.trim().is_empty() {
                None
            } else {
                match weight_text.trim().replace(',', ".").parse::<f64>() {
                    Ok(w) => Some(w),
                    Err(_) => {
                        ctx.notify("Peso no válido.");
                        return;
                    }
                }
            };
            let set_number = page_state.with_untracked(|p| next_set_number(&p.logs, exercise_id));
            let entry = WorkoutLog {
                id: Uuid::new_v4(),
                client_id,
                exercise_id,
                date: today,
                set_number,
                reps: reps_done,
                weight_kg,
                notes: None,
            };
            let services = services.clone();
            spawn_local(async move {
                match services.progress.log_set(&entry).await {
                    Ok(stored) => {
                        page_state.update(|p| p.logs.push(stored));
                        set_reps.set(String::new());
                    }
                    Err(e) => {
                        log::error!("[WORKOUT] log set failed: {}", e);
                        ctx.notify(e.user_message());
                    }
                }
            });
        }
    };

    let on_undo = {
        let services = services.clone();
        move |log_id: Uuid| {
            let services = services.clone();
            spawn_local(async move {
                match services.progress.delete_log(log_id).await {
                    Ok(()) => page_state.update(|p| p.logs.retain(|l| l.id != log_id)),
                    Err(e) => ctx.notify(e.user_message()),
                }
            });
        }
    };

    let on_history = move |_| {
        if history.get_untracked().is_some() {
            set_history.set(None);
            return;
        }
        let Some(client_id) = ctx.user_id.get_untracked() else {
            return;
        };
        let services = services.clone();
        spawn_local(async move {
            match services.progress.recent_logs_for_exercise(client_id, exercise_id, 10).await {
                Ok(logs) => set_history.set(Some(logs)),
                Err(e) => ctx.notify(e.user_message()),
            }
        });
    };

    view! {
        <li class="exercise-card">
            <div class="exercise-head">
                <span class="exercise-name">{exercise.name.clone()}</span>
                <span class="exercise-rx">{prescription(&exercise)}</span>
            </div>
            {exercise.notes.clone().map(|n| view! { <p class="exercise-notes">{n}</p> })}
            {exercise.video_url.clone().map(|url| view! {
                <a class="exercise-video" href=url target="_blank" rel="noopener">"Ver técnica"</a>
            })}
            {(!substitutions.is_empty()).then(|| view! {
                <p class="exercise-subs">
                    "Alternativas: "
                    {substitutions.iter().map(|s| s.name.clone()).collect::<Vec<_>>().join(", ")}
                </p>
            })}
            <ol class="set-list">
                {move || logged().into_iter().map(|l| {
                    let on_undo = on_undo.clone();
                    let log_id = l.id;
                    view! {
                        <li>
                            {format!("Serie {}: {} reps", l.set_number, l.reps)}
                            {l.weight_kg.map(|w| format!(" · {} kg", w))}
                            <button class="small link" on:click=move |_| on_undo(log_id)>"Deshacer"</button>
                        </li>
                    }
                }).collect_view()}
            </ol>
            <form class="set-form" on:submit=on_log>
                <input
                    type="number"
                    inputmode="numeric"
                    placeholder="Reps"
                    prop:value=move || reps.get()
                    on:input=move |ev| set_reps.set(event_target_value(&ev))
                />
                <input
                    type="text"
                    inputmode="decimal"
                    placeholder="Kg"
                    prop:value=move || weight.get()
                    on:input=move |ev| set_weight.set(event_target_value(&ev))
                />
                <button type="submit" class="small">"Anotar serie"</button>
                <button type="button" class="small link" on:click=on_history>"Historial"</button>
            </form>
            {move || history.get().map(|logs| view! {
                <ul class="exercise-history">
                    {if logs.is_empty() {
                        view! { <li class="empty">"Sin registros anteriores"</li> }.into_any()
                    } else {
                        logs.into_iter().map(|l| view! {
                            <li>
                                {format!("{} · serie {}: {} reps", l.date.format("%d/%m"), l.set_number, l.reps)}
                                {l.weight_kg.map(|w| format!(" · {} kg", w))}
                            </li>
                        }).collect_view().into_any()
                    }}
                </ul>
            })}
        </li>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn logged_set(exercise_id: Uuid, set_number: i32) -> WorkoutLog {
        WorkoutLog {
            id: Uuid::new_v4(),
            client_id: Uuid::nil(),
            exercise_id,
            date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            set_number,
            reps: 10,
            weight_kg: None,
            notes: None,
        }
    }

    #[test]
    fn test_next_set_number() {
        let squat = Uuid::new_v4();
        let press = Uuid::new_v4();
        assert_eq!(next_set_number(&[], squat), 1);
        let logs = vec![logged_set(squat, 1), logged_set(squat, 2), logged_set(press, 1)];
        assert_eq!(next_set_number(&logs, squat), 3);
        assert_eq!(next_set_number(&logs, press), 2);
    }

    #[test]
    fn test_prescription() {
        let mut exercise = Exercise::new(Uuid::new_v4(), "Sentadilla".into(), 4, "8-12".into());
        assert_eq!(prescription(&exercise), "4 × 8-12");
        exercise.rest_seconds = Some(90);
        assert_eq!(prescription(&exercise), "4 × 8-12 · descanso 90 s");
    }
}
