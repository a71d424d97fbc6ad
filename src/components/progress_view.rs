//! Progress View
//!
//! Today's weight and water, the weight trend over a selectable range, and progress
//! photos with a before/after comparison per pose.

use chrono::{Duration, Local, NaiveDate};
use coach_core::domain::{photo_pair, PhotoPose, ProgressEntry, ProgressPhoto, WeightTrend};
use coach_core::{validation, DomainError, DomainResult};
use leptos::prelude::*;
use leptos::task::spawn_local;
use uuid::Uuid;
use wasm_bindgen_futures::JsFuture;

use super::compare_slider::CompareSlider;
use super::confirm_delete::ConfirmDelete;
use super::skeleton::{EmptyState, Skeleton};
use crate::context::AppContext;
use crate::hooks::use_page_data;
use crate::services::{use_services, SharedServices};

/// Selectable history ranges in days
const RANGES: &[(i64, &str)] = &[(7, "7 días"), (30, "30 días"), (90, "90 días")];
/// Quick-add water amounts in millilitres
const WATER_STEPS: &[i32] = &[250, 500];

#[derive(Clone, Debug, Default)]
struct ProgressPage {
    history: Vec<ProgressEntry>,
    photos: Vec<ProgressPhoto>,
}

impl ProgressPage {
    fn entry_on(&self, date: NaiveDate) -> Option<&ProgressEntry> {
        self.history.iter().find(|e| e.date == date)
    }
}

async fn load_page(services: SharedServices, identity: String, from: NaiveDate, to: NaiveDate) -> DomainResult<ProgressPage> {
    let client_id = Uuid::parse_str(&identity).map_err(|e| DomainError::InvalidInput(e.to_string()))?;
    let history = services.progress.history(client_id, from, to).await?;
    let photos = services.photos.list(client_id).await?;
    Ok(ProgressPage { history, photos })
}

/// Put a stored entry into the date-ordered history, replacing the same day
fn merge_entry(history: &mut Vec<ProgressEntry>, entry: ProgressEntry) {
    match history.iter_mut().find(|e| e.id == entry.id || e.date == entry.date) {
        Some(existing) => *existing = entry,
        None => {
            history.push(entry);
            history.sort_by_key(|e| e.date);
        }
    }
}

/// Share of the daily water goal reached, capped at 100
fn water_percent(ml: i32, goal_ml: Option<i32>) -> u32 {
    match goal_ml {
        Some(goal) if goal > 0 => ((ml.max(0) as f64 / goal as f64) * 100.0).min(100.0).round() as u32,
        _ => 0,
    }
}

async fn read_file(file: web_sys::File) -> Result<(String, Vec<u8>), String> {
    let buffer = JsFuture::from(file.array_buffer())
        .await
        .map_err(|e| format!("{:?}", e))?;
    Ok((file.name(), js_sys::Uint8Array::new(&buffer).to_vec()))
}

#[component]
pub fn ProgressView() -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext should be provided");
    let services = use_services();
    let today = Local::now().date_naive();

    let state = RwSignal::new(ProgressPage::default());
    let (range_days, set_range_days) = signal(30i64);
    let (weight_input, set_weight_input) = signal(String::new());
    let (weight_error, set_weight_error) = signal::<Option<String>>(None);
    let (upload_pose, set_upload_pose) = signal(PhotoPose::Front);
    let (compare_pose, set_compare_pose) = signal(PhotoPose::Front);
    let (uploading, set_uploading) = signal(false);

    let page = {
        let services = services.clone();
        use_page_data(
            "progress",
            move || vec![range_days.get().to_string()],
            move |identity| {
                let from = today - Duration::days(range_days.get_untracked() - 1);
                load_page(services.clone(), identity, from, today)
            },
            move |loaded| state.set(loaded),
        )
    };
    let first_load = page.first_load;

    let today_entry = move || state.with(|p| p.entry_on(today).cloned());
    let trend = move || state.with(|p| WeightTrend::from_entries(&p.history));
    let pair = Signal::derive(move || state.with(|p| photo_pair(&p.photos, compare_pose.get())));

    let on_weight = {
        let services = services.clone();
        move |ev: web_sys::SubmitEvent| {
            ev.prevent_default();
            let Some(client_id) = ctx.user_id.get_untracked() else {
                return;
            };
            let kg = match validation::parse_weight(&weight_input.get_untracked()) {
                Ok(kg) => kg,
                Err(e) => {
                    set_weight_error.set(Some(e.user_message()));
                    return;
                }
            };
            set_weight_error.set(None);
            let services = services.clone();
            spawn_local(async move {
                match services.progress.log_weight(client_id, today, kg).await {
                    Ok(entry) => {
                        state.update(|p| merge_entry(&mut p.history, entry));
                        set_weight_input.set(String::new());
                    }
                    Err(e) => {
                        log::error!("[PROGRESS] weight not saved: {}", e);
                        set_weight_error.set(Some(e.user_message()));
                    }
                }
            });
        }
    };

    let add_water = {
        let services = services.clone();
        move |ml: i32| {
            let Some(client_id) = ctx.user_id.get_untracked() else {
                return;
            };
            let services = services.clone();
            spawn_local(async move {
                match services.progress.add_water(client_id, today, ml).await {
                    Ok(entry) => state.update(|p| merge_entry(&mut p.history, entry)),
                    Err(e) => ctx.notify(e.user_message()),
                }
            });
        }
    };

    let on_photo = {
        let services = services.clone();
        move |ev: web_sys::Event| {
            let input: web_sys::HtmlInputElement = event_target(&ev);
            let Some(file) = input.files().and_then(|files| files.get(0)) else {
                return;
            };
            let Some(client_id) = ctx.user_id.get_untracked() else {
                return;
            };
            input.set_value("");
            let pose = upload_pose.get_untracked();
            let services = services.clone();
            set_uploading.set(true);
            spawn_local(async move {
                let result = match read_file(file).await {
                    Ok((name, bytes)) => services.photos.upload(client_id, today, pose, &name, bytes).await,
                    Err(e) => Err(DomainError::Internal(format!("file read: {}", e))),
                };
                match result {
                    Ok(photo) => state.update(|p| {
                        p.photos.push(photo);
                        p.photos.sort_by_key(|ph| ph.date);
                    }),
                    Err(e) => {
                        log::error!("[PHOTO] upload failed: {}", e);
                        ctx.notify(e.user_message());
                    }
                }
                set_uploading.set(false);
            });
        }
    };

    let delete_photo = move |photo: ProgressPhoto| {
        let services = services.clone();
        spawn_local(async move {
            match services.photos.delete(&photo).await {
                Ok(()) => state.update(|p| p.photos.retain(|ph| ph.id != photo.id)),
                Err(e) => ctx.notify(e.user_message()),
            }
        });
    };

    let goal_weight = move || ctx.profile.with(|p| p.as_ref().and_then(|p| p.goal_weight_kg));
    let water_goal = move || ctx.profile.with(|p| p.as_ref().and_then(|p| p.water_goal_ml));

    view! {
        <section class="progress-view">
            <header class="view-header">
                <h2>"Mi progreso"</h2>
                <button class="small" on:click=move |_| page.refetch()>"↻"</button>
            </header>
            <Show when=move || !first_load.get() fallback=|| view! { <Skeleton rows=6 /> }>
                <div class="card today-card">
                    <h3>"Hoy"</h3>
                    <form class="weight-form" on:submit=on_weight.clone()>
                        <input
                            type="text"
                            inputmode="decimal"
                            placeholder=move || {
                                today_entry()
                                    .and_then(|e| e.weight_kg)
                                    .map(|w| format!("{} kg", w))
                                    .unwrap_or_else(|| "Peso (kg)".into())
                            }
                            prop:value=move || weight_input.get()
                            on:input=move |ev| set_weight_input.set(event_target_value(&ev))
                        />
                        <button type="submit" class="small">"Guardar peso"</button>
                    </form>
                    {move || weight_error.get().map(|msg| view! { <p class="form-error">{msg}</p> })}
                    <div class="water-row">
                        <span class="water-total">
                            {move || {
                                let ml = today_entry().map(|e| e.water_ml).unwrap_or(0);
                                match water_goal() {
                                    Some(goal) => format!("Agua: {} / {} ml ({}%)", ml, goal, water_percent(ml, Some(goal))),
                                    None => format!("Agua: {} ml", ml),
                                }
                            }}
                        </span>
                        {WATER_STEPS.iter().map(|ml| {
                            let ml = *ml;
                            let add_water = add_water.clone();
                            view! { <button class="small" on:click=move |_| add_water(ml)>{format!("+{} ml", ml)}</button> }
                        }).collect_view()}
                    </div>
                </div>

                <div class="card trend-card">
                    <div class="range-tabs">
                        {RANGES.iter().map(|(days, label)| {
                            let days = *days;
                            view! {
                                <button
                                    class=move || if range_days.get() == days { "range-tab active" } else { "range-tab" }
                                    on:click=move |_| set_range_days.set(days)
                                >
                                    {*label}
                                </button>
                            }
                        }).collect_view()}
                    </div>
                    {move || match trend() {
                        None => view! { <EmptyState message="Aún no hay pesos en este periodo." error=page.error on_retry=move |_: ()| page.refetch() /> }.into_any(),
                        Some(t) => {
                            let change_class = if t.change() <= 0.0 { "trend-change down" } else { "trend-change up" };
                            view! {
                                <p class="trend-latest">{format!("{:.1} kg ({})", t.latest, t.latest_date.format("%d/%m"))}</p>
                                <p class=change_class>{format!("{:+.1} kg en el periodo", t.change())}</p>
                                {goal_weight().map(|goal| view! {
                                    <p class="trend-goal">{format!("Objetivo: {:.1} kg (faltan {:.1} kg)", goal, (t.latest - goal).abs())}</p>
                                })}
                            }.into_any()
                        }
                    }}
                    <ul class="history-list">
                        {move || state.with(|p| p.history.iter().rev().map(|e| view! {
                            <li>
                                <span>{e.date.format("%d/%m").to_string()}</span>
                                <span>{e.weight_kg.map(|w| format!("{:.1} kg", w)).unwrap_or_else(|| "-".into())}</span>
                                <span>{format!("{} ml", e.water_ml)}</span>
                            </li>
                        }).collect_view())}
                    </ul>
                </div>

                <div class="card photos-card">
                    <h3>"Fotos"</h3>
                    <div class="pose-tabs">
                        {PhotoPose::ALL.iter().map(|pose| {
                            let pose = *pose;
                            view! {
                                <button
                                    class=move || if compare_pose.get() == pose { "pose-tab active" } else { "pose-tab" }
                                    on:click=move |_| set_compare_pose.set(pose)
                                >
                                    {pose_label(pose)}
                                </button>
                            }
                        }).collect_view()}
                    </div>
                    <Show
                        when=move || pair.with(|p| p.is_some())
                        fallback=|| view! { <p class="empty">"Sube al menos dos fotos de esta pose para compararlas."</p> }
                    >
                        <CompareSlider pair=pair />
                    </Show>
                    <div class="photo-upload">
                        <select on:change=move |ev| set_upload_pose.set(PhotoPose::parse(&event_target_value(&ev)))>
                            {PhotoPose::ALL.iter().map(|pose| view! {
                                <option value=pose.as_str()>{pose_label(*pose)}</option>
                            }).collect_view()}
                        </select>
                        <label class="file-button">
                            {move || if uploading.get() { "Subiendo..." } else { "Subir foto" }}
                            <input type="file" accept="image/*" hidden on:change=on_photo.clone() disabled=move || uploading.get() />
                        </label>
                    </div>
                    <ul class="photo-grid">
                        <For
                            each=move || state.with(|p| p.photos.clone())
                            key=|photo| photo.id
                            children={
                                let delete_photo = delete_photo.clone();
                                move |photo: ProgressPhoto| {
                                    let delete_photo = delete_photo.clone();
                                    let target = photo.clone();
                                    view! {
                                        <li class="photo-thumb">
                                            <img src=photo.url.clone() loading="lazy" />
                                            <span>{format!("{} · {}", photo.date.format("%d/%m/%Y"), pose_label(photo.pose))}</span>
                                            <ConfirmDelete
                                                what="esta foto"
                                                on_confirm=move |_| delete_photo(target.clone())
                                            />
                                        </li>
                                    }
                                }
                            }
                        />
                    </ul>
                </div>
            </Show>
        </section>
    }
}

fn pose_label(pose: PhotoPose) -> &'static str {
    match pose {
        PhotoPose::Front => "Frente",
        PhotoPose::Side => "Perfil",
        PhotoPose::Back => "Espalda",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(day: u32, weight: Option<f64>) -> ProgressEntry {
        let mut e = ProgressEntry::new(Uuid::nil(), NaiveDate::from_ymd_opt(2024, 5, day).unwrap());
        e.weight_kg = weight;
        e
    }

    #[test]
    fn test_merge_entry_replaces_same_day() {
        let mut history = vec![entry(1, Some(80.0)), entry(3, Some(79.5))];
        merge_entry(&mut history, entry(3, Some(79.0)));
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].weight_kg, Some(79.0));
    }

    #[test]
    fn test_merge_entry_keeps_date_order() {
        let mut history = vec![entry(1, None), entry(5, None)];
        merge_entry(&mut history, entry(3, Some(81.0)));
        let days: Vec<u32> = history.iter().map(|e| chrono::Datelike::day(&e.date)).collect();
        assert_eq!(days, vec![1, 3, 5]);
    }

    #[test]
    fn test_water_percent() {
        assert_eq!(water_percent(1000, Some(2000)), 50);
        assert_eq!(water_percent(3000, Some(2000)), 100);
        assert_eq!(water_percent(500, None), 0);
        assert_eq!(water_percent(500, Some(0)), 0);
    }
}
