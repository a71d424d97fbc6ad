//! Diet View
//!
//! The client's current diet. Tapping a meal opens its foods and substitutions in a
//! bottom sheet.

use coach_core::domain::{meal_calories, DietTree, Food, FoodSubstitution, GroupBranch, DietKind};
use leptos::prelude::*;
use leptos_gesture::open_reveal;
use uuid::Uuid;

use super::bottom_sheet::{create_sheet, BottomSheet};
use super::skeleton::{EmptyState, Skeleton};
use crate::hooks::use_page_data;
use crate::services::use_services;

fn macros_line(food: &Food) -> Option<String> {
    let parts: Vec<String> = [("P", food.protein_g), ("C", food.carbs_g), ("G", food.fat_g)]
        .iter()
        .filter_map(|(label, grams)| grams.map(|g| format!("{} {:.0} g", label, g)))
        .collect();
    if parts.is_empty() { None } else { Some(parts.join(" · ")) }
}

#[component]
pub fn DietView() -> impl IntoView {
    let services = use_services();
    let (diet, set_diet) = signal::<Option<DietTree>>(None);
    let (selected_meal, set_selected_meal) = signal::<Option<Uuid>>(None);
    let sheet = create_sheet();

    let page = use_page_data(
        "diet",
        Vec::new,
        move |identity| {
            let services = services.clone();
            async move {
                let client_id = Uuid::parse_str(&identity)
                    .map_err(|e| coach_core::DomainError::InvalidInput(e.to_string()))?;
                services.diets.current_for_client(client_id).await
            }
        },
        move |tree| set_diet.set(tree),
    );
    let first_load = page.first_load;

    let meal_branch = move || -> Option<GroupBranch<DietKind>> {
        let id = selected_meal.get()?;
        diet.with(|d| d.as_ref()?.groups.iter().find(|g| g.node.id == id).cloned())
    };
    let sheet_title = Signal::derive(move || meal_branch().map(|m| m.node.name).unwrap_or_default());

    view! {
        <section class="diet-view">
            <header class="view-header">
                <h2>{move || diet.with(|d| d.as_ref().map(|t| t.root.name.clone())).unwrap_or_else(|| "Mi dieta".into())}</h2>
                <button class="small" on:click=move |_| page.refetch()>"↻"</button>
            </header>
            <Show when=move || !first_load.get() fallback=|| view! { <Skeleton rows=4 /> }>
                {move || match diet.get() {
                    None => view! { <EmptyState message="Tu entrenador aún no te ha asignado una dieta." error=page.error on_retry=move |_: ()| page.refetch() /> }.into_any(),
                    Some(tree) => {
                        let target = tree.root.target_calories;
                        view! {
                            {target.map(|kcal| view! { <p class="diet-target">{format!("Objetivo: {} kcal", kcal)}</p> })}
                            {tree.root.notes.clone().map(|notes| view! { <p class="diet-notes">{notes}</p> })}
                            <ul class="meal-list">
                                {tree.groups.into_iter().map(|meal| {
                                    let id = meal.node.id;
                                    let foods: Vec<Food> = meal.leaves.iter().map(|l| l.node.clone()).collect();
                                    let kcal = meal_calories(&foods);
                                    view! {
                                        <li class="meal-card" on:click=move |_| {
                                            set_selected_meal.set(Some(id));
                                            open_reveal(sheet);
                                        }>
                                            <span class="meal-time">{meal.node.time.clone().unwrap_or_default()}</span>
                                            <span class="meal-name">{meal.node.name.clone()}</span>
                                            <span class="meal-meta">
                                                {format!("{} alimentos", foods.len())}
                                                {(kcal > 0.0).then(|| format!(" · {:.0} kcal", kcal))}
                                            </span>
                                        </li>
                                    }
                                }).collect_view()}
                            </ul>
                        }.into_any()
                    }
                }}
            </Show>
            <BottomSheet reveal=sheet title=sheet_title>
                {move || meal_branch().map(|meal| view! {
                    {meal.node.notes.clone().map(|n| view! { <p class="meal-notes">{n}</p> })}
                    <ul class="food-list">
                        {meal.leaves.into_iter().map(|leaf| {
                            let macros = macros_line(&leaf.node);
                            let subs: Vec<FoodSubstitution> = leaf.substitutions;
                            view! {
                                <li class="food-row">
                                    <div class="food-main">
                                        <span class="food-name">{leaf.node.name.clone()}</span>
                                        <span class="food-qty">{leaf.node.quantity.clone()}</span>
                                    </div>
                                    {leaf.node.calories.map(|c| view! { <span class="food-kcal">{format!("{:.0} kcal", c)}</span> })}
                                    {macros.map(|m| view! { <span class="food-macros">{m}</span> })}
                                    {(!subs.is_empty()).then(|| view! {
                                        <div class="food-subs">
                                            <span class="subs-label">"Puedes cambiarlo por:"</span>
                                            <ul>
                                                {subs.into_iter().map(|s| view! {
                                                    <li>{format!("{} ({})", s.name, s.quantity)}</li>
                                                }).collect_view()}
                                            </ul>
                                        </div>
                                    })}
                                </li>
                            }
                        }).collect_view()}
                    </ul>
                })}
            </BottomSheet>
        </section>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_macros_line() {
        let mut food = Food::new(Uuid::new_v4(), "Arroz".into(), "80 g".into());
        assert_eq!(macros_line(&food), None);
        food.protein_g = Some(6.0);
        food.fat_g = Some(0.4);
        assert_eq!(macros_line(&food).as_deref(), Some("P 6 g · G 0 g"));
    }
}
