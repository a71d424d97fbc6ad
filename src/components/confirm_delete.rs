//! Two-Tap Delete
//!
//! Deleting a template, guideline or photo takes a second tap on the same row. An
//! unanswered prompt folds back after a few seconds.

use gloo_timers::future::TimeoutFuture;
use leptos::prelude::*;
use leptos::task::spawn_local;

/// How long the "¿Eliminar …?" prompt waits for an answer
const CONFIRM_WINDOW_MS: u32 = 4_000;

/// Prompt for deleting `what` ("la plantilla", "esta foto")
fn prompt(what: &str) -> String {
    format!("¿Eliminar {}?", what.trim())
}

/// * `what` - object of the prompt sentence
/// * `on_confirm` - runs once the second tap lands
#[component]
pub fn ConfirmDelete(#[prop(into)] what: String, #[prop(into)] on_confirm: Callback<()>) -> impl IntoView {
    // Bumped on every open so a stale timer leaves a newer prompt alone
    let (armed, set_armed) = signal::<Option<u32>>(None);
    let opened = StoredValue::new(0u32);
    let prompt = prompt(&what);

    let arm = move |ev: web_sys::MouseEvent| {
        ev.stop_propagation();
        let ticket = opened.get_value() + 1;
        opened.set_value(ticket);
        set_armed.set(Some(ticket));
        spawn_local(async move {
            TimeoutFuture::new(CONFIRM_WINDOW_MS).await;
            if armed.try_get_untracked().flatten() == Some(ticket) {
                set_armed.try_set(None);
            }
        });
    };

    move || match armed.get() {
        None => view! {
            <button class="delete-btn" title=prompt.clone() on:click=arm>"×"</button>
        }
        .into_any(),
        Some(_) => view! {
            <span class="delete-confirm" role="group">
                <span class="delete-confirm-text">{prompt.clone()}</span>
                <button
                    class="confirm-btn"
                    on:click=move |ev| {
                        ev.stop_propagation();
                        set_armed.set(None);
                        on_confirm.run(());
                    }
                >
                    "Sí"
                </button>
                <button
                    class="cancel-btn"
                    on:click=move |ev| {
                        ev.stop_propagation();
                        set_armed.set(None);
                    }
                >
                    "No"
                </button>
            </span>
        }
        .into_any(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_names_the_object() {
        assert_eq!(prompt("la plantilla"), "¿Eliminar la plantilla?");
        assert_eq!(prompt(" esta foto "), "¿Eliminar esta foto?");
    }
}
