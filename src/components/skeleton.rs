//! Placeholders
//!
//! Grey rows shown while a view's first load is pending, and the text that replaces a
//! view's list when there is nothing to show.

use leptos::prelude::*;

#[component]
pub fn Skeleton(#[prop(default = 3)] rows: usize) -> impl IntoView {
    view! {
        <div class="skeleton" aria-busy="true">
            {(0..rows).map(|_| view! { <div class="skeleton-row"></div> }).collect_view()}
        </div>
    }
}

/// `message` when the view is genuinely empty; the load error and a retry when the
/// last load failed
#[component]
pub fn EmptyState(
    message: &'static str,
    error: ReadSignal<Option<String>>,
    #[prop(into)] on_retry: Callback<()>,
) -> impl IntoView {
    move || match error.get() {
        Some(failure) => view! {
            <div class="load-failed" role="alert">
                <p>{failure}</p>
                <button class="small" on:click=move |_| on_retry.run(())>"Reintentar"</button>
            </div>
        }
        .into_any(),
        None => view! { <p class="empty">{message}</p> }.into_any(),
    }
}
