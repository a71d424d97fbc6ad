//! Before/After Comparison Slider
//!
//! Two photos stacked; the later one is uncovered left to right. Uses the same reveal
//! rule as the sheets, measured against the slider's own width.

use chrono::NaiveDate;
use coach_core::domain::PhotoPair;
use leptos::prelude::*;
use leptos_gesture::{
    bind_global_pointer, close_reveal, create_reveal, make_on_pointerdown, open_reveal, Axis,
    Extent, RevealDirection, RevealState,
};

fn label_date(date: Option<NaiveDate>) -> String {
    date.map(|d| format!(" · {}", d.format("%d/%m/%Y"))).unwrap_or_default()
}

/// Percentage of the "after" photo shown
fn uncovered_percent(state: RevealState, progress: f64) -> f64 {
    match state {
        RevealState::Open => 100.0,
        RevealState::Idle | RevealState::Closing { .. } => 0.0,
        RevealState::Dragging { .. } => (progress * 100.0).clamp(0.0, 100.0),
    }
}

/// Compare `pair`; renders empty frames while it is None
#[component]
pub fn CompareSlider(#[prop(into)] pair: Signal<Option<PhotoPair>>) -> impl IntoView {
    let reveal = create_reveal(Axis::Horizontal, RevealDirection::Forward, Extent::Element);
    bind_global_pointer(reveal, |_| {});
    let on_pointerdown = make_on_pointerdown(reveal);

    let clip = move || {
        let state = reveal.machine.get().state();
        let shown = uncovered_percent(state, reveal.progress());
        let transition = if matches!(state, RevealState::Dragging { .. }) { "none" } else { "clip-path 300ms ease" };
        format!("clip-path: inset(0 {:.1}% 0 0); transition: {};", 100.0 - shown, transition)
    };
    let showing_after = move || reveal.machine.get().is_open();

    view! {
        <div class="compare-slider">
            <div class="compare-frame" on:pointerdown=on_pointerdown>
                <img class="compare-before" src=move || pair.with(|p| p.as_ref().map(|p| p.before.url.clone())).unwrap_or_default() draggable="false" />
                <img class="compare-after" src=move || pair.with(|p| p.as_ref().map(|p| p.after.url.clone())).unwrap_or_default() style=clip draggable="false" />
            </div>
            <div class="compare-labels">
                <button
                    class=move || if showing_after() { "compare-label" } else { "compare-label active" }
                    on:click=move |_| close_reveal(reveal)
                >
                    {move || format!("Antes{}", pair.with(|p| label_date(p.as_ref().map(|p| p.before.date))))}
                </button>
                <button
                    class=move || if showing_after() { "compare-label active" } else { "compare-label" }
                    on:click=move |_| open_reveal(reveal)
                >
                    {move || format!("Después{}", pair.with(|p| label_date(p.as_ref().map(|p| p.after.date))))}
                </button>
            </div>
        </div>
    }
}
