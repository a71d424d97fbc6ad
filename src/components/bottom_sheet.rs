//! Bottom Sheet Component
//!
//! Panel that slides up from the bottom edge. Dragging the handle up past a quarter of
//! the viewport (or flicking it) opens the sheet; dragging it back down closes it.

use leptos::prelude::*;
use leptos_gesture::{
    bind_global_pointer, close_reveal, create_reveal, make_on_pointerdown, Axis, Extent,
    RevealDirection, RevealSignals, RevealState,
};

/// Height of the handle left visible by a peeking sheet
const PEEK_PX: u32 = 64;

/// A sheet revealed by dragging up on the vertical axis
pub fn create_sheet() -> RevealSignals {
    create_reveal(Axis::Vertical, RevealDirection::Backward, Extent::Viewport)
}

/// Translate and class for the current state
fn sheet_style(state: RevealState, progress: f64) -> (String, &'static str) {
    let offset = match state {
        RevealState::Dragging { .. } => (1.0 - progress) * 100.0,
        RevealState::Open => 0.0,
        RevealState::Idle | RevealState::Closing { .. } => 100.0,
    };
    let class = match state {
        RevealState::Dragging { .. } => "bottom-sheet dragging",
        RevealState::Closing { .. } => "bottom-sheet closing",
        RevealState::Open => "bottom-sheet open",
        RevealState::Idle => "bottom-sheet",
    };
    (format!("transform: translateY({:.2}%);", offset), class)
}

/// Sheet body with a drag handle
///
/// # Arguments
/// * `reveal` - state from [`create_sheet`], opened by the parent with `open_reveal`
/// * `title` - header text
/// * `peek` - keep the handle visible while closed so the sheet can be dragged open
#[component]
pub fn BottomSheet(
    reveal: RevealSignals,
    #[prop(into)] title: Signal<String>,
    #[prop(optional)] peek: bool,
    children: ChildrenFn,
) -> impl IntoView {
    bind_global_pointer(reveal, |state| {
        log::debug!("[SHEET] settled {:?}", state);
    });
    let on_pointerdown = make_on_pointerdown(reveal);

    let visible = move || peek || !matches!(reveal.machine.get().state(), RevealState::Idle);
    let style = move || {
        let machine = reveal.machine.get();
        if peek && machine.state() == RevealState::Idle {
            // Handle stays on screen
            return format!("transform: translateY(calc(100% - {}px));", PEEK_PX);
        }
        sheet_style(machine.state(), reveal.progress()).0
    };
    let class = move || {
        let machine = reveal.machine.get();
        let (_, class) = sheet_style(machine.state(), 0.0);
        if peek { format!("{} peek", class) } else { class.to_string() }
    };

    view! {
        <Show when=move || reveal.machine.get().is_open()>
            <div class="sheet-backdrop" on:click=move |_| close_reveal(reveal)></div>
        </Show>
        <Show when=visible>
            <div class=class style=style>
                <div class="sheet-handle" on:pointerdown=on_pointerdown>
                    <span class="sheet-grip"></span>
                    <span class="sheet-title">{move || title.get()}</span>
                </div>
                <div class="sheet-content">{children()}</div>
            </div>
        </Show>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sheet_style_follows_state() {
        assert_eq!(sheet_style(RevealState::Open, 1.0).0, "transform: translateY(0.00%);");
        assert_eq!(sheet_style(RevealState::Idle, 0.0).0, "transform: translateY(100.00%);");

        let dragging = RevealState::Dragging { start: 700.0, current: 500.0, started_ms: 0.0, from_open: false };
        let (style, class) = sheet_style(dragging, 0.25);
        assert_eq!(style, "transform: translateY(75.00%);");
        assert_eq!(class, "bottom-sheet dragging");

        assert_eq!(sheet_style(RevealState::Closing { started_ms: 0.0 }, 0.5).1, "bottom-sheet closing");
    }
}
