//! Diagnostics Panel
//!
//! Recent log lines from the in-app rolling logger.

use leptos::prelude::*;

#[component]
pub fn DiagnosticsPanel() -> impl IntoView {
    let (lines, set_lines) = signal(rolling_logger::recent_lines());

    let refresh = move |_| set_lines.set(rolling_logger::recent_lines());
    let clear = move |_| {
        rolling_logger::clear();
        set_lines.set(Vec::new());
    };

    view! {
        <section class="diagnostics">
            <header class="view-header">
                <h2>"Registro"</h2>
                <button class="small" on:click=refresh>"Actualizar"</button>
                <button class="small" on:click=clear>"Vaciar"</button>
            </header>
            <Show
                when=move || !lines.get().is_empty()
                fallback=|| view! { <p class="empty">"Sin entradas"</p> }
            >
                <pre class="log-lines">
                    {move || lines.get().into_iter().rev().collect::<Vec<_>>().join("\n")}
                </pre>
            </Show>
        </section>
    }
}
