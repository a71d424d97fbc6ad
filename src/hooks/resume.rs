//! Foreground Listeners
//!
//! `visibilitychange` and window `focus` are bound once for the whole app and fan out
//! through [`AppContext::fire_resume`].

use coach_core::page_data::ResumeTrigger;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;

use crate::context::AppContext;

pub fn install_resume_listeners(ctx: AppContext) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let Some(document) = window.document() else {
        return;
    };

    let doc = document.clone();
    let on_visibility = Closure::<dyn FnMut()>::new(move || {
        if doc.visibility_state() == web_sys::VisibilityState::Visible {
            log::debug!("[APP] document visible");
            ctx.fire_resume(ResumeTrigger::Visibility);
        }
    });
    let on_focus = Closure::<dyn FnMut()>::new(move || {
        ctx.fire_resume(ResumeTrigger::Focus);
    });

    let _ = document
        .add_event_listener_with_callback("visibilitychange", on_visibility.as_ref().unchecked_ref());
    let _ = window.add_event_listener_with_callback("focus", on_focus.as_ref().unchecked_ref());

    // Listeners live as long as the page
    on_visibility.forget();
    on_focus.forget();
}
