//! Bottom Navigation Component
//!
//! Tab bar for switching between the screens the signed-in role may open.

use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::context::{AppContext, View};
use crate::services::use_services;
use crate::storage;

#[component]
pub fn BottomNav() -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext should be provided");
    let services = use_services();

    let on_sign_out = move |_| {
        let services = services.clone();
        spawn_local(async move {
            // Local state goes regardless of the request outcome
            if let Err(e) = services.auth.sign_out().await {
                log::warn!("[APP] sign out: {}", e);
            }
            storage::clear_session();
            storage::role_cache().clear();
            ctx.set_user(None);
        });
    };

    view! {
        <nav class="bottom-nav">
            {move || {
                ctx.role.get().map(|role| {
                    View::for_role(role).iter().map(|view| {
                        let view = *view;
                        let tab_class = move || {
                            if ctx.view.get() == view { "nav-tab active" } else { "nav-tab" }
                        };
                        view! {
                            <button class=tab_class on:click=move |_| ctx.navigate(view)>
                                {view.label()}
                            </button>
                        }
                    }).collect_view()
                })
            }}
            <button class="nav-tab sign-out" on:click=on_sign_out>"Salir"</button>
        </nav>
    }
}
