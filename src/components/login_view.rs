//! Login View
//!
//! Welcome screen whose sign-in form lives in a sheet dragged up from the bottom.
//! Also sends password-reset emails.

use coach_core::validation;
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_gesture::open_reveal;

use super::bottom_sheet::{create_sheet, BottomSheet};
use crate::context::AppContext;
use crate::services::use_services;
use crate::storage;

#[component]
pub fn LoginView() -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext should be provided");
    let services = use_services();
    let sheet = create_sheet();

    let (email, set_email) = signal(String::new());
    let (password, set_password) = signal(String::new());
    let (error, set_error) = signal::<Option<String>>(None);
    let (info, set_info) = signal::<Option<String>>(None);
    let (busy, set_busy) = signal(false);

    let on_submit = {
        let services = services.clone();
        move |ev: web_sys::SubmitEvent| {
            ev.prevent_default();
            if busy.get_untracked() {
                return;
            }
            set_info.set(None);
            let credentials = validation::email(&email.get_untracked())
                .and_then(|email| validation::password(&password.get_untracked()).map(|_| email));
            let email = match credentials {
                Ok(email) => email,
                Err(e) => {
                    set_error.set(Some(e.user_message()));
                    return;
                }
            };
            set_error.set(None);
            set_busy.set(true);

            let services = services.clone();
            let password = password.get_untracked();
            spawn_local(async move {
                match services.auth.sign_in_with_password(&email, &password).await {
                    Ok(session) => {
                        storage::save_session(&session);
                        set_password.set(String::new());
                        ctx.set_user(Some(session.user_id()));
                    }
                    Err(e) => {
                        log::warn!("[AUTH] sign in failed: {}", e);
                        set_error.set(Some(e.user_message()));
                    }
                }
                set_busy.set(false);
            });
        }
    };

    let on_reset = move |_| {
        let address = match validation::email(&email.get_untracked()) {
            Ok(address) => address,
            Err(e) => {
                set_error.set(Some(e.user_message()));
                return;
            }
        };
        set_error.set(None);
        let services = services.clone();
        spawn_local(async move {
            let redirect = web_sys::window().and_then(|w| w.location().origin().ok());
            match services.auth.reset_password_for_email(&address, redirect.as_deref()).await {
                Ok(()) => set_info.set(Some("Te hemos enviado un correo para restablecer la contraseña.".into())),
                Err(e) => set_error.set(Some(e.user_message())),
            }
        });
    };

    view! {
        <div class="login-view">
            <div class="login-hero">
                <h1>"Coach"</h1>
                <p>"Tu plan de dieta y entrenamiento, siempre contigo."</p>
                <button class="primary" on:click=move |_| open_reveal(sheet)>"Entrar"</button>
            </div>
            <BottomSheet reveal=sheet title="Iniciar sesión" peek=true>
                <form class="login-form" on:submit=on_submit.clone()>
                    <input
                        type="email"
                        placeholder="Correo electrónico"
                        autocomplete="email"
                        prop:value=move || email.get()
                        on:input=move |ev| set_email.set(event_target_value(&ev))
                    />
                    <input
                        type="password"
                        placeholder="Contraseña"
                        autocomplete="current-password"
                        prop:value=move || password.get()
                        on:input=move |ev| set_password.set(event_target_value(&ev))
                    />
                    {move || error.get().map(|msg| view! { <p class="form-error">{msg}</p> })}
                    {move || info.get().map(|msg| view! { <p class="form-info">{msg}</p> })}
                    <button type="submit" class="primary" disabled=move || busy.get()>
                        {move || if busy.get() { "Entrando..." } else { "Entrar" }}
                    </button>
                    <button type="button" class="link" on:click=on_reset.clone()>
                        "¿Olvidaste tu contraseña?"
                    </button>
                </form>
            </BottomSheet>
        </div>
    }
}
