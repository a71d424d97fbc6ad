//! Application Context
//!
//! Shared state provided via Leptos Context API.

use coach_core::domain::{Profile, Role};
use coach_core::page_data::ResumeTrigger;
use leptos::prelude::*;
use uuid::Uuid;

/// Top-level screens behind the bottom navigation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum View {
    Diet,
    Workout,
    Progress,
    Guidelines,
    Templates,
    Clients,
    Diagnostics,
}

impl View {
    pub fn label(&self) -> &'static str {
        match self {
            View::Diet => "Dieta",
            View::Workout => "Rutina",
            View::Progress => "Progreso",
            View::Guidelines => "Pautas",
            View::Templates => "Plantillas",
            View::Clients => "Clientes",
            View::Diagnostics => "Registro",
        }
    }

    /// Screens reachable with `role`, in navigation order
    pub fn for_role(role: Role) -> &'static [View] {
        match role {
            Role::Admin => &[View::Templates, View::Clients, View::Guidelines, View::Diagnostics],
            Role::Client => &[View::Diet, View::Workout, View::Progress, View::Guidelines],
        }
    }

    pub fn home(role: Role) -> View {
        View::for_role(role)[0]
    }

    pub fn allowed(&self, role: Role) -> bool {
        View::for_role(role).contains(self)
    }
}

/// App-wide signals provided via context
#[derive(Clone, Copy)]
pub struct AppContext {
    /// Signed-in user - read
    pub user_id: ReadSignal<Option<Uuid>>,
    /// Signed-in user - write
    set_user_id: WriteSignal<Option<Uuid>>,
    /// Role from cache first, then from the profile - read
    pub role: ReadSignal<Option<Role>>,
    /// Role from cache first, then from the profile - write
    set_role: WriteSignal<Option<Role>>,
    /// Fresh profile of the signed-in user
    pub profile: RwSignal<Option<Profile>>,
    /// Current screen - read
    pub view: ReadSignal<View>,
    /// Current screen - write
    set_view: WriteSignal<View>,
    /// Last foreground/focus event with a counter so repeats still notify
    pub resume: ReadSignal<Option<(ResumeTrigger, u32)>>,
    set_resume: WriteSignal<Option<(ResumeTrigger, u32)>>,
    /// One-line message shown in the toast
    pub notice: RwSignal<Option<String>>,
}

impl AppContext {
    pub fn new(
        user_id: (ReadSignal<Option<Uuid>>, WriteSignal<Option<Uuid>>),
        role: (ReadSignal<Option<Role>>, WriteSignal<Option<Role>>),
        view: (ReadSignal<View>, WriteSignal<View>),
    ) -> Self {
        let (resume, set_resume) = signal(None);
        Self {
            user_id: user_id.0,
            set_user_id: user_id.1,
            role: role.0,
            set_role: role.1,
            profile: RwSignal::new(None),
            view: view.0,
            set_view: view.1,
            resume,
            set_resume,
            notice: RwSignal::new(None),
        }
    }

    /// Identity string the page-data controllers key their sessions on
    pub fn identity(&self) -> Signal<Option<String>> {
        let user_id = self.user_id;
        Signal::derive(move || user_id.get().map(|id| id.to_string()))
    }

    pub fn set_user(&self, user_id: Option<Uuid>) {
        self.set_user_id.set(user_id);
        if user_id.is_none() {
            self.set_role.set(None);
            self.profile.set(None);
        }
    }

    /// Apply a role; moves to the role's home screen when the current one is not allowed
    pub fn set_role(&self, role: Role) {
        self.set_role.set(Some(role));
        if !self.view.get_untracked().allowed(role) {
            self.set_view.set(View::home(role));
        }
    }

    pub fn navigate(&self, view: View) {
        self.set_view.set(view);
    }

    pub fn fire_resume(&self, trigger: ResumeTrigger) {
        self.set_resume.update(|current| {
            let count = current.map_or(0, |(_, n)| n.wrapping_add(1));
            *current = Some((trigger, count));
        });
    }

    pub fn notify(&self, message: impl Into<String>) {
        self.notice.set(Some(message.into()));
    }
}
