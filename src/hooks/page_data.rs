//! Page Data Hook
//!
//! Binds a [`PageDataController`] to the component that owns it: the identity signal
//! and dependency list start sessions, foreground/focus events trigger a delayed
//! refetch, and unmounting stops results from landing.

use std::future::Future;
use std::rc::Rc;

use coach_core::page_data::{Loader, PageDataController, Sink};
use coach_core::DomainResult;
use futures::FutureExt;
use gloo_timers::future::TimeoutFuture;
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::context::AppContext;

/// What a view keeps from [`use_page_data`]
pub struct PageHandle<T: 'static> {
    /// True until the first load of the current session settles
    pub first_load: ReadSignal<bool>,
    /// Message for the last failed load; cleared when data arrives
    pub error: ReadSignal<Option<String>>,
    controller: StoredValue<PageDataController<T>, LocalStorage>,
}

impl<T: 'static> Clone for PageHandle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: 'static> Copy for PageHandle<T> {}

impl<T: 'static> PageHandle<T> {
    /// Manual refresh; dropped while a load runs or within the debounce window
    pub fn refetch(&self) {
        if let Some(controller) = self.controller.try_get_value() {
            spawn_local(async move {
                controller.refetch().await;
            });
        }
    }
}

/// Load a view's data for the signed-in user
///
/// * `dependencies` - extra inputs (selected date, client...) that start a new session
/// * `loader` - fetches the data for an identity
/// * `sink` - receives data while the view is mounted
pub fn use_page_data<T, L, Fut>(
    name: &'static str,
    dependencies: impl Fn() -> Vec<String> + 'static,
    loader: L,
    sink: impl Fn(T) + 'static,
) -> PageHandle<T>
where
    T: 'static,
    L: Fn(String) -> Fut + 'static,
    Fut: Future<Output = DomainResult<T>> + 'static,
{
    let ctx = use_context::<AppContext>().expect("AppContext should be provided");
    let identity = ctx.identity();
    let (first_load, set_first_load) = signal(true);
    let (error, set_error) = signal::<Option<String>>(None);

    let loader: Loader<T> = Rc::new(move |id| loader(id).boxed_local());
    let sink: Sink<T> = Rc::new(sink);
    let controller = PageDataController::new(name, loader, sink)
        .on_first_load_change(move |value| {
            set_first_load.try_set(value);
        })
        .on_error_change(move |e| {
            set_error.try_set(e.map(|e| e.user_message()));
        });
    let resume_delay = controller.resume_delay().as_millis() as u32;
    let controller = StoredValue::new_local(controller);

    // Identity or dependency change
    Effect::new(move |_| {
        let identity = identity.get();
        let dependencies = dependencies();
        if let Some(controller) = controller.try_get_value() {
            spawn_local(async move {
                controller.initialize(identity, dependencies).await;
            });
        }
    });

    // Foreground / focus; the first run only subscribes
    Effect::new(move |subscribed: Option<()>| {
        let resume = ctx.resume.get();
        if subscribed.is_none() {
            return;
        }
        if let (Some((trigger, _)), Some(controller)) = (resume, controller.try_get_value()) {
            spawn_local(async move {
                controller.resume(trigger, TimeoutFuture::new(resume_delay)).await;
            });
        }
    });

    on_cleanup(move || {
        controller.try_with_value(|c| c.unmount());
    });

    PageHandle { first_load, error, controller }
}
