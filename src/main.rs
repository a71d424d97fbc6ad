//! Coach Frontend Entry Point

mod app;
mod components;
mod context;
mod hooks;
mod markdown;
mod services;
mod storage;
mod store;

use app::App;
use leptos::prelude::*;

/// Lines kept for the diagnostics panel
const LOG_CAPACITY: usize = 500;

fn main() {
    console_error_panic_hook::set_once();
    if let Err(e) = rolling_logger::init_logger("Coach", LOG_CAPACITY) {
        web_sys::console::error_1(&format!("[APP] logger init failed: {}", e).into());
    }
    mount_to_body(App);
}
