//! Reactive Hooks

mod page_data;
mod resume;

pub use page_data::{use_page_data, PageHandle};
pub use resume::install_resume_listeners;
