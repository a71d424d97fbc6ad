//! UI Components
//!
//! Screens and the reusable pieces they share.

mod bottom_nav;
mod bottom_sheet;
mod clients_admin;
mod compare_slider;
mod confirm_delete;
mod diagnostics_panel;
mod diet_view;
mod guidelines_view;
mod login_view;
mod progress_view;
mod skeleton;
mod template_editor;
mod templates_admin;
mod workout_view;

pub use bottom_nav::BottomNav;
pub use clients_admin::ClientsAdmin;
pub use diagnostics_panel::DiagnosticsPanel;
pub use diet_view::DietView;
pub use guidelines_view::GuidelinesView;
pub use login_view::LoginView;
pub use progress_view::ProgressView;
pub use templates_admin::TemplatesAdmin;
pub use workout_view::WorkoutView;
