//! Coach Core
//!
//! Domain model, backend client, repositories and the page-data controller shared by
//! the coaching PWA. Nothing here depends on the browser.

pub mod backend;
pub mod cache;
pub mod config;
pub mod domain;
pub mod page_data;
pub mod repository;
pub mod validation;

pub use config::{BackendConfig, PageDataConfig};
pub use domain::{DomainError, DomainResult};
