//! Guideline Entity
//!
//! Markdown notes the coach publishes to every client, shown in order.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use super::entity::Entity;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Guideline {
    pub id: Uuid,
    pub title: String,
    /// Markdown body
    pub content: String,
    pub order_index: i32,
    #[serde(default = "default_true")]
    pub published: bool,
}

fn default_true() -> bool {
    true
}

impl Guideline {
    pub fn new(title: String, content: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            title,
            content,
            order_index: 0,
            published: true,
        }
    }
}

impl Entity for Guideline {
    type Id = Uuid;
    const TABLE: &'static str = "guidelines";

    fn id(&self) -> Self::Id {
        self.id
    }
}
