//! Profile Entity
//!
//! One row per signed-in person. The role decides which half of the app they see.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use super::entity::Entity;

/// Role determines which views a profile can reach
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Coach managing rosters and templates
    Admin,
    /// Coached person
    #[default]
    Client,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Client => "client",
        }
    }

    /// Anything but `"admin"` reads as a client
    pub fn parse(s: &str) -> Self {
        match s {
            "admin" => Role::Admin,
            _ => Role::Client,
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

/// A person using the app (mirrors the `profiles` table)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    /// Same id as the auth user
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub phone: Option<String>,
    /// Weight goal in kilograms
    #[serde(default)]
    pub goal_weight_kg: Option<f64>,
    /// Daily water goal in millilitres
    #[serde(default)]
    pub water_goal_ml: Option<i32>,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default)]
    pub created_at: Option<String>,
}

fn default_true() -> bool {
    true
}

impl Profile {
    pub fn new(id: Uuid, email: String, full_name: String, role: Role) -> Self {
        Self {
            id,
            email,
            full_name,
            role,
            phone: None,
            goal_weight_kg: None,
            water_goal_ml: None,
            active: true,
            created_at: None,
        }
    }

    /// Name to show in lists, falling back to the email
    pub fn display_name(&self) -> &str {
        if self.full_name.trim().is_empty() {
            &self.email
        } else {
            &self.full_name
        }
    }
}

impl Entity for Profile {
    type Id = Uuid;
    const TABLE: &'static str = "profiles";

    fn id(&self) -> Self::Id {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip_from_row() {
        let json = r#"{"id":"6f1c1a1e-8a53-4c53-9d59-0c1d1b7a0a11","email":"a@b.c","full_name":"Ana","role":"admin"}"#;
        let profile: Profile = serde_json::from_str(json).unwrap();
        assert!(profile.role.is_admin());
        assert!(profile.active);
        assert_eq!(profile.water_goal_ml, None);
    }

    #[test]
    fn test_unknown_role_is_client() {
        assert_eq!(Role::parse("coach"), Role::Client);
    }

    #[test]
    fn test_display_name_falls_back_to_email() {
        let p = Profile::new(Uuid::new_v4(), "x@y.z".into(), "  ".into(), Role::Client);
        assert_eq!(p.display_name(), "x@y.z");
    }
}
