//! Domain Layer - Core Entity Trait
//!
//! This trait defines the basic contract for all rows stored in the backend.
//! Every entity has a unique ID and lives in a named table.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Core trait for all domain entities
pub trait Entity: Sized + Send + Sync + Clone + Serialize + DeserializeOwned {
    /// The type of the entity's unique identifier
    type Id: Copy + Eq + std::hash::Hash + Send + Sync + Serialize + std::fmt::Display;

    /// Backend table holding rows of this entity
    const TABLE: &'static str;

    /// Returns the entity's unique identifier
    fn id(&self) -> Self::Id;
}

/// Common result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level errors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
pub enum DomainError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error("Request timed out after {0}s")]
    Timeout(u64),
    #[error("Backend error ({status}): {message}")]
    Backend { status: u16, message: String },
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// A multi-step write stopped part way; earlier steps stay written.
    #[error("Partial write: {completed}/{total} steps stored before failure: {cause}")]
    PartialWrite {
        completed: usize,
        total: usize,
        cause: Box<DomainError>,
    },
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    /// Short text suitable for showing to the person using the app
    pub fn user_message(&self) -> String {
        match self {
            DomainError::InvalidInput(msg) => msg.clone(),
            DomainError::NotFound(_) => "No se encontró el registro.".to_string(),
            DomainError::Unauthorized(_) => "Credenciales incorrectas o sesión caducada.".to_string(),
            DomainError::Network(_) | DomainError::Timeout(_) => {
                "Error de conexión. Inténtalo de nuevo.".to_string()
            }
            _ => "Ha ocurrido un error. Inténtalo de nuevo.".to_string(),
        }
    }

    /// Whether the failure came from connectivity rather than the request itself
    pub fn is_transient(&self) -> bool {
        matches!(self, DomainError::Network(_) | DomainError::Timeout(_))
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_hides_internal_detail() {
        let err = DomainError::Backend { status: 500, message: "relation does not exist".into() };
        assert!(!err.user_message().contains("relation"));
    }

    #[test]
    fn test_validation_message_is_shown_verbatim() {
        let err = DomainError::InvalidInput("El nombre es obligatorio".into());
        assert_eq!(err.user_message(), "El nombre es obligatorio");
    }

    #[test]
    fn test_transient_errors() {
        assert!(DomainError::Timeout(30).is_transient());
        assert!(DomainError::Network("dns".into()).is_transient());
        assert!(!DomainError::NotFound("x".into()).is_transient());
    }
}
