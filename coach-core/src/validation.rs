//! Input Validation
//!
//! Checks run before any backend call. Failures are `InvalidInput` carrying the
//! message shown next to the field.

use std::sync::OnceLock;

use regex::Regex;

use crate::domain::{DomainError, DomainResult};

pub const MIN_PASSWORD_LEN: usize = 6;
pub const MAX_NAME_LEN: usize = 120;
pub const WEIGHT_RANGE_KG: (f64, f64) = (20.0, 400.0);
/// Bounds of a single water addition
pub const WATER_RANGE_ML: (i32, i32) = (1, 5000);

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_re() -> &'static Regex {
    EMAIL_RE.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"))
}

fn invalid(message: &str) -> DomainError {
    DomainError::InvalidInput(message.to_string())
}

/// Trimmed plan or template name
pub fn template_name(name: &str) -> DomainResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(invalid("El nombre es obligatorio."));
    }
    if trimmed.chars().count() > MAX_NAME_LEN {
        return Err(invalid("El nombre es demasiado largo."));
    }
    Ok(trimmed.to_string())
}

/// Trimmed, lowercased email address
pub fn email(value: &str) -> DomainResult<String> {
    let trimmed = value.trim().to_lowercase();
    if trimmed.is_empty() {
        return Err(invalid("Introduce tu email."));
    }
    if !email_re().is_match(&trimmed) {
        return Err(invalid("El email no es válido."));
    }
    Ok(trimmed)
}

pub fn password(value: &str) -> DomainResult<()> {
    if value.chars().count() < MIN_PASSWORD_LEN {
        return Err(DomainError::InvalidInput(format!(
            "La contraseña debe tener al menos {} caracteres.",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

pub fn weight_kg(value: f64) -> DomainResult<f64> {
    let (min, max) = WEIGHT_RANGE_KG;
    if !value.is_finite() || value < min || value > max {
        return Err(DomainError::InvalidInput(format!(
            "El peso debe estar entre {} y {} kg.",
            min, max
        )));
    }
    Ok(value)
}

pub fn water_ml(value: i32) -> DomainResult<i32> {
    let (min, max) = WATER_RANGE_ML;
    if value < min || value > max {
        return Err(DomainError::InvalidInput(format!(
            "La cantidad de agua debe estar entre {} y {} ml.",
            min, max
        )));
    }
    Ok(value)
}

/// Parse a weight typed by a person; accepts a decimal comma ("72,5")
pub fn parse_weight(input: &str) -> DomainResult<f64> {
    let normalized = input.trim().replace(',', ".");
    let value: f64 = normalized
        .parse()
        .map_err(|_| invalid("Introduce un peso válido."))?;
    weight_kg(value)
}
