//! Helpers shared by the form <-> payload mappings.
//!
//! Form fields are kept as the user typed them (strings, checkboxes). The
//! helpers here turn them into wire values: blank optionals become absent,
//! numbers are parsed, dates are checked.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use thiserror::Error;

/// Rejected form input. Display strings are shown to the user as-is.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FormError {
    #[error("Le champ « {field} » est obligatoire")]
    Required { field: &'static str },

    #[error("Valeur numérique invalide pour « {field} » : {value}")]
    InvalidNumber { field: &'static str, value: String },

    #[error("Date invalide pour « {field} » : {value}")]
    InvalidDate { field: &'static str, value: String },

    #[error("La date de fin précède la date de début")]
    EndBeforeStart,

    #[error("Un seul visuel peut être marqué par défaut")]
    MultipleDefaultImages,

    #[error("Des images sont encore en attente de téléversement")]
    UploadsPending,

    #[error("Une catégorie ne peut pas être sa propre catégorie parente")]
    SelfParent,
}

/// `""` maps to absent, anything else is sent as typed.
pub fn blank_to_none(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Rejects empty or whitespace-only input; the value itself is sent as typed.
pub fn required(field: &'static str, value: &str) -> Result<String, FormError> {
    if value.trim().is_empty() {
        return Err(FormError::Required { field });
    }
    Ok(value.to_string())
}

/// Parses a non-negative amount. Accepts a French decimal comma.
pub fn parse_amount(field: &'static str, value: &str) -> Result<f64, FormError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(FormError::Required { field });
    }
    let invalid = || FormError::InvalidNumber {
        field,
        value: trimmed.to_string(),
    };
    let amount: f64 = trimmed.replace(',', ".").parse().map_err(|_| invalid())?;
    if !amount.is_finite() || amount < 0.0 {
        return Err(invalid());
    }
    Ok(amount)
}

/// Blank counts as zero.
pub fn parse_integer(field: &'static str, value: &str) -> Result<i32, FormError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(0);
    }
    trimmed.parse().map_err(|_| FormError::InvalidNumber {
        field,
        value: trimmed.to_string(),
    })
}

/// Parses a `YYYY-MM-DD` date input; blank is absent.
pub fn parse_date(field: &'static str, value: &str) -> Result<Option<NaiveDate>, FormError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| FormError::InvalidDate {
            field,
            value: trimmed.to_string(),
        })
}

/// Value for a date input: the calendar day of a stored timestamp.
pub fn date_input(value: Option<&DateTime<Utc>>) -> String {
    value
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

pub fn iso_millis(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}
