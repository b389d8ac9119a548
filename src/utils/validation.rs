//! Utilidades de validación
//!
//! Este módulo contiene los validadores de identificadores del dominio
//! (CPF del condutor y placa del vehículo) y funciones helper para
//! validación de datos y conversión de tipos.

use chrono::{DateTime, NaiveDateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use validator::ValidationError;

lazy_static! {
    /// Placa antigua: ABC1234
    static ref LEGACY_PLATE: Regex = Regex::new(r"^[A-Z]{3}[0-9]{4}$").unwrap();
    /// Placa Mercosul: ABC1D23
    static ref MERCOSUR_PLATE: Regex = Regex::new(r"^[A-Z]{3}[0-9][A-Z][0-9]{2}$").unwrap();
    /// Placa antigua con guion: ABC-1234
    static ref HYPHENATED_PLATE: Regex = Regex::new(r"^[A-Z]{3}-[0-9]{4}$").unwrap();
}

const TAX_ID_LEN: usize = 11;
const FIRST_CHECK_WEIGHTS: [u32; 9] = [10, 9, 8, 7, 6, 5, 4, 3, 2];
const SECOND_CHECK_WEIGHTS: [u32; 10] = [11, 10, 9, 8, 7, 6, 5, 4, 3, 2];

/// Quitar separadores ('.', '-', espacios) de un CPF
pub fn strip_tax_id(raw: &str) -> String {
    raw.chars().filter(|c| !matches!(c, '.' | '-' | ' ')).collect()
}

/// Dígito verificador módulo 11 sobre los dígitos dados
fn check_digit(digits: &[u32], weights: &[u32]) -> u32 {
    let sum: u32 = digits.iter().zip(weights).map(|(d, w)| d * w).sum();
    let remainder = sum % 11;
    if remainder < 2 {
        0
    } else {
        11 - remainder
    }
}

/// Validar un CPF con el algoritmo de dos dígitos verificadores
pub fn validate_tax_id(raw: &str) -> bool {
    let stripped = strip_tax_id(raw);
    if stripped.chars().count() != TAX_ID_LEN {
        return false;
    }

    let digits: Vec<u32> = match stripped.chars().map(|c| c.to_digit(10)).collect::<Option<Vec<_>>>() {
        Some(digits) => digits,
        None => return false,
    };

    if digits.iter().all(|d| *d == digits[0]) {
        return false;
    }

    let first = check_digit(&digits[..9], &FIRST_CHECK_WEIGHTS);
    let mut with_first = digits[..9].to_vec();
    with_first.push(first);
    let second = check_digit(&with_first, &SECOND_CHECK_WEIGHTS);

    digits[9] == first && digits[10] == second
}

/// Forma canónica de un CPF: solo los 11 dígitos
pub fn canonical_tax_id(raw: &str) -> String {
    strip_tax_id(raw.trim())
}

/// Forma canónica de una placa: sin espacios y en mayúsculas
pub fn canonical_plate(raw: &str) -> String {
    raw.chars().filter(|c| *c != ' ').collect::<String>().to_uppercase()
}

/// Validar formato de placa (antigua, Mercosul o antigua con guion)
pub fn validate_plate(raw: &str) -> bool {
    let plate = canonical_plate(raw);
    match plate.len() {
        7 => LEGACY_PLATE.is_match(&plate) || MERCOSUR_PLATE.is_match(&plate),
        8 => HYPHENATED_PLATE.is_match(&plate),
        _ => false,
    }
}

/// Adaptador de `validate_plate` para `#[validate(custom = ...)]`
pub fn validate_plate_format(value: &str) -> Result<(), ValidationError> {
    if validate_plate(value) {
        return Ok(());
    }
    let mut error = ValidationError::new("plate");
    error.message = Some("Invalid plate format".into());
    error.add_param("value".into(), &value.to_string());
    Err(error)
}

/// Adaptador de `validate_tax_id` para `#[validate(custom = ...)]`
pub fn validate_tax_id_format(value: &str) -> Result<(), ValidationError> {
    if validate_tax_id(value) {
        return Ok(());
    }
    let mut error = ValidationError::new("tax_id");
    error.message = Some("Invalid tax identifier".into());
    Err(error)
}

/// Validar y convertir string a datetime
///
/// Acepta RFC3339 o `YYYY-MM-DDTHH:MM:SS` (interpretado como UTC).
pub fn validate_datetime(value: &str) -> Result<DateTime<Utc>, ValidationError> {
    let value = value.trim();
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f").map(|naive| naive.and_utc())
        })
        .map_err(|_| {
            let mut error = ValidationError::new("datetime");
            error.add_param("value".into(), &value.to_string());
            error.add_param("format".into(), &"RFC3339".to_string());
            error
        })
}

/// Validar que un string no esté vacío
pub fn validate_not_empty(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("not_empty"));
    }
    Ok(())
}

/// Validar longitud máxima
pub fn validate_max_length(value: &str, max: usize) -> Result<(), ValidationError> {
    let len = value.chars().count();
    if len > max {
        let mut error = ValidationError::new("length");
        error.add_param("max".into(), &max);
        error.add_param("actual".into(), &len);
        return Err(error);
    }
    Ok(())
}

/// Validar que un valor esté en un rango específico
pub fn validate_range<T: PartialOrd + std::fmt::Display + Serialize>(
    value: T,
    min: T,
    max: T,
) -> Result<(), ValidationError> {
    if value < min || value > max {
        let mut error = ValidationError::new("range");
        error.add_param("min".into(), &min);
        error.add_param("max".into(), &max);
        error.add_param("actual".into(), &value);
        return Err(error);
    }
    Ok(())
}

/// Validar que un valor sea positivo
pub fn validate_positive<T: PartialOrd + std::fmt::Display + num_traits::Zero + Serialize>(
    value: T,
) -> Result<(), ValidationError> {
    if value <= T::zero() {
        let mut error = ValidationError::new("positive");
        error.add_param("value".into(), &value);
        return Err(error);
    }
    Ok(())
}

/// Validar formato de email (básico)
pub fn validate_email(value: &str) -> Result<(), ValidationError> {
    if !value.contains('@') || !value.contains('.') {
        let mut error = ValidationError::new("email");
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}
