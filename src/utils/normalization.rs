//! Normalización de entidades
//!
//! Recorta y ajusta mayúsculas/minúsculas de los campos de texto antes de
//! persistir, y rechaza campos obligatorios vacíos o que exceden su
//! longitud máxima. Normalizar un registro ya normalizado devuelve el
//! mismo registro.

use validator::ValidationErrors;

use crate::utils::errors::{into_result, push_violation, AppResult};

/// Entidades que se canonicalizan antes de persistir
pub trait Normalize: Sized {
    fn normalize(self) -> AppResult<Self>;
}

/// Cómo ajustar mayúsculas/minúsculas de un campo
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Case {
    Keep,
    Upper,
    Lower,
}

impl Case {
    fn apply(self, value: &str) -> String {
        match self {
            Case::Keep => value.to_string(),
            Case::Upper => value.to_uppercase(),
            Case::Lower => value.to_lowercase(),
        }
    }
}

/// Acumulador de violaciones que se comparte entre los campos de una entidad
#[derive(Debug, Default)]
pub struct FieldNormalizer {
    errors: ValidationErrors,
}

impl FieldNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Campo obligatorio: vacío o demasiado largo es una violación
    pub fn required(&mut self, field: &'static str, value: &str, max: usize, case: Case) -> String {
        let trimmed = case.apply(value.trim());
        if trimmed.is_empty() {
            push_violation(&mut self.errors, field, "required", format!("{} is required", field));
        } else {
            self.check_length(field, &trimmed, max);
        }
        trimmed
    }

    /// Campo opcional: un valor en blanco se normaliza a `None`
    pub fn optional(
        &mut self,
        field: &'static str,
        value: Option<&str>,
        max: usize,
        case: Case,
    ) -> Option<String> {
        let trimmed = value.map(str::trim).filter(|v| !v.is_empty())?;
        let normalized = case.apply(trimmed);
        self.check_length(field, &normalized, max);
        Some(normalized)
    }

    /// Registrar una violación de una regla específica de la entidad
    pub fn reject(&mut self, field: &'static str, code: &'static str, message: impl Into<String>) {
        push_violation(&mut self.errors, field, code, message.into());
    }

    fn check_length(&mut self, field: &'static str, value: &str, max: usize) {
        let len = value.chars().count();
        if len > max {
            push_violation(
                &mut self.errors,
                field,
                "length",
                format!("{} cannot exceed {} characters (got {})", field, max, len),
            );
        }
    }

    /// Terminar: error con todas las violaciones acumuladas, si hay alguna
    pub fn finish(self) -> AppResult<()> {
        into_result(self.errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_trims_and_cases() {
        let mut n = FieldNormalizer::new();
        assert_eq!(n.required("code", "  501-1a ", 20, Case::Upper), "501-1A");
        assert_eq!(n.required("severity", " GRAVE", 20, Case::Lower), "grave");
        assert!(n.finish().is_ok());
    }

    #[test]
    fn test_blank_required_is_rejected() {
        let mut n = FieldNormalizer::new();
        n.required("full_name", "   ", 100, Case::Keep);
        let err = n.finish().unwrap_err();
        assert_eq!(err.violated_fields(), vec!["full_name"]);
    }

    #[test]
    fn test_optional_blank_becomes_none() {
        let mut n = FieldNormalizer::new();
        assert_eq!(n.optional("brand", Some("  "), 50, Case::Keep), None);
        assert_eq!(n.optional("brand", None, 50, Case::Keep), None);
        assert_eq!(n.optional("brand", Some(" Fiat "), 50, Case::Keep), Some("Fiat".to_string()));
        assert!(n.finish().is_ok());
    }

    #[test]
    fn test_every_overlong_field_is_reported() {
        let mut n = FieldNormalizer::new();
        n.optional("location", Some(&"x".repeat(256)), 255, Case::Keep);
        n.optional("description", Some(&"y".repeat(300)), 255, Case::Keep);
        let err = n.finish().unwrap_err();
        assert_eq!(err.violated_fields(), vec!["description", "location"]);
    }
}
