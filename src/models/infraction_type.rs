//! Modelo de InfractionType (tipo de multa)
//!
//! Catálogo de infracciones con valor, gravedad y puntos. Solo se crea por
//! acción administrativa; la intake nunca lo crea.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};

use crate::repositories::{Entity, FieldValue};
use crate::utils::errors::AppResult;
use crate::utils::normalization::{Case, FieldNormalizer, Normalize};
use crate::utils::validation::{validate_positive, validate_range};

pub const CODE_MAX_LEN: usize = 20;
pub const DESCRIPTION_MAX_LEN: usize = 255;
pub const MAX_PENALTY_POINTS: i32 = 7;
pub const AMOUNT_SCALE: u32 = 2;

/// Valor máximo de una multa: 999999.99
pub fn max_amount() -> Decimal {
    Decimal::new(99_999_999, AMOUNT_SCALE)
}

/// Gravedad de la infracción - mapea al ENUM infraction_severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "infraction_severity")]
pub enum Severity {
    #[serde(rename = "leve")]
    #[sqlx(rename = "leve")]
    Light,
    #[serde(rename = "media")]
    #[sqlx(rename = "media")]
    Medium,
    #[serde(rename = "grave")]
    #[sqlx(rename = "grave")]
    Serious,
    #[serde(rename = "gravissima")]
    #[sqlx(rename = "gravissima")]
    VerySerious,
}

impl Severity {
    pub const ALL: [Severity; 4] = [
        Severity::Light,
        Severity::Medium,
        Severity::Serious,
        Severity::VerySerious,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Light => "leve",
            Severity::Medium => "media",
            Severity::Serious => "grave",
            Severity::VerySerious => "gravissima",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Severity::ALL
            .into_iter()
            .find(|severity| severity.as_str() == wanted)
            .ok_or_else(|| format!("Severity must be one of: leve, media, grave, gravissima (got '{}')", s))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct InfractionType {
    pub id: i64,
    pub code: String,
    pub description: Option<String>,
    pub amount: Decimal,
    pub severity: Severity,
    pub penalty_points: i32,
}

impl Normalize for InfractionType {
    fn normalize(self) -> AppResult<Self> {
        let mut n = FieldNormalizer::new();
        let code = n.required("code", &self.code, CODE_MAX_LEN, Case::Upper);
        let description = n.optional("description", self.description.as_deref(), DESCRIPTION_MAX_LEN, Case::Keep);

        if validate_positive(self.amount).is_err() {
            n.reject("amount", "positive", "Amount must be greater than zero");
        } else if self.amount > max_amount() {
            n.reject("amount", "range", "Amount cannot exceed 999999.99");
        }
        if self.amount.normalize().scale() > AMOUNT_SCALE {
            n.reject("amount", "scale", "Amount cannot have more than two decimal places");
        }

        if validate_range(self.penalty_points, 0, MAX_PENALTY_POINTS).is_err() {
            n.reject("penalty_points", "range", "Penalty points must be between 0 and 7");
        }
        n.finish()?;

        Ok(Self {
            id: self.id,
            code,
            description,
            amount: self.amount,
            severity: self.severity,
            penalty_points: self.penalty_points,
        })
    }
}

impl Entity for InfractionType {
    const NAME: &'static str = "infraction type";

    fn id(&self) -> i64 {
        self.id
    }

    fn with_id(self, id: i64) -> Self {
        Self { id, ..self }
    }

    fn unique_key(&self) -> Option<String> {
        Some(self.code.clone())
    }

    fn field(&self, column: &str) -> Option<FieldValue> {
        match column {
            "id" => Some(self.id.into()),
            "code" => Some(self.code.as_str().into()),
            "description" => self.description.as_deref().map(Into::into),
            "severity" => Some(self.severity.as_str().into()),
            "penalty_points" => Some(i64::from(self.penalty_points).into()),
            _ => None,
        }
    }
}
