//! Modelo de Vehicle
//!
//! Este módulo contiene el struct Vehicle y su normalización.
//! Mapea exactamente a la tabla `vehicles` con primary key 'id'.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::repositories::{Entity, FieldValue};
use crate::utils::errors::AppResult;
use crate::utils::normalization::{Case, FieldNormalizer, Normalize};
use crate::utils::validation::canonical_plate;

pub const PLATE_MAX_LEN: usize = 10;
pub const BRAND_MAX_LEN: usize = 50;
pub const MODEL_MAX_LEN: usize = 50;
pub const CATEGORY_MAX_LEN: usize = 30;
pub const OWNER_MAX_LEN: usize = 100;

/// Vehicle principal - la placa es única y se guarda en mayúsculas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Vehicle {
    pub id: i64,
    pub plate: String,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub category: Option<String>,
    pub owner_name: Option<String>,
}

impl Normalize for Vehicle {
    fn normalize(self) -> AppResult<Self> {
        let mut n = FieldNormalizer::new();
        let plate = n.required("plate", &canonical_plate(&self.plate), PLATE_MAX_LEN, Case::Upper);
        let brand = n.optional("brand", self.brand.as_deref(), BRAND_MAX_LEN, Case::Keep);
        let model = n.optional("model", self.model.as_deref(), MODEL_MAX_LEN, Case::Keep);
        let category = n.optional("category", self.category.as_deref(), CATEGORY_MAX_LEN, Case::Keep);
        let owner_name = n.optional("owner_name", self.owner_name.as_deref(), OWNER_MAX_LEN, Case::Keep);
        n.finish()?;

        Ok(Self {
            id: self.id,
            plate,
            brand,
            model,
            category,
            owner_name,
        })
    }
}

impl Entity for Vehicle {
    const NAME: &'static str = "vehicle";

    fn id(&self) -> i64 {
        self.id
    }

    fn with_id(self, id: i64) -> Self {
        Self { id, ..self }
    }

    fn unique_key(&self) -> Option<String> {
        Some(self.plate.clone())
    }

    fn field(&self, column: &str) -> Option<FieldValue> {
        match column {
            "id" => Some(self.id.into()),
            "plate" => Some(self.plate.as_str().into()),
            "brand" => self.brand.as_deref().map(Into::into),
            "model" => self.model.as_deref().map(Into::into),
            "category" => self.category.as_deref().map(Into::into),
            "owner_name" => self.owner_name.as_deref().map(Into::into),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_vehicle() -> Vehicle {
        Vehicle {
            id: 0,
            plate: " abc 1d23 ".to_string(),
            brand: Some(" Toyota ".to_string()),
            model: Some("Corolla".to_string()),
            category: Some("   ".to_string()),
            owner_name: None,
        }
    }

    #[test]
    fn test_normalize_vehicle() {
        let vehicle = raw_vehicle().normalize().unwrap();
        assert_eq!(vehicle.plate, "ABC1D23");
        assert_eq!(vehicle.brand.as_deref(), Some("Toyota"));
        assert_eq!(vehicle.category, None);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let once = raw_vehicle().normalize().unwrap();
        let twice = once.clone().normalize().unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_overlong_fields_are_rejected() {
        let vehicle = Vehicle {
            brand: Some("B".repeat(51)),
            owner_name: Some("O".repeat(101)),
            ..raw_vehicle()
        };
        let err = vehicle.normalize().unwrap_err();
        assert_eq!(err.violated_fields(), vec!["brand", "owner_name"]);
    }
}
