//! Modelo de Driver (condutor)
//!
//! El CPF se guarda en forma canónica (11 dígitos, sin separadores) y es
//! la clave única del condutor.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::repositories::{Entity, FieldValue};
use crate::utils::errors::AppResult;
use crate::utils::normalization::{Case, FieldNormalizer, Normalize};
use crate::utils::validation::canonical_tax_id;

pub const TAX_ID_MAX_LEN: usize = 11;
pub const LICENSE_NUMBER_MAX_LEN: usize = 20;
pub const LICENSE_CATEGORY_MAX_LEN: usize = 5;
pub const REGION_MAX_LEN: usize = 2;
pub const FULL_NAME_MAX_LEN: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Driver {
    pub id: i64,
    pub tax_id: String,
    pub license_number: Option<String>,
    pub license_category: Option<String>,
    /// UF emisora del documento
    pub region: Option<String>,
    pub full_name: String,
}

impl Normalize for Driver {
    fn normalize(self) -> AppResult<Self> {
        let mut n = FieldNormalizer::new();
        let tax_id = n.required("tax_id", &canonical_tax_id(&self.tax_id), TAX_ID_MAX_LEN, Case::Keep);
        let license_number = n.optional(
            "license_number",
            self.license_number.as_deref(),
            LICENSE_NUMBER_MAX_LEN,
            Case::Keep,
        );
        let license_category = n.optional(
            "license_category",
            self.license_category.as_deref(),
            LICENSE_CATEGORY_MAX_LEN,
            Case::Upper,
        );
        let region = n.optional("region", self.region.as_deref(), REGION_MAX_LEN, Case::Upper);
        let full_name = n.required("full_name", &self.full_name, FULL_NAME_MAX_LEN, Case::Keep);
        n.finish()?;

        Ok(Self {
            id: self.id,
            tax_id,
            license_number,
            license_category,
            region,
            full_name,
        })
    }
}

impl Entity for Driver {
    const NAME: &'static str = "driver";

    fn id(&self) -> i64 {
        self.id
    }

    fn with_id(self, id: i64) -> Self {
        Self { id, ..self }
    }

    fn unique_key(&self) -> Option<String> {
        Some(self.tax_id.clone())
    }

    fn field(&self, column: &str) -> Option<FieldValue> {
        match column {
            "id" => Some(self.id.into()),
            "tax_id" => Some(self.tax_id.as_str().into()),
            "license_number" => self.license_number.as_deref().map(Into::into),
            "license_category" => self.license_category.as_deref().map(Into::into),
            "region" => self.region.as_deref().map(Into::into),
            "full_name" => Some(self.full_name.as_str().into()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_driver() {
        let driver = Driver {
            id: 0,
            tax_id: "111.444.777-35".to_string(),
            license_number: Some(" 12345678901 ".to_string()),
            license_category: Some("ab".to_string()),
            region: Some(" sp".to_string()),
            full_name: "  Jane Doe ".to_string(),
        }
        .normalize()
        .unwrap();

        assert_eq!(driver.tax_id, "11144477735");
        assert_eq!(driver.license_number.as_deref(), Some("12345678901"));
        assert_eq!(driver.license_category.as_deref(), Some("AB"));
        assert_eq!(driver.region.as_deref(), Some("SP"));
        assert_eq!(driver.full_name, "Jane Doe");

        assert_eq!(driver.clone().normalize().unwrap(), driver);
    }

    #[test]
    fn test_missing_name_and_bad_region() {
        let err = Driver {
            id: 0,
            tax_id: "11144477735".to_string(),
            license_number: None,
            license_category: None,
            region: Some("SPX".to_string()),
            full_name: String::new(),
        }
        .normalize()
        .unwrap_err();

        assert_eq!(err.violated_fields(), vec!["full_name", "region"]);
    }
}
