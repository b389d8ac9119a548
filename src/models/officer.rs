//! Modelo de Officer (agente de tránsito)
//!
//! El agente que registra la multa. La contraseña nunca se guarda en claro:
//! solo el hash bcrypt, que no se serializa en las respuestas.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};

use crate::repositories::{Entity, FieldValue};
use crate::utils::errors::AppResult;
use crate::utils::normalization::{Case, FieldNormalizer, Normalize};
use crate::utils::validation::canonical_tax_id;

pub const NAME_MAX_LEN: usize = 100;
pub const EMAIL_MAX_LEN: usize = 100;
pub const TAX_ID_MAX_LEN: usize = 11;
pub const PASSWORD_MIN_LEN: usize = 6;
pub const PASSWORD_MAX_LEN: usize = 100;

/// Rol del agente - mapea al ENUM officer_role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "officer_role", rename_all = "lowercase")]
pub enum OfficerRole {
    Agent,
    Supervisor,
    Administrator,
}

impl OfficerRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            OfficerRole::Agent => "agent",
            OfficerRole::Supervisor => "supervisor",
            OfficerRole::Administrator => "administrator",
        }
    }
}

impl fmt::Display for OfficerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OfficerRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "agent" => Ok(OfficerRole::Agent),
            "supervisor" => Ok(OfficerRole::Supervisor),
            "administrator" => Ok(OfficerRole::Administrator),
            other => Err(format!("Role must be one of: agent, supervisor, administrator (got '{}')", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Officer {
    pub id: i64,
    pub name: String,
    pub tax_id: Option<String>,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub role: OfficerRole,
    pub created_at: DateTime<Utc>,
}

impl Normalize for Officer {
    fn normalize(self) -> AppResult<Self> {
        let mut n = FieldNormalizer::new();
        let name = n.required("name", &self.name, NAME_MAX_LEN, Case::Keep);
        let tax_id = n.optional(
            "tax_id",
            self.tax_id.as_deref().map(canonical_tax_id).as_deref(),
            TAX_ID_MAX_LEN,
            Case::Keep,
        );
        let email = n.required("email", &self.email, EMAIL_MAX_LEN, Case::Lower);
        n.finish()?;

        Ok(Self {
            name,
            tax_id,
            email,
            ..self
        })
    }
}

impl Entity for Officer {
    const NAME: &'static str = "officer";

    fn id(&self) -> i64 {
        self.id
    }

    fn with_id(self, id: i64) -> Self {
        Self { id, ..self }
    }

    fn unique_key(&self) -> Option<String> {
        Some(self.email.clone())
    }

    fn field(&self, column: &str) -> Option<FieldValue> {
        match column {
            "id" => Some(self.id.into()),
            "name" => Some(self.name.as_str().into()),
            "tax_id" => self.tax_id.as_deref().map(Into::into),
            "email" => Some(self.email.as_str().into()),
            "role" => Some(self.role.as_str().into()),
            "created_at" => Some(self.created_at.into()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parsing() {
        assert_eq!("Supervisor".parse::<OfficerRole>().unwrap(), OfficerRole::Supervisor);
        assert!("agente".parse::<OfficerRole>().is_err());
    }

    #[test]
    fn test_normalize_officer() {
        let officer = Officer {
            id: 0,
            name: " Carla Mendes ".to_string(),
            tax_id: Some("111.444.777-35".to_string()),
            email: " Carla@Transito.GOV.br ".to_string(),
            password_hash: "hash".to_string(),
            role: OfficerRole::Agent,
            created_at: Utc::now(),
        }
        .normalize()
        .unwrap();

        assert_eq!(officer.name, "Carla Mendes");
        assert_eq!(officer.tax_id.as_deref(), Some("11144477735"));
        assert_eq!(officer.email, "carla@transito.gov.br");
        assert_eq!(officer.clone().normalize().unwrap(), officer);
    }

    #[test]
    fn test_password_hash_is_not_serialized() {
        let officer = Officer {
            id: 1,
            name: "Carla".to_string(),
            tax_id: None,
            email: "carla@transito.gov.br".to_string(),
            password_hash: "$2b$12$secret".to_string(),
            role: OfficerRole::Agent,
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(&officer).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["role"], "agent");
    }
}
