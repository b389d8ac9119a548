//! Modelo de Ticket (multa)
//!
//! Una multa referencia un vehículo, un agente, un tipo de infracción y
//! opcionalmente un condutor. Las referencias deben existir al crearla.

use chrono::{DateTime, Months, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::repositories::{Entity, FieldValue};
use crate::utils::errors::AppResult;
use crate::utils::normalization::{Case, FieldNormalizer, Normalize};

pub const LOCATION_MAX_LEN: usize = 255;
pub const DESCRIPTION_MAX_LEN: usize = 255;
/// Antigüedad máxima de una multa
pub const MAX_AGE_YEARS: u32 = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Ticket {
    pub id: i64,
    pub vehicle_id: i64,
    pub officer_id: i64,
    pub driver_id: Option<i64>,
    pub infraction_type_id: i64,
    pub occurred_at: DateTime<Utc>,
    pub location: Option<String>,
    pub description: Option<String>,
}

/// Fecha más antigua aceptada para una multa registrada en `now`
pub fn oldest_allowed(now: DateTime<Utc>) -> DateTime<Utc> {
    now.checked_sub_months(Months::new(MAX_AGE_YEARS * 12))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Verificar la ventana [now - 10 años, now] de la fecha de la multa
pub fn check_occurred_at(
    n: &mut FieldNormalizer,
    field: &'static str,
    occurred_at: DateTime<Utc>,
    now: DateTime<Utc>,
) {
    if occurred_at > now {
        n.reject(field, "future", "Timestamp cannot be in the future");
    } else if occurred_at < oldest_allowed(now) {
        n.reject(field, "too_old", "Timestamp cannot be older than 10 years");
    }
}

impl Normalize for Ticket {
    fn normalize(self) -> AppResult<Self> {
        let mut n = FieldNormalizer::new();
        if self.vehicle_id <= 0 {
            n.reject("vehicle_id", "required", "Vehicle id is required");
        }
        if self.officer_id <= 0 {
            n.reject("officer_id", "required", "Officer id is required");
        }
        if self.infraction_type_id <= 0 {
            n.reject("infraction_type_id", "required", "Infraction type id is required");
        }
        if matches!(self.driver_id, Some(id) if id <= 0) {
            n.reject("driver_id", "invalid", "Driver id must be positive");
        }
        let location = n.optional("location", self.location.as_deref(), LOCATION_MAX_LEN, Case::Keep);
        let description = n.optional("description", self.description.as_deref(), DESCRIPTION_MAX_LEN, Case::Keep);
        n.finish()?;

        Ok(Self {
            location,
            description,
            ..self
        })
    }
}

impl Entity for Ticket {
    const NAME: &'static str = "ticket";

    fn id(&self) -> i64 {
        self.id
    }

    fn with_id(self, id: i64) -> Self {
        Self { id, ..self }
    }

    fn field(&self, column: &str) -> Option<FieldValue> {
        match column {
            "id" => Some(self.id.into()),
            "vehicle_id" => Some(self.vehicle_id.into()),
            "officer_id" => Some(self.officer_id.into()),
            "driver_id" => self.driver_id.map(Into::into),
            "infraction_type_id" => Some(self.infraction_type_id.into()),
            "occurred_at" => Some(self.occurred_at.into()),
            "location" => self.location.as_deref().map(Into::into),
            "description" => self.description.as_deref().map(Into::into),
            _ => None,
        }
    }
}
