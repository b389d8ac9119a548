use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use validator::Validate;

use crate::models::Ticket;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTicketRequest {
    #[validate(range(min = 1))]
    pub vehicle_id: i64,
    #[validate(range(min = 1))]
    pub officer_id: i64,
    #[validate(range(min = 1))]
    pub driver_id: Option<i64>,
    #[validate(range(min = 1))]
    pub infraction_type_id: i64,
    pub occurred_at: DateTime<Utc>,
    pub location: Option<String>,
    pub description: Option<String>,
}

impl From<CreateTicketRequest> for Ticket {
    fn from(request: CreateTicketRequest) -> Self {
        Ticket {
            id: 0,
            vehicle_id: request.vehicle_id,
            officer_id: request.officer_id,
            driver_id: request.driver_id,
            infraction_type_id: request.infraction_type_id,
            occurred_at: request.occurred_at,
            location: request.location,
            description: request.description,
        }
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateTicketRequest {
    #[validate(range(min = 1))]
    pub vehicle_id: Option<i64>,
    #[validate(range(min = 1))]
    pub officer_id: Option<i64>,
    /// Ausente: se mantiene; `null`: se desvincula el condutor
    #[serde(default, deserialize_with = "nullable")]
    #[validate(range(min = 1))]
    pub driver_id: Option<Option<i64>>,
    #[validate(range(min = 1))]
    pub infraction_type_id: Option<i64>,
    pub occurred_at: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub description: Option<String>,
}

impl UpdateTicketRequest {
    pub fn apply(self, current: Ticket) -> Ticket {
        Ticket {
            id: current.id,
            vehicle_id: self.vehicle_id.unwrap_or(current.vehicle_id),
            officer_id: self.officer_id.unwrap_or(current.officer_id),
            driver_id: self.driver_id.unwrap_or(current.driver_id),
            infraction_type_id: self.infraction_type_id.unwrap_or(current.infraction_type_id),
            occurred_at: self.occurred_at.unwrap_or(current.occurred_at),
            location: self.location.or(current.location),
            description: self.description.or(current.description),
        }
    }
}

// Distingue un campo presente con `null` de un campo ausente
fn nullable<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

// Rango inclusivo para listar multas por período
#[derive(Debug, Deserialize)]
pub struct PeriodQuery {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

// Intake desde una extracción JSON ya disponible
#[derive(Debug, Deserialize)]
pub struct IntakeRequest {
    pub officer_id: i64,
    pub payload: serde_json::Value,
}

// Intake desde una foto codificada en base64
#[derive(Debug, Deserialize)]
pub struct ImageIntakeRequest {
    pub officer_id: i64,
    pub image_base64: String,
}
