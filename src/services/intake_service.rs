//! Orquestador de intake de multas
//!
//! Convierte una extracción (payload JSON o imagen vía la fuente de
//! reconocimiento) en una multa persistida:
//! parseo → validación completa → vehículo → condutor → tipo de infracción → multa.
//!
//! La validación recorre todos los campos antes de fallar. Vehículos y
//! condutores creados en el camino quedan aunque el intake falle después.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::models::driver::{FULL_NAME_MAX_LEN, LICENSE_CATEGORY_MAX_LEN, LICENSE_NUMBER_MAX_LEN, REGION_MAX_LEN};
use crate::models::ticket::{check_occurred_at, DESCRIPTION_MAX_LEN, LOCATION_MAX_LEN};
use crate::models::vehicle::{BRAND_MAX_LEN, CATEGORY_MAX_LEN, MODEL_MAX_LEN, OWNER_MAX_LEN};
use crate::models::Ticket;
use crate::repositories::{SharedStore, StoreError};
use crate::services::recognition::RecognitionSource;
use crate::services::resolver::{DriverFields, EntityResolver, VehicleFields};
use crate::utils::errors::{AppError, AppResult};
use crate::utils::normalization::{Case, FieldNormalizer, Normalize};
use crate::utils::validation::{validate_datetime, validate_plate, validate_tax_id};

/// Extracción estructurada; `None` significa campo ausente
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionPayload {
    pub plate: Option<String>,
    pub driver_name: Option<String>,
    pub driver_tax_id: Option<String>,
    pub driver_license_number: Option<String>,
    pub license_category: Option<String>,
    pub license_region: Option<String>,
    pub timestamp: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub infraction_code: Option<String>,
    pub vehicle_brand: Option<String>,
    pub vehicle_model: Option<String>,
    pub vehicle_category: Option<String>,
    pub owner_name: Option<String>,
}

impl ExtractionPayload {
    pub fn vehicle_fields(&self) -> VehicleFields {
        VehicleFields {
            brand: self.vehicle_brand.clone(),
            model: self.vehicle_model.clone(),
            category: self.vehicle_category.clone(),
            owner_name: self.owner_name.clone(),
        }
    }

    pub fn driver_fields(&self) -> DriverFields {
        DriverFields {
            full_name: self.driver_name.clone(),
            license_number: self.driver_license_number.clone(),
            license_category: self.license_category.clone(),
            region: self.license_region.clone(),
        }
    }
}

/// Campos obligatorios ya validados
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedIntake {
    pub plate: String,
    pub tax_id: String,
    pub driver_name: String,
    pub infraction_code: String,
    pub occurred_at: DateTime<Utc>,
    pub location: String,
    pub description: String,
}

/// Parsear el texto crudo de la fuente de reconocimiento
pub fn parse_payload(raw: &str) -> AppResult<ExtractionPayload> {
    let value: Value = serde_json::from_str(raw)
        .map_err(|e| AppError::Parse(format!("Payload is not valid JSON: {}", e)))?;
    parse_value(value)
}

/// Parsear un payload ya decodificado como JSON
pub fn parse_value(value: Value) -> AppResult<ExtractionPayload> {
    if !value.is_object() {
        return Err(AppError::Parse("Payload must be a JSON object".to_string()));
    }
    serde_json::from_value(value).map_err(|e| AppError::Parse(format!("Malformed payload: {}", e)))
}

fn present<'a>(n: &mut FieldNormalizer, field: &'static str, value: &'a Option<String>) -> Option<&'a str> {
    match value.as_deref().map(str::trim) {
        None => {
            n.reject(field, "required", format!("{} is required", field));
            None
        }
        Some("") => {
            n.reject(field, "blank", format!("{} cannot be blank", field));
            None
        }
        Some(v) => Some(v),
    }
}

fn bounded<'a>(n: &mut FieldNormalizer, field: &'static str, value: &'a Option<String>, max: usize) -> Option<&'a str> {
    let v = present(n, field, value)?;
    let len = v.chars().count();
    if len > max {
        n.reject(field, "length", format!("{} cannot exceed {} characters (got {})", field, max, len));
        return None;
    }
    Some(v)
}

/// Validar presencia y forma de todos los campos, acumulando cada violación
pub fn validate_payload(payload: &ExtractionPayload, now: DateTime<Utc>) -> AppResult<ValidatedIntake> {
    let mut n = FieldNormalizer::new();

    let plate = present(&mut n, "plate", &payload.plate).filter(|p| {
        let ok = validate_plate(p);
        if !ok {
            n.reject("plate", "format", "Invalid plate format");
        }
        ok
    });
    let tax_id = present(&mut n, "driverTaxId", &payload.driver_tax_id).filter(|t| {
        let ok = validate_tax_id(t);
        if !ok {
            n.reject("driverTaxId", "checksum", "Invalid tax identifier");
        }
        ok
    });
    let driver_name = bounded(&mut n, "driverName", &payload.driver_name, FULL_NAME_MAX_LEN);
    let infraction_code = present(&mut n, "infractionCode", &payload.infraction_code);

    let occurred_at = match present(&mut n, "timestamp", &payload.timestamp) {
        Some(raw) => match validate_datetime(raw) {
            Ok(ts) => {
                check_occurred_at(&mut n, "timestamp", ts, now);
                Some(ts)
            }
            Err(_) => {
                n.reject("timestamp", "format", "Timestamp must be an ISO 8601 date-time");
                None
            }
        },
        None => None,
    };

    let location = bounded(&mut n, "location", &payload.location, LOCATION_MAX_LEN);
    let description = bounded(&mut n, "description", &payload.description, DESCRIPTION_MAX_LEN);

    // datos de respaldo para vehículo y condutor: mismos límites que al persistir
    n.optional("vehicleBrand", payload.vehicle_brand.as_deref(), BRAND_MAX_LEN, Case::Keep);
    n.optional("vehicleModel", payload.vehicle_model.as_deref(), MODEL_MAX_LEN, Case::Keep);
    n.optional("vehicleCategory", payload.vehicle_category.as_deref(), CATEGORY_MAX_LEN, Case::Keep);
    n.optional("ownerName", payload.owner_name.as_deref(), OWNER_MAX_LEN, Case::Keep);
    n.optional(
        "driverLicenseNumber",
        payload.driver_license_number.as_deref(),
        LICENSE_NUMBER_MAX_LEN,
        Case::Keep,
    );
    n.optional(
        "licenseCategory",
        payload.license_category.as_deref(),
        LICENSE_CATEGORY_MAX_LEN,
        Case::Upper,
    );
    n.optional("licenseRegion", payload.license_region.as_deref(), REGION_MAX_LEN, Case::Upper);

    if let Err(err) = n.finish() {
        warn!("⚠️ Payload de intake rechazado: {:?}", err.violated_fields());
        return Err(err);
    }

    let (
        Some(plate),
        Some(tax_id),
        Some(driver_name),
        Some(infraction_code),
        Some(occurred_at),
        Some(location),
        Some(description),
    ) = (plate, tax_id, driver_name, infraction_code, occurred_at, location, description)
    else {
        return Err(AppError::Internal("Validated payload is missing a field".to_string()));
    };

    Ok(ValidatedIntake {
        plate: plate.to_string(),
        tax_id: tax_id.to_string(),
        driver_name: driver_name.to_string(),
        infraction_code: infraction_code.to_string(),
        occurred_at,
        location: location.to_string(),
        description: description.to_string(),
    })
}

#[derive(Clone)]
pub struct IntakeService {
    resolver: EntityResolver,
    tickets: SharedStore<Ticket>,
    recognition: Arc<dyn RecognitionSource>,
}

impl IntakeService {
    pub fn new(
        resolver: EntityResolver,
        tickets: SharedStore<Ticket>,
        recognition: Arc<dyn RecognitionSource>,
    ) -> Self {
        Self {
            resolver,
            tickets,
            recognition,
        }
    }

    /// Intake desde una imagen: una sola llamada a la fuente de reconocimiento
    pub async fn process_image(&self, image: &[u8], officer_id: i64) -> AppResult<Ticket> {
        let raw = self.recognition.extract(image).await?;
        self.process_payload(&raw, officer_id).await
    }

    /// Intake desde el texto crudo de una extracción
    pub async fn process_payload(&self, raw: &str, officer_id: i64) -> AppResult<Ticket> {
        let payload = parse_payload(raw)?;
        self.process(payload, officer_id).await
    }

    /// Intake desde un valor JSON ya decodificado
    pub async fn process_value(&self, value: Value, officer_id: i64) -> AppResult<Ticket> {
        let payload = parse_value(value)?;
        self.process(payload, officer_id).await
    }

    pub async fn process(&self, payload: ExtractionPayload, officer_id: i64) -> AppResult<Ticket> {
        let intake = validate_payload(&payload, Utc::now())?;
        info!(
            "📥 Intake de multa: placa {}, código {}, agente {}",
            intake.plate, intake.infraction_code, officer_id
        );

        let vehicle = self
            .resolver
            .resolve_vehicle_by_plate(&intake.plate, payload.vehicle_fields())
            .await?;
        let driver = self
            .resolver
            .resolve_driver_by_tax_id(&intake.tax_id, payload.driver_fields())
            .await?;
        let infraction_type = self
            .resolver
            .resolve_infraction_type_by_code(&intake.infraction_code)
            .await?;

        let ticket = Ticket {
            id: 0,
            vehicle_id: vehicle.id,
            officer_id,
            driver_id: Some(driver.id),
            infraction_type_id: infraction_type.id,
            occurred_at: intake.occurred_at,
            location: Some(intake.location),
            description: Some(intake.description),
        }
        .normalize()?;

        match self.tickets.insert(ticket).await {
            Ok(created) => {
                info!(
                    "✅ Multa {} creada (vehículo {}, condutor {}, tipo {})",
                    created.id, vehicle.id, driver.id, infraction_type.code
                );
                Ok(created)
            }
            Err(err @ (StoreError::Duplicate { .. } | StoreError::ReferentialIntegrity { .. })) => {
                warn!("⚠️ La multa no pudo persistirse: {}", err);
                Err(AppError::Conflict(err.to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }
}
