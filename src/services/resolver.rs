//! Resolución de entidades referenciadas por una multa
//!
//! Find-or-create para vehículos (por placa) y condutores (por CPF), y
//! búsqueda exacta para tipos de infracción (por código). Siempre se pasa por
//! el store: es el único árbitro de la unicidad, así que una violación de
//! unicidad al insertar se resuelve releyendo el registro ganador.

use tracing::{debug, info, warn};

use crate::models::{Driver, InfractionType, Vehicle};
use crate::repositories::{Entity, KeyedStore, SharedStore, StoreError};
use crate::utils::errors::{validation_error, AppError, AppResult};
use crate::utils::normalization::Normalize;
use crate::utils::validation::{canonical_plate, canonical_tax_id, validate_plate, validate_tax_id};

/// Datos de respaldo para crear un vehículo que todavía no existe
#[derive(Debug, Clone, Default)]
pub struct VehicleFields {
    pub brand: Option<String>,
    pub model: Option<String>,
    pub category: Option<String>,
    pub owner_name: Option<String>,
}

/// Datos de respaldo para crear un condutor que todavía no existe
#[derive(Debug, Clone, Default)]
pub struct DriverFields {
    pub full_name: Option<String>,
    pub license_number: Option<String>,
    pub license_category: Option<String>,
    pub region: Option<String>,
}

/// Buscar por clave única y crear solo si no existe.
///
/// `candidate` solo se evalúa en caso de miss; sus errores de validación se
/// propagan sin tocar el store.
pub async fn find_or_create<E, F>(store: &dyn KeyedStore<E>, key: &str, candidate: F) -> AppResult<E>
where
    E: Entity,
    F: FnOnce() -> AppResult<E>,
{
    if let Some(existing) = store.find_by_unique_key(key).await? {
        debug!("🔍 {} '{}' ya existe (id {})", E::NAME, key, existing.id());
        return Ok(existing);
    }

    let record = candidate()?;
    match store.insert(record).await {
        Ok(created) => {
            info!("✅ {} '{}' creado con id {}", E::NAME, key, created.id());
            Ok(created)
        }
        Err(StoreError::Duplicate { .. }) => {
            warn!("⚠️ Carrera de unicidad para {} '{}', releyendo", E::NAME, key);
            store.find_by_unique_key(key).await?.ok_or_else(|| {
                AppError::Conflict(format!("{} '{}' conflicts with a concurrent write", E::NAME, key))
            })
        }
        Err(e) => Err(e.into()),
    }
}

#[derive(Clone)]
pub struct EntityResolver {
    vehicles: SharedStore<Vehicle>,
    drivers: SharedStore<Driver>,
    infraction_types: SharedStore<InfractionType>,
}

impl EntityResolver {
    pub fn new(
        vehicles: SharedStore<Vehicle>,
        drivers: SharedStore<Driver>,
        infraction_types: SharedStore<InfractionType>,
    ) -> Self {
        Self {
            vehicles,
            drivers,
            infraction_types,
        }
    }

    /// Vehículo por placa; si no existe se valida la placa y se crea
    pub async fn resolve_vehicle_by_plate(&self, plate: &str, fallback: VehicleFields) -> AppResult<Vehicle> {
        let key = canonical_plate(plate.trim());
        find_or_create(self.vehicles.as_ref(), &key, || {
            if !validate_plate(&key) {
                return Err(validation_error("plate", "Invalid plate format"));
            }
            Vehicle {
                id: 0,
                plate: key.clone(),
                brand: fallback.brand,
                model: fallback.model,
                category: fallback.category,
                owner_name: fallback.owner_name,
            }
            .normalize()
        })
        .await
    }

    /// Condutor por CPF; si no existe se valida el dígito verificador y se crea
    pub async fn resolve_driver_by_tax_id(&self, tax_id: &str, fallback: DriverFields) -> AppResult<Driver> {
        let key = canonical_tax_id(tax_id);
        find_or_create(self.drivers.as_ref(), &key, || {
            if !validate_tax_id(&key) {
                return Err(validation_error("tax_id", "Invalid tax identifier"));
            }
            Driver {
                id: 0,
                tax_id: key.clone(),
                license_number: fallback.license_number,
                license_category: fallback.license_category,
                region: fallback.region,
                full_name: fallback.full_name.unwrap_or_default(),
            }
            .normalize()
        })
        .await
    }

    /// Tipo de infracción por código exacto; nunca se crea
    pub async fn resolve_infraction_type_by_code(&self, code: &str) -> AppResult<InfractionType> {
        let key = code.trim().to_uppercase();
        self.infraction_types
            .find_by_unique_key(&key)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Infraction type with code '{}' not found", key)))
    }
}
