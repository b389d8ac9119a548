//! Services module
//!
//! Este módulo contiene la lógica de negocio de la aplicación: CRUD por
//! entidad, resolución de entidades y el orquestador de intake de multas.

pub mod driver_service;
pub mod infraction_type_service;
pub mod intake_service;
pub mod officer_service;
pub mod recognition;
pub mod resolver;
pub mod ticket_service;
pub mod vehicle_service;

pub use driver_service::DriverService;
pub use infraction_type_service::InfractionTypeService;
pub use intake_service::IntakeService;
pub use officer_service::OfficerService;
pub use recognition::{HttpRecognitionSource, RecognitionSource, SampleRecognitionSource};
pub use resolver::EntityResolver;
pub use ticket_service::TicketService;
pub use vehicle_service::VehicleService;

use crate::repositories::{Entity, KeyedStore, StoreError};
use crate::utils::errors::{not_found_error, AppError, AppResult};

/// Cargar un registro por id o fallar con NotFound
pub(crate) async fn fetch<E: Entity>(store: &dyn KeyedStore<E>, id: i64) -> AppResult<E> {
    store
        .get_by_id(id)
        .await?
        .ok_or_else(|| not_found_error(E::NAME, &id.to_string()))
}

/// Error de borrado: un registro referenciado por multas es un conflicto
pub(crate) fn delete_error<E: Entity>(id: i64, err: StoreError) -> AppError {
    match err {
        StoreError::ReferentialIntegrity { .. } => {
            AppError::Conflict(format!("{} {} is still referenced by tickets", E::NAME, id))
        }
        other => other.into(),
    }
}
