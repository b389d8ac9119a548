//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum: un servicio por entidad más el
//! orquestador de intake, todos sobre el mismo backend de persistencia.

use std::sync::Arc;

use sqlx::PgPool;

use crate::models::{Driver, InfractionType, Officer, Ticket, Vehicle};
use crate::repositories::{MemoryDatabase, PgStore, SharedStore};
use crate::services::{
    DriverService, EntityResolver, InfractionTypeService, IntakeService, OfficerService, RecognitionSource,
    TicketService, VehicleService,
};

/// Un store por tipo de entidad
#[derive(Clone)]
pub struct Stores {
    pub vehicles: SharedStore<Vehicle>,
    pub drivers: SharedStore<Driver>,
    pub infraction_types: SharedStore<InfractionType>,
    pub officers: SharedStore<Officer>,
    pub tickets: SharedStore<Ticket>,
}

impl Stores {
    pub fn in_memory(db: &MemoryDatabase) -> Self {
        Self {
            vehicles: db.store(),
            drivers: db.store(),
            infraction_types: db.store(),
            officers: db.store(),
            tickets: db.store(),
        }
    }

    pub fn postgres(pool: PgPool) -> Self {
        Self {
            vehicles: Arc::new(PgStore::<Vehicle>::new(pool.clone())),
            drivers: Arc::new(PgStore::<Driver>::new(pool.clone())),
            infraction_types: Arc::new(PgStore::<InfractionType>::new(pool.clone())),
            officers: Arc::new(PgStore::<Officer>::new(pool.clone())),
            tickets: Arc::new(PgStore::<Ticket>::new(pool)),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub vehicles: VehicleService,
    pub drivers: DriverService,
    pub infraction_types: InfractionTypeService,
    pub officers: OfficerService,
    pub tickets: TicketService,
    pub intake: IntakeService,
}

impl AppState {
    pub fn new(stores: Stores, recognition: Arc<dyn RecognitionSource>) -> Self {
        let resolver = EntityResolver::new(
            stores.vehicles.clone(),
            stores.drivers.clone(),
            stores.infraction_types.clone(),
        );

        Self {
            vehicles: VehicleService::new(stores.vehicles.clone()),
            drivers: DriverService::new(stores.drivers.clone()),
            infraction_types: InfractionTypeService::new(stores.infraction_types.clone()),
            officers: OfficerService::new(stores.officers.clone()),
            tickets: TicketService::new(
                stores.tickets.clone(),
                stores.vehicles,
                stores.drivers,
                stores.infraction_types,
                stores.officers,
            ),
            intake: IntakeService::new(resolver, stores.tickets, recognition),
        }
    }

    /// Estado sobre una base en memoria nueva
    pub fn in_memory(recognition: Arc<dyn RecognitionSource>) -> Self {
        Self::new(Stores::in_memory(&MemoryDatabase::new()), recognition)
    }
}
