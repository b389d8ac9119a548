//! Servicio de multas
//!
//! Alta manual de multas (el intake automático vive en `intake_service`),
//! con verificación de que cada referencia exista y de la ventana de fecha.

use chrono::{DateTime, Utc};
use tracing::info;
use validator::Validate;

use crate::dto::ticket_dto::{CreateTicketRequest, UpdateTicketRequest};
use crate::models::ticket::check_occurred_at;
use crate::models::{Driver, InfractionType, Officer, Ticket, Vehicle};
use crate::repositories::{Entity, Filter, KeyedStore, SharedStore};
use crate::services::{delete_error, fetch};
use crate::utils::errors::{not_found_error, AppError, AppResult};
use crate::utils::normalization::{FieldNormalizer, Normalize};

#[derive(Clone)]
pub struct TicketService {
    tickets: SharedStore<Ticket>,
    vehicles: SharedStore<Vehicle>,
    drivers: SharedStore<Driver>,
    infraction_types: SharedStore<InfractionType>,
    officers: SharedStore<Officer>,
}

async fn ensure_exists<E: Entity>(store: &dyn KeyedStore<E>, id: i64) -> AppResult<()> {
    if store.exists(id).await? {
        Ok(())
    } else {
        Err(not_found_error(E::NAME, &id.to_string()))
    }
}

impl TicketService {
    pub fn new(
        tickets: SharedStore<Ticket>,
        vehicles: SharedStore<Vehicle>,
        drivers: SharedStore<Driver>,
        infraction_types: SharedStore<InfractionType>,
        officers: SharedStore<Officer>,
    ) -> Self {
        Self {
            tickets,
            vehicles,
            drivers,
            infraction_types,
            officers,
        }
    }

    /// Normalizar, validar la fecha y comprobar las referencias
    async fn prepare(&self, ticket: Ticket) -> AppResult<Ticket> {
        let ticket = ticket.normalize()?;

        let mut n = FieldNormalizer::new();
        check_occurred_at(&mut n, "occurred_at", ticket.occurred_at, Utc::now());
        n.finish()?;

        ensure_exists(self.vehicles.as_ref(), ticket.vehicle_id).await?;
        ensure_exists(self.officers.as_ref(), ticket.officer_id).await?;
        ensure_exists(self.infraction_types.as_ref(), ticket.infraction_type_id).await?;
        if let Some(driver_id) = ticket.driver_id {
            ensure_exists(self.drivers.as_ref(), driver_id).await?;
        }
        Ok(ticket)
    }

    pub async fn list(&self) -> AppResult<Vec<Ticket>> {
        Ok(self.tickets.list().await?)
    }

    pub async fn get(&self, id: i64) -> AppResult<Ticket> {
        fetch(self.tickets.as_ref(), id).await
    }

    pub async fn create(&self, request: CreateTicketRequest) -> AppResult<Ticket> {
        request.validate()?;
        let ticket = self.prepare(Ticket::from(request)).await?;
        let created = self.tickets.insert(ticket).await?;
        info!(
            "🧾 Multa {} creada para vehículo {} por agente {}",
            created.id, created.vehicle_id, created.officer_id
        );
        Ok(created)
    }

    pub async fn update(&self, id: i64, request: UpdateTicketRequest) -> AppResult<Ticket> {
        request.validate()?;
        let current = self.get(id).await?;
        let ticket = self.prepare(request.apply(current)).await?;
        Ok(self.tickets.update(ticket).await?)
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        self.tickets
            .delete(id)
            .await
            .map_err(|e| delete_error::<Ticket>(id, e))?;
        info!("🗑️ Multa {} eliminada", id);
        Ok(())
    }

    pub async fn list_by_vehicle(&self, vehicle_id: i64) -> AppResult<Vec<Ticket>> {
        Ok(self.tickets.find(Filter::eq("vehicle_id", vehicle_id)).await?)
    }

    pub async fn list_by_driver(&self, driver_id: i64) -> AppResult<Vec<Ticket>> {
        Ok(self.tickets.find(Filter::eq("driver_id", driver_id)).await?)
    }

    pub async fn list_by_officer(&self, officer_id: i64) -> AppResult<Vec<Ticket>> {
        Ok(self.tickets.find(Filter::eq("officer_id", officer_id)).await?)
    }

    pub async fn list_by_infraction_type(&self, infraction_type_id: i64) -> AppResult<Vec<Ticket>> {
        Ok(self
            .tickets
            .find(Filter::eq("infraction_type_id", infraction_type_id))
            .await?)
    }

    /// Multas en el rango inclusivo [from, to]
    pub async fn list_by_period(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> AppResult<Vec<Ticket>> {
        if from > to {
            return Err(AppError::BadRequest("Period start must not be after its end".to_string()));
        }
        Ok(self
            .tickets
            .find(Filter::Between("occurred_at", from.into(), to.into()))
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rust_decimal::Decimal;

    use crate::models::{OfficerRole, Severity};
    use crate::repositories::MemoryDatabase;

    struct Fixture {
        service: TicketService,
        vehicle: Vehicle,
        officer: Officer,
        infraction_type: InfractionType,
    }

    async fn fixture() -> Fixture {
        let db = MemoryDatabase::new();
        let vehicle = db
            .store::<Vehicle>()
            .insert(Vehicle {
                id: 0,
                plate: "ABC1234".to_string(),
                brand: None,
                model: None,
                category: None,
                owner_name: None,
            })
            .await
            .unwrap();
        let officer = db
            .store::<Officer>()
            .insert(Officer {
                id: 0,
                name: "Carla".to_string(),
                tax_id: None,
                email: "carla@transito.gov.br".to_string(),
                password_hash: "x".to_string(),
                role: OfficerRole::Agent,
                created_at: Utc::now(),
            })
            .await
            .unwrap();
        let infraction_type = db
            .store::<InfractionType>()
            .insert(InfractionType {
                id: 0,
                code: "501-1".to_string(),
                description: None,
                amount: Decimal::new(8_850, 2),
                severity: Severity::Light,
                penalty_points: 3,
            })
            .await
            .unwrap();

        Fixture {
            service: TicketService::new(db.store(), db.store(), db.store(), db.store(), db.store()),
            vehicle,
            officer,
            infraction_type,
        }
    }

    fn request(f: &Fixture, occurred_at: DateTime<Utc>) -> CreateTicketRequest {
        CreateTicketRequest {
            vehicle_id: f.vehicle.id,
            officer_id: f.officer.id,
            driver_id: None,
            infraction_type_id: f.infraction_type.id,
            occurred_at,
            location: Some(" Main St ".to_string()),
            description: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_filter() {
        let f = fixture().await;
        let when = Utc::now() - Duration::days(2);
        let ticket = f.service.create(request(&f, when)).await.unwrap();
        assert_eq!(ticket.location.as_deref(), Some("Main St"));

        assert_eq!(f.service.list_by_vehicle(f.vehicle.id).await.unwrap().len(), 1);
        assert_eq!(f.service.list_by_officer(f.officer.id).await.unwrap().len(), 1);
        assert!(f.service.list_by_driver(99).await.unwrap().is_empty());

        let period = f.service.list_by_period(when, when).await.unwrap();
        assert_eq!(period.len(), 1);
        assert!(f
            .service
            .list_by_period(when + Duration::seconds(1), Utc::now())
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_missing_reference_is_not_found() {
        let f = fixture().await;
        let err = f
            .service
            .create(CreateTicketRequest {
                driver_id: Some(404),
                ..request(&f, Utc::now() - Duration::hours(1))
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_timestamp_window() {
        let f = fixture().await;
        let future = f.service.create(request(&f, Utc::now() + Duration::days(1))).await;
        assert_eq!(future.unwrap_err().violated_fields(), vec!["occurred_at"]);

        let ancient = f
            .service
            .create(request(&f, Utc::now() - Duration::days(365 * 11)))
            .await;
        assert_eq!(ancient.unwrap_err().violated_fields(), vec!["occurred_at"]);
    }

    #[tokio::test]
    async fn test_referenced_records_cannot_be_deleted() {
        let f = fixture().await;
        let ticket = f
            .service
            .create(request(&f, Utc::now() - Duration::hours(3)))
            .await
            .unwrap();
        let vehicles = crate::services::VehicleService::new(f.service.vehicles.clone());
        assert!(matches!(vehicles.delete(f.vehicle.id).await, Err(AppError::Conflict(_))));

        f.service.delete(ticket.id).await.unwrap();
        vehicles.delete(f.vehicle.id).await.unwrap();
    }

    #[tokio::test]
    async fn test_inverted_period_is_bad_request() {
        let f = fixture().await;
        let now = Utc::now();
        assert!(matches!(
            f.service.list_by_period(now, now - Duration::days(1)).await,
            Err(AppError::BadRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_update_can_unlink_driver() {
        let f = fixture().await;
        let driver = f
            .service
            .drivers
            .insert(Driver {
                id: 0,
                tax_id: "11144477735".to_string(),
                license_number: None,
                license_category: None,
                region: None,
                full_name: "Jane Doe".to_string(),
            })
            .await
            .unwrap();
        let ticket = f
            .service
            .create(CreateTicketRequest {
                driver_id: Some(driver.id),
                ..request(&f, Utc::now() - Duration::hours(1))
            })
            .await
            .unwrap();

        let kept = f
            .service
            .update(ticket.id, UpdateTicketRequest::default())
            .await
            .unwrap();
        assert_eq!(kept.driver_id, Some(driver.id));

        let unlinked = f
            .service
            .update(
                ticket.id,
                UpdateTicketRequest {
                    driver_id: Some(None),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(unlinked.driver_id, None);
    }
}
