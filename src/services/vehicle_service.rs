//! Servicio de vehículos
//!
//! CRUD con placa única y búsquedas por placa y propietario.

use tracing::info;
use validator::Validate;

use crate::dto::vehicle_dto::{CreateVehicleRequest, UpdateVehicleRequest};
use crate::models::Vehicle;
use crate::repositories::{Filter, SharedStore};
use crate::services::{delete_error, fetch};
use crate::utils::errors::{conflict_error, AppError, AppResult};
use crate::utils::normalization::Normalize;
use crate::utils::validation::canonical_plate;

#[derive(Clone)]
pub struct VehicleService {
    vehicles: SharedStore<Vehicle>,
}

impl VehicleService {
    pub fn new(vehicles: SharedStore<Vehicle>) -> Self {
        Self { vehicles }
    }

    pub async fn list(&self) -> AppResult<Vec<Vehicle>> {
        Ok(self.vehicles.list().await?)
    }

    pub async fn get(&self, id: i64) -> AppResult<Vehicle> {
        fetch(self.vehicles.as_ref(), id).await
    }

    pub async fn get_by_plate(&self, plate: &str) -> AppResult<Vehicle> {
        let key = canonical_plate(plate.trim());
        self.vehicles
            .find_by_unique_key(&key)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Vehicle with plate '{}' not found", key)))
    }

    pub async fn list_by_owner(&self, owner: &str) -> AppResult<Vec<Vehicle>> {
        let owner = owner.trim();
        if owner.is_empty() {
            return Err(AppError::BadRequest("Owner name cannot be empty".to_string()));
        }
        Ok(self.vehicles.find(Filter::Contains("owner_name", owner.to_string())).await?)
    }

    /// Búsqueda parcial por placa (para usuarios, nunca para resolución)
    pub async fn search_by_plate(&self, fragment: &str) -> AppResult<Vec<Vehicle>> {
        let fragment = canonical_plate(fragment.trim());
        if fragment.is_empty() {
            return Err(AppError::BadRequest("Plate fragment cannot be empty".to_string()));
        }
        Ok(self.vehicles.find(Filter::Contains("plate", fragment)).await?)
    }

    pub async fn create(&self, request: CreateVehicleRequest) -> AppResult<Vehicle> {
        request.validate()?;
        let vehicle = Vehicle::from(request).normalize()?;

        if self.vehicles.find_by_unique_key(&vehicle.plate).await?.is_some() {
            return Err(conflict_error("Vehicle", "plate", &vehicle.plate));
        }

        let created = self.vehicles.insert(vehicle).await?;
        info!("🚗 Vehículo {} creado con id {}", created.plate, created.id);
        Ok(created)
    }

    pub async fn update(&self, id: i64, request: UpdateVehicleRequest) -> AppResult<Vehicle> {
        request.validate()?;
        let current = self.get(id).await?;
        let previous_plate = current.plate.clone();
        let vehicle = request.apply(current).normalize()?;

        if vehicle.plate != previous_plate {
            if let Some(other) = self.vehicles.find_by_unique_key(&vehicle.plate).await? {
                if other.id != id {
                    return Err(conflict_error("Vehicle", "plate", &vehicle.plate));
                }
            }
        }

        let updated = self.vehicles.update(vehicle).await?;
        info!("🚗 Vehículo {} actualizado", updated.id);
        Ok(updated)
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        self.vehicles
            .delete(id)
            .await
            .map_err(|e| delete_error::<Vehicle>(id, e))?;
        info!("🗑️ Vehículo {} eliminado", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::MemoryDatabase;

    fn request(plate: &str) -> CreateVehicleRequest {
        CreateVehicleRequest {
            plate: plate.to_string(),
            brand: Some("Toyota".to_string()),
            model: Some("Corolla".to_string()),
            category: None,
            owner_name: Some("Maria Silva Santos".to_string()),
        }
    }

    fn service() -> VehicleService {
        VehicleService::new(MemoryDatabase::new().store())
    }

    #[tokio::test]
    async fn test_create_and_lookup() {
        let service = service();
        let created = service.create(request("abc1d23")).await.unwrap();
        assert_eq!(created.plate, "ABC1D23");

        assert_eq!(service.get_by_plate("abc1d23").await.unwrap().id, created.id);
        assert_eq!(service.list_by_owner("silva").await.unwrap().len(), 1);
        assert_eq!(service.search_by_plate("1d2").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_plate_is_conflict() {
        let service = service();
        service.create(request("ABC1234")).await.unwrap();
        assert!(matches!(
            service.create(request("abc1234")).await,
            Err(AppError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_invalid_plate_is_rejected() {
        let err = service().create(request("AB12345")).await.unwrap_err();
        assert_eq!(err.violated_fields(), vec!["plate"]);
    }

    #[tokio::test]
    async fn test_update_keeps_plate_unique() {
        let service = service();
        let first = service.create(request("ABC1234")).await.unwrap();
        service.create(request("XYZ9876")).await.unwrap();

        let same_plate = UpdateVehicleRequest {
            plate: Some("abc1234".to_string()),
            brand: Some("Fiat".to_string()),
            ..Default::default()
        };
        let updated = service.update(first.id, same_plate).await.unwrap();
        assert_eq!(updated.brand.as_deref(), Some("Fiat"));

        let taken = UpdateVehicleRequest {
            plate: Some("XYZ9876".to_string()),
            ..Default::default()
        };
        assert!(matches!(service.update(first.id, taken).await, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_missing_vehicle() {
        let service = service();
        assert!(matches!(service.get(42).await, Err(AppError::NotFound(_))));
        assert!(matches!(service.delete(42).await, Err(AppError::NotFound(_))));
    }
}
