//! Servicio de condutores

use tracing::info;
use validator::Validate;

use crate::dto::driver_dto::{CreateDriverRequest, UpdateDriverRequest};
use crate::models::Driver;
use crate::repositories::{Filter, SharedStore};
use crate::services::{delete_error, fetch};
use crate::utils::errors::{conflict_error, AppError, AppResult};
use crate::utils::normalization::Normalize;
use crate::utils::validation::canonical_tax_id;

#[derive(Clone)]
pub struct DriverService {
    drivers: SharedStore<Driver>,
}

impl DriverService {
    pub fn new(drivers: SharedStore<Driver>) -> Self {
        Self { drivers }
    }

    pub async fn list(&self) -> AppResult<Vec<Driver>> {
        Ok(self.drivers.list().await?)
    }

    pub async fn get(&self, id: i64) -> AppResult<Driver> {
        fetch(self.drivers.as_ref(), id).await
    }

    /// Acepta el CPF con o sin máscara
    pub async fn get_by_tax_id(&self, tax_id: &str) -> AppResult<Driver> {
        let key = canonical_tax_id(tax_id);
        self.drivers
            .find_by_unique_key(&key)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Driver with tax id '{}' not found", key)))
    }

    pub async fn get_by_license_number(&self, license_number: &str) -> AppResult<Driver> {
        let wanted = license_number.trim();
        self.drivers
            .find(Filter::eq("license_number", wanted))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound(format!("Driver with license number '{}' not found", wanted)))
    }

    pub async fn create(&self, request: CreateDriverRequest) -> AppResult<Driver> {
        request.validate()?;
        let driver = Driver::from(request).normalize()?;

        if self.drivers.find_by_unique_key(&driver.tax_id).await?.is_some() {
            return Err(conflict_error("Driver", "tax id", &driver.tax_id));
        }

        let created = self.drivers.insert(driver).await?;
        info!("🪪 Condutor {} creado con id {}", created.full_name, created.id);
        Ok(created)
    }

    pub async fn update(&self, id: i64, request: UpdateDriverRequest) -> AppResult<Driver> {
        request.validate()?;
        let current = self.get(id).await?;
        let previous_tax_id = current.tax_id.clone();
        let driver = request.apply(current).normalize()?;

        if driver.tax_id != previous_tax_id {
            if let Some(other) = self.drivers.find_by_unique_key(&driver.tax_id).await? {
                if other.id != id {
                    return Err(conflict_error("Driver", "tax id", &driver.tax_id));
                }
            }
        }

        Ok(self.drivers.update(driver).await?)
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        self.drivers
            .delete(id)
            .await
            .map_err(|e| delete_error::<Driver>(id, e))?;
        info!("🗑️ Condutor {} eliminado", id);
        Ok(())
    }
}
