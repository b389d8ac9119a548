//! Servicio de tipos de infracción
//!
//! Los tipos son datos maestros con precio: el intake nunca los crea, solo
//! los busca por código.

use tracing::info;
use validator::Validate;

use crate::dto::infraction_type_dto::{CreateInfractionTypeRequest, UpdateInfractionTypeRequest};
use crate::models::{InfractionType, Severity};
use crate::repositories::{Filter, SharedStore};
use crate::services::{delete_error, fetch};
use crate::utils::errors::{conflict_error, AppError, AppResult};
use crate::utils::normalization::Normalize;

#[derive(Clone)]
pub struct InfractionTypeService {
    infraction_types: SharedStore<InfractionType>,
}

impl InfractionTypeService {
    pub fn new(infraction_types: SharedStore<InfractionType>) -> Self {
        Self { infraction_types }
    }

    pub async fn list(&self) -> AppResult<Vec<InfractionType>> {
        Ok(self.infraction_types.list().await?)
    }

    pub async fn get(&self, id: i64) -> AppResult<InfractionType> {
        fetch(self.infraction_types.as_ref(), id).await
    }

    pub async fn get_by_code(&self, code: &str) -> AppResult<InfractionType> {
        let key = code.trim().to_uppercase();
        self.infraction_types
            .find_by_unique_key(&key)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Infraction type with code '{}' not found", key)))
    }

    pub async fn list_by_severity(&self, severity: &str) -> AppResult<Vec<InfractionType>> {
        let severity: Severity = severity.parse().map_err(AppError::BadRequest)?;
        Ok(self
            .infraction_types
            .find(Filter::eq("severity", severity.as_str()))
            .await?)
    }

    pub async fn create(&self, request: CreateInfractionTypeRequest) -> AppResult<InfractionType> {
        request.validate()?;
        let infraction_type = InfractionType::from(request).normalize()?;

        if self
            .infraction_types
            .find_by_unique_key(&infraction_type.code)
            .await?
            .is_some()
        {
            return Err(conflict_error("Infraction type", "code", &infraction_type.code));
        }

        let created = self.infraction_types.insert(infraction_type).await?;
        info!("📋 Tipo de infracción {} creado ({} {})", created.code, created.amount, created.severity);
        Ok(created)
    }

    pub async fn update(&self, id: i64, request: UpdateInfractionTypeRequest) -> AppResult<InfractionType> {
        request.validate()?;
        let current = self.get(id).await?;
        let previous_code = current.code.clone();
        let infraction_type = request.apply(current).normalize()?;

        if infraction_type.code != previous_code {
            if let Some(other) = self.infraction_types.find_by_unique_key(&infraction_type.code).await? {
                if other.id != id {
                    return Err(conflict_error("Infraction type", "code", &infraction_type.code));
                }
            }
        }

        Ok(self.infraction_types.update(infraction_type).await?)
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        self.infraction_types
            .delete(id)
            .await
            .map_err(|e| delete_error::<InfractionType>(id, e))?;
        info!("🗑️ Tipo de infracción {} eliminado", id);
        Ok(())
    }
}
