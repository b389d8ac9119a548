//! Servicio de agentes
//!
//! Email único en minúsculas; la contraseña solo se guarda como hash bcrypt.

use chrono::Utc;
use tracing::info;
use validator::Validate;

use crate::dto::officer_dto::{CreateOfficerRequest, UpdateOfficerRequest};
use crate::models::Officer;
use crate::repositories::SharedStore;
use crate::services::{delete_error, fetch};
use crate::utils::errors::{conflict_error, AppError, AppResult};
use crate::utils::normalization::Normalize;

#[derive(Clone)]
pub struct OfficerService {
    officers: SharedStore<Officer>,
    bcrypt_cost: u32,
}

impl OfficerService {
    pub fn new(officers: SharedStore<Officer>) -> Self {
        Self::with_cost(officers, bcrypt::DEFAULT_COST)
    }

    /// Coste bcrypt explícito (los tests usan el mínimo)
    pub fn with_cost(officers: SharedStore<Officer>, bcrypt_cost: u32) -> Self {
        Self { officers, bcrypt_cost }
    }

    fn hash_password(&self, password: &str) -> AppResult<String> {
        bcrypt::hash(password, self.bcrypt_cost)
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
    }

    pub async fn list(&self) -> AppResult<Vec<Officer>> {
        Ok(self.officers.list().await?)
    }

    pub async fn get(&self, id: i64) -> AppResult<Officer> {
        fetch(self.officers.as_ref(), id).await
    }

    pub async fn get_by_email(&self, email: &str) -> AppResult<Officer> {
        let key = email.trim().to_lowercase();
        self.officers
            .find_by_unique_key(&key)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Officer with email '{}' not found", key)))
    }

    pub async fn create(&self, request: CreateOfficerRequest) -> AppResult<Officer> {
        request.validate()?;
        let officer = Officer {
            id: 0,
            name: request.name,
            tax_id: request.tax_id,
            email: request.email,
            password_hash: self.hash_password(&request.password)?,
            role: request.role,
            created_at: Utc::now(),
        }
        .normalize()?;

        if self.officers.find_by_unique_key(&officer.email).await?.is_some() {
            return Err(conflict_error("Officer", "email", &officer.email));
        }

        let created = self.officers.insert(officer).await?;
        info!("👮 Agente {} creado con id {} ({})", created.email, created.id, created.role);
        Ok(created)
    }

    pub async fn update(&self, id: i64, request: UpdateOfficerRequest) -> AppResult<Officer> {
        request.validate()?;
        let current = self.get(id).await?;
        let previous_email = current.email.clone();

        let password_hash = match request.password.as_deref() {
            Some(password) => self.hash_password(password)?,
            None => current.password_hash,
        };
        let officer = Officer {
            id,
            name: request.name.unwrap_or(current.name),
            tax_id: request.tax_id.or(current.tax_id),
            email: request.email.unwrap_or(current.email),
            password_hash,
            role: request.role.unwrap_or(current.role),
            created_at: current.created_at,
        }
        .normalize()?;

        if officer.email != previous_email {
            if let Some(other) = self.officers.find_by_unique_key(&officer.email).await? {
                if other.id != id {
                    return Err(conflict_error("Officer", "email", &officer.email));
                }
            }
        }

        Ok(self.officers.update(officer).await?)
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        self.officers
            .delete(id)
            .await
            .map_err(|e| delete_error::<Officer>(id, e))?;
        info!("🗑️ Agente {} eliminado", id);
        Ok(())
    }
}
