//! Capa de persistencia
//!
//! Un único contrato de almacenamiento con clave (`KeyedStore`) parametrizado
//! por tipo de entidad, con dos backends: memoria (desarrollo y tests) y
//! PostgreSQL. El store es el único árbitro de la unicidad de placas, CPF,
//! códigos de infracción y emails.

pub mod memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

pub use memory::MemoryDatabase;
pub use postgres::PgStore;

/// Errores de la capa de persistencia
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{entity} with key '{key}' already exists")]
    Duplicate { entity: &'static str, key: String },

    #[error("referential integrity violated for {entity} {id}")]
    ReferentialIntegrity { entity: &'static str, id: i64 },

    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("store backend error: {0}")]
    Backend(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Valor de un campo para búsquedas por igualdad o rango
#[derive(Debug, Clone, PartialEq, PartialOrd)]
pub enum FieldValue {
    Text(String),
    Int(i64),
    Timestamp(DateTime<Utc>),
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Int(value)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(value: DateTime<Utc>) -> Self {
        FieldValue::Timestamp(value)
    }
}

/// Filtro de búsqueda sobre una columna
#[derive(Debug, Clone)]
pub enum Filter {
    /// Igualdad exacta
    Eq(&'static str, FieldValue),
    /// Subcadena sin distinguir mayúsculas (solo para búsquedas de usuario)
    Contains(&'static str, String),
    /// Rango inclusivo
    Between(&'static str, FieldValue, FieldValue),
}

impl Filter {
    pub fn eq(column: &'static str, value: impl Into<FieldValue>) -> Self {
        Filter::Eq(column, value.into())
    }

    pub fn column(&self) -> &'static str {
        match self {
            Filter::Eq(column, _) | Filter::Contains(column, _) | Filter::Between(column, _, _) => column,
        }
    }

    /// Evaluar el filtro sobre un registro ya cargado
    pub fn matches<E: Entity>(&self, record: &E) -> bool {
        match self {
            Filter::Eq(column, expected) => record.field(column).as_ref() == Some(expected),
            Filter::Contains(column, needle) => match record.field(column) {
                Some(FieldValue::Text(text)) => text.to_uppercase().contains(&needle.to_uppercase()),
                _ => false,
            },
            Filter::Between(column, from, to) => record
                .field(column)
                .map_or(false, |value| &value >= from && &value <= to),
        }
    }
}

/// Registro persistible con id asignado por el store
pub trait Entity: Clone + Send + Sync + Unpin + 'static {
    /// Nombre para mensajes y logs
    const NAME: &'static str;

    fn id(&self) -> i64;

    /// Copia del registro con el id asignado por el store
    fn with_id(self, id: i64) -> Self;

    /// Clave única canónica, si la entidad tiene una
    fn unique_key(&self) -> Option<String> {
        None
    }

    /// Valor de una columna, para filtros
    fn field(&self, column: &str) -> Option<FieldValue>;
}

/// Contrato de almacenamiento con clave, común a todas las entidades
#[async_trait]
pub trait KeyedStore<E: Entity>: Send + Sync {
    async fn get_by_id(&self, id: i64) -> StoreResult<Option<E>>;

    /// Búsqueda exacta (sin distinguir mayúsculas) por la clave única
    async fn find_by_unique_key(&self, key: &str) -> StoreResult<Option<E>>;

    async fn find(&self, filter: Filter) -> StoreResult<Vec<E>>;

    async fn list(&self) -> StoreResult<Vec<E>>;

    /// Inserta y devuelve el registro con su id; `Duplicate` si la clave ya existe
    async fn insert(&self, record: E) -> StoreResult<E>;

    async fn update(&self, record: E) -> StoreResult<E>;

    /// `ReferentialIntegrity` si algún ticket todavía referencia el registro
    async fn delete(&self, id: i64) -> StoreResult<()>;

    async fn exists(&self, id: i64) -> StoreResult<bool> {
        Ok(self.get_by_id(id).await?.is_some())
    }
}

pub type SharedStore<E> = Arc<dyn KeyedStore<E>>;
