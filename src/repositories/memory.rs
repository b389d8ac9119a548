//! Store en memoria
//!
//! Todas las tablas viven detrás de un único `RwLock`, de modo que la
//! verificación de unicidad e integridad referencial y la escritura son
//! atómicas. Se usa en desarrollo (sin `DATABASE_URL`) y en los tests.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{Entity, Filter, KeyedStore, SharedStore, StoreError, StoreResult};
use crate::models::{Driver, InfractionType, Officer, Ticket, Vehicle};

/// Una tabla: ids autoincrementales desde 1
#[derive(Debug)]
pub struct Table<E> {
    next_id: i64,
    rows: BTreeMap<i64, E>,
}

impl<E> Default for Table<E> {
    fn default() -> Self {
        Self {
            next_id: 1,
            rows: BTreeMap::new(),
        }
    }
}

impl<E: Entity> Table<E> {
    fn key_taken(&self, key: &str, except: Option<i64>) -> bool {
        let wanted = key.to_uppercase();
        self.rows.values().any(|row| {
            Some(row.id()) != except
                && row.unique_key().map_or(false, |k| k.to_uppercase() == wanted)
        })
    }
}

#[derive(Debug, Default)]
pub struct Tables {
    pub vehicles: Table<Vehicle>,
    pub drivers: Table<Driver>,
    pub infraction_types: Table<InfractionType>,
    pub officers: Table<Officer>,
    pub tickets: Table<Ticket>,
}

impl Tables {
    fn tickets_where(&self, pred: impl Fn(&Ticket) -> bool) -> bool {
        self.tickets.rows.values().any(pred)
    }
}

/// Entidades que saben en qué tabla viven y cómo se relacionan con los tickets
pub trait MemoryEntity: Entity {
    fn table(tables: &Tables) -> &Table<Self>;

    fn table_mut(tables: &mut Tables) -> &mut Table<Self>;

    /// Primera referencia saliente que no existe, si hay alguna
    fn missing_reference(&self, _tables: &Tables) -> Option<(&'static str, i64)> {
        None
    }

    /// ¿Algún ticket referencia este registro?
    fn is_referenced(_id: i64, _tables: &Tables) -> bool {
        false
    }
}

impl MemoryEntity for Vehicle {
    fn table(tables: &Tables) -> &Table<Self> {
        &tables.vehicles
    }

    fn table_mut(tables: &mut Tables) -> &mut Table<Self> {
        &mut tables.vehicles
    }

    fn is_referenced(id: i64, tables: &Tables) -> bool {
        tables.tickets_where(|t| t.vehicle_id == id)
    }
}

impl MemoryEntity for Driver {
    fn table(tables: &Tables) -> &Table<Self> {
        &tables.drivers
    }

    fn table_mut(tables: &mut Tables) -> &mut Table<Self> {
        &mut tables.drivers
    }

    fn is_referenced(id: i64, tables: &Tables) -> bool {
        tables.tickets_where(|t| t.driver_id == Some(id))
    }
}

impl MemoryEntity for InfractionType {
    fn table(tables: &Tables) -> &Table<Self> {
        &tables.infraction_types
    }

    fn table_mut(tables: &mut Tables) -> &mut Table<Self> {
        &mut tables.infraction_types
    }

    fn is_referenced(id: i64, tables: &Tables) -> bool {
        tables.tickets_where(|t| t.infraction_type_id == id)
    }
}

impl MemoryEntity for Officer {
    fn table(tables: &Tables) -> &Table<Self> {
        &tables.officers
    }

    fn table_mut(tables: &mut Tables) -> &mut Table<Self> {
        &mut tables.officers
    }

    fn is_referenced(id: i64, tables: &Tables) -> bool {
        tables.tickets_where(|t| t.officer_id == id)
    }
}

impl MemoryEntity for Ticket {
    fn table(tables: &Tables) -> &Table<Self> {
        &tables.tickets
    }

    fn table_mut(tables: &mut Tables) -> &mut Table<Self> {
        &mut tables.tickets
    }

    fn missing_reference(&self, tables: &Tables) -> Option<(&'static str, i64)> {
        if !tables.vehicles.rows.contains_key(&self.vehicle_id) {
            return Some((Vehicle::NAME, self.vehicle_id));
        }
        if !tables.officers.rows.contains_key(&self.officer_id) {
            return Some((Officer::NAME, self.officer_id));
        }
        if !tables.infraction_types.rows.contains_key(&self.infraction_type_id) {
            return Some((InfractionType::NAME, self.infraction_type_id));
        }
        match self.driver_id {
            Some(id) if !tables.drivers.rows.contains_key(&id) => Some((Driver::NAME, id)),
            _ => None,
        }
    }
}

/// Base de datos en memoria compartida entre los stores de cada entidad
#[derive(Debug, Clone, Default)]
pub struct MemoryDatabase {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store de una entidad sobre esta base
    pub fn store<E: MemoryEntity>(&self) -> SharedStore<E> {
        Arc::new(self.clone())
    }
}

#[async_trait]
impl<E: MemoryEntity> KeyedStore<E> for MemoryDatabase {
    async fn get_by_id(&self, id: i64) -> StoreResult<Option<E>> {
        let tables = self.tables.read().await;
        Ok(E::table(&tables).rows.get(&id).cloned())
    }

    async fn find_by_unique_key(&self, key: &str) -> StoreResult<Option<E>> {
        let wanted = key.to_uppercase();
        let tables = self.tables.read().await;
        Ok(E::table(&tables)
            .rows
            .values()
            .find(|row| row.unique_key().map_or(false, |k| k.to_uppercase() == wanted))
            .cloned())
    }

    async fn find(&self, filter: Filter) -> StoreResult<Vec<E>> {
        let tables = self.tables.read().await;
        Ok(E::table(&tables)
            .rows
            .values()
            .filter(|row| filter.matches(*row))
            .cloned()
            .collect())
    }

    async fn list(&self) -> StoreResult<Vec<E>> {
        let tables = self.tables.read().await;
        Ok(E::table(&tables).rows.values().cloned().collect())
    }

    async fn insert(&self, record: E) -> StoreResult<E> {
        let mut tables = self.tables.write().await;
        if let Some((entity, id)) = record.missing_reference(&tables) {
            return Err(StoreError::ReferentialIntegrity { entity, id });
        }

        let table = E::table_mut(&mut tables);
        if let Some(key) = record.unique_key() {
            if table.key_taken(&key, None) {
                return Err(StoreError::Duplicate { entity: E::NAME, key });
            }
        }

        let id = table.next_id;
        table.next_id += 1;
        let stored = record.with_id(id);
        table.rows.insert(id, stored.clone());
        Ok(stored)
    }

    async fn update(&self, record: E) -> StoreResult<E> {
        let mut tables = self.tables.write().await;
        let id = record.id();
        if !E::table(&tables).rows.contains_key(&id) {
            return Err(StoreError::NotFound { entity: E::NAME, id });
        }
        if let Some((entity, ref_id)) = record.missing_reference(&tables) {
            return Err(StoreError::ReferentialIntegrity { entity, id: ref_id });
        }

        let table = E::table_mut(&mut tables);
        if let Some(key) = record.unique_key() {
            if table.key_taken(&key, Some(id)) {
                return Err(StoreError::Duplicate { entity: E::NAME, key });
            }
        }
        table.rows.insert(id, record.clone());
        Ok(record)
    }

    async fn delete(&self, id: i64) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if !E::table(&tables).rows.contains_key(&id) {
            return Err(StoreError::NotFound { entity: E::NAME, id });
        }
        if E::is_referenced(id, &tables) {
            return Err(StoreError::ReferentialIntegrity { entity: E::NAME, id });
        }
        E::table_mut(&mut tables).rows.remove(&id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::Decimal;

    use crate::models::{OfficerRole, Severity};
    use crate::repositories::FieldValue;

    fn vehicle(plate: &str) -> Vehicle {
        Vehicle {
            id: 0,
            plate: plate.to_string(),
            brand: None,
            model: None,
            category: None,
            owner_name: Some("Maria Silva".to_string()),
        }
    }

    async fn seed_ticket(db: &MemoryDatabase) -> Ticket {
        let vehicle = db.store::<Vehicle>().insert(vehicle("ABC1234")).await.unwrap();
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
        let kind = db
            .store::<InfractionType>()
            .insert(InfractionType {
                id: 0,
                code: "501-1".to_string(),
                description: None,
                amount: Decimal::new(8_838, 2),
                severity: Severity::Light,
                penalty_points: 3,
            })
            .await
            .unwrap();
        db.store::<Ticket>()
            .insert(Ticket {
                id: 0,
                vehicle_id: vehicle.id,
                officer_id: officer.id,
                driver_id: None,
                infraction_type_id: kind.id,
                occurred_at: Utc::now(),
                location: None,
                description: None,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_insert_assigns_sequential_ids() {
        let db = MemoryDatabase::new();
        let store = db.store::<Vehicle>();
        let first = store.insert(vehicle("ABC1234")).await.unwrap();
        let second = store.insert(vehicle("XYZ9876")).await.unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(store.get_by_id(2).await.unwrap(), Some(second));
    }

    #[tokio::test]
    async fn test_unique_key_is_case_insensitive() {
        let db = MemoryDatabase::new();
        let store = db.store::<Vehicle>();
        store.insert(vehicle("ABC1234")).await.unwrap();

        let err = store.insert(vehicle("abc1234")).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate { .. }));
        assert!(store.find_by_unique_key("abc1234").await.unwrap().is_some());
        // sin coincidencias parciales
        assert!(store.find_by_unique_key("ABC123").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_checks_key_against_other_rows() {
        let db = MemoryDatabase::new();
        let store = db.store::<Vehicle>();
        let first = store.insert(vehicle("ABC1234")).await.unwrap();
        store.insert(vehicle("XYZ9876")).await.unwrap();

        let same_key = Vehicle { brand: Some("Fiat".to_string()), ..first.clone() };
        assert!(store.update(same_key).await.is_ok());

        let clash = Vehicle { plate: "XYZ9876".to_string(), ..first };
        assert!(matches!(store.update(clash).await, Err(StoreError::Duplicate { .. })));
    }

    #[tokio::test]
    async fn test_filters() {
        let db = MemoryDatabase::new();
        let store = db.store::<Vehicle>();
        store.insert(vehicle("ABC1234")).await.unwrap();
        store.insert(vehicle("ABD5678")).await.unwrap();
        store.insert(Vehicle { owner_name: None, ..vehicle("XYZ9876") }).await.unwrap();

        let by_owner = store.find(Filter::eq("owner_name", "Maria Silva")).await.unwrap();
        assert_eq!(by_owner.len(), 2);

        let search = store.find(Filter::Contains("plate", "ab".to_string())).await.unwrap();
        assert_eq!(search.len(), 2);

        let range = store
            .find(Filter::Between("id", FieldValue::Int(2), FieldValue::Int(3)))
            .await
            .unwrap();
        assert_eq!(range.iter().map(|v| v.id).collect::<Vec<_>>(), vec![2, 3]);
    }

    #[tokio::test]
    async fn test_referenced_rows_cannot_be_deleted() {
        let db = MemoryDatabase::new();
        let ticket = seed_ticket(&db).await;

        let err = db.store::<Vehicle>().delete(ticket.vehicle_id).await.unwrap_err();
        assert!(matches!(err, StoreError::ReferentialIntegrity { .. }));
        let err = db.store::<InfractionType>().delete(ticket.infraction_type_id).await.unwrap_err();
        assert!(matches!(err, StoreError::ReferentialIntegrity { .. }));

        db.store::<Ticket>().delete(ticket.id).await.unwrap();
        db.store::<Vehicle>().delete(ticket.vehicle_id).await.unwrap();
    }

    #[tokio::test]
    async fn test_ticket_with_dangling_reference_is_rejected() {
        let db = MemoryDatabase::new();
        let ticket = seed_ticket(&db).await;

        let err = db
            .store::<Ticket>()
            .insert(Ticket { driver_id: Some(42), ..ticket })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::ReferentialIntegrity { entity: "driver", id: 42 }));
    }

    #[tokio::test]
    async fn test_delete_missing_row() {
        let db = MemoryDatabase::new();
        let err = db.store::<Driver>().delete(7).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { id: 7, .. }));
    }
}
