//! Store PostgreSQL
//!
//! Implementación genérica de `KeyedStore` sobre SQLx. Cada entidad describe
//! su tabla, su columna de clave única y cómo enlazar sus columnas; el SQL
//! se genera a partir de esa descripción.

use std::marker::PhantomData;

use async_trait::async_trait;
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::QueryAs;
use sqlx::{FromRow, PgPool, Postgres};

use super::{Entity, FieldValue, Filter, KeyedStore, StoreError, StoreResult};
use crate::models::{Driver, InfractionType, Officer, Ticket, Vehicle};

type PgQueryAs<'q, E> = QueryAs<'q, Postgres, E, PgArguments>;

/// Descripción de una entidad persistida en PostgreSQL
pub trait PgEntity: Entity + for<'r> FromRow<'r, PgRow> {
    const TABLE: &'static str;
    /// Columna con índice único (se compara con `UPPER`)
    const KEY_COLUMN: Option<&'static str>;
    /// Columnas escribibles, en el orden en que `bind_columns` las enlaza
    const COLUMNS: &'static [&'static str];

    fn bind_columns<'q>(&'q self, query: PgQueryAs<'q, Self>) -> PgQueryAs<'q, Self>;
}

impl PgEntity for Vehicle {
    const TABLE: &'static str = "vehicles";
    const KEY_COLUMN: Option<&'static str> = Some("plate");
    const COLUMNS: &'static [&'static str] = &["plate", "brand", "model", "category", "owner_name"];

    fn bind_columns<'q>(&'q self, query: PgQueryAs<'q, Self>) -> PgQueryAs<'q, Self> {
        query
            .bind(&self.plate)
            .bind(&self.brand)
            .bind(&self.model)
            .bind(&self.category)
            .bind(&self.owner_name)
    }
}

impl PgEntity for Driver {
    const TABLE: &'static str = "drivers";
    const KEY_COLUMN: Option<&'static str> = Some("tax_id");
    const COLUMNS: &'static [&'static str] =
        &["tax_id", "license_number", "license_category", "region", "full_name"];

    fn bind_columns<'q>(&'q self, query: PgQueryAs<'q, Self>) -> PgQueryAs<'q, Self> {
        query
            .bind(&self.tax_id)
            .bind(&self.license_number)
            .bind(&self.license_category)
            .bind(&self.region)
            .bind(&self.full_name)
    }
}

impl PgEntity for InfractionType {
    const TABLE: &'static str = "infraction_types";
    const KEY_COLUMN: Option<&'static str> = Some("code");
    const COLUMNS: &'static [&'static str] =
        &["code", "description", "amount", "severity", "penalty_points"];

    fn bind_columns<'q>(&'q self, query: PgQueryAs<'q, Self>) -> PgQueryAs<'q, Self> {
        query
            .bind(&self.code)
            .bind(&self.description)
            .bind(self.amount)
            .bind(self.severity)
            .bind(self.penalty_points)
    }
}

impl PgEntity for Officer {
    const TABLE: &'static str = "officers";
    const KEY_COLUMN: Option<&'static str> = Some("email");
    const COLUMNS: &'static [&'static str] =
        &["name", "tax_id", "email", "password_hash", "role", "created_at"];

    fn bind_columns<'q>(&'q self, query: PgQueryAs<'q, Self>) -> PgQueryAs<'q, Self> {
        query
            .bind(&self.name)
            .bind(&self.tax_id)
            .bind(&self.email)
            .bind(&self.password_hash)
            .bind(self.role)
            .bind(self.created_at)
    }
}

impl PgEntity for Ticket {
    const TABLE: &'static str = "tickets";
    const KEY_COLUMN: Option<&'static str> = None;
    const COLUMNS: &'static [&'static str] = &[
        "vehicle_id",
        "officer_id",
        "driver_id",
        "infraction_type_id",
        "occurred_at",
        "location",
        "description",
    ];

    fn bind_columns<'q>(&'q self, query: PgQueryAs<'q, Self>) -> PgQueryAs<'q, Self> {
        query
            .bind(self.vehicle_id)
            .bind(self.officer_id)
            .bind(self.driver_id)
            .bind(self.infraction_type_id)
            .bind(self.occurred_at)
            .bind(&self.location)
            .bind(&self.description)
    }
}

/// Clasificar errores de SQLx: violaciones de unicidad y de clave foránea
fn classify(err: sqlx::Error, entity: &'static str, key: Option<String>, id: i64) -> StoreError {
    if let Some(db_err) = err.as_database_error() {
        if db_err.is_unique_violation() {
            return StoreError::Duplicate {
                entity,
                key: key.unwrap_or_default(),
            };
        }
        if db_err.is_foreign_key_violation() {
            return StoreError::ReferentialIntegrity { entity, id };
        }
    }
    StoreError::Database(err)
}

fn placeholders(count: usize) -> String {
    (1..=count).map(|i| format!("${}", i)).collect::<Vec<_>>().join(", ")
}

fn insert_sql<E: PgEntity>() -> String {
    format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING *",
        E::TABLE,
        E::COLUMNS.join(", "),
        placeholders(E::COLUMNS.len())
    )
}

fn update_sql<E: PgEntity>() -> String {
    let assignments = E::COLUMNS
        .iter()
        .enumerate()
        .map(|(i, column)| format!("{} = ${}", column, i + 1))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "UPDATE {} SET {} WHERE id = ${} RETURNING *",
        E::TABLE,
        assignments,
        E::COLUMNS.len() + 1
    )
}

/// Expresión de columna para comparar con un parámetro del tipo del valor
fn column_expr(column: &str, value: &FieldValue) -> String {
    match value {
        FieldValue::Text(_) => format!("{}::text", column),
        FieldValue::Int(_) | FieldValue::Timestamp(_) => column.to_string(),
    }
}

fn filter_sql<E: PgEntity>(filter: &Filter) -> StoreResult<String> {
    let column = filter.column();
    if column != "id" && !E::COLUMNS.contains(&column) {
        return Err(StoreError::Backend(format!("unknown column '{}' for {}", column, E::NAME)));
    }
    let condition = match filter {
        Filter::Eq(_, value) => format!("{} = $1", column_expr(column, value)),
        Filter::Contains(_, _) => format!("{}::text ILIKE $1", column),
        Filter::Between(_, from, _) => format!("{} BETWEEN $1 AND $2", column_expr(column, from)),
    };
    Ok(format!("SELECT * FROM {} WHERE {} ORDER BY id", E::TABLE, condition))
}

fn bind_value<'q, E>(query: PgQueryAs<'q, E>, value: &FieldValue) -> PgQueryAs<'q, E> {
    match value {
        FieldValue::Text(text) => query.bind(text.clone()),
        FieldValue::Int(int) => query.bind(*int),
        FieldValue::Timestamp(ts) => query.bind(*ts),
    }
}

/// Escapar comodines de LIKE en una búsqueda por subcadena
fn like_pattern(needle: &str) -> String {
    let escaped = needle.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_");
    format!("%{}%", escaped)
}

/// Store de una entidad sobre un pool de PostgreSQL
pub struct PgStore<E> {
    pool: PgPool,
    _entity: PhantomData<fn() -> E>,
}

impl<E> PgStore<E> {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            _entity: PhantomData,
        }
    }
}

impl<E> Clone for PgStore<E> {
    fn clone(&self) -> Self {
        Self::new(self.pool.clone())
    }
}

#[async_trait]
impl<E: PgEntity> KeyedStore<E> for PgStore<E> {
    async fn get_by_id(&self, id: i64) -> StoreResult<Option<E>> {
        let sql = format!("SELECT * FROM {} WHERE id = $1", E::TABLE);
        let row = sqlx::query_as::<_, E>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn find_by_unique_key(&self, key: &str) -> StoreResult<Option<E>> {
        let Some(column) = E::KEY_COLUMN else {
            return Ok(None);
        };
        let sql = format!("SELECT * FROM {} WHERE UPPER({}) = UPPER($1)", E::TABLE, column);
        let row = sqlx::query_as::<_, E>(&sql)
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn find(&self, filter: Filter) -> StoreResult<Vec<E>> {
        let sql = filter_sql::<E>(&filter)?;
        let query = sqlx::query_as::<_, E>(&sql);
        let query = match &filter {
            Filter::Eq(_, value) => bind_value(query, value),
            Filter::Contains(_, needle) => query.bind(like_pattern(needle)),
            Filter::Between(_, from, to) => bind_value(bind_value(query, from), to),
        };
        Ok(query.fetch_all(&self.pool).await?)
    }

    async fn list(&self) -> StoreResult<Vec<E>> {
        let sql = format!("SELECT * FROM {} ORDER BY id", E::TABLE);
        Ok(sqlx::query_as::<_, E>(&sql).fetch_all(&self.pool).await?)
    }

    async fn insert(&self, record: E) -> StoreResult<E> {
        let sql = insert_sql::<E>();
        let result = record
            .bind_columns(sqlx::query_as::<_, E>(&sql))
            .fetch_one(&self.pool)
            .await;
        result.map_err(|e| classify(e, E::NAME, record.unique_key(), record.id()))
    }

    async fn update(&self, record: E) -> StoreResult<E> {
        let sql = update_sql::<E>();
        let result = record
            .bind_columns(sqlx::query_as::<_, E>(&sql))
            .bind(record.id())
            .fetch_optional(&self.pool)
            .await;
        match result {
            Ok(Some(updated)) => Ok(updated),
            Ok(None) => Err(StoreError::NotFound {
                entity: E::NAME,
                id: record.id(),
            }),
            Err(e) => Err(classify(e, E::NAME, record.unique_key(), record.id())),
        }
    }

    async fn delete(&self, id: i64) -> StoreResult<()> {
        let sql = format!("DELETE FROM {} WHERE id = $1", E::TABLE);
        let result = sqlx::query(&sql)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| classify(e, E::NAME, None, id))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound { entity: E::NAME, id });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_insert_sql() {
        assert_eq!(
            insert_sql::<Vehicle>(),
            "INSERT INTO vehicles (plate, brand, model, category, owner_name) VALUES ($1, $2, $3, $4, $5) RETURNING *"
        );
    }

    #[test]
    fn test_update_sql_binds_id_last() {
        assert_eq!(
            update_sql::<Driver>(),
            "UPDATE drivers SET tax_id = $1, license_number = $2, license_category = $3, region = $4, full_name = $5 WHERE id = $6 RETURNING *"
        );
    }

    #[test]
    fn test_filter_sql() {
        let eq = filter_sql::<InfractionType>(&Filter::eq("severity", "grave")).unwrap();
        assert_eq!(eq, "SELECT * FROM infraction_types WHERE severity::text = $1 ORDER BY id");

        let by_vehicle = filter_sql::<Ticket>(&Filter::eq("vehicle_id", 3_i64)).unwrap();
        assert_eq!(by_vehicle, "SELECT * FROM tickets WHERE vehicle_id = $1 ORDER BY id");

        let period = filter_sql::<Ticket>(&Filter::Between(
            "occurred_at",
            Utc::now().into(),
            Utc::now().into(),
        ))
        .unwrap();
        assert!(period.contains("occurred_at BETWEEN $1 AND $2"));
    }

    #[test]
    fn test_filter_rejects_unknown_columns() {
        let err = filter_sql::<Vehicle>(&Filter::eq("plate; DROP TABLE vehicles", "x")).unwrap_err();
        assert!(matches!(err, StoreError::Backend(_)));
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("AB%"), "%AB\\%%");
        assert_eq!(like_pattern("A_C"), "%A\\_C%");
    }
}
