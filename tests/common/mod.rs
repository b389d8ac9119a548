#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use serde_json::{json, Value};

use traffic_tickets::models::{InfractionType, Officer, OfficerRole, Severity};
use traffic_tickets::repositories::{KeyedStore, MemoryDatabase};
use traffic_tickets::services::RecognitionSource;
use traffic_tickets::state::{AppState, Stores};
use traffic_tickets::utils::errors::AppResult;

/// Fuente de reconocimiento que siempre devuelve el mismo texto
pub struct FixedRecognitionSource {
    pub raw: String,
    pub calls: AtomicUsize,
}

impl FixedRecognitionSource {
    pub fn new(raw: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            raw: raw.into(),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RecognitionSource for FixedRecognitionSource {
    async fn extract(&self, _image: &[u8]) -> AppResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.raw.clone())
    }
}

pub struct TestContext {
    pub db: MemoryDatabase,
    pub state: AppState,
    pub officer: Officer,
}

pub async fn seed_officer(db: &MemoryDatabase) -> Officer {
    db.store::<Officer>()
        .insert(Officer {
            id: 0,
            name: "Carla Mendes".to_string(),
            tax_id: None,
            email: "carla@transito.gov.br".to_string(),
            password_hash: "$2b$04$placeholder".to_string(),
            role: OfficerRole::Agent,
            created_at: Utc::now(),
        })
        .await
        .unwrap()
}

pub async fn seed_infraction_type(db: &MemoryDatabase, code: &str) -> InfractionType {
    db.store::<InfractionType>()
        .insert(InfractionType {
            id: 0,
            code: code.to_string(),
            description: Some("Estacionar em local proibido".to_string()),
            amount: Decimal::new(19_523, 2),
            severity: Severity::Medium,
            penalty_points: 4,
        })
        .await
        .unwrap()
}

pub async fn context(recognition: Arc<dyn RecognitionSource>) -> TestContext {
    let db = MemoryDatabase::new();
    let officer = seed_officer(&db).await;
    let state = AppState::new(Stores::in_memory(&db), recognition);
    TestContext { db, state, officer }
}

/// Payload completo y válido, con fecha de una hora atrás
pub fn valid_payload() -> Value {
    json!({
        "plate": "ABC-1234",
        "driverTaxId": "111.444.777-35",
        "driverName": "Jane Doe",
        "infractionCode": "501-1",
        "timestamp": (Utc::now() - chrono::Duration::hours(1)).to_rfc3339(),
        "location": "Main St",
        "description": "No parking"
    })
}
