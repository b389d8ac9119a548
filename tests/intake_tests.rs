mod common;

use std::sync::Arc;

use chrono::{Duration, Utc};
use serde_json::json;

use common::{context, seed_infraction_type, valid_payload, FixedRecognitionSource};
use traffic_tickets::models::{Driver, Ticket, Vehicle};
use traffic_tickets::repositories::KeyedStore;
use traffic_tickets::services::SampleRecognitionSource;
use traffic_tickets::utils::errors::AppError;

#[tokio::test]
async fn test_intake_creates_ticket_vehicle_and_driver() {
    let ctx = context(Arc::new(SampleRecognitionSource)).await;
    let infraction_type = seed_infraction_type(&ctx.db, "501-1").await;

    let ticket = ctx
        .state
        .intake
        .process_value(valid_payload(), ctx.officer.id)
        .await
        .unwrap();

    let vehicles = ctx.db.store::<Vehicle>().list().await.unwrap();
    let drivers = ctx.db.store::<Driver>().list().await.unwrap();
    assert_eq!(vehicles.len(), 1);
    assert_eq!(drivers.len(), 1);
    assert_eq!(vehicles[0].plate, "ABC-1234");
    assert_eq!(drivers[0].tax_id, "11144477735");
    assert_eq!(drivers[0].full_name, "Jane Doe");

    assert_eq!(ticket.vehicle_id, vehicles[0].id);
    assert_eq!(ticket.driver_id, Some(drivers[0].id));
    assert_eq!(ticket.officer_id, ctx.officer.id);
    assert_eq!(ticket.infraction_type_id, infraction_type.id);
    assert_eq!(ticket.location.as_deref(), Some("Main St"));
    assert_eq!(ctx.db.store::<Ticket>().list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_repeated_intake_reuses_master_data() {
    let ctx = context(Arc::new(SampleRecognitionSource)).await;
    seed_infraction_type(&ctx.db, "501-1").await;

    let first = ctx.state.intake.process_value(valid_payload(), ctx.officer.id).await.unwrap();
    let second = ctx.state.intake.process_value(valid_payload(), ctx.officer.id).await.unwrap();

    assert_ne!(first.id, second.id);
    assert_eq!(first.vehicle_id, second.vehicle_id);
    assert_eq!(first.driver_id, second.driver_id);
    assert_eq!(ctx.db.store::<Vehicle>().list().await.unwrap().len(), 1);
    assert_eq!(ctx.db.store::<Driver>().list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_unknown_infraction_code_creates_no_ticket() {
    let ctx = context(Arc::new(SampleRecognitionSource)).await;
    let mut payload = valid_payload();
    payload["infractionCode"] = json!("999-9");

    let err = ctx
        .state
        .intake
        .process_value(payload.clone(), ctx.officer.id)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::NotFound(_)));
    assert!(ctx.db.store::<Ticket>().list().await.unwrap().is_empty());
    // vehículo y condutor se resuelven antes del tipo y quedan creados
    let vehicles = ctx.db.store::<Vehicle>().list().await.unwrap();
    let drivers = ctx.db.store::<Driver>().list().await.unwrap();
    assert_eq!(vehicles.len(), 1);
    assert_eq!(drivers.len(), 1);

    seed_infraction_type(&ctx.db, "999-9").await;
    let ticket = ctx
        .state
        .intake
        .process_value(payload, ctx.officer.id)
        .await
        .unwrap();

    assert_eq!(ticket.vehicle_id, vehicles[0].id);
    assert_eq!(ticket.driver_id, Some(drivers[0].id));
    assert_eq!(ctx.db.store::<Vehicle>().list().await.unwrap().len(), 1);
    assert_eq!(ctx.db.store::<Driver>().list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_overlong_name_and_bad_region_reported_together() {
    let ctx = context(Arc::new(SampleRecognitionSource)).await;
    seed_infraction_type(&ctx.db, "501-1").await;
    let mut payload = valid_payload();
    payload["driverName"] = json!("J".repeat(101));
    payload["licenseRegion"] = json!("São Paulo");

    let err = ctx
        .state
        .intake
        .process_value(payload, ctx.officer.id)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Validation(_)));
    assert_eq!(err.violated_fields(), vec!["driverName", "licenseRegion"]);
    assert!(ctx.db.store::<Vehicle>().list().await.unwrap().is_empty());
    assert!(ctx.db.store::<Driver>().list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_missing_plate_and_code_reports_both() {
    let ctx = context(Arc::new(SampleRecognitionSource)).await;
    let mut payload = valid_payload();
    payload["plate"] = json!(null);
    payload.as_object_mut().unwrap().remove("infractionCode");

    let err = ctx
        .state
        .intake
        .process_value(payload, ctx.officer.id)
        .await
        .unwrap_err();

    let fields = err.violated_fields();
    assert!(fields.contains(&"plate"));
    assert!(fields.contains(&"infractionCode"));
    assert!(ctx.db.store::<Vehicle>().list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_future_timestamp_is_rejected() {
    let ctx = context(Arc::new(SampleRecognitionSource)).await;
    seed_infraction_type(&ctx.db, "501-1").await;
    let mut payload = valid_payload();
    payload["timestamp"] = json!((Utc::now() + Duration::hours(2)).to_rfc3339());

    let err = ctx
        .state
        .intake
        .process_value(payload, ctx.officer.id)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Validation(_)));
    assert_eq!(err.violated_fields(), vec!["timestamp"]);
}

#[tokio::test]
async fn test_malformed_payload_is_parse_error() {
    let ctx = context(Arc::new(SampleRecognitionSource)).await;
    for raw in ["{not json", "\"just a string\"", "[]"] {
        let err = ctx
            .state
            .intake
            .process_payload(raw, ctx.officer.id)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Parse(_)), "{} should not parse", raw);
    }
}

#[tokio::test]
async fn test_unknown_officer_is_conflict() {
    let ctx = context(Arc::new(SampleRecognitionSource)).await;
    seed_infraction_type(&ctx.db, "501-1").await;

    let err = ctx
        .state
        .intake
        .process_value(valid_payload(), ctx.officer.id + 100)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Conflict(_)));
    assert!(ctx.db.store::<Ticket>().list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_image_intake_calls_recognition_once() {
    let source = FixedRecognitionSource::new(valid_payload().to_string());
    let ctx = context(source.clone()).await;
    seed_infraction_type(&ctx.db, "501-1").await;

    let ticket = ctx.state.intake.process_image(b"jpeg bytes", ctx.officer.id).await.unwrap();
    assert!(ticket.id > 0);
    assert_eq!(source.calls(), 1);
}

#[tokio::test]
async fn test_sample_recognition_end_to_end() {
    let ctx = context(Arc::new(SampleRecognitionSource)).await;
    seed_infraction_type(&ctx.db, "501-1").await;

    let ticket = ctx.state.intake.process_image(b"jpeg bytes", ctx.officer.id).await.unwrap();
    let vehicle = ctx.state.vehicles.get(ticket.vehicle_id).await.unwrap();
    assert_eq!(vehicle.brand.as_deref(), Some("Toyota"));
    assert_eq!(vehicle.owner_name.as_deref(), Some("Maria Silva Santos"));
}

#[tokio::test]
async fn test_recognition_garbage_is_parse_error() {
    let source = FixedRecognitionSource::new("<html>502</html>");
    let ctx = context(source.clone()).await;

    let err = ctx.state.intake.process_image(b"jpeg", ctx.officer.id).await.unwrap_err();
    assert!(matches!(err, AppError::Parse(_)));
    assert_eq!(source.calls(), 1);
}
