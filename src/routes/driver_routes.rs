use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};

use crate::dto::driver_dto::{CreateDriverRequest, UpdateDriverRequest};
use crate::dto::ApiResponse;
use crate::models::Driver;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_driver_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_drivers).post(create_driver))
        .route("/tax-id/:tax_id", get(get_driver_by_tax_id))
        .route("/license/:license_number", get(get_driver_by_license))
        .route("/:id", get(get_driver).put(update_driver).delete(delete_driver))
}

async fn create_driver(
    State(state): State<AppState>,
    Json(request): Json<CreateDriverRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Driver>>), AppError> {
    let driver = state.drivers.create(request).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success_with_message(driver, "Condutor creado exitosamente")),
    ))
}

async fn list_drivers(State(state): State<AppState>) -> Result<Json<ApiResponse<Vec<Driver>>>, AppError> {
    Ok(Json(ApiResponse::success(state.drivers.list().await?)))
}

async fn get_driver(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<Driver>>, AppError> {
    Ok(Json(ApiResponse::success(state.drivers.get(id).await?)))
}

async fn get_driver_by_tax_id(
    State(state): State<AppState>,
    Path(tax_id): Path<String>,
) -> Result<Json<ApiResponse<Driver>>, AppError> {
    Ok(Json(ApiResponse::success(state.drivers.get_by_tax_id(&tax_id).await?)))
}

async fn get_driver_by_license(
    State(state): State<AppState>,
    Path(license_number): Path<String>,
) -> Result<Json<ApiResponse<Driver>>, AppError> {
    Ok(Json(ApiResponse::success(
        state.drivers.get_by_license_number(&license_number).await?,
    )))
}

async fn update_driver(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateDriverRequest>,
) -> Result<Json<ApiResponse<Driver>>, AppError> {
    let driver = state.drivers.update(id, request).await?;
    Ok(Json(ApiResponse::success_with_message(driver, "Condutor actualizado exitosamente")))
}

async fn delete_driver(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    state.drivers.delete(id).await?;
    Ok(Json(ApiResponse::message("Condutor eliminado exitosamente")))
}
