use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};

use crate::dto::vehicle_dto::{CreateVehicleRequest, PlateSearchQuery, UpdateVehicleRequest};
use crate::dto::ApiResponse;
use crate::models::Vehicle;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_vehicle_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_vehicles).post(create_vehicle))
        .route("/search", get(search_vehicles))
        .route("/plate/:plate", get(get_vehicle_by_plate))
        .route("/owner/:owner", get(list_vehicles_by_owner))
        .route("/:id", get(get_vehicle).put(update_vehicle).delete(delete_vehicle))
}

async fn create_vehicle(
    State(state): State<AppState>,
    Json(request): Json<CreateVehicleRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Vehicle>>), AppError> {
    let vehicle = state.vehicles.create(request).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success_with_message(vehicle, "Vehículo creado exitosamente")),
    ))
}

async fn list_vehicles(State(state): State<AppState>) -> Result<Json<ApiResponse<Vec<Vehicle>>>, AppError> {
    Ok(Json(ApiResponse::success(state.vehicles.list().await?)))
}

async fn get_vehicle(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<Vehicle>>, AppError> {
    Ok(Json(ApiResponse::success(state.vehicles.get(id).await?)))
}

async fn get_vehicle_by_plate(
    State(state): State<AppState>,
    Path(plate): Path<String>,
) -> Result<Json<ApiResponse<Vehicle>>, AppError> {
    Ok(Json(ApiResponse::success(state.vehicles.get_by_plate(&plate).await?)))
}

async fn list_vehicles_by_owner(
    State(state): State<AppState>,
    Path(owner): Path<String>,
) -> Result<Json<ApiResponse<Vec<Vehicle>>>, AppError> {
    Ok(Json(ApiResponse::success(state.vehicles.list_by_owner(&owner).await?)))
}

async fn search_vehicles(
    State(state): State<AppState>,
    Query(query): Query<PlateSearchQuery>,
) -> Result<Json<ApiResponse<Vec<Vehicle>>>, AppError> {
    Ok(Json(ApiResponse::success(state.vehicles.search_by_plate(&query.plate).await?)))
}

async fn update_vehicle(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateVehicleRequest>,
) -> Result<Json<ApiResponse<Vehicle>>, AppError> {
    let vehicle = state.vehicles.update(id, request).await?;
    Ok(Json(ApiResponse::success_with_message(vehicle, "Vehículo actualizado exitosamente")))
}

async fn delete_vehicle(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    state.vehicles.delete(id).await?;
    Ok(Json(ApiResponse::message("Vehículo eliminado exitosamente")))
}
