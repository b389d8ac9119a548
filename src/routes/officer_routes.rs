use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};

use crate::dto::officer_dto::{CreateOfficerRequest, UpdateOfficerRequest};
use crate::dto::ApiResponse;
use crate::models::Officer;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_officer_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_officers).post(create_officer))
        .route("/email/:email", get(get_officer_by_email))
        .route("/:id", get(get_officer).put(update_officer).delete(delete_officer))
}

async fn create_officer(
    State(state): State<AppState>,
    Json(request): Json<CreateOfficerRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Officer>>), AppError> {
    let officer = state.officers.create(request).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success_with_message(officer, "Agente creado exitosamente")),
    ))
}

async fn list_officers(State(state): State<AppState>) -> Result<Json<ApiResponse<Vec<Officer>>>, AppError> {
    Ok(Json(ApiResponse::success(state.officers.list().await?)))
}

async fn get_officer(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<Officer>>, AppError> {
    Ok(Json(ApiResponse::success(state.officers.get(id).await?)))
}

async fn get_officer_by_email(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<ApiResponse<Officer>>, AppError> {
    Ok(Json(ApiResponse::success(state.officers.get_by_email(&email).await?)))
}

async fn update_officer(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateOfficerRequest>,
) -> Result<Json<ApiResponse<Officer>>, AppError> {
    let officer = state.officers.update(id, request).await?;
    Ok(Json(ApiResponse::success_with_message(officer, "Agente actualizado exitosamente")))
}

async fn delete_officer(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    state.officers.delete(id).await?;
    Ok(Json(ApiResponse::message("Agente eliminado exitosamente")))
}
