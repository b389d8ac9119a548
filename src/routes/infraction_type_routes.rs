use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};

use crate::dto::infraction_type_dto::{CreateInfractionTypeRequest, UpdateInfractionTypeRequest};
use crate::dto::ApiResponse;
use crate::models::InfractionType;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_infraction_type_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_infraction_types).post(create_infraction_type))
        .route("/code/:code", get(get_infraction_type_by_code))
        .route("/severity/:severity", get(list_by_severity))
        .route(
            "/:id",
            get(get_infraction_type)
                .put(update_infraction_type)
                .delete(delete_infraction_type),
        )
}

async fn create_infraction_type(
    State(state): State<AppState>,
    Json(request): Json<CreateInfractionTypeRequest>,
) -> Result<(StatusCode, Json<ApiResponse<InfractionType>>), AppError> {
    let infraction_type = state.infraction_types.create(request).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success_with_message(
            infraction_type,
            "Tipo de infracción creado exitosamente",
        )),
    ))
}

async fn list_infraction_types(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<InfractionType>>>, AppError> {
    Ok(Json(ApiResponse::success(state.infraction_types.list().await?)))
}

async fn get_infraction_type(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<InfractionType>>, AppError> {
    Ok(Json(ApiResponse::success(state.infraction_types.get(id).await?)))
}

async fn get_infraction_type_by_code(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<ApiResponse<InfractionType>>, AppError> {
    Ok(Json(ApiResponse::success(state.infraction_types.get_by_code(&code).await?)))
}

async fn list_by_severity(
    State(state): State<AppState>,
    Path(severity): Path<String>,
) -> Result<Json<ApiResponse<Vec<InfractionType>>>, AppError> {
    Ok(Json(ApiResponse::success(
        state.infraction_types.list_by_severity(&severity).await?,
    )))
}

async fn update_infraction_type(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateInfractionTypeRequest>,
) -> Result<Json<ApiResponse<InfractionType>>, AppError> {
    let infraction_type = state.infraction_types.update(id, request).await?;
    Ok(Json(ApiResponse::success(infraction_type)))
}

async fn delete_infraction_type(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    state.infraction_types.delete(id).await?;
    Ok(Json(ApiResponse::message("Tipo de infracción eliminado exitosamente")))
}
