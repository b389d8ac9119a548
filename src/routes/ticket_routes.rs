use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::dto::ticket_dto::{
    CreateTicketRequest, ImageIntakeRequest, IntakeRequest, PeriodQuery, UpdateTicketRequest,
};
use crate::dto::ApiResponse;
use crate::models::Ticket;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_ticket_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_tickets).post(create_ticket))
        .route("/intake", post(intake_payload))
        .route("/intake/image", post(intake_image))
        .route("/period", get(list_by_period))
        .route("/vehicle/:id", get(list_by_vehicle))
        .route("/driver/:id", get(list_by_driver))
        .route("/officer/:id", get(list_by_officer))
        .route("/infraction-type/:id", get(list_by_infraction_type))
        .route("/:id", get(get_ticket).put(update_ticket).delete(delete_ticket))
}

type TicketList = Result<Json<ApiResponse<Vec<Ticket>>>, AppError>;

async fn create_ticket(
    State(state): State<AppState>,
    Json(request): Json<CreateTicketRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Ticket>>), AppError> {
    let ticket = state.tickets.create(request).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success_with_message(ticket, "Multa creada exitosamente")),
    ))
}

/// Intake desde una extracción JSON
async fn intake_payload(
    State(state): State<AppState>,
    Json(request): Json<IntakeRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Ticket>>), AppError> {
    let ticket = state.intake.process_value(request.payload, request.officer_id).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success_with_message(ticket, "Multa registrada a partir de la extracción")),
    ))
}

/// Intake desde una imagen: reconocimiento y luego el mismo flujo
async fn intake_image(
    State(state): State<AppState>,
    Json(request): Json<ImageIntakeRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Ticket>>), AppError> {
    let image = STANDARD
        .decode(request.image_base64.trim())
        .map_err(|e| AppError::BadRequest(format!("Image is not valid base64: {}", e)))?;
    let ticket = state.intake.process_image(&image, request.officer_id).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success_with_message(ticket, "Multa registrada a partir de la imagen")),
    ))
}

async fn list_tickets(State(state): State<AppState>) -> TicketList {
    Ok(Json(ApiResponse::success(state.tickets.list().await?)))
}

async fn get_ticket(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<Ticket>>, AppError> {
    Ok(Json(ApiResponse::success(state.tickets.get(id).await?)))
}

async fn update_ticket(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateTicketRequest>,
) -> Result<Json<ApiResponse<Ticket>>, AppError> {
    let ticket = state.tickets.update(id, request).await?;
    Ok(Json(ApiResponse::success_with_message(ticket, "Multa actualizada exitosamente")))
}

async fn delete_ticket(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    state.tickets.delete(id).await?;
    Ok(Json(ApiResponse::message("Multa eliminada exitosamente")))
}

async fn list_by_vehicle(State(state): State<AppState>, Path(id): Path<i64>) -> TicketList {
    Ok(Json(ApiResponse::success(state.tickets.list_by_vehicle(id).await?)))
}

async fn list_by_driver(State(state): State<AppState>, Path(id): Path<i64>) -> TicketList {
    Ok(Json(ApiResponse::success(state.tickets.list_by_driver(id).await?)))
}

async fn list_by_officer(State(state): State<AppState>, Path(id): Path<i64>) -> TicketList {
    Ok(Json(ApiResponse::success(state.tickets.list_by_officer(id).await?)))
}

async fn list_by_infraction_type(State(state): State<AppState>, Path(id): Path<i64>) -> TicketList {
    Ok(Json(ApiResponse::success(state.tickets.list_by_infraction_type(id).await?)))
}

async fn list_by_period(State(state): State<AppState>, Query(period): Query<PeriodQuery>) -> TicketList {
    Ok(Json(ApiResponse::success(
        state.tickets.list_by_period(period.from, period.to).await?,
    )))
}
