//! DTOs de la API
//!
//! Requests con validación (`validator`) y el envelope de respuesta.

pub mod api_response;
pub mod driver_dto;
pub mod infraction_type_dto;
pub mod officer_dto;
pub mod ticket_dto;
pub mod vehicle_dto;

pub use api_response::ApiResponse;
