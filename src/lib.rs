//! Registro de multas de tránsito
//!
//! Servicio que convierte extracciones de imágenes de infracciones en multas
//! persistidas, resolviendo vehículos y condutores por placa y CPF, más el
//! CRUD de vehículos, condutores, tipos de infracción, agentes y multas.

pub mod config;
pub mod database;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;
