//! Utilidades del sistema
//!
//! Este módulo contiene utilidades para manejo de errores, validación
//! de identificadores y normalización de entidades.

pub mod errors;
pub mod normalization;
pub mod validation;
