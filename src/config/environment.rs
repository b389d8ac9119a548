//! Configuración de variables de entorno
//!
//! Este módulo maneja la configuración del entorno y variables de configuración.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("{name} must be a valid number (got '{value}')")]
    InvalidNumber { name: &'static str, value: String },
}

/// Configuración del entorno
#[derive(Debug, Clone, PartialEq)]
pub struct EnvironmentConfig {
    pub environment: String,
    pub host: String,
    pub port: u16,
    /// Sin URL se usa el store en memoria
    pub database_url: Option<String>,
    /// Vacío = CORS permisivo
    pub cors_origins: Vec<String>,
    /// Sin URL se usa la fuente de reconocimiento de ejemplo
    pub recognition_url: Option<String>,
    pub recognition_timeout: Duration,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            host: "0.0.0.0".to_string(),
            port: 3000,
            database_url: None,
            cors_origins: Vec::new(),
            recognition_url: None,
            recognition_timeout: Duration::from_secs(30),
        }
    }
}

fn optional(name: &str) -> Option<String> {
    env::var(name).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn parse_number<T: FromStr>(name: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError> {
    match raw {
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::InvalidNumber { name, value }),
        None => Ok(default),
    }
}

fn split_origins(raw: Option<String>) -> Vec<String> {
    raw.map(|list| {
        list.split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    })
    .unwrap_or_default()
}

impl EnvironmentConfig {
    /// Leer la configuración del entorno (después de `dotenvy::dotenv()`)
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            environment: optional("ENVIRONMENT").unwrap_or(defaults.environment),
            host: optional("HOST").unwrap_or(defaults.host),
            port: parse_number("PORT", optional("PORT"), defaults.port)?,
            database_url: optional("DATABASE_URL"),
            cors_origins: split_origins(optional("CORS_ORIGINS")),
            recognition_url: optional("RECOGNITION_URL"),
            recognition_timeout: Duration::from_secs(parse_number(
                "RECOGNITION_TIMEOUT_SECS",
                optional("RECOGNITION_TIMEOUT_SECS"),
                defaults.recognition_timeout.as_secs(),
            )?),
        })
    }

    /// Verificar si estamos en modo desarrollo
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Verificar si estamos en modo producción
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Obtener la dirección del servidor
    pub fn server_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("PORT", Some("8080".to_string()), 3000u16), Ok(8080));
        assert_eq!(parse_number("PORT", None, 3000u16), Ok(3000));
        assert!(parse_number("PORT", Some("eighty".to_string()), 3000u16).is_err());
        assert!(parse_number("PORT", Some("70000".to_string()), 3000u16).is_err());
    }

    #[test]
    fn test_split_origins() {
        assert_eq!(
            split_origins(Some("http://a.test, ,http://b.test".to_string())),
            vec!["http://a.test", "http://b.test"]
        );
        assert!(split_origins(None).is_empty());
    }

    #[test]
    fn test_defaults() {
        let config = EnvironmentConfig::default();
        assert_eq!(config.server_url(), "0.0.0.0:3000");
        assert!(config.is_development());
        assert!(config.database_url.is_none());
    }
}
