//! Fuente de reconocimiento de imágenes de multas
//!
//! Convierte la foto de una infracción en el payload JSON de extracción que
//! consume el orquestador de intake. Se inyecta como `Arc<dyn RecognitionSource>`
//! para que los tests puedan suministrar cualquier payload.

use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::Utc;
use reqwest::Client;
use serde_json::json;
use tracing::{error, info};

use crate::utils::errors::{AppError, AppResult};

#[async_trait]
pub trait RecognitionSource: Send + Sync {
    /// Extraer el payload crudo (JSON) de los bytes de una imagen
    async fn extract(&self, image: &[u8]) -> AppResult<String>;
}

/// Extracción fija de ejemplo, con la fecha actual
#[derive(Debug, Clone, Default)]
pub struct SampleRecognitionSource;

#[async_trait]
impl RecognitionSource for SampleRecognitionSource {
    async fn extract(&self, image: &[u8]) -> AppResult<String> {
        if image.is_empty() {
            return Err(AppError::BadRequest("Image cannot be empty".to_string()));
        }

        info!("🖼️ Extracción de ejemplo para imagen de {} bytes", image.len());
        let payload = json!({
            "plate": "ABC-1234",
            "driverName": "João Silva Santos",
            "driverTaxId": "111.444.777-35",
            "driverLicenseNumber": "12345678901",
            "licenseCategory": "B",
            "licenseRegion": "SP",
            "timestamp": Utc::now().to_rfc3339(),
            "location": "Rua das Flores, 123 - Centro",
            "description": "Estacionamento em local proibido",
            "infractionCode": "501-1",
            "vehicleBrand": "Toyota",
            "vehicleModel": "Corolla",
            "vehicleCategory": "Automóvel",
            "ownerName": "Maria Silva Santos"
        });
        Ok(payload.to_string())
    }
}

/// Servicio de reconocimiento remoto vía HTTP
pub struct HttpRecognitionSource {
    client: Client,
    url: String,
}

impl HttpRecognitionSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl RecognitionSource for HttpRecognitionSource {
    async fn extract(&self, image: &[u8]) -> AppResult<String> {
        if image.is_empty() {
            return Err(AppError::BadRequest("Image cannot be empty".to_string()));
        }

        info!("🌐 Enviando imagen de {} bytes a {}", image.len(), self.url);
        let response = self
            .client
            .post(&self.url)
            .json(&json!({ "image": STANDARD.encode(image) }))
            .send()
            .await
            .map_err(|e| AppError::ExternalApi(format!("Recognition request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("❌ Reconocimiento falló con status {}: {}", status, body);
            return Err(AppError::ExternalApi(format!("Recognition service returned {}", status)));
        }

        response
            .text()
            .await
            .map_err(|e| AppError::ExternalApi(format!("Error reading recognition response: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sample_payload_has_every_key() {
        let raw = SampleRecognitionSource.extract(b"jpeg").await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        for key in [
            "plate",
            "driverName",
            "driverTaxId",
            "timestamp",
            "location",
            "description",
            "infractionCode",
        ] {
            assert!(value.get(key).is_some(), "missing {}", key);
        }
    }

    #[tokio::test]
    async fn test_empty_image_is_rejected() {
        assert!(matches!(
            SampleRecognitionSource.extract(&[]).await,
            Err(AppError::BadRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_service_is_external_error() {
        let source = HttpRecognitionSource::new("http://127.0.0.1:9/recognize", Duration::from_secs(2)).unwrap();
        assert!(matches!(source.extract(b"jpeg").await, Err(AppError::ExternalApi(_))));
    }
}
