use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use dotenvy::dotenv;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use traffic_tickets::config::{DatabaseConfig, EnvironmentConfig};
use traffic_tickets::database;
use traffic_tickets::middleware::cors_for;
use traffic_tickets::routes::create_app_router;
use traffic_tickets::services::{HttpRecognitionSource, RecognitionSource, SampleRecognitionSource};
use traffic_tickets::state::{AppState, Stores};

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    // Configurar logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("🚦 Traffic Tickets - Registro de multas");
    info!("======================================");

    let config = EnvironmentConfig::from_env()?;

    let stores = match &config.database_url {
        Some(url) => {
            let pool = database::connect(&DatabaseConfig::new(url.as_str()))
                .await
                .map_err(|e| {
                    error!("❌ Error conectando a la base de datos: {}", e);
                    anyhow::anyhow!("Error de base de datos: {}", e)
                })?;
            info!("✅ PostgreSQL conectado");
            Stores::postgres(pool)
        }
        None => {
            warn!("⚠️ DATABASE_URL no definida: usando store en memoria (los datos no persisten)");
            Stores::in_memory(&traffic_tickets::repositories::MemoryDatabase::new())
        }
    };

    let recognition: Arc<dyn RecognitionSource> = match &config.recognition_url {
        Some(url) => {
            info!("🤖 Reconocimiento remoto en {}", url);
            Arc::new(HttpRecognitionSource::new(url.as_str(), config.recognition_timeout)?)
        }
        None => {
            info!("🤖 Reconocimiento de ejemplo (sin RECOGNITION_URL)");
            Arc::new(SampleRecognitionSource)
        }
    };

    let app = create_app_router(AppState::new(stores, recognition), cors_for(&config.cors_origins));

    let addr: SocketAddr = config.server_url().parse()?;
    info!("🌐 Servidor iniciando en http://{} ({})", addr, config.environment);
    info!("🔍 Endpoints disponibles:");
    info!("   GET  /health");
    info!("   CRUD /api/vehicles | /api/drivers | /api/infraction-types | /api/officers | /api/tickets");
    info!("   POST /api/tickets/intake - Multa desde extracción JSON");
    info!("   POST /api/tickets/intake/image - Multa desde imagen");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| {
            error!("❌ Error del servidor: {}", e);
            e
        })?;

    info!("👋 Servidor terminado");
    Ok(())
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("❌ No se pudo escuchar Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("❌ No se pudo instalar el handler de SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Señal Ctrl+C recibida, apagando servidor...");
        },
        _ = terminate => {
            info!("🛑 Señal de terminación recibida, apagando servidor...");
        },
    }
}
