use crate::config::ConfigError;
use crate::telemetry::TelemetryError;

/// Process-level error for the API service binary. Workflow errors never reach
/// this type; routers map those to responses case by case.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("telemetry error: {0}")]
    Telemetry(#[from] TelemetryError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("server error: {0}")]
    Server(#[from] axum::Error),
}
