use roster_core::{ApiError, ConfigError, DashboardError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Dashboard(#[from] DashboardError),

    #[error("no student with id {0}")]
    NotFound(String),
}
