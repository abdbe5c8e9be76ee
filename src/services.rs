pub mod buoy_service;
pub mod risk_service;

pub use buoy_service::BuoyService;
pub use risk_service::RiskService;

use thiserror::Error;

use crate::export::ExportError;
use crate::fetch_error::FetchError;
use crate::prediction::ModelError;
use crate::water_quality::ValidationError;

/// Errors surfaced by the service layer to the API and binaries.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error("Unknown station: {0}")]
    UnknownStation(String),

    #[error("No station selected for session {0}")]
    NoStationSelected(String),
}
