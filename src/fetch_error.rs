#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Station {station_id} feed returned HTTP {status}")]
    HttpStatus { station_id: String, status: u16 },
    #[error("Invalid station id: {0}")]
    InvalidStationId(String),
}
