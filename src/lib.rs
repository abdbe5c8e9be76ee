pub mod api;
pub mod assessment;
pub mod buoy;
pub mod config;
pub mod export;
pub mod fetch_error;
pub mod fetcher;
pub mod prediction;
pub mod risk;
pub mod services;
pub mod session;
pub mod stations;
pub mod utils;
pub mod water_quality;
