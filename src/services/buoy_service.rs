use serde::Serialize;
use tracing::{debug, info, instrument, warn};
use utoipa::ToSchema;

use crate::buoy::{describe, BuoyReading, ColumnStatistics, FeedParser};
use crate::export;
use crate::fetch_error::FetchError;
use crate::fetcher::BuoyFeedFetcher;
use crate::session::RenderContext;
use crate::stations::{self, Region, Station};
use crate::utils;

use super::ServiceError;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StationReadings {
    pub station: Station,
    pub row_count: usize,
    pub readings: Vec<BuoyReading>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StationStatistics {
    pub station: Station,
    pub row_count: usize,
    pub columns: Vec<ColumnStatistics>,
}

#[derive(Clone)]
pub struct BuoyService {
    fetcher: BuoyFeedFetcher,
    parser: FeedParser,
}

impl BuoyService {
    pub fn new(fetcher: BuoyFeedFetcher, parser: FeedParser) -> Self {
        Self { fetcher, parser }
    }

    pub fn regions(&self) -> Vec<Region> {
        stations::regions()
    }

    /// Resolve a station id against the registry.
    ///
    /// A malformed id is a fetch error (never sent upstream); a well-formed id
    /// that is not registered is [`ServiceError::UnknownStation`].
    pub fn station(&self, station_id: &str) -> Result<&'static Station, ServiceError> {
        let station_id = utils::normalize_station_id(station_id);
        if !utils::is_valid_station_id(&station_id) {
            return Err(FetchError::InvalidStationId(station_id).into());
        }
        stations::find_station(&station_id).ok_or_else(|| {
            warn!("Station {} is not in the registry", station_id);
            ServiceError::UnknownStation(station_id)
        })
    }

    /// Resolve a station id within `region`, for ids listed in more than one.
    pub fn station_in_region(
        &self,
        region: &str,
        station_id: &str,
    ) -> Result<&'static Station, ServiceError> {
        let station_id = utils::normalize_station_id(station_id);
        if !utils::is_valid_station_id(&station_id) {
            return Err(FetchError::InvalidStationId(station_id).into());
        }
        stations::find_station_id_in_region(region, &station_id).ok_or_else(|| {
            warn!("Station {} is not registered in {}", station_id, region);
            ServiceError::UnknownStation(format!("{} in region {}", station_id, region))
        })
    }

    /// Fetch and parse the current feed for a registered station.
    #[instrument(skip(self))]
    pub async fn station_readings(&self, station_id: &str) -> Result<StationReadings, ServiceError> {
        let station = self.station(station_id)?;
        self.readings_for(station).await
    }

    async fn readings_for(&self, station: &'static Station) -> Result<StationReadings, ServiceError> {
        let readings = self.fetcher.fetch_readings(station.id, &self.parser).await?;

        info!(
            "Fetched {} readings for station {} ({})",
            readings.len(),
            station.id,
            station.name
        );
        Ok(StationReadings {
            station: station.clone(),
            row_count: readings.len(),
            readings,
        })
    }

    /// The station feed as CSV, header first.
    #[instrument(skip(self))]
    pub async fn station_readings_csv(&self, station_id: &str) -> Result<String, ServiceError> {
        let result = self.station_readings(station_id).await?;
        Ok(export::readings_to_csv(&result.readings)?)
    }

    #[instrument(skip(self))]
    pub async fn station_statistics(&self, station_id: &str) -> Result<StationStatistics, ServiceError> {
        let result = self.station_readings(station_id).await?;
        let columns = describe(&result.readings);
        debug!("Computed statistics for {} columns", columns.len());

        Ok(StationStatistics {
            station: result.station,
            row_count: result.row_count,
            columns,
        })
    }

    /// Record the session's station choice and return the station. With a
    /// region, the id is resolved inside it.
    pub fn select_station(
        &self,
        ctx: &RenderContext,
        station_id: &str,
        region: Option<&str>,
    ) -> Result<&'static Station, ServiceError> {
        let station = match region {
            Some(region) => self.station_in_region(region, station_id)?,
            None => self.station(station_id)?,
        };
        ctx.select_station(station);
        Ok(station)
    }

    /// Readings for whichever station the session last selected.
    #[instrument(skip(self, ctx), fields(session_id = %ctx.session_id))]
    pub async fn session_readings(&self, ctx: &RenderContext) -> Result<StationReadings, ServiceError> {
        let station = ctx.selected_station().ok_or_else(|| {
            debug!("Session {} has no selected station", ctx.session_id);
            ServiceError::NoStationSelected(ctx.session_id.clone())
        })?;
        self.readings_for(station).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> BuoyService {
        BuoyService::new(BuoyFeedFetcher::new("http://127.0.0.1:1"), FeedParser::new())
    }

    #[test]
    fn test_station_lookup_normalizes_id() {
        let station = service().station(" 41122 ").unwrap();
        assert_eq!(station.name, "Hollywood Beach");
    }

    #[test]
    fn test_malformed_station_id() {
        let err = service().station("41/22").unwrap_err();
        assert!(matches!(err, ServiceError::Fetch(FetchError::InvalidStationId(_))));
    }

    #[test]
    fn test_select_station_within_region() {
        use crate::session::{InMemorySessionStore, SessionStore};
        use std::sync::Arc;

        let store: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new());
        let ctx = RenderContext::new("s", store);
        let svc = service();

        let station = svc.select_station(&ctx, "41004", Some("USA-Southeast")).unwrap();
        assert_eq!(station.name, "Charleston, SC");
        assert_eq!(ctx.selected_station().unwrap().region, "USA-Southeast");

        let station = svc.select_station(&ctx, "41004", None).unwrap();
        assert_eq!(station.region, "Atlantic (West)");

        let err = svc.select_station(&ctx, "41004", Some("USA-Southwest")).unwrap_err();
        assert!(matches!(err, ServiceError::UnknownStation(_)));
        assert_eq!(ctx.selected_station().unwrap().region, "Atlantic (West)");
    }

    #[test]
    fn test_unregistered_station_id() {
        let err = service().station("99999").unwrap_err();
        assert!(matches!(err, ServiceError::UnknownStation(id) if id == "99999"));
    }
}
