use tracing::{debug, error, instrument};

use crate::buoy::{BuoyReading, FeedParser};
use crate::config::DEFAULT_NDBC_BASE_URL;
use crate::fetch_error::FetchError;
use crate::utils;

/// Retrieves NDBC real-time feeds (`<base>/<station_id>.txt`).
///
/// No retries and no timeout beyond the HTTP client default: a failed fetch
/// is reported to the caller as-is.
#[derive(Clone)]
pub struct BuoyFeedFetcher {
    client: reqwest::Client,
    base_url: String,
}

impl BuoyFeedFetcher {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn feed_url(&self, station_id: &str) -> String {
        format!("{}/{}.txt", self.base_url, station_id)
    }

    /// Fetch the raw feed text. Non-success responses are errors and the
    /// body is not returned.
    #[instrument(skip(self), fields(base_url = %self.base_url))]
    pub async fn fetch_feed_text(&self, station_id: &str) -> Result<String, FetchError> {
        let station_id = utils::normalize_station_id(station_id);
        if !utils::is_valid_station_id(&station_id) {
            return Err(FetchError::InvalidStationId(station_id));
        }

        let url = self.feed_url(&station_id);
        debug!("Sending HTTP request to {}", url);
        let response = self.client.get(&url).send().await?;
        let status = response.status();
        debug!("Received HTTP response with status: {}", status);

        if !status.is_success() {
            error!("Feed request for station {} failed with {}", station_id, status);
            return Err(FetchError::HttpStatus {
                station_id,
                status: status.as_u16(),
            });
        }

        let text = response.text().await?;
        debug!("Retrieved feed text, size: {} bytes", text.len());
        Ok(text)
    }

    /// Fetch and parse a station feed.
    pub async fn fetch_readings(
        &self,
        station_id: &str,
        parser: &FeedParser,
    ) -> Result<Vec<BuoyReading>, FetchError> {
        let text = self.fetch_feed_text(station_id).await?;
        Ok(parser.parse(&text))
    }
}

impl Default for BuoyFeedFetcher {
    fn default() -> Self {
        Self::new(DEFAULT_NDBC_BASE_URL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feed_url() {
        let fetcher = BuoyFeedFetcher::new("https://www.ndbc.noaa.gov/data/realtime2/");
        assert_eq!(
            fetcher.feed_url("41122"),
            "https://www.ndbc.noaa.gov/data/realtime2/41122.txt"
        );
    }

    #[test]
    fn test_default_uses_ndbc() {
        let fetcher = BuoyFeedFetcher::default();
        assert!(fetcher.feed_url("46047").starts_with(DEFAULT_NDBC_BASE_URL));
    }

    #[tokio::test]
    async fn test_invalid_station_id_is_rejected_before_request() {
        let fetcher = BuoyFeedFetcher::new("http://127.0.0.1:1");
        let result = fetcher.fetch_feed_text("../x").await;
        assert!(matches!(result, Err(FetchError::InvalidStationId(_))));
    }
}
