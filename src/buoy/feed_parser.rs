/// NDBC real-time feed parser
///
/// Turns the raw text of a `realtime2/<station>.txt` feed into [`BuoyReading`]
/// rows. Parsing is lenient: a cell that does not coerce to a number (NDBC
/// writes `MM` for missing) becomes `None`, and a row with the wrong number of
/// cells is dropped. The parser never fails.
use tracing::{debug, instrument, warn};

use super::reading::{BuoyColumn, BuoyReading};

/// Number of header lines (names, then units) at the top of every feed.
pub const HEADER_LINES: usize = 2;

#[derive(Debug, Clone, Copy, Default)]
pub struct FeedParser {
    normalize_sentinels: bool,
}

impl FeedParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parser that additionally maps NDBC's numeric "no data" sentinels
    /// (`99.0`, `999`, `9999.0`, per column) to missing.
    pub fn with_sentinel_normalization() -> Self {
        Self {
            normalize_sentinels: true,
        }
    }

    pub fn normalizes_sentinels(&self) -> bool {
        self.normalize_sentinels
    }

    /// Parse a complete feed. Rows keep feed order (most recent first).
    #[instrument(skip(self, text), fields(text_size = text.len(), normalize_sentinels = self.normalize_sentinels))]
    pub fn parse(&self, text: &str) -> Vec<BuoyReading> {
        let mut readings = Vec::new();
        let mut row_count = 0;
        let mut dropped_rows = 0;

        for line in text.lines().skip(HEADER_LINES) {
            if line.trim().is_empty() {
                continue;
            }
            row_count += 1;

            match self.parse_row(line) {
                Some(reading) => readings.push(reading),
                None => {
                    debug!("Row {} has wrong column count, dropping: {}", row_count, line);
                    dropped_rows += 1;
                }
            }
        }

        if dropped_rows > 0 {
            warn!("Dropped {} malformed rows out of {}", dropped_rows, row_count);
        }
        debug!("Parsed {} readings from {} rows", readings.len(), row_count);

        readings
    }

    /// Parse one data row. Returns `None` only when the token count is not
    /// exactly one per column.
    pub fn parse_row(&self, line: &str) -> Option<BuoyReading> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() != BuoyColumn::ALL.len() {
            return None;
        }

        let mut reading = BuoyReading::default();
        for (column, token) in BuoyColumn::ALL.into_iter().zip(tokens) {
            let mut value = coerce(token);
            if self.normalize_sentinels && value.is_some() && value == column.sentinel() {
                value = None;
            }
            column.set(&mut reading, value);
        }
        Some(reading)
    }
}

/// Coerce a feed token to a number; anything unparseable or non-finite is
/// missing.
pub fn coerce(token: &str) -> Option<f64> {
    token.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "#YY  MM DD hh mm WDIR WSPD GST  WVHT   DPD   APD MWD   PRES  ATMP  WTMP  DEWP  VIS PTDY  TIDE\n\
                          #yr  mo dy hr mn degT m/s  m/s     m   sec   sec degT   hPa  degC  degC  degC  nmi  hPa    ft\n";

    fn feed(rows: &[&str]) -> String {
        let mut text = HEADER.to_string();
        for row in rows {
            text.push_str(row);
            text.push('\n');
        }
        text
    }

    #[test]
    fn test_parse_single_row() {
        let text = feed(&["24 10 25 12 30 180 5.0 6.0 1.2 8 7 190 1013 25 26 20 10 0.1 0.5"]);
        let readings = FeedParser::new().parse(&text);

        assert_eq!(readings.len(), 1);
        let reading = &readings[0];
        assert_eq!(reading.year, Some(24));
        assert_eq!(reading.minute, Some(30));
        assert_eq!(reading.wind_direction_deg, Some(180.0));
        assert_eq!(reading.water_temp_c, Some(26.0));
        assert_eq!(reading.tide_ft, Some(0.5));
    }

    #[test]
    fn test_non_numeric_token_becomes_missing() {
        let text = feed(&["24 10 25 12 30 180 5.0 6.0 1.2 8 7 190 1013 25 MM 20 10 0.1 0.5"]);
        let readings = FeedParser::new().parse(&text);

        assert_eq!(readings.len(), 1);
        assert_eq!(readings[0].water_temp_c, None);
        assert_eq!(readings[0].air_temp_c, Some(25.0));
    }

    #[test]
    fn test_row_count_matches_non_blank_lines() {
        let text = feed(&[
            "2024 10 25 12 30 180 5.0 6.0 1.2 8 7 190 1013 25 26 20 10 0.1 0.5",
            "",
            "2024 10 25 12 00 170 4.0 5.0 1.1 8 7 180 1012 25 26 20 10 MM MM",
            "   ",
            "2024 10 25 11 30 MM MM MM MM MM MM MM MM MM MM MM MM MM MM",
        ]);
        let readings = FeedParser::new().parse(&text);

        assert_eq!(readings.len(), 3);
        for reading in &readings {
            assert_eq!(reading.values().len(), 19);
        }
        assert_eq!(readings[0].minute, Some(30));
        assert_eq!(readings[1].minute, Some(0));
        assert_eq!(readings[2].pressure_hpa, None);
    }

    #[test]
    fn test_wrong_length_rows_are_dropped() {
        let text = feed(&[
            "2024 10 25 12 30 180 5.0",
            "2024 10 25 12 00 170 4.0 5.0 1.1 8 7 180 1012 25 26 20 10 0.1 0.5",
            "2024 10 25 12 00 170 4.0 5.0 1.1 8 7 180 1012 25 26 20 10 0.1 0.5 9.9",
        ]);
        let readings = FeedParser::new().parse(&text);

        assert_eq!(readings.len(), 1);
        assert_eq!(readings[0].hour, Some(12));
    }

    #[test]
    fn test_header_only_feed_is_empty() {
        assert!(FeedParser::new().parse(HEADER).is_empty());
        assert!(FeedParser::new().parse("").is_empty());
    }

    #[test]
    fn test_parse_is_idempotent() {
        let text = feed(&[
            "2024 10 25 12 30 180 5.0 6.0 1.2 8 7 190 1013 25 26 20 10 0.1 0.5",
            "2024 10 25 12 00 170 4.0 5.0 1.1 8 7 180 1012 25 MM 20 10 0.1 0.5",
        ]);
        let parser = FeedParser::new();
        assert_eq!(parser.parse(&text), parser.parse(&text));
    }

    #[test]
    fn test_sentinels_kept_by_default() {
        let text = feed(&["2024 10 25 12 30 999 99.0 99.0 99.00 99.00 99.00 999 9999.0 999.0 999.0 999.0 99.0 99.0 99.00"]);
        let reading = &FeedParser::new().parse(&text)[0];

        assert_eq!(reading.wind_direction_deg, Some(999.0));
        assert_eq!(reading.pressure_hpa, Some(9999.0));
        assert_eq!(reading.water_temp_c, Some(999.0));
    }

    #[test]
    fn test_sentinel_normalization() {
        let text = feed(&["2024 10 25 12 30 999 99.0 99.0 99.00 99.00 99.00 999 9999.0 999.0 999.0 999.0 99.0 99.0 99.00"]);
        let parser = FeedParser::with_sentinel_normalization();
        let reading = &parser.parse(&text)[0];

        assert!(parser.normalizes_sentinels());
        assert_eq!(reading.wind_direction_deg, None);
        assert_eq!(reading.wind_speed_ms, None);
        assert_eq!(reading.pressure_hpa, None);
        assert_eq!(reading.water_temp_c, None);
        assert_eq!(reading.tide_ft, None);
        // PTDY has no sentinel; 99.0 is a real (if extreme) tendency
        assert_eq!(reading.pressure_tendency_hpa, Some(99.0));
        assert_eq!(reading.year, Some(2024));
    }

    #[test]
    fn test_coerce() {
        assert_eq!(coerce("26.5"), Some(26.5));
        assert_eq!(coerce("-0.3"), Some(-0.3));
        assert_eq!(coerce("MM"), None);
        assert_eq!(coerce("NaN"), None);
        assert_eq!(coerce(""), None);
    }
}
