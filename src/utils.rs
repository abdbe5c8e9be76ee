/// Shared utility functions for the FlowCast service
use regex::Regex;
use std::sync::LazyLock;

static STATION_ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9]{5}$").expect("valid station id pattern"));

/// Check that a value looks like an NDBC station identifier.
///
/// NDBC ids are five characters: digits for moored buoys ("41122") and
/// letters plus digits for C-MAN stations ("SAUF1").
///
/// # Examples
///
/// ```
/// use flowcast_service::utils::is_valid_station_id;
///
/// assert!(is_valid_station_id("41122"));
/// assert!(is_valid_station_id("SAUF1"));
/// assert!(!is_valid_station_id("4112"));
/// assert!(!is_valid_station_id("../etc"));
/// ```
pub fn is_valid_station_id(value: &str) -> bool {
    STATION_ID_PATTERN.is_match(value)
}

/// Normalize a user-supplied station id: trimmed and upper-cased, as the
/// NDBC file names use.
pub fn normalize_station_id(value: &str) -> String {
    value.trim().to_ascii_uppercase()
}
