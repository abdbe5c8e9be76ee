/// Typed rows of an NDBC real-time feed.
///
/// Every feed column has a variant in [`BuoyColumn`], listed in feed order in
/// [`BuoyColumn::ALL`]. Code that needs "a column by name" goes through the
/// enum instead of string lookups so a typo is a compile error rather than a
/// silently missing column.
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One observation row. `None` is the "no data" marker.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BuoyReading {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub day: Option<u32>,
    pub hour: Option<u32>,
    pub minute: Option<u32>,
    /// Degrees true, direction the wind is coming from.
    pub wind_direction_deg: Option<f64>,
    pub wind_speed_ms: Option<f64>,
    pub wind_gust_ms: Option<f64>,
    pub wave_height_m: Option<f64>,
    pub dominant_wave_period_s: Option<f64>,
    pub average_wave_period_s: Option<f64>,
    pub mean_wave_direction_deg: Option<f64>,
    pub pressure_hpa: Option<f64>,
    pub air_temp_c: Option<f64>,
    pub water_temp_c: Option<f64>,
    pub dew_point_c: Option<f64>,
    pub visibility_nmi: Option<f64>,
    pub pressure_tendency_hpa: Option<f64>,
    pub tide_ft: Option<f64>,
}

impl BuoyReading {
    /// Observation time in UTC, if every date field is present and valid.
    ///
    /// Older feeds carry two-digit years; those are taken as 20xx.
    pub fn observed_at(&self) -> Option<DateTime<Utc>> {
        let year = match self.year? {
            y if (0..100).contains(&y) => 2000 + y,
            y => y,
        };
        let naive = NaiveDate::from_ymd_opt(year, self.month?, self.day?)?
            .and_hms_opt(self.hour?, self.minute?, 0)?;
        Some(DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc))
    }

    /// All 19 values in feed column order.
    pub fn values(&self) -> [Option<f64>; 19] {
        BuoyColumn::ALL.map(|column| column.value(self))
    }
}

/// The 19 columns of the feed, in header order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum BuoyColumn {
    Year,
    Month,
    Day,
    Hour,
    Minute,
    WindDirection,
    WindSpeed,
    WindGust,
    WaveHeight,
    DominantWavePeriod,
    AverageWavePeriod,
    MeanWaveDirection,
    Pressure,
    AirTemperature,
    WaterTemperature,
    DewPoint,
    Visibility,
    PressureTendency,
    Tide,
}

impl BuoyColumn {
    pub const ALL: [BuoyColumn; 19] = [
        BuoyColumn::Year,
        BuoyColumn::Month,
        BuoyColumn::Day,
        BuoyColumn::Hour,
        BuoyColumn::Minute,
        BuoyColumn::WindDirection,
        BuoyColumn::WindSpeed,
        BuoyColumn::WindGust,
        BuoyColumn::WaveHeight,
        BuoyColumn::DominantWavePeriod,
        BuoyColumn::AverageWavePeriod,
        BuoyColumn::MeanWaveDirection,
        BuoyColumn::Pressure,
        BuoyColumn::AirTemperature,
        BuoyColumn::WaterTemperature,
        BuoyColumn::DewPoint,
        BuoyColumn::Visibility,
        BuoyColumn::PressureTendency,
        BuoyColumn::Tide,
    ];

    /// Column name as it appears in the feed header (without the leading `#`).
    pub fn header(self) -> &'static str {
        match self {
            BuoyColumn::Year => "YY",
            BuoyColumn::Month => "MM",
            BuoyColumn::Day => "DD",
            BuoyColumn::Hour => "hh",
            BuoyColumn::Minute => "mm",
            BuoyColumn::WindDirection => "WDIR",
            BuoyColumn::WindSpeed => "WSPD",
            BuoyColumn::WindGust => "GST",
            BuoyColumn::WaveHeight => "WVHT",
            BuoyColumn::DominantWavePeriod => "DPD",
            BuoyColumn::AverageWavePeriod => "APD",
            BuoyColumn::MeanWaveDirection => "MWD",
            BuoyColumn::Pressure => "PRES",
            BuoyColumn::AirTemperature => "ATMP",
            BuoyColumn::WaterTemperature => "WTMP",
            BuoyColumn::DewPoint => "DEWP",
            BuoyColumn::Visibility => "VIS",
            BuoyColumn::PressureTendency => "PTDY",
            BuoyColumn::Tide => "TIDE",
        }
    }

    pub fn from_header(header: &str) -> Option<BuoyColumn> {
        let header = header.trim().trim_start_matches('#');
        BuoyColumn::ALL.into_iter().find(|c| c.header() == header)
    }

    /// Date and time columns hold whole numbers.
    pub fn is_integral(self) -> bool {
        matches!(
            self,
            BuoyColumn::Year
                | BuoyColumn::Month
                | BuoyColumn::Day
                | BuoyColumn::Hour
                | BuoyColumn::Minute
        )
    }

    /// Value of this column in `reading`, widened to `f64`.
    pub fn value(self, reading: &BuoyReading) -> Option<f64> {
        match self {
            BuoyColumn::Year => reading.year.map(f64::from),
            BuoyColumn::Month => reading.month.map(f64::from),
            BuoyColumn::Day => reading.day.map(f64::from),
            BuoyColumn::Hour => reading.hour.map(f64::from),
            BuoyColumn::Minute => reading.minute.map(f64::from),
            BuoyColumn::WindDirection => reading.wind_direction_deg,
            BuoyColumn::WindSpeed => reading.wind_speed_ms,
            BuoyColumn::WindGust => reading.wind_gust_ms,
            BuoyColumn::WaveHeight => reading.wave_height_m,
            BuoyColumn::DominantWavePeriod => reading.dominant_wave_period_s,
            BuoyColumn::AverageWavePeriod => reading.average_wave_period_s,
            BuoyColumn::MeanWaveDirection => reading.mean_wave_direction_deg,
            BuoyColumn::Pressure => reading.pressure_hpa,
            BuoyColumn::AirTemperature => reading.air_temp_c,
            BuoyColumn::WaterTemperature => reading.water_temp_c,
            BuoyColumn::DewPoint => reading.dew_point_c,
            BuoyColumn::Visibility => reading.visibility_nmi,
            BuoyColumn::PressureTendency => reading.pressure_tendency_hpa,
            BuoyColumn::Tide => reading.tide_ft,
        }
    }

    /// Stores `value` into this column of `reading`.
    ///
    /// Date and time columns only keep whole numbers (and month, day, hour,
    /// minute must be non-negative); anything else is stored as missing.
    pub fn set(self, reading: &mut BuoyReading, value: Option<f64>) {
        match self {
            BuoyColumn::Year => reading.year = value.and_then(whole_i32),
            BuoyColumn::Month => reading.month = value.and_then(whole_u32),
            BuoyColumn::Day => reading.day = value.and_then(whole_u32),
            BuoyColumn::Hour => reading.hour = value.and_then(whole_u32),
            BuoyColumn::Minute => reading.minute = value.and_then(whole_u32),
            BuoyColumn::WindDirection => reading.wind_direction_deg = value,
            BuoyColumn::WindSpeed => reading.wind_speed_ms = value,
            BuoyColumn::WindGust => reading.wind_gust_ms = value,
            BuoyColumn::WaveHeight => reading.wave_height_m = value,
            BuoyColumn::DominantWavePeriod => reading.dominant_wave_period_s = value,
            BuoyColumn::AverageWavePeriod => reading.average_wave_period_s = value,
            BuoyColumn::MeanWaveDirection => reading.mean_wave_direction_deg = value,
            BuoyColumn::Pressure => reading.pressure_hpa = value,
            BuoyColumn::AirTemperature => reading.air_temp_c = value,
            BuoyColumn::WaterTemperature => reading.water_temp_c = value,
            BuoyColumn::DewPoint => reading.dew_point_c = value,
            BuoyColumn::Visibility => reading.visibility_nmi = value,
            BuoyColumn::PressureTendency => reading.pressure_tendency_hpa = value,
            BuoyColumn::Tide => reading.tide_ft = value,
        }
    }

    /// Formats this column of `reading` for tabular output: integers without
    /// a fractional part, missing values as an empty string.
    pub fn format(self, reading: &BuoyReading) -> String {
        match self.value(reading) {
            None => String::new(),
            Some(v) if self.is_integral() => format!("{}", v as i64),
            Some(v) => v.to_string(),
        }
    }

    /// NDBC's documented "no data" sentinel for this column, if it has one.
    pub fn sentinel(self) -> Option<f64> {
        match self {
            BuoyColumn::WindDirection | BuoyColumn::MeanWaveDirection => Some(999.0),
            BuoyColumn::WindSpeed
            | BuoyColumn::WindGust
            | BuoyColumn::WaveHeight
            | BuoyColumn::DominantWavePeriod
            | BuoyColumn::AverageWavePeriod
            | BuoyColumn::Visibility
            | BuoyColumn::Tide => Some(99.0),
            BuoyColumn::Pressure => Some(9999.0),
            BuoyColumn::AirTemperature | BuoyColumn::WaterTemperature | BuoyColumn::DewPoint => {
                Some(999.0)
            }
            _ => None,
        }
    }
}

fn whole_i32(value: f64) -> Option<i32> {
    if value.is_finite() && value.fract() == 0.0 && value.abs() <= i32::MAX as f64 {
        Some(value as i32)
    } else {
        None
    }
}

fn whole_u32(value: f64) -> Option<u32> {
    if value.is_finite() && value.fract() == 0.0 && (0.0..=u32::MAX as f64).contains(&value) {
        Some(value as u32)
    } else {
        None
    }
}
