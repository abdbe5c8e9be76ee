// Shared fixtures for integration tests.
#![allow(dead_code)]

use flowcast_service::prediction::LinearModel;
use std::path::{Path, PathBuf};

/// Three observations in realtime2 layout, most recent first.
pub const FEED_TEXT: &str = "\
#YY  MM DD hh mm WDIR WSPD GST  WVHT   DPD   APD MWD   PRES  ATMP  WTMP  DEWP  VIS PTDY  TIDE
#yr  mo dy hr mn degT m/s  m/s     m   sec   sec degT   hPa  degC  degC  degC  nmi  hPa    ft
2024 10 25 12 30 180 5.0 6.0 1.2 8 7 190 1013.2 25.1 26.4 20.0 10 0.1 0.5
2024 10 25 12 00 170 4.0 5.0 MM MM MM MM 1012.9 25.0 26.3 19.8 MM -0.3 MM
2024 10 25 11 30 160 3.0 4.0 1.0 7 6 170 1012.5 24.8 MM 19.5 9 MM 0.4
";

pub const FEED_ROWS: usize = 3;

/// Complete sample table: one Low, one High and one Moderate ODO reading.
pub const SAMPLE_CSV: &str = "\
Date (MM/DD/YYYY),Latitude,Longitude,Depth m,Temp °C,pH,ODO mg/L
10/25/2024,25.91,-80.13,1.2,28.4,8.01,6.5
10/25/2024,25.92,-80.14,2.5,28.1,7.95,3.1
11/02/2024,25.93,-80.15,3.0,31.2,6.2,5.0
";

/// ODO model that predicts the measured ODO unchanged.
pub fn identity_odo_model() -> LinearModel {
    LinearModel::new(
        vec!["Depth m".into(), "Temp °C".into(), "pH".into(), "ODO mg/L".into()],
        vec!["ODO mg/L".into()],
        vec![vec![0.0, 0.0, 0.0, 1.0]],
        vec![0.0],
    )
    .expect("valid model")
}

/// Multi-output model that echoes depth, temperature, pH and ODO.
pub fn identity_multi_output_model() -> LinearModel {
    let features: Vec<String> = ["Latitude", "Longitude", "Depth m", "Temp °C", "pH", "ODO mg/L"]
        .into_iter()
        .map(String::from)
        .collect();
    let targets: Vec<String> = features[2..].to_vec();
    let coefficients = (0..targets.len())
        .map(|t| (0..features.len()).map(|f| if f == t + 2 { 1.0 } else { 0.0 }).collect())
        .collect();
    LinearModel::new(features, targets, coefficients, vec![0.0; 4]).expect("valid model")
}

pub fn write_model(dir: &Path, name: &str, model: &LinearModel) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, model.to_json().expect("serializable model")).expect("write model");
    path
}
