// CSV export tests that go through real files

mod common;

use flowcast_service::assessment::assess_risk;
use flowcast_service::buoy::{BuoyColumn, FeedParser};
use flowcast_service::export::{read_readings_csv, write_assessment_csv, write_readings_csv};
use flowcast_service::water_quality::read_samples;
use std::fs::File;
use tempfile::TempDir;

use common::{identity_odo_model, FEED_ROWS, FEED_TEXT, SAMPLE_CSV};

#[test]
fn test_readings_file_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("41122.csv");
    let readings = FeedParser::new().parse(FEED_TEXT);

    write_readings_csv(&readings, File::create(&path).unwrap()).unwrap();
    let restored = read_readings_csv(File::open(&path).unwrap()).unwrap();

    assert_eq!(restored.len(), FEED_ROWS);
    assert_eq!(restored, readings);

    let header = std::fs::read_to_string(&path).unwrap();
    let header = header.lines().next().unwrap();
    let expected: Vec<&str> = BuoyColumn::ALL.iter().map(|c| c.header()).collect();
    assert_eq!(header, expected.join(","));
}

#[test]
fn test_reordered_subset_is_accepted() {
    let csv = "WTMP,YY,WDIR\n26.4,2024,180\n,2024,\n";
    let readings = read_readings_csv(csv.as_bytes()).unwrap();

    assert_eq!(readings.len(), 2);
    assert_eq!(readings[0].water_temp_c, Some(26.4));
    assert_eq!(readings[0].year, Some(2024));
    assert_eq!(readings[0].wind_direction_deg, Some(180.0));
    assert_eq!(readings[1].water_temp_c, None);
    assert_eq!(readings[1].tide_ft, None);
}

#[test]
fn test_assessment_file_export() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("assessment.csv");
    let table = read_samples(SAMPLE_CSV).unwrap();
    let assessment = assess_risk(&identity_odo_model(), &table.samples).unwrap();

    write_assessment_csv(&assessment.rows, File::create(&path).unwrap()).unwrap();

    let mut reader = csv::Reader::from_path(&path).unwrap();
    let headers = reader.headers().unwrap().clone();
    assert_eq!(&headers[6], "Predicted ODO mg/L");
    assert_eq!(&headers[7], "Risk Level");

    let levels: Vec<String> = reader
        .records()
        .map(|r| r.unwrap()[7].to_string())
        .collect();
    assert_eq!(levels, vec!["Low", "High", "Moderate"]);
}
