use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

use flowcast_service::buoy::{describe, BuoyReading, FeedParser};
use flowcast_service::config::DEFAULT_NDBC_BASE_URL;
use flowcast_service::export::write_readings_csv;
use flowcast_service::fetcher::BuoyFeedFetcher;
use flowcast_service::stations::{self, Station};
use flowcast_service::utils::normalize_station_id;

#[derive(Parser)]
#[command(name = "fetch-buoy")]
#[command(about = "Fetch and parse NOAA NDBC real-time buoy feeds", long_about = None)]
struct Cli {
    /// Station id to fetch (e.g., "41122")
    #[arg(long, conflicts_with = "region")]
    station: Option<String>,

    /// Fetch every registered station in this region (e.g., "USA-Southeast")
    #[arg(long)]
    region: Option<String>,

    /// List registered regions and stations, then exit
    #[arg(long)]
    list: bool,

    /// Base URL of the realtime2 feed directory
    #[arg(long, env = "NDBC_BASE_URL", default_value = DEFAULT_NDBC_BASE_URL)]
    base_url: String,

    /// Read NDBC sentinel values (99, 999, 9999) as missing
    #[arg(long, env = "NORMALIZE_SENTINELS")]
    normalize_sentinels: bool,

    /// CSV output: a file for --station, a directory for --region
    #[arg(long)]
    output: Option<PathBuf>,

    /// Print descriptive statistics per column
    #[arg(long)]
    describe: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    if cli.list {
        for region in stations::regions() {
            println!("{}", region.name);
            for station in region.stations {
                println!(
                    "  {}  {:<22} {:>8.3} {:>9.3}",
                    station.id, station.name, station.latitude, station.longitude
                );
            }
        }
        return Ok(());
    }

    let parser = if cli.normalize_sentinels {
        FeedParser::with_sentinel_normalization()
    } else {
        FeedParser::new()
    };
    let fetcher = BuoyFeedFetcher::new(cli.base_url.clone());

    match (&cli.station, &cli.region) {
        (Some(station_id), None) => {
            let readings = fetcher.fetch_readings(station_id, &parser).await?;
            let station_id = normalize_station_id(station_id);
            let station = registered_station(&station_id);
            print_summary(&station_id, station, &readings);
            if cli.describe {
                print_statistics(&readings);
            }
            if let Some(path) = &cli.output {
                write_csv(path, &readings)?;
            }
        }
        (None, Some(region)) => {
            fetch_region(&cli, &fetcher, &parser, region).await?;
        }
        _ => {
            return Err("One of --station, --region or --list is required".into());
        }
    }

    Ok(())
}

async fn fetch_region(
    cli: &Cli,
    fetcher: &BuoyFeedFetcher,
    parser: &FeedParser,
    region: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let members = stations::stations_in_region(region);
    if members.is_empty() {
        return Err(format!(
            "Unknown region '{}'. Valid regions: {}",
            region,
            stations::region_names().join(", ")
        )
        .into());
    }

    if let Some(dir) = &cli.output {
        fs::create_dir_all(dir)?;
    }

    info!("Fetching {} stations in {}", members.len(), region);
    let pb = ProgressBar::new(members.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")?
            .progress_chars("##-"),
    );

    let mut failed = 0;
    let mut fetched = Vec::new();
    for station in members {
        pb.set_message(station.id);
        match fetcher.fetch_readings(station.id, parser).await {
            Ok(readings) => {
                if let Some(dir) = &cli.output {
                    write_csv(&dir.join(format!("{}.csv", station.id)), &readings)?;
                }
                fetched.push((station, readings));
            }
            Err(e) => {
                warn!("Failed to fetch station {}: {}", station.id, e);
                failed += 1;
            }
        }
        pb.inc(1);
    }
    pb.finish_with_message(format!("✓ Fetched {} stations", fetched.len()));

    for (station, readings) in &fetched {
        print_summary(station.id, Some(*station), readings);
        if cli.describe {
            print_statistics(readings);
        }
    }

    if failed > 0 {
        error!("{} of {} stations could not be fetched", failed, failed + fetched.len());
    }
    Ok(())
}

/// Registry entry for a CLI-supplied id, matched the way the fetcher sends it.
fn registered_station(station_id: &str) -> Option<&'static Station> {
    stations::find_station(&normalize_station_id(station_id))
}

fn print_summary(station_id: &str, station: Option<&Station>, readings: &[BuoyReading]) {
    let name = station.map(|s| s.name).unwrap_or("unregistered station");
    println!("\n=== {} ({}) ===", station_id, name);
    println!("Rows: {}", readings.len());

    if let Some(latest) = readings.first() {
        if let Some(observed_at) = latest.observed_at() {
            println!("Latest observation: {}", observed_at);
        }
        let show = |label: &str, value: Option<f64>, unit: &str| match value {
            Some(v) => println!("  {label:<18} {v:.1} {unit}"),
            None => println!("  {label:<18} n/a"),
        };
        show("Water temperature", latest.water_temp_c, "°C");
        show("Air temperature", latest.air_temp_c, "°C");
        show("Wind speed", latest.wind_speed_ms, "m/s");
        show("Wave height", latest.wave_height_m, "m");
        show("Pressure", latest.pressure_hpa, "hPa");
    }
}

fn print_statistics(readings: &[BuoyReading]) {
    let fmt = |v: Option<f64>| v.map(|v| format!("{v:.2}")).unwrap_or_else(|| "-".to_string());
    println!(
        "{:<6} {:>6} {:>9} {:>9} {:>9} {:>9} {:>9} {:>9} {:>9}",
        "column", "count", "mean", "std", "min", "25%", "50%", "75%", "max"
    );
    for stats in describe(readings) {
        println!(
            "{:<6} {:>6} {:>9} {:>9} {:>9} {:>9} {:>9} {:>9} {:>9}",
            stats.column,
            stats.count,
            fmt(stats.mean),
            fmt(stats.std),
            fmt(stats.min),
            fmt(stats.p25),
            fmt(stats.median),
            fmt(stats.p75),
            fmt(stats.max)
        );
    }
}

fn write_csv(path: &Path, readings: &[BuoyReading]) -> Result<(), Box<dyn std::error::Error>> {
    let file = File::create(path)?;
    write_readings_csv(readings, file)?;
    info!("Wrote {} rows to {}", readings.len(), path.display());
    Ok(())
}
