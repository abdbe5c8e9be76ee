use clap::Parser;
use std::fs::{self, File};
use std::path::PathBuf;
use tracing::{info, warn};

use flowcast_service::assessment::assess_risk;
use flowcast_service::export::write_assessment_csv;
use flowcast_service::prediction::LinearModel;
use flowcast_service::risk::RiskLevel;
use flowcast_service::water_quality::read_samples;

#[derive(Parser)]
#[command(name = "assess-risk")]
#[command(about = "Predict dissolved oxygen for a sample table and classify fish-kill risk", long_about = None)]
struct Cli {
    /// Sample table CSV with Depth m, Temp °C, pH and ODO mg/L columns
    input: PathBuf,

    /// ODO model artifact (JSON)
    #[arg(long, env = "ODO_MODEL_PATH", default_value = "models/odo_model.json")]
    model: PathBuf,

    /// Write the assessed table as CSV
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let text = fs::read_to_string(&cli.input)?;
    let table = read_samples(&text)?;
    if table.has_missing_values() {
        warn!("Data contains missing values; those rows will not be classified");
    }
    info!("Read {} samples from {}", table.len(), cli.input.display());

    let model = LinearModel::load(&cli.model)?;
    let assessment = assess_risk(&model, &table.samples)?;

    println!("\n=== Fish Kill Risk ===");
    for level in [RiskLevel::High, RiskLevel::Moderate, RiskLevel::Low] {
        println!("  {:<9} {}", level, assessment.summary.count(level));
    }
    if assessment.summary.unclassified > 0 {
        println!("  {:<9} {}", "Unscored", assessment.summary.unclassified);
    }
    if let Some(mse) = assessment.mean_squared_error {
        println!("Mean squared error vs measured ODO: {mse:.3}");
    }
    println!("\n{}", assessment.message);

    if let Some(path) = &cli.output {
        let file = File::create(path)?;
        write_assessment_csv(&assessment.rows, file)?;
        info!("Wrote {} rows to {}", assessment.rows.len(), path.display());
    }

    Ok(())
}
