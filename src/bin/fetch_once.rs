//! One-shot fetch of a county's pollen risks, printed to stdout.
//!
//! Usage: `cargo run --bin fetch_once -- 60`

use pollen_risk_watcher::{CountyCode, PollensClient, RiskScale, RiskSource};

/// Scale label for a level; off-scale levels print the mapping error.
fn describe(scale: &RiskScale, level: u8) -> String {
    scale
        .label(level)
        .map(str::to_string)
        .unwrap_or_else(|e| e.to_string())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_target(false).init();

    let code = std::env::args().nth(1).unwrap_or_else(|| "60".to_string());
    let county: CountyCode = code.parse()?;

    let client = PollensClient::new(reqwest::Client::new());
    let dataset = client.fetch(&county).await?;
    let scale = RiskScale::default();

    println!("{} ({})", dataset.county_name, dataset.county_code);
    println!(
        "aggregate: {} ({})",
        dataset.aggregate_level,
        describe(&scale, dataset.aggregate_level)
    );
    for (name, level) in &dataset.pollen_levels {
        println!("  {name}: {level} ({})", describe(&scale, *level));
    }
    Ok(())
}
