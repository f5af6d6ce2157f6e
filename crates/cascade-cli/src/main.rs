//! cascade-cli - run cascading create/delete scenarios.

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cascade_cli::{run, Args};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cascade_core=info,cascade_cli=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let config = args.into_config();

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        scenarios = config.scenarios.len(),
        fan_out = ?config.cascade.fan_out,
        "starting cascade scenarios"
    );

    let mut reports = Vec::with_capacity(config.scenarios.len());
    for scenario in &config.scenarios {
        match run(*scenario, &config.cascade).await {
            Ok(report) => reports.push(report),
            Err(e) => {
                tracing::error!(scenario = scenario.name(), error = %e, "scenario failed");
                return Err(e.into());
            }
        }
    }

    let output = if config.pretty {
        serde_json::to_string_pretty(&reports)?
    } else {
        serde_json::to_string(&reports)?
    };
    println!("{output}");

    Ok(())
}
