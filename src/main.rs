// src/main.rs
use anyhow::Result;
use foreman_healthcheck::{
    config::{self, Config, ReportFormat},
    metrics::MetricsRegistry,
    suite::HealthSuite,
};
use std::process::ExitCode;
use tracing::info;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    // Logs go to stderr; stdout carries the report
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("foreman_healthcheck=info".parse()?),
        )
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => {
            info!("Loading configuration from: {}", path);
            config::load_config(&path).await?
        }
        None => {
            info!("No configuration file given, using defaults");
            Config::default()
        }
    };

    let suite = HealthSuite::with_systemd(config.clone());
    let report = suite.run().await?;

    match config.report.format {
        ReportFormat::Text => println!("{}", report),
        ReportFormat::Json => println!("{}", report.to_json()?),
    }

    if let Some(path) = &config.metrics.textfile {
        let registry = MetricsRegistry::new()?;
        registry.collector().record_report(&report);
        registry.write_textfile(path).await?;
    }

    Ok(if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
