use crate::suite::{Outcome, SuiteReport};
use anyhow::{Context, Result};
use prometheus::{Encoder, IntGauge, IntGaugeVec, GaugeVec, Opts, Registry, TextEncoder};
use std::path::Path;
use std::sync::Arc;

pub struct MetricsRegistry {
    registry: Registry,
    collector: Arc<MetricsCollector>,
}

impl MetricsRegistry {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();
        let collector = Arc::new(MetricsCollector::new(&registry)?);

        Ok(Self {
            registry,
            collector,
        })
    }

    pub fn collector(&self) -> Arc<MetricsCollector> {
        self.collector.clone()
    }

    pub fn gather(&self) -> Result<Vec<u8>> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(buffer)
    }

    /// Writes the exposition next to `path` and renames it into place so the
    /// textfile collector never reads a partial file.
    pub async fn write_textfile<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let tmp = path.with_extension("prom.tmp");

        tokio::fs::write(&tmp, self.gather()?)
            .await
            .with_context(|| format!("Failed to write {}", tmp.display()))?;
        tokio::fs::rename(&tmp, path)
            .await
            .with_context(|| format!("Failed to move metrics into {}", path.display()))?;

        tracing::info!("Metrics written to {}", path.display());
        Ok(())
    }
}

pub struct MetricsCollector {
    // Per-check metrics
    pub check_status: IntGaugeVec,
    pub check_duration_seconds: GaugeVec,

    // Run metrics
    pub checks_total: IntGaugeVec,
    pub last_run_timestamp_seconds: IntGauge,
    pub last_run_success: IntGauge,
}

impl MetricsCollector {
    pub fn new(registry: &Registry) -> Result<Self> {
        let check_status = IntGaugeVec::new(
            Opts::new(
                "foreman_healthcheck_check_status",
                "Outcome of each check in the last run (1 for the reported outcome, 0 otherwise)",
            ),
            &["check", "outcome"],
        )?;
        registry.register(Box::new(check_status.clone()))?;

        let check_duration_seconds = GaugeVec::new(
            Opts::new(
                "foreman_healthcheck_check_duration_seconds",
                "Time spent on each check in the last run",
            ),
            &["check"],
        )?;
        registry.register(Box::new(check_duration_seconds.clone()))?;

        let checks_total = IntGaugeVec::new(
            Opts::new(
                "foreman_healthcheck_checks_total",
                "Number of checks per outcome in the last run",
            ),
            &["outcome"],
        )?;
        registry.register(Box::new(checks_total.clone()))?;

        let last_run_timestamp_seconds = IntGauge::new(
            "foreman_healthcheck_last_run_timestamp_seconds",
            "Unix time the last run finished",
        )?;
        registry.register(Box::new(last_run_timestamp_seconds.clone()))?;

        let last_run_success = IntGauge::new(
            "foreman_healthcheck_last_run_success",
            "Whether the last run succeeded (1=success, 0=failure)",
        )?;
        registry.register(Box::new(last_run_success.clone()))?;

        Ok(Self {
            check_status,
            check_duration_seconds,
            checks_total,
            last_run_timestamp_seconds,
            last_run_success,
        })
    }

    pub fn record_report(&self, report: &SuiteReport) {
        for result in &report.results {
            for outcome in Outcome::ALL {
                let value = if outcome == result.outcome { 1 } else { 0 };
                self.check_status
                    .with_label_values(&[result.check.as_str(), outcome.as_str()])
                    .set(value);
            }

            self.check_duration_seconds
                .with_label_values(&[result.check.as_str()])
                .set(result.duration_ms as f64 / 1000.0);
        }

        let summary = report.summary();
        for outcome in Outcome::ALL {
            self.checks_total
                .with_label_values(&[outcome.as_str()])
                .set(summary.count(outcome) as i64);
        }

        self.last_run_timestamp_seconds
            .set(report.finished_at.timestamp());
        self.last_run_success
            .set(if report.is_success() { 1 } else { 0 });
    }
}
