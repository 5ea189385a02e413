use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Passed,
    /// The target answered but is unhealthy.
    Failed,
    /// The probe or the payload itself was broken.
    Errored,
    ExpectedFailure,
    UnexpectedPass,
}

impl Outcome {
    pub const ALL: [Outcome; 5] = [
        Outcome::Passed,
        Outcome::Failed,
        Outcome::Errored,
        Outcome::ExpectedFailure,
        Outcome::UnexpectedPass,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Passed => "PASSED",
            Outcome::Failed => "FAILED",
            Outcome::Errored => "ERROR",
            Outcome::ExpectedFailure => "XFAIL",
            Outcome::UnexpectedPass => "XPASS",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Passed => "passed",
            Outcome::Failed => "failed",
            Outcome::Errored => "errored",
            Outcome::ExpectedFailure => "expected_failure",
            Outcome::UnexpectedPass => "unexpected_pass",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckResult {
    pub check: String,
    pub outcome: Outcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub passed: usize,
    pub failed: usize,
    pub errored: usize,
    pub expected_failures: usize,
    pub unexpected_passes: usize,
}

impl Summary {
    pub fn count(&self, outcome: Outcome) -> usize {
        match outcome {
            Outcome::Passed => self.passed,
            Outcome::Failed => self.failed,
            Outcome::Errored => self.errored,
            Outcome::ExpectedFailure => self.expected_failures,
            Outcome::UnexpectedPass => self.unexpected_passes,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SuiteReport {
    pub target: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Unexpected passes fail the run.
    pub strict: bool,
    pub results: Vec<CheckResult>,
}

impl SuiteReport {
    pub fn summary(&self) -> Summary {
        let mut summary = Summary::default();
        for result in &self.results {
            match result.outcome {
                Outcome::Passed => summary.passed += 1,
                Outcome::Failed => summary.failed += 1,
                Outcome::Errored => summary.errored += 1,
                Outcome::ExpectedFailure => summary.expected_failures += 1,
                Outcome::UnexpectedPass => summary.unexpected_passes += 1,
            }
        }
        summary
    }

    pub fn is_success(&self) -> bool {
        let summary = self.summary();
        summary.failed == 0 && summary.errored == 0 && !(self.strict && summary.unexpected_passes > 0)
    }

    pub fn outcome_of(&self, check: &str) -> Option<Outcome> {
        self.results
            .iter()
            .find(|r| r.check == check)
            .map(|r| r.outcome)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for SuiteReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "health checks for {}", self.target)?;

        for result in &self.results {
            match &result.message {
                Some(message) => writeln!(f, "{:<6} {} - {}", result.outcome.label(), result.check, message)?,
                None => writeln!(f, "{:<6} {}", result.outcome.label(), result.check)?,
            }
        }

        let summary = self.summary();
        let parts: Vec<String> = [
            (summary.failed, "failed"),
            (summary.errored, "errors"),
            (summary.passed, "passed"),
            (summary.expected_failures, "xfailed"),
            (summary.unexpected_passes, "xpassed"),
        ]
        .iter()
        .filter(|(count, _)| *count > 0)
        .map(|(count, label)| format!("{} {}", count, label))
        .collect();

        let elapsed = (self.finished_at - self.started_at).num_milliseconds() as f64 / 1000.0;
        write!(f, "{} in {:.2}s", parts.join(", "), elapsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(check: &str, outcome: Outcome) -> CheckResult {
        CheckResult {
            check: check.to_string(),
            outcome,
            message: None,
            duration_ms: 1,
        }
    }

    fn report(strict: bool, results: Vec<CheckResult>) -> SuiteReport {
        let now = Utc::now();
        SuiteReport {
            target: "http://localhost:3000/api/v2/ping".to_string(),
            started_at: now,
            finished_at: now,
            strict,
            results,
        }
    }

    #[test]
    fn test_expected_failures_do_not_fail_the_run() {
        let report = report(
            false,
            vec![
                result("foreman_status", Outcome::Passed),
                result("katello_services_status[pulp3]", Outcome::ExpectedFailure),
                result("katello_services_status[pulp3_content]", Outcome::UnexpectedPass),
            ],
        );

        assert!(report.is_success());
        assert_eq!(report.summary().count(Outcome::UnexpectedPass), 1);
    }

    #[test]
    fn test_strict_unexpected_pass_fails_the_run() {
        let report = report(
            true,
            vec![result("katello_services_status[pulp3]", Outcome::UnexpectedPass)],
        );

        assert!(!report.is_success());
    }

    #[test]
    fn test_errors_fail_the_run() {
        let report = report(false, vec![result("foreman_service", Outcome::Errored)]);

        assert!(!report.is_success());
        assert_eq!(report.outcome_of("foreman_service"), Some(Outcome::Errored));
        assert_eq!(report.outcome_of("foreman_port"), None);
    }

    #[test]
    fn test_text_rendering() {
        let mut failed = result("foreman_status", Outcome::Failed);
        failed.message = Some("ping returned HTTP 503, expected 200".to_string());
        let report = report(
            false,
            vec![result("foreman_port", Outcome::Passed), failed],
        );

        let text = report.to_string();

        assert!(text.contains("PASSED foreman_port\n"));
        assert!(text.contains("FAILED foreman_status - ping returned HTTP 503, expected 200"));
        assert!(text.ends_with("1 failed, 1 passed in 0.00s"));
    }

    #[test]
    fn test_json_rendering() {
        let report = report(
            false,
            vec![result("katello_services_status[pulp3]", Outcome::ExpectedFailure)],
        );

        let value: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();

        assert_eq!(value["results"][0]["outcome"], "expected_failure");
        assert!(value["results"][0].get("message").is_none());
    }
}
