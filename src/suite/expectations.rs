use super::report::Outcome;
use crate::config::ExpectedFailureConfig;
use crate::health::CheckError;
use std::collections::HashMap;

/// Checks known to fail, keyed by check id, with the reason they fail.
#[derive(Debug, Clone, Default)]
pub struct Expectations {
    reasons: HashMap<String, String>,
}

impl Expectations {
    pub fn new(entries: &[ExpectedFailureConfig]) -> Self {
        let reasons = entries
            .iter()
            .map(|e| (e.check.clone(), e.reason.clone()))
            .collect();
        Self { reasons }
    }

    pub fn reason_for(&self, check_id: &str) -> Option<&str> {
        self.reasons.get(check_id).map(String::as_str)
    }

    /// Turns the raw result of a check into its reported outcome. For a check
    /// on the list, any failure becomes an expected failure and a pass becomes
    /// an unexpected pass.
    pub fn classify(&self, check_id: &str, result: &Result<(), CheckError>) -> (Outcome, Option<String>) {
        match (self.reason_for(check_id), result) {
            (None, Ok(())) => (Outcome::Passed, None),
            (None, Err(e)) if e.is_assertion() => (Outcome::Failed, Some(e.to_string())),
            (None, Err(e)) => (Outcome::Errored, Some(e.to_string())),
            (Some(reason), Ok(())) => (Outcome::UnexpectedPass, Some(reason.to_string())),
            (Some(reason), Err(e)) => (Outcome::ExpectedFailure, Some(format!("{} ({})", reason, e))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::PayloadError;

    fn pulp() -> Expectations {
        Expectations::new(&[ExpectedFailureConfig {
            check: "katello_services_status[pulp3]".to_string(),
            reason: "Pulp is not yet integrated".to_string(),
        }])
    }

    #[test]
    fn test_unlisted_checks_keep_their_result() {
        let expectations = pulp();
        let id = "katello_services_status[candlepin]";

        assert_eq!(expectations.classify(id, &Ok(())).0, Outcome::Passed);

        let failed = Err(CheckError::Assertion("status is \"FAIL\"".to_string()));
        assert_eq!(expectations.classify(id, &failed).0, Outcome::Failed);

        let errored = Err(CheckError::Payload(PayloadError::Parse("eof".to_string())));
        assert_eq!(expectations.classify(id, &errored).0, Outcome::Errored);
    }

    #[test]
    fn test_listed_failure_is_expected() {
        let failed = Err(CheckError::Assertion("status is \"FAIL\"".to_string()));

        let (outcome, message) = pulp().classify("katello_services_status[pulp3]", &failed);

        assert_eq!(outcome, Outcome::ExpectedFailure);
        assert_eq!(
            message.unwrap(),
            "Pulp is not yet integrated (status is \"FAIL\")"
        );
    }

    #[test]
    fn test_listed_pass_is_surfaced() {
        let (outcome, message) = pulp().classify("katello_services_status[pulp3]", &Ok(()));

        assert_eq!(outcome, Outcome::UnexpectedPass);
        assert_eq!(message.as_deref(), Some("Pulp is not yet integrated"));
    }
}
