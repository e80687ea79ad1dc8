pub mod capability;
pub mod types;

pub use capability::{Judge, Repairer};
pub use types::{LoopTerminal, SanitizationOutcome, ValidationReport, ValidationSettings, ValidationVerdict};

#[cfg(test)]
pub use capability::{MockJudge, MockRepairer};

use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Bounded judge/repair controller.
///
/// The data is judged once. While the verdict is negative, sanitizing is
/// enabled and repair rounds remain, the repairer replaces the whole data
/// value and the result is judged again. Every round advances the counter,
/// including rounds whose repair call failed.
#[derive(Clone)]
pub struct ValidationLoop {
    judge: Arc<dyn Judge>,
    repairer: Arc<dyn Repairer>,
    settings: ValidationSettings,
}

impl ValidationLoop {
    pub fn new(judge: Arc<dyn Judge>, repairer: Arc<dyn Repairer>, settings: ValidationSettings) -> Self {
        Self {
            judge,
            repairer,
            settings,
        }
    }

    pub fn settings(&self) -> &ValidationSettings {
        &self.settings
    }

    #[instrument(skip_all, fields(max_attempts = self.settings.max_attempts, sanitize = self.settings.sanitize))]
    pub async fn run(&self, data: Value, schema_description: &str) -> ValidationReport {
        let mut current = data;
        let mut attempts = 0;
        let mut changes = Vec::new();
        let mut verdict = self.judge(&current, schema_description).await;

        loop {
            if verdict.is_valid {
                info!(repair_rounds = attempts, "Data accepted");
                return ValidationReport {
                    terminal: LoopTerminal::Accepted,
                    verdict,
                    data: current,
                    repair_rounds: attempts,
                    changes,
                };
            }

            if !self.settings.sanitize || attempts >= self.settings.max_attempts {
                info!(repair_rounds = attempts, issues = verdict.issues.len(), "Data rejected");
                return ValidationReport {
                    terminal: LoopTerminal::RejectedFinal,
                    verdict,
                    data: current,
                    repair_rounds: attempts,
                    changes,
                };
            }

            attempts += 1;
            debug!(round = attempts, issues = ?verdict.issues, "Requesting repair");

            match self.repairer.repair(&current, schema_description, &verdict.issues).await {
                Ok(outcome) if !outcome.sanitized_data.is_null() => {
                    current = outcome.sanitized_data;
                    changes.extend(outcome.changes_applied);
                    verdict = self.judge(&current, schema_description).await;
                }
                Ok(_) => {
                    let issue = "Failed to sanitize: repair returned no data".to_string();
                    warn!(round = attempts, "Repair returned no data, keeping current data");
                    changes.push(issue.clone());
                    verdict = ValidationVerdict::invalid(vec![issue]);
                }
                Err(e) => {
                    let issue = format!("Failed to sanitize: {e}");
                    warn!(round = attempts, error = %e, "Repair failed, keeping current data");
                    changes.push(issue.clone());
                    verdict = ValidationVerdict::invalid(vec![issue]);
                }
            }
        }
    }

    async fn judge(&self, data: &Value, schema_description: &str) -> ValidationVerdict {
        match self.judge.judge(data, schema_description).await {
            Ok(verdict) => verdict,
            Err(e) => {
                warn!(error = %e, "Judge failed, treating round as invalid");
                ValidationVerdict::invalid(vec![format!("Validation failed: {e}")])
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::CapabilityError;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const SCHEMA: &str = "reviews[] = { rating: number (1-5) }";

    fn run_loop(judge: MockJudge, repairer: MockRepairer, settings: ValidationSettings) -> ValidationLoop {
        ValidationLoop::new(Arc::new(judge), Arc::new(repairer), settings)
    }

    #[tokio::test]
    async fn test_valid_data_is_accepted_without_repair() {
        let mut judge = MockJudge::new();
        judge.expect_judge().times(1).returning(|_, _| Ok(ValidationVerdict::valid()));
        let mut repairer = MockRepairer::new();
        repairer.expect_repair().never();

        let data = json!({ "reviews": [{ "rating": 4 }] });
        let report = run_loop(judge, repairer, ValidationSettings::default())
            .run(data.clone(), SCHEMA)
            .await;

        assert_eq!(report.terminal, LoopTerminal::Accepted);
        assert_eq!(report.data, data);
        assert_eq!(report.repair_rounds, 0);
    }

    #[tokio::test]
    async fn test_always_invalid_stops_after_max_attempts() {
        let judge_calls = Arc::new(AtomicUsize::new(0));
        let counter = judge_calls.clone();
        let mut judge = MockJudge::new();
        judge.expect_judge().returning(move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(ValidationVerdict::invalid(vec!["still wrong".to_string()]))
        });
        let mut repairer = MockRepairer::new();
        repairer.expect_repair().times(3).returning(|data, _, _| {
            Ok(SanitizationOutcome {
                sanitized_data: data.clone(),
                changes_applied: vec!["touched".to_string()],
            })
        });

        let report = run_loop(judge, repairer, ValidationSettings::new(true, 3))
            .run(json!({ "rating": 40 }), SCHEMA)
            .await;

        assert_eq!(report.terminal, LoopTerminal::RejectedFinal);
        assert!(!report.verdict.is_valid);
        assert_eq!(report.repair_rounds, 3);
        assert_eq!(judge_calls.load(Ordering::SeqCst), 4);
        assert_eq!(report.changes.len(), 3);
    }

    #[tokio::test]
    async fn test_single_repair_round_fixes_rating() {
        let mut judge = MockJudge::new();
        judge.expect_judge().times(2).returning(|data, _| {
            if data["reviews"][0]["rating"] == json!(40) {
                Ok(ValidationVerdict::invalid(vec!["rating should be 1-5".to_string()]))
            } else {
                Ok(ValidationVerdict::valid())
            }
        });
        let mut repairer = MockRepairer::new();
        repairer
            .expect_repair()
            .withf(|_, _, issues| issues == ["rating should be 1-5".to_string()])
            .times(1)
            .returning(|_, _, _| {
                Ok(SanitizationOutcome {
                    sanitized_data: json!({ "reviews": [{ "username": "Marie L.", "rating": 4 }] }),
                    changes_applied: vec!["clamped rating".to_string()],
                })
            });

        let report = run_loop(judge, repairer, ValidationSettings::new(true, 3))
            .run(json!({ "reviews": [{ "username": "Marie L.", "rating": 40 }] }), SCHEMA)
            .await;

        assert_eq!(report.terminal, LoopTerminal::Accepted);
        assert_eq!(report.repair_rounds, 1);
        assert_eq!(report.data["reviews"][0]["rating"], json!(4));
        assert_eq!(report.changes, vec!["clamped rating".to_string()]);
    }

    #[tokio::test]
    async fn test_sanitize_disabled_rejects_immediately() {
        let mut judge = MockJudge::new();
        judge
            .expect_judge()
            .times(1)
            .returning(|_, _| Ok(ValidationVerdict::invalid(vec!["missing title".to_string()])));
        let mut repairer = MockRepairer::new();
        repairer.expect_repair().never();

        let data = json!({ "title": null });
        let report = run_loop(judge, repairer, ValidationSettings::new(false, 3))
            .run(data.clone(), SCHEMA)
            .await;

        assert_eq!(report.terminal, LoopTerminal::RejectedFinal);
        assert_eq!(report.verdict.issues, vec!["missing title".to_string()]);
        assert_eq!(report.data, data);
    }

    #[tokio::test]
    async fn test_zero_attempts_never_repairs() {
        let mut judge = MockJudge::new();
        judge
            .expect_judge()
            .times(1)
            .returning(|_, _| Ok(ValidationVerdict::invalid(vec!["bad".to_string()])));
        let mut repairer = MockRepairer::new();
        repairer.expect_repair().never();

        let report = run_loop(judge, repairer, ValidationSettings::new(true, 0))
            .run(json!({}), SCHEMA)
            .await;

        assert_eq!(report.terminal, LoopTerminal::RejectedFinal);
        assert_eq!(report.repair_rounds, 0);
    }

    #[tokio::test]
    async fn test_judge_failure_becomes_synthetic_issue() {
        let mut judge = MockJudge::new();
        judge
            .expect_judge()
            .returning(|_, _| Err(CapabilityError::Unavailable("timeout".to_string())));
        let mut repairer = MockRepairer::new();
        repairer.expect_repair().never();

        let report = run_loop(judge, repairer, ValidationSettings::new(false, 1))
            .run(json!({ "rating": 4 }), SCHEMA)
            .await;

        assert_eq!(report.terminal, LoopTerminal::RejectedFinal);
        assert_eq!(
            report.verdict.issues,
            vec!["Validation failed: capability unavailable: timeout".to_string()]
        );
    }

    #[tokio::test]
    async fn test_repair_failure_keeps_data_and_still_terminates() {
        let mut judge = MockJudge::new();
        judge
            .expect_judge()
            .times(1)
            .returning(|_, _| Ok(ValidationVerdict::invalid(vec!["rating should be 1-5".to_string()])));
        let mut repairer = MockRepairer::new();
        repairer
            .expect_repair()
            .times(2)
            .returning(|_, _, _| Err(CapabilityError::MalformedResponse("not json".to_string())));

        let data = json!({ "rating": 40 });
        let report = run_loop(judge, repairer, ValidationSettings::new(true, 2))
            .run(data.clone(), SCHEMA)
            .await;

        assert_eq!(report.terminal, LoopTerminal::RejectedFinal);
        assert_eq!(report.repair_rounds, 2);
        assert_eq!(report.data, data);
        assert_eq!(
            report.verdict.issues,
            vec!["Failed to sanitize: malformed response: not json".to_string()]
        );
    }

    #[tokio::test]
    async fn test_null_repair_output_is_not_adopted() {
        let mut judge = MockJudge::new();
        judge
            .expect_judge()
            .times(1)
            .returning(|_, _| Ok(ValidationVerdict::invalid(vec!["bad".to_string()])));
        let mut repairer = MockRepairer::new();
        repairer.expect_repair().times(1).returning(|_, _, _| {
            Ok(SanitizationOutcome {
                sanitized_data: Value::Null,
                changes_applied: Vec::new(),
            })
        });

        let data = json!({ "rating": 40 });
        let report = run_loop(judge, repairer, ValidationSettings::new(true, 1))
            .run(data.clone(), SCHEMA)
            .await;

        assert_eq!(report.data, data);
        assert_eq!(report.repair_rounds, 1);
    }
}
