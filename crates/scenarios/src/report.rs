//! Step reports.

use crate::error::{ScenarioError, ScenarioFailure};
use chrono::{DateTime, Utc};
use prettytable::{Table, row};
use serde::{Deserialize, Serialize};
use solana_sdk::signature::Signature;
use std::fmt;

/// Outcome of a scenario step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepStatus {
    /// Step ran and its assertions held.
    Passed,
    /// Step was not needed, for example the account already existed.
    Skipped,
    /// Step or one of its assertions failed.
    Failed,
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Passed => "passed",
            Self::Skipped => "skipped",
            Self::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// A single scenario step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepRecord {
    /// Step ID.
    pub id: String,
    /// Step name.
    pub name: String,
    pub status: StepStatus,
    /// Signature of the step's transaction, if it sent one.
    pub signature: Option<Signature>,
    pub timestamp: DateTime<Utc>,
    /// Free-form detail such as observed amounts or the failure reason.
    pub detail: Option<String>,
}

impl StepRecord {
    pub fn new(name: impl Into<String>, status: StepStatus) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            status,
            signature: None,
            timestamp: Utc::now(),
            detail: None,
        }
    }

    /// Sets the transaction signature.
    #[must_use]
    pub fn with_signature(mut self, signature: Signature) -> Self {
        self.signature = Some(signature);
        self
    }

    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Steps of one scenario run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScenarioReport {
    /// Run ID.
    pub id: String,
    pub scenario: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub steps: Vec<StepRecord>,
}

impl ScenarioReport {
    pub fn new(scenario: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            scenario: scenario.into(),
            started_at: Utc::now(),
            finished_at: None,
            steps: Vec::new(),
        }
    }

    pub fn push(&mut self, step: StepRecord) {
        self.steps.push(step);
    }

    pub fn passed(&mut self, name: impl Into<String>, signature: Option<Signature>, detail: impl Into<String>) {
        let mut step = StepRecord::new(name, StepStatus::Passed).with_detail(detail);
        step.signature = signature;
        self.push(step);
    }

    pub fn skipped(&mut self, name: impl Into<String>, detail: impl Into<String>) {
        self.push(StepRecord::new(name, StepStatus::Skipped).with_detail(detail));
    }

    pub fn failed(&mut self, name: impl Into<String>, detail: impl Into<String>) {
        self.push(StepRecord::new(name, StepStatus::Failed).with_detail(detail));
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Records `error` as a failed step and closes the report.
    pub fn fail(mut self, error: ScenarioError) -> ScenarioFailure {
        let step = error.step().unwrap_or(&self.scenario).to_string();
        self.failed(step, error.detail());
        self.finish();
        ScenarioFailure {
            report: self,
            source: error,
        }
    }

    /// True when no step failed.
    pub fn is_success(&self) -> bool {
        self.steps.iter().all(|step| step.status != StepStatus::Failed)
    }

    pub fn count(&self, status: StepStatus) -> usize {
        self.steps.iter().filter(|step| step.status == status).count()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn render_table(&self) -> String {
        let mut table = Table::new();
        table.set_titles(row!["#", "Step", "Status", "Signature", "Detail"]);
        for (i, step) in self.steps.iter().enumerate() {
            let signature = step.signature.map(|s| s.to_string()).unwrap_or_default();
            let detail = step.detail.clone().unwrap_or_default();
            table.add_row(row![i + 1, step.name, step.status, signature, detail]);
        }
        table.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_status() {
        let mut report = ScenarioReport::new("moai");
        report.passed("initialize moai", Some(Signature::default()), "moai initialized");
        report.skipped("create meme", "meme 1 exists");
        assert!(report.is_success());
        assert_eq!(report.count(StepStatus::Passed), 1);
        assert_eq!(report.count(StepStatus::Skipped), 1);

        report.failed("mint rock", "balance mismatch");
        assert!(!report.is_success());
        assert_eq!(report.steps[2].status, StepStatus::Failed);
    }

    #[test]
    fn test_fail_records_failing_step() {
        let mut report = ScenarioReport::new("whirlpool");
        report.passed("setup", Some(Signature::default()), "deok mint");

        let failure = report.fail(ScenarioError::assertion("swap 3", "deok received vs estimate: expected 5, got 4"));
        assert!(!failure.report.is_success());
        assert!(failure.report.finished_at.is_some());
        assert_eq!(failure.report.steps.len(), 2);
        let last = &failure.report.steps[1];
        assert_eq!(last.name, "swap 3");
        assert_eq!(last.status, StepStatus::Failed);
        assert_eq!(last.detail.as_deref(), Some("deok received vs estimate: expected 5, got 4"));
        assert!(failure.to_string().starts_with("whirlpool scenario failed: Step 'swap 3' failed"));
        assert!(failure.report.render_table().contains("failed"));
    }

    #[test]
    fn test_fail_without_step_uses_scenario_name() {
        let report = ScenarioReport::new("moai");
        let failure = report.fail(ScenarioError::Config {
            key: "RPC_URL",
            reason: "empty".to_string(),
        });
        assert_eq!(failure.report.steps[0].name, "moai");
        assert_eq!(failure.report.count(StepStatus::Failed), 1);
    }

    #[test]
    fn test_step_builders() {
        let step = StepRecord::new("swap 1", StepStatus::Passed)
            .with_signature(Signature::default())
            .with_detail("received 100");
        assert_eq!(step.signature, Some(Signature::default()));
        assert_eq!(step.detail.as_deref(), Some("received 100"));
        assert_ne!(step.id, StepRecord::new("swap 2", StepStatus::Passed).id);
    }

    #[test]
    fn test_json_round_trip() {
        let mut report = ScenarioReport::new("whirlpool");
        report.passed("open position", None, "ok");
        report.finish();

        let json = report.to_json().unwrap();
        let parsed: ScenarioReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.scenario, "whirlpool");
        assert_eq!(parsed.steps.len(), 1);
        assert_eq!(parsed.steps[0].status, StepStatus::Passed);
        assert!(parsed.finished_at.is_some());
    }

    #[test]
    fn test_render_table() {
        let mut report = ScenarioReport::new("moai");
        report.passed("mint rock", None, "19 ROCK");
        let table = report.render_table();
        assert!(table.contains("mint rock"));
        assert!(table.contains("passed"));
        assert!(table.contains("19 ROCK"));
    }
}
