use crate::report::ScenarioReport;
use moai_domain::DomainError;
use moai_protocols::ProtocolError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("Invalid configuration for {key}: {reason}")]
    Config { key: &'static str, reason: String },
    #[error("Failed to load wallet from {path}: {reason}")]
    Wallet { path: PathBuf, reason: String },
    #[error("Step '{step}' failed: {detail}")]
    Assertion { step: String, detail: String },
    #[error("Step '{step}' failed: {source}")]
    Step {
        step: String,
        source: Box<ScenarioError>,
    },
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl ScenarioError {
    pub fn assertion(step: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Assertion {
            step: step.into(),
            detail: detail.into(),
        }
    }

    /// Attributes the error to `step` unless it already names one.
    pub fn in_step(self, step: impl Into<String>) -> Self {
        match self {
            Self::Assertion { .. } | Self::Step { .. } => self,
            other => Self::Step {
                step: step.into(),
                source: Box::new(other),
            },
        }
    }

    /// Step the error was raised in, if known.
    pub fn step(&self) -> Option<&str> {
        match self {
            Self::Assertion { step, .. } | Self::Step { step, .. } => Some(step),
            _ => None,
        }
    }

    /// Error message without the step prefix.
    pub fn detail(&self) -> String {
        match self {
            Self::Assertion { detail, .. } => detail.clone(),
            Self::Step { source, .. } => source.to_string(),
            other => other.to_string(),
        }
    }
}

/// A scenario stopped by a failing step. The report holds every step
/// recorded up to and including the failure.
#[derive(Debug, Error)]
#[error("{} scenario failed: {source}", .report.scenario)]
pub struct ScenarioFailure {
    pub report: ScenarioReport,
    pub source: ScenarioError,
}

/// Fails `step` unless `expected == actual`.
pub fn ensure_eq<T: PartialEq + std::fmt::Debug>(
    step: &str,
    what: &str,
    expected: T,
    actual: T,
) -> Result<(), ScenarioError> {
    if expected == actual {
        Ok(())
    } else {
        Err(ScenarioError::assertion(
            step,
            format!("{what}: expected {expected:?}, got {actual:?}"),
        ))
    }
}
