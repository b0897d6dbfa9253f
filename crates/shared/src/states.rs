use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Reconciliation phase of a resource as seen by the operator.
///
/// Transitions:
/// - New → Handling (reconciler picked up the resource)
/// - Handling → Handled (handler completed)
/// - Handling → Error (handler failed, or a previous attempt was interrupted)
/// - Handled, Error → (terminal, no outgoing transitions)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum OperatorStatus {
    #[default]
    New,
    Handling,
    Handled,
    Error,
}

impl OperatorStatus {
    pub fn can_transition_to(&self, new_status: &OperatorStatus) -> bool {
        match (self, new_status) {
            (s, n) if s == n => false,
            (OperatorStatus::New, OperatorStatus::Handling) => true,
            (OperatorStatus::Handling, OperatorStatus::Handled) => true,
            (OperatorStatus::Handling, OperatorStatus::Error) => true,
            _ => false,
        }
    }

    /// Terminal statuses are never re-processed; a reconcile event for a
    /// terminal resource is a no-op.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OperatorStatus::Handled | OperatorStatus::Error)
    }

    pub fn is_in_progress(&self) -> bool {
        matches!(self, OperatorStatus::Handling)
    }
}

impl fmt::Display for OperatorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperatorStatus::New => write!(f, "NEW"),
            OperatorStatus::Handling => write!(f, "HANDLING"),
            OperatorStatus::Handled => write!(f, "HANDLED"),
            OperatorStatus::Error => write!(f, "ERROR"),
        }
    }
}

impl FromStr for OperatorStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NEW" => Ok(OperatorStatus::New),
            "HANDLING" => Ok(OperatorStatus::Handling),
            "HANDLED" => Ok(OperatorStatus::Handled),
            "ERROR" => Ok(OperatorStatus::Error),
            _ => Err(format!("Invalid OperatorStatus: {}", s)),
        }
    }
}

/// Phase of a single provisioning step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum StepPhase {
    Started,
    Claimed,
    Finished,
}

impl fmt::Display for StepPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepPhase::Started => write!(f, "started"),
            StepPhase::Claimed => write!(f, "claimed"),
            StepPhase::Finished => write!(f, "finished"),
        }
    }
}

impl FromStr for StepPhase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "started" => Ok(StepPhase::Started),
            "claimed" => Ok(StepPhase::Claimed),
            "finished" => Ok(StepPhase::Finished),
            _ => Err(format!("Invalid StepPhase: {}", s)),
        }
    }
}

/// Named checkpoint of a multi-step provisioning task.
///
/// A resumed reconciliation reads the recorded phases to infer which
/// external side effects have already occurred. The step name is the status
/// field the checkpoint is stored under (e.g. `volumeClaim`); the struct
/// itself carries only the phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusStep {
    pub phase: StepPhase,
}

impl StatusStep {
    pub fn started() -> Self {
        Self {
            phase: StepPhase::Started,
        }
    }

    pub fn claimed() -> Self {
        Self {
            phase: StepPhase::Claimed,
        }
    }

    pub fn finished() -> Self {
        Self {
            phase: StepPhase::Finished,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.phase == StepPhase::Finished
    }
}

impl fmt::Display for StatusStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.phase)
    }
}
