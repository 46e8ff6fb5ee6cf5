use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Workflow state of an assessment.
///
/// Moves forward one step at a time. A submitted or verified assessment can
/// be sent back to `in_progress` for revision. `completed` is terminal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentStatus {
    #[default]
    Draft,
    InProgress,
    Submitted,
    Verified,
    Completed,
}

impl AssessmentStatus {
    pub const ALL: [AssessmentStatus; 5] = [
        AssessmentStatus::Draft,
        AssessmentStatus::InProgress,
        AssessmentStatus::Submitted,
        AssessmentStatus::Verified,
        AssessmentStatus::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AssessmentStatus::Draft => "draft",
            AssessmentStatus::InProgress => "in_progress",
            AssessmentStatus::Submitted => "submitted",
            AssessmentStatus::Verified => "verified",
            AssessmentStatus::Completed => "completed",
        }
    }

    /// The next state along the normal workflow, if any
    pub fn next(&self) -> Option<AssessmentStatus> {
        match self {
            AssessmentStatus::Draft => Some(AssessmentStatus::InProgress),
            AssessmentStatus::InProgress => Some(AssessmentStatus::Submitted),
            AssessmentStatus::Submitted => Some(AssessmentStatus::Verified),
            AssessmentStatus::Verified => Some(AssessmentStatus::Completed),
            AssessmentStatus::Completed => None,
        }
    }

    pub fn can_transition_to(&self, target: AssessmentStatus) -> bool {
        if self.next() == Some(target) {
            return true;
        }
        matches!(
            (self, target),
            (AssessmentStatus::Submitted, AssessmentStatus::InProgress)
                | (AssessmentStatus::Verified, AssessmentStatus::InProgress)
        )
    }

    /// Validate a transition and return the new state
    pub fn transition_to(&self, target: AssessmentStatus) -> Result<AssessmentStatus> {
        if !self.can_transition_to(target) {
            bail!("Cannot move assessment from '{}' to '{}'", self, target);
        }
        Ok(target)
    }

    /// Whether assessors may still edit responses in this state
    pub fn is_editable(&self) -> bool {
        matches!(self, AssessmentStatus::Draft | AssessmentStatus::InProgress)
    }
}

impl fmt::Display for AssessmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssessmentStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_lowercase().replace(['-', ' '], "_");
        AssessmentStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "Unknown status '{}'. Expected one of: draft, in_progress, submitted, verified, completed",
                    s
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_draft() {
        assert_eq!(AssessmentStatus::default(), AssessmentStatus::Draft);
    }

    #[test]
    fn test_forward_chain() {
        let mut status = AssessmentStatus::Draft;
        let mut seen = vec![status];
        while let Some(next) = status.next() {
            status = status.transition_to(next).unwrap();
            seen.push(status);
        }
        assert_eq!(seen, AssessmentStatus::ALL.to_vec());
    }

    #[test]
    fn test_cannot_skip_steps() {
        assert!(AssessmentStatus::Draft
            .transition_to(AssessmentStatus::Submitted)
            .is_err());
        assert!(AssessmentStatus::InProgress
            .transition_to(AssessmentStatus::Completed)
            .is_err());
    }

    #[test]
    fn test_send_back_for_revision() {
        assert!(AssessmentStatus::Submitted.can_transition_to(AssessmentStatus::InProgress));
        assert!(AssessmentStatus::Verified.can_transition_to(AssessmentStatus::InProgress));
        assert!(!AssessmentStatus::Completed.can_transition_to(AssessmentStatus::InProgress));
    }

    #[test]
    fn test_same_state_rejected() {
        for status in AssessmentStatus::ALL {
            assert!(!status.can_transition_to(status));
        }
    }

    #[test]
    fn test_completed_is_terminal() {
        for target in AssessmentStatus::ALL {
            assert!(!AssessmentStatus::Completed.can_transition_to(target));
        }
    }

    #[test]
    fn test_parse_and_display() {
        assert_eq!("in_progress".parse::<AssessmentStatus>().unwrap(), AssessmentStatus::InProgress);
        assert_eq!("In-Progress".parse::<AssessmentStatus>().unwrap(), AssessmentStatus::InProgress);
        assert_eq!(" verified ".parse::<AssessmentStatus>().unwrap(), AssessmentStatus::Verified);
        assert!("archived".parse::<AssessmentStatus>().is_err());
        assert_eq!(AssessmentStatus::Submitted.to_string(), "submitted");
    }

    #[test]
    fn test_serde_snake_case() {
        let json = serde_json::to_string(&AssessmentStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");
        let parsed: AssessmentStatus = serde_json::from_str("\"completed\"").unwrap();
        assert_eq!(parsed, AssessmentStatus::Completed);
    }

    #[test]
    fn test_editable_states() {
        assert!(AssessmentStatus::Draft.is_editable());
        assert!(AssessmentStatus::InProgress.is_editable());
        assert!(!AssessmentStatus::Submitted.is_editable());
    }
}
