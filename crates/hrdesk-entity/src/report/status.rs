//! Report review status.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use hrdesk_core::AppError;

/// Review state shared by every report kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "report_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    /// Filed, not yet looked at.
    Submitted,
    /// Seen by a company admin.
    Reviewed,
    /// Handled.
    Closed,
}

impl ReportStatus {
    /// Statuses only move forward.
    pub fn can_transition_to(&self, next: ReportStatus) -> bool {
        self.rank() < next.rank()
    }

    fn rank(&self) -> u8 {
        match self {
            Self::Submitted => 0,
            Self::Reviewed => 1,
            Self::Closed => 2,
        }
    }

    /// Return the status as stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Submitted => "submitted",
            Self::Reviewed => "reviewed",
            Self::Closed => "closed",
        }
    }
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ReportStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "submitted" => Ok(Self::Submitted),
            "reviewed" => Ok(Self::Reviewed),
            "closed" => Ok(Self::Closed),
            _ => Err(AppError::validation(format!(
                "Invalid report status: '{s}'. Expected one of: submitted, reviewed, closed"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_only() {
        assert!(ReportStatus::Submitted.can_transition_to(ReportStatus::Closed));
        assert!(ReportStatus::Reviewed.can_transition_to(ReportStatus::Closed));
        assert!(!ReportStatus::Closed.can_transition_to(ReportStatus::Reviewed));
        assert!(!ReportStatus::Reviewed.can_transition_to(ReportStatus::Reviewed));
    }
}
