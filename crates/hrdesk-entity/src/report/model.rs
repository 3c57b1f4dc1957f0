//! Report entity model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::kind::ReportKind;
use super::status::ReportStatus;

/// Kind-specific report columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ReportDetails {
    /// Columns of `accident_reports`.
    Accident {
        /// Where it happened.
        location: String,
        /// Description of the injury, if any.
        injury: Option<String>,
        /// Names of witnesses.
        witnesses: Option<String>,
    },
    /// Columns of `illness_reports`.
    Illness {
        /// Expected or actual last day of leave.
        end_date: Option<NaiveDate>,
        /// Whether a doctor's note was provided.
        #[serde(default)]
        doctor_note: bool,
    },
    /// Columns of `departure_reports`.
    Departure {
        /// Reason for leaving.
        reason: String,
        /// Day notice was given.
        notice_given_on: Option<NaiveDate>,
    },
}

impl ReportDetails {
    /// Kind these details belong to.
    pub fn kind(&self) -> ReportKind {
        match self {
            Self::Accident { .. } => ReportKind::Accident,
            Self::Illness { .. } => ReportKind::Illness,
            Self::Departure { .. } => ReportKind::Departure,
        }
    }
}

/// A report of any kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Report ID.
    pub id: Uuid,
    /// Owning company.
    pub company_id: Uuid,
    /// User who filed the report.
    pub submitted_by: Uuid,
    /// Employee the report concerns.
    pub employee_id: Uuid,
    /// Review state.
    pub status: ReportStatus,
    /// Day of the event (or first day of leave).
    pub occurred_on: NaiveDate,
    /// Free-text description.
    pub description: Option<String>,
    /// Kind-specific columns, flattened with a `kind` tag.
    #[serde(flatten)]
    pub details: ReportDetails,
    /// When the report was filed.
    pub created_at: DateTime<Utc>,
    /// When the report was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Report {
    /// Kind of this report.
    pub fn kind(&self) -> ReportKind {
        self.details.kind()
    }
}

/// Data required to file a report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewReport {
    /// Owning company.
    pub company_id: Uuid,
    /// Filing user.
    pub submitted_by: Uuid,
    /// Employee the report concerns.
    pub employee_id: Uuid,
    /// Day of the event.
    pub occurred_on: NaiveDate,
    /// Free-text description.
    pub description: Option<String>,
    /// Kind-specific columns.
    pub details: ReportDetails,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_flat_with_kind_tag() {
        let report = Report {
            id: Uuid::nil(),
            company_id: Uuid::nil(),
            submitted_by: Uuid::nil(),
            employee_id: Uuid::nil(),
            status: ReportStatus::Submitted,
            occurred_on: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
            description: None,
            details: ReportDetails::Departure {
                reason: "Relocation".to_string(),
                notice_given_on: None,
            },
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["kind"], "departure");
        assert_eq!(json["reason"], "Relocation");
        assert_eq!(json["status"], "submitted");
        assert_eq!(report.kind(), ReportKind::Departure);
    }
}
