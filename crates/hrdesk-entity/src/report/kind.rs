//! Report kind enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use hrdesk_core::AppError;

/// The three report kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    /// Workplace accident.
    Accident,
    /// Sick leave.
    Illness,
    /// Employee departure.
    Departure,
}

impl ReportKind {
    /// All kinds, in display order.
    pub const ALL: [ReportKind; 3] = [Self::Accident, Self::Illness, Self::Departure];

    /// Table holding reports of this kind.
    pub fn table_name(&self) -> &'static str {
        match self {
            Self::Accident => "accident_reports",
            Self::Illness => "illness_reports",
            Self::Departure => "departure_reports",
        }
    }

    /// Return the kind as used in URLs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Accident => "accident",
            Self::Illness => "illness",
            Self::Departure => "departure",
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ReportKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "accident" => Ok(Self::Accident),
            "illness" => Ok(Self::Illness),
            "departure" => Ok(Self::Departure),
            _ => Err(AppError::validation(format!(
                "Invalid report kind: '{s}'. Expected one of: accident, illness, departure"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds_match_link_table() {
        for kind in ReportKind::ALL {
            assert!(hrdesk_core::types::deep_link::REPORT_KINDS.contains(&kind.as_str()));
            assert_eq!(kind.as_str().parse::<ReportKind>().unwrap(), kind);
        }
    }
}
