//! Accident, illness and departure reports.
//!
//! The three kinds live in separate tables that share a common column set;
//! [`Report`] carries the common columns and a [`ReportDetails`] variant for
//! the kind-specific ones.

pub mod kind;
pub mod model;
pub mod status;

pub use kind::ReportKind;
pub use model::{NewReport, Report, ReportDetails};
pub use status::ReportStatus;
