//! Accident, illness and departure reports.

pub mod service;

pub use service::{ReportService, SubmitReportRequest};
