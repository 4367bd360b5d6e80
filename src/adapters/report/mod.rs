//! Report output adapters.

mod json_report_writer;

pub use json_report_writer::JsonReportWriter;
