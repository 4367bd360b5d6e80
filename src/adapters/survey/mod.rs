//! Survey ingestion adapters.

mod json_survey_source;

pub use json_survey_source::JsonSurveySource;
