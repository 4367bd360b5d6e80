//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, enums, and error types
//! that form the vocabulary of the cyber-hygiene assessment domain.

mod dimension;
mod errors;
mod expertise_level;
mod ids;
mod likert;
pub mod text;
mod timestamp;

pub use dimension::Dimension;
pub use errors::{DomainError, ErrorCode, ValidationError};
pub use expertise_level::ExpertiseLevel;
pub use ids::{ItemCode, ParticipantId, RunId};
pub use likert::LikertAnswer;
pub use timestamp::Timestamp;
