//! Cyberhygiene Advisor - survey scoring and personalized recommendations
//!
//! This crate scores a cohort's cyber-hygiene survey answers against the
//! cohort's own baseline, flags critical dimensions and items per
//! participant, and retrieves matching recommendations from a knowledge base
//! tailored to each participant's expertise level.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
