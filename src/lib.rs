//! Cinecache library
//!
//! Movie-information queries answered through a TTL-cached read-through
//! to the OMDb metadata API, with three derived views on top: normalized
//! multi-provider rating summaries, a genre browser, and a box-office
//! ranking with lightweight recommendations. Exposed as a library so
//! integration tests can drive the orchestrator against a stub source.

pub mod boxoffice;
pub mod cache;
pub mod cli;
pub mod data;
pub mod genre;
pub mod orchestrator;
pub mod ratings;
