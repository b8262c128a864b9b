//! Core domain concepts shared across all subdomains.
//!
//! - [`subject::Subject`]: the closed set of use-case categories
//! - [`error::DomainError`]: per-request domain errors

pub mod error;
pub mod subject;
