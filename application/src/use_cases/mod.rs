//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod check_connectivity;
pub mod connectivity;
pub mod generate_response;
pub mod invoke_provider;
