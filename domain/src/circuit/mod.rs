//! Connectivity circuit breaker domain
//!
//! The per-subject three-state machine that decides whether the primary
//! provider is attempted at all.

mod state;

pub use state::{Admission, CircuitSnapshot, CircuitState, CircuitStatus, CircuitTransition};
