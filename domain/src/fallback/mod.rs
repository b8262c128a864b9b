//! Static fallback domain
//!
//! Canned responses per subject and the weighted selection over them.

mod pool;
mod selector;

pub use pool::{FallbackPool, FallbackPoolError, FallbackResponse};
pub use selector::weighted_pick;
