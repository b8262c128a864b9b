//! Response domain
//!
//! The envelope returned by `generate` and the presentation hints it carries.

mod envelope;
mod mood;

pub use envelope::{FallbackReason, ResponseEnvelope, ResponseMetadata, ResponseSource};
pub use mood::{MoodHint, infer_mood};
