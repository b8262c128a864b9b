//! Prompt domain
//!
//! Context templates, the rules for splicing caller values into them, and
//! the length limit applied to the result.

mod template;
mod truncate;

pub use template::{ContextTemplate, TemplateError, sanitize_value};
pub use truncate::truncate_context;
