//! Output formatting for responses and reports

pub mod console;
pub mod formatter;
pub mod json;
