//! Context length limiting

/// Cut `context` to at most `max_bytes`, backing off to the previous UTF-8
/// boundary so no character is split.
pub fn truncate_context(context: &str, max_bytes: usize) -> &str {
    if context.len() <= max_bytes {
        return context;
    }
    let end = (0..=max_bytes)
        .rev()
        .find(|i| context.is_char_boundary(*i))
        .unwrap_or(0);
    &context[..end]
}
