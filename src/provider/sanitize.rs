use crate::provider::model_map::emits_reasoning_trace;

pub const TRACE_OPEN_MARKER: &str = "<think>";
pub const TRACE_CLOSE_MARKER: &str = "</think>";

/// Strips the leading reasoning trace emitted by the trace-emitting model.
/// Output from every other model is returned untouched.
///
/// Back-to-back leading traces are all removed so that sanitized text never
/// starts with another trace; this keeps the transform idempotent. A trace
/// without its close marker is left in place.
pub fn sanitize(text: &str, model_id: &str) -> String {
    if !emits_reasoning_trace(model_id) {
        return text.to_string();
    }
    let mut current = text;
    while let Some(rest) = strip_leading_trace(current) {
        current = rest;
    }
    current.to_string()
}

fn strip_leading_trace(text: &str) -> Option<&str> {
    let after_open = text.trim_start().strip_prefix(TRACE_OPEN_MARKER)?;
    let close = after_open.find(TRACE_CLOSE_MARKER)?;
    let rest = &after_open[close + TRACE_CLOSE_MARKER.len()..];
    Some(strip_line_break(strip_line_break(rest)))
}

fn strip_line_break(text: &str) -> &str {
    text.strip_prefix("\r\n")
        .or_else(|| text.strip_prefix('\n'))
        .unwrap_or(text)
}
