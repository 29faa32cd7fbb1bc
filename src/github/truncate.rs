/// Appended to per-file patches cut at the patch cap.
pub const DIFF_TRUNCATION_MARKER: &str = "\n\n... [Diff truncated - file too large]";

/// Keep at most `max_chars` characters of `text`.
///
/// Returns the kept prefix and whether anything was dropped. Counts chars,
/// not bytes, so multi-byte content is never split mid-codepoint.
pub fn truncate_chars(text: &str, max_chars: usize) -> (String, bool) {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => (text[..byte_idx].to_string(), true),
        None => (text.to_string(), false),
    }
}

/// Cap a patch at `max_chars`, appending the truncation marker when cut.
pub fn cap_patch(patch: Option<&str>, max_chars: usize) -> (String, bool) {
    let (mut kept, truncated) = truncate_chars(patch.unwrap_or_default(), max_chars);
    if truncated {
        kept.push_str(DIFF_TRUNCATION_MARKER);
    }
    (kept, truncated)
}
