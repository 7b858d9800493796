use similar::TextDiff;

/// lines of context around each hunk
const CONTEXT_LINES: usize = 3;

fn as_text(content: &[u8]) -> Option<&str> {
    if content.contains(&0) {
        return None;
    }
    std::str::from_utf8(content).ok()
}

/// unified diff of two versions of the file at `label`
///
/// returns an empty string when the contents are equal. contents that are
/// not utf-8 text (or contain NUL bytes) are summarized in a single line.
pub fn unified_diff(old: &[u8], new: &[u8], label: &str) -> String {
    if old == new {
        return String::new();
    }

    match (as_text(old), as_text(new)) {
        (Some(old), Some(new)) => TextDiff::from_lines(old, new)
            .unified_diff()
            .context_radius(CONTEXT_LINES)
            .header(&format!("a/{}", label), &format!("b/{}", label))
            .to_string(),
        _ => format!("Binary files a/{} and b/{} differ\n", label, label),
    }
}
