//! Pull runnable source out of a model reply

use regex_utils::fence;

/// Keep only the fenced code and drop blank lines.
///
/// Without any fence the whole reply is treated as code. An opening fence
/// with no closing one runs to the end of the reply. A fence pair that
/// encloses nothing, or a stray closing fence, keeps the text before it.
pub fn strip_fences(reply: &str) -> String {
    let code = match fence::enclosed_range(reply) {
        Some(range) if !reply[range.clone()].trim().is_empty() => &reply[range],
        _ => fence::before_first(reply),
    };

    code.lines()
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
