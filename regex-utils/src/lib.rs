//! Regex utilities for sampledata
//! Extracted to a separate crate for compilation optimization

use once_cell::sync::Lazy;
use regex::Regex;

/// Code fence markup the model wraps scripts in
pub mod fence {
    use super::*;

    /// Opening fence on its own line with an optional language tag, e.g.
    /// "```python"
    pub static OPENING: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"(?m)^[ \t]*```[A-Za-z0-9_+.-]*[ \t]*\r?\n").expect("Invalid regex pattern")
    });

    /// Closing fence at the start of a line
    pub static CLOSING: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"(?m)^[ \t]*```").expect("Invalid regex pattern"));

    /// Byte range of the text enclosed by the first fence pair.
    ///
    /// An opening fence without a matching close encloses everything up to
    /// the end of the text. Returns `None` when no fence is present.
    pub fn enclosed_range(text: &str) -> Option<std::ops::Range<usize>> {
        let open = OPENING.find(text)?;
        let start = open.end();
        let end = CLOSING.find_at(text, start).map(|m| m.start()).unwrap_or(text.len());
        Some(start..end)
    }

    /// Text before the first fence line, or all of it without one
    pub fn before_first(text: &str) -> &str {
        match CLOSING.find(text) {
            Some(m) => &text[..m.start()],
            None => text,
        }
    }
}

/// `NAME=VALUE` pairs used by the command line for per-column settings
pub mod assignment {
    use super::*;

    pub static PAIR: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"^\s*([^=]+?)\s*=\s*(.*?)\s*$").expect("Invalid regex pattern")
    });

    /// Split `"Age = 20-60"` into `("Age", "20-60")`
    pub fn split(text: &str) -> Option<(String, String)> {
        let caps = PAIR.captures(text)?;
        let name = caps.get(1)?.as_str();
        let value = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
        Some((name.to_string(), value.to_string()))
    }
}
