const FENCE: &str = "```";

/// What the extractor found in the raw text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionOutcome {
    /// Content between the first and last fence markers was taken.
    Fenced,
    /// No fence marker at all; text passed through.
    Unfenced,
    /// A single (or overlapping) fence marker; text passed through.
    Ambiguous,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extracted<'a> {
    pub text: &'a str,
    pub outcome: ExtractionOutcome,
}

/// Strip a markdown code fence wrapper from model output.
///
/// Returns the text strictly between the end of the first marker's line and
/// the last marker, trimmed. With fewer than two markers the input comes
/// back unchanged. Never fails.
///
/// ```rust
/// use goalplan_extraction::extract;
///
/// assert_eq!(extract("```json\n{\"a\":1}\n```"), "{\"a\":1}");
/// assert_eq!(extract("{\"a\":1}"), "{\"a\":1}");
/// ```
#[must_use]
pub fn extract(raw: &str) -> &str {
    extract_with_outcome(raw).text
}

/// [`extract`], also reporting whether a fence was used.
#[must_use]
pub fn extract_with_outcome(raw: &str) -> Extracted<'_> {
    let passthrough = |outcome| Extracted { text: raw, outcome };

    let Some(first) = raw.find(FENCE) else {
        return passthrough(ExtractionOutcome::Unfenced);
    };
    let Some(last) = raw.rfind(FENCE) else {
        return passthrough(ExtractionOutcome::Unfenced);
    };

    let after_marker = first + FENCE.len();
    if last < after_marker {
        return passthrough(ExtractionOutcome::Ambiguous);
    }

    // Skip the rest of the opening line (language tag such as `json`).
    let content_start = match raw[after_marker..last].find('\n') {
        Some(offset) => after_marker + offset + 1,
        None => after_marker,
    };

    Extracted {
        text: raw[content_start..last].trim(),
        outcome: ExtractionOutcome::Fenced,
    }
}
