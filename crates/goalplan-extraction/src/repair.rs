//! Textual repairs applied before re-parsing model output.
//!
//! The comment and comma repairs track JSON string literals so that `//`
//! inside a URL or `,]` inside a quoted sentence are left alone.

const LINE_COMMENT: &str = "//";

/// Collapse newlines, drop carriage returns, and slice from the first `{`
/// to the last `}` inclusive. `None` when there is no such pair.
#[must_use]
pub fn brace_slice(text: &str) -> Option<String> {
    let collapsed: String = text
        .chars()
        .filter(|c| *c != '\r')
        .map(|c| if c == '\n' { ' ' } else { c })
        .collect();
    let start = collapsed.find('{')?;
    let end = collapsed.rfind('}')?;
    if end < start {
        return None;
    }
    Some(collapsed[start..=end].to_string())
}

/// Drop blank and comment-only lines, strip trailing `//` comments from the
/// rest, and rejoin with `\n`. Each kept line is trimmed.
#[must_use]
pub fn strip_line_comments(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with(LINE_COMMENT))
        .map(|line| strip_inline_comment(line).trim_end())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn strip_inline_comment(line: &str) -> &str {
    let mut in_string = false;
    let mut escaped = false;
    let bytes = line.as_bytes();
    for (i, &b) in bytes.iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'/' if bytes.get(i + 1) == Some(&b'/') => return &line[..i],
            _ => {}
        }
    }
    line
}

/// Remove commas that are followed (after optional whitespace) by `]` or `}`.
#[must_use]
pub fn remove_trailing_commas(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escaped = false;

    for (i, &c) in chars.iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            out.push(c);
            continue;
        }
        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            ',' => {
                let next = chars[i + 1..].iter().find(|n| !n.is_whitespace());
                if !matches!(next, Some(']') | Some('}')) {
                    out.push(c);
                }
            }
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brace_slice_spans_first_to_last_brace() {
        let text = "Sure!\r\n{\"a\": {\"b\": 1}}\nThanks";
        assert_eq!(brace_slice(text).as_deref(), Some("{\"a\": {\"b\": 1}}"));
    }

    #[test]
    fn brace_slice_needs_both_braces() {
        assert_eq!(brace_slice("no json here"), None);
        assert_eq!(brace_slice("} backwards {"), None);
    }

    #[test]
    fn comment_lines_and_blank_lines_are_dropped() {
        let text = "{\n  // the dimensions\n\n  \"a\": 1, // inline\n  \"b\": 2\n}";
        assert_eq!(strip_line_comments(text), "{\n\"a\": 1,\n\"b\": 2\n}");
    }

    #[test]
    fn comment_markers_inside_strings_are_kept() {
        let text = "\"url\": \"https://example.com\", // docs";
        assert_eq!(strip_line_comments(text), "\"url\": \"https://example.com\",");
    }

    #[test]
    fn escaped_quotes_do_not_end_strings() {
        let text = r#""say \"//hi\"" // comment"#;
        assert_eq!(strip_line_comments(text), r#""say \"//hi\"""#);
    }

    #[test]
    fn trailing_commas_before_closers_are_removed() {
        assert_eq!(remove_trailing_commas("[1,2,]"), "[1,2]");
        assert_eq!(remove_trailing_commas("{\"a\":1,\n}"), "{\"a\":1\n}");
        assert_eq!(remove_trailing_commas("[[1,],{\"b\":[2,],},]"), "[[1],{\"b\":[2]}]");
    }

    #[test]
    fn commas_inside_strings_are_kept() {
        assert_eq!(remove_trailing_commas("[\"a,]\",]"), "[\"a,]\"]");
    }

    #[test]
    fn ordinary_commas_are_kept() {
        assert_eq!(remove_trailing_commas("[1, 2, 3]"), "[1, 2, 3]");
    }
}
