//! Quotation fidelity checks for quotes that omit source text
//!
//! Recognized markers: `...`, `. . .`, `....` (period plus ellipsis), `…`
//! and bracketed `[...]`. Dot runs of any other length are reported as
//! syntax errors.

use crate::config::ValidationConfig;
use citegate_domain::{EllipsisIssue, EllipsisIssueType, EllipsisValidationResult, IssueSeverity};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

static MARKER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[\s*(?:\.\s*){3,4}\]|…|\.(?:\s?\.)+").unwrap());

/// Words that flip or narrow meaning when omitted
static POLARITY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(not|no|never|unless|except|however|but|only|merely|limited)\b").unwrap()
});

const EXCERPT_CHARS: usize = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MarkerKind {
    Dots,
    Bracketed,
    Unicode,
}

#[derive(Debug, Clone, Copy)]
struct Marker {
    start: usize,
    end: usize,
    dots: usize,
    kind: MarkerKind,
}

fn find_markers(text: &str) -> Vec<Marker> {
    MARKER_RE
        .find_iter(text)
        .map(|m| {
            let s = m.as_str();
            let kind = if s.starts_with('[') {
                MarkerKind::Bracketed
            } else if s == "…" {
                MarkerKind::Unicode
            } else {
                MarkerKind::Dots
            };
            Marker {
                start: m.start(),
                end: m.end(),
                dots: if kind == MarkerKind::Unicode { 3 } else { s.matches('.').count() },
                kind,
            }
        })
        .collect()
}

fn char_pos(text: &str, byte: usize) -> usize {
    text[..byte].chars().count()
}

fn normalize(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Lower-case, straighten curly quotes, collapse whitespace
fn fold(s: &str) -> String {
    normalize(
        &s.to_lowercase()
            .replace(['“', '”'], "\"")
            .replace(['‘', '’'], "'"),
    )
}

fn head_chars(s: &str, n: usize) -> &str {
    match s.char_indices().nth(n) {
        Some((byte, _)) => &s[..byte],
        None => s,
    }
}

fn tail_chars(s: &str, n: usize) -> &str {
    let count = s.chars().count();
    if count <= n {
        return s;
    }
    match s.char_indices().nth(count - n) {
        Some((byte, _)) => &s[byte..],
        None => s,
    }
}

fn excerpt(s: &str) -> String {
    let trimmed = s.trim();
    if trimmed.chars().count() > EXCERPT_CHARS {
        format!("{}...", head_chars(trimmed, EXCERPT_CHARS))
    } else {
        trimmed.to_string()
    }
}

/// Segments of `text` between markers
fn segments<'a>(text: &'a str, markers: &[Marker]) -> Vec<&'a str> {
    let mut out = Vec::with_capacity(markers.len() + 1);
    let mut prev = 0;
    for marker in markers {
        out.push(&text[prev..marker.start]);
        prev = marker.end;
    }
    out.push(&text[prev..]);
    out
}

/// Validate a quotation containing ellipses
///
/// Without `source` only syntax and four-dot placement are checked. With
/// it, the omission ratio and the omitted spans are checked as well. The
/// result is invalid iff an `Error`-severity issue was found.
pub fn validate_ellipsis(
    quoted: &str,
    source: Option<&str>,
    config: &ValidationConfig,
) -> EllipsisValidationResult {
    let quoted_text_length = quoted.chars().count();
    let markers = find_markers(quoted);
    if markers.is_empty() {
        return EllipsisValidationResult::clean(quoted_text_length);
    }

    let mut issues = Vec::new();
    check_syntax(quoted, &markers, &mut issues);
    check_four_dot(quoted, &markers, &mut issues);

    let omission_ratio = source.and_then(|s| omission_ratio(quoted, s));
    if let Some(ratio) = omission_ratio {
        if ratio > config.max_omission_ratio {
            issues.push(EllipsisIssue {
                issue_type: EllipsisIssueType::ExcessiveOmission,
                severity: IssueSeverity::Warning,
                message: format!(
                    "Quotation omits {:.0}% of the source passage (limit {:.0}%)",
                    ratio * 100.0,
                    config.max_omission_ratio * 100.0
                ),
                position: None,
            });
        }
    }

    if let Some(source) = source {
        check_meaning(quoted, source, &markers, config, &mut issues);
    }

    let valid = !issues.iter().any(|i| i.severity == IssueSeverity::Error);
    debug!(
        "Validated quote with {} ellipses: {} issues, valid={}",
        markers.len(),
        issues.len(),
        valid
    );

    EllipsisValidationResult {
        valid,
        issues,
        ellipsis_count: markers.len(),
        quoted_text_length,
        omission_ratio,
    }
}

fn check_syntax(quoted: &str, markers: &[Marker], issues: &mut Vec<EllipsisIssue>) {
    let leading = quoted.len()
        - quoted
            .trim_start_matches(|c: char| c.is_whitespace() || matches!(c, '"' | '“' | '\''))
            .len();

    for marker in markers {
        if marker.kind == MarkerKind::Dots && (marker.dots == 2 || marker.dots >= 5) {
            issues.push(EllipsisIssue {
                issue_type: EllipsisIssueType::SyntaxError,
                severity: IssueSeverity::Error,
                message: format!(
                    "Malformed ellipsis '{}' ({} dots)",
                    &quoted[marker.start..marker.end],
                    marker.dots
                ),
                position: Some(char_pos(quoted, marker.start)),
            });
        }
        if marker.start == leading {
            issues.push(EllipsisIssue {
                issue_type: EllipsisIssueType::SyntaxError,
                severity: IssueSeverity::Warning,
                message: "Quotation begins with an ellipsis".to_string(),
                position: Some(char_pos(quoted, marker.start)),
            });
        }
    }
}

fn check_four_dot(quoted: &str, markers: &[Marker], issues: &mut Vec<EllipsisIssue>) {
    for marker in markers.iter().filter(|m| m.kind == MarkerKind::Dots && m.dots == 4) {
        let preceding = quoted[..marker.start].trim_end().chars().last();
        if let Some(c @ (',' | ';' | ':')) = preceding {
            issues.push(EllipsisIssue {
                issue_type: EllipsisIssueType::ImproperFourDot,
                severity: IssueSeverity::Warning,
                message: format!(
                    "Four-dot ellipsis follows '{}'; it should close a complete sentence",
                    c
                ),
                position: Some(char_pos(quoted, marker.start)),
            });
        }
    }
}

/// `1 - len(quote)/len(source)` with markers stripped, floored at 0
pub fn omission_ratio(quoted: &str, source: &str) -> Option<f64> {
    let stripped = normalize(&MARKER_RE.replace_all(quoted, " "));
    let source_len = normalize(source).chars().count();
    if source_len == 0 {
        return None;
    }
    let ratio = 1.0 - stripped.chars().count() as f64 / source_len as f64;
    Some(ratio.max(0.0))
}

/// Locate the source span omitted between two quote segments
///
/// Searches for the tail of `before` and then the head of `after`, first
/// with `probe` characters and then with half as many.
fn locate_gap(
    haystack: &str,
    before: &str,
    after: &str,
    cursor: usize,
    probe: usize,
) -> Option<(usize, usize)> {
    for len in [probe, probe / 2] {
        let tail = tail_chars(before, len).trim();
        let head = head_chars(after, len).trim();
        if tail.is_empty() || head.is_empty() {
            continue;
        }
        let Some(t) = haystack[cursor..].find(tail) else {
            continue;
        };
        let gap_start = cursor + t + tail.len();
        if let Some(h) = haystack[gap_start..].find(head) {
            return Some((gap_start, gap_start + h));
        }
    }
    None
}

fn check_meaning(
    quoted: &str,
    source: &str,
    markers: &[Marker],
    config: &ValidationConfig,
    issues: &mut Vec<EllipsisIssue>,
) {
    let haystack = fold(source);
    let parts: Vec<String> = segments(quoted, markers).into_iter().map(fold).collect();
    let mut cursor = 0;

    for (idx, marker) in markers.iter().enumerate() {
        let (before, after) = (&parts[idx], &parts[idx + 1]);
        if before.is_empty() || after.is_empty() {
            continue;
        }
        let Some((gap_start, gap_end)) =
            locate_gap(&haystack, before, after, cursor, config.fragment_probe_chars)
        else {
            debug!("Could not locate omitted span for ellipsis {}", idx);
            continue;
        };
        cursor = gap_end;

        let omitted = &haystack[gap_start..gap_end];
        if let Some(word) = POLARITY_RE.find(omitted) {
            issues.push(EllipsisIssue {
                issue_type: EllipsisIssueType::MeaningChange,
                severity: IssueSeverity::Error,
                message: format!(
                    "Omitted text contains '{}': \"{}\"",
                    word.as_str(),
                    excerpt(omitted)
                ),
                position: Some(char_pos(quoted, marker.start)),
            });
        }
    }
}

/// Whether every quoted segment appears, in order, in the source
///
/// Comparison ignores case, whitespace runs, curly-quote style and
/// punctuation at segment edges.
pub fn quote_found_in_source(quoted: &str, source: &str) -> bool {
    let haystack = fold(source);
    let markers = find_markers(quoted);
    let mut cursor = 0;

    for part in segments(quoted, &markers) {
        let folded = fold(part);
        let needle = folded
            .trim_matches(|c: char| c.is_whitespace() || c.is_ascii_punctuation());
        if needle.is_empty() {
            continue;
        }
        match haystack[cursor..].find(needle) {
            Some(pos) => cursor += pos + needle.len(),
            None => return false,
        }
    }
    true
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: text without dots or ellipsis characters is always valid
        #[test]
        fn test_marker_free_text_is_valid(quote in "[a-zA-Z ,;:']{0,120}", source in "[a-z ]{0,120}") {
            let result = validate_ellipsis(&quote, Some(&source), &ValidationConfig::default());
            prop_assert!(result.valid);
            prop_assert_eq!(result.ellipsis_count, 0);
        }
    }
}
