//! Reporter abbreviation table and reporter-citation parsing

use citegate_domain::ParsedCitation;
use once_cell::sync::Lazy;
use regex::Regex;

/// Federal reporters, longest forms first
const FEDERAL: &[&str] = &[
    r"U\.\s?S\.\s?Dist\.\s?LEXIS",
    r"U\.\s?S\.",
    r"S\.\s?Ct\.",
    r"L\.\s?Ed\.(?:\s?2d)?",
    r"F\.\s?Supp\.(?:\s?[23]d)?",
    r"F\.\s?App(?:'|’)x",
    r"F\.\s?R\.\s?D\.",
    r"F\.\s?(?:2d|3d|4th)",
    r"F\.",
    r"B\.\s?R\.",
    r"Fed\.\s?Cl\.",
    r"WL",
];

/// Regional reporters
///
/// First-series Southern (`So.`) is left out so that a truncated `So. 3d`
/// never parses as a complete citation.
const REGIONAL: &[&str] = &[
    r"N\.\s?E\.(?:\s?[23]d)?",
    r"N\.\s?W\.(?:\s?2d)?",
    r"S\.\s?E\.(?:\s?2d)?",
    r"S\.\s?W\.(?:\s?[23]d)?",
    r"So\.\s?[23]d",
    r"A\.(?:\s?[23]d)?",
    r"P\.(?:\s?[23]d)?",
];

/// State-specific reporters
const STATE: &[&str] = &[
    r"Cal\.\s?Rptr\.(?:\s?[23]d)?",
    r"Cal\.\s?App\.\s?(?:4th|5th)",
    r"Cal\.\s?(?:4th|5th)",
    r"N\.\s?Y\.\s?S\.\s?[23]d",
    r"N\.\s?Y\.\s?[23]d",
    r"A\.\s?D\.\s?3d",
    r"Ill\.\s?App\.\s?3d",
    r"Ill\.\s?Dec\.",
    r"Ill\.\s?2d",
    r"Ohio\s?St\.\s?3d",
    r"Wis\.\s?2d",
    r"Wash\.\s?2d",
    r"Mass\.",
    r"N\.\s?J\.",
    r"Pa\.",
    r"Tex\.",
    r"Fla\.",
];

/// Unpublished / electronic reporters (upper-cased)
const UNPUBLISHED_MARKERS: &[&str] = &["F. APP'X", "F. APP’X", "F.APP'X", "WL", "LEXIS"];

fn reporter_alternation() -> String {
    // State and regional forms go first: `A.D.3d` and `Cal. App. 4th` would
    // otherwise be shadowed by `A.` and `Cal.`-less federal forms.
    STATE
        .iter()
        .chain(REGIONAL.iter())
        .chain(FEDERAL.iter())
        .copied()
        .collect::<Vec<_>>()
        .join("|")
}

/// Complete reporter citation: volume, reporter, page, optional pinpoint,
/// optional court/year parenthetical
static FULL_CITATION_RE: Lazy<Regex> = Lazy::new(|| {
    let pattern = format!(
        r"(?i)^(?P<volume>\d{{1,4}})\s+(?P<reporter>{})\s+(?P<page>\d{{1,7}})(?:\s*,\s*(?P<pinpoint>\d{{1,6}}(?:\s*[-–]\s*\d{{1,6}})?(?:\s*n\.\s*\d+)?))?(?:\s*\([^()]*\d{{4}}\))?$",
        reporter_alternation()
    );
    Regex::new(&pattern).expect("reporter table compiles")
});

/// Short-form case citation: `100 F.3d at 205`
static SHORT_FORM_RE: Lazy<Regex> = Lazy::new(|| {
    let pattern = format!(
        r"(?i)^(?P<volume>\d{{1,4}})\s+(?P<reporter>{}),?\s+at\s+(?P<pinpoint>\d{{1,6}}(?:\s*[-–]\s*\d{{1,6}})?)",
        reporter_alternation()
    );
    Regex::new(&pattern).expect("reporter table compiles")
});

/// Parse a complete reporter citation into its components
///
/// The input should already be trimmed and whitespace-normalized.
///
/// # Examples
///
/// ```
/// use citegate_extractor::parse_reporter_citation;
///
/// let parsed = parse_reporter_citation("100 F.3d 200, 205").unwrap();
/// assert_eq!(parsed.volume, 100);
/// assert_eq!(parsed.reporter, "F.3d");
/// assert_eq!(parsed.page, 200);
/// assert_eq!(parsed.pinpoint.as_deref(), Some("205"));
/// ```
pub fn parse_reporter_citation(s: &str) -> Option<ParsedCitation> {
    let caps = FULL_CITATION_RE.captures(s)?;
    Some(ParsedCitation {
        volume: caps.name("volume")?.as_str().parse().ok()?,
        reporter: caps.name("reporter")?.as_str().to_string(),
        page: caps.name("page")?.as_str().parse().ok()?,
        pinpoint: caps.name("pinpoint").map(|m| m.as_str().to_string()),
    })
}

/// Parse a short-form case citation; `page` is 0 because short forms carry
/// only the pinpoint
pub fn parse_short_form(s: &str) -> Option<ParsedCitation> {
    let caps = SHORT_FORM_RE.captures(s)?;
    Some(ParsedCitation {
        volume: caps.name("volume")?.as_str().parse().ok()?,
        reporter: caps.name("reporter")?.as_str().to_string(),
        page: 0,
        pinpoint: caps.name("pinpoint").map(|m| m.as_str().to_string()),
    })
}

/// Whether a reporter abbreviation denotes an unpublished source
pub fn is_unpublished_reporter(reporter: &str) -> bool {
    let reporter = reporter.to_uppercase();
    UNPUBLISHED_MARKERS.iter().any(|m| reporter.contains(m))
}

/// Canonical reporter key for comparing `F.3d` with `F. 3d`
pub fn reporter_key(reporter: &str) -> String {
    reporter
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_federal_reporters() {
        for s in [
            "1 F.3d 2",
            "100 F. Supp. 2d 300",
            "547 U.S. 1",
            "129 S. Ct. 1937",
            "173 L. Ed. 2d 868",
            "512 F. App'x 45",
            "2020 WL 1234567",
            "10 F. 20",
        ] {
            assert!(parse_reporter_citation(s).is_some(), "expected complete: {}", s);
        }
    }

    #[test]
    fn test_regional_and_state_reporters() {
        for s in [
            "210 So. 3d 447",
            "45 N.E.3d 12",
            "800 N.W.2d 100",
            "123 A.3d 456",
            "300 P.3d 1",
            "50 Cal. App. 4th 100",
            "12 Cal. Rptr. 3d 55",
            "100 A.D.3d 200",
            "90 Ill. 2d 1",
        ] {
            assert!(parse_reporter_citation(s).is_some(), "expected complete: {}", s);
        }
    }

    #[test]
    fn test_truncated_southern_is_incomplete() {
        assert!(parse_reporter_citation("210 So. 3").is_none());
        assert!(parse_reporter_citation("210 So.").is_none());
    }

    #[test]
    fn test_pinpoint_and_parenthetical() {
        let parsed = parse_reporter_citation("100 F.3d 200, 205-07 (9th Cir. 1996)").unwrap();
        assert_eq!(parsed.pinpoint.as_deref(), Some("205-07"));
        assert_eq!(parsed.page, 200);
    }

    #[test]
    fn test_short_form() {
        let parsed = parse_short_form("100 F.3d at 205").unwrap();
        assert_eq!(parsed.volume, 100);
        assert_eq!(parsed.reporter, "F.3d");
        assert_eq!(parsed.pinpoint.as_deref(), Some("205"));
        assert!(parse_short_form("100 F.3d 200").is_none());
    }

    #[test]
    fn test_reporter_key_ignores_spacing() {
        assert_eq!(reporter_key("F. 3d"), reporter_key("F.3d"));
        assert_eq!(reporter_key("So. 3d"), "so.3d");
    }

    #[test]
    fn test_unpublished_reporter() {
        assert!(is_unpublished_reporter("F. App'x"));
        assert!(is_unpublished_reporter("WL"));
        assert!(is_unpublished_reporter("f. app'x"));
        assert!(!is_unpublished_reporter("F.3d"));
    }
}
