//! Parsing of extraction-tool output into raw citation fragments

use crate::error::ExtractorError;
use citegate_domain::{CitationType, ExtractionOrigin, RawCitationFragment};
use serde::Deserialize;
use tracing::{debug, warn};

#[derive(Debug, Deserialize)]
struct EyeciteOutput {
    #[serde(default)]
    citations: Vec<EyeciteCitation>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EyeciteCitation {
    raw: String,
    #[serde(default)]
    citation_type: Option<String>,
    #[serde(default)]
    plaintiff: Option<String>,
    #[serde(default)]
    defendant: Option<String>,
    #[serde(default)]
    span: Option<[usize; 2]>,
}

/// Parse the JSON written by the eyecite extraction script
///
/// Spans are character offsets into the cleaned draft. A citation without a
/// span is placed at the end of the previous one so that document order is
/// kept. An `error` member in the payload becomes [`ExtractorError::Tool`].
pub fn parse_eyecite_output(json: &str) -> Result<Vec<RawCitationFragment>, ExtractorError> {
    let output: EyeciteOutput = serde_json::from_str(json)?;

    if let Some(error) = output.error {
        return Err(ExtractorError::Tool(error));
    }

    let mut cursor = 0usize;
    let mut fragments = Vec::with_capacity(output.citations.len());

    for cite in output.citations {
        let (start, end) = match cite.span {
            Some([start, end]) if end >= start => (start, end),
            Some([start, end]) => {
                warn!("Inverted span [{}, {}] for '{}'", start, end, cite.raw);
                (end, start)
            }
            None => (cursor, cursor + cite.raw.chars().count()),
        };
        cursor = end;

        let mut fragment =
            RawCitationFragment::new(cite.raw, start, end).with_origin(ExtractionOrigin::Eyecite);
        if let Some(kind) = cite.citation_type.as_deref() {
            fragment = fragment.with_type(CitationType::parse(kind));
        }
        fragment.plaintiff = cite.plaintiff.filter(|p| !p.trim().is_empty());
        fragment.defendant = cite.defendant.filter(|d| !d.trim().is_empty());
        fragments.push(fragment);
    }

    debug!("Parsed {} eyecite citations", fragments.len());
    Ok(fragments)
}

/// Locate plain citation strings in a draft, in order
///
/// Each string is searched for after the previous match; a string that
/// cannot be found is positioned at the current cursor with its own length.
pub fn fragments_from_strings(draft: &str, citations: &[String]) -> Vec<RawCitationFragment> {
    let mut cursor_byte = 0usize;
    let mut fragments = Vec::with_capacity(citations.len());

    for text in citations {
        let len_chars = text.chars().count();
        let found = draft[cursor_byte..]
            .find(text.as_str())
            .map(|rel| cursor_byte + rel);

        let fragment = match found {
            Some(byte) => {
                let start = draft[..byte].chars().count();
                cursor_byte = byte + text.len();
                RawCitationFragment::new(text.clone(), start, start + len_chars)
            }
            None => {
                debug!("Citation '{}' not found in draft", text);
                let start = draft[..cursor_byte].chars().count();
                RawCitationFragment::new(text.clone(), start, start + len_chars)
            }
        };
        fragments.push(fragment);
    }

    fragments
}

/// Convert a character offset into a byte offset, clamped to the string end
pub fn char_to_byte_offset(s: &str, char_offset: usize) -> usize {
    s.char_indices()
        .nth(char_offset)
        .map(|(byte, _)| byte)
        .unwrap_or(s.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = r#"{
        "citations": [
            {
                "index": 0,
                "raw": "100 F.3d 200",
                "citation_type": "FULL_CASE",
                "volume": "100",
                "reporter": "F.3d",
                "page": "200",
                "pinpoint": null,
                "year": "1996",
                "court": "ca9",
                "plaintiff": "Smith",
                "defendant": "Jones",
                "case_name": "Smith v. Jones",
                "span": [20, 32],
                "antecedent": null
            },
            {
                "index": 1,
                "raw": "Id.",
                "citation_type": "ID",
                "span": null
            }
        ],
        "count": 2
    }"#;

    #[test]
    fn test_parse_eyecite_output() {
        let fragments = parse_eyecite_output(SAMPLE).unwrap();
        assert_eq!(fragments.len(), 2);

        assert_eq!(fragments[0].text, "100 F.3d 200");
        assert_eq!(fragments[0].start, 20);
        assert_eq!(fragments[0].end, 32);
        assert_eq!(fragments[0].origin, ExtractionOrigin::Eyecite);
        assert_eq!(fragments[0].citation_type, Some(CitationType::FullCase));
        assert_eq!(fragments[0].plaintiff.as_deref(), Some("Smith"));

        assert_eq!(fragments[1].citation_type, Some(CitationType::Id));
        assert_eq!(fragments[1].start, 32);
        assert_eq!(fragments[1].end, 35);
    }

    #[test]
    fn test_tool_error_payload() {
        let err = parse_eyecite_output(r#"{"error": "eyecite not installed", "citations": []}"#)
            .unwrap_err();
        assert!(matches!(err, ExtractorError::Tool(msg) if msg.contains("eyecite")));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            parse_eyecite_output("not json"),
            Err(ExtractorError::JsonParse(_))
        ));
    }

    #[test]
    fn test_empty_output() {
        let fragments = parse_eyecite_output(r#"{"citations": [], "count": 0}"#).unwrap();
        assert!(fragments.is_empty());
    }

    #[test]
    fn test_fragments_from_strings_in_order() {
        let draft = "See 1 F.3d 2. Id. Later, 1 F.3d 2 again.";
        let fragments = fragments_from_strings(
            draft,
            &["1 F.3d 2".to_string(), "Id.".to_string(), "1 F.3d 2".to_string()],
        );
        assert_eq!(fragments[0].start, 4);
        assert_eq!(fragments[1].start, 14);
        assert_eq!(fragments[2].start, 25);
        assert!(fragments[2].start > fragments[1].end);
    }

    #[test]
    fn test_char_to_byte_offset_multibyte() {
        let s = "§ 1 F.3d 2";
        assert_eq!(char_to_byte_offset(s, 0), 0);
        assert_eq!(char_to_byte_offset(s, 1), 2);
        assert_eq!(char_to_byte_offset(s, 100), s.len());
    }
}
