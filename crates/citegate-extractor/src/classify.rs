//! Citation classification for fragments without a tool-assigned type

use crate::normalizer::{is_complete, normalize_whitespace};
use crate::reporters::parse_short_form;
use citegate_domain::CitationType;
use once_cell::sync::Lazy;
use regex::Regex;

static ID_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^id\.?(?:\s|,|$)").unwrap());

static IBID_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^ibid\b").unwrap());

static SUPRA_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bsupra\b").unwrap());

static STATUTE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(§|\bU\.\s?S\.\s?C\.|\bC\.\s?F\.\s?R\.|\bStat\.|\bCode\b|\bR\.\s?Civ\.\s?P\.)").unwrap()
});

/// Classify a raw citation string
///
/// Statutes are recognized so that callers can exclude them; this pipeline
/// does not verify them.
///
/// # Examples
///
/// ```
/// use citegate_domain::CitationType;
/// use citegate_extractor::classify;
///
/// assert_eq!(classify("Id. at 12"), CitationType::Id);
/// assert_eq!(classify("Smith, supra, at 4"), CitationType::Supra);
/// assert_eq!(classify("100 F.3d at 205"), CitationType::ShortCase);
/// assert_eq!(classify("100 F.3d 200"), CitationType::FullCase);
/// assert_eq!(classify("42 U.S.C. § 1983"), CitationType::Statute);
/// ```
pub fn classify(raw: &str) -> CitationType {
    let text = normalize_whitespace(raw);

    if IBID_RE.is_match(&text) {
        return CitationType::Ibid;
    }
    if ID_RE.is_match(&text) {
        return CitationType::Id;
    }
    if SUPRA_RE.is_match(&text) {
        return CitationType::Supra;
    }
    if STATUTE_RE.is_match(&text) {
        return CitationType::Statute;
    }
    if parse_short_form(&text).is_some() {
        return CitationType::ShortCase;
    }
    if is_complete(&text) {
        return CitationType::FullCase;
    }
    CitationType::Unknown
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_forms() {
        assert_eq!(classify("Id."), CitationType::Id);
        assert_eq!(classify("id. at 5"), CitationType::Id);
        assert_eq!(classify("Id., at 5"), CitationType::Id);
        assert_eq!(classify("Idaho Code § 5"), CitationType::Statute);
    }

    #[test]
    fn test_ibid() {
        assert_eq!(classify("Ibid."), CitationType::Ibid);
        assert_eq!(classify("ibid"), CitationType::Ibid);
    }

    #[test]
    fn test_statutes() {
        assert_eq!(classify("42 U.S.C. § 1983"), CitationType::Statute);
        assert_eq!(classify("29 C.F.R. 1630.2"), CitationType::Statute);
        assert_eq!(classify("Cal. Bus. & Prof. Code 16600"), CitationType::Statute);
        assert_eq!(classify("Fed. R. Civ. P. 56"), CitationType::Statute);
    }

    #[test]
    fn test_truncated_is_unknown() {
        assert_eq!(classify("210 So. 3"), CitationType::Unknown);
        assert_eq!(classify("So. 3d"), CitationType::Unknown);
    }
}
