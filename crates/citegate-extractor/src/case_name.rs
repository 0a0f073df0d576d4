//! Recovery of `Plaintiff v. Defendant,` from the text preceding a citation

use crate::parser::char_to_byte_offset;
use once_cell::sync::Lazy;
use regex::Regex;

/// How far back from a citation to look for its case name
const LOOKBACK_CHARS: usize = 160;

/// Longest plaintiff name, in words
const MAX_PLAINTIFF_WORDS: usize = 6;

/// Lower-case words allowed inside a party name
const CONNECTORS: &[&str] = &["of", "the", "and", "&", "ex", "rel.", "de", "la", "for", "in"];

/// Citation signals that precede a case name but are not part of it
const SIGNALS: &[&str] = &[
    "see", "see,", "see also", "cf.", "e.g.,", "accord", "but", "contra", "compare", "in", "also",
];

/// Capitalized name ending right before `supra`: `... in *Smith*, supra`
static SUPRA_NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?P<name>[A-Z][\w.&'’-]*(?:\s+(?:[A-Z][\w.&'’-]*|of|and|&))*)[*_]*,?\s*$").unwrap()
});

/// Party names recovered from a draft
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseName {
    /// Plaintiff (or appellant)
    pub plaintiff: String,
    /// Defendant (or appellee)
    pub defendant: String,
}

impl CaseName {
    /// `Plaintiff v. Defendant`
    pub fn full(&self) -> String {
        format!("{} v. {}", self.plaintiff, self.defendant)
    }
}

/// Recover the case name written immediately before a citation
///
/// `start` is the citation's character offset in `draft`. Returns `None`
/// unless the text right before the citation reads `Plaintiff v. Defendant,`.
///
/// # Examples
///
/// ```
/// use citegate_extractor::recover_case_name;
///
/// let draft = "See Smith v. Jones Corp., 100 F.3d 200 (9th Cir. 1996).";
/// let start = draft.find("100").unwrap();
/// let name = recover_case_name(draft, start).unwrap();
/// assert_eq!(name.plaintiff, "Smith");
/// assert_eq!(name.defendant, "Jones Corp.");
/// ```
pub fn recover_case_name(draft: &str, start: usize) -> Option<CaseName> {
    let end = char_to_byte_offset(draft, start);
    let begin = char_to_byte_offset(draft, start.saturating_sub(LOOKBACK_CHARS));
    let window = draft[begin..end].trim_end();
    let window = window.strip_suffix(',')?;

    let split = window.rfind(" v. ")?;
    let defendant = clean_party(&window[split + 4..]);
    let before = &window[..split];

    if defendant.is_empty() || !starts_uppercase(&defendant) {
        return None;
    }

    let words: Vec<&str> = before.split_whitespace().collect();
    let mut taken: Vec<&str> = Vec::new();
    for word in words.iter().rev() {
        let stripped = word.trim_matches(|c| c == '*' || c == '_');
        let is_name_word = starts_uppercase(stripped) || CONNECTORS.contains(&stripped);
        if !is_name_word || taken.len() >= MAX_PLAINTIFF_WORDS {
            break;
        }
        taken.push(stripped);
    }
    taken.reverse();

    while let Some(first) = taken.first() {
        let lowered = first.to_lowercase();
        if SIGNALS.contains(&lowered.as_str()) || CONNECTORS.contains(&lowered.as_str()) {
            taken.remove(0);
        } else {
            break;
        }
    }

    if taken.is_empty() {
        return None;
    }

    Some(CaseName {
        plaintiff: taken.join(" "),
        defendant,
    })
}

/// Recover the party name written right before a `supra` citation
///
/// `start` is the character offset of the `supra` fragment. Eyecite reports
/// the fragment without the name, so `Smith, supra` arrives as `supra`.
pub fn recover_supra_name(draft: &str, start: usize) -> Option<String> {
    let end = char_to_byte_offset(draft, start);
    let begin = char_to_byte_offset(draft, start.saturating_sub(LOOKBACK_CHARS));
    let window = &draft[begin..end];
    let caps = SUPRA_NAME_RE.captures(window)?;
    strip_signals(caps.name("name")?.as_str())
}

/// Drop leading citation signals (`See`, `But see`, `Cf.`) from a party name
///
/// `In re` is a case name prefix, not a signal, and is kept.
pub fn strip_signals(name: &str) -> Option<String> {
    let words: Vec<&str> = name.split_whitespace().collect();
    let mut skip = 0;
    while let Some(word) = words.get(skip) {
        let bare = word.trim_matches(|c| c == '*' || c == '_').to_lowercase();
        let in_re = bare == "in"
            && words
                .get(skip + 1)
                .is_some_and(|next| next.trim_matches(|c| c == '*' || c == '_').eq_ignore_ascii_case("re"));
        if in_re || !SIGNALS.contains(&bare.as_str()) {
            break;
        }
        skip += 1;
    }
    let rest = words[skip..].join(" ");
    let rest = rest.trim_matches(|c| c == '*' || c == '_' || c == ',').trim();
    if rest.is_empty() {
        None
    } else {
        Some(rest.to_string())
    }
}

fn clean_party(s: &str) -> String {
    s.trim()
        .trim_matches(|c| c == '*' || c == '_')
        .trim()
        .to_string()
}

fn starts_uppercase(s: &str) -> bool {
    s.chars().next().map(|c| c.is_uppercase()).unwrap_or(false)
}
