//! Citegate Extractor
//!
//! Turns machine-extracted citation strings into a clean, de-duplicated set
//! of case-law citations.
//!
//! # Overview
//!
//! Extraction tools split citations badly: a reporter citation cut at a line
//! break comes back as `"210 So. 3"` alongside the real `"210 So. 3d 447"`,
//! and the same citation shows up with different capitalization. This crate
//! repairs that before anything is looked up.
//!
//! # Architecture
//!
//! ```text
//! eyecite JSON / raw strings → fragments → classify → normalize (complete + dedup)
//! ```
//!
//! # Key Features
//!
//! - **Completeness check**: volume + known reporter + page/pinpoint
//! - **Fragment de-duplication**: truncated prefixes and case-only variants
//! - **Classification**: full, short-form, `Id.`, `Ibid.`, `supra`, statute
//! - **Case-name recovery**: `Plaintiff v. Defendant,` preceding a citation
//! - **Tool output parsing**: eyecite extraction JSON
//!
//! # Example Usage
//!
//! ```
//! use citegate_extractor::{deduplicate, is_complete};
//!
//! assert!(is_complete("1 F.3d 2"));
//! assert!(!is_complete("So. 3d"));
//!
//! let raw = vec![
//!     "210 So. 3".to_string(),
//!     "210 So. 3d 447".to_string(),
//!     "210 so. 3d 447".to_string(),
//! ];
//! let result = deduplicate(&raw);
//! assert_eq!(result.unique, vec!["210 So. 3d 447".to_string()]);
//! assert_eq!(result.stats.input_count, 3);
//! ```

#![warn(missing_docs)]

mod error;
mod reporters;
mod normalizer;
mod classify;
mod case_name;
mod parser;

pub use error::ExtractorError;
pub use reporters::{
    is_unpublished_reporter, parse_reporter_citation, parse_short_form, reporter_key,
};
pub use normalizer::{
    deduplicate, is_complete, normalize_whitespace, DeduplicationResult, DeduplicationStats,
    MIN_CITATION_LENGTH,
};
pub use classify::classify;
pub use case_name::{recover_case_name, recover_supra_name, strip_signals, CaseName};
pub use parser::{char_to_byte_offset, fragments_from_strings, parse_eyecite_output};
