//! Citegate Gatekeeper
//!
//! Per-citation checks that run after normalization and before the hard
//! gate:
//! - Shorthand resolution (`Id.`, `Ibid.`, `supra`, short-form)
//! - Quotation ellipsis validation and quote matching
//! - Strength scoring and adverse-authority detection
//! - Flag compilation
//!
//! Every check is a pure function over an immutable citation list, so the
//! orchestrator may run them per citation in any order.
//!
//! # Examples
//!
//! ```
//! use citegate_gatekeeper::{validate_ellipsis, Gatekeeper, ValidationConfig};
//!
//! let gatekeeper = Gatekeeper::new(ValidationConfig::default()).unwrap();
//! let result = validate_ellipsis("The covenant was ... enforceable.", None, gatekeeper.config());
//! assert!(result.valid);
//! assert_eq!(result.ellipsis_count, 1);
//! ```

#![warn(missing_docs)]

mod adverse;
mod config;
mod ellipsis;
mod error;
mod flags;
mod shorthand;
mod strength;

pub use adverse::{
    check_adverse_authorities_addressed, detect_adverse_authorities, AddressedCheck,
    AdverseAnalysis,
};
pub use config::ValidationConfig;
pub use ellipsis::{omission_ratio, quote_found_in_source, validate_ellipsis};
pub use error::GatekeeperError;
pub use flags::{compile_flags_for_citation, get_flag_priority};
pub use shorthand::{
    confidence_for_gap, resolve, resolve_all, resolve_ibid, resolve_id, resolve_short_case,
    resolve_supra, supra_hint, ResolutionReport, ResolutionStats, TypeCounts,
};
pub use strength::to_strength_score;

/// Validated configuration shared by every check in this crate
#[derive(Debug, Clone)]
pub struct Gatekeeper {
    config: ValidationConfig,
}

impl Gatekeeper {
    /// Create a gatekeeper, rejecting an invalid configuration
    pub fn new(config: ValidationConfig) -> Result<Self, GatekeeperError> {
        config.validate().map_err(GatekeeperError::Config)?;
        Ok(Self { config })
    }

    /// Active configuration
    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }
}
