//! Gatekeeper configuration

use serde::{Deserialize, Serialize};

/// Thresholds for resolution, quotation and strength checks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Shorthand-to-antecedent gap (characters) below which confidence is HIGH
    pub high_confidence_gap: usize,

    /// Gap below which confidence is MEDIUM; LOW beyond
    pub medium_confidence_gap: usize,

    /// Largest share of the source a quotation may omit before a warning
    pub max_omission_ratio: f64,

    /// Citing-opinion count below which strength is not assessed
    pub weak_authority_threshold: u32,

    /// Characters of snippet used as the holding when no sentence matches
    pub holding_excerpt_chars: usize,

    /// Characters of each quote segment used to locate it in the source
    pub fragment_probe_chars: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            high_confidence_gap: 200,
            medium_confidence_gap: 1000,
            max_omission_ratio: 0.40,
            weak_authority_threshold: 5,
            holding_excerpt_chars: 200,
            fragment_probe_chars: 30,
        }
    }
}

impl ValidationConfig {
    /// Strict preset: tighter gaps and omission tolerance
    pub fn strict() -> Self {
        Self {
            high_confidence_gap: 120,
            medium_confidence_gap: 600,
            max_omission_ratio: 0.25,
            weak_authority_threshold: 10,
            ..Self::default()
        }
    }

    /// Permissive preset: looser gaps and omission tolerance
    pub fn permissive() -> Self {
        Self {
            high_confidence_gap: 400,
            medium_confidence_gap: 2000,
            max_omission_ratio: 0.60,
            weak_authority_threshold: 3,
            ..Self::default()
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.high_confidence_gap == 0 {
            return Err("high_confidence_gap must be greater than 0".to_string());
        }
        if self.medium_confidence_gap <= self.high_confidence_gap {
            return Err("medium_confidence_gap must exceed high_confidence_gap".to_string());
        }
        if !(0.0..=1.0).contains(&self.max_omission_ratio) {
            return Err("max_omission_ratio must be between 0.0 and 1.0".to_string());
        }
        if self.holding_excerpt_chars == 0 {
            return Err("holding_excerpt_chars must be greater than 0".to_string());
        }
        if self.fragment_probe_chars < 2 {
            return Err("fragment_probe_chars must be at least 2".to_string());
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_are_valid() {
        assert!(ValidationConfig::default().validate().is_ok());
        assert!(ValidationConfig::strict().validate().is_ok());
        assert!(ValidationConfig::permissive().validate().is_ok());
    }

    #[test]
    fn test_default_thresholds() {
        let config = ValidationConfig::default();
        assert_eq!(config.high_confidence_gap, 200);
        assert_eq!(config.medium_confidence_gap, 1000);
        assert_eq!(config.max_omission_ratio, 0.40);
        assert_eq!(config.weak_authority_threshold, 5);
    }

    #[test]
    fn test_inverted_gaps_rejected() {
        let config = ValidationConfig {
            medium_confidence_gap: 100,
            ..ValidationConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_omission_ratio_bounds() {
        let config = ValidationConfig {
            max_omission_ratio: 1.5,
            ..ValidationConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = ValidationConfig::from_toml("max_omission_ratio = 0.5").unwrap();
        assert_eq!(config.max_omission_ratio, 0.5);
        assert_eq!(config.high_confidence_gap, 200);
    }

    #[test]
    fn test_toml_round_trip() {
        let config = ValidationConfig::strict();
        let parsed = ValidationConfig::from_toml(&config.to_toml().unwrap()).unwrap();
        assert_eq!(config, parsed);
    }
}
