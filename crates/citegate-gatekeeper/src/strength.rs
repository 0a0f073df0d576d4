//! Authority strength scoring

use crate::config::ValidationConfig;
use citegate_domain::{StrengthRating, StrengthScore};

/// Build a strength score from citing-opinion counts and an external rating
///
/// Below `weak_authority_threshold` citing opinions the rating is forced to
/// `InsufficientData`; otherwise the external rating is kept as given.
pub fn to_strength_score(
    citing_opinion_count: u32,
    citing_opinions_last_10_years: u32,
    external_rating: StrengthRating,
    config: &ValidationConfig,
) -> StrengthScore {
    let rating = if citing_opinion_count < config.weak_authority_threshold {
        StrengthRating::InsufficientData
    } else {
        external_rating
    };
    StrengthScore {
        rating,
        citing_opinion_count,
        citing_opinions_last_10_years,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_low_count_forces_insufficient_data() {
        let config = ValidationConfig::default();
        let score = to_strength_score(4, 4, StrengthRating::Strong, &config);
        assert_eq!(score.rating, StrengthRating::InsufficientData);
        assert_eq!(score.citing_opinion_count, 4);
    }

    #[test]
    fn test_rating_passes_through_at_threshold() {
        let config = ValidationConfig::default();
        let score = to_strength_score(5, 1, StrengthRating::Weak, &config);
        assert_eq!(score.rating, StrengthRating::Weak);
        assert_eq!(score.citing_opinions_last_10_years, 1);
    }
}
