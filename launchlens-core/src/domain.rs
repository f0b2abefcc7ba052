//! Domain entities for LaunchLens.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{LaunchLensError, Result};

/// Raw launch metrics as supplied by the caller.
///
/// Counts are signed so that contradictory input (negative counts) reaches
/// the validator and is reported instead of failing deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawMetrics {
    /// Display name of the product.
    pub name: String,
    /// Store identifier of the product.
    #[serde(default)]
    pub app_id: String,
    /// Gross revenue since launch.
    pub revenue: f64,
    /// Days elapsed since launch.
    pub days_since_launch: i64,
    /// Total number of reviews.
    pub review_count_total: i64,
    /// Positive reviews, when known.
    #[serde(default)]
    pub review_count_positive: Option<i64>,
    /// Negative reviews, when known.
    #[serde(default)]
    pub review_count_negative: Option<i64>,
    /// Share of positive reviews (0-100), used when the counts are missing.
    #[serde(default)]
    pub review_score_percent: Option<f64>,
    /// Estimated number of owners.
    pub owner_count: i64,
    /// Current list price.
    pub price: f64,
    /// Release date, when known.
    #[serde(default)]
    pub release_date: Option<NaiveDate>,
    /// Store genres.
    #[serde(default)]
    pub genres: Vec<String>,
}

/// Report sections scored by external analyzers.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    /// Store page presentation quality.
    StorePage,
    /// Positioning against competing products.
    CompetitivePositioning,
    /// How well the price fits the market.
    PricingFit,
    /// Community and social reach.
    CommunityReach,
}

impl Section {
    /// Every section, in canonical order.
    pub const ALL: [Section; 4] = [
        Section::StorePage,
        Section::CompetitivePositioning,
        Section::PricingFit,
        Section::CommunityReach,
    ];

    /// Stable identifier used in JSON and cache keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            Section::StorePage => "store_page",
            Section::CompetitivePositioning => "competitive_positioning",
            Section::PricingFit => "pricing_fit",
            Section::CommunityReach => "community_reach",
        }
    }

    /// Human-readable section title.
    pub fn label(&self) -> &'static str {
        match self {
            Section::StorePage => "Store page",
            Section::CompetitivePositioning => "Competitive positioning",
            Section::PricingFit => "Pricing fit",
            Section::CommunityReach => "Community reach",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Highest score a section may carry.
pub const MAX_SECTION_SCORE: u8 = 100;

/// Section scores checked to lie within `0..=100`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<Section, i64>", into = "BTreeMap<Section, i64>")]
pub struct SectionScores(BTreeMap<Section, u8>);

impl SectionScores {
    /// Create an empty score map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a score, rejecting values outside `0..=100`.
    pub fn insert(&mut self, section: Section, value: i64) -> Result<()> {
        let score = checked_score(section, value)?;
        self.0.insert(section, score);
        Ok(())
    }

    /// Score for a section, if one was supplied.
    pub fn get(&self, section: Section) -> Option<u8> {
        self.0.get(&section).copied()
    }

    /// Iterate scores in canonical section order.
    pub fn iter(&self) -> impl Iterator<Item = (Section, u8)> + '_ {
        self.0.iter().map(|(section, score)| (*section, *score))
    }

    /// Number of scored sections.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no section was scored.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl TryFrom<BTreeMap<Section, i64>> for SectionScores {
    type Error = LaunchLensError;

    fn try_from(value: BTreeMap<Section, i64>) -> Result<Self> {
        let mut scores = SectionScores::new();
        for (section, score) in value {
            scores.insert(section, score)?;
        }
        Ok(scores)
    }
}

impl From<SectionScores> for BTreeMap<Section, i64> {
    fn from(value: SectionScores) -> Self {
        value
            .0
            .into_iter()
            .map(|(section, score)| (section, i64::from(score)))
            .collect()
    }
}

/// Check that a section score lies within `0..=100`.
pub fn checked_score(section: Section, value: i64) -> Result<u8> {
    if (0..=i64::from(MAX_SECTION_SCORE)).contains(&value) {
        Ok(value as u8)
    } else {
        Err(LaunchLensError::Other(format!(
            "{section} score {value} is outside 0..=100"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn section_scores_reject_out_of_range_values() {
        let mut scores = SectionScores::new();
        assert!(scores.insert(Section::StorePage, 72).is_ok());
        assert!(scores.insert(Section::PricingFit, 101).is_err());
        assert!(scores.insert(Section::CommunityReach, -1).is_err());
        assert_eq!(scores.len(), 1);
        assert_eq!(scores.get(Section::StorePage), Some(72));
        assert_eq!(scores.get(Section::PricingFit), None);
    }

    #[test]
    fn section_scores_deserialize_through_validation() {
        let scores: SectionScores =
            serde_json::from_str(r#"{"store_page": 80, "pricing_fit": 55}"#).expect("scores");
        assert_eq!(scores.get(Section::StorePage), Some(80));
        assert_eq!(scores.get(Section::PricingFit), Some(55));

        let invalid = serde_json::from_str::<SectionScores>(r#"{"store_page": 250}"#);
        assert!(invalid.is_err());

        let unknown = serde_json::from_str::<SectionScores>(r#"{"vibes": 50}"#);
        assert!(unknown.is_err());
    }

    #[test]
    fn section_scores_iterate_in_canonical_order() {
        let mut scores = SectionScores::new();
        scores.insert(Section::CommunityReach, 10).expect("insert");
        scores.insert(Section::StorePage, 20).expect("insert");
        let order: Vec<Section> = scores.iter().map(|(section, _)| section).collect();
        assert_eq!(order, vec![Section::StorePage, Section::CommunityReach]);
    }

    #[test]
    fn raw_metrics_parse_with_optional_fields_missing() {
        let metrics: RawMetrics = serde_json::from_str(
            r#"{
                "name": "Demo",
                "revenue": 379.0,
                "days_since_launch": 7,
                "review_count_total": 5,
                "review_score_percent": 80.0,
                "owner_count": 100,
                "price": 9.99,
                "release_date": "2024-03-01"
            }"#,
        )
        .expect("metrics");
        assert_eq!(metrics.app_id, "");
        assert_eq!(metrics.review_count_positive, None);
        assert_eq!(
            metrics.release_date,
            NaiveDate::from_ymd_opt(2024, 3, 1)
        );
        assert!(metrics.genres.is_empty());
    }
}
