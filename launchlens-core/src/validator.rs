//! Consistency checks for raw launch metrics.
//!
//! Validation never coerces contradictory input. The result is a tagged
//! [`ValidationOutcome`]: either metrics that satisfy every invariant, a list
//! of blocking contradictions, or a request to retry once more data exists.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::RawMetrics;

/// Highest list price accepted as plausible.
pub const MAX_PRICE: f64 = 200.0;
/// Owner count below which a product with no reviews cannot be scored.
pub const MIN_OWNERS_WITHOUT_REVIEWS: u64 = 50;
/// Review count below which results carry a small-sample banner.
pub const LOW_REVIEW_SAMPLE: u64 = 5;

const EXPECTED_REVENUE_LOW_FACTOR: f64 = 0.5 * 0.5;
const EXPECTED_REVENUE_HIGH_FACTOR: f64 = 1.0 * 1.5;
const REVIEW_RATE_MIN: f64 = 1.0;
const REVIEW_RATE_MAX: f64 = 15.0;
const SMALL_SAMPLE_REVIEWS: u64 = 10;
const SMALL_SAMPLE_PERCENTAGE: f64 = 90.0;
const LOW_DAILY_REVENUE: f64 = 10.0;
const LOW_REVENUE_OWNER_REACH: u64 = 500;

/// Result of validating a [`RawMetrics`] record.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationOutcome {
    /// Metrics are internally consistent.
    Valid(ValidatedMetrics),
    /// Metrics contradict themselves; the pipeline must stop.
    DataError(CriticalDataError),
    /// Too little data exists yet; the caller should retry later.
    Insufficient(InsufficientDataError),
}

/// Kinds of blocking contradictions.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CriticalIssueKind {
    /// Revenue below zero.
    NegativeRevenue,
    /// More reviews than owners.
    ReviewsExceedOwners,
    /// Positive and negative reviews do not add up to the total.
    ReviewBreakdownMismatch,
    /// A count below zero.
    NegativeCount,
    /// Price outside `0..=200`.
    PriceOutOfRange,
    /// Zero or negative days since launch.
    NonPositiveDays,
    /// A NaN or infinite amount.
    NonFiniteValue,
    /// Reviews exist but neither counts nor a percentage describe them.
    MissingReviewBreakdown,
}

/// A blocking contradiction found in the input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriticalIssue {
    /// Contradiction category.
    pub kind: CriticalIssueKind,
    /// Explanation naming the offending values.
    pub message: String,
}

impl CriticalIssue {
    fn new(kind: CriticalIssueKind, message: String) -> Self {
        Self { kind, message }
    }
}

/// All blocking contradictions found in one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriticalDataError {
    /// Every contradiction, in check order.
    pub issues: Vec<CriticalIssue>,
}

impl CriticalDataError {
    /// Whether a contradiction of the given kind was found.
    pub fn has(&self, kind: CriticalIssueKind) -> bool {
        self.issues.iter().any(|issue| issue.kind == kind)
    }
}

impl fmt::Display for CriticalDataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = self.issues.iter().map(|i| i.message.as_str()).collect();
        write!(f, "critical data error: {}", messages.join("; "))
    }
}

/// Signals that the product has not accumulated enough data to be scored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsufficientDataError {
    /// What is missing.
    pub reason: String,
    /// When to try again.
    pub guidance: String,
}

impl fmt::Display for InsufficientDataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "insufficient data: {}", self.reason)
    }
}

/// Kinds of advisory warnings.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// Fewer than five reviews.
    LowReviewSample,
    /// Revenue far below what owners and price suggest.
    RevenueBelowExpected,
    /// Revenue far above what owners and price suggest.
    RevenueAboveExpected,
    /// Fewer than one review per hundred owners.
    ReviewRateLow,
    /// More than fifteen reviews per hundred owners.
    ReviewRateHigh,
    /// Very positive sentiment from very few reviews.
    UnreliableSentiment,
    /// Almost no revenue despite a large audience.
    LowRevenueForReach,
}

/// A non-blocking advisory attached to valid metrics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationWarning {
    /// Warning category.
    pub kind: WarningKind,
    /// Advisory text shown to the reader.
    pub message: String,
}

/// Review totals consumed by the aggregator.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ReviewMetrics {
    /// Total reviews.
    pub total: u64,
    /// Positive share, 0-100.
    pub percentage: f64,
}

/// Metrics that passed every critical check, with derived ratios.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidatedMetrics {
    name: String,
    app_id: String,
    revenue: f64,
    days_since_launch: u64,
    review_count_total: u64,
    review_count_positive: u64,
    review_count_negative: u64,
    owner_count: u64,
    price: f64,
    release_date: Option<NaiveDate>,
    genres: Vec<String>,
    daily_revenue: f64,
    review_percentage: f64,
    review_rate: f64,
    revenue_per_owner: f64,
    warnings: Vec<ValidationWarning>,
}

impl ValidatedMetrics {
    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Store identifier.
    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    /// Gross revenue.
    pub fn revenue(&self) -> f64 {
        self.revenue
    }

    /// Days since launch, always positive.
    pub fn days_since_launch(&self) -> u64 {
        self.days_since_launch
    }

    /// Total reviews.
    pub fn review_count_total(&self) -> u64 {
        self.review_count_total
    }

    /// Positive reviews.
    pub fn review_count_positive(&self) -> u64 {
        self.review_count_positive
    }

    /// Negative reviews.
    pub fn review_count_negative(&self) -> u64 {
        self.review_count_negative
    }

    /// Estimated owners.
    pub fn owner_count(&self) -> u64 {
        self.owner_count
    }

    /// List price.
    pub fn price(&self) -> f64 {
        self.price
    }

    /// Release date, when known.
    pub fn release_date(&self) -> Option<NaiveDate> {
        self.release_date
    }

    /// Store genres.
    pub fn genres(&self) -> &[String] {
        &self.genres
    }

    /// Revenue per day since launch.
    pub fn daily_revenue(&self) -> f64 {
        self.daily_revenue
    }

    /// Positive review share, 0-100.
    pub fn review_percentage(&self) -> f64 {
        self.review_percentage
    }

    /// Reviews per hundred owners.
    pub fn review_rate(&self) -> f64 {
        self.review_rate
    }

    /// Revenue divided by owners.
    pub fn revenue_per_owner(&self) -> f64 {
        self.revenue_per_owner
    }

    /// Advisory warnings raised during validation.
    pub fn warnings(&self) -> &[ValidationWarning] {
        &self.warnings
    }

    /// Whether a warning of the given kind was raised.
    pub fn has_warning(&self, kind: WarningKind) -> bool {
        self.warnings.iter().any(|warning| warning.kind == kind)
    }

    /// Review totals for score aggregation.
    pub fn review_metrics(&self) -> ReviewMetrics {
        ReviewMetrics {
            total: self.review_count_total,
            percentage: self.review_percentage,
        }
    }
}

/// Validate a raw metrics record.
pub fn validate_metrics(raw: &RawMetrics) -> ValidationOutcome {
    let mut issues = Vec::new();
    check_amounts(raw, &mut issues);
    check_counts(raw, &mut issues);
    let breakdown = resolve_breakdown(raw, &mut issues);

    if !issues.is_empty() {
        return ValidationOutcome::DataError(CriticalDataError { issues });
    }
    let Some((positive, negative)) = breakdown else {
        return ValidationOutcome::DataError(CriticalDataError {
            issues: vec![CriticalIssue::new(
                CriticalIssueKind::MissingReviewBreakdown,
                "review breakdown could not be determined".to_string(),
            )],
        });
    };

    // Every critical check passed, so the casts below cannot lose sign.
    let total = raw.review_count_total as u64;
    let owners = raw.owner_count as u64;
    let days = raw.days_since_launch as u64;

    if total == 0 && owners < MIN_OWNERS_WITHOUT_REVIEWS {
        return ValidationOutcome::Insufficient(InsufficientDataError {
            reason: format!(
                "no reviews yet and only {owners} estimated owners (at least {MIN_OWNERS_WITHOUT_REVIEWS} needed)"
            ),
            guidance: "Re-run the audit once the product has collected its first reviews \
                       and a larger owner base, typically after another one to two weeks on sale."
                .to_string(),
        });
    }

    let daily_revenue = raw.revenue / days.max(1) as f64;
    let review_percentage = positive as f64 / total.max(1) as f64 * 100.0;
    let review_rate = total as f64 / owners.max(1) as f64 * 100.0;
    let revenue_per_owner = raw.revenue / owners.max(1) as f64;

    let mut metrics = ValidatedMetrics {
        name: raw.name.clone(),
        app_id: raw.app_id.clone(),
        revenue: raw.revenue,
        days_since_launch: days,
        review_count_total: total,
        review_count_positive: positive,
        review_count_negative: negative,
        owner_count: owners,
        price: raw.price,
        release_date: raw.release_date,
        genres: raw.genres.clone(),
        daily_revenue,
        review_percentage,
        review_rate,
        revenue_per_owner,
        warnings: Vec::new(),
    };
    metrics.warnings = collect_warnings(&metrics);
    ValidationOutcome::Valid(metrics)
}

/// Split a review total into positive and negative counts from a percentage.
///
/// The positive count is rounded and the negative count is the remainder, so
/// the two always add up to `total`.
pub fn split_reviews(total: u64, percentage: f64) -> (u64, u64) {
    let share = percentage.clamp(0.0, 100.0) / 100.0;
    let positive = ((total as f64) * share).round() as u64;
    let positive = positive.min(total);
    (positive, total - positive)
}

fn check_amounts(raw: &RawMetrics, issues: &mut Vec<CriticalIssue>) {
    if !raw.revenue.is_finite() {
        issues.push(CriticalIssue::new(
            CriticalIssueKind::NonFiniteValue,
            "revenue is not a finite amount".to_string(),
        ));
    } else if raw.revenue < 0.0 {
        issues.push(CriticalIssue::new(
            CriticalIssueKind::NegativeRevenue,
            format!("revenue is negative (${:.2})", raw.revenue),
        ));
    }

    if !raw.price.is_finite() {
        issues.push(CriticalIssue::new(
            CriticalIssueKind::NonFiniteValue,
            "price is not a finite amount".to_string(),
        ));
    } else if raw.price < 0.0 || raw.price > MAX_PRICE {
        issues.push(CriticalIssue::new(
            CriticalIssueKind::PriceOutOfRange,
            format!(
                "price ${:.2} is outside the accepted range $0-${MAX_PRICE:.0}",
                raw.price
            ),
        ));
    }

    if raw.days_since_launch <= 0 {
        issues.push(CriticalIssue::new(
            CriticalIssueKind::NonPositiveDays,
            format!(
                "days since launch must be positive (got {})",
                raw.days_since_launch
            ),
        ));
    }
}

fn check_counts(raw: &RawMetrics, issues: &mut Vec<CriticalIssue>) {
    let counts = [
        ("review_count_total", Some(raw.review_count_total)),
        ("review_count_positive", raw.review_count_positive),
        ("review_count_negative", raw.review_count_negative),
        ("owner_count", Some(raw.owner_count)),
    ];
    for (field, value) in counts {
        if let Some(value) = value.filter(|value| *value < 0) {
            issues.push(CriticalIssue::new(
                CriticalIssueKind::NegativeCount,
                format!("{field} is negative ({value})"),
            ));
        }
    }

    if raw.review_count_total > raw.owner_count && raw.owner_count >= 0 {
        issues.push(CriticalIssue::new(
            CriticalIssueKind::ReviewsExceedOwners,
            format!(
                "{} reviews exceed {} estimated owners",
                raw.review_count_total, raw.owner_count
            ),
        ));
    }
}

fn resolve_breakdown(raw: &RawMetrics, issues: &mut Vec<CriticalIssue>) -> Option<(u64, u64)> {
    let total = raw.review_count_total;
    if total < 0 {
        return None;
    }
    let mismatch = |positive: i64, negative: i64| {
        CriticalIssue::new(
            CriticalIssueKind::ReviewBreakdownMismatch,
            format!("{positive} positive + {negative} negative reviews do not equal the {total} total"),
        )
    };

    match (
        raw.review_count_positive,
        raw.review_count_negative,
        raw.review_score_percent,
    ) {
        (Some(positive), Some(negative), _) => {
            if positive < 0 || negative < 0 {
                return None;
            }
            if positive.checked_add(negative) != Some(total) {
                issues.push(mismatch(positive, negative));
                return None;
            }
            Some((positive as u64, negative as u64))
        }
        (Some(known), None, _) | (None, Some(known), _) => {
            if known < 0 {
                return None;
            }
            let rest = total - known;
            if rest < 0 {
                let (positive, negative) = if raw.review_count_positive.is_some() {
                    (known, rest)
                } else {
                    (rest, known)
                };
                issues.push(mismatch(positive, negative));
                return None;
            }
            if raw.review_count_positive.is_some() {
                Some((known as u64, rest as u64))
            } else {
                Some((rest as u64, known as u64))
            }
        }
        (None, None, Some(percentage)) => {
            if !percentage.is_finite() || !(0.0..=100.0).contains(&percentage) {
                issues.push(CriticalIssue::new(
                    CriticalIssueKind::NonFiniteValue,
                    format!("review score percentage {percentage} is outside 0-100"),
                ));
                return None;
            }
            Some(split_reviews(total as u64, percentage))
        }
        (None, None, None) if total == 0 => Some((0, 0)),
        (None, None, None) => {
            issues.push(CriticalIssue::new(
                CriticalIssueKind::MissingReviewBreakdown,
                format!("{total} reviews reported without positive/negative counts or a score percentage"),
            ));
            None
        }
    }
}

fn collect_warnings(metrics: &ValidatedMetrics) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();
    let total = metrics.review_count_total;
    let owners = metrics.owner_count;

    if total < LOW_REVIEW_SAMPLE {
        warnings.push(ValidationWarning {
            kind: WarningKind::LowReviewSample,
            message: format!(
                "Only {total} review(s) so far; review-based conclusions are provisional."
            ),
        });
    }

    if metrics.price > 0.0 && owners > 0 {
        let gross = owners as f64 * metrics.price;
        let low = gross * EXPECTED_REVENUE_LOW_FACTOR;
        let high = gross * EXPECTED_REVENUE_HIGH_FACTOR;
        if metrics.revenue < low {
            warnings.push(ValidationWarning {
                kind: WarningKind::RevenueBelowExpected,
                message: format!(
                    "Revenue ${:.0} is suspiciously low for {owners} owners at ${:.2} (expected at least ${low:.0}).",
                    metrics.revenue, metrics.price
                ),
            });
        } else if metrics.revenue > high {
            warnings.push(ValidationWarning {
                kind: WarningKind::RevenueAboveExpected,
                message: format!(
                    "Revenue ${:.0} is suspiciously high for {owners} owners at ${:.2} (expected at most ${high:.0}).",
                    metrics.revenue, metrics.price
                ),
            });
        }
    }

    if owners > 0 {
        let rate = metrics.review_rate;
        if rate < REVIEW_RATE_MIN {
            warnings.push(ValidationWarning {
                kind: WarningKind::ReviewRateLow,
                message: format!(
                    "Only {rate:.2} reviews per 100 owners; owner estimates may be inflated."
                ),
            });
        } else if rate > REVIEW_RATE_MAX {
            warnings.push(ValidationWarning {
                kind: WarningKind::ReviewRateHigh,
                message: format!(
                    "{rate:.2} reviews per 100 owners is unusually high; owner estimates may be too low."
                ),
            });
        }
    }

    if total < SMALL_SAMPLE_REVIEWS && metrics.review_percentage > SMALL_SAMPLE_PERCENTAGE {
        warnings.push(ValidationWarning {
            kind: WarningKind::UnreliableSentiment,
            message: format!(
                "{:.0}% positive from {total} review(s) is not a reliable signal yet.",
                metrics.review_percentage
            ),
        });
    }

    if metrics.daily_revenue < LOW_DAILY_REVENUE && owners > LOW_REVENUE_OWNER_REACH {
        warnings.push(ValidationWarning {
            kind: WarningKind::LowRevenueForReach,
            message: format!(
                "${:.2}/day is suspiciously low for {owners} owners.",
                metrics.daily_revenue
            ),
        });
    }

    warnings
}
