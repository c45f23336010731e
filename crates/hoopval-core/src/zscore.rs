// Z-score calculation with volume-weighted percentage categories.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::category::{CategorySet, StatCategory, StatKey};
use crate::record::{Cohort, StatRecord};

/// Standard deviations below this are treated as zero spread.
const STDEV_EPSILON: f64 = 1e-9;

/// Shooting contribution: `attempts * (pct - cohort_pct)`
///
/// A shooter above the cohort rate produces a positive contribution that
/// scales with how many shots they take.
pub fn percentage_contribution(attempts: f64, pct: f64, cohort_pct: f64) -> f64 {
    attempts * (pct - cohort_pct)
}

// ---------------------------------------------------------------------------
// Per-category statistics
// ---------------------------------------------------------------------------

/// How a category's raw values are turned into z-score inputs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Weighting {
    Counting,
    /// Percentage weighted by attempts against the cohort's pooled rate.
    VolumeWeighted { cohort_rate: f64 },
    /// Percentage taken at face value; used when attempt data is absent.
    Unweighted,
}

/// One category's z-score inputs summarized over a cohort.
///
/// `mean` and `stdev` are population figures (N denominator): the cohort is
/// the whole population being ranked, not a sample of it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CategoryStats {
    pub category: StatCategory,
    pub weighting: Weighting,
    pub mean: f64,
    pub stdev: f64,
}

impl CategoryStats {
    fn build(cohort: &Cohort, category: StatCategory) -> Self {
        let weighting = if category.is_percentage {
            percentage_weighting(cohort, &category)
        } else {
            Weighting::Counting
        };
        let mut stats = CategoryStats {
            category,
            weighting,
            mean: 0.0,
            stdev: 0.0,
        };
        let inputs: Vec<f64> = cohort.iter().filter_map(|r| stats.input(r)).collect();
        stats.fit(&inputs);
        debug!(
            "{}: {:?} over {} of {} records, mean={:.4}, stdev={:.4}",
            category.key,
            weighting,
            inputs.len(),
            cohort.len(),
            stats.mean,
            stats.stdev
        );
        stats
    }

    /// Set `mean` and `stdev` from the cohort's inputs. No inputs leaves both
    /// at zero.
    fn fit(&mut self, inputs: &[f64]) {
        if inputs.is_empty() {
            return;
        }
        let n = inputs.len() as f64;
        let mean = inputs.iter().sum::<f64>() / n;
        let variance = inputs.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        self.mean = mean;
        self.stdev = variance.sqrt();
    }

    /// Standardize one input. Zero spread means nobody stands out, so every
    /// input scores 0.
    fn standardize(&self, input: f64) -> f64 {
        if self.stdev < STDEV_EPSILON {
            0.0
        } else {
            (input - self.mean) / self.stdev
        }
    }

    /// The value this category z-scores for a record, or `None` when the
    /// record has no usable data (a null percentage). `None` scores as 0.
    pub fn input(&self, record: &StatRecord) -> Option<f64> {
        let key = self.category.key;
        match self.weighting {
            Weighting::Counting => Some(record.value_or_zero(key)),
            Weighting::Unweighted => record.get(key),
            Weighting::VolumeWeighted { cohort_rate } => {
                let volume = self.category.volume?;
                let pct = record.get(key)?;
                let attempts = record.get(volume.attempted)?;
                Some(percentage_contribution(attempts, pct, cohort_rate))
            }
        }
    }

    /// Raw (unsigned) z-score for a record.
    pub fn zscore(&self, record: &StatRecord) -> f64 {
        self.input(record)
            .map(|v| self.standardize(v))
            .unwrap_or(0.0)
    }
}

/// Volume weighting applies only when every record that has the percentage
/// also carries its attempt count.
fn percentage_weighting(cohort: &Cohort, category: &StatCategory) -> Weighting {
    let Some(volume) = category.volume else {
        return Weighting::Unweighted;
    };
    let shooters: Vec<&StatRecord> = cohort.iter().filter(|r| r.has(category.key)).collect();
    if shooters.is_empty() || !shooters.iter().all(|r| r.has(volume.attempted)) {
        return Weighting::Unweighted;
    }

    let mut made = 0.0;
    let mut attempted = 0.0;
    for r in &shooters {
        let att = r.value_or_zero(volume.attempted);
        let pct = r.value_or_zero(category.key);
        made += r.get(volume.made).unwrap_or(pct * att);
        attempted += att;
    }
    let cohort_rate = if attempted > 0.0 { made / attempted } else { 0.0 };
    Weighting::VolumeWeighted { cohort_rate }
}

// ---------------------------------------------------------------------------
// Scored output
// ---------------------------------------------------------------------------

/// One category's z-score for one record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategoryScore {
    pub key: StatKey,
    pub z: f64,
    /// `z` oriented so that larger is better (negated for turnovers).
    pub signed_z: f64,
}

/// A record with its per-category z-scores and total value.
///
/// `total_value` is the sum of `signed_z` over `scores`, in category order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZScoredRecord {
    pub record: StatRecord,
    pub scores: Vec<CategoryScore>,
    pub total_value: f64,
}

impl ZScoredRecord {
    pub fn z(&self, key: StatKey) -> Option<f64> {
        self.scores.iter().find(|s| s.key == key).map(|s| s.z)
    }

    pub fn signed_z(&self, key: StatKey) -> Option<f64> {
        self.scores.iter().find(|s| s.key == key).map(|s| s.signed_z)
    }
}

// ---------------------------------------------------------------------------
// Cohort statistics
// ---------------------------------------------------------------------------

/// Per-category statistics for one cohort, in category-set order.
#[derive(Debug, Clone, PartialEq)]
pub struct CohortStats {
    categories: Vec<CategoryStats>,
}

impl CohortStats {
    pub fn from_cohort(cohort: &Cohort, categories: &CategorySet) -> Self {
        CohortStats {
            categories: categories
                .iter()
                .map(|c| CategoryStats::build(cohort, *c))
                .collect(),
        }
    }

    pub fn get(&self, key: StatKey) -> Option<&CategoryStats> {
        self.categories.iter().find(|c| c.category.key == key)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CategoryStats> {
        self.categories.iter()
    }

    /// Score any record against these statistics, including one that is
    /// not itself a member of the cohort.
    pub fn score(&self, record: &StatRecord) -> ZScoredRecord {
        let scores: Vec<CategoryScore> = self
            .categories
            .iter()
            .map(|stats| {
                let z = stats.zscore(record);
                CategoryScore {
                    key: stats.category.key,
                    z,
                    signed_z: stats.category.signed(z),
                }
            })
            .collect();
        let total_value: f64 = scores.iter().map(|s| s.signed_z).sum();
        ZScoredRecord {
            record: record.clone(),
            scores,
            total_value,
        }
    }
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Z-score every member of a cohort against the cohort itself.
///
/// Output order matches cohort order.
pub fn compute_zscores(cohort: &Cohort, categories: &CategorySet) -> Vec<ZScoredRecord> {
    let stats = CohortStats::from_cohort(cohort, categories);
    cohort.iter().map(|r| stats.score(r)).collect()
}

/// Sort descending by total value. The sort is stable, so equal totals keep
/// their input order.
pub fn rank_by_total_value(mut records: Vec<ZScoredRecord>) -> Vec<ZScoredRecord> {
    records.sort_by(|a, b| {
        b.total_value
            .partial_cmp(&a.total_value)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    records
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
