// Category punting: re-rank entities after excluding categories.
//
// The ranked input is borrowed, never modified, so callers can keep comparing
// original and adjusted ranks from the same source.

use crate::category::PuntSelection;
use crate::zscore::ZScoredRecord;

/// An entity's position before and after punting.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedEntity<'a> {
    pub entity: &'a ZScoredRecord,
    /// 1-based position in the unpunted input.
    pub original_rank: usize,
    /// 1-based position after punting.
    pub adjusted_rank: usize,
    /// `original_rank - adjusted_rank`; positive means the entity rose.
    pub rank_change: i64,
    pub adjusted_total_value: f64,
    /// How many categories survived the punt.
    pub included_categories: usize,
}

/// Adjusted total for one entity: the sum of signed z-scores over the
/// categories not punted, divided by the square root of how many remain.
///
/// Summing k unit-variance z-scores gives variance k, so the `sqrt(k)` divisor
/// keeps totals over different subset sizes on one scale. When nothing is
/// excluded the original total is returned unchanged; when everything is
/// excluded the total is 0.
pub fn adjusted_total_value(entity: &ZScoredRecord, punt: &PuntSelection) -> (f64, usize) {
    let included: Vec<f64> = entity
        .scores
        .iter()
        .filter(|s| !punt.contains(s.key))
        .map(|s| s.signed_z)
        .collect();
    let n = included.len();
    if n == entity.scores.len() {
        return (entity.total_value, n);
    }
    if n == 0 {
        return (0.0, 0);
    }
    (included.iter().sum::<f64>() / (n as f64).sqrt(), n)
}

/// Re-rank a list already ordered by `total_value` descending.
///
/// The punt selection's umbrella tokens are expanded when it is built, so
/// `field_goals` here means both made and attempted. Output is in adjusted
/// rank order; ties keep their original order.
pub fn apply_punt<'a>(ranked: &'a [ZScoredRecord], punt: &PuntSelection) -> Vec<RankedEntity<'a>> {
    let mut entities: Vec<RankedEntity<'a>> = ranked
        .iter()
        .enumerate()
        .map(|(i, entity)| {
            let (adjusted_total_value, included_categories) = adjusted_total_value(entity, punt);
            RankedEntity {
                entity,
                original_rank: i + 1,
                adjusted_rank: i + 1,
                rank_change: 0,
                adjusted_total_value,
                included_categories,
            }
        })
        .collect();

    entities.sort_by(|a, b| {
        b.adjusted_total_value
            .partial_cmp(&a.adjusted_total_value)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    for (pos, e) in entities.iter_mut().enumerate() {
        e.adjusted_rank = pos + 1;
        e.rank_change = e.original_rank as i64 - e.adjusted_rank as i64;
    }
    entities
}
