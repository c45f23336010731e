// Fantasy-point scoring with a fixed linear formula.

use serde::Serialize;

use crate::category::{PuntSelection, StatKey};
use crate::record::StatRecord;

/// Points awarded per unit of each stat. This is a league rule, not a tuning
/// knob; the table order is also the summation order.
///
/// Turnovers always count at -1 unless excluded. The commonly quoted sample
/// line (30 PTS, 10 REB, 5 AST, 2 STL, 1 BLK, 3 3PM, 12/20 FG, 5/6 FT, 4 TO)
/// is written up as 64.0, but that total leaves out the turnovers. This table
/// scores it 60.0, and 64.0 only with turnovers excluded.
pub const FANTASY_WEIGHTS: [(StatKey, f64); 11] = [
    (StatKey::Points, 1.0),
    (StatKey::Rebounds, 1.2),
    (StatKey::Assists, 1.5),
    (StatKey::Steals, 3.0),
    (StatKey::Blocks, 3.0),
    (StatKey::ThreePointers, 0.5),
    (StatKey::FieldGoalsMade, 1.0),
    (StatKey::FieldGoalsAttempted, -0.5),
    (StatKey::FreeThrowsMade, 1.0),
    (StatKey::FreeThrowsAttempted, -0.5),
    (StatKey::Turnovers, -1.0),
];

/// Fantasy points for a record, skipping excluded keys.
///
/// Absent stats count as 0. No rounding is applied.
pub fn score_fantasy_points(record: &StatRecord, excluded: &PuntSelection) -> f64 {
    FANTASY_WEIGHTS
        .iter()
        .filter(|(key, _)| !excluded.contains(*key))
        .map(|(key, weight)| record.value_or_zero(*key) * weight)
        .sum()
}

/// A record's fantasy ranking with and without an exclusion set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FantasyRanked<'a> {
    #[serde(skip)]
    pub record: &'a StatRecord,
    pub points: f64,
    pub adjusted_points: f64,
    pub original_rank: usize,
    pub adjusted_rank: usize,
    pub rank_change: i64,
}

/// Rank records by fantasy points, returning them in adjusted order.
///
/// The original ranking uses the full formula; the adjusted ranking skips
/// `excluded`. Both sorts are stable.
pub fn rank_by_fantasy_points<'a>(
    records: &'a [StatRecord],
    excluded: &PuntSelection,
) -> Vec<FantasyRanked<'a>> {
    let none = PuntSelection::new();
    let mut ranked: Vec<FantasyRanked<'a>> = records
        .iter()
        .map(|record| FantasyRanked {
            record,
            points: score_fantasy_points(record, &none),
            adjusted_points: score_fantasy_points(record, excluded),
            original_rank: 0,
            adjusted_rank: 0,
            rank_change: 0,
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.points
            .partial_cmp(&a.points)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    for (pos, r) in ranked.iter_mut().enumerate() {
        r.original_rank = pos + 1;
    }

    ranked.sort_by(|a, b| {
        b.adjusted_points
            .partial_cmp(&a.adjusted_points)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    for (pos, r) in ranked.iter_mut().enumerate() {
        r.adjusted_rank = pos + 1;
        r.rank_change = r.original_rank as i64 - r.adjusted_rank as i64;
    }
    ranked
}
