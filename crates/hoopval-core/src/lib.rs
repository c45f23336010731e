// Library root for the stat normalization and valuation core.
//
// Data flows leaves-first: raw rows -> normalize -> zscore -> {scoring, team}
// -> {punt, matchup}. Every function here is pure and synchronous.

pub mod category;
pub mod matchup;
pub mod normalize;
pub mod punt;
pub mod record;
pub mod scoring;
pub mod team;
pub mod zscore;

pub use category::{
    CategoryContext, CategoryError, CategorySet, PuntSelection, PuntToken, StatCategory,
    StatGroup, StatKey,
};
pub use matchup::{
    compare, compare_scores, matchup_matrix, CategoryOutcome, CategoryValues, MatchupMatrix,
    MatchupResult, MatchupTotals, Outcome,
};
pub use normalize::{normalize, RawStatValue, SourceShape};
pub use punt::{apply_punt, RankedEntity};
pub use record::{Cohort, RecordScope, StatRecord};
pub use scoring::{rank_by_fantasy_points, score_fantasy_points, FantasyRanked};
pub use team::{aggregate_team, CategoryAggregate, Contribution, RateAggregation, TeamAggregate};
pub use zscore::{compute_zscores, rank_by_total_value, CohortStats, ZScoredRecord};
