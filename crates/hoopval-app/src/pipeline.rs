// End-to-end analysis: records in, report out.

use std::collections::HashSet;
use std::fmt;

use hoopval_core::{
    aggregate_team, apply_punt, rank_by_fantasy_points, rank_by_total_value, CategoryContext,
    CategoryValues, CohortStats, StatKey, TeamAggregate, ZScoredRecord,
};
use serde::Serialize;
use tracing::debug;

use crate::cohort::{season_records, select_cohort};
use crate::config::Config;
use crate::loader::Inputs;
use crate::playoff::strength_values;
use crate::roster::{active_records, excludable_ids};

// ---------------------------------------------------------------------------
// Report types
// ---------------------------------------------------------------------------

/// One player's category-value ranking, before and after punting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingRow {
    pub player_name: String,
    pub team: String,
    pub total_value: f64,
    pub adjusted_total_value: f64,
    pub original_rank: usize,
    pub adjusted_rank: usize,
    pub rank_change: i64,
}

/// One player's fantasy-point ranking, before and after punting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FantasyRow {
    pub player_name: String,
    pub team: String,
    pub points: f64,
    pub adjusted_points: f64,
    pub original_rank: usize,
    pub adjusted_rank: usize,
    pub rank_change: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub context: CategoryContext,
    pub categories: Vec<StatKey>,
    pub punt: Vec<String>,
    pub cohort_size: usize,
    /// Category-value rankings in adjusted order.
    pub rankings: Vec<RankingRow>,
    /// Fantasy-point rankings in adjusted order.
    pub fantasy: Vec<FantasyRow>,
    pub team: Option<TeamAggregate>,
    /// Roster players left out of the team totals.
    pub excluded_players: Vec<String>,
    pub playoff_strength: Option<CategoryValues>,
}

impl Report {
    /// Plain-text tables, as printed by the binary.
    pub fn render(&self) -> String {
        self.to_string()
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Run the full analysis over already-loaded inputs.
///
/// Every season record is scored against the cohort's statistics, so players
/// below the games threshold still get a value without skewing the pool.
pub fn run(config: &Config, inputs: &Inputs) -> Report {
    let analysis = &config.analysis;
    let categories = &analysis.categories;

    let records = season_records(&inputs.season_records, config.cohort.season.as_deref());
    let cohort = select_cohort(&records, &config.cohort);
    let stats = CohortStats::from_cohort(&cohort, categories);
    debug!(
        "scoring {} records against a cohort of {}",
        records.len(),
        cohort.len()
    );

    let ranked: Vec<ZScoredRecord> = rank_by_total_value(records.iter().map(|r| stats.score(r)).collect());
    let rankings: Vec<RankingRow> = apply_punt(&ranked, &analysis.punt)
        .into_iter()
        .map(|e| RankingRow {
            player_name: e.entity.record.player_name.clone(),
            team: e.entity.record.team.clone(),
            total_value: e.entity.total_value,
            adjusted_total_value: e.adjusted_total_value,
            original_rank: e.original_rank,
            adjusted_rank: e.adjusted_rank,
            rank_change: e.rank_change,
        })
        .collect();

    let fantasy_source = if inputs.game_records.is_empty() {
        &records
    } else {
        &inputs.game_records
    };
    let fantasy: Vec<FantasyRow> = rank_by_fantasy_points(fantasy_source, &analysis.punt)
        .into_iter()
        .map(|r| FantasyRow {
            player_name: r.record.player_name.clone(),
            team: r.record.team.clone(),
            points: r.points,
            adjusted_points: r.adjusted_points,
            original_rank: r.original_rank,
            adjusted_rank: r.adjusted_rank,
            rank_change: r.rank_change,
        })
        .collect();

    let mut team = None;
    let mut excluded_players = Vec::new();
    let mut playoff_strength = None;
    if !inputs.roster.is_empty() {
        let excluded = if analysis.exclude_injured {
            excludable_ids(&inputs.roster)
        } else {
            HashSet::new()
        };
        excluded_players = inputs
            .roster
            .iter()
            .filter(|e| excluded.contains(&e.yahoo_player_id))
            .map(|e| e.name.clone())
            .collect();

        let active = active_records(&inputs.roster, &ranked, &excluded);
        debug!(
            "team aggregate over {} of {} roster players",
            active.len(),
            inputs.roster.len()
        );
        team = Some(aggregate_team(&active, categories, analysis.rate_aggregation));

        if let (Some(schedule), Some(window)) = (&inputs.schedule, &config.playoffs) {
            playoff_strength = Some(strength_values(
                &active,
                schedule,
                window.start,
                window.end,
                categories,
            ));
        }
    }

    Report {
        context: analysis.context,
        categories: categories.keys(),
        punt: analysis.punt_tokens.clone(),
        cohort_size: cohort.len(),
        rankings,
        fantasy,
        team,
        excluded_players,
        playoff_strength,
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let context = match self.context {
            CategoryContext::Season => "season",
            CategoryContext::Game => "game",
        };
        writeln!(
            f,
            "context: {context}  categories: {}  cohort: {}",
            self.categories.len(),
            self.cohort_size
        )?;
        if self.punt.is_empty() {
            writeln!(f, "punt: none")?;
        } else {
            writeln!(f, "punt: {}", self.punt.join(", "))?;
        }

        writeln!(f)?;
        writeln!(f, "== Category value ==")?;
        writeln!(f, "{:>4}  {:<24} {:<4} {:>8} {:>8} {:>5}", "rank", "player", "team", "total", "punted", "chg")?;
        for row in &self.rankings {
            writeln!(
                f,
                "{:>4}  {:<24} {:<4} {:>8.2} {:>8.2} {:>+5}",
                row.adjusted_rank,
                row.player_name,
                row.team,
                row.total_value,
                row.adjusted_total_value,
                row.rank_change
            )?;
        }

        writeln!(f)?;
        writeln!(f, "== Fantasy points ==")?;
        writeln!(f, "{:>4}  {:<24} {:<4} {:>8} {:>8} {:>5}", "rank", "player", "team", "fp", "punted", "chg")?;
        for row in &self.fantasy {
            writeln!(
                f,
                "{:>4}  {:<24} {:<4} {:>8.1} {:>8.1} {:>+5}",
                row.adjusted_rank, row.player_name, row.team, row.points, row.adjusted_points, row.rank_change
            )?;
        }

        if let Some(team) = &self.team {
            writeln!(f)?;
            writeln!(f, "== Team ({} active) ==", team.member_count)?;
            for agg in &team.categories {
                writeln!(f, "{:<24} {:>10.3} {:>+8.2}", agg.key.to_string(), agg.value, agg.z_total)?;
            }
            writeln!(f, "{:<24} {:>10} {:>+8.2}", "total", "", team.total_value)?;
            if !self.excluded_players.is_empty() {
                writeln!(f, "excluded: {}", self.excluded_players.join(", "))?;
            }
        }

        if let Some(strength) = &self.playoff_strength {
            writeln!(f)?;
            writeln!(f, "== Playoff strength ==")?;
            for (key, value) in strength.iter() {
                writeln!(f, "{:<24} {:>+8.2}", key.to_string(), value)?;
            }
        }
        Ok(())
    }
}
