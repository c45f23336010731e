// Integration tests for the analysis pipeline.
//
// These exercise loading, cohort selection, scoring, punting, team
// aggregation, playoff strength and head-to-head comparison together through
// the public API of both crates.

use std::path::Path;

use chrono::NaiveDate;
use hoopval_app::config::{AnalysisConfig, CohortConfig, Config, DataPaths, PlayoffWindow};
use hoopval_app::loader::{self, Inputs};
use hoopval_app::pipeline;
use hoopval_app::playoff::{games_in_range, strength_values};
use hoopval_app::cohort::select_cohort;
use hoopval_core::{
    compare, compare_scores, compute_zscores, matchup_matrix, CategoryContext, CategorySet,
    CategoryValues, Cohort, CohortStats, Outcome, PuntSelection, RateAggregation, RecordScope,
    SourceShape, StatKey, StatRecord,
};

// ===========================================================================
// Test helpers
// ===========================================================================

/// Fixture directory path (relative to the crate root, which is the cwd for
/// `cargo test`).
const FIXTURES: &str = "tests/fixtures";

fn fixture(name: &str) -> String {
    format!("{FIXTURES}/{name}")
}

fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
    (a - b).abs() < epsilon
}

fn date(m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, m, d).unwrap()
}

fn data_paths() -> DataPaths {
    DataPaths {
        season_rows: fixture("season_rows.json"),
        game_rows: Some(fixture("game_rows.csv")),
        roster: Some(fixture("roster.json")),
        schedule: Some(fixture("schedule.json")),
    }
}

fn config(context: CategoryContext, punt: &[&str]) -> Config {
    Config {
        analysis: AnalysisConfig {
            context,
            categories: CategorySet::for_context(context),
            punt_tokens: punt.iter().map(|s| s.to_string()).collect(),
            punt: PuntSelection::parse(punt).unwrap(),
            rate_aggregation: RateAggregation::SimpleMean,
            exclude_injured: true,
        },
        cohort: CohortConfig {
            season: Some("2023-24".into()),
            min_games: 20,
            pool_size: 100,
        },
        data_paths: data_paths(),
        playoffs: Some(PlayoffWindow {
            start: date(3, 18),
            end: date(3, 22),
        }),
    }
}

fn inputs() -> Inputs {
    loader::load_inputs(&data_paths()).expect("fixtures should load")
}

// ===========================================================================
// Loading
// ===========================================================================

#[test]
fn fixtures_load_completely() {
    let inputs = inputs();
    assert_eq!(inputs.season_records.len(), 7);
    assert_eq!(inputs.game_records.len(), 3);
    assert_eq!(inputs.roster.len(), 4);
    assert_eq!(inputs.schedule.as_ref().map(|s| s.len()), Some(7));

    let game = &inputs.game_records[0];
    assert_eq!(game.game_date(), Some(date(3, 18)));
    assert_eq!(game.team, "BOS");
    assert_eq!(game.get(StatKey::Points), Some(30.0));
}

#[test]
fn csv_and_json_season_rows_agree() {
    let json = loader::load_records(Path::new(&fixture("season_rows.json")), SourceShape::SeasonAverage).unwrap();
    let csv = loader::load_records(Path::new(&fixture("season_rows.csv")), SourceShape::SeasonAverage).unwrap();
    assert_eq!(json.len(), csv.len());

    for (a, b) in json.iter().zip(&csv) {
        assert_eq!(a.player_id, b.player_id);
        assert_eq!(a.player_name, b.player_name);
        assert_eq!(a.scope, b.scope);
        assert_eq!(a.games_played, b.games_played);
        for key in StatKey::ALL {
            match (a.get(key), b.get(key)) {
                (Some(x), Some(y)) => assert!(approx_eq(x, y, 1e-9), "{} {key}", a.player_name),
                (x, y) => assert_eq!(x, y, "{} {key}", a.player_name),
            }
        }
    }
}

#[test]
fn empty_season_file_is_rejected() {
    let tmp = std::env::temp_dir().join("hoopval_empty_season_rows.json");
    std::fs::write(&tmp, "[]").unwrap();
    let paths = DataPaths {
        season_rows: tmp.display().to_string(),
        game_rows: None,
        roster: None,
        schedule: None,
    };
    assert!(matches!(
        loader::load_inputs(&paths).unwrap_err(),
        loader::LoadError::Validation(_)
    ));
    let _ = std::fs::remove_file(&tmp);
}

// ===========================================================================
// Scoring
// ===========================================================================

#[test]
fn three_player_cohort_scenario() {
    let cohort: Cohort = [10.0, 20.0, 30.0]
        .iter()
        .enumerate()
        .map(|(i, pts)| {
            StatRecord::new(format!("{i}"), format!("P{i}"), "TST", RecordScope::Season("2023-24".into()))
                .with(StatKey::Points, *pts)
        })
        .collect();
    let scored = compute_zscores(&cohort, &CategorySet::from_keys([StatKey::Points]));
    let z: Vec<f64> = scored.iter().map(|r| r.z(StatKey::Points).unwrap()).collect();

    assert!(approx_eq(z[0], -1.2247, 1e-4));
    assert!(approx_eq(z[1], 0.0, 1e-12));
    assert!(approx_eq(z[2], 1.2247, 1e-4));
    assert!(approx_eq(z.iter().sum::<f64>(), 0.0, 1e-9));
}

#[test]
fn cohort_zscores_balance_per_category() {
    let inputs = inputs();
    let cfg = config(CategoryContext::Season, &[]);
    let cohort = select_cohort(&inputs.season_records, &cfg.cohort);
    assert_eq!(cohort.len(), 5);

    let scored = compute_zscores(&cohort, &cfg.analysis.categories);
    for category in &cfg.analysis.categories {
        let sum: f64 = scored.iter().map(|r| r.z(category.key).unwrap()).sum();
        assert!(approx_eq(sum, 0.0, 1e-9), "{} sums to {sum}", category.key);
    }
    for r in &scored {
        let signed: f64 = r.scores.iter().map(|s| s.signed_z).sum();
        assert!(approx_eq(r.total_value, signed, 1e-12));
    }
}

#[test]
fn season_run_ranks_everyone_in_season() {
    let report = pipeline::run(&config(CategoryContext::Season, &[]), &inputs());
    assert_eq!(report.cohort_size, 5);
    // The 2022-23 row is out of season; the 4-game row is scored but unpooled.
    assert_eq!(report.rankings.len(), 6);
    assert!(report.rankings.iter().all(|r| r.player_name != "Gus Veteran"));
    assert!(report.rankings.iter().any(|r| r.player_name == "Finn Cameo"));
    for (i, row) in report.rankings.iter().enumerate() {
        assert_eq!(row.adjusted_rank, i + 1);
        assert_eq!(row.rank_change, 0);
        assert_eq!(row.total_value, row.adjusted_total_value);
    }
    // Game rows drive fantasy rankings when present.
    assert_eq!(report.fantasy.len(), 3);
    assert_eq!(report.fantasy[0].player_name, "Bryce Center");
}

#[test]
fn grouped_punt_matches_individual_punt_end_to_end() {
    let inputs = inputs();
    let grouped = pipeline::run(&config(CategoryContext::Game, &["field_goals"]), &inputs);
    let individual = pipeline::run(
        &config(CategoryContext::Game, &["field_goals_made", "field_goals_attempted"]),
        &inputs,
    );
    assert_eq!(grouped.rankings, individual.rankings);
    assert_eq!(grouped.fantasy, individual.fantasy);
}

// ===========================================================================
// Team, playoffs and matchups
// ===========================================================================

#[test]
fn team_aggregate_excludes_injured_and_sums_contributions() {
    let report = pipeline::run(&config(CategoryContext::Season, &[]), &inputs());
    let team = report.team.expect("roster fixture should produce a team");

    assert_eq!(team.member_count, 3);
    assert_eq!(report.excluded_players, vec!["Dante Forward"]);

    let points = team.get(StatKey::Points).unwrap();
    let names: Vec<&str> = points.contributions.iter().map(|c| c.player_name.as_str()).collect();
    assert_eq!(names, vec!["Avery Guard", "Bryce Center", "Eli Sixth"]);
    assert!(approx_eq(points.value, 24.1 + 21.0 + 10.2, 1e-9));

    for agg in &team.categories {
        let z: f64 = agg.contributions.iter().map(|c| c.z).sum();
        assert!(approx_eq(z, agg.z_total, 1e-9));
    }
}

#[test]
fn playoff_strength_weights_by_schedule() {
    let inputs = inputs();
    let cfg = config(CategoryContext::Season, &[]);
    let schedule = inputs.schedule.clone().unwrap();
    assert_eq!(games_in_range(&schedule, "BOS", date(3, 18), date(3, 22)), 3);
    assert_eq!(games_in_range(&schedule, "DEN", date(3, 18), date(3, 22)), 4);

    let report = pipeline::run(&cfg, &inputs);
    let strength = report.playoff_strength.expect("schedule and window are configured");

    let cohort = select_cohort(&inputs.season_records, &cfg.cohort);
    let stats = CohortStats::from_cohort(&cohort, &cfg.analysis.categories);
    let z = |name: &str| {
        let record = inputs
            .season_records
            .iter()
            .find(|r| r.player_name == name)
            .unwrap();
        stats.score(record).signed_z(StatKey::Points).unwrap()
    };
    let expected = z("Avery Guard") * 3.0 + z("Bryce Center") * 4.0 + z("Eli Sixth") * 4.0;
    assert!(approx_eq(strength.get(StatKey::Points).unwrap(), expected, 1e-9));
    assert_eq!(strength.len(), 9);
}

#[test]
fn playoff_strength_comparison_keeps_turnover_direction() {
    let inputs = inputs();
    let cfg = config(CategoryContext::Season, &[]);
    let cats = &cfg.analysis.categories;
    let schedule = inputs.schedule.clone().unwrap();
    let cohort = select_cohort(&inputs.season_records, &cfg.cohort);
    let stats = CohortStats::from_cohort(&cohort, cats);
    let record = |name: &str| {
        inputs
            .season_records
            .iter()
            .find(|r| r.player_name == name)
            .unwrap()
    };
    // Both play for DEN, so the window weights them equally.
    let strength = |name: &str| {
        strength_values(&[stats.score(record(name))], &schedule, date(3, 18), date(3, 22), cats)
    };
    let sixth = strength("Eli Sixth");
    let center = strength("Bryce Center");

    let scored = compare_scores(&sixth, &center, cats);
    let raw = compare(
        &CategoryValues::from(record("Eli Sixth")),
        &CategoryValues::from(record("Bryce Center")),
        cats,
    );
    // 1.7 turnovers against 2.2.
    assert_eq!(scored.outcome(StatKey::Turnovers), Some(Outcome::SideA));
    for key in [StatKey::Points, StatKey::Rebounds, StatKey::Steals, StatKey::Turnovers] {
        assert_eq!(scored.outcome(key), raw.outcome(key), "{key}");
    }
}

#[test]
fn head_to_head_between_rosters() {
    let inputs = inputs();
    let cats = CategorySet::season();
    let values = |name: &str| -> CategoryValues {
        let record = inputs
            .season_records
            .iter()
            .find(|r| r.player_name == name)
            .unwrap();
        CategoryValues::from(record)
    };
    let guard = values("Avery Guard");
    let center = values("Bryce Center");

    let ab = compare(&guard, &center, &cats);
    let ba = compare(&center, &guard, &cats);
    assert_eq!(ab.wins, ba.losses);
    assert_eq!(ab.ties, ba.ties);
    assert_eq!(ab.wins + ab.losses + ab.ties, 9);
    // Fewer turnovers wins the category.
    assert_eq!(ab.outcome(StatKey::Turnovers), Some(Outcome::SideB));

    let m = matchup_matrix(
        &[
            ("Guard".to_string(), guard),
            ("Center".to_string(), center),
            ("Wing".to_string(), values("Cole Wing")),
        ],
        &cats,
    );
    for totals in &m.totals {
        assert_eq!(
            totals.matchup_wins + totals.matchup_losses + totals.matchup_ties,
            2,
            "{}",
            totals.team
        );
    }
}

#[test]
fn rendered_report_has_every_section() {
    let text = pipeline::run(&config(CategoryContext::Season, &["turnovers"]), &inputs()).render();
    assert!(text.contains("punt: turnovers"));
    assert!(text.contains("== Category value =="));
    assert!(text.contains("== Fantasy points =="));
    assert!(text.contains("== Team (3 active) =="));
    assert!(text.contains("excluded: Dante Forward"));
    assert!(text.contains("== Playoff strength =="));
}
