// Playoff-window strength: z-scores weighted by games played in the window.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use hoopval_core::{CategorySet, CategoryValues, ZScoredRecord};
use serde::{Deserialize, Serialize};

/// NBA schedule as `date -> teams playing that day`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schedule {
    days: BTreeMap<NaiveDate, Vec<String>>,
}

impl Schedule {
    pub fn new(days: BTreeMap<NaiveDate, Vec<String>>) -> Self {
        Schedule { days }
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

/// Games `team` plays between `start` and `end` inclusive. Team codes
/// compare case-insensitively; an inverted range has no games.
pub fn games_in_range(schedule: &Schedule, team: &str, start: NaiveDate, end: NaiveDate) -> u32 {
    if start > end {
        return 0;
    }
    schedule
        .days
        .range(start..=end)
        .filter(|(_, teams)| teams.iter().any(|t| t.eq_ignore_ascii_case(team)))
        .count() as u32
}

/// Per category, the sum over roster members of signed z times the games the
/// member's team plays in the window.
///
/// The values are sign-corrected scores, so larger is better in every
/// category including turnovers. Compare two rosters with
/// [`compare_scores`](hoopval_core::compare_scores), not `compare`.
pub fn strength_values(
    roster: &[ZScoredRecord],
    schedule: &Schedule,
    start: NaiveDate,
    end: NaiveDate,
    categories: &CategorySet,
) -> CategoryValues {
    let games: Vec<f64> = roster
        .iter()
        .map(|m| games_in_range(schedule, &m.record.team, start, end) as f64)
        .collect();

    categories
        .iter()
        .map(|category| {
            let total: f64 = roster
                .iter()
                .zip(&games)
                .map(|(m, g)| m.signed_z(category.key).unwrap_or(0.0) * g)
                .sum();
            (category.key, total)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use hoopval_core::zscore::CategoryScore;
    use hoopval_core::{
        compare_scores, compute_zscores, Cohort, Outcome, RecordScope, StatKey, StatRecord,
    };

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    fn schedule() -> Schedule {
        let mut days = BTreeMap::new();
        days.insert(date(3, 18), vec!["BOS".into(), "LAL".into()]);
        days.insert(date(3, 19), vec!["DEN".into()]);
        days.insert(date(3, 20), vec!["bos".into(), "DEN".into()]);
        days.insert(date(3, 25), vec!["BOS".into()]);
        Schedule::new(days)
    }

    fn member(team: &str, signed: &[(StatKey, f64)]) -> ZScoredRecord {
        let scores: Vec<CategoryScore> = signed
            .iter()
            .map(|(key, s)| CategoryScore {
                key: *key,
                z: *s,
                signed_z: *s,
            })
            .collect();
        ZScoredRecord {
            record: StatRecord::new(team, team, team, RecordScope::Aggregate),
            total_value: scores.iter().map(|s| s.signed_z).sum(),
            scores,
        }
    }

    #[test]
    fn counts_games_inclusively() {
        let s = schedule();
        assert_eq!(games_in_range(&s, "BOS", date(3, 18), date(3, 20)), 2);
        assert_eq!(games_in_range(&s, "BOS", date(3, 18), date(3, 25)), 3);
        assert_eq!(games_in_range(&s, "DEN", date(3, 19), date(3, 19)), 1);
        assert_eq!(games_in_range(&s, "MIA", date(3, 1), date(3, 31)), 0);
        assert_eq!(games_in_range(&s, "BOS", date(3, 25), date(3, 18)), 0);
    }

    #[test]
    fn strength_weights_z_by_games() {
        let roster = vec![
            member("BOS", &[(StatKey::Points, 1.0), (StatKey::Turnovers, -0.5)]),
            member("DEN", &[(StatKey::Points, 0.5), (StatKey::Turnovers, 1.0)]),
        ];
        let cats = CategorySet::from_keys([StatKey::Points, StatKey::Turnovers, StatKey::Blocks]);
        let v = strength_values(&roster, &schedule(), date(3, 18), date(3, 25), &cats);
        // BOS plays 3, DEN plays 2.
        assert!(approx_eq(v.get(StatKey::Points).unwrap(), 3.0 + 1.0, 1e-12));
        assert!(approx_eq(v.get(StatKey::Turnovers).unwrap(), -1.5 + 2.0, 1e-12));
        assert_eq!(v.get(StatKey::Blocks), Some(0.0));
    }

    #[test]
    fn low_turnover_roster_wins_turnover_strength() {
        let cats = CategorySet::from_keys([StatKey::Points, StatKey::Turnovers]);
        let cohort = Cohort::new(vec![
            StatRecord::new("c", "Careful", "MIA", RecordScope::Aggregate)
                .with(StatKey::Points, 20.0)
                .with(StatKey::Turnovers, 1.0),
            StatRecord::new("s", "Sloppy", "LAL", RecordScope::Aggregate)
                .with(StatKey::Points, 20.0)
                .with(StatKey::Turnovers, 5.0),
        ]);
        let scored = compute_zscores(&cohort, &cats);
        let mut days = BTreeMap::new();
        days.insert(date(3, 18), vec!["MIA".to_string(), "LAL".to_string()]);
        let s = Schedule::new(days);

        let careful = strength_values(&scored[..1], &s, date(3, 18), date(3, 18), &cats);
        let sloppy = strength_values(&scored[1..], &s, date(3, 18), date(3, 18), &cats);
        assert_eq!(careful.get(StatKey::Turnovers), Some(1.0));
        assert_eq!(sloppy.get(StatKey::Turnovers), Some(-1.0));

        let r = compare_scores(&careful, &sloppy, &cats);
        assert_eq!(r.outcome(StatKey::Turnovers), Some(Outcome::SideA));
        assert_eq!(r.outcome(StatKey::Points), Some(Outcome::Tie));
        assert_eq!(r.winner(), Outcome::SideA);
    }

    #[test]
    fn schedule_deserializes_from_date_map() {
        let s: Schedule = serde_json::from_str(r#"{"2024-03-18": ["BOS"], "2024-03-19": []}"#).unwrap();
        assert_eq!(s.len(), 2);
        assert_eq!(games_in_range(&s, "BOS", date(3, 1), date(3, 31)), 1);
    }
}
