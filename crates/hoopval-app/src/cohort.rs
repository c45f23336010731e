// Cohort selection: which records define the z-score population.

use hoopval_core::{Cohort, StatRecord};

use crate::config::CohortConfig;

/// Records from the configured season, or all records when none is set.
pub fn season_records(records: &[StatRecord], season: Option<&str>) -> Vec<StatRecord> {
    records
        .iter()
        .filter(|r| season.map_or(true, |s| r.season() == Some(s)))
        .cloned()
        .collect()
}

/// Pick the z-score population from `records`.
///
/// Records below `min_games` are left out, then the `pool_size` records with
/// the most games played are kept. Ties and missing game counts keep input
/// order; a record with no game count sorts after every counted one.
pub fn select_cohort(records: &[StatRecord], config: &CohortConfig) -> Cohort {
    let mut eligible: Vec<&StatRecord> = records
        .iter()
        .filter(|r| config.season.as_deref().map_or(true, |s| r.season() == Some(s)))
        .filter(|r| config.min_games == 0 || r.games_played.unwrap_or(0) >= config.min_games)
        .collect();

    // Stable, so equal game counts keep input order.
    eligible.sort_by(|a, b| b.games_played.cmp(&a.games_played));
    eligible.truncate(config.pool_size);

    eligible.into_iter().cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use hoopval_core::RecordScope;

    fn rec(name: &str, season: &str, games: Option<u32>) -> StatRecord {
        let r = StatRecord::new(name, name, "TST", RecordScope::Season(season.into()));
        match games {
            Some(g) => r.with_games_played(g),
            None => r,
        }
    }

    fn cfg(season: Option<&str>, min_games: u32, pool_size: usize) -> CohortConfig {
        CohortConfig {
            season: season.map(Into::into),
            min_games,
            pool_size,
        }
    }

    fn names(c: &Cohort) -> Vec<&str> {
        c.iter().map(|r| r.player_name.as_str()).collect()
    }

    #[test]
    fn filters_by_season_and_games() {
        let records = vec![
            rec("a", "2023-24", Some(70)),
            rec("b", "2022-23", Some(80)),
            rec("c", "2023-24", Some(10)),
            rec("d", "2023-24", Some(45)),
        ];
        let c = select_cohort(&records, &cfg(Some("2023-24"), 20, 10));
        assert_eq!(names(&c), vec!["a", "d"]);
    }

    #[test]
    fn keeps_top_pool_by_games_with_stable_ties() {
        let records = vec![
            rec("a", "2023-24", Some(50)),
            rec("b", "2023-24", Some(70)),
            rec("c", "2023-24", Some(50)),
            rec("d", "2023-24", Some(60)),
        ];
        let c = select_cohort(&records, &cfg(None, 0, 3));
        assert_eq!(names(&c), vec!["b", "d", "a"]);
    }

    #[test]
    fn missing_games_only_pass_without_threshold() {
        let records = vec![rec("a", "2023-24", None), rec("b", "2023-24", Some(30))];
        assert_eq!(names(&select_cohort(&records, &cfg(None, 1, 10))), vec!["b"]);
        assert_eq!(names(&select_cohort(&records, &cfg(None, 0, 10))), vec!["b", "a"]);
    }

    #[test]
    fn season_filter_for_scoring() {
        let records = vec![rec("a", "2023-24", None), rec("b", "2022-23", None)];
        assert_eq!(season_records(&records, Some("2022-23")).len(), 1);
        assert_eq!(season_records(&records, None).len(), 2);
    }
}
