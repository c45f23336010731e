// Team aggregation: roll a roster of scored players up into one entity.

use serde::{Deserialize, Serialize};

use crate::category::{CategorySet, StatCategory, StatKey};
use crate::matchup::CategoryValues;
use crate::zscore::ZScoredRecord;

/// How FG% / FT% are combined across a roster.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateAggregation {
    /// Arithmetic mean of member percentages. Every member counts equally
    /// regardless of attempts; this is the compatible default.
    #[default]
    #[serde(alias = "simple")]
    SimpleMean,
    /// Total made over total attempted. Falls back to the simple mean when any
    /// contributing member lacks attempt volume.
    VolumeWeighted,
}

/// One roster member's share of a category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contribution {
    pub player_name: String,
    /// Raw stat value; `None` when the member has no value for the category.
    pub value: Option<f64>,
    /// The member's sign-corrected z-score for the category.
    pub z: f64,
}

/// Aggregated figures for one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryAggregate {
    pub key: StatKey,
    /// Summed for counting stats, averaged for percentages.
    pub value: f64,
    /// Sum of member signed z-scores. Never re-z-scored at team level.
    pub z_total: f64,
    /// In roster order.
    pub contributions: Vec<Contribution>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamAggregate {
    pub categories: Vec<CategoryAggregate>,
    pub total_value: f64,
    pub member_count: usize,
}

impl TeamAggregate {
    pub fn get(&self, key: StatKey) -> Option<&CategoryAggregate> {
        self.categories.iter().find(|c| c.key == key)
    }

    /// Raw aggregated values, in each stat's own direction. Compare with
    /// [`compare`](crate::matchup::compare).
    pub fn values(&self) -> CategoryValues {
        self.categories.iter().map(|c| (c.key, c.value)).collect()
    }

    /// Summed signed z-scores per category, larger is better throughout.
    /// Compare with [`compare_scores`](crate::matchup::compare_scores).
    pub fn z_values(&self) -> CategoryValues {
        self.categories.iter().map(|c| (c.key, c.z_total)).collect()
    }
}

/// Aggregate an already-filtered active roster.
///
/// An empty roster yields zero for every category.
pub fn aggregate_team(
    roster: &[ZScoredRecord],
    categories: &CategorySet,
    rates: RateAggregation,
) -> TeamAggregate {
    let categories: Vec<CategoryAggregate> = categories
        .iter()
        .map(|category| aggregate_category(roster, category, rates))
        .collect();
    let total_value: f64 = categories.iter().map(|c| c.z_total).sum();

    TeamAggregate {
        categories,
        total_value,
        member_count: roster.len(),
    }
}

fn aggregate_category(
    roster: &[ZScoredRecord],
    category: &StatCategory,
    rates: RateAggregation,
) -> CategoryAggregate {
    let contributions: Vec<Contribution> = roster
        .iter()
        .map(|member| Contribution {
            player_name: member.record.player_name.clone(),
            value: member.record.get(category.key),
            z: member.signed_z(category.key).unwrap_or(0.0),
        })
        .collect();

    let value = if category.is_percentage {
        match rates {
            RateAggregation::SimpleMean => simple_mean(&contributions),
            RateAggregation::VolumeWeighted => {
                volume_weighted(roster, category).unwrap_or_else(|| simple_mean(&contributions))
            }
        }
    } else {
        contributions.iter().filter_map(|c| c.value).sum()
    };
    let z_total: f64 = contributions.iter().map(|c| c.z).sum();

    CategoryAggregate {
        key: category.key,
        value,
        z_total,
        contributions,
    }
}

fn simple_mean(contributions: &[Contribution]) -> f64 {
    let present: Vec<f64> = contributions.iter().filter_map(|c| c.value).collect();
    if present.is_empty() {
        return 0.0;
    }
    present.iter().sum::<f64>() / present.len() as f64
}

/// Total made over total attempted, or `None` when volume is incomplete.
fn volume_weighted(roster: &[ZScoredRecord], category: &StatCategory) -> Option<f64> {
    let volume = category.volume?;
    let mut made = 0.0;
    let mut attempted = 0.0;
    for member in roster {
        let record = &member.record;
        let Some(pct) = record.get(category.key) else {
            continue;
        };
        let att = record.get(volume.attempted)?;
        made += record.get(volume.made).unwrap_or(pct * att);
        attempted += att;
    }
    (attempted > 0.0).then(|| made / attempted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matchup::{compare, compare_scores, Outcome};
    use crate::record::{Cohort, RecordScope, StatRecord};
    use crate::zscore::compute_zscores;

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    fn player(name: &str, pts: f64, fg_pct: f64, fgm: f64, fga: f64, tov: f64) -> StatRecord {
        StatRecord::new(name, name, "TST", RecordScope::Season("2023-24".into()))
            .with(StatKey::Points, pts)
            .with(StatKey::Rebounds, pts / 3.0)
            .with(StatKey::FieldGoalPercentage, fg_pct)
            .with(StatKey::FieldGoalsMade, fgm)
            .with(StatKey::FieldGoalsAttempted, fga)
            .with(StatKey::Turnovers, tov)
    }

    fn scored_roster() -> (Vec<ZScoredRecord>, CategorySet) {
        let categories = CategorySet::from_keys([
            StatKey::Points,
            StatKey::Rebounds,
            StatKey::FieldGoalPercentage,
            StatKey::Turnovers,
        ]);
        let cohort = Cohort::new(vec![
            player("Starter", 25.0, 0.50, 10.0, 20.0, 3.0),
            player("Bench", 6.0, 1.00, 1.0, 1.0, 0.5),
            player("Wing", 14.0, 0.40, 6.0, 15.0, 1.5),
            player("Big", 12.0, 0.60, 6.0, 10.0, 2.0),
        ]);
        (compute_zscores(&cohort, &categories), categories)
    }

    #[test]
    fn counting_stats_sum_and_contributions_match() {
        let (roster, categories) = scored_roster();
        let team = aggregate_team(&roster, &categories, RateAggregation::SimpleMean);

        for agg in &team.categories {
            if !StatCategory::of(agg.key).is_percentage {
                let sum: f64 = agg.contributions.iter().filter_map(|c| c.value).sum();
                assert!(approx_eq(sum, agg.value, 1e-9), "{}", agg.key);
            }
            let z_sum: f64 = agg.contributions.iter().map(|c| c.z).sum();
            assert!(approx_eq(z_sum, agg.z_total, 1e-9), "{}", agg.key);
        }
        assert!(approx_eq(team.get(StatKey::Points).unwrap().value, 57.0, 1e-9));
    }

    #[test]
    fn contributions_follow_roster_order() {
        let (roster, categories) = scored_roster();
        let team = aggregate_team(&roster, &categories, RateAggregation::SimpleMean);
        let names: Vec<&str> = team
            .get(StatKey::Rebounds)
            .unwrap()
            .contributions
            .iter()
            .map(|c| c.player_name.as_str())
            .collect();
        assert_eq!(names, vec!["Starter", "Bench", "Wing", "Big"]);
    }

    #[test]
    fn percentages_use_simple_mean_by_default() {
        let (roster, categories) = scored_roster();
        let team = aggregate_team(&roster, &categories, RateAggregation::SimpleMean);
        let fg = team.get(StatKey::FieldGoalPercentage).unwrap();
        assert!(approx_eq(fg.value, (0.50 + 1.00 + 0.40 + 0.60) / 4.0, 1e-12));
    }

    #[test]
    fn percentages_volume_weighted_when_requested() {
        let (roster, categories) = scored_roster();
        let team = aggregate_team(&roster, &categories, RateAggregation::VolumeWeighted);
        let fg = team.get(StatKey::FieldGoalPercentage).unwrap();
        assert!(approx_eq(fg.value, 23.0 / 46.0, 1e-12));
    }

    #[test]
    fn volume_weighted_falls_back_without_attempts() {
        let categories = CategorySet::from_keys([StatKey::FieldGoalPercentage]);
        let cohort = Cohort::new(vec![
            StatRecord::new("a", "A", "TST", RecordScope::Aggregate).with(StatKey::FieldGoalPercentage, 0.4),
            StatRecord::new("b", "B", "TST", RecordScope::Aggregate).with(StatKey::FieldGoalPercentage, 0.6),
        ]);
        let roster = compute_zscores(&cohort, &categories);
        let team = aggregate_team(&roster, &categories, RateAggregation::VolumeWeighted);
        assert!(approx_eq(team.get(StatKey::FieldGoalPercentage).unwrap().value, 0.5, 1e-12));
    }

    #[test]
    fn total_value_is_sum_of_member_totals() {
        let (roster, categories) = scored_roster();
        let team = aggregate_team(&roster, &categories, RateAggregation::SimpleMean);
        let members: f64 = roster.iter().map(|r| r.total_value).sum();
        assert!(approx_eq(team.total_value, members, 1e-9));
        assert_eq!(team.member_count, 4);
    }

    #[test]
    fn empty_roster_is_all_zero() {
        let categories = CategorySet::season();
        let team = aggregate_team(&[], &categories, RateAggregation::VolumeWeighted);
        assert_eq!(team.categories.len(), 9);
        for agg in &team.categories {
            assert_eq!(agg.value, 0.0);
            assert_eq!(agg.z_total, 0.0);
            assert!(agg.contributions.is_empty());
        }
        assert_eq!(team.total_value, 0.0);
        assert_eq!(team.member_count, 0);
    }

    #[test]
    fn values_feed_the_comparator() {
        let (roster, categories) = scored_roster();
        let team = aggregate_team(&roster, &categories, RateAggregation::SimpleMean);
        let values = team.values();
        assert_eq!(values.get(StatKey::Points), Some(57.0));
        assert_eq!(values.len(), 4);
        assert!(approx_eq(
            team.z_values().get(StatKey::Turnovers).unwrap(),
            team.get(StatKey::Turnovers).unwrap().z_total,
            1e-12
        ));
    }

    #[test]
    fn low_turnover_team_wins_turnovers_in_both_conventions() {
        let (roster, categories) = scored_roster();
        // Bench and Wing turn it over 2.0 times combined, Starter and Big 5.0.
        let team = |members: [usize; 2]| {
            let active: Vec<ZScoredRecord> = members.iter().map(|&i| roster[i].clone()).collect();
            aggregate_team(&active, &categories, RateAggregation::SimpleMean)
        };
        let careful = team([1, 2]);
        let sloppy = team([0, 3]);
        let tov_z = |t: &TeamAggregate| t.get(StatKey::Turnovers).unwrap().z_total;
        assert!(tov_z(&careful) > tov_z(&sloppy));

        let raw = compare(&careful.values(), &sloppy.values(), &categories);
        let scored = compare_scores(&careful.z_values(), &sloppy.z_values(), &categories);
        for key in [StatKey::Points, StatKey::Rebounds, StatKey::Turnovers] {
            assert_eq!(raw.outcome(key), scored.outcome(key), "{key}");
        }
        assert_eq!(scored.outcome(StatKey::Turnovers), Some(Outcome::SideA));
        assert_eq!(scored.outcome(StatKey::Points), Some(Outcome::SideB));
    }
}
