use crate::models::{FairnessScore, ImbalanceLevel, ShiftCount, ShiftHistory};

pub const HOLIDAY_WEIGHT: f64 = 3.0;
pub const NIGHT_WEIGHT: f64 = 2.0;
pub const WEEKEND_WEIGHT: f64 = 1.5;
/// Extra factor for shifts that are planned but not yet worked.
pub const FUTURE_MULTIPLIER: f64 = 1.5;

const MEDIUM_DEVIATION_PCT: f64 = 20.0;
const HIGH_DEVIATION_PCT: f64 = 40.0;

pub fn weighted_count(count: &ShiftCount) -> f64 {
    count.holiday_shifts_count as f64 * HOLIDAY_WEIGHT
        + count.night_shifts_count as f64 * NIGHT_WEIGHT
        + count.weekend_shifts_count as f64 * WEEKEND_WEIGHT
}

pub fn weighted_burden(history: &ShiftHistory) -> f64 {
    weighted_count(&history.historical) + weighted_count(&history.future) * FUTURE_MULTIPLIER
}

/// Min-max rescales burdens onto 0..=100, least burdened first.
///
/// The range never drops below 1, so an evenly loaded cohort scores 100
/// across the board.
pub fn normalize(totals: &[f64]) -> Vec<f64> {
    if totals.is_empty() {
        return Vec::new();
    }

    let min = totals.iter().copied().fold(f64::INFINITY, f64::min);
    let max = totals.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = (max - min).max(1.0);

    totals
        .iter()
        .map(|total| 100.0 - ((total - min) / range * 100.0))
        .collect()
}

/// Anything up to 20% above the mean still counts as low.
pub fn classify_imbalance(total_weighted: f64, mean: f64) -> ImbalanceLevel {
    if total_weighted <= mean || mean <= 0.0 {
        return ImbalanceLevel::Low;
    }

    let deviation = (total_weighted - mean) / mean * 100.0;
    if deviation > HIGH_DEVIATION_PCT {
        ImbalanceLevel::High
    } else if deviation > MEDIUM_DEVIATION_PCT {
        ImbalanceLevel::Medium
    } else {
        ImbalanceLevel::Low
    }
}

pub fn analyze(histories: &[ShiftHistory]) -> Vec<FairnessScore> {
    if histories.is_empty() {
        return Vec::new();
    }

    let totals: Vec<f64> = histories.iter().map(weighted_burden).collect();
    let mean = totals.iter().sum::<f64>() / totals.len() as f64;
    let fairness = normalize(&totals);

    histories
        .iter()
        .zip(totals.iter().zip(fairness))
        .map(|(history, (&total_weighted, fairness_score))| FairnessScore {
            user_id: history.user_id,
            past_weekend: history.historical.weekend_shifts_count,
            past_night: history.historical.night_shifts_count,
            past_holiday: history.historical.holiday_shifts_count,
            future_weekend: history.future.weekend_shifts_count,
            future_night: history.future.night_shifts_count,
            future_holiday: history.future.holiday_shifts_count,
            total_weighted,
            fairness_score,
            imbalance_level: classify_imbalance(total_weighted, mean),
        })
        .collect()
}

/// Most burdened users first.
pub fn sort_by_burden(scores: &mut [FairnessScore]) {
    scores.sort_by(|a, b| {
        b.total_weighted
            .partial_cmp(&a.total_weighted)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn history(past: (u32, u32, u32), future: (u32, u32, u32)) -> ShiftHistory {
        let user_id = Uuid::new_v4();
        ShiftHistory {
            user_id,
            historical: ShiftCount {
                user_id,
                weekend_shifts_count: past.0,
                night_shifts_count: past.1,
                holiday_shifts_count: past.2,
            },
            future: ShiftCount {
                user_id,
                weekend_shifts_count: future.0,
                night_shifts_count: future.1,
                holiday_shifts_count: future.2,
            },
        }
    }

    #[test]
    fn burden_applies_weights_and_future_factor() {
        let past_only = history((2, 1, 1), (0, 0, 0));
        assert!((weighted_burden(&past_only) - (3.0 + 2.0 + 3.0)).abs() < 1e-9);

        let future_only = history((0, 0, 0), (2, 1, 1));
        let expected = 1.0 * 3.0 * 1.5 + 1.0 * 2.0 * 1.5 + 2.0 * 1.5 * 1.5;
        assert!((weighted_burden(&future_only) - expected).abs() < 1e-9);
    }

    #[test]
    fn empty_counts_weigh_nothing() {
        assert_eq!(weighted_burden(&history((0, 0, 0), (0, 0, 0))), 0.0);
    }

    #[test]
    fn normalizes_min_to_100_and_max_to_0() {
        assert_eq!(normalize(&[10.0, 20.0, 30.0]), vec![100.0, 50.0, 0.0]);
    }

    #[test]
    fn equal_burden_scores_everyone_100() {
        assert_eq!(normalize(&[7.5, 7.5, 7.5]), vec![100.0, 100.0, 100.0]);
        assert!(normalize(&[]).is_empty());
    }

    #[test]
    fn narrow_range_is_not_stretched() {
        // max - min = 0.5 is below the floor of 1
        let scores = normalize(&[4.0, 4.5]);
        assert_eq!(scores, vec![100.0, 50.0]);
    }

    #[test]
    fn fairness_decreases_as_burden_grows() {
        let scores = normalize(&[3.0, 12.0, 0.0, 7.5, 12.0]);
        let mut pairs: Vec<(f64, f64)> = [3.0, 12.0, 0.0, 7.5, 12.0]
            .into_iter()
            .zip(scores)
            .collect();
        pairs.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap());
        for window in pairs.windows(2) {
            assert!(window[0].1 >= window[1].1);
        }
    }

    #[test]
    fn imbalance_thresholds_follow_deviation() {
        assert_eq!(classify_imbalance(10.0, 20.0), ImbalanceLevel::Low);
        assert_eq!(classify_imbalance(20.0, 20.0), ImbalanceLevel::Low);
        assert_eq!(classify_imbalance(23.0, 20.0), ImbalanceLevel::Low);
        assert_eq!(classify_imbalance(24.0, 20.0), ImbalanceLevel::Low);
        assert_eq!(classify_imbalance(25.0, 20.0), ImbalanceLevel::Medium);
        assert_eq!(classify_imbalance(28.0, 20.0), ImbalanceLevel::Medium);
        assert_eq!(classify_imbalance(29.0, 20.0), ImbalanceLevel::High);
        assert_eq!(classify_imbalance(30.0, 20.0), ImbalanceLevel::High);
    }

    #[test]
    fn cohort_example_matches_expected_levels() {
        // weekend-only past counts give burdens of 10.5, 21 and 31.5 in a 1:2:3 ratio
        let cohort = vec![
            history((7, 0, 0), (0, 0, 0)),
            history((14, 0, 0), (0, 0, 0)),
            history((21, 0, 0), (0, 0, 0)),
        ];
        let scores = analyze(&cohort);

        assert_eq!(scores.len(), 3);
        assert!((scores[0].fairness_score - 100.0).abs() < 1e-9);
        assert!((scores[1].fairness_score - 50.0).abs() < 1e-9);
        assert!(scores[2].fairness_score.abs() < 1e-9);
        assert_eq!(scores[0].imbalance_level, ImbalanceLevel::Low);
        assert_eq!(scores[1].imbalance_level, ImbalanceLevel::Low);
        assert_eq!(scores[2].imbalance_level, ImbalanceLevel::High);
    }

    #[test]
    fn nobody_at_or_below_mean_is_flagged() {
        let cohort = vec![
            history((1, 0, 0), (0, 1, 0)),
            history((0, 4, 1), (2, 0, 0)),
            history((0, 0, 0), (0, 0, 0)),
            history((3, 3, 3), (1, 1, 1)),
        ];
        let scores = analyze(&cohort);
        let mean = scores.iter().map(|s| s.total_weighted).sum::<f64>() / scores.len() as f64;

        for score in scores.iter().filter(|s| s.total_weighted <= mean) {
            assert_eq!(score.imbalance_level, ImbalanceLevel::Low);
        }
    }

    #[test]
    fn analyze_copies_raw_counts() {
        let cohort = vec![history((1, 2, 3), (4, 5, 6))];
        let score = &analyze(&cohort)[0];
        assert_eq!(
            (score.past_weekend, score.past_night, score.past_holiday),
            (1, 2, 3)
        );
        assert_eq!(
            (score.future_weekend, score.future_night, score.future_holiday),
            (4, 5, 6)
        );
        assert_eq!(score.fairness_score, 100.0);
    }

    #[test]
    fn sorts_most_burdened_first() {
        let mut scores = analyze(&[
            history((1, 0, 0), (0, 0, 0)),
            history((0, 0, 2), (0, 0, 0)),
        ]);
        sort_by_burden(&mut scores);
        assert!(scores[0].total_weighted > scores[1].total_weighted);
    }
}
