//! Property-based tests for grading and ranking.
//!
//! Key invariants:
//! - Both grade tables are total over i32 and monotonic in score
//! - Out-of-range scores map to the boundary tier
//! - Comparison rank always lies in 1..=n and matches the sorted position
//! - Benchmark global rank stays inside the population

use device_inspector::engine::benchmark::global_rank;
use device_inspector::engine::comparison::{percentile, rank_of};
use device_inspector::{HealthStatus, PerformanceGrade};
use proptest::prelude::*;

fn status_order(status: HealthStatus) -> u8 {
    match status {
        HealthStatus::Critical => 0,
        HealthStatus::Poor => 1,
        HealthStatus::Fair => 2,
        HealthStatus::Good => 3,
        HealthStatus::Excellent => 4,
    }
}

fn grade_order(grade: PerformanceGrade) -> u8 {
    match grade {
        PerformanceGrade::F => 0,
        PerformanceGrade::D => 1,
        PerformanceGrade::C => 2,
        PerformanceGrade::CPlus => 3,
        PerformanceGrade::B => 4,
        PerformanceGrade::BPlus => 5,
        PerformanceGrade::A => 6,
        PerformanceGrade::APlus => 7,
        PerformanceGrade::S => 8,
        PerformanceGrade::SPlus => 9,
    }
}

proptest! {
    /// A higher score never maps to a lower health tier.
    #[test]
    fn health_status_is_monotonic(a in any::<i32>(), b in any::<i32>()) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(
            status_order(HealthStatus::from_score(lo)) <= status_order(HealthStatus::from_score(hi))
        );
    }

    /// A higher score never maps to a lower grade.
    #[test]
    fn performance_grade_is_monotonic(a in any::<i32>(), b in any::<i32>()) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(
            grade_order(PerformanceGrade::from_score(lo)) <= grade_order(PerformanceGrade::from_score(hi))
        );
    }

    /// Scores outside 0..=100 land on the boundary tiers.
    #[test]
    fn out_of_range_scores_clamp(over in 101..=i32::MAX, under in i32::MIN..0) {
        prop_assert_eq!(HealthStatus::from_score(over), HealthStatus::Excellent);
        prop_assert_eq!(HealthStatus::from_score(under), HealthStatus::Critical);
        prop_assert_eq!(PerformanceGrade::from_score(over), PerformanceGrade::SPlus);
        prop_assert_eq!(PerformanceGrade::from_score(under), PerformanceGrade::F);
    }

    /// Rank equals the first position of the current value in the descending sort.
    #[test]
    fn rank_matches_sorted_position(
        current in 0u32..200,
        others in prop::collection::vec(0u32..200, 1..12),
    ) {
        let current = current as f64;
        let others: Vec<f64> = others.into_iter().map(f64::from).collect();
        let rank = rank_of(current, &others);

        let mut all = others.clone();
        all.push(current);
        all.sort_by(|a, b| b.total_cmp(a));
        let position = all.iter().position(|v| *v == current).unwrap() as u32 + 1;

        prop_assert_eq!(rank, position);
        prop_assert!(rank >= 1 && rank as usize <= all.len());
    }

    /// Percentile stays in (0, 100] for any valid rank.
    #[test]
    fn percentile_is_bounded(total in 1u32..1000, offset in 0u32..1000) {
        let rank = 1 + offset % total;
        let p = percentile(rank, total);
        prop_assert!(p > 0.0 && p <= 100.0);
    }

    /// Global rank never leaves the simulated population.
    #[test]
    fn global_rank_in_population(score in any::<i32>(), total in 1u32..200_000) {
        let rank = global_rank(score, total);
        prop_assert!(rank >= 1 && rank <= total);
    }
}
