//! Grade tables: score to tier mapping
//!
//! Both tables are total over `i32`. Scores are clamped into 0..=100 before
//! lookup, so out-of-range input lands on the nearest boundary tier.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lowest score any table accepts.
pub const MIN_SCORE: i32 = 0;
/// Highest score any table accepts.
pub const MAX_SCORE: i32 = 100;

/// Clamp a score into the 0..=100 domain.
pub fn clamp_score(score: i32) -> i32 {
    score.clamp(MIN_SCORE, MAX_SCORE)
}

/// Health tier for a single check or an overall health run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HealthStatus {
    Excellent,
    Good,
    Fair,
    Poor,
    Critical,
}

impl HealthStatus {
    /// [90,100] Excellent, [70,89] Good, [50,69] Fair, [30,49] Poor, else Critical
    pub fn from_score(score: i32) -> Self {
        match clamp_score(score) {
            90..=100 => HealthStatus::Excellent,
            70..=89 => HealthStatus::Good,
            50..=69 => HealthStatus::Fair,
            30..=49 => HealthStatus::Poor,
            _ => HealthStatus::Critical,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Excellent => "Excellent",
            HealthStatus::Good => "Good",
            HealthStatus::Fair => "Fair",
            HealthStatus::Poor => "Poor",
            HealthStatus::Critical => "Critical",
        }
    }

    pub fn needs_attention(&self) -> bool {
        matches!(self, HealthStatus::Poor | HealthStatus::Critical)
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Letter grade for benchmark scores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PerformanceGrade {
    SPlus,
    S,
    APlus,
    A,
    BPlus,
    B,
    CPlus,
    C,
    D,
    F,
}

impl PerformanceGrade {
    pub fn from_score(score: i32) -> Self {
        match clamp_score(score) {
            95..=100 => PerformanceGrade::SPlus,
            90..=94 => PerformanceGrade::S,
            85..=89 => PerformanceGrade::APlus,
            80..=84 => PerformanceGrade::A,
            75..=79 => PerformanceGrade::BPlus,
            70..=74 => PerformanceGrade::B,
            65..=69 => PerformanceGrade::CPlus,
            60..=64 => PerformanceGrade::C,
            50..=59 => PerformanceGrade::D,
            _ => PerformanceGrade::F,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PerformanceGrade::SPlus => "S+",
            PerformanceGrade::S => "S",
            PerformanceGrade::APlus => "A+",
            PerformanceGrade::A => "A",
            PerformanceGrade::BPlus => "B+",
            PerformanceGrade::B => "B",
            PerformanceGrade::CPlus => "C+",
            PerformanceGrade::C => "C",
            PerformanceGrade::D => "D",
            PerformanceGrade::F => "F",
        }
    }

    /// Short verdict used in report details
    pub fn verdict(&self) -> &'static str {
        match self {
            PerformanceGrade::SPlus | PerformanceGrade::S => "flagship-class",
            PerformanceGrade::APlus | PerformanceGrade::A => "high-end",
            PerformanceGrade::BPlus | PerformanceGrade::B => "upper mid-range",
            PerformanceGrade::CPlus | PerformanceGrade::C => "mid-range",
            PerformanceGrade::D => "entry-level",
            PerformanceGrade::F => "below entry-level",
        }
    }
}

impl fmt::Display for PerformanceGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_boundaries() {
        assert_eq!(HealthStatus::from_score(100), HealthStatus::Excellent);
        assert_eq!(HealthStatus::from_score(90), HealthStatus::Excellent);
        assert_eq!(HealthStatus::from_score(89), HealthStatus::Good);
        assert_eq!(HealthStatus::from_score(70), HealthStatus::Good);
        assert_eq!(HealthStatus::from_score(69), HealthStatus::Fair);
        assert_eq!(HealthStatus::from_score(50), HealthStatus::Fair);
        assert_eq!(HealthStatus::from_score(49), HealthStatus::Poor);
        assert_eq!(HealthStatus::from_score(30), HealthStatus::Poor);
        assert_eq!(HealthStatus::from_score(29), HealthStatus::Critical);
        assert_eq!(HealthStatus::from_score(0), HealthStatus::Critical);
    }

    #[test]
    fn test_grade_boundaries() {
        let expected = [
            (95, PerformanceGrade::SPlus),
            (94, PerformanceGrade::S),
            (90, PerformanceGrade::S),
            (89, PerformanceGrade::APlus),
            (85, PerformanceGrade::APlus),
            (84, PerformanceGrade::A),
            (80, PerformanceGrade::A),
            (79, PerformanceGrade::BPlus),
            (75, PerformanceGrade::BPlus),
            (74, PerformanceGrade::B),
            (70, PerformanceGrade::B),
            (69, PerformanceGrade::CPlus),
            (65, PerformanceGrade::CPlus),
            (64, PerformanceGrade::C),
            (60, PerformanceGrade::C),
            (59, PerformanceGrade::D),
            (50, PerformanceGrade::D),
            (49, PerformanceGrade::F),
        ];
        for (score, grade) in expected {
            assert_eq!(PerformanceGrade::from_score(score), grade, "score {}", score);
        }
    }

    #[test]
    fn test_out_of_range_scores_clamp() {
        assert_eq!(HealthStatus::from_score(-5), HealthStatus::Critical);
        assert_eq!(HealthStatus::from_score(250), HealthStatus::Excellent);
        assert_eq!(PerformanceGrade::from_score(i32::MIN), PerformanceGrade::F);
        assert_eq!(PerformanceGrade::from_score(i32::MAX), PerformanceGrade::SPlus);
    }

    #[test]
    fn test_labels() {
        assert_eq!(PerformanceGrade::APlus.to_string(), "A+");
        assert_eq!(HealthStatus::Good.to_string(), "Good");
        assert!(HealthStatus::Critical.needs_attention());
        assert!(!HealthStatus::Fair.needs_attention());
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&PerformanceGrade::SPlus).unwrap();
        assert_eq!(json, "\"S_PLUS\"");
        let json = serde_json::to_string(&HealthStatus::Excellent).unwrap();
        assert_eq!(json, "\"EXCELLENT\"");
    }
}
