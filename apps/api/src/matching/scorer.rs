use std::collections::HashSet;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

// ────────────────────────────────────────────────────────────────────────────
// Types
// ────────────────────────────────────────────────────────────────────────────

/// Points awarded per matched skill.
const POINTS_PER_MATCH: usize = 10;
const MAX_SCORE: usize = 100;

/// Overlap between detected skills and a job description.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    /// 0 – 100, saturating.
    pub score: u8,
    /// Lower-cased skills found in the JD, in skill-bucket order.
    pub matched: Vec<String>,
}

impl MatchResult {
    /// Caption shown under the progress bar.
    pub fn caption(&self) -> String {
        format!(
            "Match Score: {}% based on keyword overlap with AI extracted skills.",
            self.score
        )
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Scorer trait + substring backend
// ────────────────────────────────────────────────────────────────────────────

/// Swap backends without touching the handler. Carried in `AppState` as
/// `Arc<dyn MatchScorer>`.
#[async_trait]
pub trait MatchScorer: Send + Sync {
    /// Short backend label, reported alongside results.
    fn backend(&self) -> &'static str;

    async fn score(&self, skills: &[String], jd_text: &str) -> Result<MatchResult, AppError>;
}

/// Case-insensitive substring containment. Not token-bounded, so a skill that
/// appears inside an unrelated word still counts.
pub struct SubstringMatchScorer;

#[async_trait]
impl MatchScorer for SubstringMatchScorer {
    fn backend(&self) -> &'static str {
        "substring"
    }

    async fn score(&self, skills: &[String], jd_text: &str) -> Result<MatchResult, AppError> {
        Ok(compute_substring_match(skills, jd_text))
    }
}

/// Score = min(100, 10 × matched). Skills are lower-cased and deduplicated
/// before counting; an empty skill list or empty JD scores 0.
pub fn compute_substring_match(skills: &[String], jd_text: &str) -> MatchResult {
    if skills.is_empty() || jd_text.is_empty() {
        return MatchResult::default();
    }

    let jd_lower = jd_text.to_lowercase();
    let mut seen = HashSet::new();
    let matched: Vec<String> = skills
        .iter()
        .map(|s| s.to_lowercase())
        .filter(|s| seen.insert(s.clone()))
        .filter(|s| jd_lower.contains(s.as_str()))
        .collect();

    let score = matched
        .len()
        .saturating_mul(POINTS_PER_MATCH)
        .min(MAX_SCORE) as u8;

    MatchResult { score, matched }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skills(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_python_matches_but_sql_does_not() {
        let result = compute_substring_match(
            &skills(&["python", "sql"]),
            "Looking for Python and Java developer",
        );
        assert_eq!(result.matched, vec!["python"]);
        assert_eq!(result.score, 10);
    }

    #[test]
    fn test_score_clamped_at_100() {
        let many: Vec<String> = (0..15).map(|i| format!("skill{i:02}")).collect();
        let jd = many.join(" ");
        let result = compute_substring_match(&many, &jd);
        assert_eq!(result.matched.len(), 15);
        assert_eq!(result.score, 100);
    }

    #[test]
    fn test_score_is_monotone_in_matches() {
        let all: Vec<String> = (0..12).map(|i| format!("tool{i:02}")).collect();
        let mut last = 0;
        for n in 0..=all.len() {
            let jd = all[..n].join(", ");
            let result = compute_substring_match(&all, &jd);
            assert_eq!(result.matched.len(), n);
            assert!(result.score >= last, "score dropped at n={n}");
            last = result.score;
        }
        assert_eq!(last, 100);
    }

    #[test]
    fn test_empty_inputs_score_zero() {
        let empty = compute_substring_match(&[], "Rust developer wanted");
        assert_eq!(empty, MatchResult::default());

        let empty_jd = compute_substring_match(&skills(&["rust"]), "");
        assert_eq!(empty_jd, MatchResult::default());
    }

    #[test]
    fn test_whitespace_jd_scores_zero() {
        let result = compute_substring_match(&skills(&["rust", "go"]), "   \n");
        assert!(result.matched.is_empty());
        assert_eq!(result.score, 0);
    }

    #[test]
    fn test_matching_is_not_token_bounded() {
        // "java" inside "javascript" still counts.
        let result = compute_substring_match(&skills(&["Java"]), "Senior JavaScript engineer");
        assert_eq!(result.matched, vec!["java"]);
    }

    #[test]
    fn test_case_variants_count_once() {
        let result = compute_substring_match(&skills(&["Rust", "rust", "RUST"]), "rust");
        assert_eq!(result.matched, vec!["rust"]);
        assert_eq!(result.score, 10);
    }

    #[test]
    fn test_caption_mentions_score() {
        let result = MatchResult {
            score: 40,
            matched: vec![],
        };
        assert!(result.caption().contains("40%"));
    }

    #[tokio::test]
    async fn test_substring_scorer_backend() {
        let scorer = SubstringMatchScorer;
        assert_eq!(scorer.backend(), "substring");
        let result = scorer
            .score(&skills(&["docker"]), "Docker and Kubernetes")
            .await
            .unwrap();
        assert_eq!(result.score, 10);
    }
}
