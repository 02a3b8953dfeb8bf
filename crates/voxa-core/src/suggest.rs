//! Similarity ranking of candidate phrases for "did you mean" guidance.

use std::cmp::Ordering;
use std::collections::HashSet;

/// Rank candidate phrases by similarity to the input, best first.
/// Duplicates are dropped, the result is capped at `limit`.
pub fn rank(input: &str, candidates: impl IntoIterator<Item = String>, limit: usize) -> Vec<String> {
    let needle = input.trim().to_lowercase();
    let mut seen = HashSet::new();
    let mut scored: Vec<(String, f64)> = candidates
        .into_iter()
        .filter(|c| !c.trim().is_empty())
        .filter(|c| seen.insert(c.trim().to_lowercase()))
        .map(|c| {
            let similarity = strsim::jaro_winkler(&needle, &c.trim().to_lowercase());
            (c, similarity)
        })
        .collect();

    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    scored.truncate(limit);
    scored.into_iter().map(|(c, _)| c).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closest_phrase_ranks_first() {
        let candidates = vec![
            "start the approval workflow".to_string(),
            "go to dashboard".to_string(),
            "assess property 1024".to_string(),
        ];
        let ranked = rank("go to dashbord", candidates, 2);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0], "go to dashboard");
    }

    #[test]
    fn duplicates_and_blanks_are_dropped() {
        let candidates = vec![
            "help".to_string(),
            "Help".to_string(),
            "  ".to_string(),
            "help".to_string(),
        ];
        let ranked = rank("halp", candidates, 10);
        assert_eq!(ranked.len(), 1);
    }

    #[test]
    fn limit_caps_results() {
        let candidates = (0..20).map(|i| format!("phrase {}", i));
        assert_eq!(rank("phrase", candidates, 3).len(), 3);
    }
}
