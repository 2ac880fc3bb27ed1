use regex::Regex;
use std::sync::LazyLock;

static NON_ALPHANUMERIC: LazyLock<Regex> = LazyLock::new(|| {
    // Literal pattern, always valid.
    Regex::new(r"[^a-zA-Z0-9]").unwrap()
});

pub const SCORE_EXACT: u8 = 100;
pub const SCORE_PREFIX: u8 = 90;
pub const SCORE_SUBSTRING: u8 = 70;

/// Drops everything but ASCII letters and digits, then lower-cases.
pub fn normalize(text: &str) -> String {
    NON_ALPHANUMERIC.replace_all(text, "").to_lowercase()
}

/// Scores `candidate` against an already normalized query.
fn score_normalized(query: &str, candidate: &str) -> u8 {
    let candidate = normalize(candidate);
    if candidate == query {
        SCORE_EXACT
    } else if candidate.starts_with(query) {
        SCORE_PREFIX
    } else if candidate.contains(query) {
        SCORE_SUBSTRING
    } else {
        0
    }
}

pub fn score(query: &str, candidate: &str) -> u8 {
    score_normalized(&normalize(query), candidate)
}

/// Orders `results` by descending score against `query`.
///
/// The sort is stable, equal scores keep their incoming order. Zero-score
/// candidates are kept at the tail.
pub fn rank_results<T>(query: &str, results: &[T]) -> Vec<T>
where
    T: AsRef<str> + Clone,
{
    let query = normalize(query);
    let mut scored: Vec<(u8, &T)> = results
        .iter()
        .map(|res| (score_normalized(&query, res.as_ref()), res))
        .collect();
    scored.sort_by(|a, b| b.0.cmp(&a.0));
    scored.into_iter().map(|(_, res)| res.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Minecraft", "minecraft")]
    #[case("The Minecraft Wiki", "theminecraftwiki")]
    #[case("C++ (language)", "clanguage")]
    #[case("Zoë", "zo")]
    #[case("", "")]
    fn normalize_strips_and_lowercases(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(normalize(input), expected);
    }

    #[rstest]
    #[case("minecraft", "Minecraft", SCORE_EXACT)]
    #[case("mine-craft", "MINECRAFT!", SCORE_EXACT)]
    #[case("minecraft", "Minecraft server", SCORE_PREFIX)]
    #[case("minecraft", "The Minecraft Wiki", SCORE_SUBSTRING)]
    #[case("minecraft", "Other", 0)]
    #[case("", "anything", SCORE_PREFIX)]
    fn scores(#[case] query: &str, #[case] candidate: &str, #[case] expected: u8) {
        assert_eq!(score(query, candidate), expected);
    }

    #[test]
    fn exact_match_ranks_first_and_zero_scores_sink() {
        let candidates = ["Other", "The Minecraft Wiki", "Minecraft server", "Minecraft"];
        let ranked = rank_results("minecraft", &candidates);
        assert_eq!(
            ranked,
            vec!["Minecraft", "Minecraft server", "The Minecraft Wiki", "Other"]
        );
    }

    #[test]
    fn equal_scores_keep_incoming_order() {
        let candidates = vec![
            "rust language".to_string(),
            "Rust (fungus)".to_string(),
            "rustacean".to_string(),
        ];
        let ranked = rank_results("rust", &candidates);
        assert_eq!(ranked, candidates);
    }

    #[test]
    fn empty_input_ranks_to_empty() {
        let ranked: Vec<String> = rank_results("anything", &[]);
        assert!(ranked.is_empty());
    }
}
