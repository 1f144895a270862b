//! Token-sort-ratio similarity over label aliases.

/// Similarity of two strings on a 0–100 scale, after sorting the
/// whitespace-delimited tokens of each side. Word order therefore does not
/// matter: `"contact admin"` and `"admin contact"` score 100.
pub fn token_sort_ratio(a: &str, b: &str) -> f64 {
    let a = sort_tokens(a);
    let b = sort_tokens(b);
    strsim::normalized_levenshtein(&a, &b) * 100.0
}

fn sort_tokens(s: &str) -> String {
    let mut tokens: Vec<&str> = s.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

/// Best-scoring choice for `term`, ties resolved in favor of the earliest
/// entry. Returns `None` only for an empty choice list.
pub fn extract_best<'a>(term: &str, choices: &[&'a str]) -> Option<(&'a str, f64)> {
    let mut best: Option<(&'a str, f64)> = None;
    for choice in choices {
        let score = token_sort_ratio(term, &choice.to_lowercase());
        if best.map_or(true, |(_, s)| score > s) {
            best = Some((choice, score));
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_strings_score_one_hundred() {
        assert_eq!(token_sort_ratio("admin email", "admin email"), 100.0);
    }

    #[test]
    fn token_order_is_irrelevant() {
        assert_eq!(token_sort_ratio("contact admin", "admin contact"), 100.0);
    }

    #[test]
    fn dot_separated_variant_clears_the_match_floor() {
        // "Admin Email" must resolve against the "admin.email" alias.
        assert!(token_sort_ratio("admin email", "admin.email") > 90.0);
    }

    #[test]
    fn unrelated_labels_stay_below_the_floor() {
        assert!(token_sort_ratio("admin email", "registrant street") < 90.0);
        assert!(token_sort_ratio("administrative name", "admin name") < 90.0);
    }

    #[test]
    fn extract_best_prefers_the_earliest_tie() {
        let choices = ["name server", "nserver", "name server"];
        let (best, score) = extract_best("name server", &choices).unwrap();
        assert_eq!(best, "name server");
        assert_eq!(score, 100.0);
    }

    #[test]
    fn extract_best_on_empty_choices_is_none() {
        assert!(extract_best("anything", &[]).is_none());
    }
}
