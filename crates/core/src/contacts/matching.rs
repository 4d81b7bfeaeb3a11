use crate::domain::contact::Contact;

/// Default minimum similarity for a fuzzy candidate to be considered.
pub const DEFAULT_MATCH_THRESHOLD: f64 = 0.7;

/// Lowercases and strips everything except alphanumerics and spaces, so
/// "O'Brien" and "obrien" compare equal.
pub fn normalize(value: &str) -> String {
    value
        .chars()
        .filter(|ch| ch.is_alphanumeric() || ch.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect::<String>()
        .trim()
        .to_string()
}

/// Order-aware similarity in [0, 1] between a query and a candidate field.
/// Letter-set overlap is deliberately not used: it matched "ankith" against
/// "padakanti" on shared letters alone.
pub fn similarity(query: &str, candidate: &str) -> f64 {
    let normalized_query = normalize(query);
    let normalized_candidate = normalize(candidate);
    if normalized_query.is_empty() || normalized_candidate.is_empty() {
        return 0.0;
    }
    strsim::jaro_winkler(&normalized_query, &normalized_candidate)
}

fn best_score(query: &str, contact: &Contact) -> f64 {
    [
        similarity(query, &contact.full_name()),
        similarity(query, &contact.first_name),
        similarity(query, &contact.last_name),
        similarity(query, contact.email_local_part()),
    ]
    .into_iter()
    .fold(0.0, f64::max)
}

/// Exact-then-fuzzy lookup over an in-memory contact list.
///
/// Exact field matches (first/last/full name or email local-part, after
/// normalization) win outright and skip ranking entirely. Otherwise each
/// contact is scored by its best field similarity, filtered by `threshold`,
/// and returned in descending score order.
pub fn search_in(contacts: &[Contact], query: &str, threshold: f64) -> Vec<Contact> {
    let normalized_query = normalize(query);
    if normalized_query.is_empty() {
        return Vec::new();
    }

    let exact: Vec<Contact> = contacts
        .iter()
        .filter(|contact| {
            [
                normalize(&contact.first_name),
                normalize(&contact.last_name),
                normalize(&contact.full_name()),
                normalize(contact.email_local_part()),
            ]
            .contains(&normalized_query)
        })
        .cloned()
        .collect();
    if !exact.is_empty() {
        return exact;
    }

    let mut ranked: Vec<(f64, Contact)> = contacts
        .iter()
        .map(|contact| (best_score(query, contact), contact.clone()))
        .filter(|(score, _)| *score >= threshold)
        .collect();
    ranked.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
    ranked.into_iter().map(|(_, contact)| contact).collect()
}

#[cfg(test)]
mod tests {
    use super::{normalize, search_in, similarity, DEFAULT_MATCH_THRESHOLD};
    use crate::domain::contact::Contact;

    fn contact(first: &str, last: &str, email: &str) -> Contact {
        Contact {
            first_name: first.to_string(),
            last_name: last.to_string(),
            email: email.to_string(),
            phone: None,
        }
    }

    fn directory_fixture() -> Vec<Contact> {
        vec![
            contact("Jane", "Doe", "jane.doe@example.com"),
            contact("Janet", "Smith", "janet@corp.io"),
            contact("Amogh", "Padakanti", "amogh@ufl.edu"),
        ]
    }

    #[test]
    fn normalization_strips_punctuation_and_case() {
        assert_eq!(normalize("O'Brien"), "obrien");
        assert_eq!(normalize("  Jane  Doe "), "jane  doe");
        assert_eq!(normalize("<recipient>"), "recipient");
    }

    #[test]
    fn exact_first_name_match_skips_ranking() {
        let matches = search_in(&directory_fixture(), "Jane", DEFAULT_MATCH_THRESHOLD);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].email, "jane.doe@example.com");
    }

    #[test]
    fn exact_match_on_email_local_part() {
        let matches = search_in(&directory_fixture(), "janet", DEFAULT_MATCH_THRESHOLD);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].email, "janet@corp.io");
    }

    #[test]
    fn fuzzy_match_tolerates_typos() {
        let matches = search_in(&directory_fixture(), "Padakanty", DEFAULT_MATCH_THRESHOLD);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].email, "amogh@ufl.edu");
    }

    #[test]
    fn dissimilar_names_stay_below_threshold() {
        assert!(similarity("ankith", "padakanti") < DEFAULT_MATCH_THRESHOLD);
        let matches = search_in(&directory_fixture(), "zzzz", DEFAULT_MATCH_THRESHOLD);
        assert!(matches.is_empty());
    }

    #[test]
    fn fuzzy_results_rank_by_descending_score() {
        let contacts = vec![
            contact("Jon", "Stone", "jon@x.com"),
            contact("John", "Doe", "johnd@x.com"),
        ];
        let matches = search_in(&contacts, "Johnn", 0.7);
        assert!(!matches.is_empty());
        assert_eq!(matches[0].first_name, "John");
    }

    #[test]
    fn empty_query_matches_nothing() {
        assert!(search_in(&directory_fixture(), "   ", DEFAULT_MATCH_THRESHOLD).is_empty());
    }
}
