use crate::contacts::store::ContactStore;
use crate::conversation::draft::is_placeholder_token;
use crate::domain::contact::{is_valid_email, Contact};

/// Most candidates ever shown in a disambiguation listing.
pub const MAX_DISAMBIGUATION_CANDIDATES: usize = 5;

/// Outcome of resolving a recipient token list. Exactly one variant is
/// produced per call; the first blocking token wins.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecipientResolution {
    /// Every token mapped to a concrete address.
    Resolved(Vec<String>),
    /// A token matched nothing in the directory — the contact-capture
    /// sub-flow should take over. Carries the unresolved query.
    NeedsCapture { query: String },
    /// A token matched several contacts; the user must choose.
    Ambiguous { query: String, candidates: Vec<Contact> },
    /// Nothing usable was supplied at all.
    NoRecipients,
}

/// Resolves raw recipient tokens (names or addresses) against the directory.
///
/// Tokens are processed in order: placeholders are skipped, syntactically
/// valid emails accepted as-is, and names fuzzy-matched. Resolution stops at
/// the first token that matches nothing (capture) or matches several
/// contacts (disambiguation) — later tokens make no progress.
pub fn resolve_recipients(store: &dyn ContactStore, tokens: &[String]) -> RecipientResolution {
    let mut resolved = Vec::new();

    for raw in tokens {
        let token = raw.trim();
        if is_placeholder_token(token) {
            continue;
        }
        if is_valid_email(token) {
            resolved.push(token.to_string());
            continue;
        }

        let mut matches = store.search(token);
        match matches.len() {
            0 => return RecipientResolution::NeedsCapture { query: token.to_string() },
            1 => resolved.push(matches.remove(0).email),
            _ => {
                matches.truncate(MAX_DISAMBIGUATION_CANDIDATES);
                return RecipientResolution::Ambiguous {
                    query: token.to_string(),
                    candidates: matches,
                };
            }
        }
    }

    if resolved.is_empty() {
        return RecipientResolution::NoRecipients;
    }
    RecipientResolution::Resolved(resolved)
}

/// User-facing listing for the ambiguous case.
pub fn disambiguation_message(query: &str, candidates: &[Contact]) -> String {
    let options = candidates
        .iter()
        .map(|contact| format!("- {} <{}>", contact.full_name(), contact.email))
        .collect::<Vec<_>>()
        .join("\n");
    format!("I found multiple matches for '{query}'. Please choose one:\n{options}")
}

#[cfg(test)]
mod tests {
    use super::{
        disambiguation_message, resolve_recipients, RecipientResolution,
        MAX_DISAMBIGUATION_CANDIDATES,
    };
    use crate::contacts::store::InMemoryContactStore;
    use crate::domain::contact::Contact;

    fn contact(first: &str, last: &str, email: &str) -> Contact {
        Contact {
            first_name: first.to_string(),
            last_name: last.to_string(),
            email: email.to_string(),
            phone: None,
        }
    }

    fn store_with_jane() -> InMemoryContactStore {
        InMemoryContactStore::new(vec![contact("Jane", "Doe", "jane.doe@example.com")])
    }

    fn tokens(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn unique_name_resolves_to_directory_email() {
        let resolution = resolve_recipients(&store_with_jane(), &tokens(&["Jane"]));
        assert_eq!(
            resolution,
            RecipientResolution::Resolved(vec!["jane.doe@example.com".to_string()])
        );
    }

    #[test]
    fn valid_email_is_accepted_without_lookup() {
        let store = InMemoryContactStore::default();
        let resolution = resolve_recipients(&store, &tokens(&["bob@x.com"]));
        assert_eq!(resolution, RecipientResolution::Resolved(vec!["bob@x.com".to_string()]));
    }

    #[test]
    fn unknown_token_short_circuits_to_capture_regardless_of_order() {
        let store = store_with_jane();
        for order in [&["unknownperson", "bob@x.com"][..], &["bob@x.com", "unknownperson"][..]] {
            let resolution = resolve_recipients(&store, &tokens(order));
            assert_eq!(
                resolution,
                RecipientResolution::NeedsCapture { query: "unknownperson".to_string() },
                "order {order:?} must still surface the capture signal"
            );
        }
    }

    #[test]
    fn multiple_matches_always_disambiguate() {
        let store = InMemoryContactStore::new(vec![
            contact("Jane", "Doe", "jane.doe@example.com"),
            contact("Jane", "Smith", "jane.smith@corp.io"),
        ]);
        match resolve_recipients(&store, &tokens(&["Jane"])) {
            RecipientResolution::Ambiguous { query, candidates } => {
                assert_eq!(query, "Jane");
                assert_eq!(candidates.len(), 2);
                let message = disambiguation_message(&query, &candidates);
                assert!(message.contains("Jane Doe <jane.doe@example.com>"));
                assert!(message.contains("Jane Smith <jane.smith@corp.io>"));
            }
            other => panic!("expected disambiguation, got {other:?}"),
        }
    }

    #[test]
    fn disambiguation_listing_is_capped_at_five() {
        let contacts = (0..8)
            .map(|i| contact("Jane", &format!("Clone{i}"), &format!("jane{i}@x.com")))
            .collect();
        let store = InMemoryContactStore::new(contacts);
        match resolve_recipients(&store, &tokens(&["Jane"])) {
            RecipientResolution::Ambiguous { candidates, .. } => {
                assert_eq!(candidates.len(), MAX_DISAMBIGUATION_CANDIDATES);
            }
            other => panic!("expected disambiguation, got {other:?}"),
        }
    }

    #[test]
    fn placeholders_and_blanks_yield_no_recipients() {
        let store = InMemoryContactStore::default();
        let resolution = resolve_recipients(&store, &tokens(&["<recipient>", "  "]));
        assert_eq!(resolution, RecipientResolution::NoRecipients);
    }

    #[test]
    fn capture_wins_over_later_ambiguity() {
        let store = InMemoryContactStore::new(vec![
            contact("Jane", "Doe", "jane.doe@example.com"),
            contact("Jane", "Smith", "jane.smith@corp.io"),
        ]);
        let resolution = resolve_recipients(&store, &tokens(&["unknownperson", "Jane"]));
        assert_eq!(
            resolution,
            RecipientResolution::NeedsCapture { query: "unknownperson".to_string() }
        );
    }
}
