use serde::{Deserialize, Serialize};

use crate::domain::email::EmailDraft;

/// Incremental slot extraction for one turn. `None` means the turn said
/// nothing about that slot — it must never erase an existing value.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftUpdate {
    #[serde(default)]
    pub to: Option<Vec<String>>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
}

/// Upstream extraction occasionally emits literal template tokens such as
/// `<recipient>`; those are never real recipients.
pub fn is_placeholder_token(token: &str) -> bool {
    let trimmed = token.trim();
    trimmed.is_empty() || (trimmed.starts_with('<') && trimmed.ends_with('>'))
}

fn cleaned_recipients(tokens: &[String]) -> Vec<String> {
    tokens
        .iter()
        .map(|token| token.trim().to_string())
        .filter(|token| !is_placeholder_token(token))
        .collect()
}

/// Folds a turn's extraction into the persistent draft.
///
/// A populated field is only ever replaced by a non-empty extracted value;
/// empty or placeholder extractions leave the draft untouched.
pub fn merge(existing: &EmailDraft, update: &DraftUpdate) -> EmailDraft {
    let mut draft = existing.clone();

    if let Some(tokens) = &update.to {
        let cleaned = cleaned_recipients(tokens);
        if !cleaned.is_empty() {
            draft.to = cleaned;
        }
    }
    if let Some(subject) = &update.subject {
        if !subject.trim().is_empty() {
            draft.subject = Some(subject.trim().to_string());
        }
    }
    if let Some(body) = &update.body {
        if !body.trim().is_empty() {
            draft.body = Some(body.trim().to_string());
        }
    }

    draft
}

#[cfg(test)]
mod tests {
    use super::{is_placeholder_token, merge, DraftUpdate};
    use crate::domain::email::EmailDraft;

    fn populated_draft() -> EmailDraft {
        EmailDraft {
            to: vec!["jane@x.com".to_string()],
            subject: Some("Report delay".to_string()),
            body: Some("The report is delayed.".to_string()),
        }
    }

    #[test]
    fn empty_update_never_clears_populated_fields() {
        let update = DraftUpdate {
            to: Some(vec![]),
            subject: Some("  ".to_string()),
            body: Some(String::new()),
        };
        assert_eq!(merge(&populated_draft(), &update), populated_draft());
    }

    #[test]
    fn absent_update_fields_leave_draft_untouched() {
        assert_eq!(merge(&populated_draft(), &DraftUpdate::default()), populated_draft());
    }

    #[test]
    fn placeholder_recipients_are_dropped_before_accepting() {
        let update = DraftUpdate {
            to: Some(vec!["<recipient>".to_string(), " ".to_string()]),
            ..DraftUpdate::default()
        };
        // All tokens were placeholders, so the existing list survives.
        assert_eq!(merge(&populated_draft(), &update).to, vec!["jane@x.com".to_string()]);

        let mixed = DraftUpdate {
            to: Some(vec!["<recipient>".to_string(), "bob@x.com".to_string()]),
            ..DraftUpdate::default()
        };
        assert_eq!(merge(&populated_draft(), &mixed).to, vec!["bob@x.com".to_string()]);
    }

    #[test]
    fn explicit_updates_overwrite() {
        let update = DraftUpdate {
            to: None,
            subject: Some("New subject".to_string()),
            body: None,
        };
        let merged = merge(&populated_draft(), &update);
        assert_eq!(merged.subject.as_deref(), Some("New subject"));
        assert_eq!(merged.body, populated_draft().body);
    }

    #[test]
    fn merge_is_monotonic_over_any_sequence() {
        let updates = vec![
            DraftUpdate { to: Some(vec!["jane".to_string()]), ..DraftUpdate::default() },
            DraftUpdate { subject: Some("Hello".to_string()), ..DraftUpdate::default() },
            DraftUpdate { to: Some(vec![]), subject: Some(String::new()), body: None },
            DraftUpdate { body: Some("Body text".to_string()), ..DraftUpdate::default() },
            DraftUpdate { to: Some(vec!["<to>".to_string()]), ..DraftUpdate::default() },
        ];

        let mut draft = EmailDraft::default();
        let mut seen_populated = (false, false, false);
        for update in &updates {
            draft = merge(&draft, update);
            seen_populated.0 |= !draft.to.is_empty();
            seen_populated.1 |= draft.subject.is_some();
            seen_populated.2 |= draft.body.is_some();
            // Once populated, a slot never reverts to empty.
            if seen_populated.0 {
                assert!(!draft.to.is_empty());
            }
            if seen_populated.1 {
                assert!(draft.subject.is_some());
            }
            if seen_populated.2 {
                assert!(draft.body.is_some());
            }
        }
        assert_eq!(draft.to, vec!["jane".to_string()]);
        assert_eq!(draft.subject.as_deref(), Some("Hello"));
        assert_eq!(draft.body.as_deref(), Some("Body text"));
    }

    #[test]
    fn placeholder_detection() {
        assert!(is_placeholder_token("<recipient>"));
        assert!(is_placeholder_token("   "));
        assert!(!is_placeholder_token("jane"));
        assert!(!is_placeholder_token("jane@x.com"));
    }
}
