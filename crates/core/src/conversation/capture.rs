use serde::{Deserialize, Serialize};

use crate::domain::contact::ContactFields;

/// Classified user reply while a capture sits in
/// `AwaitingCreateConfirmation`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "reply", content = "token")]
pub enum CaptureReply {
    /// Go ahead and create the contact.
    Create,
    /// Abandon the capture and any staged action.
    Cancel,
    /// "Send it to bob@x.com instead" — carry the replacement token.
    AlternateRecipient(String),
    /// An unrelated remark; answer it and offer to resume.
    Pause,
    /// Unclassifiable — treat the turn as a fresh request.
    Other,
}

/// Shorthand labels users type when dictating contact fields. An extractor
/// must never surface these as actual names.
const LABEL_WORDS: [&str; 8] =
    ["fname", "lname", "email", "mail", "phone", "phno", "number", "mobile"];

fn is_label_word(value: &str) -> bool {
    LABEL_WORDS.contains(&value.trim().to_lowercase().as_str())
}

fn title_case(value: &str) -> String {
    let mut chars = value.trim().chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}

/// Repairs common extraction mistakes on captured contact fields:
/// label words are discarded as names, and missing name parts are derived
/// from the email local-part (split on `.`/`_`/`-`, title-cased).
pub fn repair_contact_fields(raw: &ContactFields) -> ContactFields {
    let mut first_name = raw.first_name.trim().to_string();
    let mut last_name = raw.last_name.trim().to_string();
    let email = raw.email.trim().to_string();
    let phone = raw.phone.trim().to_string();

    if is_label_word(&first_name) {
        first_name.clear();
    }
    if is_label_word(&last_name) {
        last_name.clear();
    }

    if email.contains('@') && (first_name.is_empty() || last_name.is_empty()) {
        let local_part = email.split('@').next().unwrap_or_default();
        let tokens: Vec<&str> = local_part
            .split(['.', '_', '-'])
            .filter(|token| !token.is_empty())
            .collect();
        match tokens.as_slice() {
            [only] => {
                if first_name.is_empty() {
                    first_name = title_case(only);
                }
            }
            [first, second, ..] => {
                if first_name.is_empty() {
                    first_name = title_case(first);
                }
                if last_name.is_empty() {
                    last_name = title_case(second);
                }
            }
            [] => {}
        }
    }

    ContactFields { first_name, last_name, email, phone }
}

/// First prompt after the user agrees to create a contact.
pub fn collection_prompt() -> String {
    "Please share first name, last name, email, and phone.\n\
     Example: Jordan Lee, jordan.lee@example.com, +1 555-0100"
        .to_string()
}

/// Re-prompt naming exactly the fields still missing after repair.
pub fn missing_details_prompt(missing: &[&'static str]) -> String {
    format!(
        "I still need: {}.\n\
         Please share first name, last name, email, and phone.\n\
         Example: Jordan Lee, jordan.lee@example.com, +1 555-0100",
        missing.join(", ")
    )
}

/// Substitutes the saved contact's email in place of the unresolved query
/// token inside a draft recipient list. Replacement is positional by
/// normalized token match; if the token is gone, the address is appended so
/// the resumed flow still carries it.
pub fn substitute_recipient(recipients: &[String], query: &str, email: &str) -> Vec<String> {
    let normalized_query = query.trim().to_lowercase();
    let mut replaced = false;
    let mut updated = Vec::with_capacity(recipients.len());

    for recipient in recipients {
        if !replaced && recipient.trim().to_lowercase() == normalized_query {
            updated.push(email.to_string());
            replaced = true;
        } else {
            updated.push(recipient.clone());
        }
    }
    if !replaced {
        updated.push(email.to_string());
    }
    updated
}

#[cfg(test)]
mod tests {
    use super::{
        collection_prompt, missing_details_prompt, repair_contact_fields, substitute_recipient,
    };
    use crate::domain::contact::ContactFields;

    fn raw(first: &str, last: &str, email: &str, phone: &str) -> ContactFields {
        ContactFields {
            first_name: first.to_string(),
            last_name: last.to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
        }
    }

    #[test]
    fn label_words_are_never_names() {
        let repaired = repair_contact_fields(&raw("fname", "phno", "amogh@ufl.edu", "555"));
        // Local-part has a single token, so only the first name is derived.
        assert_eq!(repaired.first_name, "Amogh");
        assert_eq!(repaired.last_name, "");
    }

    #[test]
    fn names_derive_from_dotted_local_part() {
        let repaired = repair_contact_fields(&raw("", "", "jordan.lee@example.com", "555"));
        assert_eq!(repaired.first_name, "Jordan");
        assert_eq!(repaired.last_name, "Lee");
    }

    #[test]
    fn underscore_and_dash_separators_also_split() {
        let repaired = repair_contact_fields(&raw("", "", "ana_maria-souza@x.com", "555"));
        assert_eq!(repaired.first_name, "Ana");
        assert_eq!(repaired.last_name, "Maria");
    }

    #[test]
    fn provided_names_are_kept_over_derivation() {
        let repaired = repair_contact_fields(&raw("John", "Doe", "jd@x.com", "555"));
        assert_eq!(repaired.first_name, "John");
        assert_eq!(repaired.last_name, "Doe");
    }

    #[test]
    fn reprompt_names_only_missing_fields() {
        let repaired = repair_contact_fields(&raw("John", "", "", "555"));
        let prompt = missing_details_prompt(&repaired.missing());
        assert!(prompt.starts_with("I still need: last name, email."));
        assert!(collection_prompt().contains("first name, last name, email, and phone"));
    }

    #[test]
    fn substitution_is_positional_and_case_insensitive() {
        let recipients =
            vec!["bob@x.com".to_string(), "UnknownPerson".to_string(), "carol".to_string()];
        let updated = substitute_recipient(&recipients, "unknownperson", "john@doe.com");
        assert_eq!(
            updated,
            vec!["bob@x.com".to_string(), "john@doe.com".to_string(), "carol".to_string()]
        );
    }

    #[test]
    fn substitution_appends_when_token_is_absent() {
        let updated = substitute_recipient(&["bob@x.com".to_string()], "gone", "john@doe.com");
        assert_eq!(updated, vec!["bob@x.com".to_string(), "john@doe.com".to_string()]);
    }
}
