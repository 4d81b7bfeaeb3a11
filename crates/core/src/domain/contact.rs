use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Directory entry keyed by case-insensitive email address.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
}

impl Contact {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }

    /// Part of the address before `@`, used as a search field.
    pub fn email_local_part(&self) -> &str {
        self.email.split('@').next().unwrap_or(&self.email)
    }

    pub fn matches_email(&self, email: &str) -> bool {
        self.email.eq_ignore_ascii_case(email.trim())
    }
}

/// The four fields collected by the contact-capture sub-flow. All must be
/// present before a save is attempted.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactFields {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
}

impl ContactFields {
    pub fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.first_name.trim().is_empty() {
            missing.push("first name");
        }
        if self.last_name.trim().is_empty() {
            missing.push("last name");
        }
        if self.email.trim().is_empty() {
            missing.push("email");
        }
        if self.phone.trim().is_empty() {
            missing.push("phone");
        }
        missing
    }

    pub fn is_complete(&self) -> bool {
        self.missing().is_empty()
    }
}

fn email_regex() -> &'static Regex {
    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    EMAIL_REGEX
        .get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern is valid"))
}

/// Syntactic `local@domain.tld` check used for both recipient acceptance and
/// contact-save validation.
pub fn is_valid_email(value: &str) -> bool {
    email_regex().is_match(value.trim())
}

#[cfg(test)]
mod tests {
    use super::{is_valid_email, Contact, ContactFields};

    #[test]
    fn full_name_trims_missing_parts() {
        let contact = Contact {
            first_name: "Jane".to_string(),
            last_name: String::new(),
            email: "jane@example.com".to_string(),
            phone: None,
        };
        assert_eq!(contact.full_name(), "Jane");
        assert_eq!(contact.email_local_part(), "jane");
    }

    #[test]
    fn email_match_is_case_insensitive() {
        let contact = Contact {
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            email: "Jane.Doe@Example.com".to_string(),
            phone: None,
        };
        assert!(contact.matches_email("jane.doe@example.com"));
        assert!(contact.matches_email("  JANE.DOE@EXAMPLE.COM "));
        assert!(!contact.matches_email("jane@example.com"));
    }

    #[test]
    fn validates_email_shape() {
        assert!(is_valid_email("bob@x.com"));
        assert!(is_valid_email("  first.last@sub.domain.org "));
        assert!(!is_valid_email("bob"));
        assert!(!is_valid_email("bob@x"));
        assert!(!is_valid_email("bob @x.com"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn reports_missing_capture_fields_by_label() {
        let fields = ContactFields {
            first_name: "John".to_string(),
            last_name: "  ".to_string(),
            email: "john@doe.com".to_string(),
            phone: String::new(),
        };
        assert_eq!(fields.missing(), vec!["last name", "phone"]);
        assert!(!fields.is_complete());
    }
}
