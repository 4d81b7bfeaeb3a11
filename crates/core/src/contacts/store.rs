use std::sync::{Arc, Mutex};

use crate::contacts::matching::{search_in, DEFAULT_MATCH_THRESHOLD};
use crate::domain::contact::{is_valid_email, Contact, ContactFields};
use crate::errors::{ApplicationError, DomainError};

/// Read/write access to the persisted contact directory.
///
/// Implementations load the full collection fresh on every call — there is
/// no cache invariant beyond last-write-wins.
pub trait ContactStore: Send + Sync {
    /// All contacts, in stored order. Absent or corrupt storage yields an
    /// empty list, never an error.
    fn load(&self) -> Vec<Contact>;

    /// Exact-then-fuzzy name/email-local-part search.
    fn search(&self, query: &str) -> Vec<Contact>;

    /// Validates and upserts by case-insensitive email, persisting the whole
    /// collection. Returns the saved record. Validation problems surface as
    /// `ApplicationError::Domain`, storage problems as
    /// `ApplicationError::Persistence`.
    fn save(&self, fields: &ContactFields) -> Result<Contact, ApplicationError>;
}

/// Validates `fields` and applies the upsert against an in-memory list.
/// Shared by every store implementation so save semantics cannot drift.
pub fn upsert(contacts: &mut Vec<Contact>, fields: &ContactFields) -> Result<Contact, DomainError> {
    let first = fields.first_name.trim();
    let last = fields.last_name.trim();
    let email = fields.email.trim();
    let phone = fields.phone.trim();

    if format!("{first} {last}").trim().is_empty() {
        return Err(DomainError::MissingContactName);
    }
    if !is_valid_email(email) {
        return Err(DomainError::InvalidEmailAddress(email.to_string()));
    }

    let saved = Contact {
        first_name: first.to_string(),
        last_name: last.to_string(),
        email: email.to_string(),
        phone: (!phone.is_empty()).then(|| phone.to_string()),
    };

    match contacts.iter_mut().find(|existing| existing.matches_email(email)) {
        Some(existing) => *existing = saved.clone(),
        None => contacts.push(saved.clone()),
    }
    Ok(saved)
}

/// Mutex-backed store for tests and fixtures; search honors the default
/// threshold unless overridden.
#[derive(Clone, Default)]
pub struct InMemoryContactStore {
    contacts: Arc<Mutex<Vec<Contact>>>,
    threshold: Option<f64>,
}

impl InMemoryContactStore {
    pub fn new(contacts: Vec<Contact>) -> Self {
        Self { contacts: Arc::new(Mutex::new(contacts)), threshold: None }
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = Some(threshold);
        self
    }

    fn snapshot(&self) -> Vec<Contact> {
        match self.contacts.lock() {
            Ok(contacts) => contacts.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl ContactStore for InMemoryContactStore {
    fn load(&self) -> Vec<Contact> {
        self.snapshot()
    }

    fn search(&self, query: &str) -> Vec<Contact> {
        search_in(&self.snapshot(), query, self.threshold.unwrap_or(DEFAULT_MATCH_THRESHOLD))
    }

    fn save(&self, fields: &ContactFields) -> Result<Contact, ApplicationError> {
        let saved = match self.contacts.lock() {
            Ok(mut contacts) => upsert(&mut contacts, fields)?,
            Err(poisoned) => upsert(&mut poisoned.into_inner(), fields)?,
        };
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::{ContactStore, InMemoryContactStore};
    use crate::domain::contact::ContactFields;
    use crate::errors::{ApplicationError, DomainError};

    fn fields(first: &str, last: &str, email: &str, phone: &str) -> ContactFields {
        ContactFields {
            first_name: first.to_string(),
            last_name: last.to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
        }
    }

    #[test]
    fn saved_contact_is_found_by_full_name_and_email() {
        let store = InMemoryContactStore::default();
        store.save(&fields("John", "Doe", "john@doe.com", "555-1234")).expect("save");

        let by_name = store.search("John Doe");
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].email, "john@doe.com");

        let all = store.load();
        assert!(all.iter().any(|c| c.matches_email("JOHN@DOE.COM")));
    }

    #[test]
    fn saving_same_email_twice_updates_in_place() {
        let store = InMemoryContactStore::default();
        store.save(&fields("John", "Doe", "john@doe.com", "555-1234")).expect("first save");
        store.save(&fields("Johnny", "Doe", "John@Doe.com", "555-9999")).expect("second save");

        let all = store.load();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].first_name, "Johnny");
        assert_eq!(all[0].phone.as_deref(), Some("555-9999"));
    }

    #[test]
    fn save_rejects_invalid_email() {
        let store = InMemoryContactStore::default();
        let error = store.save(&fields("John", "Doe", "not-an-email", "555")).expect_err("invalid");
        assert!(matches!(
            error,
            ApplicationError::Domain(DomainError::InvalidEmailAddress(_))
        ));
    }

    #[test]
    fn save_rejects_empty_name() {
        let store = InMemoryContactStore::default();
        let error = store.save(&fields(" ", "", "john@doe.com", "555")).expect_err("no name");
        assert_eq!(error, ApplicationError::Domain(DomainError::MissingContactName));
    }

    #[test]
    fn empty_phone_is_stored_as_absent() {
        let store = InMemoryContactStore::default();
        let saved = store.save(&fields("John", "Doe", "john@doe.com", "  ")).expect("save");
        assert_eq!(saved.phone, None);
    }
}
