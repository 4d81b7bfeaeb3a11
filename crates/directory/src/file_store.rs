use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use courier_core::config::DirectoryConfig;
use courier_core::contacts::matching::{search_in, DEFAULT_MATCH_THRESHOLD};
use courier_core::contacts::store::{upsert, ContactStore};
use courier_core::domain::contact::{is_valid_email, Contact, ContactFields};
use courier_core::errors::ApplicationError;

/// On-disk record shape. The redundant `name` field and the single-field
/// legacy form (`name` only) are both accepted on load; writes always emit
/// the split fields plus `name` so older readers keep working.
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredContact {
    #[serde(default)]
    first_name: String,
    #[serde(default)]
    last_name: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    phone: String,
}

impl StoredContact {
    fn from_contact(contact: &Contact) -> Self {
        Self {
            first_name: contact.first_name.clone(),
            last_name: contact.last_name.clone(),
            name: contact.full_name(),
            email: contact.email.clone(),
            phone: contact.phone.clone().unwrap_or_default(),
        }
    }

    fn into_contact(self) -> Option<Contact> {
        let mut first_name = self.first_name.trim().to_string();
        let mut last_name = self.last_name.trim().to_string();
        let legacy_name = self.name.trim();

        if first_name.is_empty() && last_name.is_empty() && !legacy_name.is_empty() {
            let mut tokens = legacy_name.split_whitespace();
            first_name = tokens.next().unwrap_or_default().to_string();
            last_name = tokens.collect::<Vec<_>>().join(" ");
        }

        let email = self.email.trim().to_string();
        if (first_name.is_empty() && last_name.is_empty()) || !is_valid_email(&email) {
            return None;
        }

        let phone = self.phone.trim();
        Some(Contact {
            first_name,
            last_name,
            email,
            phone: (!phone.is_empty()).then(|| phone.to_string()),
        })
    }
}

/// Contact directory persisted as a JSON list-of-records document.
///
/// Every operation reloads the file; writes replace the whole document via a
/// temp file + rename so a torn write can never leave partial JSON behind.
/// Concurrent writers are not coordinated beyond that (last write wins).
#[derive(Clone, Debug)]
pub struct FileContactStore {
    path: PathBuf,
    threshold: f64,
}

impl FileContactStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), threshold: DEFAULT_MATCH_THRESHOLD }
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn from_config(config: &DirectoryConfig) -> Self {
        Self::new(config.contacts_path.clone()).with_threshold(config.match_threshold)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Vec<Contact> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(_) => return Vec::new(),
        };
        if raw.trim().is_empty() {
            return Vec::new();
        }

        let rows: Vec<StoredContact> = match serde_json::from_str(&raw) {
            Ok(rows) => rows,
            Err(error) => {
                warn!(
                    event_name = "directory.load.malformed_file",
                    path = %self.path.display(),
                    error = %error,
                    "contacts file is malformed; treating as empty"
                );
                return Vec::new();
            }
        };
        rows.into_iter().filter_map(StoredContact::into_contact).collect()
    }

    fn write_all(&self, contacts: &[Contact]) -> Result<(), ApplicationError> {
        let rows: Vec<StoredContact> = contacts.iter().map(StoredContact::from_contact).collect();
        let payload = serde_json::to_string_pretty(&rows)
            .map_err(|error| ApplicationError::Persistence(error.to_string()))?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .map_err(|error| ApplicationError::Persistence(error.to_string()))?;
            }
        }

        let staging_path = self.path.with_extension("json.tmp");
        fs::write(&staging_path, payload)
            .map_err(|error| ApplicationError::Persistence(error.to_string()))?;
        fs::rename(&staging_path, &self.path)
            .map_err(|error| ApplicationError::Persistence(error.to_string()))?;
        Ok(())
    }
}

impl ContactStore for FileContactStore {
    fn load(&self) -> Vec<Contact> {
        self.read_all()
    }

    fn search(&self, query: &str) -> Vec<Contact> {
        search_in(&self.read_all(), query, self.threshold)
    }

    fn save(&self, fields: &ContactFields) -> Result<Contact, ApplicationError> {
        let mut contacts = self.read_all();
        let saved = upsert(&mut contacts, fields)?;
        self.write_all(&contacts)?;
        Ok(saved)
    }
}
