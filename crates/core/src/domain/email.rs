use serde::{Deserialize, Serialize};

/// Fully specified, recipient-resolved email payload. `to` entries are
/// concrete addresses, never raw name tokens.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailContent {
    pub to: Vec<String>,
    pub subject: String,
    pub body: String,
}

/// Partially collected email slots, filled incrementally across turns.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailDraft {
    #[serde(default)]
    pub to: Vec<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DraftField {
    To,
    Subject,
    Body,
}

impl DraftField {
    /// User-facing label used in missing-field prompts.
    pub fn prompt_label(&self) -> &'static str {
        match self {
            Self::To => "recipient email/name",
            Self::Subject => "subject line",
            Self::Body => "email message body",
        }
    }
}

impl EmailDraft {
    pub fn is_empty(&self) -> bool {
        self.to.is_empty() && self.subject.is_none() && self.body.is_none()
    }

    pub fn missing_fields(&self) -> Vec<DraftField> {
        let mut missing = Vec::new();
        if self.to.is_empty() {
            missing.push(DraftField::To);
        }
        if self.subject.as_deref().map_or(true, |s| s.trim().is_empty()) {
            missing.push(DraftField::Subject);
        }
        if self.body.as_deref().map_or(true, |b| b.trim().is_empty()) {
            missing.push(DraftField::Body);
        }
        missing
    }

    /// Converts into a concrete payload once every slot is filled.
    pub fn into_content(self) -> Option<EmailContent> {
        if !self.missing_fields().is_empty() {
            return None;
        }
        Some(EmailContent { to: self.to, subject: self.subject?, body: self.body? })
    }
}

#[cfg(test)]
mod tests {
    use super::{DraftField, EmailDraft};

    #[test]
    fn missing_fields_track_each_slot() {
        let draft = EmailDraft { to: vec!["jane@x.com".to_string()], ..EmailDraft::default() };
        assert_eq!(draft.missing_fields(), vec![DraftField::Subject, DraftField::Body]);

        let blank_subject = EmailDraft {
            to: vec!["jane@x.com".to_string()],
            subject: Some("   ".to_string()),
            body: Some("hello".to_string()),
        };
        assert_eq!(blank_subject.missing_fields(), vec![DraftField::Subject]);
    }

    #[test]
    fn complete_draft_converts_to_content() {
        let draft = EmailDraft {
            to: vec!["jane@x.com".to_string()],
            subject: Some("Status".to_string()),
            body: Some("All green.".to_string()),
        };
        let content = draft.into_content().expect("complete draft");
        assert_eq!(content.to, vec!["jane@x.com".to_string()]);
        assert_eq!(content.subject, "Status");
    }

    #[test]
    fn incomplete_draft_does_not_convert() {
        let draft = EmailDraft { to: vec!["jane@x.com".to_string()], ..EmailDraft::default() };
        assert!(draft.into_content().is_none());
    }
}
