use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use courier_core::conversation::capture::CaptureReply;
use courier_core::conversation::confirm::ConfirmationReply;
use courier_core::conversation::draft::DraftUpdate;
use courier_core::conversation::state::{ContactCapture, TurnMessage};
use courier_core::domain::calendar::CalendarEvent;
use courier_core::domain::contact::ContactFields;
use courier_core::domain::email::{EmailContent, EmailDraft};

/// An external capability call failed or returned an unusable structure.
/// Call sites never surface this to the user; each one falls back to a
/// documented neutral default.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("capability call failed: {0}")]
pub struct CapabilityError(pub String);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotIntent {
    SendEmail,
    NotEmail,
    #[default]
    Unknown,
}

/// Email-slot-update record: one turn's incremental extraction.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailSlotUpdate {
    #[serde(default)]
    pub intent: SlotIntent,
    #[serde(flatten)]
    pub update: DraftUpdate,
}

/// Subject suggestion derived strictly from an explicit topic cue already in
/// the conversation. `None` when no such cue exists — never invented.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftAutofill {
    #[serde(default)]
    pub subject: Option<String>,
}

/// Presentation-only rewrite of a complete draft. Must preserve every
/// factual detail and introduce none.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolishedDraft {
    pub subject: String,
    pub body: String,
}

/// Meeting-intent record: whether the conversation also implies a calendar
/// event alongside the resolved email.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetingIntent {
    #[serde(default)]
    pub create_calendar_event: bool,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub attendees: Vec<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupKind {
    LookupContact,
    #[default]
    Other,
}

/// Contact-lookup-intent record.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactLookupIntent {
    #[serde(default)]
    pub intent: LookupKind,
    #[serde(default)]
    pub query: Option<String>,
}

/// Greeting/small-talk check ahead of any task routing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationalRoute {
    SmallTalk,
    #[default]
    Task,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanAction {
    SendEmail,
    CreateCalendarEvent,
    Both,
    AskForClarification,
    #[default]
    None,
}

/// Full-action-plan record: one-shot extraction over the entire context,
/// used when no multi-turn state applies.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionPlan {
    #[serde(default)]
    pub action: PlanAction,
    #[serde(default)]
    pub email: Option<EmailContent>,
    #[serde(default)]
    pub calendar: Option<CalendarEvent>,
    #[serde(default)]
    pub clarification: Option<String>,
}

/// Structured extraction and classification consumed by the orchestrator.
///
/// Implementations translate free text into the typed records above — an
/// LLM-backed client in a host, or the deterministic [`crate::heuristics::
/// HeuristicExtractor`] shipped here. The orchestrator owns all fallback
/// behavior: an `Err` from any method degrades to that call site's neutral
/// default and never aborts the turn.
#[async_trait]
pub trait ExtractionCapability: Send + Sync {
    /// Incremental email slot extraction for the latest turn.
    async fn email_slot_update(
        &self,
        context: &[TurnMessage],
        existing: &EmailDraft,
    ) -> Result<EmailSlotUpdate, CapabilityError>;

    /// Subject inference from an explicit topic cue; `None` when absent.
    async fn draft_autofill(
        &self,
        context: &[TurnMessage],
        draft: &EmailDraft,
    ) -> Result<DraftAutofill, CapabilityError>;

    /// Professional-phrasing rewrite of a complete draft.
    async fn polish_draft(&self, draft: &EmailDraft) -> Result<PolishedDraft, CapabilityError>;

    /// Does the conversation also ask for a calendar event?
    async fn meeting_intent(
        &self,
        context: &[TurnMessage],
        email: &EmailContent,
    ) -> Result<MeetingIntent, CapabilityError>;

    /// Parse first/last/email/phone out of free text.
    async fn contact_capture_fields(&self, text: &str)
        -> Result<ContactFields, CapabilityError>;

    /// Is this turn a contact-lookup request, and for whom?
    async fn contact_lookup_intent(
        &self,
        text: &str,
    ) -> Result<ContactLookupIntent, CapabilityError>;

    /// Classify a reply while the confirmation gate is armed.
    async fn classify_confirmation(
        &self,
        text: &str,
    ) -> Result<ConfirmationReply, CapabilityError>;

    /// Classify a reply while a capture awaits create-confirmation. The
    /// current capture (query, stage, source) is context for the classifier.
    async fn classify_capture_reply(
        &self,
        capture: &ContactCapture,
        text: &str,
    ) -> Result<CaptureReply, CapabilityError>;

    /// Greeting/small-talk check ahead of task routing.
    async fn conversational_route(
        &self,
        text: &str,
    ) -> Result<ConversationalRoute, CapabilityError>;

    /// One-shot plan over the whole context when nothing else matched.
    async fn full_action_plan(
        &self,
        context: &[TurnMessage],
    ) -> Result<ActionPlan, CapabilityError>;

    /// Free-form user-facing text for a given instruction (greetings,
    /// pause acknowledgments).
    async fn response_text(
        &self,
        instruction: &str,
        context: &[TurnMessage],
    ) -> Result<String, CapabilityError>;
}

#[cfg(test)]
mod tests {
    use super::{EmailSlotUpdate, MeetingIntent, SlotIntent};

    #[test]
    fn slot_update_deserializes_with_flattened_fields() {
        let raw = r#"{"intent": "send_email", "to": ["jane"], "subject": "Hi"}"#;
        let update: EmailSlotUpdate = serde_json::from_str(raw).expect("deserialize");
        assert_eq!(update.intent, SlotIntent::SendEmail);
        assert_eq!(update.update.to.as_deref(), Some(&["jane".to_string()][..]));
        assert_eq!(update.update.subject.as_deref(), Some("Hi"));
        assert_eq!(update.update.body, None);
    }

    #[test]
    fn meeting_intent_defaults_to_no_event() {
        let intent: MeetingIntent = serde_json::from_str("{}").expect("deserialize");
        assert!(!intent.create_calendar_event);
        assert!(intent.attendees.is_empty());
    }
}
