use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::domain::calendar::CalendarEvent;
use crate::domain::email::{EmailContent, EmailDraft};

/// How many trailing messages are handed to extraction capabilities as
/// conversation context.
pub const CONTEXT_WINDOW: usize = 14;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnMessage {
    pub role: Role,
    pub text: String,
}

/// Side-effecting action kinds. Ordering is load-bearing: email executes
/// before calendar when both are pending.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    Email,
    Calendar,
}

/// Where the capture sub-flow was entered from. A `LookupOnly` capture
/// reports success and returns to idle instead of resuming an email draft.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureSource {
    #[default]
    EmailFlow,
    LookupOnly,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureStage {
    AwaitingCreateConfirmation,
    CollectingDetails,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactCapture {
    /// The recipient token that failed to resolve.
    pub query: String,
    pub stage: CaptureStage,
    pub source: CaptureSource,
}

impl ContactCapture {
    pub fn new(query: impl Into<String>, source: CaptureSource) -> Self {
        Self {
            query: query.into(),
            stage: CaptureStage::AwaitingCreateConfirmation,
            source,
        }
    }
}

/// Mutually exclusive interpretation modes for the next user turn.
///
/// Priority when routing a turn: `AwaitingConfirmation` >
/// `CapturingContact` > normal routing (which happens while `Idle`). Exactly
/// one variant governs at any time, so the next turn's meaning is never
/// ambiguous.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "mode", content = "capture")]
pub enum ConversationMode {
    #[default]
    Idle,
    AwaitingConfirmation,
    CapturingContact(ContactCapture),
}

/// Per-thread conversation state. Owned by the session store, mutated only
/// while processing that thread's turn, destroyed on thread clear.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationState {
    pub messages: Vec<TurnMessage>,
    pub email_draft: EmailDraft,
    pub email_details: Option<EmailContent>,
    pub calendar_details: Option<CalendarEvent>,
    pub staged_tasks: BTreeSet<TaskKind>,
    pub pending_tasks: BTreeSet<TaskKind>,
    pub mode: ConversationMode,
}

impl ConversationState {
    pub fn push_user(&mut self, text: impl Into<String>) {
        self.messages.push(TurnMessage { role: Role::User, text: text.into() });
    }

    pub fn push_assistant(&mut self, text: impl Into<String>) {
        self.messages.push(TurnMessage { role: Role::Assistant, text: text.into() });
    }

    /// Trailing context window handed to extraction calls.
    pub fn recent_context(&self) -> &[TurnMessage] {
        let start = self.messages.len().saturating_sub(CONTEXT_WINDOW);
        &self.messages[start..]
    }

    pub fn latest_user_text(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|message| message.role == Role::User)
            .map(|message| message.text.as_str())
    }

    /// Stages resolved actions behind the confirmation gate.
    pub fn stage_for_confirmation(&mut self, tasks: impl IntoIterator<Item = TaskKind>) {
        self.staged_tasks = tasks.into_iter().collect();
        self.pending_tasks.clear();
        self.mode = ConversationMode::AwaitingConfirmation;
    }

    /// Confirm: staged tasks become pending for execution this turn.
    pub fn promote_staged(&mut self) {
        self.pending_tasks = std::mem::take(&mut self.staged_tasks);
        self.mode = ConversationMode::Idle;
    }

    /// Cancel: every staged action and resolved payload is dropped.
    pub fn cancel_staged(&mut self) {
        self.staged_tasks.clear();
        self.pending_tasks.clear();
        self.email_details = None;
        self.calendar_details = None;
        self.mode = ConversationMode::Idle;
    }

    /// Drops in-flight flow context (draft, staged actions, mode) while
    /// keeping the message history.
    pub fn clear_transient_flow_state(&mut self) {
        self.email_draft = EmailDraft::default();
        self.email_details = None;
        self.calendar_details = None;
        self.staged_tasks.clear();
        self.pending_tasks.clear();
        self.mode = ConversationMode::Idle;
    }
}
