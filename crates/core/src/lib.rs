//! Conversation core for Courier - deterministic state machine over email
//! and calendar requests.
//!
//! This crate holds everything that must be decidable without a model call:
//! the per-thread conversation state and its mutually exclusive modes, the
//! draft merger, the recipient resolver, the contact-capture repair rules,
//! the confirmation-gate transitions, and the contact matching algorithm.
//! Natural-language understanding and side effects stay behind ports owned
//! by `courier-agent`.

pub mod config;
pub mod contacts;
pub mod conversation;
pub mod domain;
pub mod errors;

pub use config::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};
pub use contacts::{ContactStore, InMemoryContactStore};
pub use conversation::{
    CaptureReply, CaptureSource, CaptureStage, ConfirmationReply, ContactCapture,
    ConversationMode, ConversationState, DraftUpdate, RecipientResolution, Role, TaskKind,
    TurnMessage,
};
pub use domain::calendar::CalendarEvent;
pub use domain::contact::{Contact, ContactFields};
pub use domain::email::{EmailContent, EmailDraft};
pub use domain::ServiceProvider;
pub use errors::{ApplicationError, DomainError, InterfaceError};
