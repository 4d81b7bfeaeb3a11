//! Agent runtime for Courier - turn routing and capability ports.
//!
//! This crate wires the deterministic conversation core to the outside
//! world:
//! - `capabilities` - typed extraction/classification ports the orchestrator
//!   consumes (an LLM client in a host, or the shipped heuristics)
//! - `heuristics` - rule-based default implementation of those ports
//! - `dispatch` - the side-effecting email/calendar boundary
//! - `session` - per-thread conversation state, sharded by thread id
//! - `orchestrator` - the per-turn controller
//!
//! The capability layer is strictly a translator: it never decides whether
//! an action runs. Staging, confirmation, and dispatch are deterministic
//! decisions made by the orchestrator over `courier-core` state.

pub mod capabilities;
pub mod dispatch;
pub mod heuristics;
pub mod orchestrator;
pub mod session;

pub use capabilities::{
    ActionPlan, CapabilityError, ContactLookupIntent, ConversationalRoute, DraftAutofill,
    EmailSlotUpdate, ExtractionCapability, LookupKind, MeetingIntent, PlanAction, PolishedDraft,
    SlotIntent,
};
pub use dispatch::{ActionDispatcher, DispatchError, NoopDispatcher, RecordingDispatcher};
pub use heuristics::HeuristicExtractor;
pub use orchestrator::Orchestrator;
pub use session::SessionStore;
