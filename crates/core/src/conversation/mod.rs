pub mod capture;
pub mod confirm;
pub mod draft;
pub mod resolve;
pub mod state;

pub use capture::CaptureReply;
pub use confirm::ConfirmationReply;
pub use draft::DraftUpdate;
pub use resolve::{RecipientResolution, MAX_DISAMBIGUATION_CANDIDATES};
pub use state::{
    CaptureSource, CaptureStage, ContactCapture, ConversationMode, ConversationState, Role,
    TaskKind, TurnMessage, CONTEXT_WINDOW,
};
