use chrono::Duration;
use tracing::{info, warn};

use courier_core::contacts::store::ContactStore;
use courier_core::conversation::capture::{
    collection_prompt, missing_details_prompt, repair_contact_fields, substitute_recipient,
    CaptureReply,
};
use courier_core::conversation::confirm::{
    confirmation_summary, ConfirmationReply, CANCELLED_MESSAGE, CONFIRMATION_REPROMPT,
};
use courier_core::conversation::draft::merge;
use courier_core::conversation::resolve::{
    disambiguation_message, resolve_recipients, RecipientResolution,
};
use courier_core::conversation::state::{
    CaptureSource, CaptureStage, ContactCapture, ConversationMode, ConversationState, TaskKind,
};
use courier_core::domain::calendar::CalendarEvent;
use courier_core::domain::contact::is_valid_email;
use courier_core::domain::email::EmailDraft;
use courier_core::domain::ServiceProvider;
use courier_core::errors::ApplicationError;

use crate::capabilities::{
    ActionPlan, ConversationalRoute, ExtractionCapability, LookupKind, PlanAction, SlotIntent,
};
use crate::dispatch::ActionDispatcher;
use crate::session::SessionStore;

const EMPTY_REQUEST_PROMPT: &str = "Please provide a request.";
const NO_RECIPIENT_MESSAGE: &str = "Please provide at least one recipient.";
const NONE_ACTION_MESSAGE: &str = "Ask me to send an email or create a calendar event.";
const PARSE_FALLBACK_CLARIFICATION: &str =
    "I could not reliably parse your request. Please provide recipient, subject, and body in \
     one message.";
const FALLBACK_GREETING: &str =
    "Hello! I can help you send emails and schedule calendar events.";
const GREETING_INSTRUCTION: &str =
    "Reply with a short, warm greeting and offer to help with email or calendar tasks.";
const PAUSE_INSTRUCTION: &str =
    "Briefly acknowledge the user's unrelated remark and offer to continue afterwards.";

/// Top-level per-turn controller.
///
/// Each turn snapshots the thread's state, routes it through exactly one of
/// the mutually exclusive modes (confirmation gate, contact capture, normal
/// routing), commits the updated state, and returns a single user-facing
/// message. All natural-language understanding goes through the injected
/// [`ExtractionCapability`]; all side effects go through the injected
/// [`ActionDispatcher`].
pub struct Orchestrator<C, D, S> {
    capability: C,
    dispatcher: D,
    contacts: S,
    sessions: SessionStore,
}

impl<C, D, S> Orchestrator<C, D, S>
where
    C: ExtractionCapability,
    D: ActionDispatcher,
    S: ContactStore,
{
    pub fn new(capability: C, dispatcher: D, contacts: S) -> Self {
        Self { capability, dispatcher, contacts, sessions: SessionStore::default() }
    }

    /// Destroys a thread's conversation state ("clear chat").
    pub fn clear_thread(&self, thread_id: &str) {
        self.sessions.clear(thread_id);
    }

    /// Processes one user turn and returns the single reply for it.
    pub async fn handle_turn(
        &self,
        thread_id: &str,
        user_text: &str,
        provider: ServiceProvider,
    ) -> String {
        let text = user_text.trim();
        if text.is_empty() {
            return EMPTY_REQUEST_PROMPT.to_string();
        }

        let mut state = self.sessions.snapshot(thread_id);
        state.push_user(text);
        info!(
            event_name = "conversation.turn_started",
            thread_id,
            mode = mode_tag(&state.mode),
            provider = provider.display_name(),
            "processing user turn"
        );

        let reply = match state.mode.clone() {
            ConversationMode::AwaitingConfirmation => {
                self.confirmation_turn(&mut state, text, provider).await
            }
            ConversationMode::CapturingContact(capture) => {
                self.capture_turn(&mut state, capture, text).await
            }
            ConversationMode::Idle => self.route_turn(&mut state, text).await,
        };

        state.push_assistant(reply.clone());
        info!(
            event_name = "conversation.turn_completed",
            thread_id,
            mode = mode_tag(&state.mode),
            "turn produced one reply"
        );
        self.sessions.commit(thread_id, state);
        reply
    }

    /// Normal routing: greeting check, slot filling, lookup, full planner —
    /// first matching branch wins.
    async fn route_turn(&self, state: &mut ConversationState, text: &str) -> String {
        let route = self
            .capability
            .conversational_route(text)
            .await
            .unwrap_or(ConversationalRoute::Task);
        if route == ConversationalRoute::SmallTalk {
            state.clear_transient_flow_state();
            let context = state.recent_context().to_vec();
            return self
                .capability
                .response_text(GREETING_INSTRUCTION, &context)
                .await
                .unwrap_or_else(|_| FALLBACK_GREETING.to_string());
        }

        let context = state.recent_context().to_vec();
        let slot = self
            .capability
            .email_slot_update(&context, &state.email_draft)
            .await
            .unwrap_or_default();
        if slot.intent == SlotIntent::SendEmail || !state.email_draft.is_empty() {
            let merged = merge(&state.email_draft, &slot.update);
            return self.advance_email_flow(state, merged).await;
        }

        let lookup = self.capability.contact_lookup_intent(text).await.unwrap_or_default();
        if lookup.intent == LookupKind::LookupContact {
            return self.lookup_turn(state, &lookup.query.unwrap_or_default());
        }

        let plan = self.capability.full_action_plan(&context).await.unwrap_or_else(|_| {
            ActionPlan {
                action: PlanAction::AskForClarification,
                clarification: Some(PARSE_FALLBACK_CLARIFICATION.to_string()),
                ..ActionPlan::default()
            }
        });
        self.plan_turn(state, plan).await
    }

    /// Drives the email flow over the current draft: autofill, early
    /// recipient resolution, missing-field prompts, then polish + staging.
    async fn advance_email_flow(
        &self,
        state: &mut ConversationState,
        mut draft: EmailDraft,
    ) -> String {
        if draft.subject.as_deref().map_or(true, |subject| subject.trim().is_empty()) {
            let context = state.recent_context().to_vec();
            if let Ok(autofill) = self.capability.draft_autofill(&context, &draft).await {
                if let Some(subject) =
                    autofill.subject.filter(|subject| !subject.trim().is_empty())
                {
                    draft.subject = Some(subject);
                }
            }
        }
        state.email_draft = draft;

        if state.email_draft.to.is_empty() {
            return missing_fields_prompt(&state.email_draft);
        }

        // Recipients are validated before subject/body are even requested,
        // so contact problems surface on the first turn that names someone.
        match resolve_recipients(&self.contacts, &state.email_draft.to) {
            RecipientResolution::NeedsCapture { query } => {
                state.staged_tasks.clear();
                state.mode = ConversationMode::CapturingContact(ContactCapture::new(
                    query.clone(),
                    CaptureSource::EmailFlow,
                ));
                info!(
                    event_name = "capture.offer_issued",
                    query = %query,
                    "recipient unresolved; offering contact capture"
                );
                capture_offer_message(&query)
            }
            RecipientResolution::Ambiguous { query, candidates } => {
                state.staged_tasks.clear();
                disambiguation_message(&query, &candidates)
            }
            RecipientResolution::NoRecipients => NO_RECIPIENT_MESSAGE.to_string(),
            RecipientResolution::Resolved(addresses) => {
                state.email_draft.to = addresses;
                if !state.email_draft.missing_fields().is_empty() {
                    return missing_fields_prompt(&state.email_draft);
                }
                self.finalize_email(state).await
            }
        }
    }

    /// Complete draft: polish, attach any implied meeting, stage behind the
    /// confirmation gate.
    async fn finalize_email(&self, state: &mut ConversationState) -> String {
        let mut draft = state.email_draft.clone();
        if let Ok(polished) = self.capability.polish_draft(&draft).await {
            draft.subject = Some(polished.subject);
            draft.body = Some(polished.body);
        }

        let Some(email) = draft.into_content() else {
            return missing_fields_prompt(&state.email_draft);
        };

        let mut tasks = vec![TaskKind::Email];
        let context = state.recent_context().to_vec();
        if let Ok(meeting) = self.capability.meeting_intent(&context, &email).await {
            if meeting.create_calendar_event {
                if let (Some(title), Some(start)) = (meeting.title, meeting.start_time) {
                    let attendees = if meeting.attendees.is_empty() {
                        email.to.clone()
                    } else {
                        meeting.attendees
                    };
                    state.calendar_details = Some(CalendarEvent {
                        title,
                        start_time: start,
                        end_time: meeting.end_time.unwrap_or(start + Duration::hours(1)),
                        attendees,
                        location: meeting.location,
                        description: meeting
                            .description
                            .or_else(|| Some(email.body.clone())),
                    });
                    tasks.push(TaskKind::Calendar);
                }
            }
        }

        state.email_details = Some(email);
        state.email_draft = EmailDraft::default();
        state.stage_for_confirmation(tasks);
        confirmation_summary(state.email_details.as_ref(), state.calendar_details.as_ref())
    }

    /// One turn while the confirmation gate is armed.
    async fn confirmation_turn(
        &self,
        state: &mut ConversationState,
        text: &str,
        provider: ServiceProvider,
    ) -> String {
        let reply = self
            .capability
            .classify_confirmation(text)
            .await
            .unwrap_or(ConfirmationReply::Other);

        match reply {
            ConfirmationReply::Confirm => {
                state.promote_staged();
                self.execute_pending(state, provider).await
            }
            ConfirmationReply::Cancel => {
                state.cancel_staged();
                info!(event_name = "confirmation.cancelled", "staged actions dropped");
                CANCELLED_MESSAGE.to_string()
            }
            ConfirmationReply::Pause | ConfirmationReply::Other => {
                CONFIRMATION_REPROMPT.to_string()
            }
        }
    }

    /// Executes every pending task in order (email before calendar). Each
    /// task leaves `pending_tasks` whether it succeeded or not; failures
    /// become plain-language notices and are never retried.
    async fn execute_pending(
        &self,
        state: &mut ConversationState,
        provider: ServiceProvider,
    ) -> String {
        let tasks: Vec<TaskKind> = state.pending_tasks.iter().copied().collect();
        let mut lines = Vec::new();

        for task in tasks {
            let line = match task {
                TaskKind::Email => match &state.email_details {
                    Some(email) => match self.dispatcher.send_email(provider, email).await {
                        Ok(confirmation) => {
                            info!(
                                event_name = "dispatch.email_sent",
                                provider = provider.display_name(),
                                recipients = email.to.join(", "),
                                "email dispatched"
                            );
                            confirmation
                        }
                        Err(error) => {
                            warn!(
                                event_name = "dispatch.email_failed",
                                provider = provider.display_name(),
                                error = %error,
                                "email dispatch failed"
                            );
                            format!("Email failed: {error}")
                        }
                    },
                    None => "Email details are missing.".to_string(),
                },
                TaskKind::Calendar => match &state.calendar_details {
                    Some(event) => {
                        match self.dispatcher.create_calendar_event(provider, event).await {
                            Ok(confirmation) => {
                                info!(
                                    event_name = "dispatch.calendar_created",
                                    provider = provider.display_name(),
                                    title = %event.title,
                                    "calendar event dispatched"
                                );
                                confirmation
                            }
                            Err(error) => {
                                warn!(
                                    event_name = "dispatch.calendar_failed",
                                    provider = provider.display_name(),
                                    error = %error,
                                    "calendar dispatch failed"
                                );
                                format!("Calendar failed: {error}")
                            }
                        }
                    }
                    None => "Calendar details are missing.".to_string(),
                },
            };
            lines.push(line);
            state.pending_tasks.remove(&task);
        }

        state.email_details = None;
        state.calendar_details = None;
        lines.join("\n")
    }

    /// One turn of the contact-capture sub-flow.
    async fn capture_turn(
        &self,
        state: &mut ConversationState,
        capture: ContactCapture,
        text: &str,
    ) -> String {
        match capture.stage {
            CaptureStage::AwaitingCreateConfirmation => {
                let mut reply = self
                    .capability
                    .classify_capture_reply(&capture, text)
                    .await
                    .unwrap_or(CaptureReply::Other);
                // An alternate recipient only makes sense when an email flow
                // is suspended underneath the capture.
                if capture.source == CaptureSource::LookupOnly
                    && matches!(reply, CaptureReply::AlternateRecipient(_))
                {
                    reply = CaptureReply::Other;
                }

                match reply {
                    CaptureReply::Create => {
                        state.mode = ConversationMode::CapturingContact(ContactCapture {
                            stage: CaptureStage::CollectingDetails,
                            ..capture
                        });
                        collection_prompt()
                    }
                    CaptureReply::Cancel => {
                        state.clear_transient_flow_state();
                        "Okay - I did not save a contact, and nothing was sent.".to_string()
                    }
                    CaptureReply::AlternateRecipient(token) => {
                        self.alternate_recipient(state, &capture, &token).await
                    }
                    CaptureReply::Pause => {
                        state.mode = ConversationMode::Idle;
                        let context = state.recent_context().to_vec();
                        let response = self
                            .capability
                            .response_text(PAUSE_INSTRUCTION, &context)
                            .await
                            .unwrap_or_else(|_| "Sure, we can come back to that.".to_string());
                        format!(
                            "{response}\nIf you still want to add '{}' as a contact, just \
                             tell me.",
                            capture.query
                        )
                    }
                    CaptureReply::Other => {
                        // Treat the turn as a fresh, unrelated request; the
                        // suspended draft must not hijack it back into the
                        // email flow.
                        state.clear_transient_flow_state();
                        self.route_turn(state, text).await
                    }
                }
            }
            CaptureStage::CollectingDetails => {
                let raw = self
                    .capability
                    .contact_capture_fields(text)
                    .await
                    .unwrap_or_default();
                let repaired = repair_contact_fields(&raw);
                if !repaired.is_complete() {
                    return missing_details_prompt(&repaired.missing());
                }

                match self.contacts.save(&repaired) {
                    Err(ApplicationError::Domain(domain)) => {
                        // Validation problems do not advance the sub-flow.
                        format!(
                            "I could not save that contact: {domain}. Please share the \
                             details again."
                        )
                    }
                    Err(error) => format!("Could not save contact: {error}"),
                    Ok(saved) => {
                        info!(
                            event_name = "capture.contact_saved",
                            email = %saved.email,
                            "contact persisted from capture sub-flow"
                        );
                        let acknowledgment =
                            format!("Saved contact: {} <{}>", saved.full_name(), saved.email);
                        match capture.source {
                            CaptureSource::LookupOnly => {
                                state.mode = ConversationMode::Idle;
                                acknowledgment
                            }
                            CaptureSource::EmailFlow => {
                                state.mode = ConversationMode::Idle;
                                state.email_draft.to = substitute_recipient(
                                    &state.email_draft.to,
                                    &capture.query,
                                    &saved.email,
                                );
                                let draft = state.email_draft.clone();
                                let follow_up = self.advance_email_flow(state, draft).await;
                                format!("{acknowledgment}\n{follow_up}")
                            }
                        }
                    }
                }
            }
        }
    }

    /// "Send it to X instead": resolve the alternate token by direct email
    /// or unique fuzzy match, substitute it, and resume the email flow.
    async fn alternate_recipient(
        &self,
        state: &mut ConversationState,
        capture: &ContactCapture,
        token: &str,
    ) -> String {
        let address = if is_valid_email(token) {
            Some(token.trim().to_string())
        } else {
            let mut matches = self.contacts.search(token);
            (matches.len() == 1).then(|| matches.remove(0).email)
        };

        match address {
            Some(address) => {
                state.mode = ConversationMode::Idle;
                state.email_draft.to =
                    substitute_recipient(&state.email_draft.to, &capture.query, &address);
                let draft = state.email_draft.clone();
                self.advance_email_flow(state, draft).await
            }
            None => format!(
                "I could not resolve '{token}' either. Should I save '{}' as a new contact? \
                 You can also share a full email address.",
                capture.query
            ),
        }
    }

    /// Contact-lookup branch: present details, list candidates, or offer to
    /// create a missing contact.
    fn lookup_turn(&self, state: &mut ConversationState, query: &str) -> String {
        let query = query.trim();
        if query.is_empty() {
            return "Please tell me whose contact details you need.".to_string();
        }

        let contacts = if is_valid_email(query) {
            self.contacts
                .load()
                .into_iter()
                .filter(|contact| contact.matches_email(query))
                .collect::<Vec<_>>()
        } else {
            self.contacts.search(query)
        };

        match contacts.as_slice() {
            [] => {
                state.mode = ConversationMode::CapturingContact(ContactCapture::new(
                    query,
                    CaptureSource::LookupOnly,
                ));
                format!(
                    "I could not find contact details for '{query}'. Would you like me to \
                     save '{query}' as a new contact?"
                )
            }
            [contact] => format!(
                "Contact details:\nFirst Name: {}\nLast Name: {}\nEmail: {}\nPhone: {}",
                contact.first_name,
                contact.last_name,
                contact.email,
                contact.phone.as_deref().unwrap_or("N/A")
            ),
            several => {
                let options = several
                    .iter()
                    .take(5)
                    .map(|contact| {
                        format!(
                            "- {} <{}> | phone: {}",
                            contact.full_name(),
                            contact.email,
                            contact.phone.as_deref().unwrap_or("N/A")
                        )
                    })
                    .collect::<Vec<_>>()
                    .join("\n");
                format!("I found multiple contacts for '{query}':\n{options}")
            }
        }
    }

    /// One-shot planner branch used when no multi-turn context applies.
    async fn plan_turn(&self, state: &mut ConversationState, plan: ActionPlan) -> String {
        match plan.action {
            PlanAction::AskForClarification => plan
                .clarification
                .filter(|clarification| !clarification.trim().is_empty())
                .unwrap_or_else(|| "Please clarify your request.".to_string()),
            PlanAction::None => NONE_ACTION_MESSAGE.to_string(),
            PlanAction::SendEmail | PlanAction::Both | PlanAction::CreateCalendarEvent => {
                let mut tasks = Vec::new();

                if matches!(plan.action, PlanAction::SendEmail | PlanAction::Both) {
                    let Some(email) = plan.email else {
                        return PARSE_FALLBACK_CLARIFICATION.to_string();
                    };
                    // Keep the plan's slots as the draft so capture or
                    // disambiguation can resume the flow next turn.
                    state.email_draft = EmailDraft {
                        to: email.to.clone(),
                        subject: Some(email.subject.clone()),
                        body: Some(email.body.clone()),
                    };

                    match resolve_recipients(&self.contacts, &email.to) {
                        RecipientResolution::NeedsCapture { query } => {
                            state.staged_tasks.clear();
                            state.mode = ConversationMode::CapturingContact(
                                ContactCapture::new(query.clone(), CaptureSource::EmailFlow),
                            );
                            return capture_offer_message(&query);
                        }
                        RecipientResolution::Ambiguous { query, candidates } => {
                            state.staged_tasks.clear();
                            return disambiguation_message(&query, &candidates);
                        }
                        RecipientResolution::NoRecipients => {
                            return NO_RECIPIENT_MESSAGE.to_string();
                        }
                        RecipientResolution::Resolved(addresses) => {
                            state.email_details =
                                Some(courier_core::domain::email::EmailContent {
                                    to: addresses,
                                    subject: email.subject,
                                    body: email.body,
                                });
                            state.email_draft = EmailDraft::default();
                            tasks.push(TaskKind::Email);
                        }
                    }
                }

                if matches!(plan.action, PlanAction::CreateCalendarEvent | PlanAction::Both) {
                    if let Some(event) = plan.calendar {
                        state.calendar_details = Some(event);
                        tasks.push(TaskKind::Calendar);
                    }
                }

                if tasks.is_empty() {
                    return NONE_ACTION_MESSAGE.to_string();
                }
                state.stage_for_confirmation(tasks);
                confirmation_summary(
                    state.email_details.as_ref(),
                    state.calendar_details.as_ref(),
                )
            }
        }
    }
}

fn mode_tag(mode: &ConversationMode) -> &'static str {
    match mode {
        ConversationMode::Idle => "idle",
        ConversationMode::AwaitingConfirmation => "awaiting_confirmation",
        ConversationMode::CapturingContact(capture) => match capture.stage {
            CaptureStage::AwaitingCreateConfirmation => "capture.awaiting_create_confirmation",
            CaptureStage::CollectingDetails => "capture.collecting_details",
        },
    }
}

fn capture_offer_message(query: &str) -> String {
    format!(
        "I could not find '{query}' in your contacts.\nShould I save '{query}' as a new \
         contact? You can also give a different recipient."
    )
}

fn missing_fields_prompt(draft: &EmailDraft) -> String {
    let labels = draft
        .missing_fields()
        .iter()
        .map(|field| field.prompt_label())
        .collect::<Vec<_>>()
        .join(", ");
    format!("Got it. Please provide: {labels}.")
}
