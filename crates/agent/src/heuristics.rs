use std::sync::OnceLock;

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use regex::Regex;

use courier_core::conversation::capture::CaptureReply;
use courier_core::conversation::confirm::ConfirmationReply;
use courier_core::conversation::draft::DraftUpdate;
use courier_core::conversation::state::{ContactCapture, Role, TurnMessage};
use courier_core::domain::contact::ContactFields;
use courier_core::domain::email::{EmailContent, EmailDraft};

use crate::capabilities::{
    ActionPlan, CapabilityError, ContactLookupIntent, ConversationalRoute, DraftAutofill,
    EmailSlotUpdate, ExtractionCapability, LookupKind, MeetingIntent, PlanAction, PolishedDraft,
    SlotIntent,
};

/// Rule-based implementation of every extraction capability.
///
/// This is the default wiring when no model client is configured: keyword
/// tables, windowed token scans, and a couple of regexes. It is deliberately
/// conservative — when a rule does not fire the orchestrator's neutral
/// defaults take over, which degrades to a clarification prompt rather than
/// a wrong action.
#[derive(Clone, Debug, Default)]
pub struct HeuristicExtractor;

impl HeuristicExtractor {
    pub fn new() -> Self {
        Self
    }
}

fn email_finder() -> &'static Regex {
    static EMAIL_FINDER: OnceLock<Regex> = OnceLock::new();
    EMAIL_FINDER.get_or_init(|| {
        Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}")
            .expect("email finder pattern is valid")
    })
}

fn phone_finder() -> &'static Regex {
    static PHONE_FINDER: OnceLock<Regex> = OnceLock::new();
    PHONE_FINDER
        .get_or_init(|| Regex::new(r"\+?\d[\d\s().-]{5,}\d").expect("phone pattern is valid"))
}

fn datetime_finder() -> &'static Regex {
    static DATETIME_FINDER: OnceLock<Regex> = OnceLock::new();
    DATETIME_FINDER.get_or_init(|| {
        Regex::new(r"(\d{4})-(\d{2})-(\d{2})[T ](\d{1,2}):(\d{2})")
            .expect("datetime pattern is valid")
    })
}

fn find_emails(text: &str) -> Vec<String> {
    email_finder().find_iter(text).map(|m| m.as_str().to_string()).collect()
}

fn latest_user_text(context: &[TurnMessage]) -> &str {
    context
        .iter()
        .rev()
        .find(|message| message.role == Role::User)
        .map(|message| message.text.as_str())
        .unwrap_or("")
}

fn words(text: &str) -> Vec<String> {
    text.split(|ch: char| !ch.is_alphanumeric() && ch != '\'' && ch != '@' && ch != '.')
        .map(|token| token.trim_matches(|ch: char| ch == '.' || ch == '\''))
        .filter(|token| !token.is_empty())
        .map(|token| token.to_lowercase())
        .collect()
}

fn has_word(text: &str, word: &str) -> bool {
    words(text).iter().any(|token| token == word)
}

fn has_any_word(text: &str, candidates: &[&str]) -> bool {
    let tokens = words(text);
    candidates.iter().any(|candidate| tokens.iter().any(|token| token == candidate))
}

fn has_any_phrase(lower: &str, phrases: &[&str]) -> bool {
    phrases.iter().any(|phrase| lower.contains(phrase))
}

/// Capture the text following `marker` up to the first stop cue.
fn capture_after<'a>(text: &'a str, lower: &str, marker: &str, stops: &[&str]) -> Option<&'a str> {
    let start = lower.find(marker)? + marker.len();
    let tail = &text[start..];
    let tail_lower = &lower[start..];

    let mut end = tail.len();
    for stop in stops {
        if let Some(index) = tail_lower.find(stop) {
            end = end.min(index);
        }
    }
    let captured = tail[..end].trim().trim_matches(|ch: char| ch == ',' || ch == '.');
    (!captured.is_empty()).then_some(captured)
}

fn strip_leading_article(value: &str) -> &str {
    let lower = value.to_ascii_lowercase();
    for article in ["the ", "a ", "an "] {
        if lower.starts_with(article) {
            return value[article.len()..].trim_start();
        }
    }
    value
}

fn sentence_case(value: &str) -> String {
    let trimmed = value.trim();
    let mut chars = trimmed.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

fn parse_datetimes(text: &str) -> Vec<DateTime<Utc>> {
    datetime_finder()
        .captures_iter(text)
        .filter_map(|captures| {
            let year = captures.get(1)?.as_str().parse().ok()?;
            let month = captures.get(2)?.as_str().parse().ok()?;
            let day = captures.get(3)?.as_str().parse().ok()?;
            let hour = captures.get(4)?.as_str().parse().ok()?;
            let minute = captures.get(5)?.as_str().parse().ok()?;
            Utc.with_ymd_and_hms(year, month, day, hour, minute, 0).single()
        })
        .collect()
}

const BODY_MARKERS: [&str; 9] = [
    "tell him that ",
    "tell her that ",
    "tell them that ",
    "tell him ",
    "tell her ",
    "tell them ",
    "say that ",
    "saying ",
    "body: ",
];

const SUBJECT_MARKERS: [&str; 3] = ["subject is ", "subject: ", "subject line is "];

const MEETING_WORDS: [&str; 8] =
    ["meet", "meeting", "call", "sync", "appointment", "invite", "schedule", "calendar"];

const TASK_WORDS: [&str; 10] = [
    "email", "mail", "send", "draft", "calendar", "meeting", "schedule", "contact", "invite",
    "remind",
];

const GREETING_PHRASES: [&str; 9] = [
    "hi",
    "hello",
    "hey",
    "good morning",
    "good afternoon",
    "good evening",
    "how are you",
    "thanks",
    "thank you",
];

fn extract_recipient_tokens(text: &str, lower: &str) -> Vec<String> {
    let mut recipients = find_emails(text);
    if !recipients.is_empty() {
        return recipients;
    }

    // "email Jane about ..." / "send an email to Jane saying ..."
    let stops = [
        " about ", " regarding ", " that ", " saying ", " telling ", " and ", ",", ".", " tell ",
        " say ",
    ];
    for marker in ["email to ", "mail to ", "send to ", "write to ", "email ", " to "] {
        if let Some(captured) = capture_after(text, lower, marker, &stops) {
            let candidate = captured
                .split_whitespace()
                .take(3)
                .collect::<Vec<_>>()
                .join(" ");
            let candidate_lower = candidate.to_lowercase();
            let pronouns = ["him", "her", "them", "me", "us", "everyone", "a", "an", "the"];
            if !candidate.is_empty() && !pronouns.contains(&candidate_lower.as_str()) {
                recipients.push(candidate);
                break;
            }
        }
    }
    recipients
}

#[async_trait]
impl ExtractionCapability for HeuristicExtractor {
    async fn email_slot_update(
        &self,
        context: &[TurnMessage],
        _existing: &EmailDraft,
    ) -> Result<EmailSlotUpdate, CapabilityError> {
        let text = latest_user_text(context);
        // ASCII lowering keeps byte offsets aligned with `text` for slicing.
        let lower = text.to_ascii_lowercase();

        let email_cue = has_any_word(&lower, &["email", "mail"])
            || has_any_phrase(&lower, &["e-mail", "send a message", "write to"]);

        let to = extract_recipient_tokens(text, &lower);
        let subject = SUBJECT_MARKERS
            .iter()
            .find_map(|marker| capture_after(text, &lower, marker, &[",", ".", " and body"]))
            .map(sentence_case);
        let body = BODY_MARKERS
            .iter()
            .find_map(|marker| capture_after(text, &lower, marker, &[]))
            .map(str::to_string);

        let intent = if email_cue { SlotIntent::SendEmail } else { SlotIntent::Unknown };

        Ok(EmailSlotUpdate {
            intent,
            update: DraftUpdate {
                to: (!to.is_empty()).then_some(to),
                subject,
                body,
            },
        })
    }

    async fn draft_autofill(
        &self,
        context: &[TurnMessage],
        draft: &EmailDraft,
    ) -> Result<DraftAutofill, CapabilityError> {
        if draft.subject.as_deref().is_some_and(|subject| !subject.trim().is_empty()) {
            return Ok(DraftAutofill { subject: draft.subject.clone() });
        }

        // Only an explicit topic cue counts; nothing is invented.
        let stops = [" tell ", " say ", " saying ", ",", "."];
        for message in context.iter().rev().filter(|message| message.role == Role::User) {
            let lower = message.text.to_ascii_lowercase();
            for marker in ["about ", "regarding ", "re: "] {
                if let Some(topic) = capture_after(&message.text, &lower, marker, &stops) {
                    let subject = sentence_case(strip_leading_article(topic));
                    if !subject.is_empty() {
                        return Ok(DraftAutofill { subject: Some(subject) });
                    }
                }
            }
        }
        Ok(DraftAutofill { subject: None })
    }

    async fn polish_draft(&self, draft: &EmailDraft) -> Result<PolishedDraft, CapabilityError> {
        let subject = draft
            .subject
            .as_deref()
            .ok_or_else(|| CapabilityError("polish requires a complete draft".to_string()))?;
        let body = draft
            .body
            .as_deref()
            .ok_or_else(|| CapabilityError("polish requires a complete draft".to_string()))?;

        // Presentation only: casing and terminal punctuation. Every factual
        // detail passes through verbatim.
        let polished_subject = sentence_case(subject.trim().trim_end_matches('.'));
        let mut polished_body = sentence_case(body.trim());
        if !polished_body.is_empty() && !polished_body.ends_with(['.', '!', '?']) {
            polished_body.push('.');
        }
        Ok(PolishedDraft { subject: polished_subject, body: polished_body })
    }

    async fn meeting_intent(
        &self,
        context: &[TurnMessage],
        email: &EmailContent,
    ) -> Result<MeetingIntent, CapabilityError> {
        let user_text = context
            .iter()
            .filter(|message| message.role == Role::User)
            .map(|message| message.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        let lower = user_text.to_lowercase();

        let timestamps = parse_datetimes(&user_text);
        let Some(start) = timestamps.first().copied() else {
            return Ok(MeetingIntent::default());
        };
        if !has_any_word(&lower, &MEETING_WORDS) {
            return Ok(MeetingIntent::default());
        }

        Ok(MeetingIntent {
            create_calendar_event: true,
            title: Some(email.subject.clone()),
            start_time: Some(start),
            end_time: timestamps.get(1).copied(),
            attendees: Vec::new(),
            location: None,
            description: None,
        })
    }

    async fn contact_capture_fields(
        &self,
        text: &str,
    ) -> Result<ContactFields, CapabilityError> {
        let email = find_emails(text).into_iter().next().unwrap_or_default();

        let mut remainder = text.to_string();
        if !email.is_empty() {
            remainder = remainder.replace(&email, " ");
        }
        let phone = phone_finder()
            .find(&remainder)
            .map(|found| found.as_str().trim().to_string())
            .unwrap_or_default();
        if !phone.is_empty() {
            remainder = remainder.replace(&phone, " ");
        }

        let label_or_filler = [
            "fname", "lname", "email", "mail", "phone", "phno", "number", "mobile", "add", "new",
            "contact", "save", "name", "is", "the", "their", "his", "her", "please", "and",
        ];
        let name_tokens: Vec<&str> = remainder
            .split(|ch: char| !ch.is_alphanumeric() && ch != '\'')
            .filter(|token| !token.is_empty())
            .filter(|token| !label_or_filler.contains(&token.to_lowercase().as_str()))
            .filter(|token| token.chars().any(char::is_alphabetic))
            .collect();

        Ok(ContactFields {
            first_name: name_tokens.first().unwrap_or(&"").to_string(),
            last_name: name_tokens.get(1).unwrap_or(&"").to_string(),
            email,
            phone,
        })
    }

    async fn contact_lookup_intent(
        &self,
        text: &str,
    ) -> Result<ContactLookupIntent, CapabilityError> {
        let lower = text.to_ascii_lowercase();
        let triggers = [
            "contact details",
            "contact info",
            "contact of",
            "contact for",
            "details of",
            "details for",
            "phone number of",
            "email of",
            "email address of",
            "who is",
            "find contact",
            "look up",
            "lookup",
        ];
        if !has_any_phrase(&lower, &triggers) {
            return Ok(ContactLookupIntent::default());
        }

        let stops = ["?", ".", ","];
        let query = ["of ", "for ", "who is ", "look up ", "lookup "]
            .iter()
            .find_map(|marker| capture_after(text, &lower, marker, &stops))
            .map(str::to_string);

        match query {
            Some(query) if !query.trim().is_empty() => Ok(ContactLookupIntent {
                intent: LookupKind::LookupContact,
                query: Some(query.trim().to_string()),
            }),
            _ => Ok(ContactLookupIntent::default()),
        }
    }

    async fn classify_confirmation(
        &self,
        text: &str,
    ) -> Result<ConfirmationReply, CapabilityError> {
        let lower = text.trim().to_lowercase();

        if has_any_word(&lower, &["cancel", "no", "n", "stop", "abort"])
            || has_any_phrase(&lower, &["don't", "do not"])
        {
            return Ok(ConfirmationReply::Cancel);
        }
        if has_any_word(&lower, &["wait", "hold", "later", "pause"])
            || has_any_phrase(&lower, &["one sec", "hang on", "not yet"])
        {
            return Ok(ConfirmationReply::Pause);
        }
        if has_any_word(&lower, &["confirm", "yes", "y", "send", "ok", "okay", "sure", "proceed"])
            || has_any_phrase(&lower, &["go ahead", "do it"])
        {
            return Ok(ConfirmationReply::Confirm);
        }
        Ok(ConfirmationReply::Other)
    }

    async fn classify_capture_reply(
        &self,
        _capture: &ContactCapture,
        text: &str,
    ) -> Result<CaptureReply, CapabilityError> {
        let lower = text.trim().to_lowercase();

        if let Some(email) = find_emails(text).into_iter().next() {
            return Ok(CaptureReply::AlternateRecipient(email));
        }
        if has_word(&lower, "instead") {
            let tokens = words(&lower);
            let filler = ["use", "send", "it", "to", "him", "her", "them", "instead", "please"];
            if let Some(candidate) = tokens
                .iter()
                .take_while(|token| *token != "instead")
                .filter(|token| !filler.contains(&token.as_str()))
                .last()
            {
                return Ok(CaptureReply::AlternateRecipient(candidate.clone()));
            }
        }
        if has_any_word(&lower, &["no", "cancel", "skip", "stop"])
            || has_any_phrase(&lower, &["never mind", "nevermind", "don't", "do not"])
        {
            return Ok(CaptureReply::Cancel);
        }
        if has_any_word(&lower, &["yes", "y", "create", "save", "add", "sure", "ok", "okay"])
            || has_any_phrase(&lower, &["go ahead", "please do"])
        {
            return Ok(CaptureReply::Create);
        }
        if has_any_word(&lower, &["wait", "hold", "later"])
            || has_any_phrase(&lower, &["one sec", "hang on", "by the way", "btw"])
        {
            return Ok(CaptureReply::Pause);
        }
        Ok(CaptureReply::Other)
    }

    async fn conversational_route(
        &self,
        text: &str,
    ) -> Result<ConversationalRoute, CapabilityError> {
        let lower = text.trim().to_lowercase();
        if has_any_word(&lower, &TASK_WORDS) {
            return Ok(ConversationalRoute::Task);
        }
        let word_count = words(&lower).len();
        let greeting_like = GREETING_PHRASES
            .iter()
            .any(|phrase| lower == *phrase || lower.starts_with(&format!("{phrase} ")))
            || has_any_phrase(&lower, &["how are you", "thank you"]);
        if greeting_like && word_count <= 6 {
            return Ok(ConversationalRoute::SmallTalk);
        }
        Ok(ConversationalRoute::Task)
    }

    async fn full_action_plan(
        &self,
        context: &[TurnMessage],
    ) -> Result<ActionPlan, CapabilityError> {
        let text = latest_user_text(context);
        let lower = text.to_ascii_lowercase();

        if !has_any_word(&lower, &TASK_WORDS) {
            return Ok(ActionPlan::default());
        }

        let slot = self.email_slot_update(context, &EmailDraft::default()).await?;
        let draft = EmailDraft {
            to: slot.update.to.clone().unwrap_or_default(),
            subject: slot.update.subject.clone(),
            body: slot.update.body.clone(),
        };

        let timestamps = parse_datetimes(text);
        let wants_meeting = has_any_word(&lower, &MEETING_WORDS) && !timestamps.is_empty();
        let wants_email = slot.intent == SlotIntent::SendEmail;

        if wants_email {
            if let Some(email) = draft.clone().into_content() {
                let calendar = if wants_meeting {
                    self.meeting_intent(context, &email).await.ok().and_then(|intent| {
                        let start = intent.start_time?;
                        Some(courier_core::domain::calendar::CalendarEvent {
                            title: intent.title.unwrap_or_else(|| email.subject.clone()),
                            start_time: start,
                            end_time: intent.end_time.unwrap_or(start + Duration::hours(1)),
                            attendees: email.to.clone(),
                            location: None,
                            description: Some(email.body.clone()),
                        })
                    })
                } else {
                    None
                };
                let action = if calendar.is_some() { PlanAction::Both } else { PlanAction::SendEmail };
                return Ok(ActionPlan { action, email: Some(email), calendar, clarification: None });
            }
        }

        Ok(ActionPlan {
            action: PlanAction::AskForClarification,
            email: None,
            calendar: None,
            clarification: Some(
                "I can help with that - please share the recipient, what it is about, and any \
                 time/date if you want a calendar event."
                    .to_string(),
            ),
        })
    }

    async fn response_text(
        &self,
        instruction: &str,
        _context: &[TurnMessage],
    ) -> Result<String, CapabilityError> {
        let lower = instruction.to_lowercase();
        if lower.contains("greet") {
            return Ok(
                "Hello! I can help you draft emails and schedule calendar events. What would \
                 you like to do?"
                    .to_string(),
            );
        }
        if lower.contains("pause") {
            return Ok("No problem - we can pick that back up whenever you like.".to_string());
        }
        Ok("I can help with emails and calendar events.".to_string())
    }
}
