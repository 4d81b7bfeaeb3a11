use serde::{Deserialize, Serialize};

use crate::domain::calendar::CalendarEvent;
use crate::domain::email::EmailContent;

/// Classified user reply while the confirmation gate is armed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfirmationReply {
    Confirm,
    Cancel,
    Pause,
    Other,
}

/// Re-prompt for unclassifiable replies; the gate stays armed.
pub const CONFIRMATION_REPROMPT: &str = "Reply `confirm` or `cancel`.";

/// Acknowledgment after a cancel; nothing was dispatched.
pub const CANCELLED_MESSAGE: &str = "Cancelled. I did not execute any action.";

/// Human-readable summary of everything staged behind the gate.
pub fn confirmation_summary(
    email: Option<&EmailContent>,
    calendar: Option<&CalendarEvent>,
) -> String {
    let mut lines = vec!["Please confirm before I execute:".to_string()];

    if let Some(email) = email {
        lines.push(String::new());
        lines.push(format!("Email To: {}", email.to.join(", ")));
        lines.push(format!("Subject: {}", email.subject));
        lines.push(format!("Body: {}", email.body));
    }
    if let Some(event) = calendar {
        lines.push(String::new());
        lines.push(format!("Event: {}", event.title));
        lines.push(format!("Start: {}", event.start_time.to_rfc3339()));
        lines.push(format!("End: {}", event.end_time.to_rfc3339()));
        if !event.attendees.is_empty() {
            lines.push(format!("Attendees: {}", event.attendees.join(", ")));
        }
        if let Some(location) = &event.location {
            lines.push(format!("Location: {location}"));
        }
    }

    lines.push(String::new());
    lines.push("Reply `confirm` to execute or `cancel`.".to_string());
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::{confirmation_summary, CANCELLED_MESSAGE, CONFIRMATION_REPROMPT};
    use crate::domain::calendar::CalendarEvent;
    use crate::domain::email::EmailContent;

    #[test]
    fn summary_lists_every_resolved_email_field() {
        let email = EmailContent {
            to: vec!["bob@x.com".to_string(), "jane@x.com".to_string()],
            subject: "Report delay".to_string(),
            body: "The report is delayed.".to_string(),
        };
        let summary = confirmation_summary(Some(&email), None);
        assert!(summary.starts_with("Please confirm before I execute:"));
        assert!(summary.contains("Email To: bob@x.com, jane@x.com"));
        assert!(summary.contains("Subject: Report delay"));
        assert!(summary.ends_with("Reply `confirm` to execute or `cancel`."));
    }

    #[test]
    fn summary_includes_calendar_block_for_combined_actions() {
        let email = EmailContent {
            to: vec!["bob@x.com".to_string()],
            subject: "Sync".to_string(),
            body: "See you then.".to_string(),
        };
        let start = Utc.with_ymd_and_hms(2026, 3, 10, 15, 0, 0).single().expect("valid time");
        let event = CalendarEvent {
            title: "Sync".to_string(),
            start_time: start,
            end_time: start + Duration::hours(1),
            attendees: vec!["bob@x.com".to_string()],
            location: Some("Room 4".to_string()),
            description: None,
        };

        let summary = confirmation_summary(Some(&email), Some(&event));
        assert!(summary.contains("Event: Sync"));
        assert!(summary.contains("Start: 2026-03-10T15:00:00+00:00"));
        assert!(summary.contains("Attendees: bob@x.com"));
        assert!(summary.contains("Location: Room 4"));
    }

    #[test]
    fn canned_messages_are_stable() {
        assert_eq!(CONFIRMATION_REPROMPT, "Reply `confirm` or `cancel`.");
        assert_eq!(CANCELLED_MESSAGE, "Cancelled. I did not execute any action.");
    }
}
