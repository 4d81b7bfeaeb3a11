use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

use courier_core::domain::calendar::CalendarEvent;
use courier_core::domain::email::EmailContent;
use courier_core::domain::ServiceProvider;

/// Opaque dispatch failure, surfaced to the user as plain language and
/// never retried by this core.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct DispatchError(pub String);

/// Side-effecting integration boundary. Real providers (Gmail, Outlook)
/// live in the host; this core only needs the narrow contract.
#[async_trait]
pub trait ActionDispatcher: Send + Sync {
    async fn send_email(
        &self,
        provider: ServiceProvider,
        email: &EmailContent,
    ) -> Result<String, DispatchError>;

    async fn create_calendar_event(
        &self,
        provider: ServiceProvider,
        event: &CalendarEvent,
    ) -> Result<String, DispatchError>;
}

fn calendar_product_name(provider: ServiceProvider) -> &'static str {
    match provider {
        ServiceProvider::Gmail => "Google Calendar",
        ServiceProvider::Outlook => "Outlook",
    }
}

/// Dispatcher that performs no side effect, logs the would-be action, and
/// answers with the standard confirmation phrasing. Default wiring for
/// local runs without provider credentials.
#[derive(Clone, Debug, Default)]
pub struct NoopDispatcher;

#[async_trait]
impl ActionDispatcher for NoopDispatcher {
    async fn send_email(
        &self,
        provider: ServiceProvider,
        email: &EmailContent,
    ) -> Result<String, DispatchError> {
        info!(
            event_name = "dispatch.email.noop",
            provider = provider.display_name(),
            recipients = email.to.join(", "),
            subject = %email.subject,
            "email dispatch skipped (noop dispatcher)"
        );
        Ok(format!("Email to {} sent via {}.", email.to.join(", "), provider.display_name()))
    }

    async fn create_calendar_event(
        &self,
        provider: ServiceProvider,
        event: &CalendarEvent,
    ) -> Result<String, DispatchError> {
        info!(
            event_name = "dispatch.calendar.noop",
            provider = provider.display_name(),
            title = %event.title,
            start = %event.start_time.to_rfc3339(),
            "calendar dispatch skipped (noop dispatcher)"
        );
        Ok(format!(
            "Calendar event '{}' created in {}.",
            event.title,
            calendar_product_name(provider)
        ))
    }
}

/// Records every dispatch for assertions and can be told to fail, so tests
/// can observe the confirmation-atomicity property.
#[derive(Clone, Debug, Default)]
pub struct RecordingDispatcher {
    sent_emails: Arc<Mutex<Vec<EmailContent>>>,
    created_events: Arc<Mutex<Vec<CalendarEvent>>>,
    fail_emails: bool,
    fail_events: bool,
}

impl RecordingDispatcher {
    pub fn failing_emails(mut self) -> Self {
        self.fail_emails = true;
        self
    }

    pub fn failing_events(mut self) -> Self {
        self.fail_events = true;
        self
    }

    pub fn sent_emails(&self) -> Vec<EmailContent> {
        match self.sent_emails.lock() {
            Ok(sent) => sent.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn created_events(&self) -> Vec<CalendarEvent> {
        match self.created_events.lock() {
            Ok(created) => created.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn dispatch_count(&self) -> usize {
        self.sent_emails().len() + self.created_events().len()
    }
}

#[async_trait]
impl ActionDispatcher for RecordingDispatcher {
    async fn send_email(
        &self,
        provider: ServiceProvider,
        email: &EmailContent,
    ) -> Result<String, DispatchError> {
        if self.fail_emails {
            return Err(DispatchError("email provider rejected the message".to_string()));
        }
        match self.sent_emails.lock() {
            Ok(mut sent) => sent.push(email.clone()),
            Err(poisoned) => poisoned.into_inner().push(email.clone()),
        }
        Ok(format!("Email to {} sent via {}.", email.to.join(", "), provider.display_name()))
    }

    async fn create_calendar_event(
        &self,
        provider: ServiceProvider,
        event: &CalendarEvent,
    ) -> Result<String, DispatchError> {
        if self.fail_events {
            return Err(DispatchError("calendar provider rejected the event".to_string()));
        }
        match self.created_events.lock() {
            Ok(mut created) => created.push(event.clone()),
            Err(poisoned) => poisoned.into_inner().push(event.clone()),
        }
        Ok(format!(
            "Calendar event '{}' created in {}.",
            event.title,
            calendar_product_name(provider)
        ))
    }
}

#[cfg(test)]
mod tests {
    use courier_core::domain::email::EmailContent;
    use courier_core::domain::ServiceProvider;

    use super::{ActionDispatcher, NoopDispatcher, RecordingDispatcher};

    fn email() -> EmailContent {
        EmailContent {
            to: vec!["bob@x.com".to_string()],
            subject: "Report".to_string(),
            body: "Delayed.".to_string(),
        }
    }

    #[tokio::test]
    async fn noop_dispatcher_reports_provider_phrasing() {
        let message = NoopDispatcher
            .send_email(ServiceProvider::Gmail, &email())
            .await
            .expect("noop send");
        assert_eq!(message, "Email to bob@x.com sent via Gmail.");
    }

    #[tokio::test]
    async fn recording_dispatcher_captures_and_fails_on_demand() {
        let recorder = RecordingDispatcher::default();
        recorder.send_email(ServiceProvider::Outlook, &email()).await.expect("send");
        assert_eq!(recorder.sent_emails().len(), 1);

        let failing = RecordingDispatcher::default().failing_emails();
        let error = failing
            .send_email(ServiceProvider::Gmail, &email())
            .await
            .expect_err("forced failure");
        assert!(error.0.contains("rejected"));
        assert_eq!(failing.dispatch_count(), 0);
    }
}
