use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Fully specified calendar-event payload ready for dispatch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub title: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub attendees: Vec<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::CalendarEvent;

    #[test]
    fn round_trips_through_json() {
        let start = Utc::now();
        let event = CalendarEvent {
            title: "Project sync".to_string(),
            start_time: start,
            end_time: start + Duration::hours(1),
            attendees: vec!["jane@x.com".to_string()],
            location: None,
            description: Some("Weekly status".to_string()),
        };

        let raw = serde_json::to_string(&event).expect("serialize");
        let back: CalendarEvent = serde_json::from_str(&raw).expect("deserialize");
        assert_eq!(back, event);
    }
}
