//! Calendars and calendar-scoped event writes.
//!
//! The types here back the `calendars`, `calendars/{id}/events`, and
//! participation-status endpoints. Request types omit unset optional fields
//! from their JSON — the API treats an explicit `null` as "clear this field".

use serde::{Deserialize, Serialize};

use crate::events::{EventTime, Location};

/// A calendar visible to the account.
#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Calendar {
    pub provider_name: String,
    pub profile_id: String,
    pub profile_name: String,
    pub calendar_id: String,
    pub calendar_name: String,
    #[serde(default)]
    pub calendar_readonly: bool,
    #[serde(default)]
    pub calendar_deleted: bool,
    #[serde(default)]
    pub calendar_primary: bool,
}

#[derive(Deserialize, Debug)]
pub(crate) struct CalendarsResponse {
    pub(crate) calendars: Vec<Calendar>,
}

/// The body of an event upsert.
///
/// The API keys the write on `event_id`: an unknown id creates the event, a
/// known one updates it in place.
///
/// # Example
/// ```rust
/// use cronofy_rs::{EventTime, UpsertEventRequest};
///
/// let event = UpsertEventRequest::new("qTtZdczOccgaPncGJaCiLg")
///     .summary("Board meeting")
///     .description("Discuss plans for the next quarter.")
///     .start(EventTime::zoned("2014-08-05 15:30:00Z", "Etc/UTC"))
///     .end(EventTime::zoned("2014-08-05 17:00:00Z", "Etc/UTC"))
///     .location("Board room");
/// ```
#[derive(Serialize, Clone, Debug, Default, PartialEq)]
pub struct UpsertEventRequest {
    pub event_id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<EventTime>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<EventTime>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tzid: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reminders: Option<Vec<Reminder>>,
}

impl UpsertEventRequest {
    pub fn new(event_id: impl Into<String>) -> Self {
        Self {
            event_id: event_id.into(),
            ..Self::default()
        }
    }

    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn start(mut self, start: EventTime) -> Self {
        self.start = Some(start);
        self
    }

    pub fn end(mut self, end: EventTime) -> Self {
        self.end = Some(end);
        self
    }

    /// Sets a free-text location description.
    pub fn location(mut self, description: impl Into<String>) -> Self {
        self.location = Some(Location {
            description: Some(description.into()),
            ..Location::default()
        });
        self
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn tzid(mut self, tzid: impl Into<String>) -> Self {
        self.tzid = Some(tzid.into());
        self
    }

    pub fn reminder(mut self, minutes: u32) -> Self {
        self.reminders
            .get_or_insert_with(Vec::new)
            .push(Reminder { minutes });
        self
    }
}

/// A pre-event reminder offset.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Reminder {
    pub minutes: u32,
}

/// The body of an event delete; the event is addressed by id within the
/// calendar named in the URL.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub(crate) struct DeleteEventRequest {
    pub(crate) event_id: String,
}

/// An account's answer to an event invitation.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ParticipationStatus {
    Accepted,
    Tentative,
    Declined,
}

#[derive(Serialize, Clone, Copy, Debug)]
pub(crate) struct ParticipationStatusRequest {
    pub(crate) status: ParticipationStatus,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn upsert_request_omits_unset_fields() {
        let event = UpsertEventRequest::new("evt_1").summary("Standup");

        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(
            value,
            json!({
                "event_id": "evt_1",
                "summary": "Standup"
            })
        );
    }

    #[test]
    fn upsert_request_full_shape() {
        let event = UpsertEventRequest::new("qTtZdczOccgaPncGJaCiLg")
            .summary("Board meeting")
            .description("Discuss plans for the next quarter.")
            .start(EventTime::zoned("2014-08-05 15:30:00Z", "Etc/UTC"))
            .end(EventTime::zoned("2014-08-05 17:00:00Z", "Etc/UTC"))
            .location("Board room");

        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(
            value,
            json!({
                "event_id": "qTtZdczOccgaPncGJaCiLg",
                "summary": "Board meeting",
                "description": "Discuss plans for the next quarter.",
                "start": { "time": "2014-08-05 15:30:00Z", "tzid": "Etc/UTC" },
                "end": { "time": "2014-08-05 17:00:00Z", "tzid": "Etc/UTC" },
                "location": { "description": "Board room" }
            })
        );
    }

    #[test]
    fn participation_status_wire_names() {
        assert_eq!(
            serde_json::to_value(ParticipationStatusRequest {
                status: ParticipationStatus::Tentative
            })
            .unwrap(),
            json!({ "status": "tentative" })
        );
    }

    #[test]
    fn calendar_defaults_missing_flags() {
        let calendar: Calendar = serde_json::from_value(json!({
            "provider_name": "google",
            "profile_id": "pro_n23kjnwrw2",
            "profile_name": "example@cronofy.com",
            "calendar_id": "cal_n23kjnwrw2_jsdfjksn234",
            "calendar_name": "Home"
        }))
        .unwrap();

        assert!(!calendar.calendar_readonly);
        assert!(!calendar.calendar_deleted);
    }
}
