//! Reading events as a lazily-paginated, cancellable stream.
//!
//! The read-events endpoint slices its result set into pages, each carrying
//! an absolute URL for the next slice. [`GetEvents`] hides that protocol:
//! it collects the filter query, and [`GetEvents::stream`] yields decoded
//! events one at a time, fetching further pages only as the consumer pulls
//! past a page boundary.

use futures::Stream;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::{
    client::Client,
    error::Error,
    rest::{paginate, ApiRequest, PagedResponse, QueryParams},
};

/// A calendar event as returned by the read-events endpoint.
///
/// Temporal fields are kept as the raw strings the API sent; the API returns
/// several timezone renderings of the same instant and interpreting them is
/// left to the caller.
#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct Event {
    pub calendar_id: String,

    /// Stable identifier for events read from the provider.
    #[serde(default)]
    pub event_uid: Option<String>,

    /// Identifier for events this application created via upsert.
    #[serde(default)]
    pub event_id: Option<String>,

    #[serde(default)]
    pub summary: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub start: Option<EventTime>,

    #[serde(default)]
    pub end: Option<EventTime>,

    #[serde(default)]
    pub deleted: bool,

    #[serde(default)]
    pub created: Option<String>,

    #[serde(default)]
    pub updated: Option<String>,

    #[serde(default)]
    pub location: Option<Location>,

    /// Raw participation status (`needs_action`, `accepted`, …).
    #[serde(default)]
    pub participation_status: Option<String>,

    #[serde(default)]
    pub attendees: Vec<Attendee>,

    #[serde(default)]
    pub recurring: bool,

    #[serde(default)]
    pub categories: Vec<String>,

    #[serde(default)]
    pub options: Option<EventOptions>,
}

/// An event start or end, in the representation the API uses.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(untagged)]
pub enum EventTime {
    /// A bare date or timestamp string, e.g. `2020-07-06` for an all-day
    /// event.
    Plain(String),
    /// A timestamp qualified with the timezone it should be rendered in.
    Zoned { time: String, tzid: String },
}

impl EventTime {
    pub fn plain(time: impl Into<String>) -> Self {
        Self::Plain(time.into())
    }

    pub fn zoned(time: impl Into<String>, tzid: impl Into<String>) -> Self {
        Self::Zoned {
            time: time.into(),
            tzid: tzid.into(),
        }
    }

    /// The raw time string, whichever representation carries it.
    pub fn time(&self) -> &str {
        match self {
            Self::Plain(time) => time,
            Self::Zoned { time, .. } => time,
        }
    }
}

/// Where an event takes place.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct Location {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub lat: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub long: Option<String>,
}

/// Someone invited to an event.
#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Attendee {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// What the account is allowed to do to an event.
#[derive(Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EventOptions {
    #[serde(default)]
    pub delete: bool,
    #[serde(default)]
    pub update: bool,
    #[serde(default)]
    pub change_participation_status: bool,
}

/// One page of the read-events collection.
#[derive(Deserialize, Debug)]
pub(crate) struct ReadEventsResponse {
    #[serde(default)]
    events: Vec<Event>,
    #[serde(default)]
    pages: Option<Pages>,
}

#[derive(Deserialize, Debug)]
struct Pages {
    #[serde(default)]
    next_page: Option<String>,
}

impl PagedResponse for ReadEventsResponse {
    type Item = Event;

    fn into_parts(self) -> (Vec<Event>, Option<String>) {
        let next = self
            .pages
            .and_then(|pages| pages.next_page)
            .filter(|url| !url.trim().is_empty());
        (self.events, next)
    }
}

/// A builder for reading the account's events.
///
/// Returned by [`Client::events`]. Filters accumulate on the builder;
/// [`stream`](Self::stream) consumes it and starts the read. The stream is
/// forward-only and not restartable — build a fresh `GetEvents` to iterate
/// again.
#[must_use = "GetEvents does nothing until you call `.stream()` and poll it"]
#[derive(Debug)]
pub struct GetEvents {
    client: Client,
    tzid: String,
    last_modified: Option<String>,
    include_deleted: bool,
    include_moved: bool,
    include_managed: bool,
    only_managed: bool,
    include_geo: bool,
    google_event_ids: bool,
    from: Option<String>,
    to: Option<String>,
    calendar_ids: Vec<String>,
    cancel: CancellationToken,
}

impl GetEvents {
    pub(crate) fn new(client: &Client) -> Self {
        Self {
            client: client.clone(),
            tzid: "Etc/UTC".to_owned(),
            last_modified: None,
            include_deleted: false,
            include_moved: false,
            include_managed: false,
            only_managed: false,
            include_geo: false,
            google_event_ids: false,
            from: None,
            to: None,
            calendar_ids: Vec::new(),
            cancel: CancellationToken::new(),
        }
    }

    /// The timezone id event times are rendered in. Defaults to `Etc/UTC`.
    pub fn tzid(mut self, tzid: impl Into<String>) -> Self {
        self.tzid = tzid.into();
        self
    }

    /// Only return events modified at or after this timestamp.
    pub fn last_modified(mut self, last_modified: impl Into<String>) -> Self {
        self.last_modified = Some(last_modified.into());
        self
    }

    /// Include events that have been deleted.
    pub fn include_deleted(mut self, include: bool) -> Self {
        self.include_deleted = include;
        self
    }

    /// Include events that have moved out of the requested window.
    pub fn include_moved(mut self, include: bool) -> Self {
        self.include_moved = include;
        self
    }

    /// Include events this application manages.
    pub fn include_managed(mut self, include: bool) -> Self {
        self.include_managed = include;
        self
    }

    /// Only return events this application manages.
    pub fn only_managed(mut self, only: bool) -> Self {
        self.only_managed = only;
        self
    }

    /// Include geo-location information where the provider supplies it.
    pub fn include_geo(mut self, include: bool) -> Self {
        self.include_geo = include;
        self
    }

    /// Include Google's own event ids alongside Cronofy's.
    pub fn google_event_ids(mut self, include: bool) -> Self {
        self.google_event_ids = include;
        self
    }

    /// Lower bound of the requested window.
    pub fn from(mut self, from: impl Into<String>) -> Self {
        self.from = Some(from.into());
        self
    }

    /// Upper bound of the requested window.
    pub fn to(mut self, to: impl Into<String>) -> Self {
        self.to = Some(to.into());
        self
    }

    /// Restrict the read to one calendar. May be called repeatedly; each id
    /// becomes one `calendar_ids[]` query parameter.
    pub fn calendar_id(mut self, calendar_id: impl Into<String>) -> Self {
        self.calendar_ids.push(calendar_id.into());
        self
    }

    /// Restrict the read to a set of calendars.
    pub fn calendar_ids<I>(mut self, calendar_ids: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.calendar_ids
            .extend(calendar_ids.into_iter().map(Into::into));
        self
    }

    /// Threads a cancellation token through the whole read: the initial
    /// fetch, every page fetch, and item production. Once the token fires,
    /// the stream stops yielding and issues no further requests.
    pub fn cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    fn query(&self) -> QueryParams {
        let mut query = QueryParams::new();
        query.push("tzid", self.tzid.as_str());
        query.push("localized_times", "true");
        if let Some(last_modified) = &self.last_modified {
            query.push("last_modified", last_modified.as_str());
        }
        query.push("include_deleted", bool_str(self.include_deleted));
        query.push("include_moved", bool_str(self.include_moved));
        query.push("include_managed", bool_str(self.include_managed));
        query.push("only_managed", bool_str(self.only_managed));
        query.push("include_geo", bool_str(self.include_geo));
        query.push("google_event_ids", bool_str(self.google_event_ids));
        if let Some(from) = &self.from {
            query.push("from", from.as_str());
        }
        if let Some(to) = &self.to {
            query.push("to", to.as_str());
        }
        query.extend_array("calendar_ids", self.calendar_ids.iter().cloned());
        query
    }

    /// Consumes the builder and returns the event stream.
    ///
    /// Events arrive in the order the server returns them — page order, and
    /// in-page order within a page; the stream does not re-sort. A failed
    /// page fetch ends the stream with that error; events yielded before the
    /// failure remain valid.
    pub fn stream(self) -> impl Stream<Item = Result<Event, Error>> + Send {
        let query = self.query();
        let request = ApiRequest::get("events").query(query).cancel(self.cancel);
        paginate::<ReadEventsResponse>(self.client, request)
    }
}

fn bool_str(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}
