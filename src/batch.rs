//! Submitting multiple event operations as a single batch call.
//!
//! The batch endpoint accepts an envelope of sub-operations and answers with
//! one result per entry, usually under an overall `207 Multi-Status`. The
//! reply's `batch` array is positionally correlated with the request's: the
//! result at index *i* always describes the entry at index *i*, whatever the
//! individual outcomes were.
//!
//! [`Batch`] preserves that correlation by construction — entries live in a
//! `Vec` in submission order, and the decoded results are zipped back onto
//! them — and additionally hands each result a copy of the entry that
//! produced it, so failures can be reported without juggling indices.
//!
//! A sub-operation failing is an expected, frequent outcome and is **not** an
//! error: callers inspect the per-entry statuses. Only a failure of the
//! envelope call itself (network, non-2xx overall status, undecodable reply)
//! fails [`Batch::execute`].
//!
//! # Example
//!
//! ```rust,no_run
//! use cronofy_rs::{Client, EventTime, UpsertEventRequest};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::new("YOUR_ACCESS_TOKEN")?;
//!
//! let event = UpsertEventRequest::new("qTtZdczOccgaPncGJaCiLg")
//!     .summary("Board meeting")
//!     .start(EventTime::zoned("2014-08-05 15:30:00Z", "Etc/UTC"))
//!     .end(EventTime::zoned("2014-08-05 17:00:00Z", "Etc/UTC"));
//!
//! let response = client
//!     .batch()
//!     .upsert_event("cal_n23kjnwrw2_jsdfjksn234", &event)
//!     .delete_event("cal_n23kjnwrw2_jsdfjksn234", "evt_gone")
//!     .execute()
//!     .await?;
//!
//! for result in response.entries() {
//!     if !result.is_success() {
//!         eprintln!(
//!             "{} {} failed with {}",
//!             result.request().method(),
//!             result.request().relative_url(),
//!             result.status(),
//!         );
//!     }
//! }
//! # Ok(())
//! # }
//! ```

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::{
    calendars::{DeleteEventRequest, UpsertEventRequest},
    client::Client,
    error::{Error, ServiceError},
    rest::ApiRequest,
};

/// Entry point for grouping multiple event operations into one batch call.
///
/// Obtained from [`Client::batch`]. Add operations with
/// [`upsert_event`](Self::upsert_event) and
/// [`delete_event`](Self::delete_event), then send with
/// [`execute`](Self::execute). Entries are submitted — and answered — in the
/// order they were added.
#[must_use = "Batch does nothing until executed"]
#[derive(Debug)]
pub struct Batch {
    client: Client,
    entries: Vec<BatchEntry>,
    cancel: CancellationToken,
    /// First entry that failed to serialize, reported by `execute`.
    invalid: Option<serde_json::Error>,
}

impl Batch {
    pub(crate) fn new(client: &Client) -> Self {
        Self {
            client: client.clone(),
            entries: Vec::new(),
            cancel: CancellationToken::new(),
            invalid: None,
        }
    }

    /// Adds an event upsert to the batch.
    pub fn upsert_event(self, calendar_id: &str, event: &UpsertEventRequest) -> Self {
        self.push("POST", format!("/v1/calendars/{calendar_id}/events"), event)
    }

    /// Adds an event delete to the batch.
    pub fn delete_event(self, calendar_id: &str, event_id: &str) -> Self {
        let body = DeleteEventRequest {
            event_id: event_id.to_owned(),
        };
        self.push(
            "DELETE",
            format!("/v1/calendars/{calendar_id}/events"),
            &body,
        )
    }

    /// Threads a cancellation token through the envelope call.
    pub fn cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Number of entries added so far.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn push<T: Serialize>(mut self, method: &'static str, relative_url: String, data: &T) -> Self {
        match serde_json::to_value(data) {
            Ok(data) => self.entries.push(BatchEntry {
                method,
                relative_url,
                data,
            }),
            Err(err) => {
                self.invalid.get_or_insert(err);
            }
        }
        self
    }

    /// Sends the batch and returns the correlated per-entry results.
    ///
    /// The overall call succeeds as long as the envelope itself was accepted
    /// (typically with `207 Multi-Status`); per-entry failures are data on
    /// the returned [`BatchResponse`]. A reply whose entry count differs
    /// from the number of submitted entries is rejected, since positional
    /// correlation would be meaningless.
    pub async fn execute(self) -> Result<BatchResponse, Error> {
        if let Some(err) = self.invalid {
            return Err(Error::internal(err.into()));
        }

        let envelope = BatchEnvelope {
            batch: &self.entries,
        };
        let request = ApiRequest::post("batch")
            .json(&envelope)?
            .cancel(self.cancel.clone());

        let raw = self.client.dispatch(request).await?;
        let (endpoint, status) = (raw.endpoint().to_owned(), raw.status());
        let reply: BatchReply = raw.decode()?;

        if reply.batch.len() != self.entries.len() {
            let detail = format!(
                "batch reply carried {} results for {} entries",
                reply.batch.len(),
                self.entries.len(),
            );
            return Err(ServiceError::payload(detail.into())
                .service(endpoint, status)
                .into());
        }

        let entries = self
            .entries
            .into_iter()
            .zip(reply.batch)
            .map(|(request, result)| BatchEntryResult {
                status: StatusCode::from_u16(result.status)
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                data: result.data,
                request,
            })
            .collect();

        Ok(BatchResponse { entries })
    }
}

/// One sub-operation inside a batch envelope.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct BatchEntry {
    method: &'static str,
    relative_url: String,
    data: Value,
}

impl BatchEntry {
    /// The HTTP verb of the sub-operation, as an uppercase token.
    pub fn method(&self) -> &str {
        self.method
    }

    /// The URL of the sub-operation, relative to the API host.
    pub fn relative_url(&self) -> &str {
        &self.relative_url
    }

    /// The sub-operation's payload, as submitted.
    pub fn data(&self) -> &Value {
        &self.data
    }
}

#[derive(Serialize, Debug)]
struct BatchEnvelope<'a> {
    batch: &'a [BatchEntry],
}

#[derive(Deserialize, Debug)]
struct BatchReply {
    batch: Vec<RawEntryResult>,
}

#[derive(Deserialize, Debug)]
struct RawEntryResult {
    status: u16,
    #[serde(default)]
    data: Option<Value>,
}

/// The correlated results of a batch call, one per submitted entry, in
/// submission order.
#[derive(Debug)]
pub struct BatchResponse {
    entries: Vec<BatchEntryResult>,
}

impl BatchResponse {
    /// All results, positionally matching the submitted entries.
    pub fn entries(&self) -> &[BatchEntryResult] {
        &self.entries
    }

    /// Consumes the response, yielding the results.
    pub fn into_entries(self) -> Vec<BatchEntryResult> {
        self.entries
    }

    /// Whether any entry came back with a non-2xx status.
    pub fn has_errors(&self) -> bool {
        self.entries.iter().any(|entry| !entry.is_success())
    }

    /// The entries that came back with a non-2xx status.
    pub fn errors(&self) -> impl Iterator<Item = &BatchEntryResult> {
        self.entries.iter().filter(|entry| !entry.is_success())
    }
}

/// The outcome of one batch entry, paired with the entry that produced it.
#[derive(Debug)]
pub struct BatchEntryResult {
    status: StatusCode,
    data: Option<Value>,
    request: BatchEntry,
}

impl BatchEntryResult {
    /// The entry's own status code.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Whether this entry succeeded.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// The entry's response body, when the API supplied one (error entries
    /// usually carry their diagnostics here).
    pub fn data(&self) -> Option<&Value> {
        self.data.as_ref()
    }

    /// The request entry that produced this result.
    pub fn request(&self) -> &BatchEntry {
        &self.request
    }
}
