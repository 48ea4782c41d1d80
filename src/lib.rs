#![deny(clippy::future_not_send)]
#![deny(clippy::large_enum_variant)]

//! # cronofy_rs
//!
//! A Rust SDK for the Cronofy Calendar API. This crate provides typed,
//! async access to calendars, events, push-notification channels, and
//! availability queries, and hides the API's two wire protocols with real
//! state behind safe surfaces: cursor-following pagination and
//! multi-operation batch calls.
//!
//! ## ✨ Features
//!
//! - **Typed endpoints**: calendars, profiles, account, userinfo, channels,
//!   availability, and event writes as plain async methods.
//! - **Event streaming**: read events as a lazy [`Stream`] that follows the
//!   server's pagination transparently, with cooperative cancellation at
//!   item and page boundaries.
//! - **Batch calls**: submit several event upserts/deletes in one HTTP call
//!   and get back per-entry results, each paired with the request entry that
//!   produced it — partial failure is data, not an error.
//! - **Faithful errors**: non-2xx responses surface their raw diagnostic
//!   body verbatim, and undecodable responses are reported distinctly.
//!
//! [`Stream`]: futures::Stream
//!
//! ## 🚀 Examples
//!
//! ### Create a Client
//! ```rust,no_run
//! use std::time::Duration;
//! use cronofy_rs::Client;
//!
//! # fn create_client_example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::builder()
//!     .timeout(Duration::from_secs(15))
//!     .auth("YOUR_ACCESS_TOKEN")
//!     .build()?;
//! # Ok(()) }
//! ```
//!
//! ### Stream Events
//! ```rust,no_run
//! use cronofy_rs::Client;
//! use futures::TryStreamExt as _;
//!
//! # async fn stream_events_example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::new("YOUR_ACCESS_TOKEN")?;
//!
//! let mut events = client
//!     .events()
//!     .tzid("Europe/London")
//!     .from("2024-01-01")
//!     .to("2024-02-01")
//!     .calendar_id("cal_n23kjnwrw2_jsdfjksn234")
//!     .stream();
//!
//! while let Some(event) = events.try_next().await? {
//!     println!("{:?} at {:?}", event.summary, event.start);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ### Batch Event Operations
//! ```rust,no_run
//! use cronofy_rs::{Client, EventTime, UpsertEventRequest};
//!
//! # async fn batch_example() -> Result<(), Box<dyn std::error::Error>> {
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
//!     .delete_event("cal_n23kjnwrw2_jsdfjksn234", "evt_old")
//!     .execute()
//!     .await?;
//!
//! // A 207 reply with failed entries is still a successful batch call;
//! // inspect the per-entry statuses.
//! for failure in response.errors() {
//!     eprintln!(
//!         "{} {} -> {}",
//!         failure.request().method(),
//!         failure.request().relative_url(),
//!         failure.status(),
//!     );
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ### Cancel a Long Read
//! ```rust,no_run
//! use cronofy_rs::Client;
//! use futures::TryStreamExt as _;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn cancel_example(client: Client) -> Result<(), Box<dyn std::error::Error>> {
//! let cancel = CancellationToken::new();
//! let mut events = client.events().cancel(cancel.clone()).stream();
//!
//! while let Some(event) = events.try_next().await? {
//!     if event.summary.as_deref() == Some("the one we wanted") {
//!         // No further pages will be fetched.
//!         cancel.cancel();
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod account;
pub mod batch;
pub mod calendars;
pub mod client;
pub mod error;
pub mod events;
pub(crate) mod rest;

pub use account::{
    Account, AvailabilityPeriod, AvailabilityRequest, AvailablePeriod, Channel, ChannelFilters,
    CreateChannelRequest, Member, ParticipantGroup, Profile, RequiredDuration, UserInfo,
};
pub use batch::{Batch, BatchEntry, BatchEntryResult, BatchResponse};
pub use calendars::{Calendar, ParticipationStatus, Reminder, UpsertEventRequest};
pub use client::{Client, ClientBuilder};
pub use error::Error;
pub use events::{Attendee, Event, EventOptions, EventTime, GetEvents, Location};
