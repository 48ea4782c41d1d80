//! Cronofy API client implementation
//!
//! This module provides the main client used to interact with the Cronofy
//! Calendar API. It holds the shared HTTP transport and the immutable
//! per-client configuration (base URL, access token), and exposes the typed
//! endpoint methods along with entry points for the event stream
//! ([`Client::events`]) and batch calls ([`Client::batch`]).
//!
//! # Example – Creating a Client
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use cronofy_rs::Client;
//!
//! # fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::builder()
//!     .timeout(Duration::from_secs(15))
//!     .auth("YOUR_ACCESS_TOKEN")
//!     .build()?;
//! # Ok(()) }
//! ```
//!
//! # Example – Listing Calendars
//!
//! ```rust,no_run
//! use cronofy_rs::Client;
//!
//! # async fn run(client: Client) -> Result<(), Box<dyn std::error::Error>> {
//! for calendar in client.list_calendars().await? {
//!     println!("{}: {}", calendar.calendar_id, calendar.calendar_name);
//! }
//! # Ok(()) }
//! ```

use std::{sync::Arc, time::Duration};

use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client as HttpClient, ClientBuilder as HttpClientBuilder,
};

use crate::{
    account::{
        Account, AccountResponse, AvailabilityRequest, AvailabilityResponse, AvailablePeriod,
        Channel, ChannelResponse, ChannelsResponse, CreateChannelRequest, Profile,
        ProfilesResponse, UserInfo,
    },
    batch::Batch,
    calendars::{
        Calendar, CalendarsResponse, DeleteEventRequest, ParticipationStatus,
        ParticipationStatusRequest, UpsertEventRequest,
    },
    error::Error,
    events::GetEvents,
    rest::ApiRequest,
};

/// Default base URL all relative request paths are resolved against.
const DEFAULT_BASE_URL: &str = "https://api.cronofy.com/v1";
/// Default user agent for the client.
const USER_AGENT: &str = "cronofy-rs/0.1 (Rust)";

/// The primary entry point for interacting with the **Cronofy Calendar API**.
///
/// This `Client` provides a strongly-typed wrapper around Cronofy's REST API.
/// It simplifies making API calls by managing bearer token injection
/// automatically and by hiding the pagination and batch wire protocols behind
/// typed surfaces.
///
/// You can create a new `Client` instance using either [`Client::new`] for a
/// quick setup with an access token, or [`Client::builder`] for more advanced
/// configuration (timeouts, a regional data-center base URL).
///
/// The client is cheap to clone — clones share the underlying HTTP transport,
/// which is safe for concurrent use by independent calls. The client itself
/// holds only immutable configuration and performs no caching or connection
/// management of its own.
///
/// # Example
///
/// ```rust,no_run
/// use cronofy_rs::Client;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = Client::new("YOUR_ACCESS_TOKEN")?;
/// let account = client.account().await?;
/// println!("authenticated as {}", account.email);
/// # Ok(()) }
/// ```
#[derive(Clone, Debug)]
pub struct Client {
    inner: Arc<InnerClient>,
}

#[derive(Debug)]
struct InnerClient {
    http_client: HttpClient,
    base_url: String,
}

impl Client {
    /// Creates a new client with default configuration.
    ///
    /// This is the simplest way to get started — default timeouts and the
    /// production API base URL.
    ///
    /// # Arguments
    /// * `access_token` - The bearer token used to authenticate every call
    ///
    /// # Example
    /// ```rust,no_run
    /// use cronofy_rs::Client;
    ///
    /// let client = Client::new("your_access_token").unwrap();
    /// ```
    pub fn new(access_token: impl Into<String>) -> Result<Self, Error> {
        Self::builder().auth(access_token).build()
    }

    /// Starts building a new client with custom settings.
    ///
    /// Allows setting the request timeout and overriding the base URL, e.g.
    /// for a regional Cronofy data center or a test server.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    #[inline(always)]
    pub(crate) fn http(&self) -> &HttpClient {
        &self.inner.http_client
    }

    #[inline(always)]
    pub(crate) fn base_url(&self) -> &str {
        &self.inner.base_url
    }
}

/// Builds a [`Client`] with custom configuration.
///
/// # Example
/// ```rust,no_run
/// use std::time::Duration;
/// use cronofy_rs::client::ClientBuilder;
///
/// let client = ClientBuilder::new()
///     .timeout(Duration::from_secs(20))
///     .auth("your_token")
///     .build()
///     .unwrap();
/// ```
#[derive(Debug)]
pub struct ClientBuilder {
    http: HttpClientBuilder,
    base_url: String,
    access_token: Option<String>,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self {
            http: HttpClientBuilder::new(),
            base_url: DEFAULT_BASE_URL.to_owned(),
            access_token: None,
        }
    }
}

impl ClientBuilder {
    /// Create a new builder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the request timeout for all API calls.
    ///
    /// If a request takes longer than this, it will error with a timeout.
    pub fn timeout(mut self, duration: Duration) -> Self {
        self.http = self.http.timeout(duration);
        self
    }

    /// Overrides the API base URL.
    ///
    /// Useful for Cronofy's regional data centers (`api-de.cronofy.com`,
    /// `api-au.cronofy.com`, …) and for pointing the client at a mock server
    /// in tests. A trailing slash is tolerated.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets the access token sent as a bearer credential on every call.
    pub fn auth(mut self, access_token: impl Into<String>) -> Self {
        self.access_token = Some(access_token.into());
        self
    }

    /// Finishes building the client.
    ///
    /// # Returns
    /// - `Ok(Client)`: a fully configured [`Client`] instance.
    /// - `Err(Error)`: if no access token was supplied, the token is not a
    ///   valid header value, or the underlying HTTP client fails to build.
    pub fn build(self) -> Result<Client, Error> {
        let access_token = self
            .access_token
            .ok_or_else(|| Error::internal("No access token was provided".into()))?;

        let mut auth: HeaderValue = format!("Bearer {access_token}")
            .parse()
            .map_err(|err| Error::internal(format!("Invalid access token: {err}").into()))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(reqwest::header::USER_AGENT, USER_AGENT.parse().unwrap());
        headers.insert(reqwest::header::AUTHORIZATION, auth);

        let http_client = self.http.default_headers(headers).build()?;
        Ok(Client {
            inner: Arc::new(InnerClient {
                http_client,
                base_url: self.base_url.trim_end_matches('/').to_owned(),
            }),
        })
    }
}

impl Client {
    /// Returns all calendars the account can see.
    pub async fn list_calendars(&self) -> Result<Vec<Calendar>, Error> {
        let response: CalendarsResponse = self.send(ApiRequest::get("calendars")).await?;
        Ok(response.calendars)
    }

    /// Returns all calendar profiles attached to the account.
    pub async fn list_profiles(&self) -> Result<Vec<Profile>, Error> {
        let response: ProfilesResponse = self.send(ApiRequest::get("profiles")).await?;
        Ok(response.profiles)
    }

    /// Returns detail information for the authenticated account.
    pub async fn account(&self) -> Result<Account, Error> {
        let response: AccountResponse = self.send(ApiRequest::get("account")).await?;
        Ok(response.account)
    }

    /// Returns the OpenID Connect userinfo for the authenticated account.
    pub async fn userinfo(&self) -> Result<UserInfo, Error> {
        self.send(ApiRequest::get("userinfo")).await
    }

    /// Queries availability across the request's participant groups and
    /// returns the periods in which a slot could be placed.
    pub async fn availability(
        &self,
        request: &AvailabilityRequest,
    ) -> Result<Vec<AvailablePeriod>, Error> {
        let response: AvailabilityResponse = self
            .send(ApiRequest::post("availability").json(request)?)
            .await?;
        Ok(response.available_periods)
    }

    /// Creates a push-notification channel.
    pub async fn create_channel(&self, request: &CreateChannelRequest) -> Result<Channel, Error> {
        let response: ChannelResponse = self
            .send(ApiRequest::post("channels").json(request)?)
            .await?;
        Ok(response.channel)
    }

    /// Returns all push-notification channels for the account.
    pub async fn list_channels(&self) -> Result<Vec<Channel>, Error> {
        let response: ChannelsResponse = self.send(ApiRequest::get("channels")).await?;
        Ok(response.channels)
    }

    /// Closes a push-notification channel. The API answers with no body.
    pub async fn close_channel(&self, channel_id: &str) -> Result<(), Error> {
        self.send_no_content(ApiRequest::delete(format!("channels/{channel_id}")))
            .await
    }

    /// Creates or updates an event in the given calendar.
    ///
    /// The API keys the upsert on the request's `event_id` and answers 202
    /// with no body.
    pub async fn upsert_event(
        &self,
        calendar_id: &str,
        event: &UpsertEventRequest,
    ) -> Result<(), Error> {
        let request = ApiRequest::post(format!("calendars/{calendar_id}/events")).json(event)?;
        self.send_no_content(request).await
    }

    /// Deletes an event from the given calendar.
    pub async fn delete_event(&self, calendar_id: &str, event_id: &str) -> Result<(), Error> {
        let body = DeleteEventRequest {
            event_id: event_id.to_owned(),
        };
        let request = ApiRequest::delete(format!("calendars/{calendar_id}/events")).json(&body)?;
        self.send_no_content(request).await
    }

    /// Accepts, tentatively accepts, or declines an invitation on behalf of
    /// the account.
    pub async fn change_participation_status(
        &self,
        calendar_id: &str,
        event_id: &str,
        status: ParticipationStatus,
    ) -> Result<(), Error> {
        let body = ParticipationStatusRequest { status };
        let request = ApiRequest::post(format!(
            "calendars/{calendar_id}/events/{event_id}/participation_status"
        ))
        .json(&body)?;
        self.send_no_content(request).await
    }

    /// Starts building a read of the account's events.
    ///
    /// The returned [`GetEvents`] builder collects filters; calling
    /// [`GetEvents::stream`] produces a lazy stream of events that follows
    /// the API's pagination transparently.
    ///
    /// # Example
    /// ```rust,no_run
    /// use futures::TryStreamExt as _;
    ///
    /// # async fn example(client: cronofy_rs::Client) -> Result<(), Box<dyn std::error::Error>> {
    /// let mut events = client.events().tzid("Europe/London").stream();
    /// while let Some(event) = events.try_next().await? {
    ///     println!("{:?}", event.summary);
    /// }
    /// # Ok(()) }
    /// ```
    pub fn events(&self) -> GetEvents {
        GetEvents::new(self)
    }

    /// Starts building a batch call that submits several event operations in
    /// a single request.
    ///
    /// # Example
    /// ```rust,no_run
    /// # async fn example(client: cronofy_rs::Client) -> Result<(), Box<dyn std::error::Error>> {
    /// let response = client
    ///     .batch()
    ///     .delete_event("cal_123", "evt_456")
    ///     .delete_event("cal_123", "evt_789")
    ///     .execute()
    ///     .await?;
    ///
    /// for failure in response.errors() {
    ///     eprintln!("{} {} failed: {}", failure.request().method(),
    ///         failure.request().relative_url(), failure.status());
    /// }
    /// # Ok(()) }
    /// ```
    pub fn batch(&self) -> Batch {
        Batch::new(self)
    }
}
