//! This module provides the core request plumbing for interacting with the API.
//! It defines a generic framework for building, sending, and decoding API calls,
//! including support for paginated endpoints.
//!
//! Every call in the crate — the typed endpoint wrappers, the event stream,
//! and the batch coordinator — goes through [`Client::dispatch`].

use std::borrow::Cow;

use async_stream::try_stream;
use futures::Stream;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::{header::CONTENT_TYPE, Method, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use tokio_util::sync::CancellationToken;

use crate::{
    client::Client,
    error::{Error, ServiceError},
};

/// Characters escaped in query-string keys and values: everything outside
/// the RFC 3986 unreserved set.
const QUERY_ESCAPE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Marker that designates a repeated (array-style) query parameter.
///
/// Keys carrying this marker may be suffixed with a disambiguating index
/// (`calendar_ids[]0`, `calendar_ids[]1`, …) to keep them unique inside a
/// parameter set; on the wire they all serialize to the same `calendar_ids[]`
/// key, with the marker left unescaped.
const ARRAY_MARKER: &str = "[]";

// --- Query Parameters ---

/// An ordered set of query parameters.
///
/// Backed by a `Vec` so parameters hit the wire in insertion order.
#[derive(Clone, Debug, Default)]
pub(crate) struct QueryParams {
    params: Vec<(String, String)>,
}

impl QueryParams {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Appends a single `key=value` parameter.
    pub(crate) fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.params.push((key.into(), value.into()));
    }

    /// Appends one array-style parameter per value.
    ///
    /// Each stored key gets the `[]` marker plus an index suffix so keys stay
    /// unique; [`encode`](Self::encode) strips the suffix again, producing
    /// repeated `key[]=value` pairs on the wire.
    pub(crate) fn extend_array<I>(&mut self, key: &str, values: I)
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        for (i, value) in values.into_iter().enumerate() {
            self.params.push((format!("{key}{ARRAY_MARKER}{i}"), value.into()));
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Encodes the set as a query string, without the leading `?`.
    ///
    /// Keys and values are percent-encoded independently. For keys carrying
    /// the `[]` marker, only the portion before the marker is escaped: the
    /// marker itself stays literal and trailing, and whatever follows it
    /// (the disambiguating index) never reaches the wire.
    pub(crate) fn encode(&self) -> String {
        let mut out = String::new();
        for (key, value) in &self.params {
            if !out.is_empty() {
                out.push('&');
            }
            out.push_str(&encode_key(key));
            out.push('=');
            out.extend(utf8_percent_encode(value, QUERY_ESCAPE));
        }
        out
    }
}

fn encode_key(key: &str) -> Cow<'_, str> {
    match key.find(ARRAY_MARKER) {
        Some(at) => {
            let mut encoded = String::new();
            encoded.extend(utf8_percent_encode(&key[..at], QUERY_ESCAPE));
            encoded.push_str(ARRAY_MARKER);
            Cow::Owned(encoded)
        }
        None => utf8_percent_encode(key, QUERY_ESCAPE).into(),
    }
}

// --- Request Building ---

/// A logical API request, immutable once built.
///
/// `path` is either a path relative to the client's base URL or a complete
/// absolute URL (pagination cursors come back as the latter).
#[derive(Debug)]
pub(crate) struct ApiRequest {
    method: Method,
    path: String,
    payload: Payload,
    cancel: CancellationToken,
}

/// What a request carries besides its URL.
///
/// A body and a query-parameter set are distinct inputs by construction:
/// parameters are always appended to the URL and a body is always JSON, so
/// nothing has to inspect the payload's shape at dispatch time.
#[derive(Debug)]
pub(crate) enum Payload {
    None,
    /// A JSON body, serialized up-front so a serialization failure surfaces
    /// before any I/O happens.
    Json(String),
    Query(QueryParams),
}

impl ApiRequest {
    pub(crate) fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            payload: Payload::None,
            cancel: CancellationToken::new(),
        }
    }

    pub(crate) fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub(crate) fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub(crate) fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Attaches a JSON body. Optional fields the caller left unset are
    /// omitted rather than serialized as `null` — the API reads an explicit
    /// `null` as "clear this field".
    pub(crate) fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, Error> {
        let body = serde_json::to_string(body).map_err(|err| Error::internal(err.into()))?;
        self.payload = Payload::Json(body);
        Ok(self)
    }

    /// Attaches query parameters, to be appended to the URL.
    pub(crate) fn query(mut self, params: QueryParams) -> Self {
        self.payload = Payload::Query(params);
        self
    }

    /// Threads a cancellation token through the call.
    pub(crate) fn cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub(crate) fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Resolves the request's full URL against `base_url`.
    ///
    /// A path that already names a scheme is used verbatim; anything else is
    /// joined onto the base. Query parameters, if present, are appended.
    pub(crate) fn url(&self, base_url: &str) -> String {
        let mut url = if has_scheme(&self.path) {
            self.path.clone()
        } else {
            format!("{}/{}", base_url.trim_end_matches('/'), self.path)
        };

        if let Payload::Query(params) = &self.payload {
            if !params.is_empty() {
                url.push('?');
                url.push_str(&params.encode());
            }
        }

        url
    }
}

fn has_scheme(path: &str) -> bool {
    const SCHEMES: [&str; 2] = ["https://", "http://"];
    SCHEMES.iter().any(|scheme| {
        path.len() >= scheme.len()
            && path.as_bytes()[..scheme.len()].eq_ignore_ascii_case(scheme.as_bytes())
    })
}

// --- Dispatch ---

/// A successful response, held as raw text until the caller decides how to
/// decode it.
pub(crate) struct RawResponse {
    endpoint: String,
    status: StatusCode,
    body: String,
}

impl RawResponse {
    pub(crate) fn status(&self) -> StatusCode {
        self.status
    }

    pub(crate) fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Decodes the body as JSON into `T`.
    ///
    /// `serde_json` performs no implicit date/time parsing, so temporal
    /// fields reach the domain types as the raw strings the API sent —
    /// Cronofy mixes timezone representations that a generic parser would
    /// mangle.
    pub(crate) fn decode<T: DeserializeOwned>(self) -> Result<T, Error> {
        serde_json::from_str(&self.body).map_err(|err| {
            ServiceError::parse(err.into(), self.body)
                .service(self.endpoint, self.status)
                .into()
        })
    }
}

impl Client {
    /// Sends a request and decodes the successful response body into `T`.
    pub(crate) async fn send<T: DeserializeOwned + Send>(
        &self,
        request: ApiRequest,
    ) -> Result<T, Error> {
        self.dispatch(request).await?.decode()
    }

    /// Sends a request whose successful response carries no body worth
    /// decoding (deletes and 202-style accepts). No decode is attempted.
    pub(crate) async fn send_no_content(&self, request: ApiRequest) -> Result<(), Error> {
        self.dispatch(request).await.map(drop)
    }

    /// The single choke point all API calls go through.
    ///
    /// Executes the call on the shared transport, reads the full body as
    /// text, and classifies the outcome: any non-2xx status is an API error
    /// carrying the body verbatim. The cancellation token is observed before
    /// the send, during the send, and during the body read; a decode that
    /// has already started is allowed to finish.
    pub(crate) async fn dispatch(&self, request: ApiRequest) -> Result<RawResponse, Error> {
        let cancel = request.cancel_token();
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let url = request.url(self.base_url());
        let mut builder = self.http().request(request.method, &url);
        if let Payload::Json(body) = request.payload {
            builder = builder
                .header(CONTENT_TYPE, "application/json; charset=utf-8")
                .body(body);
        }

        let response = tokio::select! {
            () = cancel.cancelled() => return Err(Error::Cancelled),
            response = builder.send() => response?,
        };

        let status = response.status();
        let body = tokio::select! {
            () = cancel.cancelled() => return Err(Error::Cancelled),
            body = response.text() => body?,
        };

        if !status.is_success() {
            return Err(ServiceError::api(body).service(url, status).into());
        }

        Ok(RawResponse {
            endpoint: url,
            status,
            body,
        })
    }
}

// --- Pagination ---

/// A single page of a server-sliced collection.
pub(crate) trait PagedResponse: DeserializeOwned {
    type Item;

    /// Decomposes the page into its items and the absolute URL of the next
    /// page, if the server issued one.
    fn into_parts(self) -> (Vec<Self::Item>, Option<String>);
}

/// Drives a paginated endpoint as a lazy stream of items.
///
/// The initial request carries the caller's filter query; every follow-up
/// request targets the cursor URL from the previous page, with no query
/// parameters of its own. At most one page is in flight at a time, items are
/// yielded in page order and in-page order, and the cursor — not the item
/// count — decides whether another fetch happens.
///
/// Cancellation is checked before each item and at page boundaries; once it
/// fires, remaining items of the current page are discarded and no further
/// request is issued. A failed page fetch ends the stream with that error.
pub(crate) fn paginate<P>(
    client: Client,
    initial: ApiRequest,
) -> impl Stream<Item = Result<P::Item, Error>> + Send
where
    P: PagedResponse + Send + 'static,
    P::Item: Send + 'static,
{
    let cancel = initial.cancel_token();
    Box::pin(try_stream! {
        let mut next = Some(initial);
        'pages: while let Some(request) = next.take() {
            let page: P = client.send(request).await?;
            let (items, cursor) = page.into_parts();

            for item in items {
                if cancel.is_cancelled() {
                    break 'pages;
                }
                yield item;
            }

            if cancel.is_cancelled() {
                break 'pages;
            }

            next = cursor.map(|url| ApiRequest::get(url).cancel(cancel.clone()));
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_params_keep_insertion_order() {
        let mut params = QueryParams::new();
        params.push("tzid", "Etc/UTC");
        params.push("localized_times", "true");
        params.push("from", "2024-01-01");

        assert_eq!(
            params.encode(),
            "tzid=Etc%2FUTC&localized_times=true&from=2024-01-01"
        );
    }

    #[test]
    fn array_keys_collapse_to_one_wire_name() {
        let mut params = QueryParams::new();
        params.extend_array("calendar_ids", ["cal_1", "cal_2", "cal_3"]);

        let encoded = params.encode();
        assert_eq!(
            encoded,
            "calendar_ids[]=cal_1&calendar_ids[]=cal_2&calendar_ids[]=cal_3"
        );
        assert_eq!(encoded.matches("calendar_ids[]=").count(), 3);
        // The marker itself must never be escaped.
        assert!(!encoded.contains("%5B"));
        assert!(!encoded.contains("%5D"));
    }

    #[test]
    fn array_values_are_escaped() {
        let mut params = QueryParams::new();
        params.extend_array("calendar_ids", ["cal one&two"]);

        assert_eq!(params.encode(), "calendar_ids[]=cal%20one%26two");
    }

    #[test]
    fn empty_array_adds_nothing() {
        let mut params = QueryParams::new();
        params.extend_array("calendar_ids", Vec::<String>::new());

        assert!(params.is_empty());
        assert_eq!(params.encode(), "");
    }

    #[test]
    fn unreserved_characters_survive_encoding() {
        let mut params = QueryParams::new();
        params.push("last_modified", "2024-01-01T00:00:00.000~Z");

        assert_eq!(params.encode(), "last_modified=2024-01-01T00%3A00%3A00.000~Z");
    }

    #[test]
    fn relative_paths_join_the_base_url() {
        let request = ApiRequest::get("calendars");
        assert_eq!(
            request.url("https://api.cronofy.com/v1"),
            "https://api.cronofy.com/v1/calendars"
        );
        assert_eq!(
            request.url("https://api.cronofy.com/v1/"),
            "https://api.cronofy.com/v1/calendars"
        );
    }

    #[test]
    fn absolute_urls_pass_through() {
        let cursor = "https://api.cronofy.com/v1/events/pages/08a07b034306679e";
        let request = ApiRequest::get(cursor);
        assert_eq!(request.url("https://api.cronofy.com/v1"), cursor);

        // Scheme matching is case-insensitive.
        let shouty = "HTTPS://api.cronofy.com/v1/events/pages/2";
        assert_eq!(ApiRequest::get(shouty).url("https://x"), shouty);

        let plain = "http://127.0.0.1:9000/v1/events/pages/2";
        assert_eq!(ApiRequest::get(plain).url("https://x"), plain);
    }

    #[test]
    fn query_payload_lands_in_the_url() {
        let mut params = QueryParams::new();
        params.push("tzid", "Etc/UTC");
        let request = ApiRequest::get("events").query(params);

        assert_eq!(
            request.url("https://api.cronofy.com/v1"),
            "https://api.cronofy.com/v1/events?tzid=Etc%2FUTC"
        );
    }

    #[test]
    fn empty_query_adds_no_separator() {
        let request = ApiRequest::get("events").query(QueryParams::new());
        assert_eq!(
            request.url("https://api.cronofy.com/v1"),
            "https://api.cronofy.com/v1/events"
        );
    }
}
