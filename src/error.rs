//! Error Handling
//!
//! This module defines the crate's core error types, providing a structured way to handle
//! the issues that can occur while talking to the Cronofy API: network failures,
//! non-2xx API responses, undecodable response bodies, and cancelled calls.

use std::error::Error as StdError;

use reqwest::StatusCode;

/// The **top-level error enum** for the `cronofy-rs` crate.
///
/// This enum aggregates the categories of errors that can occur within the
/// library, providing a unified error handling mechanism. It uses `#[non_exhaustive]`
/// to allow for future additions of error variants without breaking client code.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// An error occurring during network operations (e.g., HTTP requests,
    /// connection issues, DNS resolution failures, or TLS errors).
    ///
    /// This variant wraps a `BoxError` (a boxed `dyn std::error::Error + Send + Sync`)
    /// to handle underlying transport errors, typically from `reqwest`.
    #[error("A network error occurred: {0}")]
    Network(#[from] BoxError),

    /// An error related to the Cronofy API service or to processing its responses.
    ///
    /// This variant wraps a [`ServiceError`] which further categorizes issues:
    /// the API rejected the call, or its response could not be decoded.
    #[error("An API service or data processing error occurred: {0}")]
    Service(#[from] ServiceError),

    /// The call's cancellation token fired before the call completed.
    ///
    /// Cancellation is cooperative: it is observed before the request is sent,
    /// while waiting on the transport, and while reading the response body.
    /// A cancelled call is never an API error — the API never saw or never
    /// answered the request.
    #[error("The call was cancelled before it completed")]
    Cancelled,

    /// An **internal logic error** within the `cronofy-rs` crate, or an error
    /// caused by invalid input that should have been caught earlier (e.g., a
    /// request body that cannot be serialized, or an unexpected state during
    /// request building).
    #[error("An internal library error occurred: {0}")]
    Internal(BoxError),
}

impl Error {
    pub(crate) fn network(err: BoxError) -> Self {
        Self::Network(err)
    }

    pub(crate) fn internal(err: BoxError) -> Self {
        Self::Internal(err)
    }

    /// Returns the HTTP status of the underlying service error, if this is one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Service(err) => Some(err.status()),
            _ => None,
        }
    }
}

/// **Service-level errors** encountered during API interactions or response
/// processing. Carries the HTTP status code, the endpoint the call targeted,
/// and a more specific error kind.
#[derive(thiserror::Error, Debug)]
#[error("Service error at endpoint '{endpoint}': {kind} (HTTP status {status})")]
#[non_exhaustive]
pub struct ServiceError {
    pub(crate) status: StatusCode,
    pub(crate) endpoint: String,
    pub(crate) kind: ServiceErrorKind,
}

impl ServiceError {
    /// Returns the HTTP status code associated with this service error.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the URL of the call where this service error occurred.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Returns the specific kind of service error.
    pub fn kind(&self) -> &ServiceErrorKind {
        &self.kind
    }

    pub(crate) fn api(body: String) -> ServiceErrorKind {
        ServiceErrorKind::Api(ApiError { body })
    }

    pub(crate) fn parse(source: BoxError, body: String) -> ServiceErrorKind {
        ServiceErrorKind::Parse(ParseError {
            source: Some(source),
            body,
        })
    }

    pub(crate) fn payload(source: BoxError) -> ServiceErrorKind {
        ServiceErrorKind::InvalidPayload(Some(source))
    }
}

/// A sub-category of [`ServiceError`], providing more granular detail about
/// what went wrong with a call that reached the API.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum ServiceErrorKind {
    /// The API answered with a non-2xx status.
    ///
    /// The wrapped [`ApiError`] carries the raw response body verbatim —
    /// Cronofy puts its diagnostic JSON there, and surfacing it untouched
    /// keeps the detail available without committing to its shape.
    #[error("The API returned an error: {0}")]
    Api(#[from] ApiError),

    /// The HTTP call itself succeeded, but the response body could not be
    /// deserialized into the expected result shape.
    ///
    /// The wrapped [`ParseError`] includes the original body that failed to
    /// parse and the underlying decode error.
    #[error("Failed to parse the API response: {0}")]
    Parse(#[from] ParseError),

    /// The response parsed, but its structure contradicts the protocol —
    /// for example a batch reply whose entry count does not match the number
    /// of submitted entries.
    #[error("The API response had an invalid or unexpected payload structure.")]
    InvalidPayload(#[source] Option<BoxError>),
}

impl ServiceErrorKind {
    pub(crate) fn service(self, endpoint: impl Into<String>, status: StatusCode) -> ServiceError {
        ServiceError {
            status,
            endpoint: endpoint.into(),
            kind: self,
        }
    }
}

/// A non-2xx response from the API.
///
/// # Fields
/// - `body`: The raw response body text, exactly as the API sent it.
#[derive(thiserror::Error, Debug)]
#[error("{body}")]
#[non_exhaustive]
pub struct ApiError {
    pub body: String,
}

/// An error that occurred while **deserializing a response body**.
///
/// This is used when the crate fails to convert a response body into the
/// expected Rust data structure.
///
/// # Fields
/// - `source`: An optional `BoxError` representing the underlying cause of the
///   parsing failure (e.g., a `serde_json::Error`).
/// - `body`: The original raw `String` content that could not be parsed,
///   useful for debugging.
#[derive(thiserror::Error, Debug)]
#[error("Failed to parse the response body. Raw body content was: '{}'.", body)]
#[non_exhaustive]
pub struct ParseError {
    #[source]
    pub(crate) source: Option<BoxError>,
    pub body: String,
}

impl From<reqwest::Error> for Error {
    fn from(value: reqwest::Error) -> Self {
        if value.is_builder() || value.is_redirect() {
            // Builder and request-composition errors point to internal
            // misconfiguration or invalid input rather than the network.
            Self::internal(value.into())
        } else {
            Self::network(value.into())
        }
    }
}

/// A convenient type alias for a boxed, trait-object error that can be sent across threads.
///
/// This is typically used to erase the concrete type of an error when it needs to be
/// stored or passed up the call stack generically.
pub type BoxError = Box<dyn StdError + Send + Sync>;
