//! Request/response shapes for the synchronous API gateway.

use serde::Serialize;

/// Status of a gateway response.
///
/// The gateway itself only ever produces these two outcomes; anything richer
/// is the transport adapter's concern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiStatus {
    /// The handler accepted the request.
    Ok,
    /// No interface matched, or the handler rejected the request.
    ClientError,
}

/// A gateway response with an owned body.
///
/// Bodies are owned per call, so a response stays valid for as long as the
/// caller holds it, independent of any later handler invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    /// Outcome of the dispatch.
    pub status: ApiStatus,
    /// JSON body; empty on [`ApiStatus::ClientError`].
    pub body: String,
}

impl ApiResponse {
    /// Successful response carrying a handler-produced JSON body.
    #[must_use]
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: ApiStatus::Ok,
            body: body.into(),
        }
    }

    /// Successful response without handler content; carries the generic
    /// acknowledgment envelope.
    #[must_use]
    pub fn ok_empty() -> Self {
        #[derive(Serialize)]
        struct Envelope {
            result: bool,
        }

        Self {
            status: ApiStatus::Ok,
            body: serde_json::to_string(&Envelope { result: true })
                .unwrap_or_else(|_| String::from("{\"result\":true}")),
        }
    }

    /// Client-error response with an empty body.
    #[must_use]
    pub fn client_error() -> Self {
        Self {
            status: ApiStatus::ClientError,
            body: String::new(),
        }
    }
}

/// Error returned by an interface handler to reject a request.
///
/// Carries no payload: a rejected request always maps to a client-error
/// response with an empty body, whatever the handler tried to produce.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, thiserror::Error)]
#[error("interface handler rejected the request")]
pub struct HandlerRejected;
