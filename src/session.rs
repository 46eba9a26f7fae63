use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
};
use thiserror::Error;
use uuid::Uuid;

/// Header a client can use to resume an existing session
pub const SESSION_HEADER: &str = "x-session-id";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("session {0} not found")]
    NotFound(Uuid),
    #[error("session limit of {0} reached")]
    TooManySessions(usize),
}

/// Session a client asked to resume, if any
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestedSession(pub Option<Uuid>);

/// Extractor for the session id from the `X-Session-Id` header or the
/// `session_id` query parameter. A present but malformed id is rejected.
impl<S> FromRequestParts<S> for RequestedSession
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        // Try the header first, then fall back to the query string
        let raw = parts
            .headers
            .get(SESSION_HEADER)
            .and_then(|h| h.to_str().ok())
            .map(String::from)
            .or_else(|| {
                parts
                    .uri
                    .query()
                    .and_then(|q| serde_urlencoded::from_str::<Vec<(String, String)>>(q).ok())
                    .and_then(|params| {
                        params
                            .into_iter()
                            .find(|(k, _)| k == "session_id")
                            .map(|(_, v)| v)
                    })
            });

        let result = match raw {
            None => Ok(RequestedSession(None)),
            Some(raw) => Uuid::parse_str(raw.trim())
                .map(|id| RequestedSession(Some(id)))
                .map_err(|e| {
                    tracing::warn!("Rejecting malformed session id '{}': {}", raw, e);
                    StatusCode::BAD_REQUEST
                }),
        };

        std::future::ready(result)
    }
}
