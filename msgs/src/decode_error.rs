use thiserror::Error;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("frame is not an event envelope: {0}")]
    InvalidFrame(#[source] serde_json::Error),

    #[error("malformed {event} payload: {source}")]
    MalformedPayload {
        event: &'static str,
        #[source]
        source: serde_json::Error,
    },
}
