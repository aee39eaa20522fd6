use thiserror::Error;

/// Failures of the remote GraphQL collaborator.
///
/// There is exactly one taxonomy for both the one-shot calls and the
/// subscription stream. The store converts any of these into its sticky
/// error flag; there is no retry or backoff layer.
#[derive(Error, Debug)]
pub enum TransportError {
    /// HTTP-level failure: connect, timeout, or a non-success status.
    #[error("HTTP error: {0}")]
    Http(String),

    /// The backend answered with a GraphQL `errors` array.
    #[error("API error: {0}")]
    Api(String),

    /// A payload that could not be decoded into the expected shape.
    #[error("Malformed payload: {0}")]
    Decode(String),

    /// A push frame carrying an event kind this client does not know.
    #[error("Unrecognized event: {0}")]
    UnrecognizedEvent(String),

    /// The subscription stream ended. It is not restartable.
    #[error("Event stream closed")]
    StreamClosed,

    /// Invalid client configuration.
    #[error("Config error: {0}")]
    Config(String),
}
