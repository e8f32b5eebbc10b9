//! Unified error type.

/// The error type returned by fnbridge's fallible operations.
///
/// Every variant is a translation-correctness failure, not a transient I/O
/// fault — nothing here is worth retrying. [`Proxy`](crate::Proxy) maps
/// translation errors to a `504` envelope and configuration errors to a
/// fixed `500`; see the crate docs for the full policy.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The event claimed `isBase64Encoded` but the body did not decode.
    #[error("invalid base64 request body: {0}")]
    Decode(#[from] base64::DecodeError),

    /// The event's method or assembled URL did not form a valid HTTP request.
    #[error("could not build http request: {0}")]
    MalformedRequest(#[from] http::Error),

    /// A response was finalized before any status code was recorded.
    ///
    /// The handler never called `write_header` or `write` — a caller bug,
    /// not a transient fault.
    #[error("status code not set on response")]
    StatusNotSet,

    /// A required environment variable is absent or empty.
    #[error("missing required environment variable `{0}`")]
    ConfigMissing(&'static str),

    /// Local dev-server bind/accept failure.
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}
