//! Errors from the external chat platform.

/// A call to traQ failed. Request handlers surface this as a bad gateway;
/// the scheduler logs it and retries on the next run.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    /// Connection, timeout or decoding failure.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// traQ answered with a non-success status.
    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    /// The upstream is unavailable for another reason (e.g. a shared refresh failed).
    #[error("upstream unavailable: {0}")]
    Unavailable(String),
}
