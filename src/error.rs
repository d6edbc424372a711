use thiserror::Error;

/// Error type shared with the Lambda runtime. Handler failures surface as this.
pub type Error = lambda_runtime::Error;

/// Misuse of a `ServerResponse` after it has been finalized or flushed.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ResponseError {
    #[error("cannot modify headers after they have been sent")]
    HeadersSent,

    #[error("cannot send body after headers have been sent")]
    AlreadyFinished,

    #[error("response has already been flushed")]
    AlreadyFlushed,
}

/// Failure while the platform materializes a request body.
#[derive(Debug, Error)]
pub enum BodyError {
    #[error("malformed JSON body: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed base64 body: {0}")]
    Base64(#[from] base64::DecodeError),
}
