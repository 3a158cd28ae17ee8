//! Unified error type.

use crate::response::{IntoResponse, Response};
use crate::status::Status;
use crate::validate::ValidationError;

/// The error type returned by restful's fallible operations.
///
/// Two groups live here. Infrastructure failures (binding a port, a bad
/// listen address) come back from [`Server`](crate::Server). Body failures
/// come back from [`Request::body`](crate::Request::body); they convert into
/// the uniform error envelope through [`IntoResponse`], so a handler can
/// simply return them.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid socket address `{0}`")]
    Addr(String),

    #[error("empty body from request")]
    EmptyBody,

    #[error("malformed body: {0}")]
    Decode(String),

    #[error("content type '{0}' is unsupported")]
    UnsupportedMediaType(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl Error {
    /// Status used when this error is rendered as a response.
    pub fn status(&self) -> Status {
        match self {
            Self::Io(_) | Self::Addr(_) => Status::InternalServerError,
            Self::EmptyBody | Self::Decode(_) | Self::Validation(_) => Status::BadRequest,
            Self::UnsupportedMediaType(_) => Status::UnsupportedMediaType,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        Response::error(self.status(), self)
    }
}
