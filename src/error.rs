//! Request-level errors and their HTTP mapping

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use thiserror::Error;

use crate::article::ArticleError;
use crate::http::build_error_response;
use crate::logger;
use crate::upload::UploadError;

/// Anything that can end a routed request early
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Article(#[from] ArticleError),

    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error("template rendering failed: {0}")]
    Template(#[from] tera::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Article(ArticleError::Validation { .. }) => StatusCode::BAD_REQUEST,
            Self::Article(ArticleError::NotFound { .. } | ArticleError::MalformedId { .. }) => {
                StatusCode::NOT_FOUND
            }
            Self::Article(ArticleError::DuplicateId { .. }) => StatusCode::CONFLICT,
            Self::Upload(err) => match err {
                UploadError::UnsupportedMediaType { .. } => StatusCode::UNSUPPORTED_MEDIA_TYPE,
                UploadError::BodyTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
                UploadError::PayloadTooLarge { .. }
                | UploadError::UnexpectedField { .. }
                | UploadError::Malformed(_) => StatusCode::BAD_REQUEST,
                UploadError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Template(_) | Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Log the error and turn it into the response sent to the client
    ///
    /// Server-side failures are reported with a generic body.
    pub fn into_response(self) -> Response<Full<Bytes>> {
        let status = self.status();
        if status.is_server_error() {
            logger::log_error(&format!("{self}"));
            build_error_response(status, "500 Internal Server Error")
        } else {
            logger::log_debug(&format!("Request rejected ({status}): {self}"));
            build_error_response(status, &self.to_string())
        }
    }
}
