//! Write-form intake
//!
//! Parses article forms (multipart or urlencoded), enforces the single-image
//! rules, and stores accepted images under the uploads directory.

mod form;
mod store;

pub use form::{parse_article_form, ArticleForm, FormLimits, UploadedFile, IMAGE_FIELD};
pub use store::{stored_file_name, UploadStore, PUBLIC_PREFIX};

#[cfg(test)]
pub(crate) use form::tests::{multipart_body, multipart_content_type};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum UploadError {
    /// The file part did not declare an `image/*` content type
    #[error("Only image uploads are allowed")]
    UnsupportedMediaType { content_type: String },

    /// The image exceeded `storage.max_upload_size`
    #[error("File too large. Maximum size is {}MB.", mebibytes(.limit))]
    PayloadTooLarge { limit: u64 },

    /// The whole request body exceeded `http.max_body_size`
    #[error("413 Payload Too Large")]
    BodyTooLarge { limit: u64 },

    /// A file arrived under a field other than `image`, or more than one did
    #[error("Unexpected field: {field}")]
    UnexpectedField { field: String },

    #[error("Malformed form data: {0}")]
    Malformed(String),

    #[error("failed to store upload: {0}")]
    Io(#[from] std::io::Error),
}

#[allow(clippy::trivially_copy_pass_by_ref)]
const fn mebibytes(bytes: &u64) -> u64 {
    *bytes / (1024 * 1024)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = UploadError::PayloadTooLarge {
            limit: 5 * 1024 * 1024,
        };
        assert_eq!(err.to_string(), "File too large. Maximum size is 5MB.");

        let err = UploadError::UnsupportedMediaType {
            content_type: "text/plain".to_string(),
        };
        assert_eq!(err.to_string(), "Only image uploads are allowed");
    }
}
