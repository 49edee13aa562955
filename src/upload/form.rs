// Article form parsing
// Turns a buffered request body into text fields plus at most one image

use std::io::Cursor;

use hyper::body::Bytes;
use multer::{Constraints, Multipart, SizeLimit};

use super::UploadError;
use crate::article::ArticleFields;
use crate::http::mime;

/// Only file field accepted on write forms
pub const IMAGE_FIELD: &str = "image";

/// Cap on each text field
const MAX_TEXT_FIELD_SIZE: u64 = 1024 * 1024;

#[derive(Debug, Clone, Copy)]
pub struct FormLimits {
    pub max_upload_size: u64,
}

/// An image received with a write request, not yet on disk
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: String,
    pub data: Bytes,
}

#[derive(Debug, Default)]
pub struct ArticleForm {
    pub fields: ArticleFields,
    pub image: Option<UploadedFile>,
}

/// Parse a write-request body according to its `Content-Type`
///
/// Bodies that are neither multipart nor urlencoded yield an empty form,
/// which later fails validation like any other form with blank fields.
pub async fn parse_article_form(
    content_type: Option<&str>,
    body: Bytes,
    limits: FormLimits,
) -> Result<ArticleForm, UploadError> {
    let Some(content_type) = content_type else {
        return Ok(ArticleForm::default());
    };

    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    match essence.as_str() {
        "multipart/form-data" => parse_multipart(content_type, body, limits).await,
        "application/x-www-form-urlencoded" => Ok(parse_urlencoded(&body)),
        _ => Ok(ArticleForm::default()),
    }
}

fn parse_urlencoded(body: &[u8]) -> ArticleForm {
    let mut form = ArticleForm::default();
    for (name, value) in url::form_urlencoded::parse(body) {
        form.fields.set(&name, value.into_owned());
    }
    form
}

async fn parse_multipart(
    content_type: &str,
    body: Bytes,
    limits: FormLimits,
) -> Result<ArticleForm, UploadError> {
    let boundary =
        multer::parse_boundary(content_type).map_err(|e| UploadError::Malformed(e.to_string()))?;
    let constraints = Constraints::new().size_limit(
        SizeLimit::new()
            .per_field(MAX_TEXT_FIELD_SIZE)
            .for_field(IMAGE_FIELD, limits.max_upload_size),
    );
    let mut multipart =
        Multipart::with_reader_with_constraints(Cursor::new(body), boundary, constraints);

    let mut form = ArticleForm::default();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| map_multer_error(e, limits))?
    {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(ToOwned::to_owned);

        match file_name.as_deref() {
            None => {
                let value = field.text().await.map_err(|e| map_multer_error(e, limits))?;
                form.fields.set(&name, value);
            }
            // File input left empty by the browser
            Some("") => {}
            Some(file_name) => {
                if name != IMAGE_FIELD || form.image.is_some() {
                    return Err(UploadError::UnexpectedField { field: name });
                }

                let content_type = field
                    .content_type()
                    .map(|m| m.essence_str().to_string())
                    .unwrap_or_default();
                if !mime::is_image(&content_type) {
                    return Err(UploadError::UnsupportedMediaType { content_type });
                }

                let data = field.bytes().await.map_err(|e| map_multer_error(e, limits))?;
                form.image = Some(UploadedFile {
                    file_name: file_name.to_string(),
                    content_type,
                    data,
                });
            }
        }
    }

    Ok(form)
}

fn map_multer_error(err: multer::Error, limits: FormLimits) -> UploadError {
    match err {
        multer::Error::FieldSizeExceeded { field_name, .. }
            if field_name.as_deref() == Some(IMAGE_FIELD) =>
        {
            UploadError::PayloadTooLarge {
                limit: limits.max_upload_size,
            }
        }
        multer::Error::StreamSizeExceeded { limit } => UploadError::BodyTooLarge { limit },
        other => UploadError::Malformed(other.to_string()),
    }
}
