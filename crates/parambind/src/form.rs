//! Submitted form source.
//!
//! The body is read according to its content type: `multipart/form-data`
//! through `multer`, `application/x-www-form-urlencoded` through
//! `serde_urlencoded`. Any other body contributes no form values.

use bytes::Bytes;
use multer::Multipart;
use std::io;

use crate::error::BindError;
use crate::{BindRequest, Values};

/// Default in-memory limit for multipart bodies (32 MiB).
pub const DEFAULT_MAX_MEMORY: u64 = 32 << 20;

/// Maximum size of a URL-encoded body (10 MiB).
const MAX_URLENCODED_BODY: usize = 10 << 20;

/// How a form body is encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FormEncoding {
    Multipart,
    UrlEncoded,
    None,
}

fn form_encoding(request: &BindRequest) -> Result<FormEncoding, BindError> {
    let Some(content_type) = request.content_type() else {
        return Ok(FormEncoding::None);
    };
    let mime: mime::Mime = content_type
        .parse()
        .map_err(|e: mime::FromStrError| BindError::Form(e.to_string()))?;

    if mime.type_() == mime::MULTIPART && mime.subtype() == mime::FORM_DATA {
        Ok(FormEncoding::Multipart)
    } else if mime.essence_str() == mime::APPLICATION_WWW_FORM_URLENCODED.essence_str() {
        Ok(FormEncoding::UrlEncoded)
    } else {
        Ok(FormEncoding::None)
    }
}

/// Parses the request body into a [`Values`] map of form fields.
///
/// Multipart file parts are skipped; only text fields become values, and
/// only they count toward `max_memory`.
///
/// # Errors
///
/// Returns [`BindError::Multipart`] for malformed multipart bodies,
/// [`BindError::FormTooLarge`] when the multipart text values together
/// exceed `max_memory`, and [`BindError::Form`] for an unparsable content
/// type or a malformed or oversized URL-encoded body.
pub fn read_form(request: &BindRequest, max_memory: u64) -> Result<Values, BindError> {
    match form_encoding(request)? {
        FormEncoding::Multipart => read_multipart(request, max_memory),
        FormEncoding::UrlEncoded => read_urlencoded(request.body()),
        FormEncoding::None => Ok(Values::new()),
    }
}

fn read_urlencoded(body: &Bytes) -> Result<Values, BindError> {
    if body.len() > MAX_URLENCODED_BODY {
        return Err(BindError::Form(format!(
            "body of {} bytes exceeds the {MAX_URLENCODED_BODY} byte limit",
            body.len()
        )));
    }
    Values::from_urlencoded(body).map_err(BindError::Form)
}

fn read_multipart(request: &BindRequest, max_memory: u64) -> Result<Values, BindError> {
    let boundary = multer::parse_boundary(request.content_type().unwrap_or_default())?;
    let body = request.body().clone();
    let stream = futures_util::stream::once(async move { Ok::<_, io::Error>(body) });
    let mut multipart = Multipart::new(stream, boundary);

    // The body is already buffered, so the stream never waits on I/O.
    futures_executor::block_on(async move {
        let mut values = Values::new();
        let mut kept: u64 = 0;
        while let Some(mut field) = multipart.next_field().await? {
            // File parts are never held, so only text values count toward the limit.
            if field.file_name().is_some() {
                continue;
            }
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            let mut text = Vec::new();
            while let Some(chunk) = field.chunk().await? {
                kept += chunk.len() as u64;
                if kept > max_memory {
                    return Err(BindError::FormTooLarge { limit: max_memory });
                }
                text.extend_from_slice(&chunk);
            }
            values.push(name, String::from_utf8_lossy(&text).into_owned());
        }
        Ok(values)
    })
}
