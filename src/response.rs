//! Outgoing response type.
//!
//! What the serving boundary writes: a status, a content type and a body.
//! [`Rendered::into_response`](crate::Rendered::into_response) is the only
//! producer inside the crate.

use bytes::Bytes;
use http_body_util::Full;

use crate::status::Status;

/// Content types the dispatcher emits.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ContentType {
    Html, // text/html; charset=utf-8
    Text, // text/plain; charset=utf-8
}

impl ContentType {
    fn as_str(self) -> &'static str {
        match self {
            Self::Html => "text/html; charset=utf-8",
            Self::Text => "text/plain; charset=utf-8",
        }
    }
}

/// An outgoing HTTP response.
///
/// ```rust
/// use frontal::{ContentType, Response, Status};
///
/// Response::html("<p>hi</p>");
/// Response::builder()
///     .status(Status::NotFound)
///     .bytes(ContentType::Text, b"gone".to_vec());
/// ```
#[derive(Clone, Debug)]
pub struct Response {
    pub(crate) body: Vec<u8>,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) status: u16,
}

impl Response {
    /// `200 OK` — `text/html; charset=utf-8`.
    pub fn html(body: impl Into<String>) -> Self {
        Self::builder().html(body)
    }

    /// `200 OK` — `text/plain; charset=utf-8`.
    pub fn text(body: impl Into<String>) -> Self {
        Self::builder().text(body)
    }

    /// Builder for responses that need a custom status or extra headers.
    pub fn builder() -> ResponseBuilder {
        ResponseBuilder { headers: Vec::new(), status: Status::Ok.into() }
    }

    pub fn status(&self) -> u16 { self.status }
    pub fn body(&self) -> &[u8] { &self.body }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Converts into the `http` type hyper writes.
    pub(crate) fn into_http(self) -> http::Response<Full<Bytes>> {
        let mut res = http::Response::new(Full::new(Bytes::from(self.body)));
        *res.status_mut() = http::StatusCode::from_u16(self.status)
            .unwrap_or(http::StatusCode::INTERNAL_SERVER_ERROR);
        for (name, value) in self.headers {
            match (
                http::HeaderName::try_from(name.as_str()),
                http::HeaderValue::try_from(value.as_str()),
            ) {
                (Ok(name), Ok(value)) => {
                    res.headers_mut().append(name, value);
                }
                _ => tracing::warn!(header = %name, "dropping invalid response header"),
            }
        }
        res
    }
}

/// Fluent builder for [`Response`]. Defaults to `Status::Ok` (200).
pub struct ResponseBuilder {
    headers: Vec<(String, String)>,
    status: u16,
}

impl ResponseBuilder {
    pub fn status(mut self, code: Status) -> Self {
        self.status = code.into();
        self
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_owned(), value.to_owned()));
        self
    }

    pub fn html(self, body: impl Into<String>) -> Response {
        self.bytes(ContentType::Html, body.into().into_bytes())
    }

    pub fn text(self, body: impl Into<String>) -> Response {
        self.bytes(ContentType::Text, body.into().into_bytes())
    }

    pub fn bytes(self, content_type: ContentType, body: Vec<u8>) -> Response {
        let mut headers = vec![("content-type".to_owned(), content_type.as_str().to_owned())];
        headers.extend(self.headers);
        Response { body, headers, status: self.status }
    }
}
