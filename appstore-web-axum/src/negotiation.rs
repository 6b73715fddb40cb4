//! Content negotiation. Request bodies are decoded according to their `Content-Type` and response
//! bodies are encoded according to the `Accept` header. Both JSON and XML are supported.

use crate::error::ApiError;
use axum::async_trait;
use axum::body::{Bytes, HttpBody};
use axum::extract::{FromRequest, FromRequestParts};
use axum::http::header::{ACCEPT, CONTENT_TYPE};
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderValue, Request};
use axum::response::{IntoResponse, Response};
use axum::BoxError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::cmp::Ordering;

/// Supported body formats.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug, Default)]
pub enum MediaFormat {
    #[default]
    Json,
    Xml,
}

impl MediaFormat {
    pub fn mime(&self) -> &'static str {
        match self {
            MediaFormat::Json => "application/json",
            MediaFormat::Xml => "application/xml",
        }
    }

    /// Determines the format of a request body. A missing `Content-Type` means JSON.
    pub fn from_content_type(headers: &HeaderMap) -> Result<Self, ApiError> {
        let Some(content_type) = headers.get(CONTENT_TYPE) else {
            return Ok(MediaFormat::Json);
        };

        let content_type = content_type
            .to_str()
            .map_err(|_| ApiError::UnsupportedMediaType("<invalid header>".to_string()))?;
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        match essence.as_str() {
            "application/json" => Ok(MediaFormat::Json),
            "application/xml" | "text/xml" => Ok(MediaFormat::Xml),
            essence if essence.ends_with("+json") => Ok(MediaFormat::Json),
            essence if essence.ends_with("+xml") => Ok(MediaFormat::Xml),
            _ => Err(ApiError::UnsupportedMediaType(content_type.to_string())),
        }
    }

    /// Picks the response format from the `Accept` header. Media ranges are tried by descending
    /// quality and, for equal quality, in header order.
    pub fn from_accept(headers: &HeaderMap) -> Result<Self, ApiError> {
        let accept = headers
            .get_all(ACCEPT)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .collect::<Vec<_>>()
            .join(",");

        if accept.trim().is_empty() {
            return Ok(MediaFormat::Json);
        }

        let mut ranges = accept
            .split(',')
            .filter_map(parse_media_range)
            .filter(|(_, quality)| *quality > 0.0)
            .collect::<Vec<_>>();
        ranges.sort_by(|(_, a), (_, b)| b.partial_cmp(a).unwrap_or(Ordering::Equal));

        ranges
            .iter()
            .find_map(|(range, _)| match range.as_str() {
                "*/*" | "application/*" | "application/json" => Some(MediaFormat::Json),
                "application/xml" | "text/xml" | "text/*" => Some(MediaFormat::Xml),
                _ => None,
            })
            .ok_or(ApiError::NotAcceptable(accept))
    }

    pub fn decode<T: DeserializeOwned>(&self, body: &[u8]) -> Result<T, ApiError> {
        match self {
            MediaFormat::Json => {
                serde_json::from_slice(body).map_err(|error| ApiError::Decode(error.to_string()))
            }
            MediaFormat::Xml => {
                let body = std::str::from_utf8(body)
                    .map_err(|error| ApiError::Decode(error.to_string()))?;
                quick_xml::de::from_str(body).map_err(|error| ApiError::Decode(error.to_string()))
            }
        }
    }

    pub fn encode<T: Serialize>(&self, value: &T) -> Result<String, ApiError> {
        match self {
            MediaFormat::Json => {
                serde_json::to_string(value).map_err(|error| ApiError::Encode(error.to_string()))
            }
            MediaFormat::Xml => {
                quick_xml::se::to_string(value).map_err(|error| ApiError::Encode(error.to_string()))
            }
        }
    }
}

fn parse_media_range(range: &str) -> Option<(String, f32)> {
    let mut parts = range.split(';');
    let media_range = parts.next()?.trim().to_ascii_lowercase();
    if media_range.is_empty() {
        return None;
    }

    let quality = parts
        .filter_map(|parameter| parameter.split_once('='))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("q"))
        .and_then(|(_, value)| value.trim().parse::<f32>().ok())
        .unwrap_or(1.0);

    Some((media_range, quality))
}

/// Extractor for the response format acceptable to the client. Rejects the request with
/// `406 Not Acceptable` if neither JSON nor XML is accepted.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub struct Accepted(pub MediaFormat);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Accepted {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        MediaFormat::from_accept(&parts.headers).map(Accepted)
    }
}

/// Body extractor decoding JSON or XML, depending on the request `Content-Type`.
#[derive(Clone, Debug)]
pub struct Negotiated<T>(pub T);

#[async_trait]
impl<T, S, B> FromRequest<S, B> for Negotiated<T>
where
    T: DeserializeOwned,
    B: HttpBody + Send + 'static,
    B::Data: Send,
    B::Error: Into<BoxError>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request<B>, state: &S) -> Result<Self, Self::Rejection> {
        let format = MediaFormat::from_content_type(req.headers())?;
        let body = Bytes::from_request(req, state)
            .await
            .map_err(|error| ApiError::Decode(error.to_string()))?;

        format.decode(&body).map(Negotiated)
    }
}

/// Response body encoded in the negotiated format.
#[derive(Clone, Debug)]
pub struct Encoded<T> {
    pub format: MediaFormat,
    pub value: T,
}

impl<T> Encoded<T> {
    pub fn new(Accepted(format): Accepted, value: T) -> Self {
        Self { format, value }
    }
}

impl<T: Serialize> IntoResponse for Encoded<T> {
    fn into_response(self) -> Response {
        match self.format.encode(&self.value) {
            Ok(body) => (
                [(CONTENT_TYPE, HeaderValue::from_static(self.format.mime()))],
                body,
            )
                .into_response(),
            Err(error) => error.into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::error::ApiError;
    use crate::negotiation::MediaFormat;
    use appstore::model::{App, AppUpdateRequest};
    use axum::http::header::{ACCEPT, CONTENT_TYPE};
    use axum::http::{HeaderMap, HeaderValue};

    fn headers(name: axum::http::HeaderName, value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(name, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn should_default_to_json() {
        assert_eq!(
            MediaFormat::from_content_type(&HeaderMap::new()).unwrap(),
            MediaFormat::Json
        );
        assert_eq!(
            MediaFormat::from_accept(&HeaderMap::new()).unwrap(),
            MediaFormat::Json
        );
    }

    #[test]
    fn should_detect_content_type() {
        assert_eq!(
            MediaFormat::from_content_type(&headers(CONTENT_TYPE, "application/json; charset=utf-8"))
                .unwrap(),
            MediaFormat::Json
        );
        assert_eq!(
            MediaFormat::from_content_type(&headers(CONTENT_TYPE, "text/xml")).unwrap(),
            MediaFormat::Xml
        );
        assert_eq!(
            MediaFormat::from_content_type(&headers(CONTENT_TYPE, "application/atom+xml")).unwrap(),
            MediaFormat::Xml
        );
    }

    #[test]
    fn should_reject_unsupported_content_type() {
        assert!(matches!(
            MediaFormat::from_content_type(&headers(CONTENT_TYPE, "text/plain")),
            Err(ApiError::UnsupportedMediaType(_))
        ));
    }

    #[test]
    fn should_respect_accept_quality() {
        assert_eq!(
            MediaFormat::from_accept(&headers(
                ACCEPT,
                "application/json;q=0.5, application/xml"
            ))
            .unwrap(),
            MediaFormat::Xml
        );
        assert_eq!(
            MediaFormat::from_accept(&headers(ACCEPT, "text/html, application/xml;q=0, */*;q=0.1"))
                .unwrap(),
            MediaFormat::Json
        );
    }

    #[test]
    fn should_prefer_header_order_for_equal_quality() {
        assert_eq!(
            MediaFormat::from_accept(&headers(ACCEPT, "text/xml, application/json")).unwrap(),
            MediaFormat::Xml
        );
    }

    #[test]
    fn should_produce_xml_for_any_text() {
        assert_eq!(
            MediaFormat::from_accept(&headers(ACCEPT, "text/*")).unwrap(),
            MediaFormat::Xml
        );
        assert_eq!(
            MediaFormat::from_accept(&headers(ACCEPT, "text/html, text/*;q=0.5")).unwrap(),
            MediaFormat::Xml
        );
    }

    #[test]
    fn should_reject_unacceptable_formats() {
        assert!(matches!(
            MediaFormat::from_accept(&headers(ACCEPT, "text/html")),
            Err(ApiError::NotAcceptable(_))
        ));
    }

    #[test]
    fn should_decode_xml_request() {
        let request: AppUpdateRequest = MediaFormat::Xml
            .decode(b"<AppUpdateRequest><label>l</label></AppUpdateRequest>")
            .unwrap();

        assert_eq!(request.label.as_deref(), Some("l"));
        assert_eq!(request.description, None);
    }

    #[test]
    fn should_encode_xml_response() {
        let app = App {
            id: "1".to_string(),
            label: "l".to_string(),
            description: "d".to_string(),
        };

        assert_eq!(
            MediaFormat::Xml.encode(&app).unwrap(),
            "<App><id>1</id><label>l</label><description>d</description></App>"
        );
    }

    #[test]
    fn should_report_malformed_json() {
        assert!(matches!(
            MediaFormat::Json.decode::<AppUpdateRequest>(b"{"),
            Err(ApiError::Decode(_))
        ));
    }
}
