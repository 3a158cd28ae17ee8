//! The uniform [`Response`] value and its JSON/XML envelopes.
//!
//! Every handler and every short-circuiting middleware produces a
//! [`Response`]. It fixes a status at construction, carries a mutable header
//! map and one of three bodies:
//!
//! | kind | JSON | XML |
//! |---|---|---|
//! | data | `{"data":<payload>}` | `<response><data>…</data></response>` |
//! | error | `{"type":…,"title":…,"detail":…,"status":…}` | `<response><type>…</type>…</response>` |
//! | redirect | empty | empty |
//!
//! # Payload arity
//!
//! Data constructors take any `Serialize` value. Pass `()` for "no payload"
//! (`{"data":null}`), a single value for itself, and a tuple or slice for an
//! ordered sequence (`{"data":[a,b]}`, `<data>a</data><data>b</data>`):
//!
//! ```rust
//! use restful::Response;
//!
//! assert_eq!(Response::ok(()).render_json(), r#"{"data":null}"#);
//! assert_eq!(Response::ok("a").render_json(), r#"{"data":"a"}"#);
//! assert_eq!(Response::ok(("a", "b")).render_json(), r#"{"data":["a","b"]}"#);
//! assert_eq!(
//!     Response::ok(("a", "b")).render_xml(),
//!     "<response><data>a</data><data>b</data></response>",
//! );
//! ```
//!
//! # Encoding never fails
//!
//! A payload that cannot be encoded degrades to `{}` (JSON) or an empty
//! string (XML) and a `warn!` event; the status and headers are still sent.

use std::any::Any;
use std::fmt;

use bytes::Bytes;
use http::header::{CONTENT_TYPE, HeaderName, HeaderValue, LOCATION};
use http::StatusCode;
use http_body_util::Full;
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::finite;
use crate::status::Status;
use crate::xml;

/// Problem-type document referenced by every error envelope.
pub const PROBLEM_TYPE: &str = "http://www.w3.org/Protocols/rfc2616/rfc2616-sec10.html";

// ── Format ────────────────────────────────────────────────────────────────────

/// Wire format of request and response bodies.
///
/// Chosen from the request's `content-type` header only; `Accept` is not
/// consulted.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Format {
    Json,
    Xml,
}

impl Format {
    /// Strict match on the media type (parameters and case ignored).
    /// `None` for anything that is neither JSON nor XML.
    pub fn from_content_type(content_type: Option<&str>) -> Option<Self> {
        let essence = content_type?.split(';').next()?.trim();
        if essence.eq_ignore_ascii_case("application/json") {
            Some(Self::Json)
        } else if essence.eq_ignore_ascii_case("application/xml") {
            Some(Self::Xml)
        } else {
            None
        }
    }

    /// Response format for a request: XML when asked for, JSON otherwise.
    pub fn negotiate(content_type: Option<&str>) -> Self {
        Self::from_content_type(content_type).unwrap_or(Self::Json)
    }

    pub fn mime(self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Xml  => "application/xml",
        }
    }
}

// ── ErrorResponse ─────────────────────────────────────────────────────────────

/// The error envelope: `type`, `title`, `detail`, `status`.
///
/// It is also an `std::error::Error`, so application code can return it from a
/// data-access contract. Error constructors recognise it and pass it through
/// unchanged instead of wrapping it a second time.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, thiserror::Error)]
#[error("{detail}")]
pub struct ErrorResponse {
    #[serde(rename = "type")]
    type_uri: String,
    title: String,
    detail: String,
    status: u16,
}

impl ErrorResponse {
    pub fn new(status: Status, detail: impl Into<String>) -> Self {
        Self {
            type_uri: PROBLEM_TYPE.to_owned(),
            title: status.reason().to_owned(),
            detail: detail.into(),
            status: status.code(),
        }
    }

    pub fn type_uri(&self) -> &str { &self.type_uri }
    pub fn title(&self) -> &str { &self.title }
    pub fn detail(&self) -> &str { &self.detail }
    pub fn status(&self) -> u16 { self.status }
}

// ── Response ──────────────────────────────────────────────────────────────────

/// An outgoing response, before content negotiation.
///
/// Status and body are fixed by the constructor; only headers can change
/// afterwards, through [`Response::with_header`].
#[derive(Clone, Debug, PartialEq)]
pub struct Response {
    status: u16,
    headers: Vec<(String, String)>,
    kind: Kind,
}

#[derive(Clone, Debug, PartialEq)]
enum Kind {
    Data(Payload),
    Error(ErrorResponse),
    Redirect,
}

#[derive(Clone, Debug, PartialEq)]
enum Payload {
    Value(Value),
    Unencodable,
}

#[derive(Serialize)]
struct DataEnvelope<'a> {
    data: &'a Value,
}

impl Response {
    // ── 2xx ──────────────────────────────────────────────────────────────────

    /// Data response with an arbitrary status.
    pub fn data<T: Serialize>(status: Status, payload: T) -> Self {
        let encoded = finite::check(&payload)
            .map_err(|e| e.to_string())
            .and_then(|()| serde_json::to_value(&payload).map_err(|e| e.to_string()));
        let payload = match encoded {
            Ok(value) => Payload::Value(value),
            Err(e) => {
                warn!(status = status.code(), "payload is not encodable: {e}");
                Payload::Unencodable
            }
        };
        Self::new(status, Kind::Data(payload))
    }

    /// `200 OK`
    pub fn ok<T: Serialize>(payload: T) -> Self { Self::data(Status::Ok, payload) }

    /// `201 Created`
    pub fn created<T: Serialize>(payload: T) -> Self { Self::data(Status::Created, payload) }

    /// `202 Accepted`
    pub fn accepted<T: Serialize>(payload: T) -> Self { Self::data(Status::Accepted, payload) }

    /// `203 Non-Authoritative Information`
    pub fn non_authoritative_information<T: Serialize>(payload: T) -> Self {
        Self::data(Status::NonAuthoritativeInformation, payload)
    }

    /// `204 No Content`. Written without body bytes.
    pub fn no_content() -> Self { Self::bodiless(Status::NoContent) }

    /// `205 Reset Content`. Written without body bytes.
    pub fn reset_content() -> Self { Self::bodiless(Status::ResetContent) }

    /// `206 Partial Content`
    pub fn partial_content<T: Serialize>(payload: T) -> Self {
        Self::data(Status::PartialContent, payload)
    }

    // ── 3xx ──────────────────────────────────────────────────────────────────

    /// `300 Multiple Choices`
    pub fn multiple_choices(location: &str) -> Self { Self::redirect(Status::MultipleChoices, location) }

    /// `301 Moved Permanently`
    pub fn moved_permanently(location: &str) -> Self { Self::redirect(Status::MovedPermanently, location) }

    /// `302 Found`
    pub fn found(location: &str) -> Self { Self::redirect(Status::Found, location) }

    /// `303 See Other`
    pub fn see_other(location: &str) -> Self { Self::redirect(Status::SeeOther, location) }

    /// `304 Not Modified`
    pub fn not_modified(location: &str) -> Self { Self::redirect(Status::NotModified, location) }

    /// `305 Use Proxy`
    pub fn use_proxy(location: &str) -> Self { Self::redirect(Status::UseProxy, location) }

    /// `307 Temporary Redirect`
    pub fn temporary_redirect(location: &str) -> Self { Self::redirect(Status::TemporaryRedirect, location) }

    // ── 4xx / 5xx ────────────────────────────────────────────────────────────

    /// Error response with an arbitrary status; `detail` is `err`'s message.
    ///
    /// If `err` already is an error response (an [`ErrorResponse`] or a
    /// [`Response`] built by an error constructor) it is returned unchanged,
    /// original status included.
    pub fn error<E: fmt::Display + 'static>(status: Status, err: E) -> Self {
        match Self::already_error(&err) {
            Some(existing) => existing,
            None => ErrorResponse::new(status, err.to_string()).into(),
        }
    }

    /// Like [`Response::error`], with `detail` replacing `err`'s message.
    pub fn error_with<E: fmt::Display + 'static>(
        status: Status,
        err: E,
        detail: impl Into<String>,
    ) -> Self {
        match Self::already_error(&err) {
            Some(existing) => existing,
            None => ErrorResponse::new(status, detail).into(),
        }
    }

    // ── Accessors ────────────────────────────────────────────────────────────

    /// Adds or replaces (case-insensitively) a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let value = value.into();
        match self.headers.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(&name)) {
            Some(slot) => slot.1 = value,
            None => self.headers.push((name, value)),
        }
        self
    }

    pub fn status(&self) -> u16 { self.status }
    pub fn headers(&self) -> &[(String, String)] { &self.headers }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn is_error(&self) -> bool {
        matches!(self.kind, Kind::Error(_))
    }

    /// The error envelope, for responses built by an error constructor.
    pub fn as_error(&self) -> Option<&ErrorResponse> {
        match &self.kind {
            Kind::Error(problem) => Some(problem),
            _ => None,
        }
    }

    // ── Rendering ────────────────────────────────────────────────────────────

    pub fn render_json(&self) -> String {
        match &self.kind {
            Kind::Data(Payload::Value(data)) => to_json(&DataEnvelope { data }),
            Kind::Data(Payload::Unencodable) => "{}".to_owned(),
            Kind::Error(problem) => to_json(problem),
            Kind::Redirect => String::new(),
        }
    }

    pub fn render_xml(&self) -> String {
        let rendered = match &self.kind {
            Kind::Data(Payload::Value(data)) => xml::envelope(&[("data", data)]),
            Kind::Data(Payload::Unencodable) | Kind::Redirect => return String::new(),
            Kind::Error(problem) => {
                let fields = [
                    Value::from(problem.type_uri.as_str()),
                    Value::from(problem.title.as_str()),
                    Value::from(problem.detail.as_str()),
                    Value::from(problem.status),
                ];
                xml::envelope(&[
                    ("type", &fields[0]),
                    ("title", &fields[1]),
                    ("detail", &fields[2]),
                    ("status", &fields[3]),
                ])
            }
        };
        rendered.unwrap_or_else(|xml::Unencodable| {
            warn!(status = self.status, "payload is not representable as XML");
            String::new()
        })
    }

    pub fn render(&self, format: Format) -> String {
        match format {
            Format::Json => self.render_json(),
            Format::Xml  => self.render_xml(),
        }
    }

    /// Applies headers and the negotiated body to a wire response.
    ///
    /// `content-type` is set from `format` first, so a header set by the
    /// handler wins.
    pub(crate) fn into_http(self, format: Format) -> http::Response<Full<Bytes>> {
        let body = if self.has_body() { self.render(format) } else { String::new() };

        let mut res = http::Response::new(Full::new(Bytes::from(body)));
        *res.status_mut() =
            StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        res.headers_mut().insert(CONTENT_TYPE, HeaderValue::from_static(format.mime()));

        for (name, value) in &self.headers {
            match (HeaderName::from_bytes(name.as_bytes()), HeaderValue::from_str(value)) {
                (Ok(name), Ok(value)) => {
                    res.headers_mut().insert(name, value);
                }
                _ => warn!(header = %name, "dropping header that is not valid HTTP"),
            }
        }
        res
    }

    // ── Internals ────────────────────────────────────────────────────────────

    fn new(status: Status, kind: Kind) -> Self {
        Self { status: status.code(), headers: Vec::new(), kind }
    }

    fn bodiless(status: Status) -> Self {
        Self::new(status, Kind::Data(Payload::Value(Value::Null)))
    }

    fn redirect(status: Status, location: &str) -> Self {
        Self::new(status, Kind::Redirect).with_header(LOCATION.as_str(), location)
    }

    fn has_body(&self) -> bool {
        !matches!(self.kind, Kind::Redirect) && !matches!(self.status, 204 | 205 | 304)
    }

    fn already_error(err: &dyn Any) -> Option<Self> {
        if let Some(res) = err.downcast_ref::<Response>() {
            return res.is_error().then(|| res.clone());
        }
        err.downcast_ref::<ErrorResponse>().cloned().map(Self::from)
    }
}

macro_rules! error_constructors {
    ($($(#[$doc:meta])* $name:ident => $status:ident;)*) => {
        impl Response {
            $(
                $(#[$doc])*
                pub fn $name<E: fmt::Display + 'static>(err: E) -> Self {
                    Self::error(Status::$status, err)
                }
            )*
        }
    };
}

error_constructors! {
    /// `400 Bad Request`
    bad_request => BadRequest;
    /// `401 Unauthorized`
    unauthorized => Unauthorized;
    /// `403 Forbidden`
    forbidden => Forbidden;
    /// `404 Not Found`
    not_found => NotFound;
    /// `405 Method Not Allowed`
    method_not_allowed => MethodNotAllowed;
    /// `406 Not Acceptable`
    not_acceptable => NotAcceptable;
    /// `407 Proxy Authentication Required`
    proxy_authentication_required => ProxyAuthenticationRequired;
    /// `408 Request Timeout`
    request_timeout => RequestTimeout;
    /// `409 Conflict`
    conflict => Conflict;
    /// `410 Gone`
    gone => Gone;
    /// `411 Length Required`
    length_required => LengthRequired;
    /// `412 Precondition Failed`
    precondition_failed => PreconditionFailed;
    /// `413 Request Entity Too Large`
    request_entity_too_large => ContentTooLarge;
    /// `414 Request URI Too Long`
    request_uri_too_long => UriTooLong;
    /// `415 Unsupported Media Type`
    unsupported_media_type => UnsupportedMediaType;
    /// `416 Requested Range Not Satisfiable`
    requested_range_not_satisfiable => RangeNotSatisfiable;
    /// `417 Expectation Failed`
    expectation_failed => ExpectationFailed;
    /// `500 Internal Server Error`
    internal_server_error => InternalServerError;
    /// `501 Not Implemented`
    not_implemented => NotImplemented;
    /// `502 Bad Gateway`
    bad_gateway => BadGateway;
    /// `503 Service Unavailable`
    service_unavailable => ServiceUnavailable;
    /// `504 Gateway Timeout`
    gateway_timeout => GatewayTimeout;
    /// `505 HTTP Version Not Supported`
    http_version_not_supported => HttpVersionNotSupported;
}

impl From<ErrorResponse> for Response {
    fn from(problem: ErrorResponse) -> Self {
        Self { status: problem.status, headers: Vec::new(), kind: Kind::Error(problem) }
    }
}

/// Errors print their detail; other responses their status line.
impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            Kind::Error(problem) => f.write_str(&problem.detail),
            _ => write!(f, "{} {}", self.status, crate::status::reason_phrase(self.status)),
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| {
        warn!("response is not encodable as JSON: {e}");
        "{}".to_owned()
    })
}

// ── IntoResponse ──────────────────────────────────────────────────────────────

/// Conversion into a [`Response`].
///
/// Handlers may return anything implementing it. `Result` is covered, so
/// `?` works inside handlers whose error type is a response too:
///
/// ```rust
/// use restful::{Request, Response};
///
/// async fn create(req: Request) -> Result<Response, restful::Error> {
///     let title: String = req.body()?;
///     Ok(Response::created(title))
/// }
/// ```
pub trait IntoResponse {
    fn into_response(self) -> Response;
}

impl IntoResponse for Response {
    fn into_response(self) -> Response { self }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response { self.into() }
}

impl<T: IntoResponse, E: IntoResponse> IntoResponse for Result<T, E> {
    fn into_response(self) -> Response {
        match self {
            Ok(res) => res.into_response(),
            Err(err) => err.into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use serde::Serialize;

    use super::*;

    const NOT_FOUND_JSON: &str = concat!(
        r#"{"type":"http://www.w3.org/Protocols/rfc2616/rfc2616-sec10.html","#,
        r#""title":"Not Found","detail":"missing entity","status":404}"#,
    );
    const NOT_FOUND_XML: &str = concat!(
        "<response><type>http://www.w3.org/Protocols/rfc2616/rfc2616-sec10.html</type>",
        "<title>Not Found</title><detail>missing entity</detail><status>404</status></response>",
    );

    #[derive(Serialize)]
    struct Article {
        id: u32,
        title: &'static str,
    }

    #[test]
    fn sequence_payload() {
        let res = Response::ok(vec!["test", "test"]);
        assert_eq!(res.render_json(), r#"{"data":["test","test"]}"#);
        assert_eq!(res.render_xml(), "<response><data>test</data><data>test</data></response>");
    }

    #[test]
    fn empty_payload() {
        let res = Response::ok(());
        assert_eq!(res.render_json(), r#"{"data":null}"#);
        assert_eq!(res.render_xml(), "<response></response>");
    }

    #[test]
    fn struct_payload_keeps_field_order() {
        let res = Response::created(Article { id: 1, title: "lorem-ipsum" });
        assert_eq!(res.status(), 201);
        assert_eq!(res.render_json(), r#"{"data":{"id":1,"title":"lorem-ipsum"}}"#);
        assert_eq!(
            res.render_xml(),
            "<response><data><id>1</id><title>lorem-ipsum</title></data></response>"
        );
    }

    #[test]
    fn error_envelope() {
        let res = Response::not_found("missing entity");
        assert_eq!(res.status(), 404);
        assert_eq!(res.render_json(), NOT_FOUND_JSON);
        assert_eq!(res.render_xml(), NOT_FOUND_XML);
    }

    #[test]
    fn error_detail_override() {
        let res = Response::error_with(Status::NotFound, "missing entity", "not-found-test");
        assert_eq!(res.as_error().map(ErrorResponse::detail), Some("not-found-test"));
        assert!(res.render_json().contains(r#""detail":"not-found-test""#));
    }

    #[test]
    fn wrapping_an_error_response_is_idempotent() {
        let once = Response::not_found("missing entity");
        assert_eq!(Response::not_found(once.clone()), once);

        // Original status survives a different family constructor too.
        let forbidden = ErrorResponse::new(Status::Forbidden, "nope");
        let res = Response::bad_request(forbidden.clone());
        assert_eq!(res.status(), 403);
        assert_eq!(res.as_error(), Some(&forbidden));
    }

    #[test]
    fn data_responses_are_not_treated_as_errors() {
        let res = Response::bad_request(Response::ok(1));
        assert_eq!(res.status(), 400);
        assert_eq!(res.as_error().map(ErrorResponse::detail), Some("200 OK"));
    }

    #[test]
    fn headers_do_not_change_status() {
        let res = Response::not_found("missing entity")
            .with_header("a", "b")
            .with_header("A", "c");
        assert_eq!(res.status(), 404);
        assert_eq!(res.header("a"), Some("c"));
        assert_eq!(res.headers().len(), 1);
    }

    #[test]
    fn redirect_has_location_and_no_body() {
        let res = Response::see_other("/elsewhere");
        assert_eq!(res.status(), 303);
        assert_eq!(res.header("location"), Some("/elsewhere"));
        assert_eq!(res.render_json(), "");
        assert_eq!(res.render_xml(), "");
    }

    #[test]
    fn unencodable_payload_degrades() {
        let mut map = HashMap::new();
        map.insert(vec![1u8], 1);
        let res = Response::ok(map);
        assert_eq!(res.status(), 200);
        assert_eq!(res.render_json(), "{}");
        assert_eq!(res.render_xml(), "");
    }

    #[test]
    fn non_finite_floats_degrade() {
        let res = Response::ok(f64::NAN);
        assert_eq!(res.render_json(), "{}");
        assert_eq!(res.render_xml(), "");

        let res = Response::ok((1.0, f64::INFINITY));
        assert_eq!(res.render_json(), "{}");
    }

    #[test]
    fn xml_only_failure_degrades_xml_only() {
        let res = Response::ok(serde_json::json!({ "bad key": 1 }));
        assert_eq!(res.render_json(), r#"{"data":{"bad key":1}}"#);
        assert_eq!(res.render_xml(), "");
    }

    #[test]
    fn negotiation() {
        assert_eq!(Format::negotiate(Some("application/xml")), Format::Xml);
        assert_eq!(Format::negotiate(Some("Application/XML; charset=utf-8")), Format::Xml);
        assert_eq!(Format::negotiate(Some("text/html")), Format::Json);
        assert_eq!(Format::negotiate(None), Format::Json);
        assert_eq!(Format::from_content_type(Some("text/plain")), None);
    }

    #[test]
    fn into_http_applies_headers_and_omits_bodiless() {
        let res = Response::ok(1).with_header("x-request-id", "42").into_http(Format::Xml);
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.headers()[CONTENT_TYPE], "application/xml");
        assert_eq!(res.headers()["x-request-id"], "42");

        let res = Response::no_content().into_http(Format::Json);
        assert_eq!(res.status(), StatusCode::NO_CONTENT);
    }
}
