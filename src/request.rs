//! Incoming request view handed to handlers and middleware.

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::{HeaderMap, Method, Uri};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::context::Context;
use crate::error::Error;
use crate::response::Format;
use crate::validate::Validator;

/// A read-only view over one inbound HTTP request.
///
/// Cloning is cheap (a few `Arc` increments): the middleware adapter hands a
/// clone to each middleware and keeps the original for the next stage.
#[derive(Clone)]
pub struct Request {
    head: Arc<Head>,
    params: Arc<HashMap<String, String>>,
    route_path: Arc<str>,
    context: Context,
    validator: Option<Arc<dyn Validator>>,
}

struct Head {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
}

impl Request {
    pub(crate) fn new(req: http::Request<Bytes>, validator: Option<Arc<dyn Validator>>) -> Self {
        let (parts, body) = req.into_parts();
        let route_path: Arc<str> = Arc::from(parts.uri.path());
        Self {
            head: Arc::new(Head {
                method: parts.method,
                uri: parts.uri,
                headers: parts.headers,
                body,
            }),
            params: Arc::default(),
            route_path,
            context: Context::new(),
            validator,
        }
    }

    pub fn method(&self) -> &Method { &self.head.method }
    pub fn uri(&self) -> &Uri { &self.head.uri }
    pub fn path(&self) -> &str { self.head.uri.path() }
    pub fn headers(&self) -> &HeaderMap { &self.head.headers }

    /// Raw body bytes. Empty when the client sent none.
    pub fn raw_body(&self) -> &Bytes { &self.head.body }

    /// Header value, if present and valid UTF-8. Case-insensitive.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.head.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.head.headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok())
    }

    /// Path parameter matched by the route tree, or `""` if there is none.
    ///
    /// For a route `/users/{id}`, `req.param("id")` on `/users/42` is `"42"`.
    /// Parameters captured by enclosing mount points are visible too.
    pub fn param(&self, name: &str) -> &str {
        self.params.get(name).map_or("", String::as_str)
    }

    /// First value of query parameter `name`, or `""` when absent.
    pub fn query(&self, name: &str) -> String {
        self.query_or(name, "")
    }

    /// First value of query parameter `name`, or `default` when absent.
    ///
    /// A parameter that is present but empty (`?take=`) is returned as `""`.
    pub fn query_or(&self, name: &str, default: &str) -> String {
        self.head.uri.query()
            .and_then(|q| {
                url::form_urlencoded::parse(q.as_bytes())
                    .find(|(k, _)| k == name)
                    .map(|(_, v)| v.into_owned())
            })
            .unwrap_or_else(|| default.to_owned())
    }

    /// Decodes the body into `T` according to `content-type`, then runs the
    /// router's validator (if any) against it.
    ///
    /// # Errors
    ///
    /// - [`Error::EmptyBody`] when there is no body.
    /// - [`Error::UnsupportedMediaType`] unless the content type is
    ///   `application/json` or `application/xml`.
    /// - [`Error::Decode`] when the bytes do not decode into `T`.
    /// - [`Error::Validation`] when the validator rejects the value.
    pub fn body<T: DeserializeOwned + Serialize>(&self) -> Result<T, Error> {
        let raw = &self.head.body;
        if raw.is_empty() {
            return Err(Error::EmptyBody);
        }

        let value: T = match Format::from_content_type(self.content_type()) {
            Some(Format::Json) => {
                serde_json::from_slice(raw).map_err(|e| Error::Decode(e.to_string()))?
            }
            Some(Format::Xml) => {
                let text = std::str::from_utf8(raw).map_err(|e| Error::Decode(e.to_string()))?;
                quick_xml::de::from_str(text).map_err(|e| Error::Decode(e.to_string()))?
            }
            None => {
                let declared = self.content_type().unwrap_or_default();
                return Err(Error::UnsupportedMediaType(declared.to_owned()));
            }
        };

        if let Some(validator) = &self.validator {
            let tree = serde_json::to_value(&value).map_err(|e| Error::Decode(e.to_string()))?;
            validator.validate(&tree)?;
        }
        Ok(value)
    }

    /// The propagation context built up by middleware so far.
    pub fn context(&self) -> &Context {
        &self.context
    }

    pub(crate) fn route_path(&self) -> &str {
        &self.route_path
    }

    pub(crate) fn with_context(mut self, context: Context) -> Self {
        self.context = context;
        self
    }

    /// Adds route-matched parameters; inner matches shadow outer ones.
    pub(crate) fn with_params<'a>(mut self, params: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut merged = (*self.params).clone();
        merged.extend(params.into_iter().map(|(k, v)| (k.to_owned(), v.to_owned())));
        self.params = Arc::new(merged);
        self
    }

    /// Re-roots the request below a mount point.
    pub(crate) fn with_route_path(mut self, path: &str) -> Self {
        self.route_path = Arc::from(path);
        self
    }
}
