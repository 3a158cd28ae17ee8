//! Composable request router.
//!
//! One radix tree per HTTP method plus one tree of mount points, all backed by
//! [`matchit`]. Registration is where the composition happens: every route is
//! stored already wrapped in the middleware stack that was active when it was
//! registered, so request time is a lookup followed by a call.
//!
//! ```rust
//! use restful::{Context, Request, Response, Router};
//!
//! struct Admin;
//!
//! async fn admin_only(req: Request) -> Result<Context, Response> {
//!     match req.header("x-role") {
//!         Some("admin") => Ok(req.context().with(Admin)),
//!         _ => Err(Response::forbidden("admins only")),
//!     }
//! }
//!
//! async fn list(_req: Request) -> Response { Response::ok(["a", "b"]) }
//! async fn purge(_req: Request) -> Response { Response::no_content() }
//! async fn show(req: Request) -> Response { Response::ok(req.param("id")) }
//!
//! let app = Router::new()
//!     .get("/items", list)
//!     .with(admin_only, |r| r.delete("/items", purge))
//!     .route("/items/{id}", |r| r.get("/", show));
//! ```

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http_body_util::Full;
use matchit::Router as MatchitRouter;
use tracing::debug;

use crate::handler::{BoxFuture, BoxedHandler, BoxedMiddleware, ErasedHandler, Handler, Middleware, layer};
use crate::method::Method;
use crate::request::Request;
use crate::response::{Format, Response};
use crate::validate::Validator;

/// The application router.
///
/// Built once at startup by chaining registrations, then handed to
/// [`Server::serve`](crate::Server::serve) or driven directly through
/// [`Router::handle`].
///
/// # Scoping
///
/// - [`middleware`](Router::middleware) appends to this router's stack; it
///   applies to everything registered *after* the call.
/// - [`with`](Router::with) and [`group`](Router::group) run a closure with an
///   extended copy of the stack; when the closure returns, the stack is
///   exactly what it was before.
/// - [`route`](Router::route) builds an independent sub-router and mounts it;
///   the parent's current stack wraps the whole mount.
///
/// # Panics
///
/// Registration panics on a malformed or conflicting pattern, so a broken
/// route table fails at startup rather than at request time.
pub struct Router {
    routes: HashMap<Method, MatchitRouter<BoxedHandler>>,
    mounts: MatchitRouter<BoxedHandler>,
    stack: Vec<BoxedMiddleware>,
    validator: Option<Arc<dyn Validator>>,
}

impl Router {
    pub fn new() -> Self {
        Self {
            routes: HashMap::new(),
            mounts: MatchitRouter::new(),
            stack: Vec::new(),
            validator: None,
        }
    }

    /// Installs the validator that [`Request::body`] runs after decoding.
    ///
    /// Only the router that receives the raw request (the one passed to the
    /// server, or the one [`handle`](Router::handle) is called on) builds
    /// requests, so only its validator is used.
    pub fn validator(mut self, validator: impl Validator) -> Self {
        self.validator = Some(Arc::new(validator));
        self
    }

    // ── Middleware scoping ───────────────────────────────────────────────────

    /// Appends `middleware` to this router's stack.
    pub fn middleware(mut self, middleware: impl Middleware) -> Self {
        self.stack.push(middleware.into_boxed_middleware());
        self
    }

    /// Registers the routes built by `scope` behind one extra middleware,
    /// without changing the stack seen by later registrations.
    pub fn with(mut self, middleware: impl Middleware, scope: impl FnOnce(Router) -> Router) -> Self {
        let saved = self.stack.clone();
        self.stack.push(middleware.into_boxed_middleware());
        let mut router = scope(self);
        router.stack = saved;
        router
    }

    /// Like [`with`](Router::with) but without an extra middleware: a block in
    /// which [`middleware`](Router::middleware) calls stay local.
    pub fn group(self, scope: impl FnOnce(Router) -> Router) -> Self {
        let saved = self.stack.clone();
        let mut router = scope(self);
        router.stack = saved;
        router
    }

    /// Builds a fresh sub-router with `build` and mounts it at `pattern`.
    pub fn route(self, pattern: &str, build: impl FnOnce(Router) -> Router) -> Self {
        self.mount(pattern, build(Router::new()))
    }

    // ── Mounting ─────────────────────────────────────────────────────────────

    /// Attaches `router` below `pattern`.
    ///
    /// `/items` and `/items/` both reach the sub-router's `/`; `/items/x`
    /// reaches its `/x`. Parameters captured by `pattern` are visible to the
    /// sub-router's handlers.
    pub fn mount(self, pattern: &str, router: Router) -> Self {
        self.attach(pattern, Arc::new(router))
    }

    /// Attaches a single handler below `pattern`, for every method and every
    /// sub-path.
    pub fn mount_handler(self, pattern: &str, handler: impl Handler) -> Self {
        self.attach(pattern, handler.into_boxed_handler())
    }

    fn attach(mut self, pattern: &str, target: BoxedHandler) -> Self {
        let prefix = mount_prefix(pattern);
        let endpoint = layer(&self.stack, target);
        self.mounts
            .insert(prefix, endpoint)
            .unwrap_or_else(|e| panic!("invalid mount `{pattern}`: {e}"));
        debug!(pattern = prefix, "router mounted");
        self
    }

    // ── Method registration ──────────────────────────────────────────────────

    /// Registers a handler for a method + pattern pair. Patterns use
    /// `{name}` parameters, read back with [`Request::param`].
    pub fn on(mut self, method: Method, pattern: &str, handler: impl Handler) -> Self {
        let endpoint = layer(&self.stack, handler.into_boxed_handler());
        self.routes
            .entry(method)
            .or_default()
            .insert(pattern, endpoint)
            .unwrap_or_else(|e| panic!("invalid route `{method} {pattern}`: {e}"));
        debug!(%method, pattern, middleware = self.stack.len(), "route registered");
        self
    }

    pub fn connect(self, pattern: &str, handler: impl Handler) -> Self { self.on(Method::Connect, pattern, handler) }
    pub fn delete(self, pattern: &str, handler: impl Handler) -> Self { self.on(Method::Delete, pattern, handler) }
    pub fn get(self, pattern: &str, handler: impl Handler) -> Self { self.on(Method::Get, pattern, handler) }
    pub fn head(self, pattern: &str, handler: impl Handler) -> Self { self.on(Method::Head, pattern, handler) }
    pub fn options(self, pattern: &str, handler: impl Handler) -> Self { self.on(Method::Options, pattern, handler) }
    pub fn patch(self, pattern: &str, handler: impl Handler) -> Self { self.on(Method::Patch, pattern, handler) }
    pub fn post(self, pattern: &str, handler: impl Handler) -> Self { self.on(Method::Post, pattern, handler) }
    pub fn put(self, pattern: &str, handler: impl Handler) -> Self { self.on(Method::Put, pattern, handler) }
    pub fn trace(self, pattern: &str, handler: impl Handler) -> Self { self.on(Method::Trace, pattern, handler) }

    // ── Dispatch ─────────────────────────────────────────────────────────────

    /// Routes one request and renders the reply.
    ///
    /// The reply format follows the request's `content-type`: XML for
    /// `application/xml`, JSON for everything else.
    pub async fn handle(&self, req: http::Request<Bytes>) -> http::Response<Full<Bytes>> {
        let format = Format::negotiate(req.headers().get(CONTENT_TYPE).and_then(|v| v.to_str().ok()));
        let method = req.method().clone();
        let path = req.uri().path().to_owned();
        let started = Instant::now();

        let response = self.call(Request::new(req, self.validator.clone())).await;

        debug!(
            %method,
            path,
            status = response.status(),
            elapsed_us = started.elapsed().as_micros() as u64,
            "request handled"
        );
        response.into_http(format)
    }

    fn allowed(&self, path: &str) -> Vec<Method> {
        let mut allowed: Vec<Method> = self.routes.iter()
            .filter(|(_, tree)| tree.at(path).is_ok())
            .map(|(method, _)| *method)
            .collect();
        allowed.sort();
        allowed
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}

/// A mounted router dispatches on the path left below its mount point.
impl ErasedHandler for Router {
    fn call(&self, req: Request) -> BoxFuture {
        let path = req.route_path().to_owned();

        let route = Method::try_from(req.method())
            .ok()
            .and_then(|method| self.routes.get(&method))
            .and_then(|tree| tree.at(&path).ok());
        let mount = mount_candidates(&path)
            .find_map(|(prefix, rest)| self.mounts.at(prefix).ok().map(|m| (prefix, rest, m)));

        // A static mount point outranks a parameterised route.
        let mount_wins = match (&route, &mount) {
            (Some(route), Some((prefix, _, mount))) => {
                !route.params.is_empty() && mount.params.is_empty() && *prefix != "/"
            }
            _ => false,
        };

        if !mount_wins {
            if let Some(matched) = route {
                let req = req.with_params(matched.params.iter());
                return matched.value.call(req);
            }
        }

        if let Some((_, rest, matched)) = mount {
            let req = req.with_params(matched.params.iter()).with_route_path(rest);
            return matched.value.call(req);
        }

        let allowed = self.allowed(&path);
        let response = if allowed.is_empty() {
            Response::not_found(format!("no route for {path}"))
        } else {
            let allow = allowed.iter().map(|m| m.as_str()).collect::<Vec<_>>().join(", ");
            Response::method_not_allowed(format!("{} is not allowed on {path}", req.method()))
                .with_header("allow", allow)
        };
        Box::pin(async move { response })
    }
}

/// `/items/` and `/items` mount at the same point; `/` mounts at the root.
fn mount_prefix(pattern: &str) -> &str {
    match pattern.trim_end_matches('/') {
        "" => "/",
        prefix => prefix,
    }
}

/// Splits `path` at each `/` boundary, longest prefix first, yielding the
/// prefix to look up and the sub-path the mounted router should see.
fn mount_candidates(path: &str) -> impl Iterator<Item = (&str, &str)> {
    let mut end = Some(path.len());
    std::iter::from_fn(move || {
        let cut = end?;
        end = if cut == 0 { None } else { path[..cut].rfind('/') };
        let (prefix, rest) = path.split_at(cut);
        let prefix = if prefix.is_empty() { "/" } else { prefix };
        let rest = if rest.is_empty() { "/" } else { rest };
        Some((prefix, rest))
    })
}
