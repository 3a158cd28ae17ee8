//! Handler and middleware traits, type erasure, and the two dispatch adapters.
//!
//! # Shapes
//!
//! ```text
//! async fn action(req: Request) -> impl IntoResponse                 ← Handler
//! async fn layer(req: Request) -> Result<Context, Response>          ← Middleware
//! ```
//!
//! A middleware either returns the context the rest of the chain should see
//! (`Ok`) or a response that ends the request right there (`Err`). Nothing
//! downstream runs after an `Err`.
//!
//! # How they are stored
//!
//! The router holds handlers of many concrete types in one tree, so each is
//! boxed behind [`ErasedHandler`]. At registration time the router folds its
//! current middleware stack around the boxed handler:
//!
//! ```text
//! Layered { a, Layered { b, FnHandler(action) } }   ← router.middleware(a).middleware(b)
//! ```
//!
//! Per request that costs one `Arc` clone plus one virtual call per stage.
//! Rendering (content negotiation, headers) happens once, after the whole
//! chain has produced its [`Response`].

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tracing::debug;

use crate::context::Context;
use crate::request::Request;
use crate::response::{IntoResponse, Response};

// ── Internal types ────────────────────────────────────────────────────────────

/// A heap-allocated, type-erased future.
///
/// `Send + 'static` lets tokio move it across worker threads.
pub(crate) type BoxFuture<T = Response> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

/// Internal dispatch interface for handlers.
///
/// `#[doc(hidden)] pub` rather than `pub(crate)` because it appears in the
/// signature of the public [`Handler`] trait.
#[doc(hidden)]
pub trait ErasedHandler {
    fn call(&self, req: Request) -> BoxFuture;
}

#[doc(hidden)]
pub type BoxedHandler = Arc<dyn ErasedHandler + Send + Sync + 'static>;

/// Internal dispatch interface for middleware.
#[doc(hidden)]
pub trait ErasedMiddleware {
    fn call(&self, req: Request) -> BoxFuture<Result<Context, Response>>;
}

#[doc(hidden)]
pub type BoxedMiddleware = Arc<dyn ErasedMiddleware + Send + Sync + 'static>;

// ── Public traits ─────────────────────────────────────────────────────────────

/// Implemented for every valid route handler.
///
/// Automatically satisfied by any `async fn` (or closure returning a future)
/// with the signature:
///
/// ```text
/// async fn name(req: Request) -> impl IntoResponse
/// ```
///
/// Sealed: only the blanket impl below can satisfy it.
pub trait Handler: private::SealedHandler + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler;
}

/// Implemented for every valid middleware.
///
/// ```text
/// async fn name(req: Request) -> Result<Context, Response>
/// ```
///
/// Derive the returned context from `req.context()` so earlier bindings stay
/// visible downstream:
///
/// ```rust
/// use restful::{Context, Request, Response};
///
/// struct ApiKey(String);
///
/// async fn require_key(req: Request) -> Result<Context, Response> {
///     match req.header("x-api-key") {
///         Some(key) => Ok(req.context().with(ApiKey(key.to_owned()))),
///         None => Err(Response::unauthorized("missing x-api-key header")),
///     }
/// }
/// ```
pub trait Middleware: private::SealedMiddleware + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_middleware(self) -> BoxedMiddleware;
}

mod private {
    pub trait SealedHandler {}
    pub trait SealedMiddleware {}
}

// ── Blanket implementations ───────────────────────────────────────────────────

impl<F, Fut, R> private::SealedHandler for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
}

impl<F, Fut, R> Handler for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(FnHandler(self))
    }
}

impl<F, Fut> private::SealedMiddleware for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Context, Response>> + Send + 'static,
{
}

impl<F, Fut> Middleware for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Context, Response>> + Send + 'static,
{
    fn into_boxed_middleware(self) -> BoxedMiddleware {
        Arc::new(FnMiddleware(self))
    }
}

// ── Concrete wrappers ─────────────────────────────────────────────────────────

/// Action adapter: runs the handler and normalises its output to a [`Response`].
struct FnHandler<F>(F);

impl<F, Fut, R> ErasedHandler for FnHandler<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn call(&self, req: Request) -> BoxFuture {
        let fut = (self.0)(req);
        Box::pin(async move { fut.await.into_response() })
    }
}

struct FnMiddleware<F>(F);

impl<F, Fut> ErasedMiddleware for FnMiddleware<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Context, Response>> + Send + 'static,
{
    fn call(&self, req: Request) -> BoxFuture<Result<Context, Response>> {
        Box::pin((self.0)(req))
    }
}

/// Context adapter: one middleware in front of the rest of the chain.
struct Layered {
    middleware: BoxedMiddleware,
    next: BoxedHandler,
}

impl ErasedHandler for Layered {
    fn call(&self, req: Request) -> BoxFuture {
        let verdict = self.middleware.call(req.clone());
        let next = Arc::clone(&self.next);
        Box::pin(async move {
            match verdict.await {
                Ok(context) => next.call(req.with_context(context)).await,
                Err(res) => {
                    debug!(path = req.path(), status = res.status(), "middleware short-circuited");
                    res
                }
            }
        })
    }
}

/// Wraps `endpoint` in `stack`, first middleware outermost.
pub(crate) fn layer(stack: &[BoxedMiddleware], endpoint: BoxedHandler) -> BoxedHandler {
    stack.iter().rev().fold(endpoint, |next, middleware| {
        Arc::new(Layered { middleware: Arc::clone(middleware), next }) as BoxedHandler
    })
}
