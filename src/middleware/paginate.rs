//! `take`/`skip` pagination.
//!
//! ```rust
//! use restful::middleware::{Page, paginate};
//! use restful::{Request, Response, Router};
//!
//! async fn list(req: Request) -> Response {
//!     let page = req.context().get::<Page>().copied().unwrap_or_default();
//!     Response::ok(page)
//! }
//!
//! let app = Router::new().with(paginate(30, 0), |r| r.get("/articles", list));
//! ```

use std::num::ParseIntError;

use serde::Serialize;

use crate::context::Context;
use crate::handler::Middleware;
use crate::request::Request;
use crate::response::Response;

/// Pagination window bound into the request context by [`paginate`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub struct Page {
    pub take: i64,
    pub skip: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum PageError {
    #[error("param '{name}' is not a number: {source}")]
    NotANumber {
        name: &'static str,
        #[source]
        source: ParseIntError,
    },

    #[error("param 'take' should be greater than 0")]
    Take,

    #[error("param 'skip' should not be negative")]
    Skip,
}

/// Binds a [`Page`] read from the `take` and `skip` query parameters, falling
/// back to the given defaults when a parameter is absent.
///
/// Responds `400 Bad Request` for non-numeric values, `take <= 0` or
/// `skip < 0`.
pub fn paginate(default_take: i64, default_skip: i64) -> impl Middleware {
    move |req: Request| async move { bind(&req, default_take, default_skip) }
}

fn bind(req: &Request, default_take: i64, default_skip: i64) -> Result<Context, Response> {
    let page = parse(req, default_take, default_skip).map_err(Response::bad_request)?;
    Ok(req.context().with(page))
}

fn parse(req: &Request, default_take: i64, default_skip: i64) -> Result<Page, PageError> {
    let take = number(req, "take", default_take)?;
    let skip = number(req, "skip", default_skip)?;
    if take <= 0 {
        return Err(PageError::Take);
    }
    if skip < 0 {
        return Err(PageError::Skip);
    }
    Ok(Page { take, skip })
}

fn number(req: &Request, name: &'static str, default: i64) -> Result<i64, PageError> {
    req.query_or(name, &default.to_string())
        .parse()
        .map_err(|source| PageError::NotANumber { name, source })
}
