//! Built-in middleware.
//!
//! Middleware here follows the crate-wide shape: an async function of the
//! [`Request`](crate::Request) returning either the extended
//! [`Context`](crate::Context) or a terminal [`Response`](crate::Response).
//!
//! - [`paginate`]: parses `take`/`skip` query parameters into a [`Page`]

mod paginate;

pub use paginate::{Page, PageError, paginate};
