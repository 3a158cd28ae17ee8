//! # restful
//!
//! A thin REST layer over a hyper + [`matchit`] router.
//!
//! ## What it adds
//!
//! - **One reply shape.** Every [`Response`] renders as a `{"data": ..}`
//!   envelope or an error document with `type`, `title`, `detail` and
//!   `status` fields, in JSON or XML depending on the request's
//!   `content-type`.
//! - **Typed context.** [`Middleware`] returns either the [`Context`] the rest
//!   of the chain sees or a [`Response`] that ends the request.
//! - **Composable routing.** [`Router`] scopes middleware with `with` and
//!   `group`, nests sub-routers with `route` and `mount`.
//! - **CRUD in one call.** [`crud::resource`] turns a [`Crud`] implementation
//!   into five REST endpoints.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use restful::middleware::{Page, paginate};
//! use restful::{Request, Response, Router, Server};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), restful::Error> {
//!     let app = Router::new()
//!         .get("/users/{id}", get_user)
//!         .with(paginate(30, 0), |r| r.get("/users", list_users));
//!
//!     Server::bind("0.0.0.0:3000")?.serve(app).await
//! }
//!
//! async fn get_user(req: Request) -> Response {
//!     Response::ok(req.param("id"))
//! }
//!
//! async fn list_users(req: Request) -> Response {
//!     let page = req.context().get::<Page>().copied().unwrap_or_default();
//!     Response::ok(("lorem", "ipsum", page))
//! }
//! ```

mod context;
mod error;
mod finite;
mod handler;
mod method;
mod request;
mod response;
mod router;
mod server;
mod validate;
mod xml;

pub mod crud;
pub mod middleware;
pub mod status;

pub use context::Context;
pub use crud::Crud;
pub use error::Error;
pub use handler::{Handler, Middleware};
pub use method::{Method, UnknownMethod};
pub use request::Request;
pub use response::{ErrorResponse, Format, IntoResponse, PROBLEM_TYPE, Response};
pub use router::Router;
pub use server::Server;
pub use status::Status;
pub use validate::{Permissive, SchemaValidator, ValidationError, Validator};
