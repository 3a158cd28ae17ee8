//! CRUD route generator.
//!
//! Implement [`Crud`] for a data-access type and [`resource`] turns it into a
//! router with the five standard REST endpoints:
//!
//! | route | contract | reply |
//! |---|---|---|
//! | `GET /` | [`Crud::find`] | `200` collection |
//! | `POST /` | body → [`Crud::create`] | `201` created entity |
//! | `GET /{id}` | [`Crud::find_one`] | `200` entity |
//! | `PUT /{id}`, `PATCH /{id}` | [`Crud::find_one`], body → [`Crud::update`] | `200` updated entity |
//! | `DELETE /{id}` | [`Crud::find_one`] → [`Crud::delete`] | `204` |
//!
//! The `/{id}` routes share one middleware that resolves the entity first; an
//! id it cannot resolve ends the request with `404` before any handler runs.
//!
//! # Errors
//!
//! A contract error that already is an error response ([`ErrorResponse`] or
//! an error [`Response`]) is sent as-is, status included. Any other error,
//! and any body that fails to decode or validate, becomes `400 Bad Request`.
//!
//! [`ErrorResponse`]: crate::ErrorResponse
//!
//! ```rust,no_run
//! use restful::crud::{Crud, resource};
//! use restful::{ErrorResponse, Router, Status};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Clone, Serialize)]
//! struct Article { id: u32, title: String }
//!
//! #[derive(Deserialize, Serialize)]
//! struct ArticleInput { title: String }
//!
//! struct Articles;
//!
//! impl Crud for Articles {
//!     type Entity = Article;
//!     type Create = ArticleInput;
//!     type Update = ArticleInput;
//!     type Error = ErrorResponse;
//!
//!     async fn find_one(&self, id: &str) -> Result<Article, ErrorResponse> {
//!         match id {
//!             "1" => Ok(Article { id: 1, title: "lorem-ipsum".into() }),
//!             _ => Err(ErrorResponse::new(Status::NotFound, "no such article")),
//!         }
//!     }
//!     async fn find(&self) -> Result<Vec<Article>, ErrorResponse> { Ok(Vec::new()) }
//!     async fn create(&self, input: ArticleInput) -> Result<Article, ErrorResponse> {
//!         Ok(Article { id: 2, title: input.title })
//!     }
//!     async fn update(&self, mut article: Article, input: ArticleInput) -> Result<Article, ErrorResponse> {
//!         article.title = input.title;
//!         Ok(article)
//!     }
//!     async fn delete(&self, _article: Article) -> Result<(), ErrorResponse> { Ok(()) }
//! }
//!
//! let app = Router::new().mount("/articles", resource(Articles));
//! ```

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::context::Context;
use crate::handler::{Handler, Middleware};
use crate::request::Request;
use crate::response::Response;
use crate::router::Router;

/// Data-access contract driven by [`resource`].
pub trait Crud: Send + Sync + 'static {
    /// Stored entity, as rendered in replies.
    type Entity: Serialize + Clone + Send + Sync + 'static;
    /// Body accepted by `POST /`.
    type Create: DeserializeOwned + Serialize + Send + 'static;
    /// Body accepted by `PUT /{id}` and `PATCH /{id}`.
    type Update: DeserializeOwned + Serialize + Send + 'static;
    type Error: fmt::Display + Send + 'static;

    fn find_one(&self, id: &str) -> impl Future<Output = Result<Self::Entity, Self::Error>> + Send;

    fn find(&self) -> impl Future<Output = Result<Vec<Self::Entity>, Self::Error>> + Send;

    fn create(&self, payload: Self::Create) -> impl Future<Output = Result<Self::Entity, Self::Error>> + Send;

    /// Applies `payload` to the entity resolved from the path.
    fn update(
        &self,
        entity: Self::Entity,
        payload: Self::Update,
    ) -> impl Future<Output = Result<Self::Entity, Self::Error>> + Send;

    fn delete(&self, entity: Self::Entity) -> impl Future<Output = Result<(), Self::Error>> + Send;
}

/// The entity resolved for `/{id}` routes.
struct Found<T>(T);

/// Builds the five REST routes for `service`. Mount the result wherever the
/// collection should live.
pub fn resource<C: Crud>(service: C) -> Router {
    let service = Arc::new(service);

    Router::new()
        .get("/", find_all(Arc::clone(&service)))
        .post("/", create(Arc::clone(&service)))
        .route("/{id}", |r| {
            r.middleware(resolve(Arc::clone(&service)))
                .get("/", find_one::<C>)
                .put("/", update(Arc::clone(&service)))
                .patch("/", update(Arc::clone(&service)))
                .delete("/", delete(service))
        })
}

fn find_all<C: Crud>(service: Arc<C>) -> impl Handler {
    move |_req: Request| {
        let service = Arc::clone(&service);
        async move {
            match service.find().await {
                Ok(all) => Response::ok(all),
                Err(err) => Response::bad_request(err),
            }
        }
    }
}

fn create<C: Crud>(service: Arc<C>) -> impl Handler {
    move |req: Request| {
        let service = Arc::clone(&service);
        async move {
            let payload = match req.body::<C::Create>() {
                Ok(payload) => payload,
                Err(err) => return Response::bad_request(err),
            };
            match service.create(payload).await {
                Ok(created) => Response::created(created),
                Err(err) => Response::bad_request(err),
            }
        }
    }
}

async fn find_one<C: Crud>(req: Request) -> Response {
    match found::<C>(&req) {
        Some(entity) => Response::ok(entity),
        None => Response::not_found("entity not found"),
    }
}

/// Shared by `PUT` and `PATCH`.
fn update<C: Crud>(service: Arc<C>) -> impl Handler {
    move |req: Request| {
        let service = Arc::clone(&service);
        async move {
            let Some(entity) = found::<C>(&req).cloned() else {
                return Response::not_found("entity not found");
            };
            let payload = match req.body::<C::Update>() {
                Ok(payload) => payload,
                Err(err) => return Response::bad_request(err),
            };
            match service.update(entity, payload).await {
                Ok(updated) => Response::ok(updated),
                Err(err) => Response::bad_request(err),
            }
        }
    }
}

fn delete<C: Crud>(service: Arc<C>) -> impl Handler {
    move |req: Request| {
        let service = Arc::clone(&service);
        async move {
            let Some(entity) = found::<C>(&req).cloned() else {
                return Response::not_found("entity not found");
            };
            match service.delete(entity).await {
                Ok(()) => Response::no_content(),
                Err(err) => Response::bad_request(err),
            }
        }
    }
}

/// Looks up `{id}` and binds the entity, or ends the request with `404`.
fn resolve<C: Crud>(service: Arc<C>) -> impl Middleware {
    move |req: Request| {
        let service = Arc::clone(&service);
        async move {
            match service.find_one(req.param("id")).await {
                Ok(entity) => Ok::<Context, Response>(req.context().with(Found(entity))),
                Err(err) => Err(Response::not_found(err)),
            }
        }
    }
}

fn found<C: Crud>(req: &Request) -> Option<&C::Entity> {
    req.context().get::<Found<C::Entity>>().map(|f| &f.0)
}
