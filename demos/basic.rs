//! In-memory article store served as a REST resource.
//!
//! ```text
//! RUST_LOG=debug cargo run --example basic
//!
//! curl -s localhost:3000/articles
//! curl -s -XPOST -H 'content-type: application/json' -d '{"title":"hello"}' localhost:3000/articles
//! curl -s -H 'content-type: application/xml' localhost:3000/articles/1
//! curl -s 'localhost:3000/search?take=5&skip=0'
//! ```

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use restful::crud::resource;
use restful::middleware::{Page, paginate};
use restful::{Crud, ErrorResponse, Request, Response, Router, SchemaValidator, Server, Status};
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Clone, Serialize)]
struct Article {
    id: u64,
    title: String,
}

#[derive(Deserialize, Serialize)]
struct ArticleInput {
    title: String,
}

#[derive(Default)]
struct Articles {
    next: AtomicU64,
    rows: Mutex<BTreeMap<u64, Article>>,
}

impl Articles {
    fn rows(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<u64, Article>>, ErrorResponse> {
        self.rows
            .lock()
            .map_err(|_| ErrorResponse::new(Status::InternalServerError, "store poisoned"))
    }
}

impl Crud for Articles {
    type Entity = Article;
    type Create = ArticleInput;
    type Update = ArticleInput;
    type Error = ErrorResponse;

    async fn find_one(&self, id: &str) -> Result<Article, ErrorResponse> {
        let missing = || ErrorResponse::new(Status::NotFound, format!("article {id} not found"));
        let id: u64 = id.parse().map_err(|_| missing())?;
        self.rows()?.get(&id).cloned().ok_or_else(missing)
    }

    async fn find(&self) -> Result<Vec<Article>, ErrorResponse> {
        Ok(self.rows()?.values().cloned().collect())
    }

    async fn create(&self, input: ArticleInput) -> Result<Article, ErrorResponse> {
        let id = self.next.fetch_add(1, Ordering::Relaxed) + 1;
        let article = Article { id, title: input.title };
        self.rows()?.insert(id, article.clone());
        Ok(article)
    }

    async fn update(&self, mut article: Article, input: ArticleInput) -> Result<Article, ErrorResponse> {
        article.title = input.title;
        self.rows()?.insert(article.id, article.clone());
        Ok(article)
    }

    async fn delete(&self, article: Article) -> Result<(), ErrorResponse> {
        self.rows()?.remove(&article.id);
        Ok(())
    }
}

async fn search(req: Request) -> Response {
    let page = req.context().get::<Page>().copied().unwrap_or_default();
    Response::ok(page)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let schema = json!({
        "type": "object",
        "properties": { "title": { "type": "string", "minLength": 1 } },
        "required": ["title"]
    });

    let app = Router::new()
        .validator(SchemaValidator::new(&schema)?)
        .mount("/articles", resource(Articles::default()))
        .with(paginate(30, 0), |r| r.get("/search", search));

    Server::bind("0.0.0.0:3000")?.serve(app).await?;
    Ok(())
}
