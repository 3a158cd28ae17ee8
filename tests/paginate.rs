mod common;

use common::send;
use restful::middleware::{Page, paginate};
use restful::{Request, Response, Router};

async fn page(req: Request) -> Response {
    match req.context().get::<Page>() {
        Some(page) => Response::ok(*page),
        None => Response::internal_server_error("no page bound"),
    }
}

fn app() -> Router {
    Router::new().with(paginate(30, 0), |r| r.get("/articles", page))
}

#[tokio::test]
async fn binds_query_values() {
    let res = send(&app(), "GET", "/articles?take=12&skip=3").await;
    assert_eq!(res.status, 200);
    assert_eq!(res.body, r#"{"data":{"take":12,"skip":3}}"#);
}

#[tokio::test]
async fn falls_back_to_defaults() {
    let res = send(&app(), "GET", "/articles").await;
    assert_eq!(res.body, r#"{"data":{"take":30,"skip":0}}"#);

    let res = send(&app(), "GET", "/articles?skip=5").await;
    assert_eq!(res.body, r#"{"data":{"take":30,"skip":5}}"#);
}

#[tokio::test]
async fn rejects_bad_windows() {
    let cases = [
        ("take=0", "param 'take' should be greater than 0"),
        ("take=-1", "param 'take' should be greater than 0"),
        ("skip=-1", "param 'skip' should not be negative"),
    ];
    for (query, detail) in cases {
        let res = send(&app(), "GET", &format!("/articles?{query}")).await;
        assert_eq!(res.status, 400, "{query}");
        assert_eq!(res.json()["detail"], detail, "{query}");
    }

    for (query, name) in [("take=a", "take"), ("skip=x", "skip")] {
        let res = send(&app(), "GET", &format!("/articles?{query}")).await;
        assert_eq!(res.status, 400, "{query}");
        let detail = res.json()["detail"].as_str().unwrap().to_owned();
        assert!(detail.starts_with(&format!("param '{name}' is not a number")), "{detail}");
    }
}
