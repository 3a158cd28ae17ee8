mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use common::{send, send_with};
use restful::{Context, Request, Response, Router, ValidationError};
use serde_json::{Value, json};

struct Who(&'static str);

async fn list(_req: Request) -> Response {
    Response::ok(("a", "b"))
}

async fn who(req: Request) -> Response {
    Response::ok(req.context().get::<Who>().map_or("nobody", |w| w.0))
}

async fn show(req: Request) -> Response {
    Response::ok(req.param("id"))
}

async fn as_admin(req: Request) -> Result<Context, Response> {
    Ok(req.context().with(Who("admin")))
}

async fn as_guest(req: Request) -> Result<Context, Response> {
    Ok(req.context().with(Who("guest")))
}

async fn deny(_req: Request) -> Result<Context, Response> {
    Err(Response::forbidden("keep out"))
}

#[tokio::test]
async fn get_renders_data_envelope() {
    let app = Router::new().get("/items", list);

    let res = send(&app, "GET", "/items").await;
    assert_eq!(res.status, 200);
    assert_eq!(res.header("content-type"), Some("application/json"));
    assert_eq!(res.body, r#"{"data":["a","b"]}"#);
}

#[tokio::test]
async fn every_method_registers() {
    let app = Router::new()
        .connect("/m", list)
        .delete("/m", list)
        .get("/m", list)
        .head("/m", list)
        .options("/m", list)
        .patch("/m", list)
        .post("/m", list)
        .put("/m", list)
        .trace("/m", list);

    for method in ["CONNECT", "DELETE", "GET", "HEAD", "OPTIONS", "PATCH", "POST", "PUT", "TRACE"] {
        assert_eq!(send(&app, method, "/m").await.status, 200, "{method}");
    }
}

#[tokio::test]
async fn with_scopes_middleware_to_its_closure() {
    let app = Router::new()
        .with(as_admin, |r| r.get("/inside", who))
        .get("/outside", who);

    assert_eq!(send(&app, "GET", "/inside").await.body, r#"{"data":"admin"}"#);
    assert_eq!(send(&app, "GET", "/outside").await.body, r#"{"data":"nobody"}"#);
}

#[tokio::test]
async fn group_keeps_middleware_local() {
    let app = Router::new()
        .middleware(as_guest)
        .group(|r| r.middleware(as_admin).get("/grouped", who))
        .get("/plain", who);

    assert_eq!(send(&app, "GET", "/grouped").await.body, r#"{"data":"admin"}"#);
    assert_eq!(send(&app, "GET", "/plain").await.body, r#"{"data":"guest"}"#);
}

#[tokio::test]
async fn later_middleware_sees_earlier_bindings() {
    async fn greet(req: Request) -> Result<Context, Response> {
        let name = req.context().get::<Who>().map_or("nobody", |w| w.0);
        Ok(req.context().with(format!("hello {name}")))
    }
    async fn greeting(req: Request) -> Response {
        Response::ok(req.context().get::<String>())
    }

    let app = Router::new().middleware(as_admin).middleware(greet).get("/", greeting);
    assert_eq!(send(&app, "GET", "/").await.body, r#"{"data":"hello admin"}"#);
}

#[tokio::test]
async fn nested_route_sees_parent_params() {
    let app = Router::new().route("/items/{id}", |r| r.get("/", show).get("/tags", list));

    assert_eq!(send(&app, "GET", "/items/7").await.body, r#"{"data":"7"}"#);
    assert_eq!(send(&app, "GET", "/items/7/").await.body, r#"{"data":"7"}"#);
    assert_eq!(send(&app, "GET", "/items/7/tags").await.body, r#"{"data":["a","b"]}"#);
}

#[tokio::test]
async fn mount_wraps_sub_router_in_parent_stack() {
    let sub = Router::new().get("/", who).get("/deep", who);
    let app = Router::new().middleware(as_guest).mount("/sub/", sub);

    assert_eq!(send(&app, "GET", "/sub").await.body, r#"{"data":"guest"}"#);
    assert_eq!(send(&app, "GET", "/sub/").await.body, r#"{"data":"guest"}"#);
    assert_eq!(send(&app, "GET", "/sub/deep").await.body, r#"{"data":"guest"}"#);
}

#[tokio::test]
async fn static_mount_outranks_parameterised_route() {
    async fn slug(req: Request) -> Response {
        Response::ok(format!("slug {}", req.param("slug")))
    }
    let app = Router::new()
        .get("/{slug}", slug)
        .route("/articles", |r| r.get("/", list))
        .get("/about", list);

    assert_eq!(send(&app, "GET", "/articles").await.body, r#"{"data":["a","b"]}"#);
    assert_eq!(send(&app, "GET", "/articles/").await.body, r#"{"data":["a","b"]}"#);
    assert_eq!(send(&app, "GET", "/other").await.body, r#"{"data":"slug other"}"#);
    assert_eq!(send(&app, "GET", "/about").await.body, r#"{"data":["a","b"]}"#);
}

#[tokio::test]
async fn mount_handler_catches_every_method_and_sub_path() {
    async fn fallback(req: Request) -> Response {
        Response::ok(req.path().to_owned())
    }
    let app = Router::new().mount_handler("/static", fallback);

    assert_eq!(send(&app, "GET", "/static/css/app.css").await.body, r#"{"data":"/static/css/app.css"}"#);
    assert_eq!(send(&app, "DELETE", "/static").await.status, 200);
}

#[tokio::test]
async fn unknown_path_is_404_envelope() {
    let app = Router::new().get("/items", list);

    let res = send(&app, "GET", "/nope").await;
    assert_eq!(res.status, 404);
    assert_eq!(
        res.json(),
        json!({
            "type": "http://www.w3.org/Protocols/rfc2616/rfc2616-sec10.html",
            "title": "Not Found",
            "detail": "no route for /nope",
            "status": 404,
        })
    );
}

#[tokio::test]
async fn wrong_method_is_405_with_allow() {
    let app = Router::new().get("/items", list).post("/items", list);

    let res = send(&app, "PUT", "/items").await;
    assert_eq!(res.status, 405);
    assert_eq!(res.header("allow"), Some("GET, POST"));
    assert_eq!(res.json()["title"], "Method Not Allowed");
}

#[tokio::test]
async fn xml_is_negotiated_from_content_type() {
    let app = Router::new().get("/items", list);

    let ok = send_with(&app, "GET", "/items", Some("application/xml"), "").await;
    assert_eq!(ok.header("content-type"), Some("application/xml"));
    assert_eq!(ok.body, "<response><data>a</data><data>b</data></response>");

    let missing = send_with(&app, "GET", "/nope", Some("Application/XML; charset=utf-8"), "").await;
    assert_eq!(missing.status, 404);
    assert_eq!(
        missing.body,
        "<response>\
         <type>http://www.w3.org/Protocols/rfc2616/rfc2616-sec10.html</type>\
         <title>Not Found</title>\
         <detail>no route for /nope</detail>\
         <status>404</status>\
         </response>"
    );
}

#[tokio::test]
async fn short_circuit_stops_the_chain() {
    let hits = Arc::new(AtomicUsize::new(0));
    let counted = {
        let hits = Arc::clone(&hits);
        move |_req: Request| {
            let hits = Arc::clone(&hits);
            async move {
                hits.fetch_add(1, Ordering::SeqCst);
                Response::ok(())
            }
        }
    };
    let app = Router::new().with(deny, |r| r.middleware(as_admin).get("/", counted));

    let res = send(&app, "GET", "/").await;
    assert_eq!(res.status, 403);
    assert_eq!(res.json()["detail"], "keep out");
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn redirects_and_no_content_have_no_body() {
    async fn moved(_req: Request) -> Response {
        Response::found("/elsewhere")
    }
    async fn gone(_req: Request) -> Response {
        Response::no_content()
    }
    let app = Router::new().get("/old", moved).delete("/old", gone);

    let res = send(&app, "GET", "/old").await;
    assert_eq!(res.status, 302);
    assert_eq!(res.header("location"), Some("/elsewhere"));
    assert_eq!(res.body, "");

    let res = send(&app, "DELETE", "/old").await;
    assert_eq!(res.status, 204);
    assert_eq!(res.body, "");
}

#[tokio::test]
async fn router_validator_rejects_bodies() {
    async fn echo(req: Request) -> Result<Response, restful::Error> {
        let body: Value = req.body()?;
        Ok(Response::created(body))
    }
    let app = Router::new()
        .validator(|_: &Value| -> Result<(), ValidationError> { Err(ValidationError::new("some-random-error")) })
        .post("/", echo);

    let res = send_with(&app, "POST", "/", Some("application/json"), r#"{"a":1}"#).await;
    assert_eq!(res.status, 400);
    assert_eq!(res.json()["detail"], "some-random-error");
}

#[tokio::test]
async fn body_errors_map_to_statuses() {
    async fn echo(req: Request) -> Result<Response, restful::Error> {
        let body: Value = req.body()?;
        Ok(Response::created(body))
    }
    let app = Router::new().post("/", echo);

    let ok = send_with(&app, "POST", "/", Some("application/json"), r#"{"a":1}"#).await;
    assert_eq!(ok.status, 201);
    assert_eq!(ok.body, r#"{"data":{"a":1}}"#);

    let empty = send_with(&app, "POST", "/", Some("application/json"), "").await;
    assert_eq!(empty.status, 400);
    assert_eq!(empty.json()["detail"], "empty body from request");

    let text = send_with(&app, "POST", "/", Some("text/plain"), "hi").await;
    assert_eq!(text.status, 415);
    assert_eq!(text.json()["detail"], "content type 'text/plain' is unsupported");
}
