//! End-to-end tests of the HTTP API against the in-memory store.

#![cfg(feature = "http-server")]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use posts_backend::db::{FullRepository, LocalRepository, RepositoryFactory};
use posts_backend::http::{create_router, AppState};

fn app_with(repo: LocalRepository) -> Router {
    create_router(AppState::new(Arc::new(repo) as Arc<dyn FullRepository>))
}

fn app() -> Router {
    app_with(RepositoryFactory::local_repository())
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    send_request(app, request).await
}

async fn send_request(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn titles(posts: &Value) -> Vec<&str> {
    posts
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["title"].as_str().unwrap())
        .collect()
}

#[tokio::test]
async fn test_health_reports_store_status() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "connected");
}

#[tokio::test]
async fn test_create_then_fetch() {
    let app = app();
    let (status, created) = send(
        &app,
        Method::POST,
        "/posts",
        Some(json!({"title": "A", "tags": ["x"], "ignored": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["title"], "A");
    assert_eq!(created["tags"], json!(["x"]));
    assert!(created.get("ignored").is_none());

    let id = created["id"].as_str().unwrap();
    let (status, fetched) = send(&app, Method::GET, &format!("/post/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn test_every_create_route_is_wired() {
    let app = app();
    for uri in ["/posts", "/posts/", "/post"] {
        let (status, body) = send(&app, Method::POST, uri, Some(json!({"title": uri}))).await;
        assert_eq!(status, StatusCode::CREATED, "POST {}", uri);
        assert_eq!(body["title"], uri);
    }

    let (_, page) = send(&app, Method::GET, "/posts/", None).await;
    assert_eq!(page["data"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_post_with_id_updates_in_place() {
    let app = app();
    let (_, created) = send(
        &app,
        Method::POST,
        "/posts",
        Some(json!({"title": "A", "tags": ["keep"]})),
    )
    .await;
    let id = created["id"].clone();

    let (status, updated) = send(
        &app,
        Method::POST,
        "/posts",
        Some(json!({"id": id.clone(), "title": "B"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(updated["id"], id);
    assert_eq!(updated["title"], "B");
    assert_eq!(updated["tags"], json!(["keep"]));
}

#[tokio::test]
async fn test_post_with_unknown_id_is_404() {
    let app = app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/post",
        Some(json!({"id": "12345", "title": "B"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"status": 404, "message": "Failed to update a post."}));
}

#[tokio::test]
async fn test_bulk_create_shapes() {
    let app = app();

    let (status, body) = send(&app, Method::PUT, "/posts", Some(json!({"title": "A"}))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(titles(&body), vec!["A"]);

    let (status, body) = send(
        &app,
        Method::PUT,
        "/posts",
        Some(json!([{"title": "B"}, {"title": "C"}])),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(titles(&body), vec!["B", "C"]);

    let (status, body) = send(
        &app,
        Method::PUT,
        "/posts",
        Some(json!({"posts": [{"title": "D", "tags": ["x"]}]})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body[0]["tags"], json!(["x"]));
}

#[tokio::test]
async fn test_post_collection_accepts_lists() {
    let app = app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/posts",
        Some(json!([{"title": "A"}, {"title": "B"}])),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(titles(&body), vec!["A", "B"]);

    let (status, body) = send(
        &app,
        Method::POST,
        "/posts",
        Some(json!({"posts": [{"title": "C", "tags": ["x"]}]})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(titles(&body), vec!["C"]);
    assert_eq!(body[0]["tags"], json!(["x"]));

    let (_, page) = send(&app, Method::GET, "/posts", None).await;
    assert_eq!(titles(&page["data"]), vec!["A", "B", "C"]);
}

#[tokio::test]
async fn test_validation_failures_are_422_and_store_nothing() {
    let repo = RepositoryFactory::local_repository();
    let probe = repo.clone();
    let app = app_with(repo);

    let (status, body) = send(&app, Method::PUT, "/posts", Some(json!({}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["status"], 422);

    let (status, body) = send(
        &app,
        Method::PUT,
        "/posts",
        Some(json!([{"title": "A"}, {"tags": ["x"]}])),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["message"], "Missing required field 'title'");

    let (status, _) = send(&app, Method::POST, "/posts", Some(json!({"tags": []}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    assert_eq!(probe.document_count("posts"), 0);
}

#[tokio::test]
async fn test_malformed_json_is_422() {
    let app = app();
    let request = Request::builder()
        .method(Method::PUT)
        .uri("/posts")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"title\": "))
        .unwrap();

    let (status, body) = send_request(&app, request).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body,
        json!({"status": 422, "message": "Request body must be valid JSON."})
    );
}

#[tokio::test]
async fn test_oversized_body_is_413() {
    let app = app();
    let title = "a".repeat(3 * 1024 * 1024);
    let (status, body) = send(&app, Method::PUT, "/posts", Some(json!({"title": title}))).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["status"], 413);
    assert_eq!(body["message"], "Request body must not exceed 2097152 bytes.");
}

#[tokio::test]
async fn test_list_filters_by_title() {
    let app = app();
    send(
        &app,
        Method::PUT,
        "/posts",
        Some(json!([{"title": "cats"}, {"title": "dogs"}, {"title": "cats"}])),
    )
    .await;

    let (status, page) = send(&app, Method::GET, "/posts/cats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(titles(&page["data"]), vec!["cats", "cats"]);

    let (_, page) = send(&app, Method::GET, "/posts?title=dogs", None).await;
    assert_eq!(titles(&page["data"]), vec!["dogs"]);

    let (_, page) = send(&app, Method::GET, "/posts/birds", None).await;
    assert_eq!(page["data"], json!([]));
}

#[tokio::test]
async fn test_title_path_is_percent_decoded() {
    let app = app();
    send(&app, Method::PUT, "/posts", Some(json!({"title": "My cat"}))).await;

    let (_, page) = send(&app, Method::GET, "/posts/My%20cat", None).await;
    assert_eq!(titles(&page["data"]), vec!["My cat"]);
}

#[tokio::test]
async fn test_list_pagination() {
    let app = app();
    send(
        &app,
        Method::PUT,
        "/posts",
        Some(json!([{"title": "1"}, {"title": "2"}, {"title": "3"}])),
    )
    .await;

    let (status, first) = send(&app, Method::GET, "/posts?size=2", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(titles(&first["data"]), vec!["1", "2"]);
    assert!(first.get("before").is_none());

    let after = first["after"].as_str().unwrap();
    let (_, second) = send(&app, Method::GET, &format!("/posts?size=2&after={}", after), None).await;
    assert_eq!(titles(&second["data"]), vec!["3"]);
    assert!(second.get("after").is_none());

    let before = second["before"].as_str().unwrap();
    let (_, back) = send(&app, Method::GET, &format!("/posts?size=2&before={}", before), None).await;
    assert_eq!(titles(&back["data"]), vec!["1", "2"]);
}

#[tokio::test]
async fn test_bad_pagination_is_422() {
    let app = app();
    for uri in ["/posts?size=0", "/posts?size=lots", "/posts?after=1&before=2"] {
        let (status, body) = send(&app, Method::GET, uri, None).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "GET {}", uri);
        assert_eq!(body["status"], 422);
    }
}

#[tokio::test]
async fn test_patch_and_put_single_post() {
    let app = app();
    let (_, created) = send(
        &app,
        Method::POST,
        "/posts",
        Some(json!({"title": "A", "tags": ["x"]})),
    )
    .await;
    let uri = format!("/post/{}", created["id"].as_str().unwrap());

    let (status, patched) = send(&app, Method::PATCH, &uri, Some(json!({"tags": ["y"]}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(patched["title"], "A");
    assert_eq!(patched["tags"], json!(["y"]));

    let (status, replaced) = send(&app, Method::PUT, &uri, Some(json!({"title": "B"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(replaced["title"], "B");
    assert_eq!(replaced["tags"], json!([]));

    let (status, _) = send(&app, Method::PUT, &uri, Some(json!({"tags": ["z"]}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, body) = send(&app, Method::PUT, "/post/999", Some(json!({"title": "C"}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Failed to replace a post.");
}

#[tokio::test]
async fn test_delete_then_fetch_is_404() {
    let app = app();
    let (_, created) = send(&app, Method::POST, "/posts", Some(json!({"title": "A"}))).await;
    let uri = format!("/post/{}", created["id"].as_str().unwrap());

    let (status, body) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, body) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"status": 404, "message": "Failed to fetch a post."}));

    let (status, body) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Failed to delete a post.");
}

#[tokio::test]
async fn test_fetch_unknown_id_is_404() {
    let app = app();
    for uri in ["/post/424242", "/post/not-an-id"] {
        let (status, body) = send(&app, Method::GET, uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "GET {}", uri);
        assert_eq!(body["status"], 404);
    }
}

#[tokio::test]
async fn test_unmatched_route_is_404_with_url() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/nothing/here?x=1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body,
        json!({"status": 404, "message": "Not Found: /nothing/here?x=1"})
    );
}

#[tokio::test]
async fn test_wrong_method_is_405_with_body() {
    let app = app();
    for (method, uri) in [(Method::DELETE, "/posts"), (Method::PUT, "/posts/")] {
        let (status, body) = send(&app, method.clone(), uri, None).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED, "{} {}", method, uri);
        assert_eq!(
            body,
            json!({"status": 405, "message": format!("Method Not Allowed: {} {}", method, uri)})
        );
    }
}

#[tokio::test]
async fn test_unhealthy_store_is_500_with_fixed_message() {
    let repo = RepositoryFactory::local_repository();
    let handle = repo.clone();
    let app = app_with(repo);

    let (_, created) = send(&app, Method::POST, "/posts", Some(json!({"title": "A"}))).await;
    let uri = format!("/post/{}", created["id"].as_str().unwrap());
    handle.set_healthy(false);

    let cases = [
        (Method::GET, uri.as_str(), None, "Failed to fetch a post."),
        (Method::GET, "/posts", None, "Failed to fetch posts."),
        (
            Method::PUT,
            "/posts",
            Some(json!({"title": "B"})),
            "Failed to create posts.",
        ),
        (
            Method::POST,
            "/posts",
            Some(json!({"title": "B"})),
            "Failed to create a post.",
        ),
        (Method::DELETE, uri.as_str(), None, "Failed to delete a post."),
    ];

    for (method, uri, body, message) in cases {
        let (status, response) = send(&app, method.clone(), uri, body).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{} {}", method, uri);
        assert_eq!(response, json!({"status": 500, "message": message}));
    }

    let (status, health) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(health["database"], "disconnected");
}
