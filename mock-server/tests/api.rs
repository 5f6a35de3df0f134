use std::io::{Read, Write};
use std::time::{Duration, Instant};

use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{
    app, fixed_response_app, redirect_loop_app, serve_in_background, slow_app, DEFAULT_TOKEN, ERR_NOT_FOUND,
    ERR_TOKEN,
};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn get_request(uri: &str) -> Request<String> {
    Request::builder().uri(uri).body(String::new()).unwrap()
}

fn json_request(uri: &str, body: Value) -> Request<String> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

// --- project ---

#[tokio::test]
async fn project_get_returns_seeded_project() {
    let resp = app()
        .oneshot(get_request(&format!("/api/project/get?token={DEFAULT_TOKEN}")))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["errcode"], 0);
    assert_eq!(body["data"]["_id"], 11);
    assert_eq!(body["data"]["name"], "demo");
}

#[tokio::test]
async fn wrong_token_is_an_errcode_not_a_status() {
    let resp = app()
        .oneshot(get_request("/api/project/get?token=nope"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["errcode"], ERR_TOKEN);
    assert!(body["data"].is_null());
}

// --- categories ---

#[tokio::test]
async fn cat_menu_lists_public_category() {
    let resp = app()
        .oneshot(get_request(&format!(
            "/api/interface/getCatMenu?token={DEFAULT_TOKEN}&project_id=11"
        )))
        .await
        .unwrap();

    let body = body_json(resp).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["name"], "public");
}

#[tokio::test]
async fn add_cat_requires_a_name() {
    let resp = app()
        .oneshot(json_request(
            "/api/interface/add_cat",
            json!({"token": DEFAULT_TOKEN, "project_id": 11, "name": ""}),
        ))
        .await
        .unwrap();

    let body = body_json(resp).await;
    assert_ne!(body["errcode"], 0);
}

// --- interfaces ---

#[tokio::test]
async fn get_unknown_interface() {
    let resp = app()
        .oneshot(get_request(&format!("/api/interface/get?token={DEFAULT_TOKEN}&id=999")))
        .await
        .unwrap();

    let body = body_json(resp).await;
    assert_eq!(body["errcode"], ERR_NOT_FOUND);
}

#[tokio::test]
async fn list_without_paging_is_empty() {
    let resp = app()
        .oneshot(get_request(&format!("/api/interface/list_cat?token={DEFAULT_TOKEN}")))
        .await
        .unwrap();

    let body = body_json(resp).await;
    assert_eq!(body["errcode"], 0);
    assert!(body["data"]["list"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn huge_page_number_does_not_overflow() {
    let resp = app()
        .oneshot(get_request(&format!(
            "/api/interface/list_cat?token={DEFAULT_TOKEN}&Page={}&limit=2",
            usize::MAX
        )))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["errcode"], 0);
    assert!(body["data"]["list"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn import_rejects_non_swagger_type() {
    let resp = app()
        .oneshot(json_request(
            "/api/open/import_data",
            json!({"token": DEFAULT_TOKEN, "type": "postman", "json": "{}", "merge": "merge"}),
        ))
        .await
        .unwrap();

    let body = body_json(resp).await;
    assert_ne!(body["errcode"], 0);
}

// --- canned routers ---

#[tokio::test]
async fn fixed_response_app_answers_every_path() {
    let resp = fixed_response_app(StatusCode::BAD_REQUEST, "Bad Request")
        .oneshot(get_request("/anything/at/all"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(&body_bytes(resp).await[..], b"Bad Request");
}

#[tokio::test]
async fn redirect_loop_points_back_to_root() {
    let resp = redirect_loop_app().oneshot(get_request("/")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(resp.headers()[http::header::LOCATION], "/");
}

#[tokio::test]
async fn slow_app_answers_after_the_delay() {
    let started = Instant::now();
    let resp = slow_app(Duration::from_millis(50))
        .oneshot(get_request("/api/project/get"))
        .await
        .unwrap();

    assert!(started.elapsed() >= Duration::from_millis(50));
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await, json!({}));
}

// --- background server ---

#[test]
fn background_server_answers_over_tcp() {
    let addr = serve_in_background(fixed_response_app(StatusCode::OK, "pong")).unwrap();

    let mut stream = std::net::TcpStream::connect(addr).unwrap();
    stream.set_read_timeout(Some(Duration::from_secs(5))).unwrap();
    stream
        .write_all(b"GET / HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
        .unwrap();
    let mut raw = String::new();
    stream.read_to_string(&mut raw).unwrap();

    assert!(raw.starts_with("HTTP/1.1 200 OK"), "{raw}");
    assert!(raw.ends_with("pong"), "{raw}");
}

// --- full lifecycle ---

#[tokio::test]
async fn category_and_interface_lifecycle() {
    use tower::Service;

    let mut app = app().into_service();

    // create a category
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "/api/interface/add_cat",
            json!({"token": DEFAULT_TOKEN, "project_id": 11, "name": "users", "desc": "user api"}),
        ))
        .await
        .unwrap();
    let body = body_json(resp).await;
    assert_eq!(body["errcode"], 0);
    let catid = body["data"]["_id"].as_i64().unwrap();

    // save a new interface in it
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "/api/interface/save",
            json!({"token": DEFAULT_TOKEN, "_id": 0, "catid": catid, "title": "List users",
                   "path": "/users", "method": "GET"}),
        ))
        .await
        .unwrap();
    let body = body_json(resp).await;
    assert_eq!(body["errcode"], 0);
    let id = body["data"]["_id"].as_i64().unwrap();
    assert!(body["data"].get("token").is_none());

    // update it
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "/api/interface/save",
            json!({"token": DEFAULT_TOKEN, "_id": id, "title": "List all users"}),
        ))
        .await
        .unwrap();
    let body = body_json(resp).await;
    assert_eq!(body["data"][0]["nModified"], 1);

    // list by category
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get_request(&format!(
            "/api/interface/list_cat?token={DEFAULT_TOKEN}&catid={catid}&Page=1&limit=10"
        )))
        .await
        .unwrap();
    let body = body_json(resp).await;
    assert_eq!(body["data"]["count"], 1);
    assert_eq!(body["data"]["list"][0]["title"], "List all users");
}
