use axum::http::{self, header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde::Serialize;
use serde_json::Value;
use tastyroot_core::{Resource, StaticEngine};
use tastyroot_server::{app, Registrar, ServerConfig};
use tower::ServiceExt;

#[derive(Serialize)]
struct TestCat {
    #[serde(rename = "Name")]
    name: String,
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn get(uri: &str) -> Request<String> {
    Request::builder().uri(uri).body(String::new()).unwrap()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

async fn demo_app() -> Router {
    let config = ServerConfig::from_lookup(|_| None).unwrap();
    let (router, _backend) = app(&config).await.unwrap();
    router
}

fn meow_app() -> Router {
    let mut registrar = Registrar::new(Router::new());
    let cat = TestCat {
        name: "Meow".to_string(),
    };
    registrar
        .register(Resource::new("/cat", StaticEngine::new(cat)).unwrap())
        .unwrap();
    registrar.into_router()
}

fn ids(list: &Value) -> Vec<i64> {
    list.as_array()
        .unwrap()
        .iter()
        .map(|cat| cat["id"].as_i64().unwrap())
        .collect()
}

// --- static resources ---

#[tokio::test]
async fn static_get_returns_serialized_value() {
    let resp = meow_app().oneshot(get("/cat")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()[header::CONTENT_TYPE], "application/json");
    assert_eq!(body_bytes(resp).await, r#"{"Name":"Meow"}"#);
}

#[tokio::test]
async fn static_post_answers_ping() {
    let resp = meow_app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/cat")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()[header::CONTENT_TYPE], "application/json");
    assert_eq!(body_bytes(resp).await, r#"{"ping":"pong"}"#);
}

#[tokio::test]
async fn static_post_ignores_body_limit() {
    let mut registrar = Registrar::new(Router::new()).with_max_body_bytes(8);
    registrar
        .register(Resource::new("/cat", StaticEngine::new("Meow")).unwrap())
        .unwrap();
    let app = registrar.into_router();
    let body = "0123456789abcdef";

    let resp = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/cat")
                .header(header::CONTENT_LENGTH, body.len())
                .body(body.to_string())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_bytes(resp).await, r#"{"ping":"pong"}"#);
}

#[tokio::test]
async fn static_list_keeps_field_order() {
    let resp = demo_app().await.oneshot(get("/cats")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        body_bytes(resp).await,
        concat!(
            r#"[{"Name":"Batman","Age":13,"Alive":true},"#,
            r#"{"Name":"Banana","Age":3,"Alive":true},"#,
            r#"{"Name":"Pong","Age":22,"Alive":false}]"#
        )
    );
}

#[tokio::test]
async fn unregistered_path_is_404() {
    let resp = meow_app().oneshot(get("/dog")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- database resource ---

#[tokio::test]
async fn database_list_is_newest_first() {
    let app = demo_app().await;
    for uri in ["/db/cats/", "/db/cats"] {
        let resp = app.clone().oneshot(get(uri)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(ids(&body_json(resp).await), vec![3, 2, 1], "uri {uri}");
    }
}

#[tokio::test]
async fn database_get_single_item() {
    let resp = demo_app().await.oneshot(get("/db/cats/2?verbose=1")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let cat = body_json(resp).await;
    assert_eq!(cat["name"], "Banana");
    assert_eq!(cat["age"], 3);
}

#[tokio::test]
async fn database_get_ignores_trailing_segments() {
    let resp = demo_app().await.oneshot(get("/db/cats/1/toys")).await.unwrap();
    assert_eq!(body_json(resp).await["name"], "Batman");
}

#[tokio::test]
async fn database_missing_item_is_error_envelope() {
    let resp = demo_app().await.oneshot(get("/db/cats/99")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()[header::CONTENT_TYPE], "application/json");
    assert_eq!(
        body_bytes(resp).await,
        r#"{"error":"object with provided id not found"}"#
    );
}

#[tokio::test]
async fn database_post_missing_id() {
    let resp = demo_app()
        .await
        .oneshot(json_request("POST", "/db/cats/", r#"{"name":"Nameless"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let envelope = body_json(resp).await;
    assert_eq!(envelope["created"], false);
    assert_eq!(envelope["error"], "missing required field \"id\"");
}

#[tokio::test]
async fn database_post_malformed_json() {
    let resp = demo_app()
        .await
        .oneshot(json_request("POST", "/db/cats/", r#"{"id":"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let envelope = body_json(resp).await;
    assert_eq!(envelope["created"], false);
    assert!(envelope["error"].as_str().unwrap().starts_with("request body is not a JSON object"));
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let config = ServerConfig::from_lookup(|_| None).unwrap();
    let mut registrar = Registrar::new(Router::new()).with_max_body_bytes(16);
    let backend = tastyroot_server::demo::register(&mut registrar, &config)
        .await
        .unwrap();
    let app = registrar.into_router();
    let body = r#"{"id":4,"name":"A rather long name"}"#;

    let declared = Request::builder()
        .method("POST")
        .uri("/db/cats/")
        .header(header::CONTENT_LENGTH, body.len())
        .body(body.to_string())
        .unwrap();
    for request in [declared, json_request("POST", "/db/cats/", body)] {
        let resp = app.clone().oneshot(request).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let envelope = body_json(resp).await;
        assert_eq!(envelope["created"], false);
        assert!(envelope["error"].is_string());
    }
    assert_eq!(backend.count("godb", "cats").await, 3);
}

#[tokio::test]
async fn unsupported_method_is_405() {
    let resp = demo_app()
        .await
        .oneshot(json_request("PUT", "/db/cats/1", r#"{"id":1}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(resp.headers()[header::CONTENT_TYPE], "application/json");
    assert_eq!(resp.headers()[header::ALLOW], "GET, POST");
    assert_eq!(body_json(resp).await["error"], "method PUT not allowed");
}

// --- registration ---

#[tokio::test]
async fn routers_are_independent() {
    let first = meow_app();
    let mut registrar = Registrar::new(Router::new());
    registrar
        .register(Resource::new("/cat", StaticEngine::new(vec![1, 2, 3])).unwrap())
        .unwrap();
    let second = registrar.into_router();

    let resp = first.oneshot(get("/cat")).await.unwrap();
    assert_eq!(body_bytes(resp).await, r#"{"Name":"Meow"}"#);
    let resp = second.oneshot(get("/cat")).await.unwrap();
    assert_eq!(body_bytes(resp).await, "[1,2,3]");
}

#[tokio::test]
async fn root_resource_answers_everything() {
    let mut registrar = Registrar::new(Router::new());
    registrar
        .register(Resource::new("/", StaticEngine::new("root")).unwrap())
        .unwrap();
    let app = registrar.into_router();

    for uri in ["/", "/anything", "/a/b/c"] {
        let resp = app.clone().oneshot(get(uri)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK, "uri {uri}");
        assert_eq!(body_bytes(resp).await, r#""root""#);
    }
}

// --- full lifecycle ---

#[tokio::test]
async fn create_then_read_lifecycle() {
    use tower::Service;

    let mut app = demo_app().await.into_service();

    // create
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "POST",
            "/db/cats/",
            r#"{"id":4,"name":"Walker","age":2,"alive":true}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_bytes(resp).await, r#"{"created":true}"#);

    // list, newest first
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get("/db/cats/"))
        .await
        .unwrap();
    let first = body_bytes(resp).await;
    let list: Value = serde_json::from_slice(&first).unwrap();
    assert_eq!(ids(&list), vec![4, 3, 2, 1]);

    // single
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get("/db/cats/4"))
        .await
        .unwrap();
    let cat = body_json(resp).await;
    assert_eq!(cat["name"], "Walker");
    assert!(cat["_id"].is_string());

    // repeated list is byte-identical
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get("/db/cats/"))
        .await
        .unwrap();
    assert_eq!(body_bytes(resp).await, first);
}
