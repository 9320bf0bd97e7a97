use std::sync::Arc;

use actix_web::http::{StatusCode, header};
use actix_web::{App, test, web};
use chrono::{DateTime, TimeDelta, Utc};
use serde_json::{Value, json};
use uuid::Uuid;

use publish_core::domain::Principal;
use publish_core::ports::TokenService;
use publish_core::services::SweepConfig;
use publish_infra::{FixedClock, InMemoryPostRepository, JwtConfig, JwtTokenService};

use super::configure_routes;
use crate::state::AppState;

fn start() -> DateTime<Utc> {
    "2024-06-01T12:00:00Z".parse().unwrap()
}

struct Harness {
    state: AppState,
    clock: Arc<FixedClock>,
    editor: String,
    author: String,
}

impl Harness {
    fn new() -> Self {
        let clock = Arc::new(FixedClock::new(start()));
        let tokens = Arc::new(JwtTokenService::new(JwtConfig {
            secret: "handler-test-secret".to_string(),
            ..JwtConfig::default()
        }));
        let editor = tokens.issue(&Principal::editor(Uuid::new_v4())).unwrap();
        let author = tokens.issue(&Principal::author(Uuid::new_v4())).unwrap();

        let state = AppState::from_parts(
            Arc::new(InMemoryPostRepository::new()),
            clock.clone(),
            tokens,
            SweepConfig::default(),
        );

        Self {
            state,
            clock,
            editor,
            author,
        }
    }
}

fn bearer(token: &str) -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {token}"))
}

macro_rules! app {
    ($harness:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($harness.state.clone()))
                .configure(configure_routes),
        )
        .await
    };
}

/// POST a post as `$token` and return the 201 body.
macro_rules! create_post {
    ($app:expr, $token:expr, $attributes:expr $(,)?) => {{
        let req = test::TestRequest::post()
            .uri("/api/posts")
            .insert_header(bearer($token))
            .set_json(json!({ "data": $attributes }))
            .to_request();
        let resp = test::call_service($app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        body
    }};
}

#[actix_web::test]
async fn test_author_create_drops_publication_fields() {
    let h = Harness::new();
    let app = app!(h);

    let body = create_post!(
        &app,
        &h.author,
        json!({
            "title": "Hello World",
            "publishedAt": "2024-01-01T00:00:00Z",
            "scheduled_at": "2024-07-01T00:00:00Z",
            "slug_id": "chosen-slug"
        }),
    );

    let attrs = &body["data"]["attributes"];
    assert!(attrs["publishedAt"].is_null());
    assert!(attrs["scheduled_at"].is_null());
    assert_eq!(attrs["status"], "draft");

    let unique_id = attrs["unique_id"].as_str().unwrap();
    assert_eq!(unique_id.len(), 8);
    assert_eq!(attrs["slug_id"], format!("hello-world-{unique_id}"));
}

#[actix_web::test]
async fn test_editor_future_published_at_is_rejected() {
    let h = Harness::new();
    let app = app!(h);

    let req = test::TestRequest::post()
        .uri("/api/posts")
        .insert_header(bearer(&h.editor))
        .set_json(json!({ "data": { "title": "Early", "publishedAt": "2099-01-01" } }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let problem: Value = test::read_body_json(resp).await;
    assert_eq!(problem["status"], 400);
    assert_eq!(problem["detail"], "publishedAt must be a past date");
}

#[actix_web::test]
async fn test_publication_routes_require_editor() {
    let h = Harness::new();
    let app = app!(h);

    let post = create_post!(&app, &h.author, json!({ "title": "Mine" }));
    let id = post["data"]["id"].as_str().unwrap();

    let req = test::TestRequest::patch()
        .uri(&format!("/api/posts/{id}/publish"))
        .insert_header(bearer(&h.author))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::patch()
        .uri(&format!("/api/posts/{id}/publish"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let post = h.state.posts.get(id.parse().unwrap()).await.unwrap();
    assert_eq!(post.published_at, None);
}

#[actix_web::test]
async fn test_schedule_publish_unpublish() {
    let h = Harness::new();
    let app = app!(h);

    let post = create_post!(&app, &h.editor, json!({ "title": "Launch" }));
    let id = post["data"]["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::patch()
        .uri(&format!("/api/posts/{id}/schedule"))
        .insert_header(bearer(&h.editor))
        .set_json(json!({ "data": { "scheduled_at": "2024-06-02T00:00:00Z" } }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["id"], id.as_str());
    assert_eq!(body["data"]["attributes"]["status"], "scheduled");
    assert_eq!(body["data"]["attributes"]["scheduled_at"], "2024-06-02T00:00:00Z");

    h.clock.advance(TimeDelta::minutes(5));
    let req = test::TestRequest::patch()
        .uri(&format!("/api/posts/{id}/publish"))
        .insert_header(bearer(&h.editor))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["attributes"]["status"], "published");
    assert_eq!(body["data"]["attributes"]["publishedAt"], "2024-06-01T12:05:00Z");
    // Manual publish leaves the schedule alone
    assert_eq!(body["data"]["attributes"]["scheduled_at"], "2024-06-02T00:00:00Z");

    let req = test::TestRequest::patch()
        .uri(&format!("/api/posts/{id}/unpublish"))
        .insert_header(bearer(&h.editor))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert!(body["data"]["attributes"]["publishedAt"].is_null());
    assert_eq!(body["data"]["attributes"]["status"], "scheduled");
}

#[actix_web::test]
async fn test_schedule_null_clears() {
    let h = Harness::new();
    let app = app!(h);

    let post = create_post!(
        &app,
        &h.editor,
        json!({ "title": "Later", "scheduled_at": "2024-06-02T00:00:00Z" }),
    );
    let id = post["data"]["id"].as_str().unwrap();

    let req = test::TestRequest::patch()
        .uri(&format!("/api/posts/{id}/schedule"))
        .insert_header(bearer(&h.editor))
        .set_json(json!({ "data": { "scheduled_at": null } }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert!(body["data"]["attributes"]["scheduled_at"].is_null());
    assert_eq!(body["data"]["attributes"]["status"], "draft");
}

#[actix_web::test]
async fn test_publish_unknown_and_malformed_ids() {
    let h = Harness::new();
    let app = app!(h);

    let req = test::TestRequest::patch()
        .uri(&format!("/api/posts/{}/publish", Uuid::new_v4()))
        .insert_header(bearer(&h.editor))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::patch()
        .uri("/api/posts/not-a-uuid/publish")
        .insert_header(bearer(&h.editor))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_check_and_publish_promotes_due_posts_only() {
    let h = Harness::new();
    let app = app!(h);

    let due = create_post!(
        &app,
        &h.editor,
        json!({ "title": "A", "scheduled_at": "2024-06-01T11:00:00Z" }),
    );
    create_post!(
        &app,
        &h.editor,
        json!({ "title": "B", "scheduled_at": "2024-06-01T13:00:00Z" }),
    );
    create_post!(&app, &h.editor, json!({ "title": "C" }));

    let req = test::TestRequest::get()
        .uri("/api/posts/check-and-publish")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["published"], 1);
    assert_eq!(body["skipped"], 0);
    assert_eq!(body["failed"], 0);
    assert_eq!(body["published_ids"], json!([due["data"]["id"]]));

    let id: Uuid = due["data"]["id"].as_str().unwrap().parse().unwrap();
    let post = h.state.posts.get(id).await.unwrap();
    assert_eq!(post.published_at, Some(start()));

    // Nothing left to do on a second pass
    let req = test::TestRequest::get()
        .uri("/api/posts/check-and-publish")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["published"], 0);
}

#[actix_web::test]
async fn test_slug_id_lookup() {
    let h = Harness::new();
    let app = app!(h);

    let post = create_post!(
        &app,
        &h.editor,
        json!({ "title": "Found", "publishedAt": "2024-05-01T00:00:00Z" }),
    );
    let slug_id = post["data"]["attributes"]["slug_id"].as_str().unwrap();

    let req = test::TestRequest::get()
        .uri(&format!("/api/posts/slug/{slug_id}"))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["id"], post["data"]["id"]);

    let req = test::TestRequest::get()
        .uri("/api/posts/slug/does-not-exist")
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get()
        .uri("/api/posts/slug/Not_Valid")
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

    let unique_id = post["data"]["attributes"]["unique_id"].as_str().unwrap();
    let req = test::TestRequest::get()
        .uri(&format!("/api/posts/uid/{unique_id}"))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["id"], post["data"]["id"]);
}

#[actix_web::test]
async fn test_anonymous_readers_see_published_only() {
    let h = Harness::new();
    let app = app!(h);

    let draft = create_post!(&app, &h.editor, json!({ "title": "Hidden" }));
    create_post!(
        &app,
        &h.editor,
        json!({ "title": "Public", "publishedAt": "2024-05-01T00:00:00Z" }),
    );

    let req = test::TestRequest::get().uri("/api/posts").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let titles: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["attributes"]["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Public"]);

    let id = draft["data"]["id"].as_str().unwrap();
    let req = test::TestRequest::get()
        .uri(&format!("/api/posts/{id}"))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get()
        .uri("/api/posts?status=draft")
        .insert_header(bearer(&h.editor))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let req = test::TestRequest::get()
        .uri("/api/posts?status=archived")
        .insert_header(bearer(&h.editor))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_malformed_json_gets_problem_body() {
    let h = Harness::new();
    let app = app!(h);

    let req = test::TestRequest::post()
        .uri("/api/posts")
        .insert_header(bearer(&h.editor))
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_payload("{ not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let problem: Value = test::read_body_json(resp).await;
    assert_eq!(problem["status"], 400);
    assert_eq!(problem["title"], "Bad Request");
}

#[actix_web::test]
async fn test_health() {
    let h = Harness::new();
    let app = app!(h);

    let req = test::TestRequest::get().uri("/api/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], "ok");
}
