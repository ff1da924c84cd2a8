use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use chrono::{Duration, Utc};
use jobconnect_backend::{
    backend::{memory::InMemoryBackend, Backend},
    config::{BackendProvider, Config},
    models::job::{Job, JobStatus},
    routes::app_router,
    AppState,
};
use serde_json::{json, Value as JsonValue};
use tower::ServiceExt;
use uuid::Uuid;

const SECRET: &str = "test_jwt_secret";
const AUDIENCE: &str = "authenticated";

fn test_config() -> Config {
    Config {
        server_address: "127.0.0.1:0".into(),
        backend_provider: BackendProvider::Memory,
        baas_url: "http://localhost:54321".into(),
        baas_anon_key: String::new(),
        baas_jwt_secret: SECRET.into(),
        baas_jwt_audience: AUDIENCE.into(),
        baas_timeout_secs: 5,
        site_url: Some("http://localhost:5173".into()),
    }
}

fn setup_app() -> (Router, Arc<InMemoryBackend>, AppState) {
    let memory = Arc::new(InMemoryBackend::new(SECRET, AUDIENCE));
    let backend: Arc<dyn Backend> = memory.clone();
    let state = AppState::new(&test_config(), backend);
    (app_router(state.clone()), memory, state)
}

fn job(title: &str, days_old: i64) -> Job {
    let created = Utc::now() - Duration::days(days_old);
    Job {
        id: Uuid::new_v4(),
        title: title.into(),
        company: "TechCorp Inc.".into(),
        location: "Remote".into(),
        job_type: "full-time".into(),
        salary_min: Some(80_000),
        salary_max: Some(120_000),
        description: "Build and run services".into(),
        requirements: None,
        tags: Some(vec!["Rust".into()]),
        is_remote: Some(true),
        is_featured: None,
        status: JobStatus::Active,
        posted_by: None,
        created_at: created,
        updated_at: created,
    }
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, JsonValue) {
    let res = app.clone().oneshot(req).await.expect("response");
    let status = res.status();
    let bytes = to_bytes(res.into_body(), usize::MAX).await.expect("body");
    let body = if bytes.is_empty() {
        JsonValue::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, body)
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).expect("request")
}

fn post_json(uri: &str, token: Option<&str>, body: JsonValue) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder
        .body(Body::from(body.to_string()))
        .expect("request")
}

async fn sign_up(app: &Router, email: &str, account_type: &str) -> String {
    let (status, body) = send(
        app,
        post_json(
            "/api/auth/sign-up",
            None,
            json!({
                "email": email,
                "password": "secret123",
                "account_type": account_type,
                "first_name": "Ada",
                "last_name": "Lovelace"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "sign-up failed: {}", body);
    body["access_token"]
        .as_str()
        .expect("access token")
        .to_string()
}

#[tokio::test]
async fn health_reports_backend() {
    let (app, _, _) = setup_app();
    let (status, body) = send(&app, get("/health", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["backend"], "memory");
}

#[tokio::test]
async fn anonymous_apply_redirects_to_login_without_writing() {
    let (app, memory, _) = setup_app();
    let posting = job("Platform Engineer", 0);
    let job_id = posting.id;
    memory.seed_job(posting).await;

    let (status, body) = send(
        &app,
        post_json(&format!("/api/jobs/{}/apply", job_id), None, json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["redirect"], "/login");
    assert!(memory.applications().await.is_empty());
}

#[tokio::test]
async fn invalid_token_is_refused() {
    let (app, _, _) = setup_app();
    let (status, body) = send(&app, get("/api/session", Some("not-a-jwt"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["redirect"], "/login");
}

#[tokio::test]
async fn jobs_are_paged_six_at_a_time() {
    let (app, memory, _) = setup_app();
    for i in 0..10 {
        memory.seed_job(job(&format!("Job {}", i), i)).await;
    }

    let (status, first) = send(&app, get("/api/jobs", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["items"].as_array().map(Vec::len), Some(6));
    assert_eq!(first["has_more"], true);
    assert_eq!(first["source"], "live");
    assert_eq!(first["items"][0]["title"], "Job 0");
    assert_eq!(first["items"][0]["salary"], "$80k - $120k");

    let next = first["next_offset"].as_i64().expect("next offset");
    let (status, second) = send(&app, get(&format!("/api/jobs?offset={}", next), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["items"].as_array().map(Vec::len), Some(4));
    assert_eq!(second["has_more"], false);
}

#[tokio::test]
async fn seeker_applies_once_and_toggles_save() {
    let (app, memory, _) = setup_app();
    let posting = job("Backend Engineer", 1);
    let job_id = posting.id;
    memory.seed_job(posting).await;

    let token = sign_up(&app, "seeker@example.com", "job_seeker").await;

    let (status, body) = send(
        &app,
        post_json(&format!("/api/jobs/{}/apply", job_id), Some(&token), json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["status"], "pending");

    let (status, _) = send(
        &app,
        post_json(&format!("/api/jobs/{}/apply", job_id), Some(&token), json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(memory.applications().await.len(), 1);

    let (status, saved) = send(
        &app,
        post_json(&format!("/api/jobs/{}/save", job_id), Some(&token), json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(saved["saved"], true);
    assert_eq!(memory.saved_jobs().await.len(), 1);

    let (_, details) = send(&app, get(&format!("/api/jobs/{}", job_id), Some(&token))).await;
    assert_eq!(details["has_applied"], true);
    assert_eq!(details["is_saved"], true);

    let (_, unsaved) = send(
        &app,
        post_json(&format!("/api/jobs/{}/save", job_id), Some(&token), json!({})),
    )
    .await;
    assert_eq!(unsaved["saved"], false);
    assert!(memory.saved_jobs().await.is_empty());
}

#[tokio::test]
async fn employer_posts_job_and_sees_dashboard() {
    let (app, _, _) = setup_app();
    let token = sign_up(&app, "hiring@example.com", "employer").await;

    let (status, session) = send(&app, get("/api/session", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(session["signed_in"], true);
    assert_eq!(session["navigation"], "employer");

    let (status, created) = send(
        &app,
        post_json(
            "/api/jobs",
            Some(&token),
            json!({
                "title": "Data Engineer",
                "company": "Hiring Co",
                "location": "Berlin",
                "type": "full-time",
                "salary": "$90k - $110k",
                "description": "Pipelines",
                "skills": ["SQL", "Rust"],
                "is_featured": true
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", created);
    assert_eq!(created["salary_min"], 90_000);

    let (status, dashboard) = send(&app, get("/api/dashboard", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dashboard["variant"], "employer");
    assert_eq!(dashboard["stats"]["active_jobs"], 1);
}

/// The in-memory backend revokes tokens on sign-out. Hosted access tokens stay
/// valid until they expire, so this holds for the memory provider only.
#[tokio::test]
async fn memory_backend_refuses_writes_after_sign_out() {
    let (app, memory, state) = setup_app();
    let watcher = state.watch_sessions();
    let posting = job("Support Engineer", 2);
    let job_id = posting.id;
    memory.seed_job(posting).await;
    let token = sign_up(&app, "leaving@example.com", "job_seeker").await;

    let (status, body) = send(&app, post_json("/api/auth/sign-out", Some(&token), json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["redirect"], "/");

    let (status, body) = send(
        &app,
        post_json(&format!("/api/jobs/{}/save", job_id), Some(&token), json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["redirect"], "/login");
    assert!(memory.saved_jobs().await.is_empty());

    let (status, _) = send(
        &app,
        post_json(
            "/api/auth/sign-up",
            None,
            json!({
                "email": "leaving@example.com",
                "password": "secret123",
                "account_type": "job_seeker"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    watcher.abort();
}

#[tokio::test]
async fn route_resolution_classifies_paths() {
    let (app, _, _) = setup_app();
    let id = Uuid::new_v4();

    let (status, body) = send(
        &app,
        get(&format!("/api/routes/resolve?path=/jobs/{}/apply", id), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["route"]["view"], "job_apply");
    assert_eq!(body["requires_sign_in"], true);

    let (_, unknown) = send(&app, get("/api/routes/resolve?path=/nowhere", None)).await;
    assert_eq!(unknown["route"]["view"], "not_found");
}

#[tokio::test]
async fn posting_quote_adds_featured_fee() {
    let (app, _, _) = setup_app();
    let (status, body) = send(&app, get("/api/jobs/quote?featured=true", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 149);
}
