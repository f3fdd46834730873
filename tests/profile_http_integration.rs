//! Integration tests for the profile HTTP endpoints.
//!
//! Drives the real router (auth middleware, extractors, handlers, in-memory
//! repository) with `tower::ServiceExt::oneshot`.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use async_trait::async_trait;
use axum::Router;
use proptest::prelude::*;
use serde_json::{json, Value};
use tower::ServiceExt;

use tracker_profile::adapters::auth::MockSessionValidator;
use tracker_profile::adapters::http::{build_router, ProfileHandlers};
use tracker_profile::adapters::profile::InMemoryProfileRepository;
use tracker_profile::application::{GetProfileHandler, UpdateProfileHandler};
use tracker_profile::domain::foundation::{DomainError, UserId};
use tracker_profile::domain::profile::Profile;
use tracker_profile::ports::ProfileRepository;

const USER_TOKEN: &str = "user-token";
const ADMIN_TOKEN: &str = "admin-token";
const PATH: &str = "/api/profile/";

// =============================================================================
// Test Infrastructure
// =============================================================================

struct TestApp {
    router: Router,
    repository: Arc<InMemoryProfileRepository>,
}

impl TestApp {
    fn new() -> Self {
        let repository = Arc::new(InMemoryProfileRepository::new());
        let validator = MockSessionValidator::new()
            .with_test_user(USER_TOKEN, UserId::new("user@gmail.com").unwrap())
            .with_test_user(ADMIN_TOKEN, UserId::new("admin@gmail.com").unwrap());
        let handlers = ProfileHandlers::new(
            Arc::new(GetProfileHandler::new(repository.clone())),
            Arc::new(UpdateProfileHandler::new(repository.clone())),
        );
        Self {
            router: build_router(handlers, Arc::new(validator)),
            repository,
        }
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Option<Value>) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            None
        } else {
            Some(serde_json::from_slice(&bytes).unwrap())
        };
        (status, body)
    }

    async fn get(&self, token: Option<&str>) -> (StatusCode, Option<Value>) {
        self.send(request(Method::GET, PATH, token, None)).await
    }

    async fn put(&self, token: Option<&str>, body: Value) -> (StatusCode, Option<Value>) {
        self.send(request(Method::PUT, PATH, token, Some(body.to_string())))
            .await
    }
}

fn request(method: Method, uri: &str, token: Option<&str>, body: Option<String>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

fn valid_update() -> Value {
    json!({
        "mailNotifications": ["EMAIL_NOTIFICATIONS"],
        "contacts": [{"code": "LINKEDIN", "value": "new_linkedin_url"}]
    })
}

fn violations(body: &Option<Value>) -> Vec<Value> {
    body.as_ref().unwrap()["details"]["violations"]
        .as_array()
        .unwrap()
        .clone()
}

// =============================================================================
// Reads
// =============================================================================

#[tokio::test]
async fn get_returns_profile_for_authenticated_user() {
    let app = TestApp::new();

    let (status, body) = app.get(Some(USER_TOKEN)).await;

    assert_eq!(status, StatusCode::OK);
    let body = body.unwrap();
    assert_eq!(body["email"], "user@gmail.com");
    assert_eq!(body["mailNotifications"], json!([]));
    assert_eq!(body["contacts"], json!([]));
}

#[tokio::test]
async fn get_without_identity_is_401() {
    let app = TestApp::new();

    let (status, body) = app.get(None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body.unwrap()["code"], "UNAUTHENTICATED");
}

#[tokio::test]
async fn get_does_not_persist_empty_profile() {
    let app = TestApp::new();

    app.get(Some(USER_TOKEN)).await;

    assert!(app.repository.is_empty().await);
}

#[tokio::test]
async fn path_without_trailing_slash_is_served() {
    let app = TestApp::new();

    let (status, _) = app
        .send(request(Method::GET, "/api/profile", Some(USER_TOKEN), None))
        .await;

    assert_eq!(status, StatusCode::OK);
}

// =============================================================================
// Updates
// =============================================================================

#[tokio::test]
async fn update_then_get_reflects_submitted_state() {
    let app = TestApp::new();

    let (status, body) = app.put(Some(USER_TOKEN), valid_update()).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_none());

    let (status, body) = app.get(Some(USER_TOKEN)).await;
    assert_eq!(status, StatusCode::OK);
    let body = body.unwrap();
    assert_eq!(body["mailNotifications"][0], "EMAIL_NOTIFICATIONS");
    assert_eq!(body["contacts"][0]["code"], "LINKEDIN");
    assert_eq!(body["contacts"][0]["value"], "new_linkedin_url");
}

#[tokio::test]
async fn update_without_identity_is_401() {
    let app = TestApp::new();

    let (status, _) = app.put(None, valid_update()).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(app.repository.is_empty().await);
}

#[tokio::test]
async fn identity_is_checked_before_body() {
    let app = TestApp::new();

    let (status, _) = app
        .send(request(Method::PUT, PATH, None, Some("{not json".to_string())))
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn null_mail_notifications_is_400() {
    let app = TestApp::new();

    let (status, body) = app
        .put(
            Some(USER_TOKEN),
            json!({"mailNotifications": null, "contacts": []}),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body.as_ref().unwrap()["code"], "VALIDATION_FAILED");
    let violations = violations(&body);
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0]["field"], "mailNotifications");
    assert_eq!(violations[0]["rule"], "REQUIRED");
}

#[tokio::test]
async fn null_contacts_is_400() {
    let app = TestApp::new();

    let (status, body) = app
        .put(
            Some(USER_TOKEN),
            json!({"mailNotifications": ["EMAIL_NOTIFICATIONS"], "contacts": null}),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(violations(&body)[0]["field"], "contacts");
}

#[tokio::test]
async fn blank_mail_notification_is_400() {
    let app = TestApp::new();

    let (status, body) = app
        .put(Some(USER_TOKEN), json!({"mailNotifications": [""], "contacts": []}))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let violations = violations(&body);
    assert_eq!(violations[0]["field"], "mailNotifications[0]");
    assert_eq!(violations[0]["rule"], "NOT_BLANK");
}

#[tokio::test]
async fn blank_contact_is_400() {
    let app = TestApp::new();

    let (status, body) = app
        .put(
            Some(USER_TOKEN),
            json!({"mailNotifications": [], "contacts": [{"code": "", "value": ""}]}),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let fields: Vec<_> = violations(&body)
        .iter()
        .map(|v| v["field"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(fields, vec!["contacts[0].code", "contacts[0].value"]);
}

#[tokio::test]
async fn every_violation_is_reported() {
    let app = TestApp::new();

    let (status, body) = app
        .put(
            Some(USER_TOKEN),
            json!({"mailNotifications": ["ok", "  "], "contacts": [{"code": "GITHUB"}]}),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(violations(&body).len(), 2);
}

#[tokio::test]
async fn unreadable_body_is_400() {
    let app = TestApp::new();

    let (status, body) = app
        .send(request(
            Method::PUT,
            PATH,
            Some(USER_TOKEN),
            Some("{not json".to_string()),
        ))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body.unwrap()["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn rejected_update_leaves_profile_unchanged() {
    let app = TestApp::new();
    app.put(Some(USER_TOKEN), valid_update()).await;
    let (_, before) = app.get(Some(USER_TOKEN)).await;

    let (status, _) = app
        .put(
            Some(USER_TOKEN),
            json!({"mailNotifications": [], "contacts": null}),
        )
        .await;
    let (_, after) = app.get(Some(USER_TOKEN)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(before, after);
}

#[tokio::test]
async fn update_replaces_collections_wholesale() {
    let app = TestApp::new();
    app.put(Some(USER_TOKEN), valid_update()).await;

    app.put(
        Some(USER_TOKEN),
        json!({"mailNotifications": [], "contacts": [{"code": "GITHUB", "value": "octocat"}]}),
    )
    .await;

    let (_, body) = app.get(Some(USER_TOKEN)).await;
    let body = body.unwrap();
    assert_eq!(body["mailNotifications"], json!([]));
    assert_eq!(
        body["contacts"],
        json!([{"code": "GITHUB", "value": "octocat"}])
    );
}

#[tokio::test]
async fn client_supplied_id_is_ignored() {
    let app = TestApp::new();
    let mut update = valid_update();
    update["id"] = json!("admin@gmail.com");

    let (status, _) = app.put(Some(USER_TOKEN), update).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, admin) = app.get(Some(ADMIN_TOKEN)).await;
    assert_eq!(admin.unwrap()["mailNotifications"], json!([]));
    let (_, user) = app.get(Some(USER_TOKEN)).await;
    assert_eq!(user.unwrap()["id"], "user@gmail.com");
}

#[tokio::test]
async fn profiles_are_isolated_per_user() {
    let app = TestApp::new();

    app.put(Some(ADMIN_TOKEN), valid_update()).await;

    let (_, user) = app.get(Some(USER_TOKEN)).await;
    assert_eq!(user.unwrap()["contacts"], json!([]));
    let (_, admin) = app.get(Some(ADMIN_TOKEN)).await;
    assert_eq!(admin.unwrap()["email"], "admin@gmail.com");
}

// =============================================================================
// Storage faults
// =============================================================================

/// Storage whose stored row no longer passes the aggregate's checks.
struct CorruptRowRepository;

#[async_trait]
impl ProfileRepository for CorruptRowRepository {
    async fn find_by_owner(&self, _owner: &UserId) -> Result<Option<Profile>, DomainError> {
        Err(DomainError::database("Corrupt profile row: Field 'code' cannot be empty"))
    }

    async fn save(&self, _profile: &Profile) -> Result<(), DomainError> {
        Ok(())
    }
}

fn corrupt_row_app() -> TestApp {
    let repository: Arc<dyn ProfileRepository> = Arc::new(CorruptRowRepository);
    let validator = MockSessionValidator::new()
        .with_test_user(USER_TOKEN, UserId::new("user@gmail.com").unwrap());
    let handlers = ProfileHandlers::new(
        Arc::new(GetProfileHandler::new(repository.clone())),
        Arc::new(UpdateProfileHandler::new(repository)),
    );
    TestApp {
        router: build_router(handlers, Arc::new(validator)),
        repository: Arc::new(InMemoryProfileRepository::new()),
    }
}

#[tokio::test]
async fn corrupt_stored_profile_is_500_on_get() {
    let app = corrupt_row_app();

    let (status, body) = app.get(Some(USER_TOKEN)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let body = body.unwrap();
    assert_eq!(body["code"], "INTERNAL_ERROR");
    assert!(body.get("details").is_none());
}

#[tokio::test]
async fn corrupt_stored_profile_is_500_on_put() {
    let app = corrupt_row_app();

    let (status, body) = app.put(Some(USER_TOKEN), valid_update()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body.unwrap()["code"], "INTERNAL_ERROR");
}

// =============================================================================
// Properties
// =============================================================================

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
        .block_on(future)
}

fn non_blank() -> impl Strategy<Value = String> {
    "[A-Za-z0-9_]{1,16}"
}

fn blank() -> impl Strategy<Value = String> {
    "[ \t]{0,3}"
}

fn contact() -> impl Strategy<Value = (String, String)> {
    (non_blank(), non_blank())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn valid_updates_round_trip(
        prefs in prop::collection::vec(non_blank(), 0..6),
        contacts in prop::collection::vec(contact(), 0..6),
    ) {
        let app = TestApp::new();
        let payload = json!({
            "mailNotifications": prefs,
            "contacts": contacts.iter().map(|(c, v)| json!({"code": c, "value": v})).collect::<Vec<_>>(),
        });

        let (status, body) = block_on(async {
            let (status, _) = app.put(Some(USER_TOKEN), payload.clone()).await;
            (status, app.get(Some(USER_TOKEN)).await.1)
        });

        prop_assert_eq!(status, StatusCode::NO_CONTENT);
        let body = body.unwrap();

        let mut expected_prefs = prefs.clone();
        expected_prefs.sort();
        expected_prefs.dedup();
        prop_assert_eq!(&body["mailNotifications"], &json!(expected_prefs));

        let mut expected_contacts = contacts.clone();
        expected_contacts.sort();
        expected_contacts.dedup();
        let expected: Vec<Value> = expected_contacts
            .iter()
            .map(|(c, v)| json!({"code": c, "value": v}))
            .collect();
        prop_assert_eq!(&body["contacts"], &json!(expected));
    }

    #[test]
    fn blank_preference_is_rejected_without_mutation(
        prefs in prop::collection::vec(non_blank(), 0..4),
        bad in blank(),
        at in 0usize..4,
    ) {
        let app = TestApp::new();
        let mut prefs = prefs;
        let at = at.min(prefs.len());
        prefs.insert(at, bad);

        let (before, status, after) = block_on(async {
            app.put(Some(USER_TOKEN), valid_update()).await;
            let before = app.get(Some(USER_TOKEN)).await.1;
            let (status, _) = app
                .put(Some(USER_TOKEN), json!({"mailNotifications": prefs, "contacts": []}))
                .await;
            (before, status, app.get(Some(USER_TOKEN)).await.1)
        });

        prop_assert_eq!(status, StatusCode::BAD_REQUEST);
        prop_assert_eq!(before, after);
    }

    #[test]
    fn blank_contact_member_is_rejected(
        (code, value) in prop_oneof![
            (blank(), non_blank()),
            (non_blank(), blank()),
            (blank(), blank()),
        ],
    ) {
        let app = TestApp::new();
        let payload = json!({
            "mailNotifications": [],
            "contacts": [{"code": code, "value": value}],
        });

        let (status, _) = block_on(app.put(Some(USER_TOKEN), payload));

        prop_assert_eq!(status, StatusCode::BAD_REQUEST);
        prop_assert!(block_on(app.repository.is_empty()));
    }

    #[test]
    fn unauthenticated_requests_fail_whatever_the_payload(
        prefs in prop::option::of(prop::collection::vec(any::<String>(), 0..3)),
    ) {
        let app = TestApp::new();
        let payload = json!({"mailNotifications": prefs, "contacts": []});

        let (put_status, get_status) = block_on(async {
            (app.put(None, payload).await.0, app.get(None).await.0)
        });

        prop_assert_eq!(put_status, StatusCode::UNAUTHORIZED);
        prop_assert_eq!(get_status, StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn same_update_twice_equals_once(
        prefs in prop::collection::vec(non_blank(), 0..4),
        contacts in prop::collection::vec(contact(), 0..4),
    ) {
        let payload = json!({
            "mailNotifications": prefs,
            "contacts": contacts.iter().map(|(c, v)| json!({"code": c, "value": v})).collect::<Vec<_>>(),
        });

        let once = TestApp::new();
        let twice = TestApp::new();
        let (once_body, twice_body) = block_on(async {
            once.put(Some(USER_TOKEN), payload.clone()).await;
            twice.put(Some(USER_TOKEN), payload.clone()).await;
            twice.put(Some(USER_TOKEN), payload.clone()).await;
            (once.get(Some(USER_TOKEN)).await.1, twice.get(Some(USER_TOKEN)).await.1)
        });

        prop_assert_eq!(once_body, twice_body);
    }
}
