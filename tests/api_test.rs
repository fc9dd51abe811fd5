use serde_json::{Value, json};
use std::sync::Arc;
use usergate::api;
use usergate::domain_model::TokenPurpose;
use usergate::infra_memory::MemoryOutbox;
use usergate::server::Server;
use usergate::settings::parse_settings;
use warp::Filter;
use warp::http::StatusCode;

struct Harness {
    outbox: Arc<MemoryOutbox>,
    filter: warp::filters::BoxedFilter<(Box<dyn warp::Reply>,)>,
}

fn harness() -> Harness {
    let settings = parse_settings(Some("settings/dev.toml")).unwrap();
    let outbox = Arc::new(MemoryOutbox::new());
    let server = Arc::new(Server::in_memory(&settings.auth, outbox.clone()).unwrap());
    let filter = api::v1::routes(server)
        .recover(api::v1::recover_error)
        .map(|reply| Box::new(reply) as Box<dyn warp::Reply>)
        .boxed();
    Harness { outbox, filter }
}

async fn post(h: &Harness, path: &str, body: Value) -> (StatusCode, Value) {
    let res = warp::test::request()
        .method("POST")
        .path(path)
        .json(&body)
        .reply(&h.filter)
        .await;
    (res.status(), serde_json::from_slice(res.body()).unwrap())
}

async fn get_me(h: &Harness, authorization: Option<&str>) -> (StatusCode, Value) {
    let mut req = warp::test::request().method("GET").path("/me");
    if let Some(value) = authorization {
        req = req.header("authorization", value);
    }
    let res = req.reply(&h.filter).await;
    (res.status(), serde_json::from_slice(res.body()).unwrap())
}

async fn register_alice(h: &Harness) -> Value {
    let (status, body) = post(
        h,
        "/register",
        json!({ "user_name": "alice", "email": "alice@test.com", "password": "correct-horse" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body
}

async fn activate_alice(h: &Harness) {
    register_alice(h).await;
    let token = h
        .outbox
        .last_token("alice@test.com", TokenPurpose::Activation)
        .unwrap();
    let (status, body) = post(h, "/activate", json!({ "token": token })).await;
    assert_eq!(status, StatusCode::OK, "{body}");
}

async fn login(h: &Harness, identifier: &str, password: &str) -> (StatusCode, Value) {
    post(
        h,
        "/login",
        json!({ "identifier": identifier, "password": password }),
    )
    .await
}

fn error_code(body: &Value) -> &str {
    assert_eq!(body["success"], false);
    body["error"]["code"].as_str().unwrap()
}

#[tokio::test]
async fn register_returns_inactive_public_user() {
    let h = harness();

    let body = register_alice(&h).await;

    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["user_name"], "alice");
    assert_eq!(body["data"]["email"], "alice@test.com");
    assert_eq!(body["data"]["is_active"], false);
    assert!(body["data"].get("password_hash").is_none());
    assert_eq!(h.outbox.notices().len(), 1);
}

#[tokio::test]
async fn duplicate_registration_is_a_conflict() {
    let h = harness();
    register_alice(&h).await;

    let (status, body) = post(
        &h,
        "/register",
        json!({ "user_name": "alice", "email": "other@test.com", "password": "correct-horse" }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error_code(&body), "UserNameTaken");

    let (status, body) = post(
        &h,
        "/register",
        json!({ "user_name": "other", "email": "alice@test.com", "password": "correct-horse" }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error_code(&body), "EmailTaken");
}

#[tokio::test]
async fn login_before_activation_is_forbidden() {
    let h = harness();
    register_alice(&h).await;

    let (status, body) = login(&h, "alice", "correct-horse").await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(error_code(&body), "AccountDisabled");
}

#[tokio::test]
async fn activated_user_logs_in_and_reads_me() {
    let h = harness();
    activate_alice(&h).await;

    let (status, body) = login(&h, "alice", "correct-horse").await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["user"]["is_active"], true);
    let token = body["data"]["access_token"].as_str().unwrap().to_string();

    let (status, me) = get_me(&h, Some(&format!("Bearer {token}"))).await;
    assert_eq!(status, StatusCode::OK, "{me}");
    assert_eq!(me["data"]["email"], "alice@test.com");
    assert_eq!(me["data"]["authorities"], json!(["ROLE_USER"]));
}

#[tokio::test]
async fn login_by_email_matches_login_by_user_name() {
    let h = harness();
    activate_alice(&h).await;

    let (_, by_name) = login(&h, "alice", "correct-horse").await;
    let (status, by_email) = login(&h, "alice@test.com", "correct-horse").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(by_name["data"]["user"]["id"], by_email["data"]["user"]["id"]);
}

#[tokio::test]
async fn bad_credentials_are_indistinguishable() {
    let h = harness();
    activate_alice(&h).await;

    let (wrong_pw_status, wrong_pw) = login(&h, "alice", "battery-staple").await;
    let (unknown_status, unknown) = login(&h, "nobody@test.com", "correct-horse").await;

    assert_eq!(wrong_pw_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_pw["error"], unknown["error"]);
}

#[tokio::test]
async fn me_requires_a_valid_bearer_token() {
    let h = harness();

    let (status, body) = get_me(&h, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&body), "InvalidToken");

    let (status, body) = get_me(&h, Some("Bearer not.a.jwt")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&body), "InvalidToken");

    let (status, body) = get_me(&h, Some("Basic YWxpY2U6cHc=")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&body), "InvalidToken");
}

#[tokio::test]
async fn password_reset_round_trip() {
    let h = harness();
    activate_alice(&h).await;

    let (status, _) = post(&h, "/password_reset", json!({ "identifier": "alice" })).await;
    assert_eq!(status, StatusCode::OK);
    let token = h
        .outbox
        .last_token("alice@test.com", TokenPurpose::PasswordReset)
        .unwrap();

    let (status, body) = post(
        &h,
        "/password_reset/confirm",
        json!({ "token": token, "password": "battery-staple" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");

    let (old_status, _) = login(&h, "alice", "correct-horse").await;
    let (new_status, _) = login(&h, "alice", "battery-staple").await;
    assert_eq!(old_status, StatusCode::UNAUTHORIZED);
    assert_eq!(new_status, StatusCode::OK);

    let (status, body) = post(
        &h,
        "/password_reset/confirm",
        json!({ "token": token, "password": "another-one" }),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&body), "InvalidToken");
}

#[tokio::test]
async fn activation_can_be_resent_until_redeemed() {
    let h = harness();
    register_alice(&h).await;
    let first = h
        .outbox
        .last_token("alice@test.com", TokenPurpose::Activation)
        .unwrap();

    let (status, body) = post(&h, "/activate/resend", json!({ "identifier": "alice" })).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let second = h
        .outbox
        .last_token("alice@test.com", TokenPurpose::Activation)
        .unwrap();
    assert_ne!(first, second);

    let (status, body) = post(&h, "/activate", json!({ "token": first })).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&body), "InvalidToken");

    let (status, body) = post(&h, "/activate", json!({ "token": second })).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["is_active"], true);
}

#[tokio::test]
async fn password_reset_for_unknown_identity_looks_successful() {
    let h = harness();

    let (status, body) = post(&h, "/password_reset", json!({ "identifier": "ghost" })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(h.outbox.notices().is_empty());
}

#[tokio::test]
async fn malformed_input_is_a_bad_request() {
    let h = harness();

    let (status, body) = post(&h, "/register", json!({ "user_name": "alice" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "InvalidInput");

    let (status, body) = post(
        &h,
        "/register",
        json!({ "user_name": "alice", "email": "not-an-email", "password": "correct-horse" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "InvalidInput");
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let h = harness();

    let res = warp::test::request()
        .method("GET")
        .path("/nowhere")
        .reply(&h.filter)
        .await;

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}
