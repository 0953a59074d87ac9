use chrono::{Duration as ChronoDuration, Utc};
use declarant_api::config::{AppConfig, BootstrapAdmin};
use declarant_auth::{AuthConfig, PrincipalId, SigningSecret, TokenCodec};
use reqwest::StatusCode;
use serde_json::{Value, json};

const SECRET: &str = "black-box-secret";
const ADMIN_DOCUMENT: &str = "1000";
const ADMIN_PASSWORD: &str = "admin-pass";

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        declarant_observability::tracing::init_for_tests();

        // Same router as prod, bound to an ephemeral port.
        let auth = AuthConfig::new(SigningSecret::new(SECRET).unwrap());
        let config = AppConfig::new(auth).with_bootstrap_admin(BootstrapAdmin {
            full_name: "Root Admin".to_string(),
            document_number: ADMIN_DOCUMENT.to_string(),
            password: Some(ADMIN_PASSWORD.to_string()),
        });
        let app = declarant_api::app::build_app(config)
            .await
            .expect("failed to build app");

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn login(client: &reqwest::Client, server: &TestServer, document: &str, password: &str) -> reqwest::Response {
    client
        .post(server.url("/auth/login"))
        .json(&json!({ "documentNumber": document, "password": password }))
        .send()
        .await
        .unwrap()
}

async fn login_token(client: &reqwest::Client, server: &TestServer, document: &str, password: &str) -> String {
    let res = login(client, server, document, password).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    body["token"].as_str().unwrap().to_string()
}

async fn register_juan(client: &reqwest::Client, server: &TestServer, admin_token: &str) -> Value {
    let res = client
        .post(server.url("/auth/register"))
        .bearer_auth(admin_token)
        .json(&json!({ "fullName": "Juan Pérez", "documentNumber": "12345678" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    res.json().await.unwrap()
}

#[tokio::test]
async fn health_is_public_even_with_a_garbage_token() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client.get(server.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .get(server.url("/health"))
        .bearer_auth("not-a-token")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn protected_route_without_token_is_unauthenticated() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client.get(server.url("/auth/check-auth-status")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(res.headers()["www-authenticate"], "Bearer");
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "unauthenticated");

    let res = client
        .get(server.url("/auth/check-auth-status"))
        .header("authorization", "Basic dXNlcjpwYXNz")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn bad_password_and_unknown_document_are_indistinguishable() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let wrong_password = login(&client, &server, ADMIN_DOCUMENT, "nope").await;
    let unknown_document = login(&client, &server, "999999", ADMIN_PASSWORD).await;

    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_document.status(), StatusCode::UNAUTHORIZED);

    let a: Value = wrong_password.json().await.unwrap();
    let b: Value = unknown_document.json().await.unwrap();
    assert_eq!(a, b);
    assert_eq!(a["error"], "invalid_credentials");
}

#[tokio::test]
async fn admin_registers_user_who_logs_in_with_default_secret() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let admin_token = login_token(&client, &server, ADMIN_DOCUMENT, ADMIN_PASSWORD).await;

    let created = register_juan(&client, &server, &admin_token).await;
    assert_eq!(created["message"], "User created successfully");
    assert_eq!(created["user"]["role"], "user");
    assert_eq!(created["user"]["isActive"], true);
    let user = created["user"].as_object().unwrap();
    assert!(!user.contains_key("password"));
    assert!(!user.keys().any(|k| k.to_lowercase().contains("hash")));

    let res = login(&client, &server, "12345678", "Ju12345678").await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["user"]["documentNumber"], "12345678");
    assert!(body["expiresAt"].is_string());

    let dup = client
        .post(server.url("/auth/register"))
        .bearer_auth(&admin_token)
        .json(&json!({ "fullName": "Someone Else", "documentNumber": "12345678" }))
        .send()
        .await
        .unwrap();
    assert_eq!(dup.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn regular_user_is_forbidden_from_admin_operations() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let admin_token = login_token(&client, &server, ADMIN_DOCUMENT, ADMIN_PASSWORD).await;
    let created = register_juan(&client, &server, &admin_token).await;
    let user_id = created["user"]["id"].as_str().unwrap().to_string();
    let user_token = login_token(&client, &server, "12345678", "Ju12345678").await;

    let res = client
        .post(server.url("/auth/register"))
        .bearer_auth(&user_token)
        .json(&json!({ "fullName": "Ana", "documentNumber": "555" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "forbidden");
    assert!(body["message"].as_str().unwrap().contains("admin"));

    let res = client
        .get(server.url(&format!("/users/{user_id}")))
        .bearer_auth(&user_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // Any authenticated role may check its own status.
    let res = client
        .get(server.url("/auth/check-auth-status"))
        .bearer_auth(&user_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["user"]["id"], user_id.as_str());
    assert!(!body["token"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn deactivation_invalidates_outstanding_tokens() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let admin_token = login_token(&client, &server, ADMIN_DOCUMENT, ADMIN_PASSWORD).await;
    let created = register_juan(&client, &server, &admin_token).await;
    let user_id = created["user"]["id"].as_str().unwrap().to_string();
    let user_token = login_token(&client, &server, "12345678", "Ju12345678").await;

    let res = client
        .post(server.url(&format!("/users/{user_id}/deactivate")))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["isActive"], false);

    let res = client
        .get(server.url("/auth/check-auth-status"))
        .bearer_auth(&user_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = login(&client, &server, "12345678", "Ju12345678").await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client
        .post(server.url(&format!("/users/{user_id}/activate")))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .get(server.url("/auth/check-auth-status"))
        .bearer_auth(&user_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn forged_expired_and_orphan_tokens_are_rejected() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let forged = TokenCodec::new(&AuthConfig::new(SigningSecret::new("other-secret").unwrap()))
        .issue(PrincipalId::new())
        .unwrap()
        .token;

    let codec = TokenCodec::new(&AuthConfig::new(SigningSecret::new(SECRET).unwrap()));
    let expired = codec
        .issue_at(PrincipalId::new(), Utc::now() - ChronoDuration::hours(2))
        .unwrap()
        .token;
    // Valid signature, but the subject was never registered.
    let orphan = codec.issue(PrincipalId::new()).unwrap().token;

    for token in [forged, expired, orphan, "garbage".to_string()] {
        let res = client
            .get(server.url("/auth/check-auth-status"))
            .bearer_auth(&token)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "token {token} admitted");
        let body: Value = res.json().await.unwrap();
        assert_eq!(body["error"], "unauthenticated");
    }
}

#[tokio::test]
async fn user_lookup_validates_ids() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let admin_token = login_token(&client, &server, ADMIN_DOCUMENT, ADMIN_PASSWORD).await;

    let res = client
        .get(server.url("/users/not-a-uuid"))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client
        .get(server.url(&format!("/users/{}", PrincipalId::new())))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn promoted_user_passes_admin_only_routes() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let admin_token = login_token(&client, &server, ADMIN_DOCUMENT, ADMIN_PASSWORD).await;
    let created = register_juan(&client, &server, &admin_token).await;
    let user_id = created["user"]["id"].as_str().unwrap().to_string();
    let user_token = login_token(&client, &server, "12345678", "Ju12345678").await;

    // Users cannot promote themselves.
    let res = client
        .put(server.url(&format!("/users/{user_id}/role")))
        .bearer_auth(&user_token)
        .json(&json!({ "role": "admin" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = client
        .put(server.url(&format!("/users/{user_id}/role")))
        .bearer_auth(&admin_token)
        .json(&json!({ "role": "admin" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["role"], "admin");

    // The role is read per request, so the existing token now carries admin rights.
    let res = client
        .get(server.url(&format!("/users/{user_id}")))
        .bearer_auth(&user_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .put(server.url(&format!("/users/{user_id}/role")))
        .bearer_auth(&admin_token)
        .json(&json!({ "role": "root" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_bodies_get_json_errors() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let admin_token = login_token(&client, &server, ADMIN_DOCUMENT, ADMIN_PASSWORD).await;

    let res = client
        .post(server.url("/auth/login"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_body");
    assert!(body["message"].is_string());

    let res = client
        .post(server.url("/auth/login"))
        .json(&json!({ "documentNumber": ADMIN_DOCUMENT }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_body");

    let res = client
        .post(server.url("/auth/register"))
        .bearer_auth(&admin_token)
        .json(&json!({ "fullName": "No Document" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_body");
}
