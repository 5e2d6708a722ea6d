//! Integration tests for the headless auth commands against a mock backend.

use std::fs;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const USER_ID: &str = "6d9f7a52-9f3e-4a1b-8c2d-0e5b7f3a1c9d";

fn temp_home() -> TempDir {
    TempDir::new().expect("create temp gatehouse home")
}

fn can_bind_localhost() -> bool {
    std::net::TcpListener::bind("127.0.0.1:0").is_ok()
}

fn token_response() -> serde_json::Value {
    json!({
        "access_token": "access-abc",
        "refresh_token": "refresh-abc",
        "expires_in": 3600,
        "user": { "id": USER_ID, "email": "ada@example.com" }
    })
}

fn persisted_session() -> serde_json::Value {
    json!({
        "access_token": "access-abc",
        "refresh_token": "refresh-abc",
        "expires_at": chrono_free_future_timestamp(),
        "user": { "id": USER_ID, "email": "ada@example.com" }
    })
}

// Far enough in the future that the expiry leeway never trips.
fn chrono_free_future_timestamp() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs();
    i64::try_from(now).unwrap() + 3600
}

#[tokio::test]
async fn test_login_persists_session() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = temp_home();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .and(query_param("grant_type", "password"))
        .and(header("apikey", "anon-123"))
        .and(body_json(json!({
            "email": "ada@example.com",
            "password": "secret1"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_response()))
        .expect(1)
        .mount(&server)
        .await;

    cargo_bin_cmd!("gatehouse")
        .env("GATEHOUSE_HOME", home.path())
        .env("GATEHOUSE_BACKEND_URL", server.uri())
        .env("GATEHOUSE_ANON_KEY", "anon-123")
        .args(["login", "--email", "ada@example.com", "--password", "secret1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Signed in as ada@example.com"));

    let session = fs::read_to_string(home.path().join("session.json")).unwrap();
    assert!(session.contains("access-abc"));
    assert!(session.contains(USER_ID));
}

#[tokio::test]
async fn test_login_rejection_surfaces_backend_message() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = temp_home();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error_code": "invalid_credentials",
            "msg": "Invalid login credentials"
        })))
        .mount(&server)
        .await;

    cargo_bin_cmd!("gatehouse")
        .env("GATEHOUSE_HOME", home.path())
        .env("GATEHOUSE_BACKEND_URL", server.uri())
        .env("GATEHOUSE_ANON_KEY", "anon-123")
        .args(["login", "--email", "ada@example.com", "--password", "wrong12"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid login credentials"));

    assert!(!home.path().join("session.json").exists());
}

#[tokio::test]
async fn test_login_reads_password_from_env() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = temp_home();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .and(query_param("grant_type", "password"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_response()))
        .mount(&server)
        .await;

    cargo_bin_cmd!("gatehouse")
        .env("GATEHOUSE_HOME", home.path())
        .env("GATEHOUSE_BACKEND_URL", server.uri())
        .env("GATEHOUSE_ANON_KEY", "anon-123")
        .env("GATEHOUSE_PASSWORD", "secret1")
        .args(["login", "--email", "ada@example.com"])
        .assert()
        .success();
}

#[tokio::test]
async fn test_whoami_with_persisted_session() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = temp_home();
    let server = MockServer::start().await;
    fs::write(
        home.path().join("session.json"),
        persisted_session().to_string(),
    )
    .unwrap();

    cargo_bin_cmd!("gatehouse")
        .env("GATEHOUSE_HOME", home.path())
        .env("GATEHOUSE_BACKEND_URL", server.uri())
        .env("GATEHOUSE_ANON_KEY", "anon-123")
        .arg("whoami")
        .assert()
        .success()
        .stdout(predicate::str::contains("ada@example.com"))
        .stdout(predicate::str::contains(USER_ID));
}

#[tokio::test]
async fn test_whoami_without_session_fails() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = temp_home();
    let server = MockServer::start().await;

    cargo_bin_cmd!("gatehouse")
        .env("GATEHOUSE_HOME", home.path())
        .env("GATEHOUSE_BACKEND_URL", server.uri())
        .env("GATEHOUSE_ANON_KEY", "anon-123")
        .arg("whoami")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not signed in"));
}

#[tokio::test]
async fn test_logout_clears_persisted_session() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = temp_home();
    let server = MockServer::start().await;
    fs::write(
        home.path().join("session.json"),
        persisted_session().to_string(),
    )
    .unwrap();

    Mock::given(method("POST"))
        .and(path("/auth/v1/logout"))
        .and(header("Authorization", "Bearer access-abc"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    cargo_bin_cmd!("gatehouse")
        .env("GATEHOUSE_HOME", home.path())
        .env("GATEHOUSE_BACKEND_URL", server.uri())
        .env("GATEHOUSE_ANON_KEY", "anon-123")
        .arg("logout")
        .assert()
        .success()
        .stdout(predicate::str::contains("Signed out."));

    assert!(!home.path().join("session.json").exists());
}

#[tokio::test]
async fn test_recover_posts_email() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = temp_home();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/v1/recover"))
        .and(body_json(json!({ "email": "ada@example.com" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    cargo_bin_cmd!("gatehouse")
        .env("GATEHOUSE_HOME", home.path())
        .env("GATEHOUSE_BACKEND_URL", server.uri())
        .env("GATEHOUSE_ANON_KEY", "anon-123")
        .args(["recover", "--email", "ada@example.com"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Recovery link sent"));
}
