//! Integration tests for the Google login flow.
//!
//! Run with: cargo test -p recipe-box-integration-tests --test login_flow

#![allow(clippy::unwrap_used)]

use reqwest::StatusCode;

use recipe_box_integration_tests::FakeAccount;
use recipe_box_integration_tests::harness::{
    GOOGLE_CLIENT_ID, GOOGLE_CLIENT_SECRET, TestApp, location, query_param,
};

fn alice() -> FakeAccount {
    FakeAccount::new("alice@example.com", "Alice")
}

// ============================================================================
// Login page
// ============================================================================

#[tokio::test]
async fn test_login_page_links_to_consent_screen() {
    let app = TestApp::spawn().await;
    let client = TestApp::client();

    let consent = app.consent_url(&client).await;

    assert_eq!(consent.path(), "/o/oauth2/auth");
    assert_eq!(query_param(&consent, "client_id").unwrap(), GOOGLE_CLIENT_ID);
    assert_eq!(
        query_param(&consent, "redirect_uri").unwrap(),
        app.url("/gCallback")
    );
    assert_eq!(query_param(&consent, "response_type").unwrap(), "code");
    assert_eq!(query_param(&consent, "scope").unwrap(), "profile email");
    assert_eq!(query_param(&consent, "access_type").unwrap(), "offline");

    let state = query_param(&consent, "state").unwrap();
    assert_eq!(state.len(), 32);
    assert!(state.chars().all(|c| c.is_ascii_alphanumeric()));
}

#[tokio::test]
async fn test_each_login_page_gets_a_new_state() {
    let app = TestApp::spawn().await;
    let client = TestApp::client();

    let first = query_param(&app.consent_url(&client).await, "state").unwrap();
    let second = query_param(&app.consent_url(&client).await, "state").unwrap();

    assert_ne!(first, second);
}

#[tokio::test]
async fn test_logged_in_user_skips_login_page() {
    let app = TestApp::spawn().await;
    let client = TestApp::client();
    app.login(&client, alice()).await;

    let response = app.get(&client, "/login").await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
}

// ============================================================================
// Callback
// ============================================================================

#[tokio::test]
async fn test_first_login_creates_user() {
    let app = TestApp::spawn().await;
    let client = TestApp::client();

    let user = app.login(&client, alice()).await;

    assert_eq!(user.email.as_str(), "alice@example.com");
    assert_eq!(user.name.as_deref(), Some("Alice"));
    assert_eq!(
        user.avatar.as_deref(),
        Some("https://avatars.example/Alice.png")
    );
    assert_eq!(app.users.all().len(), 1);

    let home = app.get(&client, "/").await;
    assert_eq!(home.status(), StatusCode::OK);
    assert!(home.text().await.unwrap().contains("Hi, Alice!"));
}

#[tokio::test]
async fn test_repeat_login_updates_the_same_user() {
    let app = TestApp::spawn().await;

    let first = app.login(&TestApp::client(), alice()).await;
    let second = app
        .login(
            &TestApp::client(),
            FakeAccount::new("alice@example.com", "Alice Liddell")
                .with_picture("https://avatars.example/new.png"),
        )
        .await;

    assert_eq!(first.id, second.id);
    assert_eq!(app.users.all().len(), 1);
    assert_eq!(second.name.as_deref(), Some("Alice Liddell"));
    assert_eq!(
        second.avatar.as_deref(),
        Some("https://avatars.example/new.png")
    );
    assert_ne!(first.tokens.access_token, second.tokens.access_token);
}

#[tokio::test]
async fn test_token_request_carries_client_credentials() {
    let app = TestApp::spawn().await;
    app.login(&TestApp::client(), alice()).await;

    let requests = app.google.token_requests();
    assert_eq!(requests.len(), 1);
    let form = &requests[0];
    assert_eq!(form["grant_type"], "authorization_code");
    assert_eq!(form["code"], "code-alice-example-com-1");
    assert_eq!(form["redirect_uri"], app.url("/gCallback"));
    assert_eq!(form["client_id"], GOOGLE_CLIENT_ID);
    assert_eq!(form["client_secret"], GOOGLE_CLIENT_SECRET);
}

#[tokio::test]
async fn test_full_token_response_is_stored() {
    let app = TestApp::spawn().await;

    let user = app.login(&TestApp::client(), alice()).await;

    let tokens = &user.tokens;
    assert_eq!(tokens.access_token, "ya29.code-alice-example-com-1");
    assert_eq!(tokens.token_type, "Bearer");
    assert_eq!(
        tokens.refresh_token.as_deref(),
        Some("1//refresh-code-alice-example-com-1")
    );
    assert_eq!(tokens.expires_in, Some(3599));
    assert!(tokens.expires_at().is_some());
    assert_eq!(
        tokens.extra.get("refresh_token_expires_in"),
        Some(&serde_json::json!(604_799))
    );
}

#[tokio::test]
async fn test_state_mismatch_is_rejected_and_state_is_spent() {
    let app = TestApp::spawn().await;
    let client = TestApp::client();
    let state = query_param(&app.consent_url(&client).await, "state").unwrap();
    app.google.issue_code("c1", alice());

    let response = app
        .get(&client, "/gCallback?code=c1&state=forgedforgedforgedforgedforged00")
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response.text().await.unwrap(), "Invalid state parameter.");
    assert!(app.users.all().is_empty());
    assert!(app.google.token_requests().is_empty());

    // The genuine state was discarded by the failed attempt.
    let retry = app
        .get(&client, &format!("/gCallback?code=c1&state={state}"))
        .await;
    assert_eq!(retry.status(), StatusCode::BAD_REQUEST);
    assert!(app.users.all().is_empty());
}

#[tokio::test]
async fn test_callback_without_login_page_is_rejected() {
    let app = TestApp::spawn().await;
    app.google.issue_code("c1", alice());

    let response = app
        .get(&TestApp::client(), "/gCallback?code=c1&state=anything")
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(app.users.all().is_empty());
}

#[tokio::test]
async fn test_denied_consent_is_forbidden() {
    let app = TestApp::spawn().await;
    let client = TestApp::client();
    app.consent_url(&client).await;

    let response = app.get(&client, "/gCallback?error=access_denied").await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(response.text().await.unwrap(), "You denied access.");
}

#[tokio::test]
async fn test_other_provider_error_is_bad_request() {
    let app = TestApp::spawn().await;
    let client = TestApp::client();
    app.consent_url(&client).await;

    let response = app.get(&client, "/gCallback?error=invalid_scope").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response.text().await.unwrap(), "Error encountered.");
}

#[tokio::test]
async fn test_bare_callback_restarts_login() {
    let app = TestApp::spawn().await;

    let response = app.get(&TestApp::client(), "/gCallback").await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");
}

#[tokio::test]
async fn test_rejected_code_creates_no_user() {
    let app = TestApp::spawn().await;
    let client = TestApp::client();
    let state = query_param(&app.consent_url(&client).await, "state").unwrap();

    let response = app
        .get(&client, &format!("/gCallback?code=never-issued&state={state}"))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(response.text().await.unwrap(), "HTTPError occurred.");
    assert!(app.users.all().is_empty());

    let home = app.get(&client, "/").await;
    assert_eq!(location(&home), "/login");
}

#[tokio::test]
async fn test_profile_failure_creates_no_user() {
    let app = TestApp::spawn().await;
    let client = TestApp::client();
    let state = query_param(&app.consent_url(&client).await, "state").unwrap();
    app.google.issue_code(
        "c1",
        alice().with_userinfo_status(StatusCode::INTERNAL_SERVER_ERROR),
    );

    let response = app
        .get(&client, &format!("/gCallback?code=c1&state={state}"))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(
        response.text().await.unwrap(),
        "Could not fetch your information."
    );
    assert!(app.users.all().is_empty());
}

// ============================================================================
// Logout and access control
// ============================================================================

#[tokio::test]
async fn test_logout_ends_the_session() {
    let app = TestApp::spawn().await;
    let client = TestApp::client();
    app.login(&client, alice()).await;

    let response = app.get(&client, "/logout").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");

    let home = app.get(&client, "/").await;
    assert_eq!(home.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&home), "/login");

    // The user row and its tokens survive logout.
    assert!(app.users.find("alice@example.com").is_some());
}

#[tokio::test]
async fn test_protected_routes_redirect_anonymous_users() {
    let app = TestApp::spawn().await;
    let client = TestApp::client();

    for path in ["/", "/seeMyRecipes", "/logout", "/remove/Soup"] {
        let response = app.get(&client, path).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "GET {path}");
        assert_eq!(location(&response), "/login", "GET {path}");
    }

    let response = app.save(&client, "Soup").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");
    assert!(app.recipes.all().is_empty());
}

#[tokio::test]
async fn test_sessions_are_independent() {
    let app = TestApp::spawn().await;
    let alice_browser = TestApp::client();
    let anonymous = TestApp::client();
    app.login(&alice_browser, alice()).await;

    assert_eq!(app.get(&alice_browser, "/").await.status(), StatusCode::OK);
    assert_eq!(location(&app.get(&anonymous, "/").await), "/login");
}
