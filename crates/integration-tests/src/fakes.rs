//! Fake upstream servers.
//!
//! Both fakes are small axum apps served on `127.0.0.1:0`. Tests configure
//! them up front (which codes are valid, which searches return what) and
//! inspect what the application sent them afterwards.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::{
    Form, Json, Router,
    extract::{Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::json;

/// Serve `router` on an ephemeral local port and return its base URL.
pub async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

// =============================================================================
// Google
// =============================================================================

/// A Google account the fake provider will log in.
#[derive(Debug, Clone)]
pub struct FakeAccount {
    pub email: String,
    pub name: Option<String>,
    pub picture: Option<String>,
    /// Status the userinfo endpoint answers with for this account.
    pub userinfo_status: StatusCode,
}

impl FakeAccount {
    #[must_use]
    pub fn new(email: &str, name: &str) -> Self {
        Self {
            email: email.to_string(),
            name: Some(name.to_string()),
            picture: Some(format!("https://avatars.example/{name}.png")),
            userinfo_status: StatusCode::OK,
        }
    }

    #[must_use]
    pub fn with_picture(mut self, picture: &str) -> Self {
        self.picture = Some(picture.to_string());
        self
    }

    #[must_use]
    pub const fn with_userinfo_status(mut self, status: StatusCode) -> Self {
        self.userinfo_status = status;
        self
    }
}

#[derive(Default)]
struct GoogleState {
    /// Authorization code -> account.
    codes: HashMap<String, FakeAccount>,
    /// Issued access token -> account.
    tokens: HashMap<String, FakeAccount>,
    /// Every form posted to the token endpoint.
    token_requests: Vec<HashMap<String, String>>,
}

/// Fake Google token and userinfo endpoints.
#[derive(Clone)]
pub struct FakeGoogle {
    pub base_url: String,
    state: Arc<Mutex<GoogleState>>,
}

impl FakeGoogle {
    /// Start the fake provider.
    pub async fn start() -> Self {
        let state = Arc::new(Mutex::new(GoogleState::default()));
        let router = Router::new()
            .route("/o/oauth2/auth", get(|| async { "consent screen" }))
            .route("/token", post(token))
            .route("/userinfo", get(userinfo))
            .with_state(Arc::clone(&state));

        Self {
            base_url: serve(router).await,
            state,
        }
    }

    #[must_use]
    pub fn auth_url(&self) -> String {
        format!("{}/o/oauth2/auth", self.base_url)
    }

    #[must_use]
    pub fn token_url(&self) -> String {
        format!("{}/token", self.base_url)
    }

    #[must_use]
    pub fn userinfo_url(&self) -> String {
        format!("{}/userinfo", self.base_url)
    }

    /// Make `code` exchangeable for a token belonging to `account`.
    pub fn issue_code(&self, code: &str, account: FakeAccount) {
        self.state
            .lock()
            .unwrap()
            .codes
            .insert(code.to_string(), account);
    }

    /// Forms received by the token endpoint, oldest first.
    #[must_use]
    pub fn token_requests(&self) -> Vec<HashMap<String, String>> {
        self.state.lock().unwrap().token_requests.clone()
    }
}

async fn token(
    State(state): State<Arc<Mutex<GoogleState>>>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    let mut state = state.lock().unwrap();
    state.token_requests.push(form.clone());

    let account = form
        .get("code")
        .and_then(|code| state.codes.remove(code).map(|account| (code.clone(), account)));

    let Some((code, account)) = account else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "invalid_grant", "error_description": "Bad Request"})),
        )
            .into_response();
    };

    let access_token = format!("ya29.{code}");
    state.tokens.insert(access_token.clone(), account);

    Json(json!({
        "access_token": access_token,
        "expires_in": 3599,
        "refresh_token": format!("1//refresh-{code}"),
        "scope": "https://www.googleapis.com/auth/userinfo.profile https://www.googleapis.com/auth/userinfo.email",
        "token_type": "Bearer",
        "refresh_token_expires_in": 604_799
    }))
    .into_response()
}

async fn userinfo(State(state): State<Arc<Mutex<GoogleState>>>, headers: HeaderMap) -> Response {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    let account = bearer.and_then(|token| state.lock().unwrap().tokens.get(token).cloned());

    let Some(account) = account else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": {"code": 401, "status": "UNAUTHENTICATED"}})),
        )
            .into_response();
    };

    if account.userinfo_status != StatusCode::OK {
        return (account.userinfo_status, "upstream trouble").into_response();
    }

    Json(json!({
        "id": "1234567890",
        "email": account.email,
        "verified_email": true,
        "name": account.name,
        "picture": account.picture,
        "locale": "en"
    }))
    .into_response()
}

// =============================================================================
// Edamam
// =============================================================================

/// One recipe in a canned search response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureHit {
    pub label: String,
    pub url: String,
    pub image: String,
}

impl FixtureHit {
    #[must_use]
    pub fn new(label: &str) -> Self {
        let slug = label.to_lowercase().replace(' ', "-");
        Self {
            label: label.to_string(),
            url: format!("https://recipes.example/{slug}"),
            image: format!("https://img.example/{slug}.jpg"),
        }
    }
}

/// Canned response for one search term.
#[derive(Debug, Clone)]
enum Fixture {
    Hits(Vec<FixtureHit>),
    Status(StatusCode),
    Body(String),
}

#[derive(Default)]
struct EdamamState {
    fixtures: HashMap<String, Fixture>,
    /// Query strings received, oldest first.
    requests: Vec<HashMap<String, String>>,
}

/// Fake Edamam `/search` endpoint.
#[derive(Clone)]
pub struct FakeEdamam {
    pub base_url: String,
    state: Arc<Mutex<EdamamState>>,
}

impl FakeEdamam {
    /// Start the fake recipe API.
    pub async fn start() -> Self {
        let state = Arc::new(Mutex::new(EdamamState::default()));
        let router = Router::new()
            .route("/search", get(search))
            .with_state(Arc::clone(&state));

        Self {
            base_url: serve(router).await,
            state,
        }
    }

    /// Answer searches for `term` with these hits.
    pub fn add_hits(&self, term: &str, hits: Vec<FixtureHit>) {
        self.insert(term, Fixture::Hits(hits));
    }

    /// Answer searches for `term` with an error status.
    pub fn fail_with(&self, term: &str, status: StatusCode) {
        self.insert(term, Fixture::Status(status));
    }

    /// Answer searches for `term` with a raw body.
    pub fn respond_with_body(&self, term: &str, body: &str) {
        self.insert(term, Fixture::Body(body.to_string()));
    }

    /// Query strings received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<HashMap<String, String>> {
        self.state.lock().unwrap().requests.clone()
    }

    fn insert(&self, term: &str, fixture: Fixture) {
        self.state
            .lock()
            .unwrap()
            .fixtures
            .insert(term.to_string(), fixture);
    }
}

async fn search(
    State(state): State<Arc<Mutex<EdamamState>>>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let mut state = state.lock().unwrap();
    state.requests.push(query.clone());

    let term = query.get("q").cloned().unwrap_or_default();
    let fixture = state
        .fixtures
        .get(&term)
        .cloned()
        .unwrap_or(Fixture::Hits(Vec::new()));

    match fixture {
        Fixture::Hits(hits) => {
            let hits: Vec<_> = hits
                .iter()
                .map(|h| {
                    json!({
                        "recipe": {
                            "uri": format!("http://www.edamam.com/ontologies/edamam.owl#recipe_{}", h.label.len()),
                            "label": h.label,
                            "image": h.image,
                            "url": h.url,
                            "yield": 4.0,
                            "calories": 1234.5
                        },
                        "bookmarked": false
                    })
                })
                .collect();
            Json(json!({
                "q": term,
                "from": 0,
                "to": hits.len(),
                "count": hits.len(),
                "more": false,
                "hits": hits
            }))
            .into_response()
        }
        Fixture::Status(status) => (status, "upstream error").into_response(),
        Fixture::Body(body) => (StatusCode::OK, body).into_response(),
    }
}
