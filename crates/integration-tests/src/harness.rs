//! The application under test.
//!
//! [`TestApp::spawn`] starts both fakes, points a config at them, and serves
//! the real router (with in-memory stores and session storage) on an
//! ephemeral port. Tests drive it with a cookie-keeping `reqwest` client that
//! does not follow redirects, so every 303 can be asserted on.

use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::LOCATION;
use secrecy::SecretString;
use tower_sessions::MemoryStore;
use url::Url;

use recipe_box_web::config::{EdamamConfig, GoogleOAuthConfig, RecipeBoxConfig};
use recipe_box_web::middleware::create_session_layer;
use recipe_box_web::models::User;
use recipe_box_web::state::AppState;

use crate::fakes::{FakeAccount, FakeEdamam, FakeGoogle};
use crate::stores::{MemoryRecipeStore, MemoryUserStore};

/// Edamam credentials the app is configured with.
pub const EDAMAM_APP_ID: &str = "edamam-id-4821";
pub const EDAMAM_APP_KEY: &str = "k9Qz7rVb2LmX4tWp8NcJ";

/// Google client ID the app is configured with.
pub const GOOGLE_CLIENT_ID: &str = "1234-recipebox.apps.googleusercontent.com";
pub const GOOGLE_CLIENT_SECRET: &str = "Gx7rQ2mVz9LkP4wTbN8c";

/// Query parameters every consent URL must carry.
const CONSENT_PARAMS: [&str; 6] = [
    "client_id",
    "redirect_uri",
    "response_type",
    "scope",
    "access_type",
    "state",
];

/// A running app plus everything it talks to.
pub struct TestApp {
    pub base_url: String,
    pub config: RecipeBoxConfig,
    pub google: FakeGoogle,
    pub edamam: FakeEdamam,
    pub users: Arc<MemoryUserStore>,
    pub recipes: Arc<MemoryRecipeStore>,
    logins: AtomicUsize,
}

impl TestApp {
    /// Start the fakes and serve the app.
    pub async fn spawn() -> Self {
        let google = FakeGoogle::start().await;
        let edamam = FakeEdamam::start().await;

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{addr}");

        let config = RecipeBoxConfig {
            database_url: SecretString::from("postgres://unused/recipe_box"),
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: addr.port(),
            base_url: base_url.clone(),
            session_secret: SecretString::from("Zr8!kQ2#vLp9@wXm4$Tn7^bYc1&Hs6*Jd"),
            google: GoogleOAuthConfig {
                client_id: GOOGLE_CLIENT_ID.to_string(),
                client_secret: SecretString::from(GOOGLE_CLIENT_SECRET),
                auth_url: google.auth_url(),
                token_url: google.token_url(),
                userinfo_url: google.userinfo_url(),
            },
            edamam: EdamamConfig {
                app_id: EDAMAM_APP_ID.to_string(),
                app_key: SecretString::from(EDAMAM_APP_KEY),
                base_url: edamam.base_url.clone(),
            },
            http_timeout: Duration::from_secs(5),
            sentry_dsn: None,
            sentry_environment: None,
        };

        let users = Arc::new(MemoryUserStore::default());
        let recipes = Arc::new(MemoryRecipeStore::default());
        let state = AppState::with_stores(
            config.clone(),
            users.clone(),
            recipes.clone(),
            None,
        )
        .unwrap();
        let session_layer = create_session_layer(MemoryStore::default(), &config);
        let router = recipe_box_web::app(state, session_layer);

        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        Self {
            base_url,
            config,
            google,
            edamam,
            users,
            recipes,
            logins: AtomicUsize::new(0),
        }
    }

    /// Absolute URL for a path on the app.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// A fresh browser: own cookie jar, no redirect following.
    #[must_use]
    pub fn client() -> reqwest::Client {
        reqwest::Client::builder()
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .unwrap()
    }

    /// Load `/login` and return the consent URL it links to.
    pub async fn consent_url(&self, client: &reqwest::Client) -> Url {
        let response = client.get(self.url("/login")).send().await.unwrap();
        assert_eq!(response.status(), StatusCode::OK, "GET /login");
        let body = response.text().await.unwrap();
        let url = auth_url_from_login_page(&body);
        for param in CONSENT_PARAMS {
            assert!(
                query_param(&url, param).is_some(),
                "consent URL is missing {param}: {url}"
            );
        }
        url
    }

    /// Run the whole login flow for `account` and return the stored user.
    ///
    /// Every call exchanges a fresh authorization code, so repeat logins get
    /// distinct tokens.
    pub async fn login(&self, client: &reqwest::Client, account: FakeAccount) -> User {
        let email = account.email.clone();
        let consent = self.consent_url(client).await;
        let state = query_param(&consent, "state").unwrap();

        let n = self.logins.fetch_add(1, Ordering::Relaxed) + 1;
        let code = format!("code-{}-{n}", email.replace(['@', '.'], "-"));
        self.google.issue_code(&code, account);

        let response = self
            .get(client, &format!("/gCallback?code={code}&state={state}"))
            .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "login callback");
        assert_eq!(location(&response), "/");

        self.users.find(&email).unwrap()
    }

    /// GET a path on the app.
    pub async fn get(&self, client: &reqwest::Client, path: &str) -> reqwest::Response {
        client.get(self.url(path)).send().await.unwrap()
    }

    /// Submit the ingredient search form.
    pub async fn search(&self, client: &reqwest::Client, ingredient: &str) -> reqwest::Response {
        client
            .post(self.url("/recipes"))
            .form(&[("ingredient", ingredient)])
            .send()
            .await
            .unwrap()
    }

    /// Press "Save" on a search result.
    pub async fn save(&self, client: &reqwest::Client, name: &str) -> reqwest::Response {
        client
            .post(self.url(&format!("/save/{}", urlencoding::encode(name))))
            .send()
            .await
            .unwrap()
    }
}

/// The `Location` header of a redirect.
#[must_use]
pub fn location(response: &reqwest::Response) -> String {
    response
        .headers()
        .get(LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

/// Value of a query parameter.
#[must_use]
pub fn query_param(url: &Url, name: &str) -> Option<String> {
    url.query_pairs()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.into_owned())
}

/// Pull the consent link out of the rendered login page.
#[must_use]
pub fn auth_url_from_login_page(body: &str) -> Url {
    const MARKER: &str = r#"class="button" href=""#;
    let start = body.find(MARKER).expect("login link") + MARKER.len();
    let end = start + body[start..].find('"').expect("closing quote");
    Url::parse(&html_unescape(&body[start..end])).unwrap()
}

/// Undo the HTML escaping templates apply to attribute values.
///
/// Handles both named and numeric entities. Ampersands are restored last so
/// an escaped entity is never decoded twice.
#[must_use]
pub fn html_unescape(s: &str) -> String {
    s.replace("&#x2f;", "/")
        .replace("&#47;", "/")
        .replace("&#x27;", "'")
        .replace("&#39;", "'")
        .replace("&quot;", "\"")
        .replace("&#34;", "\"")
        .replace("&lt;", "<")
        .replace("&#60;", "<")
        .replace("&gt;", ">")
        .replace("&#62;", ">")
        .replace("&#38;", "&")
        .replace("&amp;", "&")
}
