//! Edamam recipe search.
//!
//! Every call is a fresh GET against `{base}/search`; no results are cached
//! here. Callers keep the most recent results in the session.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::config::RecipeBoxConfig;
use crate::models::recipe::RecipeCandidate;

/// Errors from the recipe search gateway.
#[derive(Debug, Error)]
pub enum SearchError {
    /// Network failure, timeout, or a non-2xx answer from the recipe API.
    #[error("recipe search is unavailable: {0}")]
    UpstreamUnavailable(String),

    /// The recipe API answered with a body we could not understand.
    #[error("recipe search returned an unexpected response: {0}")]
    MalformedResponse(String),

    /// The search term was blank.
    #[error("please enter an ingredient to search for")]
    EmptyQuery,
}

/// Client for the Edamam recipe search API.
#[derive(Clone)]
pub struct RecipeSearch {
    inner: Arc<RecipeSearchInner>,
}

struct RecipeSearchInner {
    client: reqwest::Client,
    app_id: String,
    app_key: SecretString,
    search_url: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    hits: Vec<Hit>,
}

#[derive(Debug, Deserialize)]
struct Hit {
    recipe: HitRecipe,
}

#[derive(Debug, Deserialize)]
struct HitRecipe {
    label: String,
    url: String,
    image: String,
}

impl From<HitRecipe> for RecipeCandidate {
    fn from(recipe: HitRecipe) -> Self {
        Self {
            name: recipe.label,
            url: recipe.url,
            image_url: recipe.image,
        }
    }
}

impl RecipeSearch {
    /// Create a search client from application configuration.
    ///
    /// # Errors
    ///
    /// Returns `reqwest::Error` if the HTTP client cannot be built.
    pub fn new(config: &RecipeBoxConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(RecipeSearchInner {
                client,
                app_id: config.edamam.app_id.clone(),
                app_key: config.edamam.app_key.clone(),
                search_url: format!("{}/search", config.edamam.base_url),
            }),
        })
    }

    /// Search recipes by ingredient.
    ///
    /// Hits are returned in upstream order, with label, url and image copied
    /// verbatim.
    ///
    /// # Errors
    ///
    /// Returns `SearchError::EmptyQuery` for a blank term,
    /// `SearchError::UpstreamUnavailable` when the API cannot be reached or
    /// answers with an error status, and `SearchError::MalformedResponse`
    /// when the body does not parse.
    #[tracing::instrument(skip(self))]
    pub async fn search(&self, query: &str) -> Result<Vec<RecipeCandidate>, SearchError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(SearchError::EmptyQuery);
        }

        let url = Url::parse_with_params(
            &self.inner.search_url,
            &[
                ("q", query),
                ("app_id", self.inner.app_id.as_str()),
                ("app_key", self.inner.app_key.expose_secret()),
            ],
        )
        .map_err(|e| SearchError::UpstreamUnavailable(format!("invalid search endpoint: {e}")))?;

        let response = self
            .inner
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| SearchError::UpstreamUnavailable(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::UpstreamUnavailable(format!("status {status}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| SearchError::UpstreamUnavailable(e.without_url().to_string()))?;

        let candidates = parse_hits(&body)?;
        tracing::debug!(count = candidates.len(), "Recipe search completed");
        Ok(candidates)
    }
}

fn parse_hits(body: &str) -> Result<Vec<RecipeCandidate>, SearchError> {
    let response: SearchResponse =
        serde_json::from_str(body).map_err(|e| SearchError::MalformedResponse(e.to_string()))?;

    Ok(response
        .hits
        .into_iter()
        .map(|hit| hit.recipe.into())
        .collect())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::tests::test_config;

    #[test]
    fn test_parse_hits_maps_fields_in_order() {
        let body = r#"{
            "q": "chicken",
            "count": 2,
            "hits": [
                {"recipe": {"label": "Chicken Vesuvio", "url": "https://a.example/v", "image": "https://img.example/v.jpg", "calories": 4228.0}},
                {"recipe": {"label": "Chicken Paprikash", "url": "https://a.example/p", "image": "https://img.example/p.jpg"}}
            ]
        }"#;

        let candidates = parse_hits(body).unwrap();

        assert_eq!(
            candidates,
            vec![
                RecipeCandidate {
                    name: "Chicken Vesuvio".to_string(),
                    url: "https://a.example/v".to_string(),
                    image_url: "https://img.example/v.jpg".to_string(),
                },
                RecipeCandidate {
                    name: "Chicken Paprikash".to_string(),
                    url: "https://a.example/p".to_string(),
                    image_url: "https://img.example/p.jpg".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_parse_hits_without_hits_is_empty() {
        assert!(parse_hits(r#"{"q":"zzz","count":0}"#).unwrap().is_empty());
    }

    #[test]
    fn test_parse_hits_rejects_garbage() {
        assert!(matches!(
            parse_hits("<html>Service Unavailable</html>"),
            Err(SearchError::MalformedResponse(_))
        ));
        assert!(matches!(
            parse_hits(r#"{"hits":[{"recipe":{"label":"No url"}}]}"#),
            Err(SearchError::MalformedResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_blank_query_is_rejected_without_a_request() {
        let search = RecipeSearch::new(&test_config()).unwrap();

        assert!(matches!(
            search.search("   ").await,
            Err(SearchError::EmptyQuery)
        ));
    }
}
