//! Recipe domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use recipe_box_core::{RecipeId, UserId};

/// A recipe saved into a user's recipe box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipe {
    pub id: RecipeId,
    /// The user whose box this recipe belongs to.
    pub owner: UserId,
    pub name: String,
    pub url: String,
    pub image_url: String,
    pub created_at: DateTime<Utc>,
}

/// A search hit that has not been saved. Eligible for persistence via the recipe store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeCandidate {
    pub name: String,
    pub url: String,
    pub image_url: String,
}

/// The most recent search made in one browser session.
///
/// Lives in the session, never in process-wide state, so concurrent users
/// cannot see or save each other's results.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastSearch {
    pub term: String,
    pub candidates: Vec<RecipeCandidate>,
}

impl LastSearch {
    /// Find a candidate by its exact name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&RecipeCandidate> {
        self.candidates.iter().find(|c| c.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(name: &str) -> RecipeCandidate {
        RecipeCandidate {
            name: name.to_string(),
            url: format!("https://recipes.example.org/{name}"),
            image_url: format!("https://img.example.org/{name}.jpg"),
        }
    }

    #[test]
    fn test_find_matches_exact_name_only() {
        let search = LastSearch {
            term: "chicken".to_string(),
            candidates: vec![candidate("Chicken Soup"), candidate("Chicken Curry")],
        };

        assert_eq!(
            search.find("Chicken Curry").map(|c| c.url.as_str()),
            Some("https://recipes.example.org/Chicken Curry")
        );
        assert!(search.find("chicken curry").is_none());
        assert!(search.find("Chicken").is_none());
    }

    #[test]
    fn test_default_is_empty() {
        let search = LastSearch::default();
        assert!(search.term.is_empty());
        assert!(search.find("anything").is_none());
    }
}
