//! Recipe search and recipe box handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::Redirect,
};
use serde::Deserialize;
use tower_sessions::Session;

use crate::db::StoreError;
use crate::error::Result;
use crate::middleware::{OptionalAuth, RequireAuth, push_flash, take_flashes};
use crate::models::recipe::{LastSearch, Recipe, RecipeCandidate};
use crate::models::session::{Flash, keys};
use crate::state::AppState;

// =============================================================================
// Templates
// =============================================================================

/// Ingredient search form.
#[derive(Template, WebTemplate)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub user_name: String,
    pub flashes: Vec<Flash>,
}

/// Results of the session's last search.
#[derive(Template, WebTemplate)]
#[template(path = "search_results.html")]
pub struct SearchResultsTemplate {
    pub logged_in: bool,
    pub term: String,
    pub candidates: Vec<CandidateView>,
    pub flashes: Vec<Flash>,
}

/// The user's saved recipes.
#[derive(Template, WebTemplate)]
#[template(path = "my_recipes.html")]
pub struct MyRecipesTemplate {
    pub user_name: String,
    pub recipes: Vec<SavedRecipeView>,
    pub flashes: Vec<Flash>,
}

/// A search hit with its save action URL.
pub struct CandidateView {
    pub name: String,
    pub url: String,
    pub image_url: String,
    pub save_path: String,
}

impl From<RecipeCandidate> for CandidateView {
    fn from(candidate: RecipeCandidate) -> Self {
        Self {
            save_path: format!("/save/{}", urlencoding::encode(&candidate.name)),
            name: candidate.name,
            url: candidate.url,
            image_url: candidate.image_url,
        }
    }
}

/// A saved recipe with its remove action URL.
pub struct SavedRecipeView {
    pub name: String,
    pub url: String,
    pub image_url: String,
    pub remove_path: String,
}

impl From<Recipe> for SavedRecipeView {
    fn from(recipe: Recipe) -> Self {
        Self {
            remove_path: format!("/remove/{}", urlencoding::encode(&recipe.name)),
            name: recipe.name,
            url: recipe.url,
            image_url: recipe.image_url,
        }
    }
}

/// The search form, also accepted as a query string on `GET /recipes`.
#[derive(Debug, Default, Deserialize)]
pub struct SearchForm {
    pub ingredient: Option<String>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Show the ingredient search form.
///
/// # Route
///
/// `GET /`
pub async fn index(RequireAuth(user): RequireAuth, session: Session) -> Result<IndexTemplate> {
    Ok(IndexTemplate {
        user_name: user.display_name().to_string(),
        flashes: take_flashes(&session).await?,
    })
}

/// Show this session's last search, or run a new one if `?ingredient=` is set.
///
/// # Route
///
/// `GET /recipes`
#[tracing::instrument(skip_all)]
pub async fn results(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    session: Session,
    Query(form): Query<SearchForm>,
) -> Result<SearchResultsTemplate> {
    let last = match form.ingredient.filter(|i| !i.trim().is_empty()) {
        Some(ingredient) => run_search(&state, &session, &ingredient).await?,
        None => session
            .get::<LastSearch>(keys::LAST_SEARCH)
            .await?
            .unwrap_or_default(),
    };

    render_results(user.is_some(), last, &session).await
}

/// Run a search and remember it in the session.
///
/// # Route
///
/// `POST /recipes` (form field `ingredient`)
#[tracing::instrument(skip_all)]
pub async fn search(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    session: Session,
    Form(form): Form<SearchForm>,
) -> Result<SearchResultsTemplate> {
    let ingredient = form.ingredient.unwrap_or_default();
    let last = run_search(&state, &session, &ingredient).await?;
    render_results(user.is_some(), last, &session).await
}

/// Save one of the last search's results into the user's recipe box.
///
/// Only names from this session's last search can be saved. Duplicates and
/// unknown names are reported through a flash message.
///
/// # Route
///
/// `POST /save/{recipe_name}`
#[tracing::instrument(skip_all, fields(user_id = %user.id, recipe = %recipe_name))]
pub async fn save(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    session: Session,
    Path(recipe_name): Path<String>,
) -> Result<Redirect> {
    let last = session
        .get::<LastSearch>(keys::LAST_SEARCH)
        .await?
        .unwrap_or_default();

    let Some(candidate) = last.find(&recipe_name) else {
        tracing::debug!("Recipe not in last search");
        push_flash(
            &session,
            Flash::error(format!("{recipe_name} is not in your latest search.")),
        )
        .await?;
        return Ok(Redirect::to("/recipes"));
    };

    let flash = match state.recipes().save(user.id, candidate).await {
        Ok(recipe) => {
            tracing::info!(recipe_id = %recipe.id, "Recipe saved");
            Flash::success(format!("You added {} to your recipe box!", recipe.name))
        }
        Err(StoreError::DuplicateName(name)) => {
            Flash::error(format!("A recipe named {name} has already been saved."))
        }
        Err(e) => return Err(e.into()),
    };

    push_flash(&session, flash).await?;
    Ok(Redirect::to("/recipes"))
}

/// List the user's recipe box.
///
/// # Route
///
/// `GET /seeMyRecipes`
pub async fn my_recipes(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    session: Session,
) -> Result<MyRecipesTemplate> {
    let recipes = state.recipes().list_for_user(user.id).await?;

    Ok(MyRecipesTemplate {
        user_name: user.display_name().to_string(),
        recipes: recipes.into_iter().map(Into::into).collect(),
        flashes: take_flashes(&session).await?,
    })
}

/// Remove a recipe from the user's recipe box.
///
/// Responds with the 404 page if the user has no recipe by that name.
///
/// # Route
///
/// `GET /remove/{recipe_name}`
#[tracing::instrument(skip_all, fields(user_id = %user.id, recipe = %recipe_name))]
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(recipe_name): Path<String>,
) -> Result<Redirect> {
    state.recipes().remove(user.id, &recipe_name).await?;
    tracing::info!("Recipe removed");
    Ok(Redirect::to("/seeMyRecipes"))
}

// =============================================================================
// Helpers
// =============================================================================

async fn run_search(state: &AppState, session: &Session, ingredient: &str) -> Result<LastSearch> {
    let candidates = state.search().search(ingredient).await?;
    let last = LastSearch {
        term: ingredient.trim().to_string(),
        candidates,
    };
    session.insert(keys::LAST_SEARCH, &last).await?;
    Ok(last)
}

async fn render_results(
    logged_in: bool,
    last: LastSearch,
    session: &Session,
) -> Result<SearchResultsTemplate> {
    Ok(SearchResultsTemplate {
        logged_in,
        term: last.term,
        candidates: last.candidates.into_iter().map(Into::into).collect(),
        flashes: take_flashes(session).await?,
    })
}
