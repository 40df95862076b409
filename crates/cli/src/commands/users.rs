//! User inspection commands.

use recipe_box_core::Email;
use recipe_box_web::db::{RecipeRepository, RecipeStore, UserRepository, UserStore};
use recipe_box_web::models::User;

use super::{CommandError, connect};

/// Print every user, oldest first.
///
/// # Errors
///
/// Returns an error if the database is unreachable or holds invalid data.
pub async fn list() -> Result<(), CommandError> {
    let pool = connect().await?;
    let users = UserRepository::new(pool).list_all().await?;

    #[allow(clippy::print_stdout)]
    {
        println!("{:>6}  {:<40}  {:<24}  LAST LOGIN", "ID", "EMAIL", "NAME");
        for user in &users {
            println!("{}", summary_line(user));
        }
        println!("{} user(s)", users.len());
    }
    Ok(())
}

/// Print one user and how many recipes they have saved.
///
/// # Errors
///
/// Returns `CommandError::UserNotFound` if no user has that email.
pub async fn show(email: &str) -> Result<(), CommandError> {
    let email = Email::parse(email)?;
    let pool = connect().await?;

    let user = UserRepository::new(pool.clone())
        .get_by_email(&email)
        .await?
        .ok_or_else(|| CommandError::UserNotFound(email.to_string()))?;

    let recipes = RecipeRepository::new(pool)
        .list_for_user(user.id)
        .await?;

    #[allow(clippy::print_stdout)]
    {
        println!("{}", summary_line(&user));
        println!("  avatar:        {}", user.avatar.as_deref().unwrap_or("-"));
        println!("  first login:   {}", user.created_at.to_rfc3339());
        println!(
            "  token expires: {}",
            user.tokens
                .expires_at()
                .map_or_else(|| "-".to_string(), |t| t.to_rfc3339())
        );
        println!(
            "  refresh token: {}",
            if user.tokens.refresh_token.is_some() { "yes" } else { "no" }
        );
        println!("  recipes saved: {}", recipes.len());
        for recipe in &recipes {
            println!("    - {} <{}>", recipe.name, recipe.url);
        }
    }
    Ok(())
}

fn summary_line(user: &User) -> String {
    format!(
        "{:>6}  {:<40}  {:<24}  {}",
        user.id.as_i32(),
        user.email.as_str(),
        user.name.as_deref().unwrap_or("-"),
        user.updated_at.format("%Y-%m-%d %H:%M")
    )
}
