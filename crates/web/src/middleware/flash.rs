//! One-shot flash messages stored in the session.

use tower_sessions::Session;

use crate::models::session::{Flash, keys};

/// Queue a message for the next rendered page.
///
/// # Errors
///
/// Returns an error if the session cannot be read or written.
pub async fn push_flash(
    session: &Session,
    flash: Flash,
) -> Result<(), tower_sessions::session::Error> {
    let mut flashes: Vec<Flash> = session.get(keys::FLASH).await?.unwrap_or_default();
    flashes.push(flash);
    session.insert(keys::FLASH, flashes).await
}

/// Remove and return all queued messages.
///
/// # Errors
///
/// Returns an error if the session cannot be read or written.
pub async fn take_flashes(session: &Session) -> Result<Vec<Flash>, tower_sessions::session::Error> {
    Ok(session
        .remove::<Vec<Flash>>(keys::FLASH)
        .await?
        .unwrap_or_default())
}
