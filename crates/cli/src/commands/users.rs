//! Registered student commands.

use tracing::info;

use lechare_core::store::JsonStore;

use super::CommandError;

/// Log every registered student. Password hashes are never printed.
///
/// # Errors
///
/// Returns an error if the store cannot be read.
pub fn list(store: &JsonStore) -> Result<(), CommandError> {
    let users = store.users()?;

    info!("Users ({})", users.len());
    for profile in users.iter().map(lechare_core::User::profile) {
        info!(
            "  {}  {} <{}>  since {}",
            profile.id,
            profile.name,
            profile.email,
            profile.created_at.format("%Y-%m-%d")
        );
    }
    Ok(())
}
