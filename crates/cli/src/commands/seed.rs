//! Seed an empty store.
//!
//! Each collection is seeded only when its key is absent, so running this
//! twice is harmless.

use std::path::Path;

use tracing::info;

use lechare_core::password::hash_password;
use lechare_core::seed;
use lechare_core::store::JsonStore;

use super::CommandError;

/// Load seed files into whatever collections are missing.
///
/// # Errors
///
/// Returns `CommandError::SeedFailed` if either collection failed to seed.
pub fn run(store: &JsonStore, seed_dir: &Path) -> Result<(), CommandError> {
    info!(seed_dir = %seed_dir.display(), "Seeding store");

    let report = seed::bootstrap(store, seed_dir, hash_password);
    info!("  Disciplines: {}", report.disciplines);
    info!("  Users: {}", report.users);

    if report.has_failures() {
        return Err(CommandError::SeedFailed);
    }
    Ok(())
}
