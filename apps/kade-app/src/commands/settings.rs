//! # Settings Commands
//!
//! The shop profile printed on bills and used in customer messages, and a
//! read-only view of the loaded configuration.

use tracing::{debug, info};

use crate::commands::session::reload_views;
use crate::error::ApiError;
use crate::state::{AuthState, ConfigState, DbState, ViewsState};
use kade_core::validation::validate_shop_profile;
use kade_core::ShopProfile;

pub fn get_profile(auth: &AuthState, views: &ViewsState) -> Result<ShopProfile, ApiError> {
    debug!("get_profile command");
    auth.ensure_unlocked()?;
    Ok(views.profile())
}

/// Validates and stores the profile.
pub async fn save_profile(
    auth: &AuthState,
    db: &DbState,
    views: &ViewsState,
    profile: ShopProfile,
) -> Result<ShopProfile, ApiError> {
    debug!(name = %profile.name, "save_profile command");
    auth.ensure_unlocked()?;

    validate_shop_profile(&profile)?;
    db.inner().profile().save(&profile).await?;

    info!(name = %profile.name, "Shop profile updated");
    reload_views(db, views).await;
    Ok(profile)
}

/// The loaded configuration, with the PIN blanked out.
pub fn get_config(auth: &AuthState, config: &ConfigState) -> Result<ConfigState, ApiError> {
    debug!("get_config command");
    auth.ensure_unlocked()?;

    Ok(ConfigState {
        pin: None,
        ..config.clone()
    })
}
