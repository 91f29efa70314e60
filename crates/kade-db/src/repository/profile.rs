//! # Shop Profile Repository
//!
//! The single-row shop profile. Reading before anything was saved yields
//! [`ShopProfile::default`].

use sqlx::SqlitePool;
use tracing::info;

use crate::error::DbResult;
use kade_core::ShopProfile;

#[derive(Debug, sqlx::FromRow)]
struct ProfileRecord {
    name: String,
    address: String,
    phone: String,
    email: String,
    website: Option<String>,
    footer_note: String,
    logo: Option<String>,
}

impl From<ProfileRecord> for ShopProfile {
    fn from(r: ProfileRecord) -> Self {
        ShopProfile {
            name: r.name,
            address: r.address,
            phone: r.phone,
            email: r.email,
            website: r.website,
            footer_note: r.footer_note,
            logo: r.logo,
        }
    }
}

/// Repository for the shop profile.
#[derive(Debug, Clone)]
pub struct ProfileRepository {
    pool: SqlitePool,
}

impl ProfileRepository {
    /// Creates a new ProfileRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProfileRepository { pool }
    }

    /// The saved profile, or the default one.
    pub async fn get(&self) -> DbResult<ShopProfile> {
        let record = sqlx::query_as::<_, ProfileRecord>(
            r#"
            SELECT name, address, phone, email, website, footer_note, logo
            FROM shop_profile
            WHERE id = 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(record.map(ShopProfile::from).unwrap_or_default())
    }

    /// Saves (inserts or replaces) the profile.
    pub async fn save(&self, profile: &ShopProfile) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO shop_profile (id, name, address, phone, email, website, footer_note, logo)
            VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT (id) DO UPDATE SET
                name = excluded.name,
                address = excluded.address,
                phone = excluded.phone,
                email = excluded.email,
                website = excluded.website,
                footer_note = excluded.footer_note,
                logo = excluded.logo
            "#,
        )
        .bind(&profile.name)
        .bind(&profile.address)
        .bind(&profile.phone)
        .bind(&profile.email)
        .bind(&profile.website)
        .bind(&profile.footer_note)
        .bind(&profile.logo)
        .execute(&self.pool)
        .await?;

        info!(name = %profile.name, "Shop profile saved");
        Ok(())
    }
}
