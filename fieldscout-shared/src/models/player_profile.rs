/// Player profile model
///
/// Owned 1:1 by a PLAYER account. The mere existence of this record is one
/// of the ten profile-completion fields (see `auth::completion`), so
/// creation is an explicit step in a player's onboarding.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE player_profiles (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     account_id UUID NOT NULL UNIQUE REFERENCES accounts(id) ON DELETE CASCADE,
///     position VARCHAR(64),
///     dominant_foot VARCHAR(16),
///     height_cm INTEGER,
///     weight_kg INTEGER,
///     bio TEXT,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Player profile model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PlayerProfile {
    /// Unique profile ID
    pub id: Uuid,

    /// Owning PLAYER account
    pub account_id: Uuid,

    /// Playing position (e.g. "CM", "ST")
    pub position: Option<String>,

    /// Dominant foot ("left", "right", "both")
    pub dominant_foot: Option<String>,

    pub height_cm: Option<i32>,
    pub weight_kg: Option<i32>,

    /// Free-form bio
    pub bio: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating or replacing a player profile
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpsertPlayerProfile {
    pub position: Option<String>,
    pub dominant_foot: Option<String>,
    pub height_cm: Option<i32>,
    pub weight_kg: Option<i32>,
    pub bio: Option<String>,
}

impl PlayerProfile {
    /// Creates or updates the profile for an account
    ///
    /// One profile per account; repeated calls update the existing row.
    pub async fn upsert(
        pool: &PgPool,
        account_id: Uuid,
        data: UpsertPlayerProfile,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, PlayerProfile>(
            r#"
            INSERT INTO player_profiles (account_id, position, dominant_foot, height_cm, weight_kg, bio)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (account_id) DO UPDATE
            SET position = EXCLUDED.position,
                dominant_foot = EXCLUDED.dominant_foot,
                height_cm = EXCLUDED.height_cm,
                weight_kg = EXCLUDED.weight_kg,
                bio = EXCLUDED.bio,
                updated_at = NOW()
            RETURNING id, account_id, position, dominant_foot, height_cm, weight_kg, bio,
                      created_at, updated_at
            "#,
        )
        .bind(account_id)
        .bind(data.position)
        .bind(data.dominant_foot)
        .bind(data.height_cm)
        .bind(data.weight_kg)
        .bind(data.bio)
        .fetch_one(pool)
        .await
    }

    /// Finds the profile owned by an account
    pub async fn find_by_account(
        pool: &PgPool,
        account_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, PlayerProfile>(
            r#"
            SELECT id, account_id, position, dominant_foot, height_cm, weight_kg, bio,
                   created_at, updated_at
            FROM player_profiles
            WHERE account_id = $1
            "#,
        )
        .bind(account_id)
        .fetch_optional(pool)
        .await
    }

    /// Checks whether an account has a profile
    ///
    /// Used by the completion evaluator, which only needs presence.
    pub async fn exists_for_account(pool: &PgPool, account_id: Uuid) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM player_profiles WHERE account_id = $1)")
            .bind(account_id)
            .fetch_one(pool)
            .await
    }
}
