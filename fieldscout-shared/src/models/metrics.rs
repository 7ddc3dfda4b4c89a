/// Performance metrics model
///
/// Derived numeric attributes for a player profile, optionally tied to a
/// specific video (a weak reference: deleting the video nulls it, never
/// the metrics). The table is append-only; "current" metrics are simply
/// the latest row by `created_at`.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE performance_metrics (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     player_profile_id UUID NOT NULL REFERENCES player_profiles(id) ON DELETE CASCADE,
///     video_id UUID REFERENCES uploaded_videos(id) ON DELETE SET NULL,
///     speed DOUBLE PRECISION,
///     stamina DOUBLE PRECISION,
///     accuracy DOUBLE PRECISION,
///     overall_score DOUBLE PRECISION,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Performance metrics record
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PerformanceMetrics {
    /// Unique record ID
    pub id: Uuid,

    /// Owning player profile
    pub player_profile_id: Uuid,

    /// Video the metrics were derived from, if any
    pub video_id: Option<Uuid>,

    pub speed: Option<f64>,
    pub stamina: Option<f64>,
    pub accuracy: Option<f64>,
    pub overall_score: Option<f64>,

    pub created_at: DateTime<Utc>,
}

/// Input for appending a metrics record
#[derive(Debug, Clone, Default)]
pub struct CreateMetrics {
    pub player_profile_id: Uuid,
    pub video_id: Option<Uuid>,
    pub speed: Option<f64>,
    pub stamina: Option<f64>,
    pub accuracy: Option<f64>,
    pub overall_score: Option<f64>,
}

impl PerformanceMetrics {
    /// Appends a metrics record
    ///
    /// Records are never updated in place; each analysis run appends.
    pub async fn create(pool: &PgPool, data: CreateMetrics) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, PerformanceMetrics>(
            r#"
            INSERT INTO performance_metrics
                (player_profile_id, video_id, speed, stamina, accuracy, overall_score)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, player_profile_id, video_id, speed, stamina, accuracy,
                      overall_score, created_at
            "#,
        )
        .bind(data.player_profile_id)
        .bind(data.video_id)
        .bind(data.speed)
        .bind(data.stamina)
        .bind(data.accuracy)
        .bind(data.overall_score)
        .fetch_one(pool)
        .await
    }

    /// Gets the current (latest) metrics for a player profile
    pub async fn latest_for_profile(
        pool: &PgPool,
        player_profile_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, PerformanceMetrics>(
            r#"
            SELECT id, player_profile_id, video_id, speed, stamina, accuracy,
                   overall_score, created_at
            FROM performance_metrics
            WHERE player_profile_id = $1
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(player_profile_id)
        .fetch_optional(pool)
        .await
    }

    /// Gets the latest metrics derived from a specific video
    pub async fn latest_for_video(
        pool: &PgPool,
        video_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, PerformanceMetrics>(
            r#"
            SELECT id, player_profile_id, video_id, speed, stamina, accuracy,
                   overall_score, created_at
            FROM performance_metrics
            WHERE video_id = $1
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(video_id)
        .fetch_optional(pool)
        .await
    }
}
