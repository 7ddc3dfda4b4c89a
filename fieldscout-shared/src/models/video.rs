/// Uploaded video model
///
/// A video is owned by one account and references a remote-storage object:
/// `video_url` is the human-viewable link, `drive_file_id` the stable
/// remote identifier used for later deletion. Videos arrive via the
/// ingestion pipeline (binary payload uploaded to remote storage) or the
/// backward-compatible direct-URL path, in which case `drive_file_id` may
/// be absent.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE uploaded_videos (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     account_id UUID NOT NULL REFERENCES accounts(id) ON DELETE CASCADE,
///     player_profile_id UUID REFERENCES player_profiles(id) ON DELETE SET NULL,
///     video_url TEXT NOT NULL,
///     drive_file_id TEXT,
///     status video_status NOT NULL DEFAULT 'PENDING',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::account::AccountRole;

/// Analysis status of an uploaded video
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "video_status", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum VideoStatus {
    /// Uploaded, not yet analyzed
    Pending,

    /// Analysis pipeline has produced metrics
    Analyzed,
}

impl VideoStatus {
    /// Gets status as its database string
    pub fn as_str(&self) -> &'static str {
        match self {
            VideoStatus::Pending => "PENDING",
            VideoStatus::Analyzed => "ANALYZED",
        }
    }
}

/// Uploaded video model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct UploadedVideo {
    /// Unique video ID
    pub id: Uuid,

    /// Owning account
    pub account_id: Uuid,

    /// Owning player profile, if one existed at upload time
    pub player_profile_id: Option<Uuid>,

    /// Human-viewable link to the video
    pub video_url: String,

    /// Remote-storage object identifier, used for deletion
    pub drive_file_id: Option<String>,

    /// Analysis status
    pub status: VideoStatus,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for persisting an uploaded video record
#[derive(Debug, Clone)]
pub struct CreateUploadedVideo {
    pub account_id: Uuid,
    pub player_profile_id: Option<Uuid>,
    pub video_url: String,
    pub drive_file_id: Option<String>,
}

impl UploadedVideo {
    /// Persists a new video record with status PENDING
    pub async fn create(pool: &PgPool, data: CreateUploadedVideo) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, UploadedVideo>(
            r#"
            INSERT INTO uploaded_videos (account_id, player_profile_id, video_url, drive_file_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, account_id, player_profile_id, video_url, drive_file_id, status,
                      created_at, updated_at
            "#,
        )
        .bind(data.account_id)
        .bind(data.player_profile_id)
        .bind(data.video_url)
        .bind(data.drive_file_id)
        .fetch_one(pool)
        .await
    }

    /// Finds a video by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, UploadedVideo>(
            r#"
            SELECT id, account_id, player_profile_id, video_url, drive_file_id, status,
                   created_at, updated_at
            FROM uploaded_videos
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Lists videos owned by an account, newest first
    pub async fn list_by_account(pool: &PgPool, account_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, UploadedVideo>(
            r#"
            SELECT id, account_id, player_profile_id, video_url, drive_file_id, status,
                   created_at, updated_at
            FROM uploaded_videos
            WHERE account_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(account_id)
        .fetch_all(pool)
        .await
    }

    /// Lists videos visible to a requester role
    ///
    /// Applies the access-control matrix as a pre-filter: admins enumerate
    /// everything; scouts only enumerate videos owned by VERIFIED players.
    /// Players never list through this path (they use `list_by_account`).
    pub async fn list_visible(
        pool: &PgPool,
        requester_role: AccountRole,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let filter_verified = requester_role != AccountRole::Admin;

        sqlx::query_as::<_, UploadedVideo>(
            r#"
            SELECT v.id, v.account_id, v.player_profile_id, v.video_url, v.drive_file_id,
                   v.status, v.created_at, v.updated_at
            FROM uploaded_videos v
            JOIN accounts a ON a.id = v.account_id
            WHERE ($1 = FALSE OR a.verification_status = 'VERIFIED')
            ORDER BY v.created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(filter_verified)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
    }

    /// Marks a video as analyzed
    pub async fn mark_analyzed(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, UploadedVideo>(
            r#"
            UPDATE uploaded_videos
            SET status = 'ANALYZED', updated_at = NOW()
            WHERE id = $1
            RETURNING id, account_id, player_profile_id, video_url, drive_file_id, status,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Deletes a video record
    ///
    /// Remote-object deletion is handled separately (best-effort) by the
    /// storage layer; the local record is authoritative.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM uploaded_videos WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
