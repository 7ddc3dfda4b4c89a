/// Video selection model and state machine
///
/// One record per (video, scout) pair, created-or-updated on every scout
/// interaction. The `selected_at` timestamp always reflects only the
/// *current* state: it is stamped when the resulting status is SELECTED
/// and cleared on any other transition, even one made in the same call
/// that previously set it.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE video_selections (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     video_id UUID NOT NULL REFERENCES uploaded_videos(id) ON DELETE CASCADE,
///     scout_id UUID NOT NULL REFERENCES accounts(id) ON DELETE CASCADE,
///     status selection_status NOT NULL,
///     club_name VARCHAR(255),
///     comments TEXT,
///     selected_at TIMESTAMPTZ,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     UNIQUE (video_id, scout_id)
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// A scout's recorded interest level in a video
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "selection_status", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum SelectionStatus {
    /// Scout watched the video
    Viewed,

    /// Scout flagged interest (default on first interaction)
    Interested,

    /// Scout selected the player; stamps `selected_at`
    Selected,

    /// Scout passed on the video
    Rejected,
}

impl SelectionStatus {
    /// Gets status as its database string
    pub fn as_str(&self) -> &'static str {
        match self {
            SelectionStatus::Viewed => "VIEWED",
            SelectionStatus::Interested => "INTERESTED",
            SelectionStatus::Selected => "SELECTED",
            SelectionStatus::Rejected => "REJECTED",
        }
    }

    /// Normalizes a caller-supplied status
    ///
    /// Input is case-insensitive; a missing value defaults to INTERESTED;
    /// unknown values are rejected with the list of accepted ones.
    ///
    /// # Example
    ///
    /// ```
    /// use fieldscout_shared::models::selection::SelectionStatus;
    ///
    /// assert_eq!(
    ///     SelectionStatus::normalize(Some("selected")),
    ///     Ok(SelectionStatus::Selected)
    /// );
    /// assert_eq!(
    ///     SelectionStatus::normalize(None),
    ///     Ok(SelectionStatus::Interested)
    /// );
    /// assert!(SelectionStatus::normalize(Some("MAYBE")).is_err());
    /// ```
    pub fn normalize(value: Option<&str>) -> Result<Self, String> {
        let Some(raw) = value else {
            return Ok(SelectionStatus::Interested);
        };

        match raw.to_ascii_uppercase().as_str() {
            "VIEWED" => Ok(SelectionStatus::Viewed),
            "INTERESTED" => Ok(SelectionStatus::Interested),
            "SELECTED" => Ok(SelectionStatus::Selected),
            "REJECTED" => Ok(SelectionStatus::Rejected),
            other => Err(format!(
                "Invalid selection status '{}': expected VIEWED, INTERESTED, SELECTED, or REJECTED",
                other
            )),
        }
    }
}

/// Video selection model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct VideoSelection {
    /// Unique selection ID
    pub id: Uuid,

    /// The video this selection refers to
    pub video_id: Uuid,

    /// The scout who made it
    pub scout_id: Uuid,

    /// Current interest level
    pub status: SelectionStatus,

    /// Club the scout is selecting for
    pub club_name: Option<String>,

    /// Free-form comments
    pub comments: Option<String>,

    /// Set only while status is SELECTED
    pub selected_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for a scout interaction with a video
#[derive(Debug, Clone)]
pub struct SelectionInput {
    /// Normalized target status
    pub status: SelectionStatus,

    pub club_name: Option<String>,
    pub comments: Option<String>,
}

impl VideoSelection {
    /// Records a scout interaction, creating or updating the single
    /// (video, scout) record
    ///
    /// Idempotent under repeated identical calls: the row count never
    /// grows for the same pair. `selected_at` is recomputed on every call
    /// from the resulting status alone.
    pub async fn upsert(
        pool: &PgPool,
        video_id: Uuid,
        scout_id: Uuid,
        input: SelectionInput,
    ) -> Result<Self, sqlx::Error> {
        let selected_at: Option<DateTime<Utc>> = if input.status == SelectionStatus::Selected {
            Some(Utc::now())
        } else {
            None
        };

        sqlx::query_as::<_, VideoSelection>(
            r#"
            INSERT INTO video_selections (video_id, scout_id, status, club_name, comments, selected_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (video_id, scout_id) DO UPDATE
            SET status = EXCLUDED.status,
                club_name = EXCLUDED.club_name,
                comments = EXCLUDED.comments,
                selected_at = EXCLUDED.selected_at,
                updated_at = NOW()
            RETURNING id, video_id, scout_id, status, club_name, comments, selected_at,
                      created_at, updated_at
            "#,
        )
        .bind(video_id)
        .bind(scout_id)
        .bind(input.status)
        .bind(input.club_name)
        .bind(input.comments)
        .bind(selected_at)
        .fetch_one(pool)
        .await
    }

    /// Lists all selections for a video, newest first
    pub async fn list_by_video(pool: &PgPool, video_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, VideoSelection>(
            r#"
            SELECT id, video_id, scout_id, status, club_name, comments, selected_at,
                   created_at, updated_at
            FROM video_selections
            WHERE video_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(video_id)
        .fetch_all(pool)
        .await
    }

    /// Lists a scout's own selections, newest first
    pub async fn list_by_scout(pool: &PgPool, scout_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, VideoSelection>(
            r#"
            SELECT id, video_id, scout_id, status, club_name, comments, selected_at,
                   created_at, updated_at
            FROM video_selections
            WHERE scout_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(scout_id)
        .fetch_all(pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_defaults_to_interested() {
        assert_eq!(
            SelectionStatus::normalize(None),
            Ok(SelectionStatus::Interested)
        );
    }

    #[test]
    fn test_normalize_is_case_insensitive() {
        assert_eq!(
            SelectionStatus::normalize(Some("viewed")),
            Ok(SelectionStatus::Viewed)
        );
        assert_eq!(
            SelectionStatus::normalize(Some("Selected")),
            Ok(SelectionStatus::Selected)
        );
        assert_eq!(
            SelectionStatus::normalize(Some("REJECTED")),
            Ok(SelectionStatus::Rejected)
        );
    }

    #[test]
    fn test_normalize_rejects_unknown() {
        let err = SelectionStatus::normalize(Some("SHORTLISTED")).unwrap_err();
        assert!(err.contains("SHORTLISTED"));
        assert!(err.contains("INTERESTED"));
    }
}
