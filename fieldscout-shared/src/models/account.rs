/// Account model and the admin verification workflow
///
/// An account is a player, scout, or admin identity. Players and scouts
/// carry a verification status that admins manage; most stateful actions in
/// the system are gated on it (see `auth::gate`).
///
/// # Schema
///
/// ```sql
/// CREATE TABLE accounts (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     email VARCHAR(255) NOT NULL UNIQUE,
///     password_hash VARCHAR(255) NOT NULL,
///     role account_role NOT NULL,
///     name VARCHAR(255),
///     phone_number VARCHAR(32),
///     country_code VARCHAR(8),
///     city VARCHAR(128),
///     state VARCHAR(128),
///     country VARCHAR(128),
///     postal_code VARCHAR(16),
///     profile_picture VARCHAR(512),
///     club_name VARCHAR(255),
///     document_number VARCHAR(100),
///     document_photos TEXT[] NOT NULL DEFAULT '{}',
///     verification_status verification_status NOT NULL DEFAULT 'PENDING',
///     verification_remarks TEXT,
///     verified_by UUID REFERENCES accounts(id),
///     verified_at TIMESTAMPTZ,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     last_login_at TIMESTAMPTZ
/// );
/// ```
///
/// # Verification invariant
///
/// `verified_by` and `verified_at` are non-null exactly when the status was
/// set by an explicit admin decision (VERIFIED or REJECTED). Resetting to
/// PENDING always clears both, regardless of caller-supplied values.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Account role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "account_role", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum AccountRole {
    /// Uploads videos, owns a player profile
    Player,

    /// Reviews and selects videos
    Scout,

    /// Verifies player and scout accounts
    Admin,
}

impl AccountRole {
    /// Gets role as its database string
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountRole::Player => "PLAYER",
            AccountRole::Scout => "SCOUT",
            AccountRole::Admin => "ADMIN",
        }
    }

    /// Parses a role from a string (case-insensitive)
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_uppercase().as_str() {
            "PLAYER" => Some(AccountRole::Player),
            "SCOUT" => Some(AccountRole::Scout),
            "ADMIN" => Some(AccountRole::Admin),
            _ => None,
        }
    }
}

/// Admin-granted trust status
///
/// Distinct from, and dependent on, profile completeness: a player must be
/// 100% complete before verification can be relied on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "verification_status", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum VerificationStatus {
    /// Default state; also the reset target
    Pending,

    /// Explicitly approved by an admin
    Verified,

    /// Explicitly rejected by an admin
    Rejected,
}

impl VerificationStatus {
    /// Gets status as its database string
    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationStatus::Pending => "PENDING",
            VerificationStatus::Verified => "VERIFIED",
            VerificationStatus::Rejected => "REJECTED",
        }
    }

    /// Parses a status from a string (case-insensitive)
    ///
    /// Unknown values are rejected before any mutation happens.
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_uppercase().as_str() {
            "PENDING" => Some(VerificationStatus::Pending),
            "VERIFIED" => Some(VerificationStatus::Verified),
            "REJECTED" => Some(VerificationStatus::Rejected),
            _ => None,
        }
    }

    /// Whether this status records an explicit admin decision
    ///
    /// Decision states stamp the `verified_by`/`verified_at` audit fields;
    /// PENDING clears them.
    pub fn is_admin_decision(&self) -> bool {
        !matches!(self, VerificationStatus::Pending)
    }
}

/// Account model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Account {
    /// Unique account ID (UUID v4)
    pub id: Uuid,

    /// Email address (stored lowercase, unique)
    pub email: String,

    /// Argon2id password hash, never plaintext
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Account role
    pub role: AccountRole,

    /// Display name
    pub name: Option<String>,

    /// Phone number
    pub phone_number: Option<String>,

    /// Phone country code (e.g. "+34")
    pub country_code: Option<String>,

    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub postal_code: Option<String>,

    /// Profile picture URL
    pub profile_picture: Option<String>,

    /// Club affiliation (scouts)
    pub club_name: Option<String>,

    /// Identity document number supplied for verification
    pub document_number: Option<String>,

    /// URLs of uploaded verification documents
    pub document_photos: Vec<String>,

    /// Admin-granted verification status
    pub verification_status: VerificationStatus,

    /// Remarks recorded with the latest verification decision
    pub verification_remarks: Option<String>,

    /// Admin who made the latest decision (None while PENDING)
    pub verified_by: Option<Uuid>,

    /// When the latest decision was made (None while PENDING)
    pub verified_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

/// Input for creating a new account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAccount {
    /// Email address (stored lowercase)
    pub email: String,

    /// Argon2id password hash (NOT a plaintext password)
    pub password_hash: String,

    /// PLAYER or SCOUT; admins are seeded out of band
    pub role: AccountRole,

    /// Optional display name
    pub name: Option<String>,
}

/// Input for updating profile fields
///
/// All fields are optional; only `Some` fields are written. Use
/// `Some(None)` to clear a nullable column.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateAccount {
    pub name: Option<Option<String>>,
    pub phone_number: Option<Option<String>>,
    pub country_code: Option<Option<String>>,
    pub city: Option<Option<String>>,
    pub state: Option<Option<String>>,
    pub country: Option<Option<String>>,
    pub postal_code: Option<Option<String>>,
    pub profile_picture: Option<Option<String>>,
    pub club_name: Option<Option<String>>,
    pub document_number: Option<Option<String>>,

    /// Replaces the document URL list wholesale when present
    pub document_photos: Option<Vec<String>>,
}

/// An admin verification decision applied to a subject account
#[derive(Debug, Clone)]
pub struct VerificationUpdate {
    /// Target status (already validated)
    pub status: VerificationStatus,

    /// Optional remarks recorded with the decision
    pub remarks: Option<String>,
}

/// Columns selected for every Account query
const ACCOUNT_COLUMNS: &str = r#"
    id, email, password_hash, role, name, phone_number, country_code,
    city, state, country, postal_code, profile_picture, club_name,
    document_number, document_photos,
    verification_status, verification_remarks, verified_by, verified_at,
    created_at, updated_at, last_login_at
"#;

impl Account {
    /// Creates a new account
    ///
    /// # Errors
    ///
    /// Returns an error if the email already exists (unique constraint) or
    /// the database is unreachable.
    pub async fn create(pool: &PgPool, data: CreateAccount) -> Result<Self, sqlx::Error> {
        let query = format!(
            r#"
            INSERT INTO accounts (email, password_hash, role, name)
            VALUES (LOWER($1), $2, $3, $4)
            RETURNING {ACCOUNT_COLUMNS}
            "#
        );

        sqlx::query_as::<_, Account>(&query)
            .bind(data.email)
            .bind(data.password_hash)
            .bind(data.role)
            .bind(data.name)
            .fetch_one(pool)
            .await
    }

    /// Finds an account by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = $1");

        sqlx::query_as::<_, Account>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Finds an account by email (case-insensitive)
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE email = LOWER($1)");

        sqlx::query_as::<_, Account>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Finds an account by ID, constrained to a role
    ///
    /// A role mismatch yields `None`, indistinguishable from a missing
    /// account. This avoids leaking account existence across role
    /// boundaries.
    pub async fn find_by_id_and_role(
        pool: &PgPool,
        id: Uuid,
        role: AccountRole,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = $1 AND role = $2");

        sqlx::query_as::<_, Account>(&query)
            .bind(id)
            .bind(role)
            .fetch_optional(pool)
            .await
    }

    /// Updates profile fields on an account
    ///
    /// Only `Some` fields in `data` are written; `updated_at` is bumped.
    /// Returns the updated account, or `None` if it does not exist.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateAccount,
    ) -> Result<Option<Self>, sqlx::Error> {
        // Build a dynamic UPDATE over the present fields
        let mut query = String::from("UPDATE accounts SET updated_at = NOW()");
        let mut bind_count = 1;

        let fields: [(&str, &Option<Option<String>>); 10] = [
            ("name", &data.name),
            ("phone_number", &data.phone_number),
            ("country_code", &data.country_code),
            ("city", &data.city),
            ("state", &data.state),
            ("country", &data.country),
            ("postal_code", &data.postal_code),
            ("profile_picture", &data.profile_picture),
            ("club_name", &data.club_name),
            ("document_number", &data.document_number),
        ];

        for (column, value) in &fields {
            if value.is_some() {
                bind_count += 1;
                query.push_str(&format!(", {column} = ${bind_count}"));
            }
        }

        // The array column binds after the string fields, matching
        // placeholder order
        if data.document_photos.is_some() {
            bind_count += 1;
            query.push_str(&format!(", document_photos = ${bind_count}"));
        }

        query.push_str(&format!(
            " WHERE id = $1 RETURNING {ACCOUNT_COLUMNS}"
        ));

        let mut q = sqlx::query_as::<_, Account>(&query).bind(id);
        for (_, value) in fields {
            if let Some(inner) = value.clone() {
                q = q.bind(inner);
            }
        }
        if let Some(photos) = data.document_photos.clone() {
            q = q.bind(photos);
        }

        q.fetch_optional(pool).await
    }

    /// Records a successful login
    pub async fn update_last_login(pool: &PgPool, id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE accounts SET last_login_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Applies an admin verification decision to a subject account
    ///
    /// State machine over `verification_status`, driven exclusively by an
    /// admin actor:
    ///
    /// - Any -> VERIFIED / REJECTED: stamps `verified_by` = admin id,
    ///   `verified_at` = now, and records the remarks.
    /// - Any -> PENDING: forces `verified_by` and `verified_at` to NULL
    ///   (reset semantics); remarks are still recorded.
    ///
    /// The subject must exist *and* have `expected_role`; a mismatch
    /// returns `None` so callers report not-found rather than leaking the
    /// account's existence under another role.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use fieldscout_shared::models::account::*;
    /// # use sqlx::PgPool;
    /// # use uuid::Uuid;
    /// # async fn example(pool: PgPool, player_id: Uuid, admin_id: Uuid) -> Result<(), sqlx::Error> {
    /// let update = VerificationUpdate {
    ///     status: VerificationStatus::Verified,
    ///     remarks: Some("Documents look good".to_string()),
    /// };
    ///
    /// let account = Account::set_verification(
    ///     &pool, player_id, AccountRole::Player, admin_id, update,
    /// ).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn set_verification(
        pool: &PgPool,
        subject_id: Uuid,
        expected_role: AccountRole,
        admin_id: Uuid,
        update: VerificationUpdate,
    ) -> Result<Option<Self>, sqlx::Error> {
        let (verified_by, verified_at) = verification_audit_fields(update.status, admin_id);

        let query = format!(
            r#"
            UPDATE accounts
            SET verification_status = $3,
                verification_remarks = $4,
                verified_by = $5,
                verified_at = $6,
                updated_at = NOW()
            WHERE id = $1 AND role = $2
            RETURNING {ACCOUNT_COLUMNS}
            "#
        );

        sqlx::query_as::<_, Account>(&query)
            .bind(subject_id)
            .bind(expected_role)
            .bind(update.status)
            .bind(update.remarks)
            .bind(verified_by)
            .bind(verified_at)
            .fetch_optional(pool)
            .await
    }

    /// Lists accounts of a role, optionally filtered by verification status
    /// and a search term over name/email, newest first
    pub async fn list_by_role(
        pool: &PgPool,
        role: AccountRole,
        status: Option<VerificationStatus>,
        search: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            r#"
            SELECT {ACCOUNT_COLUMNS}
            FROM accounts
            WHERE role = $1
              AND ($2::verification_status IS NULL OR verification_status = $2)
              AND ($3::text IS NULL
                   OR name ILIKE '%' || $3 || '%'
                   OR email ILIKE '%' || $3 || '%')
            ORDER BY created_at DESC
            LIMIT $4 OFFSET $5
            "#
        );

        sqlx::query_as::<_, Account>(&query)
            .bind(role)
            .bind(status)
            .bind(search)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Counts accounts of a role matching the same filters as `list_by_role`
    pub async fn count_by_role(
        pool: &PgPool,
        role: AccountRole,
        status: Option<VerificationStatus>,
        search: Option<&str>,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM accounts
            WHERE role = $1
              AND ($2::verification_status IS NULL OR verification_status = $2)
              AND ($3::text IS NULL
                   OR name ILIKE '%' || $3 || '%'
                   OR email ILIKE '%' || $3 || '%')
            "#,
        )
        .bind(role)
        .bind(status)
        .bind(search)
        .fetch_one(pool)
        .await
    }

    /// Counts unverified (non-VERIFIED) players and scouts for the admin
    /// dashboard
    pub async fn count_unverified(pool: &PgPool) -> Result<(i64, i64), sqlx::Error> {
        let row: (i64, i64) = sqlx::query_as(
            r#"
            SELECT
                COUNT(*) FILTER (WHERE role = 'PLAYER') AS players,
                COUNT(*) FILTER (WHERE role = 'SCOUT') AS scouts
            FROM accounts
            WHERE verification_status <> 'VERIFIED'
            "#,
        )
        .fetch_one(pool)
        .await?;

        Ok(row)
    }

    /// Deletes an account
    ///
    /// Cascades to the player profile, uploaded videos, and selections.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM accounts WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Computes the audit fields implied by a verification decision
///
/// VERIFIED and REJECTED stamp the acting admin and the decision time;
/// PENDING clears both, regardless of what the caller supplied.
pub fn verification_audit_fields(
    status: VerificationStatus,
    admin_id: Uuid,
) -> (Option<Uuid>, Option<DateTime<Utc>>) {
    if status.is_admin_decision() {
        (Some(admin_id), Some(Utc::now()))
    } else {
        (None, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse_case_insensitive() {
        assert_eq!(AccountRole::parse("player"), Some(AccountRole::Player));
        assert_eq!(AccountRole::parse("SCOUT"), Some(AccountRole::Scout));
        assert_eq!(AccountRole::parse("Admin"), Some(AccountRole::Admin));
        assert_eq!(AccountRole::parse("coach"), None);
    }

    #[test]
    fn test_status_parse_rejects_unknown() {
        assert_eq!(
            VerificationStatus::parse("verified"),
            Some(VerificationStatus::Verified)
        );
        assert_eq!(
            VerificationStatus::parse("PENDING"),
            Some(VerificationStatus::Pending)
        );
        assert_eq!(VerificationStatus::parse("APPROVED"), None);
        assert_eq!(VerificationStatus::parse(""), None);
    }

    #[test]
    fn test_audit_fields_stamped_for_decisions() {
        let admin = Uuid::new_v4();

        let (by, at) = verification_audit_fields(VerificationStatus::Verified, admin);
        assert_eq!(by, Some(admin));
        assert!(at.is_some());

        let (by, at) = verification_audit_fields(VerificationStatus::Rejected, admin);
        assert_eq!(by, Some(admin));
        assert!(at.is_some());
    }

    #[test]
    fn test_audit_fields_cleared_for_pending() {
        // Resetting to PENDING ignores the acting admin entirely
        let admin = Uuid::new_v4();
        let (by, at) = verification_audit_fields(VerificationStatus::Pending, admin);
        assert_eq!(by, None);
        assert_eq!(at, None);
    }
}
