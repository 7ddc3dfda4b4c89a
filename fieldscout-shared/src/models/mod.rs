/// Database models for FieldScout
///
/// This module contains all database models and their CRUD operations.
///
/// # Models
///
/// - `account`: User accounts (players, scouts, admins) and the admin
///   verification workflow
/// - `player_profile`: 1:1 player profile owned by a PLAYER account
/// - `video`: Uploaded videos and their remote-storage references
/// - `selection`: Scout interest in a video (one record per video/scout pair)
/// - `metrics`: Append-only performance metrics for a player profile
///
/// # Example
///
/// ```no_run
/// use fieldscout_shared::models::account::{Account, AccountRole, CreateAccount};
/// use fieldscout_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let new_account = CreateAccount {
///     email: "player@example.com".to_string(),
///     password_hash: "$argon2id$...".to_string(),
///     role: AccountRole::Player,
///     name: Some("Dani Carvajal".to_string()),
/// };
///
/// let account = Account::create(&pool, new_account).await?;
/// # Ok(())
/// # }
/// ```

pub mod account;
pub mod metrics;
pub mod player_profile;
pub mod selection;
pub mod video;
