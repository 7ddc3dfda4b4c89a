/// Database utilities for FieldScout
///
/// This module provides connection pool management and migration helpers.
///
/// # Modules
///
/// - `pool`: PostgreSQL connection pool with health checks
/// - `migrations`: Embedded sqlx migrations

pub mod migrations;
pub mod pool;
