/// Authentication and authorization for FieldScout
///
/// # Modules
///
/// - `jwt`: Token generation and validation (HS256 access/refresh pairs)
/// - `password`: Argon2id password hashing
/// - `middleware`: Axum auth context extraction
/// - `completion`: Profile completion evaluator (the fixed ten-field set)
/// - `gate`: Completeness and verification gates for protected operations
/// - `access`: Read-time access-control matrix for videos

pub mod access;
pub mod completion;
pub mod gate;
pub mod jwt;
pub mod middleware;
pub mod password;
