//! API middleware
//!
//! Role and verification guards layered onto route groups after JWT
//! authentication.

pub mod guards;
