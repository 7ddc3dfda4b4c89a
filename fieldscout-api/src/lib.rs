//! # FieldScout API Server Library
//!
//! Core functionality for the FieldScout API server: a talent-scouting
//! backend where players upload match videos, verified scouts review and
//! select them, and admins verify accounts.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `middleware`: Role and verification guards
//! - `routes`: API route handlers
//! - `storage`: Google Drive credential lifecycle and upload handling

pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod storage;
