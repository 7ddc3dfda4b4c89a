//! Remote and local storage for uploaded media
//!
//! - `drive`: Google Drive OAuth credential lifecycle and file operations
//! - `temp`: scoped temp files and upload naming/validation helpers

pub mod drive;
pub mod temp;
