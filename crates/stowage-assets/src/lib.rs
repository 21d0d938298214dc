//! Archive-backed asset filesystem.
//!
//! Game assets live in three places: a staging directory of already
//! materialized files, loose files in the application directory, and PAK
//! archives next to them. [`ArchiveFileSystem`] answers "give me file X"
//! by probing those sources in that order and materializing the winner
//! into the staging directory, so callers only ever read real files from
//! one place.
//!
//! # Example
//!
//! ```rust,no_run
//! use stowage_assets::ArchiveFileSystem;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let fs = ArchiveFileSystem::new("/game/data", "/tmp/game-staging")?;
//! if fs.request_file("maps/e1m1.bsp") {
//!     let bytes = std::fs::read(fs.staged_path("maps/e1m1.bsp"))?;
//!     // ... hand the asset to the engine
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Absence is not an error here: `request_file` returns a bare `bool` and
//! callers decide what a missing asset means (fall back to a default,
//! abort a level load). Failures while probing are logged through
//! `tracing` and treated as "not found in this source".

#![warn(missing_docs)]

use std::path::PathBuf;

use thiserror::Error;

mod filesystem;

pub use filesystem::ArchiveFileSystem;

/// Result type for asset filesystem operations.
pub type Result<T> = std::result::Result<T, AssetError>;

/// Errors that can occur while mounting an asset filesystem.
#[derive(Debug, Error)]
pub enum AssetError {
    /// The application directory does not exist or is not a directory.
    #[error("application directory is not a directory: {0}")]
    NotADirectory(PathBuf),

    /// I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A PAK archive operation failed.
    #[error("archive error: {0}")]
    Pak(#[from] stowage_formats::pak::PakError),
}
