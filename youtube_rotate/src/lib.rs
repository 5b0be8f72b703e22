//! Moves recently watched videos to the end of a YouTube playlist.

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod prompt;
pub mod rotate;
pub mod schedule;

#[cfg(test)]
mod test_support;

pub use api::{PlaylistApi, YouTube};
pub use auth::{authenticate, Credential, CredentialStore, FileCredentialStore};
pub use config::Config;
pub use error::{Error, Result};
pub use prompt::{AutoConfirm, Confirm, StdinConfirm};
pub use rotate::{run_cycle, CycleOutcome, PendingItem, RotationReport, WatchedVideos};
pub use schedule::{Schedule, Step};
