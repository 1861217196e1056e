use thiserror::Error;

use crate::tle::TleSource;

#[derive(Debug, Error)]
pub enum TleError {
    #[error("TLE directory not found: {0}")]
    DirectoryNotFound(String),
    #[error("TLE directory not configured (use --tle-dir or predict.tle_folder)")]
    DirectoryNotConfigured,
    #[error("TLE file read error: {0}")]
    FileRead(#[from] std::io::Error),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Failed to fetch TLEs from {provider}: {message}")]
    Fetch { provider: TleSource, message: String },
    #[error("Space-Track credentials not found, configure spacetrack.username and spacetrack.password")]
    MissingCredentials,
}
