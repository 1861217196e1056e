mod error;
mod fetch;
mod loader;
mod parsing;

use serde::Deserialize;

pub use error::TleError;
pub use fetch::{spacetrack_query_url, SpaceTrackCredentials, TleFetcher};
pub use loader::TleLoader;
pub use parsing::{parse_multi_tle, select, SelectedTle, TleRecord};

/// Where element sets are retrieved from.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum, strum_macros::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TleSource {
    #[default]
    Amsat,
    Celestrak,
    Spacetrack,
    /// Local directory of `.tle` / `.txt` files
    File,
}
