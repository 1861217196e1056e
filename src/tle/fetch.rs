use std::path::PathBuf;
use std::time::Duration;

use reqwest::blocking::Client;
use serde::Deserialize;

use crate::tle::error::TleError;
use crate::tle::loader::TleLoader;
use crate::tle::parsing::{parse_multi_tle, select, SelectedTle};
use crate::tle::TleSource;

pub const AMSAT_URL: &str = "https://amsat.org/tle/current/nasabare.txt";
pub const CELESTRAK_URLS: [&str; 4] = [
    "https://celestrak.org/NORAD/elements/active.txt",
    "https://celestrak.org/NORAD/elements/stations.txt",
    "https://celestrak.org/NORAD/elements/weather.txt",
    "https://celestrak.org/NORAD/elements/noaa.txt",
];
const SPACETRACK_LOGIN_URL: &str = "https://www.space-track.org/ajaxauth/login";
const SPACETRACK_QUERY_URL: &str = "https://www.space-track.org/basicspacedata/query/class/tle_latest";
const HTTP_TIMEOUT_SECONDS: u64 = 10;

#[derive(Debug, Clone, Deserialize)]
pub struct SpaceTrackCredentials {
    pub username: String,
    pub password: String,
}

/// Retrieves element sets for requested objects from one of the supported providers.
pub struct TleFetcher {
    client: Client,
    credentials: Option<SpaceTrackCredentials>,
    tle_dir: Option<PathBuf>,
}

impl TleFetcher {
    pub fn new(
        credentials: Option<SpaceTrackCredentials>,
        tle_dir: Option<PathBuf>,
    ) -> Result<Self, TleError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECONDS))
            .cookie_store(true)
            .build()?;
        Ok(Self {
            client,
            credentials,
            tle_dir,
        })
    }

    pub fn fetch(&self, source: TleSource, queries: &[String]) -> Result<Vec<SelectedTle>, TleError> {
        log::info!("Fetching TLEs from {}", source);
        match source {
            TleSource::Amsat => self.fetch_amsat(queries),
            TleSource::Celestrak => self.fetch_celestrak(queries),
            TleSource::Spacetrack => self.fetch_spacetrack(queries),
            TleSource::File => self.load_directory(queries),
        }
    }

    fn get_text(&self, url: &str) -> Result<String, TleError> {
        let response = self.client.get(url).send()?.error_for_status()?;
        Ok(response.text()?)
    }

    fn fetch_amsat(&self, queries: &[String]) -> Result<Vec<SelectedTle>, TleError> {
        let text = self.get_text(AMSAT_URL).map_err(|e| TleError::Fetch {
            provider: TleSource::Amsat,
            message: e.to_string(),
        })?;
        Ok(select(&parse_multi_tle(&text), queries))
    }

    fn fetch_celestrak(&self, queries: &[String]) -> Result<Vec<SelectedTle>, TleError> {
        let mut found: Vec<SelectedTle> = Vec::new();
        for url in CELESTRAK_URLS {
            let text = match self.get_text(url) {
                Ok(text) => text,
                Err(e) => {
                    log::debug!("CelesTrak {} unavailable: {}", url, e);
                    continue;
                }
            };
            for hit in select(&parse_multi_tle(&text), queries) {
                match found.iter_mut().find(|f| f.query == hit.query) {
                    Some(existing) => *existing = hit,
                    None => found.push(hit),
                }
            }
            if found.len() >= queries.len() {
                break;
            }
        }

        if found.is_empty() {
            return Err(TleError::Fetch {
                provider: TleSource::Celestrak,
                message: "no matching element sets in any group".to_string(),
            });
        }
        Ok(found)
    }

    fn fetch_spacetrack(&self, queries: &[String]) -> Result<Vec<SelectedTle>, TleError> {
        let credentials = self
            .credentials
            .as_ref()
            .filter(|c| !c.username.is_empty() && !c.password.is_empty())
            .ok_or(TleError::MissingCredentials)?;

        let wrap = |e: TleError| TleError::Fetch {
            provider: TleSource::Spacetrack,
            message: e.to_string(),
        };

        self.client
            .post(SPACETRACK_LOGIN_URL)
            .form(&[
                ("identity", credentials.username.as_str()),
                ("password", credentials.password.as_str()),
            ])
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| wrap(e.into()))?;

        let text = self.get_text(&spacetrack_query_url(queries)).map_err(wrap)?;
        Ok(select(&parse_multi_tle(&text), queries))
    }

    fn load_directory(&self, queries: &[String]) -> Result<Vec<SelectedTle>, TleError> {
        let dir = self.tle_dir.clone().ok_or(TleError::DirectoryNotConfigured)?;
        let records = TleLoader::new(dir).load_all()?;
        Ok(select(&records, queries))
    }
}

/// Query by catalog number when any were given, otherwise the whole latest catalog.
pub fn spacetrack_query_url(queries: &[String]) -> String {
    let norad_ids: Vec<String> = queries
        .iter()
        .filter_map(|q| q.trim().parse::<u64>().ok())
        .map(|id| id.to_string())
        .collect();
    if norad_ids.is_empty() {
        format!("{}/ORDINAL/1/format/tle", SPACETRACK_QUERY_URL)
    } else {
        format!(
            "{}/NORAD_CAT_ID/{}/format/tle",
            SPACETRACK_QUERY_URL,
            norad_ids.join(",")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spacetrack_query_lists_numeric_ids() {
        let url = spacetrack_query_url(&["25544".to_string(), "ISS".to_string(), " 33591 ".to_string()]);
        assert!(url.ends_with("/NORAD_CAT_ID/25544,33591/format/tle"), "{}", url);
    }

    #[test]
    fn spacetrack_query_falls_back_to_full_catalog() {
        let url = spacetrack_query_url(&["HUBBLE".to_string()]);
        assert!(url.ends_with("/ORDINAL/1/format/tle"), "{}", url);
    }

    #[test]
    fn spacetrack_without_credentials_fails_before_network() {
        let fetcher = TleFetcher::new(None, None).unwrap();
        let err = fetcher
            .fetch(TleSource::Spacetrack, &["25544".to_string()])
            .unwrap_err();
        assert!(matches!(err, TleError::MissingCredentials));
    }

    #[test]
    fn file_source_needs_a_directory() {
        let fetcher = TleFetcher::new(None, None).unwrap();
        let err = fetcher.fetch(TleSource::File, &["25544".to_string()]).unwrap_err();
        assert!(matches!(err, TleError::DirectoryNotConfigured));
    }
}
