use std::env::VarError;

use log::{debug, warn};
use serde::Deserialize;

use crate::clients::{
    entities::TrackRecord,
    errors::{Error, Result},
};

/// Jamendo API v3.0 base URL
pub const DEFAULT_API_URL: &str = "https://api.jamendo.com/v3.0";
/// Public client id used when none is configured
pub const DEFAULT_CLIENT_ID: &str = "c538f291";
/// Number of tracks requested per tag
pub const DEFAULT_LIMIT: u32 = 200;

/// Environment variable overriding the client id
pub const CLIENT_ID_ENV: &str = "JAMENDO_CLIENT_ID";
/// Environment variable overriding the API base URL
pub const API_URL_ENV: &str = "JAMENDO_API_URL";

const AUDIO_FORMAT: &str = "mp31";
const INCLUDE: &str = "musicinfo+licenses+stats";

// Jamendo reports request problems (bad client id, bad params) in `headers`
// with a 200 status rather than through the HTTP status code.
#[derive(Deserialize, Debug)]
struct ResponseHeaders {
    status: Option<String>,
    code: Option<i64>,
    error_message: Option<String>,
}

#[derive(Deserialize, Debug)]
struct TrackSearchResponse {
    headers: Option<ResponseHeaders>,
    results: Option<Vec<TrackRecord>>,
}

/// Client for the Jamendo `tracks` search endpoint
pub struct JamendoClient {
    http: reqwest::Client,
    api_url: String,
    client_id: String,
    limit: u32,
}

impl JamendoClient {
    /// Client querying `{api_url}/tracks` with the given credentials and page size
    pub fn new(
        http: reqwest::Client,
        api_url: impl Into<String>,
        client_id: impl Into<String>,
        limit: u32,
    ) -> Self {
        JamendoClient {
            http,
            api_url: api_url.into(),
            client_id: client_id.into(),
            limit,
        }
    }

    /// Full URL of the tracks endpoint
    pub fn tracks_url(&self) -> String {
        format!("{}/tracks", self.api_url.trim_end_matches('/'))
    }

    /// Query parameters for one tag search
    pub fn search_params(&self, tag: &str) -> Vec<(&'static str, String)> {
        vec![
            ("client_id", self.client_id.clone()),
            ("format", "json".to_string()),
            ("limit", self.limit.to_string()),
            ("tags", tag.to_string()),
            ("audioformat", AUDIO_FORMAT.to_string()),
            ("audiodlformat", AUDIO_FORMAT.to_string()),
            ("include", INCLUDE.to_string()),
        ]
    }

    /// Fetch a single page of tracks for the tag. Any non-2xx status is an
    /// error, a body without `results` is an empty page.
    pub async fn fetch_tracks(&self, tag: &str) -> Result<Vec<TrackRecord>> {
        let url = self.tracks_url();
        debug!("GET {url} tags={tag} limit={}", self.limit);

        let response = self
            .http
            .get(&url)
            .query(&self.search_params(tag))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::UnexpectedStatus {
                tag: tag.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let body = response.bytes().await?;
        let tracks = parse_search_response(tag, &body)?;
        debug!("Received {} tracks for tag {tag}", tracks.len());
        Ok(tracks)
    }
}

fn parse_search_response(tag: &str, body: &[u8]) -> Result<Vec<TrackRecord>> {
    let response: TrackSearchResponse = serde_json::from_slice(body)?;

    if let Some(headers) = &response.headers
        && headers.status.as_deref() == Some("failed")
    {
        warn!(
            "Jamendo rejected the request for tag {tag} (code {}): {}",
            headers.code.unwrap_or_default(),
            headers.error_message.as_deref().unwrap_or("no message")
        );
    }

    Ok(response.results.unwrap_or_default())
}

/// Resolve an environment lookup, falling back to `default` when the
/// variable is unset or empty
pub fn env_or(lookup: std::result::Result<String, VarError>, default: &str) -> Result<String> {
    match lookup {
        Ok(value) if !value.is_empty() => Ok(value),
        Ok(_) | Err(VarError::NotPresent) => Ok(default.to_string()),
        Err(e) => Err(Error::from(e)),
    }
}
