use std::collections::HashSet;
use std::env::VarError;
use std::io::Write;
use std::path::PathBuf;

use log::{debug, info};

use crate::clients::{
    JamendoClient, TrackCsvWriter,
    entities::{MAX_NAME_LEN, OutputRow, TrackRecord},
    errors::{Error, Result},
    jamendo::{API_URL_ENV, CLIENT_ID_ENV, DEFAULT_API_URL, DEFAULT_CLIENT_ID, DEFAULT_LIMIT, env_or},
};

/// Genre tags queried when none are configured, in query order
pub const DEFAULT_TAGS: [&str; 10] = [
    "pop",
    "jazz",
    "rock",
    "blues",
    "electronic",
    "disco",
    "ambient",
    "dance",
    "waltz",
    "loop",
];
/// Directory the CSV is written into
pub const DEFAULT_OUT_DIR: &str = "jamendo_data";
/// CSV file name inside [`DEFAULT_OUT_DIR`]
pub const DEFAULT_OUT_FILE: &str = "jamendo_tracks.csv";

/// Configuration for the [`Exporter`]
pub struct Config {
    /// Client used for every tag search
    pub client: JamendoClient,
    /// Tags to query, in order
    pub tags: Vec<String>,
    /// Directory holding the CSV, created if missing
    pub out_dir: PathBuf,
    /// CSV file name inside `out_dir`
    pub out_file: String,
}

/// Builds a [`Config`]. Unset values come from the environment, then from the
/// built-in defaults.
#[derive(Default)]
pub struct ConfigBuilder {
    client_id: Option<String>,
    api_url: Option<String>,
    limit: Option<u32>,
    tags: Option<Vec<String>>,
    out_dir: Option<PathBuf>,
    out_file: Option<String>,
}

impl ConfigBuilder {
    /// Builder with nothing set
    pub fn new() -> Self {
        Self::default()
    }

    /// Jamendo client id
    #[must_use]
    pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    /// API base URL, without the `/tracks` suffix
    #[must_use]
    pub fn api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = Some(api_url.into());
        self
    }

    /// Tracks requested per tag
    #[must_use]
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Tags to query, replacing the default list
    #[must_use]
    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }

    /// Output directory
    #[must_use]
    pub fn out_dir(mut self, out_dir: impl Into<PathBuf>) -> Self {
        self.out_dir = Some(out_dir.into());
        self
    }

    /// Output file name
    #[must_use]
    pub fn out_file(mut self, out_file: impl Into<String>) -> Self {
        self.out_file = Some(out_file.into());
        self
    }

    /// Build the config, reading unset values from the process environment
    pub fn build(self) -> Result<Config> {
        self.build_with_env(|name| std::env::var(name))
    }

    /// Build the config with `env` standing in for the process environment
    pub fn build_with_env<F>(self, env: F) -> Result<Config>
    where
        F: Fn(&str) -> std::result::Result<String, VarError>,
    {
        let client_id = match self.client_id {
            Some(c) => c,
            None => env_or(env(CLIENT_ID_ENV), DEFAULT_CLIENT_ID)?,
        };
        let api_url = match self.api_url {
            Some(u) => u,
            None => env_or(env(API_URL_ENV), DEFAULT_API_URL)?,
        };
        let limit = self.limit.unwrap_or(DEFAULT_LIMIT);
        let tags = self
            .tags
            .unwrap_or_else(|| DEFAULT_TAGS.iter().map(ToString::to_string).collect());
        let out_file = self
            .out_file
            .unwrap_or_else(|| DEFAULT_OUT_FILE.to_string());

        if client_id.is_empty() {
            return Err(Error::ConfigurationError("Client id must not be empty".into()));
        }
        if limit == 0 {
            return Err(Error::ConfigurationError(
                "Result limit must be greater than zero".into(),
            ));
        }
        if tags.is_empty() {
            return Err(Error::ConfigurationError("No genre tags configured".into()));
        }
        if out_file.is_empty() {
            return Err(Error::ConfigurationError(
                "Output file name must not be empty".into(),
            ));
        }

        Ok(Config {
            client: JamendoClient::new(reqwest::Client::new(), api_url, client_id, limit),
            tags,
            out_dir: self.out_dir.unwrap_or_else(|| PathBuf::from(DEFAULT_OUT_DIR)),
            out_file,
        })
    }
}

/// Outcome of offering one track to [`SeenIds::admit`]
#[derive(Debug, PartialEq, Eq)]
pub enum Admission {
    /// Track goes into the CSV as this row
    Accepted(Box<OutputRow>),
    /// Id already written earlier in the run
    Duplicate,
    /// No usable `audiodownload`
    MissingAudioDownload,
    /// Name longer than [`MAX_NAME_LEN`]
    NameTooLong,
}

/// Ids already written during this run
#[derive(Debug, Default)]
pub struct SeenIds {
    ids: HashSet<String>,
}

impl SeenIds {
    /// Check a track against the admission rules, in order: already seen,
    /// no download URL, name longer than [`MAX_NAME_LEN`]. Only accepted
    /// tracks are remembered.
    pub fn admit(&mut self, track: &TrackRecord) -> Admission {
        let id = track.id_key();
        if self.ids.contains(&id) {
            return Admission::Duplicate;
        }
        if !track.has_audio_download() {
            return Admission::MissingAudioDownload;
        }
        if track.display_name().chars().count() > MAX_NAME_LEN {
            return Admission::NameTooLong;
        }
        self.ids.insert(id);
        Admission::Accepted(Box::new(OutputRow::from(track)))
    }
}

#[cfg(test)]
impl SeenIds {
    fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    fn len(&self) -> usize {
        self.ids.len()
    }

    fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Per-tag counts for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagReport {
    /// Genre tag as queried
    pub tag: String,
    /// Tracks returned by the API
    pub fetched: usize,
    /// Rows written to the CSV
    pub written: usize,
}

/// What a finished run did
#[derive(Debug, Clone)]
pub struct ExportSummary {
    /// One report per tag, in query order
    pub tags: Vec<TagReport>,
    /// CSV file written
    pub path: PathBuf,
    /// Data rows in the CSV, header excluded
    pub rows_written: usize,
}

/// The main Exporter struct that performs the export
pub struct Exporter {
    config: Config,
}

impl Exporter {
    /// Exporter for the given config
    pub fn new(config: Config) -> Self {
        Exporter { config }
    }

    /// Query every configured tag in order and stream accepted tracks into the
    /// CSV. Progress lines go to `out`. The first failing request aborts the
    /// run, leaving rows for earlier tags in the file.
    pub async fn export<W: Write>(&self, out: &mut W) -> Result<ExportSummary> {
        info!(
            "Starting export of {} tags into {:?} ...",
            self.config.tags.len(),
            self.config.out_dir.join(&self.config.out_file)
        );
        let mut csv = TrackCsvWriter::create(&self.config.out_dir, &self.config.out_file).await?;
        let mut seen = SeenIds::default();
        let mut reports = Vec::with_capacity(self.config.tags.len());

        for tag in &self.config.tags {
            writeln!(out, "🎵 Fetching genre: {tag}")?;
            let tracks = self.config.client.fetch_tracks(tag).await?;
            if tracks.is_empty() {
                writeln!(out, "⚠️  No tracks found for tag: {tag}")?;
                reports.push(TagReport {
                    tag: tag.clone(),
                    fetched: 0,
                    written: 0,
                });
                continue;
            }

            let mut written = 0;
            for track in &tracks {
                match seen.admit(track) {
                    Admission::Accepted(row) => {
                        csv.write_row(&row)?;
                        written += 1;
                    }
                    rejected => {
                        debug!("Skipping track {:?} ({tag}): {rejected:?}", track.id_key());
                    }
                }
            }
            // Keep finished tags on disk in case a later request fails
            csv.flush()?;

            debug!("Tag {tag}: {written} of {} tracks written", tracks.len());
            reports.push(TagReport {
                tag: tag.clone(),
                fetched: tracks.len(),
                written,
            });
        }

        csv.flush()?;
        writeln!(out, "\n✅ CSV saved to {}", csv.path().display())?;
        info!(
            "Export completed successfully. Rows written: {}",
            csv.rows_written()
        );

        Ok(ExportSummary {
            tags: reports,
            path: csv.path().to_path_buf(),
            rows_written: csv.rows_written(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn track(value: serde_json::Value) -> TrackRecord {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn accepts_then_rejects_duplicate() {
        let mut seen = SeenIds::default();
        let t = track(json!({"id": "123", "name": "Song", "audiodownload": "https://dl"}));
        assert!(matches!(seen.admit(&t), Admission::Accepted(_)));
        assert_eq!(seen.admit(&t), Admission::Duplicate);
        assert_eq!(seen.len(), 1);
    }

    #[test]
    fn rejected_tracks_leave_seen_ids_untouched() {
        let mut seen = SeenIds::default();
        let no_download = track(json!({"id": "1", "name": "Song", "audiodownload": ""}));
        assert_eq!(seen.admit(&no_download), Admission::MissingAudioDownload);
        let long_name = track(json!({"id": "2", "name": "x".repeat(101), "audiodownload": "u"}));
        assert_eq!(seen.admit(&long_name), Admission::NameTooLong);
        assert!(seen.is_empty());

        // A later usable copy of a rejected track is still accepted
        let fixed = track(json!({"id": "1", "name": "Song", "audiodownload": "u"}));
        assert!(matches!(seen.admit(&fixed), Admission::Accepted(_)));
        assert!(seen.contains("1"));
    }

    #[test]
    fn duplicate_is_checked_before_other_rules() {
        let mut seen = SeenIds::default();
        seen.admit(&track(json!({"id": "5", "name": "a", "audiodownload": "u"})));
        let dup_without_download = track(json!({"id": "5", "name": "a"}));
        assert_eq!(seen.admit(&dup_without_download), Admission::Duplicate);
    }

    #[test]
    fn name_length_counts_characters() {
        let mut seen = SeenIds::default();
        let exact = track(json!({"id": "1", "name": "é".repeat(100), "audiodownload": "u"}));
        assert!(matches!(seen.admit(&exact), Admission::Accepted(_)));
        let over = track(json!({"id": "2", "name": "é".repeat(101), "audiodownload": "u"}));
        assert_eq!(seen.admit(&over), Admission::NameTooLong);
    }

    #[test]
    fn builder_defaults() {
        let config = ConfigBuilder::new().client_id("abc").build().unwrap();
        assert_eq!(config.tags, DEFAULT_TAGS.map(String::from).to_vec());
        assert_eq!(config.out_dir, PathBuf::from("jamendo_data"));
        assert_eq!(config.out_file, "jamendo_tracks.csv");
        assert!(config.client.search_params("pop").contains(&("limit", "200".to_string())));
    }

    #[test]
    fn builder_rejects_invalid_values() {
        let empty_tags: Vec<String> = vec![];
        assert!(matches!(
            ConfigBuilder::new().client_id("abc").tags(empty_tags).build(),
            Err(Error::ConfigurationError(_))
        ));
        assert!(matches!(
            ConfigBuilder::new().client_id("abc").limit(0).build(),
            Err(Error::ConfigurationError(_))
        ));
        assert!(matches!(
            ConfigBuilder::new().client_id("").build(),
            Err(Error::ConfigurationError(_))
        ));
    }

    fn fake_env(
        vars: &'static [(&'static str, &'static str)],
    ) -> impl Fn(&str) -> std::result::Result<String, VarError> {
        move |name: &str| {
            vars.iter()
                .find(|(k, _)| *k == name)
                .map(|(_, v)| (*v).to_string())
                .ok_or(VarError::NotPresent)
        }
    }

    #[test]
    fn environment_fills_unset_values() {
        let env = fake_env(&[
            ("JAMENDO_CLIENT_ID", "from-env"),
            ("JAMENDO_API_URL", "http://localhost:8080/v3.0"),
        ]);
        let config = ConfigBuilder::new().build_with_env(env).unwrap();
        assert!(config.client.search_params("pop").contains(&("client_id", "from-env".to_string())));
        assert_eq!(config.client.tracks_url(), "http://localhost:8080/v3.0/tracks");
    }

    #[test]
    fn explicit_values_win_over_environment() {
        let env = fake_env(&[
            ("JAMENDO_CLIENT_ID", "from-env"),
            ("JAMENDO_API_URL", "http://localhost:8080/v3.0"),
        ]);
        let config = ConfigBuilder::new()
            .client_id("from-flag")
            .api_url("http://127.0.0.1:9000/v3.0")
            .build_with_env(env)
            .unwrap();
        assert!(config.client.search_params("pop").contains(&("client_id", "from-flag".to_string())));
        assert_eq!(config.client.tracks_url(), "http://127.0.0.1:9000/v3.0/tracks");
    }

    #[test]
    fn defaults_apply_without_environment() {
        let config = ConfigBuilder::new().build_with_env(fake_env(&[])).unwrap();
        assert!(config.client.search_params("pop").contains(&("client_id", "c538f291".to_string())));
        assert_eq!(config.client.tracks_url(), "https://api.jamendo.com/v3.0/tracks");
    }
}
