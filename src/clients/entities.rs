use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Longest display name (in characters) a track may have to be exported
pub const MAX_NAME_LEN: usize = 100;

/// CSV header, in column order. Must match the field order of [`OutputRow`].
pub const CSV_COLUMNS: [&str; 23] = [
    "id",
    "name",
    "artist_name",
    "duration",
    "audio",
    "audiodownload",
    "file_path",
    "genres",
    "shareurl",
    "album_id",
    "album_name",
    "album_image",
    "artist_id",
    "position",
    "license_ccurl",
    "stats_rate_downloads_total",
    "stats_rate_listened_total",
    "stats_playlisted",
    "stats_favorited",
    "stats_likes",
    "stats_dislikes",
    "stats_avgnote",
    "stats_notes",
];

/// One track as returned by the Jamendo `tracks` endpoint.
///
/// Scalar fields are kept as raw JSON values since Jamendo mixes strings and
/// numbers (e.g. `id` is a string, `duration` a number). Everything is optional,
/// and the nested `musicinfo` and `stats` blocks are read leniently: a block of
/// the wrong shape yields empty columns instead of failing the whole page.
#[derive(Deserialize, Debug, Default, Clone)]
pub struct TrackRecord {
    /// Jamendo track id
    pub id: Option<Value>,
    /// Track title
    pub name: Option<Value>,
    /// Display name of the artist
    pub artist_name: Option<Value>,
    /// Length in seconds
    pub duration: Option<Value>,
    /// Streaming URL
    pub audio: Option<Value>,
    /// Download URL, absent when downloads are disabled for the track
    pub audiodownload: Option<Value>,
    /// Public page of the track
    pub shareurl: Option<Value>,
    /// Jamendo album id
    pub album_id: Option<Value>,
    /// Album title
    pub album_name: Option<Value>,
    /// Album cover URL
    pub album_image: Option<Value>,
    /// Jamendo artist id
    pub artist_id: Option<Value>,
    /// Position of the track in its album
    pub position: Option<Value>,
    /// Creative Commons license URL
    pub license_ccurl: Option<Value>,
    /// `musicinfo` block, present when the request includes `musicinfo`
    pub musicinfo: Option<Value>,
    /// `stats` block, present when the request includes `stats`
    pub stats: Option<Value>,
}

impl TrackRecord {
    /// Key used for cross-tag deduplication. A missing id maps to `""`.
    pub fn id_key(&self) -> String {
        field_text(self.id.as_ref())
    }

    /// Track title as text
    pub fn display_name(&self) -> String {
        field_text(self.name.as_ref())
    }

    /// Whether `audiodownload` holds a usable value
    pub fn has_audio_download(&self) -> bool {
        is_truthy(self.audiodownload.as_ref())
    }

    /// Comma-joined `musicinfo.tags.genres`. Missing levels give `""`, and
    /// entries that are not strings are skipped.
    pub fn genres(&self) -> String {
        let genres = self
            .musicinfo
            .as_ref()
            .and_then(|m| m.get("tags"))
            .and_then(|t| t.get("genres"));
        match genres {
            Some(Value::Array(list)) => list
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join(","),
            Some(Value::String(single)) => single.clone(),
            _ => String::new(),
        }
    }

    /// One entry of the `stats` block as text, `""` when the block or key is missing
    pub fn stat(&self, key: &str) -> String {
        field_text(
            self.stats
                .as_ref()
                .and_then(Value::as_object)
                .and_then(|s| s.get(key)),
        )
    }
}

/// Flattened CSV projection of a [`TrackRecord`].
///
/// Fields mirror [`CSV_COLUMNS`] one to one.
#[allow(missing_docs)]
#[derive(Serialize, Debug, Default, Clone, PartialEq, Eq)]
pub struct OutputRow {
    pub id: String,
    pub name: String,
    pub artist_name: String,
    pub duration: String,
    pub audio: String,
    pub audiodownload: String,
    // Audio is never downloaded, so this stays empty
    pub file_path: String,
    pub genres: String,
    pub shareurl: String,
    pub album_id: String,
    pub album_name: String,
    pub album_image: String,
    pub artist_id: String,
    pub position: String,
    pub license_ccurl: String,
    pub stats_rate_downloads_total: String,
    pub stats_rate_listened_total: String,
    pub stats_playlisted: String,
    pub stats_favorited: String,
    pub stats_likes: String,
    pub stats_dislikes: String,
    pub stats_avgnote: String,
    pub stats_notes: String,
}

impl From<&TrackRecord> for OutputRow {
    fn from(t: &TrackRecord) -> OutputRow {
        OutputRow {
            id: t.id_key(),
            name: t.display_name(),
            artist_name: field_text(t.artist_name.as_ref()),
            duration: field_text(t.duration.as_ref()),
            audio: field_text(t.audio.as_ref()),
            audiodownload: field_text(t.audiodownload.as_ref()),
            file_path: String::new(),
            genres: t.genres(),
            shareurl: field_text(t.shareurl.as_ref()),
            album_id: field_text(t.album_id.as_ref()),
            album_name: field_text(t.album_name.as_ref()),
            album_image: field_text(t.album_image.as_ref()),
            artist_id: field_text(t.artist_id.as_ref()),
            position: field_text(t.position.as_ref()),
            license_ccurl: field_text(t.license_ccurl.as_ref()),
            stats_rate_downloads_total: t.stat("rate_downloads_total"),
            stats_rate_listened_total: t.stat("rate_listened_total"),
            stats_playlisted: t.stat("playlisted"),
            stats_favorited: t.stat("favorited"),
            stats_likes: t.stat("likes"),
            stats_dislikes: t.stat("dislikes"),
            stats_avgnote: t.stat("avgnote"),
            stats_notes: t.stat("notes"),
        }
    }
}

/// Render a JSON scalar as CSV text. Null and missing values become `""`,
/// booleans are written as `True`/`False`.
pub fn field_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(true)) => "True".to_string(),
        Some(Value::Bool(false)) => "False".to_string(),
        // Not expected for scalar fields, keep the raw JSON rather than drop it
        Some(other) => other.to_string(),
    }
}

fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f.abs() > 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(a)) => !a.is_empty(),
        Some(Value::Object(o)) => !o.is_empty(),
    }
}
