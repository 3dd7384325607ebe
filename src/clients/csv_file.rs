use std::fs::File;
use std::path::{Path, PathBuf};

use log::debug;

use crate::clients::{
    entities::{CSV_COLUMNS, OutputRow},
    errors::Result,
};

/// Streams exported rows into a CSV file.
///
/// The file is truncated and the header written on creation, so a run that
/// writes no rows still leaves a header-only file behind. Rows are written as
/// they are accepted; the underlying writer flushes on drop.
pub struct TrackCsvWriter {
    writer: csv::Writer<File>,
    path: PathBuf,
    rows: usize,
}

impl TrackCsvWriter {
    /// Create `dir` if needed, truncate `dir/file_name` and write the header
    pub async fn create(dir: impl AsRef<Path>, file_name: &str) -> Result<Self> {
        let dir = dir.as_ref();
        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(file_name);

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .terminator(csv::Terminator::CRLF)
            .from_path(&path)?;
        writer.write_record(CSV_COLUMNS)?;
        debug!("Opened {path:?} for writing");

        Ok(TrackCsvWriter {
            writer,
            path,
            rows: 0,
        })
    }

    /// Append one row
    pub fn write_row(&mut self, row: &OutputRow) -> Result<()> {
        self.writer.serialize(row)?;
        self.rows += 1;
        Ok(())
    }

    /// Push buffered rows to disk
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        debug!("Flushed {} rows to {:?}", self.rows, self.path);
        Ok(())
    }

    /// Path of the CSV file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rows written so far, header excluded
    pub fn rows_written(&self) -> usize {
        self.rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "id,name,artist_name,duration,audio,audiodownload,file_path,genres,shareurl,album_id,album_name,album_image,artist_id,position,license_ccurl,stats_rate_downloads_total,stats_rate_listened_total,stats_playlisted,stats_favorited,stats_likes,stats_dislikes,stats_avgnote,stats_notes";

    #[tokio::test]
    async fn writes_header_without_rows() {
        let tmp = tempfile::tempdir().unwrap();
        let mut out = TrackCsvWriter::create(tmp.path(), "tracks.csv").await.unwrap();
        out.flush().unwrap();

        let content = std::fs::read_to_string(out.path()).unwrap();
        assert_eq!(content, format!("{HEADER}\r\n"));
        assert_eq!(out.rows_written(), 0);
    }

    #[tokio::test]
    async fn creates_missing_directory_and_truncates() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("nested").join("out");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("tracks.csv"), "stale content\n".repeat(50)).unwrap();

        let mut out = TrackCsvWriter::create(&dir, "tracks.csv").await.unwrap();
        out.flush().unwrap();
        let content = std::fs::read_to_string(dir.join("tracks.csv")).unwrap();
        assert!(!content.contains("stale"));

        let fresh = tmp.path().join("does").join("not").join("exist");
        TrackCsvWriter::create(&fresh, "t.csv").await.unwrap();
        assert!(fresh.join("t.csv").exists());
    }

    #[tokio::test]
    async fn quotes_fields_with_commas() {
        let tmp = tempfile::tempdir().unwrap();
        let mut out = TrackCsvWriter::create(tmp.path(), "tracks.csv").await.unwrap();
        let row = OutputRow {
            id: "7".into(),
            name: "Hello, \"World\"".into(),
            genres: "jazz,blues".into(),
            ..OutputRow::default()
        };
        out.write_row(&row).unwrap();
        out.flush().unwrap();

        let content = std::fs::read_to_string(out.path()).unwrap();
        let line = content.lines().nth(1).unwrap();
        assert!(line.starts_with(r#"7,"Hello, ""World""",,,,,,"jazz,blues","#));

        let mut reader = csv::Reader::from_path(out.path()).unwrap();
        let record = reader.records().next().unwrap().unwrap();
        assert_eq!(record.len(), CSV_COLUMNS.len());
        assert_eq!(&record[1], "Hello, \"World\"");
        assert_eq!(&record[7], "jazz,blues");
    }
}
