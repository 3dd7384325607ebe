//! Jamtracks - Export Jamendo tracks by genre tag to CSV
//!
//! This library queries the Jamendo tracks API once per genre tag, drops
//! duplicate and unusable tracks, and streams the remaining ones into a CSV file.

/// Client modules for the Jamendo API and the CSV output file
pub mod clients;
/// Configuration and the export run itself
pub mod exporter;
