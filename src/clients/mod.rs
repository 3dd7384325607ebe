/// CSV output file
pub mod csv_file;
/// Track records from the API and rows for the CSV
pub mod entities;
/// Error types and result aliases
pub mod errors;
/// Jamendo API client
pub mod jamendo;

pub use csv_file::TrackCsvWriter;
pub use jamendo::JamendoClient;
