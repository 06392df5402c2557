//! Recording module for ride samples and their import.

pub mod importer_csv;
pub mod types;

pub use importer_csv::{import_csv, import_csv_file};
pub use types::{ImportError, Sample, SampleSeries};
