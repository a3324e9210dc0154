//! File input and output: loading datasets and exporting results.

pub mod export;
pub mod loader;

pub use export::Exporter;
pub use loader::{ask_format, load_dataset};
