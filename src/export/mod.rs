pub mod driver;
pub mod listing;

pub use driver::{ExportReport, Exporter};
