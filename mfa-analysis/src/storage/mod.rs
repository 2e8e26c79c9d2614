//! Persistence layer: where reports and raw documents live on disk.
//!
//! The layout is date-first so a whole run can be inspected or deleted as
//! one directory:
//!
//! ```text
//! {analysis_dir}/{YYYYMMDD}/{analysis_type}/{category}.json   categorized
//! {analysis_dir}/{YYYYMMDD}/{analysis_type}.json              flat
//! {data_dir}/{YYYYMMDD}/{analysis_type}/{category}/coin_{ID}_{slug}.json
//! ```

pub mod paths;
pub mod store;

pub use paths::{RawDataPaths, ReportPaths};
pub use store::JsonStore;
