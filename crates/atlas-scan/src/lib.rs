//! Manifest generation for atlas.
//!
//! Walks a directory in parallel with jwalk and emits the flat manifest the
//! rest of the workspace consumes.
//!
//! # Example
//!
//! ```rust,no_run
//! use atlas_scan::{JwalkScanner, ScanConfig};
//!
//! let config = ScanConfig::new("/srv/site");
//! let manifest = JwalkScanner::new().scan(&config).unwrap();
//!
//! println!("{} records", manifest.len());
//! println!("version: {:?}", manifest.version);
//! ```

mod exclude;
mod scanner;
mod version;

pub use exclude::{ExcludeMatcher, literal_pattern};
pub use scanner::JwalkScanner;
pub use version::{VERSION_ENV, detect_version};

// Re-export core types for convenience
pub use atlas_core::{Manifest, ManifestEntry, ScanConfig, ScanError};
