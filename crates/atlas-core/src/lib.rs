//! Core types for atlas.
//!
//! This crate turns a flat manifest of paths into a [`VirtualTree`] and
//! answers structural questions about it: resolving paths, listing children
//! and walking descendants.

mod builder;
mod config;
mod error;
mod manifest;
mod node;
pub mod path;
mod tree;

pub use builder::{TreeBuilder, build_tree};
pub use config::{DEFAULT_EXCLUDES, ScanConfig, ScanConfigBuilder};
pub use error::{BuildWarning, ManifestError, ScanError, WarningKind};
pub use manifest::{Manifest, ManifestEntry};
pub use node::{FileKind, Node, extension};
pub use tree::{TreeStats, VirtualTree};
