//! Test fixtures for depgraph
//!
//! On-disk fixtures with RAII cleanup: JSON fixture maps, nuspec documents
//! and `.nupkg` archives for the archive resolver.

pub mod filesystem;

pub use filesystem::{TempDirFixture, nuspec_xml};
