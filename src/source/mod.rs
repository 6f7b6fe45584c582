//! Source reader module
//!
//! Reads line-delimited JSON records from a directory tree or an
//! object-store prefix.
//!
//! # Overview
//!
//! The source module provides:
//! - `FilePattern` - `/`-separated glob selecting files a fixed depth below a root
//! - `SourceReader` - Lazy, restartable reader yielding typed records from local files
//! - `ObjectSourceReader` - Reader over objects below an `s3`/`r2`/`gs`/`az` prefix
//! - `SourceLocation` - Local or object-store input, picked from the input URL
//! - `SongCatalogRecord` / `LogEvent` - Raw records of the two input sources
//!
//! Any malformed line aborts the read; there is no skip path.

mod location;
mod object;
mod pattern;
mod reader;
mod records;

pub use location::SourceLocation;
pub use object::ObjectSourceReader;
pub use pattern::FilePattern;
pub use reader::{RecordIter, SourceReader};
pub use records::{LogEvent, SongCatalogRecord};
