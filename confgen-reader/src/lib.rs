//! Build-pass configuration reader for Confgen
//!
//! Consumes the metadata registry produced by a front-end scan and turns it
//! into phase-partitioned [`RootDefinition`]s plus per-phase pattern maps
//! that match concrete property names (dynamic map keys included) back to
//! the leaf member they configure.
//!
//! ```no_run
//! use confgen_reader::SchemaReader;
//! use confgen_schema::parse_registry_file;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = parse_registry_file("registry.json")?;
//! let result = SchemaReader::new(registry).read()?;
//! for root in result.build_time_visible_roots() {
//!     println!("{} -> {}", root.class(), root.name());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! [`RootDefinition`]: confgen_schema::root::RootDefinition

pub mod patterns;
pub mod reader;

pub use patterns::{PatternMap, WILDCARD_SEGMENT};
pub use reader::{PropertyInfo, ReadResult, SchemaReader};
