//! Metadata registry parsing

use crate::descriptor::MetadataRegistry;
use crate::error::ParseError;
use std::fs;
use std::path::Path;

pub fn parse_registry_file<P: AsRef<Path>>(path: P) -> Result<MetadataRegistry, ParseError> {
    let content = fs::read_to_string(&path).map_err(|e| ParseError::Io {
        path: path.as_ref().display().to_string(),
        source: e,
    })?;
    parse_registry_content(&content)
}

pub fn parse_registry_content(content: &str) -> Result<MetadataRegistry, ParseError> {
    Ok(serde_json::from_str(content)?)
}
