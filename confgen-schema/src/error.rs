//! Error types for configuration schema construction
//!
//! Every violated precondition in this crate is a hard stop: a malformed
//! configuration schema is a build error, not a runtime condition, so there
//! is no logging-and-continue path anywhere.

use thiserror::Error;

/// Structured error for schema construction and type resolution failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("unsupported configuration type {type_repr} at {field} of {class}")]
    UnsupportedType {
        type_repr: String,
        field: String,
        class: String,
    },

    #[error("invalid invariant Class type argument in {type_repr} at {field} of {class}; only wildcard arguments are supported")]
    InvalidClassArgument {
        type_repr: String,
        field: String,
        class: String,
    },

    #[error("duplicate conversion behaviour specified on {field} of {class}: both a custom converter and the default-converter marker are given")]
    DuplicateConverterAnnotations { field: String, class: String },

    #[error("no configuration class was set on the builder")]
    NoConfigurationClass,

    #[error("field {field} is declared by {declaring} but the definition under construction is for {expected}")]
    FieldClassMismatch {
        field: String,
        declaring: String,
        expected: String,
    },

    #[error("property name override may not be empty at {field} of {class}")]
    EmptyName { field: String, class: String },

    #[error("no member named \"{name}\" in {class}{}", suggestion_hint(suggestions))]
    UnknownMember {
        name: String,
        class: String,
        suggestions: Vec<String>,
    },

    #[error("unknown configuration class {class}")]
    UnknownClass { class: String },

    #[error("map keys must be strings at {field} of {class}, found {key}")]
    MapKeyNotString {
        field: String,
        class: String,
        key: String,
    },

    #[error("group map values may not be optional at {field} of {class}")]
    OptionalGroupInMap { field: String, class: String },

    #[error("configuration group cycle involving {class} at {field}")]
    GroupCycle { class: String, field: String },

    #[error("duplicate configuration root name \"{name}\" ({first} and {second})")]
    DuplicateRootName {
        name: String,
        first: String,
        second: String,
    },
}

fn suggestion_hint(suggestions: &[String]) -> String {
    match suggestions.first() {
        Some(candidate) => format!(". Did you mean \"{candidate}\"?"),
        None => String::new(),
    }
}

/// Error from reading a metadata registry document.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("failed to read registry file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse registry JSON: {0}")]
    Json(#[from] serde_json::Error),
}
