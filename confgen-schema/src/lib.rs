//! Configuration schema model and type resolution for Confgen
//!
//! This crate is the core of the build-time configuration mapping engine:
//! it turns the metadata reported for annotated application classes into a
//! typed, immutable schema that downstream code generation consumes.
//!
//! - **Descriptors** - language-neutral class/field/type metadata produced
//!   by a front-end scan
//! - **Converter types** - a closed recursive union describing how a raw
//!   string property value maps to a typed value
//! - **Definitions** - configuration classes as ordered member sets, with
//!   roots computing their externally visible dotted property prefix
//!
//! Final property names are always lowercase, dot-segment-delimited and
//! hyphen-within-segment (e.g. `quarkus.http.max-retry-count`); downstream
//! tooling depends on that contract bit-exactly.

pub mod converter;
pub mod definition;
pub mod descriptor;
pub mod error;
pub mod group;
pub mod parse;
pub mod root;
pub mod suggest;
pub mod utils;

pub use converter::{CollectionKind, ConverterNode, ConverterType};
pub use definition::{
    ClassDefinition, ClassDefinitionBuilder, ClassMember, GroupMember, GroupSpec, ItemMember,
    ItemSpec, MapMember, MapSpec, MemberSpec,
};
pub use descriptor::{
    ClassKind, ClassMetadata, ClassRef, FieldMetadata, MetadataRegistry, NameOverride, RawType,
    RootMetadata, TypeArg, TypeShape, WildcardArg, WildcardBounds,
};
pub use error::{ParseError, SchemaError};
pub use group::{GroupDefinition, GroupDefinitionBuilder};
pub use parse::{parse_registry_content, parse_registry_file};
pub use root::{ConfigPhase, RootDefinition, RootDefinitionBuilder, DEFAULT_NAMESPACE};
