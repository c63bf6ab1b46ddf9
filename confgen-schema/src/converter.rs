//! Converter type model and resolution
//!
//! A [`ConverterType`] describes how a raw string property value maps to a
//! typed value: a leaf conversion, possibly wrapped in array / collection /
//! optional containers and validation decorators. Values are immutable and
//! compare by structural content; the hash is computed once per instance and
//! cached.

use crate::descriptor::{ClassRef, FieldMetadata, RawType, TypeArg, TypeShape};
use crate::error::SchemaError;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};

/// Substituted when the genuine structural hash happens to be zero, so that
/// an unset cache (0) stays distinguishable from a computed value.
const HASH_SENTINEL: u64 = 0x8000_0000;

/// Concrete container produced for a collection-shaped property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CollectionKind {
    List,
    Set,
    SortedSet,
    NavigableSet,
}

/// Structural content of a converter type node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ConverterNode {
    /// Innermost scalar conversion, with an optional custom converter class.
    Leaf {
        leaf: ClassRef,
        convert_with: Option<ClassRef>,
    },
    ArrayOf {
        element: Box<ConverterType>,
    },
    CollectionOf {
        element: Box<ConverterType>,
        kind: CollectionKind,
    },
    /// The value may be absent entirely.
    OptionalOf {
        nested: Box<ConverterType>,
    },
    MinMaxValidated {
        nested: Box<ConverterType>,
        min: Option<String>,
        min_inclusive: bool,
        max: Option<String>,
        max_inclusive: bool,
    },
    PatternValidated {
        nested: Box<ConverterType>,
        pattern: String,
    },
    /// A class-reference value that must be assignable to the bound.
    UpperBoundCheckOf {
        bound: ClassRef,
        nested: Box<ConverterType>,
    },
    /// A class-reference value that must be assignable from the bound.
    LowerBoundCheckOf {
        bound: ClassRef,
        nested: Box<ConverterType>,
    },
}

/// An immutable converter type tree with a lazily cached structural hash.
#[derive(Debug)]
pub struct ConverterType {
    node: ConverterNode,
    hash_cache: AtomicU64,
}

impl ConverterType {
    fn new(node: ConverterNode) -> Self {
        ConverterType {
            node,
            hash_cache: AtomicU64::new(0),
        }
    }

    pub fn leaf(leaf: ClassRef, convert_with: Option<ClassRef>) -> Self {
        ConverterType::new(ConverterNode::Leaf { leaf, convert_with })
    }

    pub fn array_of(element: ConverterType) -> Self {
        ConverterType::new(ConverterNode::ArrayOf {
            element: Box::new(element),
        })
    }

    pub fn collection_of(element: ConverterType, kind: CollectionKind) -> Self {
        ConverterType::new(ConverterNode::CollectionOf {
            element: Box::new(element),
            kind,
        })
    }

    pub fn optional_of(nested: ConverterType) -> Self {
        ConverterType::new(ConverterNode::OptionalOf {
            nested: Box::new(nested),
        })
    }

    pub fn min_max_validated(
        nested: ConverterType,
        min: Option<String>,
        min_inclusive: bool,
        max: Option<String>,
        max_inclusive: bool,
    ) -> Self {
        ConverterType::new(ConverterNode::MinMaxValidated {
            nested: Box::new(nested),
            min,
            min_inclusive,
            max,
            max_inclusive,
        })
    }

    pub fn pattern_validated(nested: ConverterType, pattern: String) -> Self {
        ConverterType::new(ConverterNode::PatternValidated {
            nested: Box::new(nested),
            pattern,
        })
    }

    pub fn upper_bound_check_of(bound: ClassRef, nested: ConverterType) -> Self {
        ConverterType::new(ConverterNode::UpperBoundCheckOf {
            bound,
            nested: Box::new(nested),
        })
    }

    pub fn lower_bound_check_of(bound: ClassRef, nested: ConverterType) -> Self {
        ConverterType::new(ConverterNode::LowerBoundCheckOf {
            bound,
            nested: Box::new(nested),
        })
    }

    pub fn node(&self) -> &ConverterNode {
        &self.node
    }

    /// The innermost scalar class, through arbitrarily many decorator layers.
    pub fn leaf_type(&self) -> &ClassRef {
        match &self.node {
            ConverterNode::Leaf { leaf, .. } => leaf,
            ConverterNode::ArrayOf { element } | ConverterNode::CollectionOf { element, .. } => {
                element.leaf_type()
            }
            ConverterNode::OptionalOf { nested }
            | ConverterNode::MinMaxValidated { nested, .. }
            | ConverterNode::PatternValidated { nested, .. }
            | ConverterNode::UpperBoundCheckOf { nested, .. }
            | ConverterNode::LowerBoundCheckOf { nested, .. } => nested.leaf_type(),
        }
    }

    /// Structural hash, computed on first access and cached.
    ///
    /// The cache write is idempotent: recomputing stores the same value, so
    /// a racing second writer is harmless.
    pub fn hash_value(&self) -> u64 {
        let cached = self.hash_cache.load(Ordering::Relaxed);
        if cached != 0 {
            return cached;
        }
        let mut hasher = DefaultHasher::new();
        self.node.hash(&mut hasher);
        let mut value = hasher.finish();
        if value == 0 {
            value = HASH_SENTINEL;
        }
        self.hash_cache.store(value, Ordering::Relaxed);
        value
    }

    /// Resolve the converter type for a field from its declared shape and
    /// annotations.
    pub fn of(field: &FieldMetadata) -> Result<ConverterType, SchemaError> {
        ConverterType::of_value(field, &field.shape)
    }

    /// Resolve a specific declared shape using `field`'s annotations.
    ///
    /// This is the entry point for map value members, whose effective shape
    /// is the map's value type argument rather than the whole field type.
    pub fn of_value(field: &FieldMetadata, shape: &TypeShape) -> Result<ConverterType, SchemaError> {
        if field.default_converter && field.convert_with.is_some() {
            return Err(SchemaError::DuplicateConverterAnnotations {
                field: field.name.clone(),
                class: field.declaring_class.name.clone(),
            });
        }
        let mut resolved = resolve(field, shape, true)?;
        if let Some(pattern) = &field.pattern {
            resolved = ConverterType::pattern_validated(resolved, pattern.clone());
        }
        if field.min.is_some() || field.max.is_some() {
            resolved = ConverterType::min_max_validated(
                resolved,
                field.min.clone(),
                field.min_inclusive,
                field.max.clone(),
                field.max_inclusive,
            );
        }
        Ok(resolved)
    }
}

impl PartialEq for ConverterType {
    fn eq(&self, other: &Self) -> bool {
        self.node == other.node
    }
}

impl Eq for ConverterType {}

impl Hash for ConverterType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash_value());
    }
}

impl Clone for ConverterType {
    fn clone(&self) -> Self {
        ConverterType {
            node: self.node.clone(),
            hash_cache: AtomicU64::new(self.hash_cache.load(Ordering::Relaxed)),
        }
    }
}

fn unsupported(field: &FieldMetadata, shape: &TypeShape) -> SchemaError {
    SchemaError::UnsupportedType {
        type_repr: shape.to_string(),
        field: field.name.clone(),
        class: field.declaring_class.name.clone(),
    }
}

/// Recursive descent over the declared type shape.
///
/// A map is only accepted at the outermost position: the key is a dynamic
/// string segment handled by member construction, never converted, and a
/// parameterized map nested inside another shape has no property-name slot
/// for its keys.
fn resolve(
    field: &FieldMetadata,
    shape: &TypeShape,
    outermost: bool,
) -> Result<ConverterType, SchemaError> {
    match shape {
        // arrays of parameterized types have no erased component class
        TypeShape::Array(array) => match array.array.as_ref() {
            TypeShape::Parameterized(_) => Err(unsupported(field, shape)),
            component => Ok(ConverterType::array_of(resolve(field, component, false)?)),
        },
        TypeShape::Class(class) => {
            if class.kind == crate::descriptor::ClassKind::Enum
                && !field.default_converter
                && field.convert_with.is_none()
            {
                Ok(ConverterType::leaf(
                    class.clone(),
                    Some(ClassRef::hyphenated_enum_converter()),
                ))
            } else {
                Ok(ConverterType::leaf(class.clone(), field.convert_with.clone()))
            }
        }
        TypeShape::Parameterized(parameterized) => {
            let args = &parameterized.args;
            match (&parameterized.raw, args.len()) {
                (RawType::Class, 1) => resolve_class_of(field, shape, &args[0]),
                (RawType::List, 1) => collection_of(field, &args[0], shape, CollectionKind::List),
                (RawType::Set, 1) => collection_of(field, &args[0], shape, CollectionKind::Set),
                (RawType::SortedSet, 1) => {
                    collection_of(field, &args[0], shape, CollectionKind::SortedSet)
                }
                (RawType::NavigableSet, 1) => {
                    collection_of(field, &args[0], shape, CollectionKind::NavigableSet)
                }
                (RawType::Optional, 1) => match &args[0] {
                    TypeArg::Shape(nested) => {
                        Ok(ConverterType::optional_of(resolve(field, nested, false)?))
                    }
                    TypeArg::Wildcard(_) => Err(unsupported(field, shape)),
                },
                (RawType::Map, 2) if outermost => match &args[1] {
                    TypeArg::Shape(value) => resolve(field, value, false),
                    TypeArg::Wildcard(_) => Err(unsupported(field, shape)),
                },
                _ => Err(unsupported(field, shape)),
            }
        }
    }
}

fn collection_of(
    field: &FieldMetadata,
    arg: &TypeArg,
    shape: &TypeShape,
    kind: CollectionKind,
) -> Result<ConverterType, SchemaError> {
    match arg {
        TypeArg::Shape(element) => Ok(ConverterType::collection_of(
            resolve(field, element, false)?,
            kind,
        )),
        TypeArg::Wildcard(_) => Err(unsupported(field, shape)),
    }
}

/// `Class<?>` values resolve to a class-handle leaf; every non-Object upper
/// bound and every lower bound declared on the wildcard adds an assignability
/// check decorator. An invariant `Class<T>` argument is rejected.
fn resolve_class_of(
    field: &FieldMetadata,
    shape: &TypeShape,
    arg: &TypeArg,
) -> Result<ConverterType, SchemaError> {
    match arg {
        TypeArg::Wildcard(wildcard) => {
            let mut resolved =
                ConverterType::leaf(ClassRef::class_handle(), field.convert_with.clone());
            for upper in &wildcard.wildcard.upper {
                if upper.simple_name() != "Object" {
                    resolved = ConverterType::upper_bound_check_of(upper.clone(), resolved);
                }
            }
            for lower in &wildcard.wildcard.lower {
                resolved = ConverterType::lower_bound_check_of(lower.clone(), resolved);
            }
            Ok(resolved)
        }
        TypeArg::Shape(_) => Err(SchemaError::InvalidClassArgument {
            type_repr: shape.to_string(),
            field: field.name.clone(),
            class: field.declaring_class.name.clone(),
        }),
    }
}
