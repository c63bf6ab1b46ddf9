//! Language-neutral class and type descriptors
//!
//! The metadata-extraction front end inspects application classes once per
//! build pass and hands this crate plain data: which classes exist, what
//! their fields look like, and which annotations were present. Nothing in
//! here performs any classpath scanning or reflection itself.

use crate::root::ConfigPhase;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque handle to an application class, as reported by the front end.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClassRef {
    /// Fully qualified class name (e.g. "io.example.HttpBuildTimeConfig").
    pub name: String,
    #[serde(default)]
    pub kind: ClassKind,
    /// Whether the class denotes a JVM primitive; primitive leaves receive
    /// an implicit default value when no default is declared.
    #[serde(default)]
    pub primitive: bool,
}

/// Coarse classification of a class, as far as configuration mapping cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClassKind {
    Bool,
    Int,
    Long,
    Float,
    Double,
    String,
    Enum,
    /// Carries the configuration-group marker annotation.
    Group,
    #[default]
    Other,
}

impl ClassRef {
    pub fn new(name: impl Into<String>, kind: ClassKind) -> Self {
        ClassRef {
            name: name.into(),
            kind,
            primitive: false,
        }
    }

    pub fn primitive(name: impl Into<String>, kind: ClassKind) -> Self {
        ClassRef {
            name: name.into(),
            kind,
            primitive: true,
        }
    }

    pub fn group(name: impl Into<String>) -> Self {
        ClassRef::new(name, ClassKind::Group)
    }

    /// The class-reference target used for `Class<?>`-shaped values.
    pub fn class_handle() -> Self {
        ClassRef::new("java.lang.Class", ClassKind::Other)
    }

    /// The implicit converter applied to enum leaves: enum constant names
    /// are expected in hyphenated lowercase form unless opted out.
    pub fn hyphenated_enum_converter() -> Self {
        ClassRef::new("HyphenatedEnumConverter", ClassKind::Other)
    }

    /// Simple name with package and nesting qualifiers stripped.
    pub fn simple_name(&self) -> &str {
        self.name
            .rsplit(['.', '$'])
            .next()
            .unwrap_or(self.name.as_str())
    }

    pub fn is_group(&self) -> bool {
        self.kind == ClassKind::Group
    }

    pub fn is_string(&self) -> bool {
        self.kind == ClassKind::String
    }

    /// Implicit default value for leaves that declare none: primitives get
    /// their zero-value initializer, everything else has no default.
    pub fn implicit_default(&self) -> Option<&'static str> {
        if !self.primitive {
            return None;
        }
        match self.kind {
            ClassKind::Bool => Some("false"),
            ClassKind::Int | ClassKind::Long | ClassKind::Float | ClassKind::Double => Some("0"),
            _ => None,
        }
    }
}

impl fmt::Display for ClassRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Raw type of a parameterized declaration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RawType {
    List,
    Set,
    SortedSet,
    NavigableSet,
    Optional,
    Map,
    /// `Class<...>` - a class-reference value.
    Class,
    Other(ClassRef),
}

impl RawType {
    fn display_name(&self) -> &str {
        match self {
            RawType::List => "List",
            RawType::Set => "Set",
            RawType::SortedSet => "SortedSet",
            RawType::NavigableSet => "NavigableSet",
            RawType::Optional => "Optional",
            RawType::Map => "Map",
            RawType::Class => "Class",
            RawType::Other(class) => class.simple_name(),
        }
    }
}

/// Shape of a declared field type: a closed union over everything the
/// configuration mapping engine knows how to look at.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypeShape {
    Array(ArrayShape),
    Parameterized(ParameterizedShape),
    Class(ClassRef),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArrayShape {
    /// Component type of the array.
    pub array: Box<TypeShape>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParameterizedShape {
    pub raw: RawType,
    pub args: Vec<TypeArg>,
}

/// A type argument of a parameterized shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypeArg {
    Wildcard(WildcardArg),
    Shape(TypeShape),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WildcardArg {
    pub wildcard: WildcardBounds,
}

/// Declared bounds of a wildcard type argument.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WildcardBounds {
    #[serde(default)]
    pub upper: Vec<ClassRef>,
    #[serde(default)]
    pub lower: Vec<ClassRef>,
}

impl TypeShape {
    pub fn class(class: ClassRef) -> Self {
        TypeShape::Class(class)
    }

    pub fn array(component: TypeShape) -> Self {
        TypeShape::Array(ArrayShape {
            array: Box::new(component),
        })
    }

    pub fn parameterized(raw: RawType, args: Vec<TypeArg>) -> Self {
        TypeShape::Parameterized(ParameterizedShape { raw, args })
    }

    pub fn list_of(element: TypeShape) -> Self {
        TypeShape::parameterized(RawType::List, vec![TypeArg::Shape(element)])
    }

    pub fn optional_of(element: TypeShape) -> Self {
        TypeShape::parameterized(RawType::Optional, vec![TypeArg::Shape(element)])
    }

    pub fn map_of(key: TypeShape, value: TypeShape) -> Self {
        TypeShape::parameterized(RawType::Map, vec![TypeArg::Shape(key), TypeArg::Shape(value)])
    }
}

impl fmt::Display for TypeShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeShape::Class(class) => f.write_str(class.simple_name()),
            TypeShape::Array(shape) => write!(f, "{}[]", shape.array),
            TypeShape::Parameterized(shape) => {
                f.write_str(shape.raw.display_name())?;
                f.write_str("<")?;
                for (i, arg) in shape.args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                f.write_str(">")
            }
        }
    }
}

impl fmt::Display for TypeArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeArg::Shape(shape) => write!(f, "{shape}"),
            TypeArg::Wildcard(arg) => {
                f.write_str("?")?;
                for upper in &arg.wildcard.upper {
                    write!(f, " extends {}", upper.simple_name())?;
                }
                for lower in &arg.wildcard.lower {
                    write!(f, " super {}", lower.simple_name())?;
                }
                Ok(())
            }
        }
    }
}

/// How the externally visible property name of a member (or the root segment
/// of a root class) is derived.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NameOverride {
    /// Hyphenate the camel-case identifier (the default).
    #[default]
    Hyphenated,
    /// Use the identifier unchanged.
    ElementName,
    /// No extra segment; sub-properties attach directly under the owner.
    Parent,
    /// Use the given name verbatim.
    Explicit(String),
}

/// Everything the front end reports about one configuration field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMetadata {
    pub name: String,
    pub declaring_class: ClassRef,
    #[serde(rename = "type")]
    pub shape: TypeShape,
    #[serde(default)]
    pub name_override: NameOverride,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    /// Custom converter class declared on the field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub convert_with: Option<ClassRef>,
    /// The default-converter marker: opt out of implicit conversion policy.
    #[serde(default)]
    pub default_converter: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<String>,
    #[serde(default = "default_true")]
    pub min_inclusive: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<String>,
    #[serde(default = "default_true")]
    pub max_inclusive: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

fn default_true() -> bool {
    true
}

impl FieldMetadata {
    /// A bare field with no annotations, for front ends assembling metadata
    /// in code.
    pub fn new(name: impl Into<String>, declaring_class: ClassRef, shape: TypeShape) -> Self {
        FieldMetadata {
            name: name.into(),
            declaring_class,
            shape,
            name_override: NameOverride::default(),
            default_value: None,
            convert_with: None,
            default_converter: false,
            min: None,
            min_inclusive: true,
            max: None,
            max_inclusive: true,
            pattern: None,
        }
    }
}

/// Root-class annotation payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootMetadata {
    #[serde(default)]
    pub phase: ConfigPhase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    #[serde(default)]
    pub name_override: NameOverride,
}

/// One configuration-bearing class as reported by the front end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassMetadata {
    pub class: ClassRef,
    #[serde(default)]
    pub fields: Vec<FieldMetadata>,
    /// Present when the class is a configuration root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<RootMetadata>,
}

/// The full metadata set produced by one front-end scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataRegistry {
    pub classes: Vec<ClassMetadata>,
}

impl MetadataRegistry {
    pub fn new(classes: Vec<ClassMetadata>) -> Self {
        MetadataRegistry { classes }
    }

    pub fn get(&self, class: &ClassRef) -> Option<&ClassMetadata> {
        self.classes.iter().find(|c| c.class.name == class.name)
    }

    pub fn require(&self, class: &ClassRef) -> Result<&ClassMetadata, crate::error::SchemaError> {
        self.get(class)
            .ok_or_else(|| crate::error::SchemaError::UnknownClass {
                class: class.name.clone(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_name() {
        assert_eq!(
            ClassRef::new("io.example.HttpBuildTimeConfig", ClassKind::Group).simple_name(),
            "HttpBuildTimeConfig"
        );
        assert_eq!(
            ClassRef::new("io.example.Outer$Inner", ClassKind::Group).simple_name(),
            "Inner"
        );
        assert_eq!(ClassRef::new("Plain", ClassKind::Other).simple_name(), "Plain");
    }

    #[test]
    fn test_implicit_defaults() {
        assert_eq!(
            ClassRef::primitive("boolean", ClassKind::Bool).implicit_default(),
            Some("false")
        );
        assert_eq!(
            ClassRef::primitive("int", ClassKind::Int).implicit_default(),
            Some("0")
        );
        // boxed types never get an implicit default
        assert_eq!(
            ClassRef::new("java.lang.Integer", ClassKind::Int).implicit_default(),
            None
        );
        assert_eq!(
            ClassRef::new("java.lang.String", ClassKind::String).implicit_default(),
            None
        );
    }

    #[test]
    fn test_shape_display() {
        let string = TypeShape::class(ClassRef::new("java.lang.String", ClassKind::String));
        let map = TypeShape::map_of(string.clone(), TypeShape::list_of(string.clone()));
        assert_eq!(map.to_string(), "Map<String, List<String>>");

        let arr = TypeShape::array(string);
        assert_eq!(arr.to_string(), "String[]");

        let wild = TypeShape::parameterized(
            RawType::Class,
            vec![TypeArg::Wildcard(WildcardArg {
                wildcard: WildcardBounds {
                    upper: vec![ClassRef::new("io.example.Codec", ClassKind::Other)],
                    lower: vec![],
                },
            })],
        );
        assert_eq!(wild.to_string(), "Class<? extends Codec>");
    }
}
