//! Configuration class definitions and members
//!
//! A [`ClassDefinition`] describes one configuration-bearing class as an
//! ordered, name-unique set of members. Definitions always link to the
//! things they contain, never back to their own container; members carry at
//! most a non-owning [`ClassRef`] handle naming their enclosing class, which
//! keeps the whole model an ownership DAG with no reference cycles.

use crate::converter::ConverterType;
use crate::descriptor::{ClassRef, FieldMetadata, NameOverride, TypeShape};
use crate::error::SchemaError;
use crate::group::GroupDefinition;
use crate::suggest::suggest_similar;
use crate::utils::hyphenate;
use std::collections::HashMap;
use std::sync::Arc;

/// Derive the externally visible property-name segment for a field.
pub(crate) fn derive_property_name(field: &FieldMetadata) -> Result<String, SchemaError> {
    match &field.name_override {
        NameOverride::Explicit(name) if name.is_empty() => Err(SchemaError::EmptyName {
            field: field.name.clone(),
            class: field.declaring_class.name.clone(),
        }),
        NameOverride::Explicit(name) => Ok(name.clone()),
        NameOverride::Hyphenated => Ok(hyphenate(&field.name)),
        NameOverride::ElementName => Ok(field.name.clone()),
        NameOverride::Parent => Ok(String::new()),
    }
}

/// A leaf configuration value.
#[derive(Debug, Clone)]
pub struct ItemMember {
    field: FieldMetadata,
    enclosing: ClassRef,
    property_name: String,
    default_value: Option<String>,
    converter_type: ConverterType,
}

impl ItemMember {
    pub fn name(&self) -> &str {
        &self.field.name
    }

    pub fn property_name(&self) -> &str {
        &self.property_name
    }

    pub fn field(&self) -> &FieldMetadata {
        &self.field
    }

    pub fn enclosing_class(&self) -> &ClassRef {
        &self.enclosing
    }

    /// The declared default value string, or `None` for "no default".
    pub fn default_value(&self) -> Option<&str> {
        self.default_value.as_deref()
    }

    pub fn converter_type(&self) -> &ConverterType {
        &self.converter_type
    }
}

/// A reference to a nested group of configuration values.
#[derive(Debug, Clone)]
pub struct GroupMember {
    field: FieldMetadata,
    enclosing: ClassRef,
    property_name: String,
    group: Arc<GroupDefinition>,
    optional: bool,
}

impl GroupMember {
    pub fn name(&self) -> &str {
        &self.field.name
    }

    pub fn property_name(&self) -> &str {
        &self.property_name
    }

    pub fn field(&self) -> &FieldMetadata {
        &self.field
    }

    pub fn enclosing_class(&self) -> &ClassRef {
        &self.enclosing
    }

    pub fn group(&self) -> &Arc<GroupDefinition> {
        &self.group
    }

    /// Whether the whole group may be absent at runtime.
    pub fn is_optional(&self) -> bool {
        self.optional
    }
}

/// A member whose property space is `prefix.<dynamic-key>.<nested-property>`.
///
/// Wraps another member and delegates name and type accessors to it, so a
/// map of nested groups and a map of scalars share the same mechanism.
#[derive(Debug, Clone)]
pub struct MapMember {
    nested: Box<ClassMember>,
}

impl MapMember {
    pub fn nested(&self) -> &ClassMember {
        &self.nested
    }
}

/// A child of a [`ClassDefinition`].
#[derive(Debug, Clone)]
pub enum ClassMember {
    Item(ItemMember),
    Group(GroupMember),
    Map(MapMember),
}

impl ClassMember {
    /// The underlying field identifier.
    pub fn name(&self) -> &str {
        match self {
            ClassMember::Item(item) => item.name(),
            ClassMember::Group(group) => group.name(),
            ClassMember::Map(map) => map.nested.name(),
        }
    }

    /// The externally visible dotted-segment name; empty for parent/inline
    /// members whose sub-properties attach directly under the owner.
    pub fn property_name(&self) -> &str {
        match self {
            ClassMember::Item(item) => item.property_name(),
            ClassMember::Group(group) => group.property_name(),
            ClassMember::Map(map) => map.nested.property_name(),
        }
    }

    pub fn enclosing_class(&self) -> &ClassRef {
        match self {
            ClassMember::Item(item) => item.enclosing_class(),
            ClassMember::Group(group) => group.enclosing_class(),
            ClassMember::Map(map) => map.nested.enclosing_class(),
        }
    }

    pub fn field(&self) -> &FieldMetadata {
        match self {
            ClassMember::Item(item) => item.field(),
            ClassMember::Group(group) => group.field(),
            ClassMember::Map(map) => map.nested.field(),
        }
    }

    /// The declared shape this member maps, for downstream code generation.
    pub fn type_shape(&self) -> &TypeShape {
        match self {
            ClassMember::Item(item) => &item.field.shape,
            ClassMember::Group(group) => &group.field.shape,
            ClassMember::Map(map) => map.nested.type_shape(),
        }
    }
}

/// Immutable description of an item member, accumulated by the builder.
#[derive(Debug, Clone)]
pub struct ItemSpec {
    field: FieldMetadata,
    value_shape: TypeShape,
    default_value: Option<String>,
}

impl ItemSpec {
    pub fn new(field: FieldMetadata, default_value: Option<String>) -> Self {
        let value_shape = field.shape.clone();
        ItemSpec {
            field,
            value_shape,
            default_value,
        }
    }

    /// An item whose effective shape differs from the whole field type;
    /// used for members nested inside map wrappers.
    pub fn with_value_shape(
        field: FieldMetadata,
        value_shape: TypeShape,
        default_value: Option<String>,
    ) -> Self {
        ItemSpec {
            field,
            value_shape,
            default_value,
        }
    }
}

/// Immutable description of a group member.
#[derive(Debug, Clone)]
pub struct GroupSpec {
    field: FieldMetadata,
    group: Arc<GroupDefinition>,
    optional: bool,
}

impl GroupSpec {
    pub fn new(field: FieldMetadata, group: Arc<GroupDefinition>, optional: bool) -> Self {
        GroupSpec {
            field,
            group,
            optional,
        }
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }
}

/// Immutable description of a map member, wrapping a pre-built nested
/// specification.
#[derive(Debug, Clone)]
pub struct MapSpec {
    nested: Box<MemberSpec>,
}

impl MapSpec {
    pub fn new(nested: MemberSpec) -> Self {
        MapSpec {
            nested: Box::new(nested),
        }
    }
}

/// Specification of one member, carrying no back-reference to any
/// definition; [`MemberSpec::construct`] is the only path that produces a
/// live, enclosing-bound [`ClassMember`].
#[derive(Debug, Clone)]
pub enum MemberSpec {
    Item(ItemSpec),
    Group(GroupSpec),
    Map(MapSpec),
}

impl MemberSpec {
    pub fn field(&self) -> &FieldMetadata {
        match self {
            MemberSpec::Item(item) => &item.field,
            MemberSpec::Group(group) => &group.field,
            MemberSpec::Map(map) => map.nested.field(),
        }
    }

    pub fn is_optional_group(&self) -> bool {
        matches!(self, MemberSpec::Group(group) if group.optional)
    }

    fn construct(&self, enclosing: &ClassRef) -> Result<ClassMember, SchemaError> {
        match self {
            MemberSpec::Item(item) => Ok(ClassMember::Item(ItemMember {
                property_name: derive_property_name(&item.field)?,
                converter_type: ConverterType::of_value(&item.field, &item.value_shape)?,
                field: item.field.clone(),
                enclosing: enclosing.clone(),
                default_value: item.default_value.clone(),
            })),
            MemberSpec::Group(group) => Ok(ClassMember::Group(GroupMember {
                property_name: derive_property_name(&group.field)?,
                field: group.field.clone(),
                enclosing: enclosing.clone(),
                group: Arc::clone(&group.group),
                optional: group.optional,
            })),
            // the nested specification is constructed against the same
            // enclosing definition, then wrapped
            MemberSpec::Map(map) => Ok(ClassMember::Map(MapMember {
                nested: Box::new(map.nested.construct(enclosing)?),
            })),
        }
    }
}

/// One configuration-bearing class: an ordered, name-unique member set.
#[derive(Debug, Clone)]
pub struct ClassDefinition {
    class: ClassRef,
    order: Vec<String>,
    members: HashMap<String, ClassMember>,
}

impl ClassDefinition {
    pub fn builder() -> ClassDefinitionBuilder {
        ClassDefinitionBuilder::new()
    }

    pub fn class(&self) -> &ClassRef {
        &self.class
    }

    /// Member names in first-registration order.
    pub fn member_names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Members in first-registration order.
    pub fn members(&self) -> impl Iterator<Item = &ClassMember> {
        self.order.iter().map(move |name| &self.members[name])
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Look up a member by its original field identifier.
    pub fn get_member(&self, name: &str) -> Result<&ClassMember, SchemaError> {
        self.members.get(name).ok_or_else(|| {
            let candidates: Vec<&str> = self.order.iter().map(String::as_str).collect();
            SchemaError::UnknownMember {
                name: name.to_string(),
                class: self.class.name.clone(),
                suggestions: suggest_similar(name, &candidates, 3)
                    .into_iter()
                    .map(|s| s.candidate)
                    .collect(),
            }
        })
    }
}

/// Single-use builder for a [`ClassDefinition`]; validates required state
/// before freezing the object graph.
#[derive(Debug, Default)]
pub struct ClassDefinitionBuilder {
    class: Option<ClassRef>,
    order: Vec<String>,
    specs: HashMap<String, MemberSpec>,
}

impl ClassDefinitionBuilder {
    pub fn new() -> Self {
        ClassDefinitionBuilder::default()
    }

    pub fn configuration_class(mut self, class: ClassRef) -> Self {
        self.class = Some(class);
        self
    }

    /// Register a member specification; re-registering under the same field
    /// name replaces the earlier entry in place.
    pub fn add_member(mut self, spec: MemberSpec) -> Self {
        let name = spec.field().name.clone();
        if self.specs.insert(name.clone(), spec).is_some() {
            tracing::debug!(member = %name, "replacing member specification");
        } else {
            self.order.push(name);
        }
        self
    }

    pub fn build(self) -> Result<ClassDefinition, SchemaError> {
        let class = self.class.ok_or(SchemaError::NoConfigurationClass)?;
        let mut members = HashMap::with_capacity(self.specs.len());
        for name in &self.order {
            let spec = &self.specs[name];
            let declaring = &spec.field().declaring_class;
            if declaring.name != class.name {
                return Err(SchemaError::FieldClassMismatch {
                    field: name.clone(),
                    declaring: declaring.name.clone(),
                    expected: class.name.clone(),
                });
            }
            members.insert(name.clone(), spec.construct(&class)?);
        }
        Ok(ClassDefinition {
            class,
            order: self.order,
            members,
        })
    }
}
