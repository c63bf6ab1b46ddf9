//! Registry traversal and root assembly
//!
//! The [`SchemaReader`] walks a [`MetadataRegistry`], builds one
//! [`RootDefinition`] per configuration root it finds, and partitions the
//! results by [`ConfigPhase`]. Alongside the definitions it produces one
//! [`PatternMap`] per phase so that concrete property names (including the
//! dynamic keys of map-valued members) can be matched back to the member
//! they configure.

use crate::patterns::{PatternMap, WILDCARD_SEGMENT};
use confgen_schema::converter::ConverterType;
use confgen_schema::definition::{ClassMember, GroupSpec, ItemSpec, MapSpec, MemberSpec};
use confgen_schema::descriptor::{
    ClassRef, FieldMetadata, MetadataRegistry, RawType, TypeArg, TypeShape,
};
use confgen_schema::error::SchemaError;
use confgen_schema::group::GroupDefinition;
use confgen_schema::root::{ConfigPhase, RootDefinition, DEFAULT_NAMESPACE};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::debug;

/// One matchable leaf property, as registered in a phase's [`PatternMap`].
#[derive(Debug, Clone)]
pub struct PropertyInfo {
    /// Root class this property belongs to.
    pub root_class: ClassRef,
    pub phase: ConfigPhase,
    /// Field identifier of the leaf member.
    pub field_name: String,
    /// Full dotted pattern, wildcards included.
    pub property_name: String,
    pub converter_type: ConverterType,
    pub default_value: Option<String>,
}

/// Everything one pass over a registry produces.
#[derive(Debug, Default)]
pub struct ReadResult {
    all_roots: Vec<Arc<RootDefinition>>,
    build_time_roots: Vec<Arc<RootDefinition>>,
    build_time_run_time_roots: Vec<Arc<RootDefinition>>,
    bootstrap_roots: Vec<Arc<RootDefinition>>,
    run_time_roots: Vec<Arc<RootDefinition>>,
    build_time_patterns: PatternMap<PropertyInfo>,
    build_time_run_time_patterns: PatternMap<PropertyInfo>,
    bootstrap_patterns: PatternMap<PropertyInfo>,
    run_time_patterns: PatternMap<PropertyInfo>,
}

impl ReadResult {
    /// Roots in registry order, regardless of phase.
    pub fn all_roots(&self) -> &[Arc<RootDefinition>] {
        &self.all_roots
    }

    pub fn build_time_roots(&self) -> &[Arc<RootDefinition>] {
        &self.build_time_roots
    }

    pub fn build_time_run_time_roots(&self) -> &[Arc<RootDefinition>] {
        &self.build_time_run_time_roots
    }

    pub fn bootstrap_roots(&self) -> &[Arc<RootDefinition>] {
        &self.bootstrap_roots
    }

    pub fn run_time_roots(&self) -> &[Arc<RootDefinition>] {
        &self.run_time_roots
    }

    /// Roots whose values may be consumed during a build: the build-time
    /// phase plus the build-and-run-time-fixed phase.
    pub fn build_time_visible_roots(&self) -> impl Iterator<Item = &Arc<RootDefinition>> {
        self.build_time_roots
            .iter()
            .chain(self.build_time_run_time_roots.iter())
    }

    pub fn build_time_patterns(&self) -> &PatternMap<PropertyInfo> {
        &self.build_time_patterns
    }

    pub fn build_time_run_time_patterns(&self) -> &PatternMap<PropertyInfo> {
        &self.build_time_run_time_patterns
    }

    pub fn bootstrap_patterns(&self) -> &PatternMap<PropertyInfo> {
        &self.bootstrap_patterns
    }

    pub fn run_time_patterns(&self) -> &PatternMap<PropertyInfo> {
        &self.run_time_patterns
    }

    fn roots_for(&mut self, phase: ConfigPhase) -> &mut Vec<Arc<RootDefinition>> {
        match phase {
            ConfigPhase::BuildTime => &mut self.build_time_roots,
            ConfigPhase::BuildAndRunTimeFixed => &mut self.build_time_run_time_roots,
            ConfigPhase::Bootstrap => &mut self.bootstrap_roots,
            ConfigPhase::RunTime => &mut self.run_time_roots,
        }
    }

    fn patterns_for(&mut self, phase: ConfigPhase) -> &mut PatternMap<PropertyInfo> {
        match phase {
            ConfigPhase::BuildTime => &mut self.build_time_patterns,
            ConfigPhase::BuildAndRunTimeFixed => &mut self.build_time_run_time_patterns,
            ConfigPhase::Bootstrap => &mut self.bootstrap_patterns,
            ConfigPhase::RunTime => &mut self.run_time_patterns,
        }
    }
}

#[derive(Debug, Default)]
struct GroupCache {
    done: HashMap<String, Arc<GroupDefinition>>,
    in_progress: HashSet<String>,
}

/// Reads a metadata registry into phase-partitioned root definitions.
#[derive(Debug)]
pub struct SchemaReader {
    registry: MetadataRegistry,
}

impl SchemaReader {
    pub fn new(registry: MetadataRegistry) -> Self {
        SchemaReader { registry }
    }

    pub fn registry(&self) -> &MetadataRegistry {
        &self.registry
    }

    /// Build every configuration root in the registry.
    pub fn read(&self) -> Result<ReadResult, SchemaError> {
        let mut result = ReadResult::default();
        let mut groups = GroupCache::default();
        let mut seen_names: HashMap<String, String> = HashMap::new();

        for metadata in &self.registry.classes {
            let Some(root_metadata) = &metadata.root else {
                continue;
            };
            let mut builder = RootDefinition::builder()
                .configuration_class(metadata.class.clone())
                .config_phase(root_metadata.phase)
                .name_override(root_metadata.name_override.clone());
            if let Some(prefix) = &root_metadata.prefix {
                builder = builder.prefix(prefix.clone());
            } else {
                builder = builder.prefix(DEFAULT_NAMESPACE);
            }
            for field in &metadata.fields {
                builder = builder.add_member(self.member_spec(field, &mut groups)?);
            }
            let root = Arc::new(builder.build()?);

            if !root.name().is_empty() {
                if let Some(first) =
                    seen_names.insert(root.name().to_string(), root.class().name.clone())
                {
                    return Err(SchemaError::DuplicateRootName {
                        name: root.name().to_string(),
                        first,
                        second: root.class().name.clone(),
                    });
                }
            }

            debug!(
                class = %root.class(),
                name = %root.name(),
                phase = ?root.phase(),
                "registered configuration root"
            );

            let patterns = result.patterns_for(root.phase());
            for member in root.members() {
                add_member_patterns(&root, root.name(), member, false, patterns);
            }
            result.roots_for(root.phase()).push(Arc::clone(&root));
            result.all_roots.push(root);
        }
        Ok(result)
    }

    /// Classify one field into a member specification, unwrapping map
    /// wrappers into nested specifications as it goes.
    fn member_spec(
        &self,
        field: &FieldMetadata,
        groups: &mut GroupCache,
    ) -> Result<MemberSpec, SchemaError> {
        let shape = field.shape.clone();
        self.member_spec_of(field, &shape, true, groups)
    }

    fn member_spec_of(
        &self,
        field: &FieldMetadata,
        shape: &TypeShape,
        outermost: bool,
        groups: &mut GroupCache,
    ) -> Result<MemberSpec, SchemaError> {
        match shape {
            TypeShape::Parameterized(p) if p.raw == RawType::Map => {
                let (key, value) = match p.args.as_slice() {
                    [key, value] => (key, value),
                    _ => return Err(unsupported(field, shape)),
                };
                match key {
                    TypeArg::Shape(TypeShape::Class(class)) if class.is_string() => {}
                    other => {
                        return Err(SchemaError::MapKeyNotString {
                            field: field.name.clone(),
                            class: field.declaring_class.name.clone(),
                            key: other.to_string(),
                        })
                    }
                }
                let TypeArg::Shape(value_shape) = value else {
                    return Err(unsupported(field, shape));
                };
                let nested = self.member_spec_of(field, value_shape, false, groups)?;
                if nested.is_optional_group() {
                    return Err(SchemaError::OptionalGroupInMap {
                        field: field.name.clone(),
                        class: field.declaring_class.name.clone(),
                    });
                }
                Ok(MemberSpec::Map(MapSpec::new(nested)))
            }
            TypeShape::Parameterized(p) if p.raw == RawType::Optional => match p.args.as_slice() {
                [TypeArg::Shape(TypeShape::Class(class))] if class.is_group() => {
                    let group = self.group_definition(class, field, groups)?;
                    Ok(MemberSpec::Group(GroupSpec::new(field.clone(), group, true)))
                }
                _ => Ok(self.item_spec(field, shape, outermost)),
            },
            TypeShape::Class(class) if class.is_group() => {
                let group = self.group_definition(class, field, groups)?;
                Ok(MemberSpec::Group(GroupSpec::new(field.clone(), group, false)))
            }
            _ => Ok(self.item_spec(field, shape, outermost)),
        }
    }

    fn item_spec(&self, field: &FieldMetadata, shape: &TypeShape, outermost: bool) -> MemberSpec {
        // primitive leaves without a declared default get their zero value,
        // but only outside map wrappers where absence means "no entry"
        let default_value = field.default_value.clone().or_else(|| {
            if !outermost {
                return None;
            }
            match shape {
                TypeShape::Class(class) => class.implicit_default().map(str::to_string),
                _ => None,
            }
        });
        if outermost {
            MemberSpec::Item(ItemSpec::new(field.clone(), default_value))
        } else {
            MemberSpec::Item(ItemSpec::with_value_shape(
                field.clone(),
                shape.clone(),
                default_value,
            ))
        }
    }

    /// Build (or fetch) the shared definition for a group class. Groups form
    /// a DAG; a class reachable from its own members is an error.
    fn group_definition(
        &self,
        class: &ClassRef,
        via_field: &FieldMetadata,
        groups: &mut GroupCache,
    ) -> Result<Arc<GroupDefinition>, SchemaError> {
        if let Some(done) = groups.done.get(&class.name) {
            return Ok(Arc::clone(done));
        }
        if !groups.in_progress.insert(class.name.clone()) {
            return Err(SchemaError::GroupCycle {
                class: class.name.clone(),
                field: via_field.name.clone(),
            });
        }
        let metadata = self.registry.require(class)?;
        let mut builder = GroupDefinition::builder().configuration_class(class.clone());
        for field in &metadata.fields {
            builder = builder.add_member(self.member_spec(field, groups)?);
        }
        let group = Arc::new(builder.build()?);
        groups.in_progress.remove(&class.name);
        groups.done.insert(class.name.clone(), Arc::clone(&group));
        Ok(group)
    }
}

fn unsupported(field: &FieldMetadata, shape: &TypeShape) -> SchemaError {
    SchemaError::UnsupportedType {
        type_repr: shape.to_string(),
        field: field.name.clone(),
        class: field.declaring_class.name.clone(),
    }
}

fn join_segment(prefix: &str, segment: &str) -> String {
    match (prefix.is_empty(), segment.is_empty()) {
        (_, true) => prefix.to_string(),
        (true, false) => segment.to_string(),
        (false, false) => format!("{prefix}.{segment}"),
    }
}

/// Register the property patterns reachable through one member. Members
/// nested inside a map wrapper have already had their name segment consumed
/// by the wrapper, hence `name_consumed`.
fn add_member_patterns(
    root: &Arc<RootDefinition>,
    prefix: &str,
    member: &ClassMember,
    name_consumed: bool,
    patterns: &mut PatternMap<PropertyInfo>,
) {
    match member {
        ClassMember::Item(item) => {
            let name = if name_consumed {
                prefix.to_string()
            } else {
                join_segment(prefix, item.property_name())
            };
            patterns.add_pattern(
                &name,
                PropertyInfo {
                    root_class: root.class().clone(),
                    phase: root.phase(),
                    field_name: item.name().to_string(),
                    property_name: name.clone(),
                    converter_type: item.converter_type().clone(),
                    default_value: item.default_value().map(str::to_string),
                },
            );
        }
        ClassMember::Group(group) => {
            let base = if name_consumed {
                prefix.to_string()
            } else {
                join_segment(prefix, group.property_name())
            };
            for nested in group.group().members() {
                add_member_patterns(root, &base, nested, false, patterns);
            }
        }
        ClassMember::Map(map) => {
            let base = if name_consumed {
                prefix.to_string()
            } else {
                join_segment(prefix, map.nested().property_name())
            };
            let with_key = join_segment(&base, WILDCARD_SEGMENT);
            add_member_patterns(root, &with_key, map.nested(), true, patterns);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use confgen_schema::descriptor::{ClassKind, ClassMetadata, NameOverride, RootMetadata};

    fn string_class() -> ClassRef {
        ClassRef::new("java.lang.String", ClassKind::String)
    }

    fn string_shape() -> TypeShape {
        TypeShape::class(string_class())
    }

    fn int_shape() -> TypeShape {
        TypeShape::class(ClassRef::primitive("int", ClassKind::Int))
    }

    fn root_class(name: &str, phase: ConfigPhase, fields: Vec<FieldMetadata>) -> ClassMetadata {
        ClassMetadata {
            class: ClassRef::group(name),
            fields,
            root: Some(RootMetadata {
                phase,
                prefix: None,
                name_override: NameOverride::default(),
            }),
        }
    }

    fn group_class(name: &str, fields: Vec<FieldMetadata>) -> ClassMetadata {
        ClassMetadata {
            class: ClassRef::group(name),
            fields,
            root: None,
        }
    }

    #[test]
    fn test_roots_partition_by_phase() {
        let registry = MetadataRegistry::new(vec![
            root_class(
                "io.example.HttpBuildTimeConfig",
                ConfigPhase::BuildTime,
                vec![FieldMetadata::new(
                    "port",
                    ClassRef::group("io.example.HttpBuildTimeConfig"),
                    int_shape(),
                )],
            ),
            root_class(
                "io.example.LogRuntimeConfig",
                ConfigPhase::RunTime,
                vec![FieldMetadata::new(
                    "level",
                    ClassRef::group("io.example.LogRuntimeConfig"),
                    string_shape(),
                )],
            ),
            root_class("io.example.TlsConfig", ConfigPhase::BuildAndRunTimeFixed, vec![]),
        ]);
        let result = SchemaReader::new(registry).read().unwrap();

        assert_eq!(result.all_roots().len(), 3);
        assert_eq!(result.build_time_roots().len(), 1);
        assert_eq!(result.run_time_roots().len(), 1);
        assert_eq!(result.build_time_run_time_roots().len(), 1);
        assert!(result.bootstrap_roots().is_empty());
        assert_eq!(result.build_time_visible_roots().count(), 2);

        assert_eq!(result.build_time_roots()[0].name(), "quarkus.http");
        assert_eq!(result.run_time_roots()[0].name(), "quarkus.log");
    }

    #[test]
    fn test_leaf_pattern_and_primitive_default() {
        let owner = ClassRef::group("io.example.HttpBuildTimeConfig");
        let registry = MetadataRegistry::new(vec![root_class(
            "io.example.HttpBuildTimeConfig",
            ConfigPhase::BuildTime,
            vec![FieldMetadata::new("maxRetryCount", owner, int_shape())],
        )]);
        let result = SchemaReader::new(registry).read().unwrap();

        let info = result
            .build_time_patterns()
            .find("quarkus.http.max-retry-count")
            .expect("leaf property should be registered");
        assert_eq!(info.field_name, "maxRetryCount");
        assert_eq!(info.default_value.as_deref(), Some("0"));
        assert_eq!(info.phase, ConfigPhase::BuildTime);
    }

    #[test]
    fn test_map_member_registers_wildcard_pattern() {
        let owner = ClassRef::group("io.example.LogRuntimeConfig");
        let mut field = FieldMetadata::new(
            "categories",
            owner,
            TypeShape::map_of(string_shape(), string_shape()),
        );
        field.name_override = NameOverride::Explicit("category".to_string());
        let registry = MetadataRegistry::new(vec![root_class(
            "io.example.LogRuntimeConfig",
            ConfigPhase::RunTime,
            vec![field],
        )]);
        let result = SchemaReader::new(registry).read().unwrap();

        let patterns = result.run_time_patterns();
        assert!(patterns.find("quarkus.log.category.vertx").is_some());
        assert!(patterns.find("quarkus.log.category").is_none());
        assert!(patterns.find("quarkus.log.category.io.vertx").is_none());
        let entries = patterns.entries();
        assert_eq!(entries[0].0, "quarkus.log.category.{*}");
    }

    #[test]
    fn test_nested_map_unwraps_structurally() {
        let owner = ClassRef::group("io.example.DnsConfig");
        let shape = TypeShape::map_of(
            string_shape(),
            TypeShape::map_of(string_shape(), string_shape()),
        );
        let registry = MetadataRegistry::new(vec![root_class(
            "io.example.DnsConfig",
            ConfigPhase::BuildTime,
            vec![FieldMetadata::new("servers", owner, shape)],
        )]);
        let result = SchemaReader::new(registry).read().unwrap();

        assert!(result
            .build_time_patterns()
            .find("quarkus.dns.servers.outer.inner")
            .is_some());
    }

    #[test]
    fn test_group_members_expand_under_group_segment() {
        let root = ClassRef::group("io.example.HttpBuildTimeConfig");
        let group = ClassRef::group("io.example.SslConfig");
        let registry = MetadataRegistry::new(vec![
            root_class(
                "io.example.HttpBuildTimeConfig",
                ConfigPhase::BuildTime,
                vec![FieldMetadata::new("ssl", root, TypeShape::class(group.clone()))],
            ),
            group_class(
                "io.example.SslConfig",
                vec![FieldMetadata::new("keyStorePath", group, string_shape())],
            ),
        ]);
        let result = SchemaReader::new(registry).read().unwrap();

        assert!(result
            .build_time_patterns()
            .find("quarkus.http.ssl.key-store-path")
            .is_some());
    }

    #[test]
    fn test_shared_group_definition_is_reused() {
        let root = ClassRef::group("io.example.HttpBuildTimeConfig");
        let group = ClassRef::group("io.example.SslConfig");
        let registry = MetadataRegistry::new(vec![
            root_class(
                "io.example.HttpBuildTimeConfig",
                ConfigPhase::BuildTime,
                vec![
                    FieldMetadata::new("ssl", root.clone(), TypeShape::class(group.clone())),
                    FieldMetadata::new(
                        "managementSsl",
                        root,
                        TypeShape::class(group.clone()),
                    ),
                ],
            ),
            group_class(
                "io.example.SslConfig",
                vec![FieldMetadata::new("keyStorePath", group, string_shape())],
            ),
        ]);
        let result = SchemaReader::new(registry).read().unwrap();
        let def = &result.build_time_roots()[0];

        let first = match def.get_member("ssl").unwrap() {
            ClassMember::Group(g) => Arc::clone(g.group()),
            other => panic!("expected group, got {other:?}"),
        };
        let second = match def.get_member("managementSsl").unwrap() {
            ClassMember::Group(g) => Arc::clone(g.group()),
            other => panic!("expected group, got {other:?}"),
        };
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_group_cycle_detected() {
        let a = ClassRef::group("io.example.AConfig");
        let b = ClassRef::group("io.example.BConfig");
        let registry = MetadataRegistry::new(vec![
            root_class(
                "io.example.RootConfig",
                ConfigPhase::BuildTime,
                vec![FieldMetadata::new(
                    "a",
                    ClassRef::group("io.example.RootConfig"),
                    TypeShape::class(a.clone()),
                )],
            ),
            group_class(
                "io.example.AConfig",
                vec![FieldMetadata::new("b", a.clone(), TypeShape::class(b.clone()))],
            ),
            group_class(
                "io.example.BConfig",
                vec![FieldMetadata::new("a", b, TypeShape::class(a))],
            ),
        ]);
        let err = SchemaReader::new(registry).read().unwrap_err();
        assert!(matches!(err, SchemaError::GroupCycle { .. }));
    }

    #[test]
    fn test_duplicate_root_name_rejected() {
        let registry = MetadataRegistry::new(vec![
            root_class("io.example.HttpConfig", ConfigPhase::BuildTime, vec![]),
            root_class("acme.HttpBuildTimeConfig", ConfigPhase::BuildTime, vec![]),
        ]);
        let err = SchemaReader::new(registry).read().unwrap_err();
        match err {
            SchemaError::DuplicateRootName { name, first, second } => {
                assert_eq!(name, "quarkus.http");
                assert_eq!(first, "io.example.HttpConfig");
                assert_eq!(second, "acme.HttpBuildTimeConfig");
            }
            other => panic!("expected duplicate root name, got {other:?}"),
        }
    }

    #[test]
    fn test_optional_group_in_map_rejected() {
        let root = ClassRef::group("io.example.RootConfig");
        let group = ClassRef::group("io.example.SslConfig");
        let shape = TypeShape::map_of(
            string_shape(),
            TypeShape::optional_of(TypeShape::class(group.clone())),
        );
        let registry = MetadataRegistry::new(vec![
            root_class(
                "io.example.RootConfig",
                ConfigPhase::BuildTime,
                vec![FieldMetadata::new("named", root, shape)],
            ),
            group_class("io.example.SslConfig", vec![]),
        ]);
        let err = SchemaReader::new(registry).read().unwrap_err();
        assert!(matches!(err, SchemaError::OptionalGroupInMap { .. }));
    }

    #[test]
    fn test_map_key_must_be_string() {
        let root = ClassRef::group("io.example.RootConfig");
        let shape = TypeShape::map_of(int_shape(), string_shape());
        let registry = MetadataRegistry::new(vec![root_class(
            "io.example.RootConfig",
            ConfigPhase::BuildTime,
            vec![FieldMetadata::new("byPort", root, shape)],
        )]);
        let err = SchemaReader::new(registry).read().unwrap_err();
        match err {
            SchemaError::MapKeyNotString { field, key, .. } => {
                assert_eq!(field, "byPort");
                assert_eq!(key, "int");
            }
            other => panic!("expected map key error, got {other:?}"),
        }
    }

    #[test]
    fn test_group_class_missing_from_registry() {
        let root = ClassRef::group("io.example.RootConfig");
        let registry = MetadataRegistry::new(vec![root_class(
            "io.example.RootConfig",
            ConfigPhase::BuildTime,
            vec![FieldMetadata::new(
                "ssl",
                root,
                TypeShape::class(ClassRef::group("io.example.MissingConfig")),
            )],
        )]);
        let err = SchemaReader::new(registry).read().unwrap_err();
        match err {
            SchemaError::UnknownClass { class } => {
                assert_eq!(class, "io.example.MissingConfig");
            }
            other => panic!("expected unknown class, got {other:?}"),
        }
    }

    #[test]
    fn test_optional_group_member_is_optional() {
        let root = ClassRef::group("io.example.RootConfig");
        let group = ClassRef::group("io.example.SslConfig");
        let registry = MetadataRegistry::new(vec![
            root_class(
                "io.example.RootConfig",
                ConfigPhase::BuildTime,
                vec![FieldMetadata::new(
                    "ssl",
                    root,
                    TypeShape::optional_of(TypeShape::class(group.clone())),
                )],
            ),
            group_class(
                "io.example.SslConfig",
                vec![FieldMetadata::new("keyStorePath", group, string_shape())],
            ),
        ]);
        let result = SchemaReader::new(registry).read().unwrap();
        match result.build_time_roots()[0].get_member("ssl").unwrap() {
            ClassMember::Group(g) => assert!(g.is_optional()),
            other => panic!("expected group, got {other:?}"),
        }
    }
}
