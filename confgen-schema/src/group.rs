//! Reusable nested configuration groups

use crate::definition::{ClassDefinition, ClassDefinitionBuilder, ClassMember, MemberSpec};
use crate::descriptor::ClassRef;
use crate::error::SchemaError;

/// A reusable nested configuration fragment: a [`ClassDefinition`] with no
/// root-level naming of its own. Groups are built once per class and shared
/// by every member that references them.
#[derive(Debug, Clone)]
pub struct GroupDefinition {
    def: ClassDefinition,
}

impl GroupDefinition {
    pub fn builder() -> GroupDefinitionBuilder {
        GroupDefinitionBuilder::default()
    }

    pub fn class(&self) -> &ClassRef {
        self.def.class()
    }

    pub fn class_definition(&self) -> &ClassDefinition {
        &self.def
    }

    pub fn member_names(&self) -> impl Iterator<Item = &str> {
        self.def.member_names()
    }

    pub fn members(&self) -> impl Iterator<Item = &ClassMember> {
        self.def.members()
    }

    pub fn get_member(&self, name: &str) -> Result<&ClassMember, SchemaError> {
        self.def.get_member(name)
    }
}

#[derive(Debug, Default)]
pub struct GroupDefinitionBuilder {
    inner: ClassDefinitionBuilder,
}

impl GroupDefinitionBuilder {
    pub fn configuration_class(mut self, class: ClassRef) -> Self {
        self.inner = self.inner.configuration_class(class);
        self
    }

    pub fn add_member(mut self, spec: MemberSpec) -> Self {
        self.inner = self.inner.add_member(spec);
        self
    }

    pub fn build(self) -> Result<GroupDefinition, SchemaError> {
        Ok(GroupDefinition {
            def: self.inner.build()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::ItemSpec;
    use crate::descriptor::{ClassKind, FieldMetadata, TypeShape};

    #[test]
    fn test_group_is_a_plain_member_container() {
        let class = ClassRef::group("io.example.CorsConfig");
        let shape = TypeShape::class(ClassRef::new("java.lang.String", ClassKind::String));
        let group = GroupDefinition::builder()
            .configuration_class(class.clone())
            .add_member(MemberSpec::Item(ItemSpec::new(
                FieldMetadata::new("allowedOrigins", class.clone(), shape),
                None,
            )))
            .build()
            .unwrap();
        assert_eq!(group.class(), &class);
        assert_eq!(
            group.get_member("allowedOrigins").unwrap().property_name(),
            "allowed-origins"
        );
    }
}
