//! Root configuration definitions and phase-aware naming
//!
//! A root definition is a [`ClassDefinition`] that additionally owns the
//! externally visible dotted property prefix: a namespace prefix combined
//! with a root segment derived from the class's simple name, with a
//! phase-specific suffix stripped off.

use crate::definition::{ClassDefinition, ClassDefinitionBuilder, ClassMember, MemberSpec};
use crate::descriptor::{ClassRef, NameOverride};
use crate::error::SchemaError;
use crate::utils::{camel_humps, hyphen_join, lower_camel_join, without_suffix};
use serde::{Deserialize, Serialize};

/// The default namespace prefix for root configuration names. Downstream
/// tooling depends on this literal bit-exactly.
pub const DEFAULT_NAMESPACE: &str = "quarkus";

/// When a configuration root's values become available.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConfigPhase {
    #[default]
    BuildTime,
    BuildAndRunTimeFixed,
    Bootstrap,
    RunTime,
}

impl ConfigPhase {
    pub fn is_available_at_build(self) -> bool {
        matches!(self, ConfigPhase::BuildTime | ConfigPhase::BuildAndRunTimeFixed)
    }

    pub fn is_available_at_run(self) -> bool {
        !matches!(self, ConfigPhase::BuildTime)
    }

    /// Candidate suffixes stripped from a root class's simple name, ordered
    /// longest-first; only the first match is removed.
    fn name_suffixes(self) -> &'static [&'static [&'static str]] {
        match self {
            ConfigPhase::RunTime => &[
                &["Runtime", "Configuration"],
                &["Runtime", "Config"],
                &["Run", "Time", "Configuration"],
                &["Run", "Time", "Config"],
                &["Configuration"],
                &["Config"],
            ],
            ConfigPhase::Bootstrap => &[
                &["Bootstrap", "Configuration"],
                &["Bootstrap", "Config"],
                &["Configuration"],
                &["Config"],
            ],
            ConfigPhase::BuildTime | ConfigPhase::BuildAndRunTimeFixed => &[
                &["Build", "Time", "Configuration"],
                &["Build", "Time", "Config"],
                &["Configuration"],
                &["Config"],
            ],
        }
    }
}

/// Compute the root segment for a configuration class.
pub(crate) fn derive_root_name(
    class: &ClassRef,
    phase: ConfigPhase,
    name_override: &NameOverride,
) -> String {
    let segments = camel_humps(class.simple_name());
    let trimmed = without_suffix(&segments, phase.name_suffixes());
    match name_override {
        NameOverride::Parent => String::new(),
        NameOverride::ElementName => lower_camel_join(trimmed),
        NameOverride::Hyphenated => hyphen_join(trimmed),
        NameOverride::Explicit(name) => name.clone(),
    }
}

fn join_name(prefix: &str, root_name: &str) -> String {
    match (prefix.is_empty(), root_name.is_empty()) {
        (false, false) => format!("{prefix}.{root_name}"),
        (false, true) => prefix.to_string(),
        (true, false) => root_name.to_string(),
        (true, true) => String::new(),
    }
}

/// A top-level configuration root.
#[derive(Debug, Clone)]
pub struct RootDefinition {
    def: ClassDefinition,
    phase: ConfigPhase,
    prefix: String,
    root_name: String,
    name: String,
}

impl RootDefinition {
    pub fn builder() -> RootDefinitionBuilder {
        RootDefinitionBuilder::default()
    }

    pub fn class(&self) -> &ClassRef {
        self.def.class()
    }

    pub fn class_definition(&self) -> &ClassDefinition {
        &self.def
    }

    pub fn phase(&self) -> ConfigPhase {
        self.phase
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// The computed (or overridden) root segment, without the prefix.
    pub fn root_name(&self) -> &str {
        &self.root_name
    }

    /// The full externally visible dotted name; empty for a degenerate root
    /// that inlines into its parent namespace.
    pub fn name(&self) -> &str {
        &self.name
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

#[derive(Debug)]
pub struct RootDefinitionBuilder {
    inner: ClassDefinitionBuilder,
    phase: ConfigPhase,
    prefix: String,
    name_override: NameOverride,
}

impl Default for RootDefinitionBuilder {
    fn default() -> Self {
        RootDefinitionBuilder {
            inner: ClassDefinitionBuilder::new(),
            phase: ConfigPhase::default(),
            prefix: DEFAULT_NAMESPACE.to_string(),
            name_override: NameOverride::default(),
        }
    }
}

impl RootDefinitionBuilder {
    pub fn configuration_class(mut self, class: ClassRef) -> Self {
        self.inner = self.inner.configuration_class(class);
        self
    }

    pub fn config_phase(mut self, phase: ConfigPhase) -> Self {
        self.phase = phase;
        self
    }

    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn name_override(mut self, name_override: NameOverride) -> Self {
        self.name_override = name_override;
        self
    }

    pub fn add_member(mut self, spec: MemberSpec) -> Self {
        self.inner = self.inner.add_member(spec);
        self
    }

    pub fn build(self) -> Result<RootDefinition, SchemaError> {
        let def = self.inner.build()?;
        let root_name = derive_root_name(def.class(), self.phase, &self.name_override);
        let name = join_name(&self.prefix, &root_name);
        Ok(RootDefinition {
            def,
            phase: self.phase,
            prefix: self.prefix,
            root_name,
            name,
        })
    }
}
