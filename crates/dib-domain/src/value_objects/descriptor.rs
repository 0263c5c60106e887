//! Binding descriptors
//!
//! A [`BindingDescriptor`] describes one injectable declaration: what it binds,
//! how it is constructed, with which lifecycle, and which other bindings it
//! needs. Descriptors are created by the processor and never mutated after
//! the registration that owns them is emitted.

use super::key::BindingKey;
use super::scope::Scope;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of a descriptor inside its registration arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DescriptorId(pub u32);

impl DescriptorId {
    /// Arena slot
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for DescriptorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What kind of declaration produced a binding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BindingKind {
    /// An `#[injectable]` type built through its construction point
    Component,
    /// A `#[provides]` method of a module
    Provider {
        /// Descriptor of the declaring module
        module: DescriptorId,
        /// Method name
        method: String,
    },
    /// A trait bound to its default implementation
    Linked {
        /// Canonical key of the implementation
        target: BindingKey,
    },
    /// A module instance
    Module,
    /// `Vec` of every `#[provides(into_set)]` contribution to one element type
    Set,
}

/// How an instance is obtained
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConstructionPoint {
    /// Associated constructor function
    Constructor {
        /// Function name
        name: String,
    },
    /// `Default::default()`
    Default,
    /// Unit struct literal
    UnitStruct,
    /// Module method
    ProviderMethod {
        /// Method name
        name: String,
        /// Whether the method takes `&self`
        has_receiver: bool,
    },
    /// Delegates to the linked target
    Link,
    /// Collects the bound contributions of a set
    Collect,
}

impl fmt::Display for ConstructionPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constructor { name } => write!(f, "fn {name}"),
            Self::Default => f.write_str("Default::default"),
            Self::UnitStruct => f.write_str("unit struct"),
            Self::ProviderMethod { name, .. } => write!(f, "provides fn {name}"),
            Self::Link => f.write_str("linked"),
            Self::Collect => f.write_str("collected"),
        }
    }
}

/// Where a dependency is expected to be satisfied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencyOrigin {
    /// Another descriptor of the same registration
    Local(DescriptorId),
    /// Another registration or a binding the host already knows
    External,
}

/// How a factory obtains a dependency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencyMode {
    /// Resolved while the binding is built
    #[default]
    Direct,
    /// Handed over as a `Lazy<T>` handle, resolved on first `get`
    Lazy,
    /// Skipped when unbound (set contributions of inactive environments)
    Optional,
}

impl DependencyMode {
    /// True for the default mode
    pub fn is_direct(&self) -> bool {
        *self == Self::Direct
    }
}

/// A dependency of a descriptor on another binding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyRef {
    /// Key the dependency resolves to
    pub key: BindingKey,
    /// Argument position in the construction point
    pub position: usize,
    /// Resolution found at processing time
    pub origin: DependencyOrigin,
    /// How the factory obtains the value
    #[serde(default, skip_serializing_if = "DependencyMode::is_direct")]
    pub mode: DependencyMode,
}

impl DependencyRef {
    /// Create an external reference
    pub fn external(key: BindingKey, position: usize) -> Self {
        Self {
            key,
            position,
            origin: DependencyOrigin::External,
            mode: DependencyMode::Direct,
        }
    }

    /// Create a reference resolved to a local descriptor
    pub fn local(key: BindingKey, position: usize, target: DescriptorId) -> Self {
        Self {
            key,
            position,
            origin: DependencyOrigin::Local(target),
            mode: DependencyMode::Direct,
        }
    }

    /// Set the mode
    pub fn with_mode(mut self, mode: DependencyMode) -> Self {
        self.mode = mode;
        self
    }

    /// True when the binding cannot be built without this dependency bound
    pub fn is_required(&self) -> bool {
        self.mode != DependencyMode::Optional
    }

    /// Local target, if resolved inside the registration
    pub fn local_target(&self) -> Option<DescriptorId> {
        match self.origin {
            DependencyOrigin::Local(id) => Some(id),
            DependencyOrigin::External => None,
        }
    }
}

/// Source position of a declaration
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SourceLocation {
    /// File path relative to the source root
    pub file: String,
    /// 1-based line, 0 when unknown
    pub line: usize,
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.line > 0 {
            write!(f, "{}:{}", self.file, self.line)
        } else {
            f.write_str(&self.file)
        }
    }
}

/// Metadata record for one injectable declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingDescriptor {
    /// Arena index
    pub id: DescriptorId,
    /// Bound key
    pub key: BindingKey,
    /// Declaration kind
    pub kind: BindingKind,
    /// Lifecycle
    pub scope: Scope,
    /// Build during startup (singletons only)
    #[serde(default)]
    pub eager: bool,
    /// Construction point
    pub construction: ConstructionPoint,
    /// Dependencies in argument order
    pub dependencies: Vec<DependencyRef>,
    /// Environments in which the binding is active, empty for all
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub environments: Vec<String>,
    /// Load order inherited from the declaring module
    #[serde(default)]
    pub order: u32,
    /// Declaration site
    pub source: SourceLocation,
}

impl BindingDescriptor {
    /// True if the binding is active for the given environment set
    pub fn is_active_in(&self, active: &[String]) -> bool {
        self.environments.is_empty() || self.environments.iter().any(|e| active.contains(e))
    }

    /// Ids of local dependency targets
    pub fn local_dependencies(&self) -> impl Iterator<Item = DescriptorId> + '_ {
        self.dependencies.iter().filter_map(DependencyRef::local_target)
    }

    /// Ids of local targets resolved while this binding is built
    ///
    /// Lazy handles are resolved later and do not count.
    pub fn construction_dependencies(&self) -> impl Iterator<Item = DescriptorId> + '_ {
        self.dependencies
            .iter()
            .filter(|d| d.mode != DependencyMode::Lazy)
            .filter_map(DependencyRef::local_target)
    }

    /// Same binding, ignoring arena position and source location
    ///
    /// Used to tell a repeated registration from a conflicting one.
    pub fn same_binding(&self, other: &BindingDescriptor) -> bool {
        self.key == other.key
            && self.scope == other.scope
            && self.construction == other.construction
            && self.environments == other.environments
            && self
                .dependencies
                .iter()
                .map(|d| (&d.key, d.mode))
                .eq(other.dependencies.iter().map(|d| (&d.key, d.mode)))
    }
}

impl fmt::Display for BindingDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}, {})", self.key, self.scope, self.construction)
    }
}
