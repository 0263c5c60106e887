//! Annotation vocabulary
//!
//! The fixed set of markers the processor recognises on declarations.
//! Markers are pure metadata: they carry no behaviour of their own and this
//! module only answers "is this attribute one of ours, and which one".
//!
//! | Marker | Attribute | Placed on |
//! |--------|-----------|-----------|
//! | `Injectable` | `#[injectable]` | component struct and its inherent impl |
//! | `Scope` | `#[scope(kind)]` | component struct, provides method |
//! | `Singleton` | `#[singleton]` | shorthand for `#[scope(singleton)]` |
//! | `EagerSingleton` | `#[eager_singleton]` | singleton built during startup |
//! | `Inject` | `#[inject]` | the chosen constructor |
//! | `Provides` | `#[provides]`, `#[provides(into_set)]` | public method of a module impl |
//! | `Named` | `#[named("value")]` | struct, provides method, parameter |
//! | `Qualifier` | `#[qualifier(Name)]` | struct, provides method, parameter |
//! | `ImplementedBy` | `#[implemented_by(Type)]` | trait |
//! | `Module` | `#[module(order = N, environments = [..])]` | module impl block |

use serde::{Deserialize, Serialize};
use std::fmt;

/// One marker of the annotation vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Marker {
    /// Type is a component the bridge builds
    Injectable,
    /// Explicit lifecycle of a binding
    Scope,
    /// Singleton lifecycle shorthand
    Singleton,
    /// Singleton instantiated while the bridge starts
    EagerSingleton,
    /// Selects the construction point among several constructors
    Inject,
    /// Module method producing a binding
    Provides,
    /// String qualifier
    Named,
    /// Marker-type qualifier
    Qualifier,
    /// Default implementation of a trait
    ImplementedBy,
    /// Module impl block with provides methods
    Module,
}

impl Marker {
    /// Every marker of the vocabulary
    pub const ALL: [Marker; 10] = [
        Marker::Injectable,
        Marker::Scope,
        Marker::Singleton,
        Marker::EagerSingleton,
        Marker::Inject,
        Marker::Provides,
        Marker::Named,
        Marker::Qualifier,
        Marker::ImplementedBy,
        Marker::Module,
    ];

    /// Markers placed inside impl blocks, on items or parameters
    pub const HELPERS: [Marker; 7] = [
        Marker::Inject,
        Marker::Provides,
        Marker::Named,
        Marker::Qualifier,
        Marker::Scope,
        Marker::Singleton,
        Marker::EagerSingleton,
    ];

    /// Attribute name used in source code
    pub fn attribute_name(self) -> &'static str {
        match self {
            Self::Injectable => "injectable",
            Self::Scope => "scope",
            Self::Singleton => "singleton",
            Self::EagerSingleton => "eager_singleton",
            Self::Inject => "inject",
            Self::Provides => "provides",
            Self::Named => "named",
            Self::Qualifier => "qualifier",
            Self::ImplementedBy => "implemented_by",
            Self::Module => "module",
        }
    }

    /// Look a marker up by attribute name
    pub fn from_attribute_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.attribute_name() == name)
    }

    /// Look a marker up by attribute path (`injectable`, `dib::injectable`)
    ///
    /// Only the last path segment is significant.
    pub fn from_path<'a, I>(segments: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a str>,
    {
        segments
            .into_iter()
            .last()
            .and_then(Self::from_attribute_name)
    }

    /// Existence check for a given attribute name
    pub fn is_marker(name: &str) -> bool {
        Self::from_attribute_name(name).is_some()
    }

    /// True for markers that only appear inside impl blocks
    pub fn is_helper(self) -> bool {
        Self::HELPERS.contains(&self)
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#[{}]", self.attribute_name())
    }
}
