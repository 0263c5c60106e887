//! Binding keys

use crate::constants::{QUALIFIER_SEPARATOR, RELATIVE_PATH_PREFIXES};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a binding in the host injector
///
/// `type_name` is the canonical `::`-separated path of the bound type,
/// prefixed with its crate (`app::billing::PayPalProcessor`), or a plain name
/// for builtin value types (`String`). Generic arguments are part of the name
/// (`Vec<u16>`, `app::Engine<app::V8>`), so two instantiations of one generic
/// type are two keys. The qualifier distinguishes several bindings of the
/// same type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BindingKey {
    /// Canonical path of the bound type
    pub type_name: String,
    /// Optional `named`/`qualifier` value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qualifier: Option<String>,
}

impl BindingKey {
    /// Create an unqualified key
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            qualifier: None,
        }
    }

    /// Create a qualified key
    pub fn named(type_name: impl Into<String>, qualifier: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            qualifier: Some(qualifier.into()),
        }
    }

    /// Set the qualifier
    pub fn with_qualifier(mut self, qualifier: Option<String>) -> Self {
        self.qualifier = qualifier;
        self
    }

    /// Base path and generic argument list (`"<..>"`, empty when not generic)
    pub fn split_generics(&self) -> (&str, &str) {
        match self.type_name.find('<') {
            Some(at) => self.type_name.split_at(at),
            None => (self.type_name.as_str(), ""),
        }
    }

    /// Segments of the base path
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.split_generics().0.split("::")
    }

    /// True when `written` (already normalised) names this key's type
    ///
    /// Matching is by base path suffix: `Foo` and `services::Foo` both match
    /// `services::Foo`, `other::Foo` does not. Generic arguments and
    /// qualifiers must be equal.
    pub fn matches_written(&self, written: &BindingKey) -> bool {
        if self.qualifier != written.qualifier
            || self.split_generics().1 != written.split_generics().1
        {
            return false;
        }
        let ours: Vec<&str> = self.segments().collect();
        let theirs: Vec<&str> = written.segments().collect();
        theirs.len() <= ours.len() && ours.ends_with(&theirs)
    }

    /// Normalise a written path: drop `crate::`, `self::`, `super::` and
    /// leading `::`, and join the remaining segments with `::`
    pub fn normalize_path<'a, I>(segments: I) -> String
    where
        I: IntoIterator<Item = &'a str>,
    {
        segments
            .into_iter()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .skip_while(|s| RELATIVE_PATH_PREFIXES.contains(s))
            .collect::<Vec<_>>()
            .join("::")
    }
}

impl fmt::Display for BindingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.qualifier {
            Some(q) => write!(f, "{}{}{}", self.type_name, QUALIFIER_SEPARATOR, q),
            None => write!(f, "{}", self.type_name),
        }
    }
}
