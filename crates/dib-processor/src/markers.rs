//! Marker extraction from `syn` attributes

use crate::types;
use dib_domain::constants::PROVIDES_INTO_SET;
use dib_domain::{Marker, Scope};
use syn::{Attribute, Expr, ExprArray, Lit, LitInt, LitStr};

/// `#[module(..)]` arguments
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleArgs {
    /// Load order among modules
    pub order: u32,
    /// Environments in which the module is active
    pub environments: Vec<String>,
}

/// Markers found on one declaration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkerSet {
    pub injectable: bool,
    pub inject: bool,
    pub provides: bool,
    /// `#[provides(into_set)]`
    pub into_set: bool,
    pub eager: bool,
    /// Scopes declared through `scope`, `singleton` or `eager_singleton`
    pub scopes: Vec<Scope>,
    /// Qualifier from `named` or `qualifier`
    pub qualifier: Option<String>,
    /// Normalised path from `implemented_by`
    pub implemented_by: Option<String>,
    pub module: Option<ModuleArgs>,
}

/// Why a marker could not be read
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkerError {
    /// `#[scope(x)]` with an unknown kind
    UnsupportedScope(String),
    /// Malformed or contradictory markers
    Invalid { marker: Marker, message: String },
}

impl MarkerError {
    fn invalid(marker: Marker, message: impl Into<String>) -> Self {
        Self::Invalid {
            marker,
            message: message.into(),
        }
    }
}

impl MarkerSet {
    /// True when any marker is present
    pub fn any(&self) -> bool {
        *self != Self::default()
    }

    /// Effective scope: the declared one, or prototype when none is declared
    pub fn scope(&self) -> Result<Scope, MarkerError> {
        match self.scopes.split_first() {
            None => Ok(Scope::Prototype),
            Some((first, rest)) if rest.iter().all(|s| s == first) => Ok(*first),
            Some(_) => Err(MarkerError::invalid(
                Marker::Scope,
                "conflicting scope markers",
            )),
        }
    }
}

/// Marker named by an attribute, if it is one of ours
pub fn marker_of(attr: &Attribute) -> Option<Marker> {
    let segments: Vec<String> = attr
        .path()
        .segments
        .iter()
        .map(|s| s.ident.to_string())
        .collect();
    Marker::from_path(segments.iter().map(String::as_str))
}

/// True when some attribute's last path segment is a marker name
pub fn has_markers(attrs: &[Attribute]) -> bool {
    attrs.iter().any(|attr| {
        attr.path()
            .segments
            .last()
            .is_some_and(|s| Marker::is_marker(&s.ident.to_string()))
    })
}

/// Read every marker in an attribute list
pub fn read_markers(attrs: &[Attribute]) -> Result<MarkerSet, MarkerError> {
    let mut set = MarkerSet::default();
    if !has_markers(attrs) {
        return Ok(set);
    }

    for attr in attrs {
        let Some(marker) = marker_of(attr) else {
            continue;
        };
        match marker {
            Marker::Injectable => set.injectable = true,
            Marker::Inject => set.inject = true,
            Marker::Provides => {
                set.provides = true;
                set.into_set = read_provides_args(attr)?;
            }
            Marker::Singleton => set.scopes.push(Scope::Singleton),
            Marker::EagerSingleton => {
                set.eager = true;
                set.scopes.push(Scope::Singleton);
            }
            Marker::Scope => {
                let ident: syn::Ident = attr
                    .parse_args()
                    .map_err(|e| MarkerError::invalid(marker, e.to_string()))?;
                let kind = ident.to_string();
                let scope = kind
                    .parse::<Scope>()
                    .map_err(|_| MarkerError::UnsupportedScope(kind))?;
                set.scopes.push(scope);
            }
            Marker::Named => {
                let value: LitStr = attr
                    .parse_args()
                    .map_err(|e| MarkerError::invalid(marker, e.to_string()))?;
                if value.value().is_empty() {
                    return Err(MarkerError::invalid(marker, "value cannot be empty"));
                }
                set_qualifier(&mut set, value.value())?;
            }
            Marker::Qualifier => {
                let path: syn::Path = attr
                    .parse_args()
                    .map_err(|e| MarkerError::invalid(marker, e.to_string()))?;
                set_qualifier(&mut set, types::path_name(&path))?;
            }
            Marker::ImplementedBy => {
                let ty: syn::Type = attr
                    .parse_args()
                    .map_err(|e| MarkerError::invalid(marker, e.to_string()))?;
                let target = types::type_path_name(&ty)
                    .ok_or_else(|| MarkerError::invalid(marker, "expected a type path"))?;
                set.implemented_by = Some(target);
            }
            Marker::Module => set.module = Some(read_module_args(attr)?),
        }
    }

    Ok(set)
}

fn set_qualifier(set: &mut MarkerSet, value: String) -> Result<(), MarkerError> {
    if set.qualifier.is_some() {
        return Err(MarkerError::invalid(
            Marker::Qualifier,
            "a declaration takes at most one qualifier",
        ));
    }
    set.qualifier = Some(value);
    Ok(())
}

fn read_provides_args(attr: &Attribute) -> Result<bool, MarkerError> {
    if matches!(attr.meta, syn::Meta::Path(_)) {
        return Ok(false);
    }
    let mut into_set = false;
    attr.parse_nested_meta(|meta| {
        if meta.path.is_ident(PROVIDES_INTO_SET) {
            into_set = true;
            Ok(())
        } else {
            Err(meta.error(format!("expected `{PROVIDES_INTO_SET}`")))
        }
    })
    .map_err(|e| MarkerError::invalid(Marker::Provides, e.to_string()))?;
    Ok(into_set)
}

fn read_module_args(attr: &Attribute) -> Result<ModuleArgs, MarkerError> {
    let mut args = ModuleArgs::default();
    // Bare `#[module]` has no argument list to parse
    if matches!(attr.meta, syn::Meta::Path(_)) {
        return Ok(args);
    }

    attr.parse_nested_meta(|meta| {
        if meta.path.is_ident("order") {
            let order: LitInt = meta.value()?.parse()?;
            args.order = order.base10_parse()?;
            Ok(())
        } else if meta.path.is_ident("environments") {
            let list: ExprArray = meta.value()?.parse()?;
            for elem in &list.elems {
                match elem {
                    Expr::Lit(lit) => match &lit.lit {
                        Lit::Str(s) => args.environments.push(s.value()),
                        _ => return Err(meta.error("environments must be string literals")),
                    },
                    _ => return Err(meta.error("environments must be string literals")),
                }
            }
            Ok(())
        } else {
            Err(meta.error("expected `order` or `environments`"))
        }
    })
    .map_err(|e| MarkerError::invalid(Marker::Module, e.to_string()))?;

    Ok(args)
}
