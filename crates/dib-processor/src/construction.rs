//! Construction point selection

use crate::collect::{ImplDecl, MethodDecl, ReceiverKind, StructDecl};
use crate::diagnostics::ProcessorDiagnostic;
use dib_domain::ConstructionPoint;

/// Chosen way to build a type
#[derive(Debug, Clone, Copy)]
pub enum Selected<'a> {
    /// Associated constructor; its parameters are the dependencies
    Constructor(&'a MethodDecl),
    /// `Default::default()`
    Default,
    /// Unit struct literal
    UnitStruct,
}

impl Selected<'_> {
    /// Construction point recorded in the descriptor
    pub fn construction_point(&self) -> ConstructionPoint {
        match self {
            Self::Constructor(m) => ConstructionPoint::Constructor {
                name: m.name.clone(),
            },
            Self::Default => ConstructionPoint::Default,
            Self::UnitStruct => ConstructionPoint::UnitStruct,
        }
    }

    /// Constructor method, if one was chosen
    pub fn method(&self) -> Option<&MethodDecl> {
        match self {
            Self::Constructor(m) => Some(m),
            _ => None,
        }
    }
}

/// Pick the construction point of a struct from its inherent impls
///
/// Candidates are receiver-less associated fns returning `Self`. `#[inject]`
/// candidates win over unmarked ones; unmarked candidates count only when
/// `pub`. A single counted candidate is chosen, several are an error. With
/// none, a `Default` derive or a unit struct is used. The glue calls the
/// chosen constructor from the crate root, so a marked one must be `pub` or
/// `pub(crate)`.
pub fn select<'a>(
    decl: &StructDecl,
    type_name: &str,
    impls: impl IntoIterator<Item = &'a ImplDecl>,
) -> Result<Selected<'a>, ProcessorDiagnostic> {
    let candidates: Vec<&MethodDecl> = impls
        .into_iter()
        .flat_map(|imp| imp.methods.iter())
        .filter(|m| m.receiver == ReceiverKind::None && m.returns_self && !m.markers.provides)
        .collect();

    let marked: Vec<&MethodDecl> = candidates
        .iter()
        .copied()
        .filter(|m| m.markers.inject)
        .collect();
    let counted = if marked.is_empty() {
        candidates.into_iter().filter(|m| m.is_pub).collect()
    } else {
        marked
    };

    match counted.as_slice() {
        [only] if !only.is_pub => Err(ProcessorDiagnostic::ConstructorNotPublic {
            type_name: type_name.to_string(),
            method: only.name.clone(),
            location: only.location.clone(),
        }),
        [only] => Ok(Selected::Constructor(*only)),
        [] if decl.derives_default => Ok(Selected::Default),
        [] if decl.is_unit => Ok(Selected::UnitStruct),
        [] => Err(ProcessorDiagnostic::NoConstructionPoint {
            type_name: type_name.to_string(),
            location: decl.location.clone(),
        }),
        many => Err(ProcessorDiagnostic::MultipleConstructionPoints {
            type_name: type_name.to_string(),
            candidates: many.iter().map(|m| m.name.clone()).collect(),
            location: decl.location.clone(),
        }),
    }
}
