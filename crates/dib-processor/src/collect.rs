//! Declaration collection
//!
//! Walks a parsed file (including inline `mod` blocks) and records every
//! declaration the builder needs: structs with their shape, inherent impls
//! with their methods, and traits. Marker problems are reported here, with the
//! declaration they belong to.

use crate::diagnostics::ProcessorDiagnostic;
use crate::markers::{self, MarkerError, MarkerSet};
use crate::scan::SourceFile;
use crate::types::{self, WrittenType};
use dib_domain::SourceLocation;
use proc_macro2::Span;
use syn::{Attribute, Fields, FnArg, ImplItem, Item, Pat, Visibility};

/// A struct declaration
#[derive(Debug, Clone)]
pub struct StructDecl {
    pub ident: String,
    pub module_path: Vec<String>,
    pub markers: MarkerSet,
    pub derives_default: bool,
    pub is_unit: bool,
    pub is_generic: bool,
    pub location: SourceLocation,
}

/// How a method takes `self`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiverKind {
    None,
    Ref,
    RefMut,
    Value,
}

/// A parameter of a constructor or provides method
#[derive(Debug, Clone)]
pub struct ParamDecl {
    /// Pattern text, for diagnostics
    pub name: String,
    /// Key type as written, `None` for unsupported shapes
    pub binding_type: Option<WrittenType>,
    /// Written as `Lazy<..>`
    pub lazy: bool,
    pub qualifier: Option<String>,
}

/// A method of an inherent impl
#[derive(Debug, Clone)]
pub struct MethodDecl {
    pub name: String,
    /// `pub` or `pub(crate)`, reachable from glue at the crate root
    pub is_pub: bool,
    pub receiver: ReceiverKind,
    pub returns_self: bool,
    pub returns_unit: bool,
    /// Key type of the return value (`Arc` unwrapped)
    pub return_type: Option<WrittenType>,
    /// Return type exactly as written
    pub returned: Option<WrittenType>,
    /// No trait object in the return type misses `Send + Sync`
    pub returns_thread_safe: bool,
    pub markers: MarkerSet,
    pub params: Vec<ParamDecl>,
    pub location: SourceLocation,
}

/// An inherent impl block
#[derive(Debug, Clone)]
pub struct ImplDecl {
    /// Last segment of the self type
    pub self_ident: String,
    /// Normalised written self type path
    pub self_path: String,
    pub module_path: Vec<String>,
    pub markers: MarkerSet,
    pub methods: Vec<MethodDecl>,
    pub location: SourceLocation,
}

/// A trait declaration
#[derive(Debug, Clone)]
pub struct TraitDecl {
    pub ident: String,
    pub module_path: Vec<String>,
    pub markers: MarkerSet,
    pub location: SourceLocation,
}

/// Everything collected from one compilation unit
#[derive(Debug, Clone, Default)]
pub struct Declarations {
    pub structs: Vec<StructDecl>,
    pub impls: Vec<ImplDecl>,
    pub traits: Vec<TraitDecl>,
    /// Crate-relative paths of every declared type (structs, enums, traits, aliases)
    pub type_index: Vec<String>,
}

impl Declarations {
    /// Inherent impls of a struct: same module and ident, or a written path
    /// naming the struct from elsewhere
    pub fn impls_of<'a>(&'a self, decl: &'a StructDecl) -> impl Iterator<Item = &'a ImplDecl> {
        let full = join_path(&decl.module_path, &decl.ident);
        self.impls.iter().filter(move |imp| {
            imp.self_ident == decl.ident
                && (imp.module_path == decl.module_path || imp.self_path == full)
        })
    }

    /// Struct declared under a crate-relative path
    pub fn struct_at(&self, module_path: &[String], ident: &str) -> Option<&StructDecl> {
        self.structs
            .iter()
            .find(|s| s.ident == ident && s.module_path == module_path)
    }
}

/// Join a module path and an ident with `::`
pub fn join_path(module_path: &[String], ident: &str) -> String {
    module_path
        .iter()
        .map(String::as_str)
        .chain(std::iter::once(ident))
        .collect::<Vec<_>>()
        .join("::")
}

/// Collect the declarations of one parsed file
pub fn collect_file(
    file: &syn::File,
    source: &SourceFile,
    decls: &mut Declarations,
    diagnostics: &mut Vec<ProcessorDiagnostic>,
) {
    let mut collector = Collector {
        file: &source.relative_path,
        decls,
        diagnostics,
    };
    collector.items(&file.items, &source.module_path);
}

struct Collector<'a> {
    file: &'a str,
    decls: &'a mut Declarations,
    diagnostics: &'a mut Vec<ProcessorDiagnostic>,
}

impl Collector<'_> {
    fn location(&self, span: Span) -> SourceLocation {
        SourceLocation {
            file: self.file.to_string(),
            line: span.start().line,
        }
    }

    fn items(&mut self, items: &[Item], module_path: &[String]) {
        for item in items {
            match item {
                Item::Struct(s) => self.item_struct(s, module_path),
                Item::Impl(imp) => self.item_impl(imp, module_path),
                Item::Trait(t) => self.item_trait(t, module_path),
                Item::Enum(e) => self.index(module_path, &e.ident),
                Item::Type(t) => self.index(module_path, &t.ident),
                Item::Mod(m) => {
                    if let Some((_, inner)) = &m.content {
                        let mut nested = module_path.to_vec();
                        nested.push(m.ident.to_string());
                        self.items(inner, &nested);
                    }
                }
                _ => {}
            }
        }
    }

    fn index(&mut self, module_path: &[String], ident: &syn::Ident) {
        self.decls
            .type_index
            .push(join_path(module_path, &ident.to_string()));
    }

    fn markers(&mut self, attrs: &[Attribute], type_name: &str, span: Span) -> MarkerSet {
        match markers::read_markers(attrs) {
            Ok(set) => set,
            Err(err) => {
                let location = self.location(span);
                self.diagnostics
                    .push(marker_diagnostic(err, type_name, location));
                MarkerSet::default()
            }
        }
    }

    fn item_struct(&mut self, s: &syn::ItemStruct, module_path: &[String]) {
        self.index(module_path, &s.ident);
        let ident = s.ident.to_string();
        let markers = self.markers(&s.attrs, &join_path(module_path, &ident), s.ident.span());

        self.decls.structs.push(StructDecl {
            derives_default: derives_default(&s.attrs),
            is_unit: matches!(s.fields, Fields::Unit),
            is_generic: !s.generics.params.is_empty(),
            location: self.location(s.ident.span()),
            ident,
            module_path: module_path.to_vec(),
            markers,
        });
    }

    fn item_trait(&mut self, t: &syn::ItemTrait, module_path: &[String]) {
        self.index(module_path, &t.ident);
        let ident = t.ident.to_string();
        let markers = self.markers(&t.attrs, &join_path(module_path, &ident), t.ident.span());
        if !markers.any() {
            return;
        }
        self.decls.traits.push(TraitDecl {
            location: self.location(t.ident.span()),
            ident,
            module_path: module_path.to_vec(),
            markers,
        });
    }

    fn item_impl(&mut self, imp: &syn::ItemImpl, module_path: &[String]) {
        // Only inherent impls carry construction points and provides methods
        if imp.trait_.is_some() {
            return;
        }
        let syn::Type::Path(self_ty) = imp.self_ty.as_ref() else {
            return;
        };
        let Some(last) = self_ty.path.segments.last() else {
            return;
        };
        let self_ident = last.ident.to_string();
        let self_path = types::path_name(&self_ty.path);
        let owner = join_path(module_path, &self_ident);
        let markers = self.markers(&imp.attrs, &owner, last.ident.span());

        let methods = imp
            .items
            .iter()
            .filter_map(|item| match item {
                ImplItem::Fn(f) => Some(f),
                _ => None,
            })
            .map(|f| self.method(f, &self_ident, &owner))
            .collect();

        self.decls.impls.push(ImplDecl {
            location: self.location(last.ident.span()),
            self_ident,
            self_path,
            module_path: module_path.to_vec(),
            markers,
            methods,
        });
    }

    fn method(&mut self, f: &syn::ImplItemFn, self_ident: &str, owner: &str) -> MethodDecl {
        let name = f.sig.ident.to_string();
        let method_owner = format!("{owner}::{name}");
        let markers = self.markers(&f.attrs, &method_owner, f.sig.ident.span());

        let mut receiver = ReceiverKind::None;
        let mut params = Vec::new();
        for input in &f.sig.inputs {
            match input {
                FnArg::Receiver(r) => {
                    receiver = match (&r.reference, r.mutability.is_some()) {
                        (Some(_), false) => ReceiverKind::Ref,
                        (Some(_), true) => ReceiverKind::RefMut,
                        (None, _) => ReceiverKind::Value,
                    };
                }
                FnArg::Typed(pt) => {
                    let param_markers = self.markers(&pt.attrs, &method_owner, f.sig.ident.span());
                    let (ty, lazy) = match types::lazy_inner(&pt.ty) {
                        Some(inner) => (inner, true),
                        None => (pt.ty.as_ref(), false),
                    };
                    params.push(ParamDecl {
                        name: pattern_name(&pt.pat),
                        binding_type: types::binding_type(ty),
                        lazy,
                        qualifier: param_markers.qualifier,
                    });
                }
            }
        }

        let (return_type, returned, returns_thread_safe) = match &f.sig.output {
            syn::ReturnType::Type(_, ty) => (
                types::binding_type(ty),
                types::written_type(ty),
                types::dyn_is_thread_safe(ty),
            ),
            syn::ReturnType::Default => (None, None, true),
        };

        MethodDecl {
            is_pub: visible_to_crate(&f.vis),
            returns_self: types::returns_self(&f.sig.output, self_ident),
            returns_unit: types::returns_unit(&f.sig.output),
            return_type,
            returned,
            returns_thread_safe,
            location: self.location(f.sig.ident.span()),
            name,
            receiver,
            markers,
            params,
        }
    }
}

fn visible_to_crate(vis: &Visibility) -> bool {
    match vis {
        Visibility::Public(_) => true,
        Visibility::Restricted(r) => r.in_token.is_none() && r.path.is_ident("crate"),
        Visibility::Inherited => false,
    }
}

fn marker_diagnostic(
    err: MarkerError,
    type_name: &str,
    location: SourceLocation,
) -> ProcessorDiagnostic {
    match err {
        MarkerError::UnsupportedScope(scope) => ProcessorDiagnostic::UnsupportedScope {
            type_name: type_name.to_string(),
            scope,
            location,
        },
        MarkerError::Invalid { marker, message } => ProcessorDiagnostic::InvalidMarker {
            type_name: type_name.to_string(),
            marker: marker.to_string(),
            message,
            location,
        },
    }
}

fn derives_default(attrs: &[Attribute]) -> bool {
    let mut found = false;
    for attr in attrs.iter().filter(|a| a.path().is_ident("derive")) {
        // Unparseable derive lists are left for rustc to report
        let _ = attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("Default") {
                found = true;
            }
            Ok(())
        });
    }
    found
}

fn pattern_name(pat: &Pat) -> String {
    match pat {
        Pat::Ident(p) => p.ident.to_string(),
        Pat::Wild(_) => "_".to_string(),
        _ => "<pattern>".to_string(),
    }
}
