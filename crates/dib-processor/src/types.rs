//! Type shapes accepted at injection points
//!
//! Dependencies are written as `Arc<T>`, `Arc<dyn Trait>`, an owned value
//! type, or `Lazy<..>` around one of those. The bound key is the type inside
//! the `Arc`, or the value type itself. Generic arguments are part of the
//! key, so `Vec<String>` and `Vec<u16>` bind separately.

use dib_domain::BindingKey;
use std::fmt;
use syn::{GenericArgument, Path, PathArguments, ReturnType, Type, TypeParamBound, TypeTraitObject};

const AUTO_TRAITS: [&str; 3] = ["Send", "Sync", "Unpin"];

/// A type as written: normalised path plus generic type arguments
///
/// Lifetimes and auto-trait bounds are dropped. `Arc` is kept as a bare
/// `Arc` whatever path it was written with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenType {
    /// Normalised `::`-joined path
    pub path: String,
    /// Generic type arguments of the last segment
    pub args: Vec<WrittenType>,
    /// `dyn Trait` rather than a type
    pub is_dyn: bool,
}

impl WrittenType {
    /// Plain path without generic arguments
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            args: Vec::new(),
            is_dyn: false,
        }
    }

    /// Set the generic arguments
    pub fn with_args(mut self, args: Vec<WrittenType>) -> Self {
        self.args = args;
        self
    }

    /// Render as a key type name
    ///
    /// `name` maps the outer path, `arg` renders each generic argument.
    pub fn render<N, A>(&self, name: N, arg: A) -> String
    where
        N: FnOnce(&str) -> String,
        A: FnMut(&WrittenType) -> String,
    {
        let mut out = String::new();
        if self.is_dyn {
            out.push_str("dyn ");
        }
        out.push_str(&name(&self.path));
        if !self.args.is_empty() {
            let args: Vec<String> = self.args.iter().map(arg).collect();
            out.push('<');
            out.push_str(&args.join(", "));
            out.push('>');
        }
        out
    }
}

impl fmt::Display for WrittenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(str::to_string, ToString::to_string))
    }
}

/// Normalised `::`-joined idents of a path, generics dropped
pub fn path_name(path: &Path) -> String {
    let idents: Vec<String> = path.segments.iter().map(|s| s.ident.to_string()).collect();
    BindingKey::normalize_path(idents.iter().map(String::as_str))
}

/// Name of a plain path type, `None` for any other shape
pub fn type_path_name(ty: &Type) -> Option<String> {
    match ty {
        Type::Path(tp) if tp.qself.is_none() => Some(path_name(&tp.path)),
        Type::Paren(p) => type_path_name(&p.elem),
        Type::Group(g) => type_path_name(&g.elem),
        _ => None,
    }
}

/// Structured form of a path or trait-object type
///
/// References, tuples, `impl Trait`, fn-like generics and const generic
/// arguments give `None`.
pub fn written_type(ty: &Type) -> Option<WrittenType> {
    match ty {
        Type::Paren(p) => written_type(&p.elem),
        Type::Group(g) => written_type(&g.elem),
        Type::Path(tp) if tp.qself.is_none() => path_type(&tp.path),
        Type::TraitObject(obj) => {
            let mut written = path_type(&principal_trait(obj)?.path)?;
            written.is_dyn = true;
            Some(written)
        }
        _ => None,
    }
}

fn path_type(path: &Path) -> Option<WrittenType> {
    let last = path.segments.last()?;
    let name = if last.ident == "Arc" {
        "Arc".to_string()
    } else {
        path_name(path)
    };
    let args = match &last.arguments {
        PathArguments::None => Vec::new(),
        PathArguments::AngleBracketed(list) => list
            .args
            .iter()
            .filter_map(|arg| match arg {
                GenericArgument::Lifetime(_) => None,
                GenericArgument::Type(t) => Some(written_type(t)),
                _ => Some(None),
            })
            .collect::<Option<Vec<_>>>()?,
        PathArguments::Parenthesized(_) => return None,
    };
    Some(WrittenType::new(name).with_args(args))
}

fn principal_trait(obj: &TypeTraitObject) -> Option<&syn::TraitBound> {
    obj.bounds.iter().find_map(|bound| match bound {
        TypeParamBound::Trait(t)
            if !t
                .path
                .segments
                .last()
                .is_some_and(|s| AUTO_TRAITS.iter().any(|a| s.ident == a)) =>
        {
            Some(t)
        }
        _ => None,
    })
}

/// Key type bound by an injection point
///
/// `Arc<T>` and `Arc<dyn T + Send + Sync>` give `T`, any other path type
/// gives itself, generic arguments included.
pub fn binding_type(ty: &Type) -> Option<WrittenType> {
    let written = written_type(ty)?;
    if written.is_dyn {
        return None;
    }
    if written.path != "Arc" {
        return Some(written);
    }
    match written.args.as_slice() {
        [inner] => Some(WrittenType {
            is_dyn: false,
            ..inner.clone()
        }),
        _ => None,
    }
}

/// Type inside `Lazy<..>`, for lazily resolved parameters
pub fn lazy_inner(ty: &Type) -> Option<&Type> {
    match ty {
        Type::Paren(p) => lazy_inner(&p.elem),
        Type::Group(g) => lazy_inner(&g.elem),
        Type::Path(tp) if tp.qself.is_none() => {
            let last = tp.path.segments.last()?;
            if last.ident != "Lazy" {
                return None;
            }
            single_type_arg(&last.arguments)
        }
        _ => None,
    }
}

fn single_type_arg(args: &PathArguments) -> Option<&Type> {
    let PathArguments::AngleBracketed(args) = args else {
        return None;
    };
    let mut types = args.args.iter().filter_map(|a| match a {
        GenericArgument::Type(t) => Some(t),
        _ => None,
    });
    let inner = types.next()?;
    types.next().is_none().then_some(inner)
}

/// False when a trait object inside the type lacks a `Send` or `Sync` bound
pub fn dyn_is_thread_safe(ty: &Type) -> bool {
    match ty {
        Type::Paren(p) => dyn_is_thread_safe(&p.elem),
        Type::Group(g) => dyn_is_thread_safe(&g.elem),
        Type::TraitObject(obj) => ["Send", "Sync"].iter().all(|auto| {
            obj.bounds.iter().any(|b| match b {
                TypeParamBound::Trait(t) => t.path.segments.last().is_some_and(|s| s.ident == auto),
                _ => false,
            })
        }),
        Type::Path(tp) => tp.path.segments.iter().all(|seg| match &seg.arguments {
            PathArguments::AngleBracketed(list) => list.args.iter().all(|arg| match arg {
                GenericArgument::Type(t) => dyn_is_thread_safe(t),
                _ => true,
            }),
            _ => true,
        }),
        _ => true,
    }
}

/// True for `-> ()` or no return type
pub fn returns_unit(output: &ReturnType) -> bool {
    match output {
        ReturnType::Default => true,
        ReturnType::Type(_, ty) => matches!(ty.as_ref(), Type::Tuple(t) if t.elems.is_empty()),
    }
}

/// True for `-> Self` or `-> <ident>`
pub fn returns_self(output: &ReturnType, ident: &str) -> bool {
    match output {
        ReturnType::Default => false,
        ReturnType::Type(_, ty) => match ty.as_ref() {
            Type::Path(tp) if tp.qself.is_none() => tp
                .path
                .segments
                .last()
                .is_some_and(|s| s.ident == "Self" || s.ident == ident),
            _ => false,
        },
    }
}
