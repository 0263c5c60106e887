//! Glue code generation
//!
//! For every descriptor the glue holds one factory fn and one
//! `ComponentFactoryEntry` static collected into the runtime's
//! `COMPONENT_FACTORIES` distributed slice. The glue is meant to be
//! `include!`d at the crate root, so type paths are emitted as `crate::..`.
//!
//! Stored values follow one convention: a component or module is stored as
//! `Arc<T>`, a provider's value is stored exactly as returned, a linked
//! binding is stored as `Arc<dyn Trait + Send + Sync>` and a set as the `Vec`
//! of its contributions. Dependencies are fetched with `ctx.dependency(i)?`
//! (or `ctx.lazy(i)?` for `Lazy<T>` parameters), their type inferred from the
//! parameter.

use crate::{ProcessorError, Result};
use dib_domain::{BindingDescriptor, BindingKind, ConstructionPoint, DependencyMode, ModuleRegistration};
use proc_macro2::{Ident, Span, TokenStream};
use quote::{format_ident, quote};
use syn::{GenericArgument, PathArguments, Type, TypeParamBound, parse_quote};

const GLUE_HEADER: &str = "// @generated by dib-processor. Do not edit.\n";

/// Render the glue file for a registration
pub fn render_glue(registration: &ModuleRegistration, runtime_path: &str) -> Result<String> {
    let runtime: syn::Path = syn::parse_str(runtime_path).map_err(|e| {
        ProcessorError::config(format!("Invalid runtime path '{runtime_path}': {e}"))
    })?;
    let json = registration.to_json_pretty()?;

    let mut items = Vec::with_capacity(registration.len());
    for descriptor in registration.iter() {
        items.push(factory_item(
            descriptor,
            registration,
            &registration.crate_name,
            &runtime,
        )?);
    }

    let tokens = quote! {
        /// Module registration artifact of this crate
        #[allow(dead_code)]
        pub const DIB_REGISTRATION_JSON: &str = #json;

        #(#items)*
    };
    Ok(format!("{GLUE_HEADER}{tokens}\n"))
}

/// `crate::`-relative path of a canonical type name
fn crate_path(canonical: &str, crate_name: &str) -> Result<syn::Path> {
    let relative = canonical
        .strip_prefix(crate_name)
        .and_then(|rest| rest.strip_prefix("::"))
        .ok_or_else(|| {
            ProcessorError::config(format!("{canonical} is not declared in crate {crate_name}"))
        })?;
    syn::parse_str(&format!("crate::{relative}"))
        .map_err(|e| ProcessorError::config(format!("Invalid type path '{canonical}': {e}")))
}

/// Rust type of a canonical key type name
///
/// Paths of this crate become `crate::..`, bare `Arc` and `Vec` their std
/// paths, and trait objects get the `Send + Sync` bounds of stored values.
fn key_type(canonical: &str, crate_name: &str) -> Result<Type> {
    let mut ty: Type = syn::parse_str(canonical)
        .map_err(|e| ProcessorError::config(format!("Invalid key type '{canonical}': {e}")))?;
    localize_type(&mut ty, crate_name);
    Ok(ty)
}

fn localize_type(ty: &mut Type, crate_name: &str) {
    match ty {
        Type::Path(tp) => localize_path(&mut tp.path, crate_name),
        Type::TraitObject(obj) => {
            for bound in &mut obj.bounds {
                if let TypeParamBound::Trait(t) = bound {
                    localize_path(&mut t.path, crate_name);
                }
            }
            obj.bounds.push(parse_quote!(::core::marker::Send));
            obj.bounds.push(parse_quote!(::core::marker::Sync));
        }
        _ => {}
    }
}

fn localize_path(path: &mut syn::Path, crate_name: &str) {
    for segment in &mut path.segments {
        if let PathArguments::AngleBracketed(list) = &mut segment.arguments {
            for arg in &mut list.args {
                if let GenericArgument::Type(t) = arg {
                    localize_type(t, crate_name);
                }
            }
        }
    }
    if path.leading_colon.is_some() {
        return;
    }
    if path.segments.first().is_some_and(|s| s.ident == crate_name) {
        if let Some(first) = path.segments.first_mut() {
            first.ident = Ident::new("crate", first.ident.span());
        }
        return;
    }
    if path.segments.len() != 1 {
        return;
    }
    let std_path: Option<syn::Path> = match path.segments[0].ident.to_string().as_str() {
        "Arc" => Some(parse_quote!(::std::sync::Arc)),
        "Vec" => Some(parse_quote!(::std::vec::Vec)),
        _ => None,
    };
    if let Some(mut std_path) = std_path {
        if let Some(last) = std_path.segments.last_mut() {
            last.arguments = path.segments[0].arguments.clone();
        }
        *path = std_path;
    }
}

fn dependency_args(descriptor: &BindingDescriptor, skip: usize) -> Vec<TokenStream> {
    descriptor
        .dependencies
        .iter()
        .skip(skip)
        .map(|d| {
            let position = d.position;
            match d.mode {
                DependencyMode::Direct => quote!(ctx.dependency(#position)?),
                DependencyMode::Lazy => quote!(ctx.lazy(#position)?),
                DependencyMode::Optional => quote!(ctx.optional_dependency(#position)?),
            }
        })
        .collect()
}

fn factory_item(
    descriptor: &BindingDescriptor,
    registration: &ModuleRegistration,
    crate_name: &str,
    runtime: &syn::Path,
) -> Result<TokenStream> {
    let index = descriptor.id.index();
    let descriptor_id = descriptor.id.0;
    let factory_fn = format_ident!("__dib_factory_{}", index);
    let entry = Ident::new(&format!("__DIB_FACTORY_{index}"), Span::call_site());
    let type_name = descriptor.key.type_name.as_str();
    let qualifier = match &descriptor.key.qualifier {
        Some(q) => quote!(::core::option::Option::Some(#q)),
        None => quote!(::core::option::Option::None),
    };

    let value = match (&descriptor.kind, &descriptor.construction) {
        (BindingKind::Component | BindingKind::Module, construction) => {
            let ty = crate_path(type_name, crate_name)?;
            let built = match construction {
                ConstructionPoint::Constructor { name } => {
                    let ctor = format_ident!("{}", name);
                    let args = dependency_args(descriptor, 0);
                    quote!(#ty::#ctor(#(#args),*))
                }
                ConstructionPoint::Default => {
                    quote!(<#ty as ::core::default::Default>::default())
                }
                _ => quote!(#ty),
            };
            quote!(::std::sync::Arc::new(#built))
        }
        (
            BindingKind::Provider { module, .. },
            ConstructionPoint::ProviderMethod { name, has_receiver },
        ) => {
            let module_key = registration
                .get(*module)
                .map(|m| m.key.type_name.as_str())
                .ok_or_else(|| {
                    ProcessorError::config(format!("{} has no module descriptor", descriptor.key))
                })?;
            let module_ty = crate_path(module_key, crate_name)?;
            let method = format_ident!("{}", name);
            if *has_receiver {
                let args = dependency_args(descriptor, 1);
                quote! {{
                    let module: ::std::sync::Arc<#module_ty> = ctx.dependency(0)?;
                    module.#method(#(#args),*)
                }}
            } else {
                let args = dependency_args(descriptor, 0);
                quote!(#module_ty::#method(#(#args),*))
            }
        }
        (BindingKind::Set, ConstructionPoint::Collect) => {
            let set_ty = key_type(type_name, crate_name)?;
            let count = descriptor.dependencies.len();
            let pushes = descriptor.dependencies.iter().map(|d| {
                let position = d.position;
                quote! {
                    if let ::core::option::Option::Some(item) = ctx.optional_dependency(#position)? {
                        items.push(item);
                    }
                }
            });
            quote! {{
                let mut items: #set_ty = ::std::vec::Vec::with_capacity(#count);
                #(#pushes)*
                items
            }}
        }
        (BindingKind::Linked { target }, _) => {
            let trait_path = crate_path(type_name, crate_name)?;
            let target_ty = crate_path(&target.type_name, crate_name)?;
            quote! {{
                let target: ::std::sync::Arc<#target_ty> = ctx.dependency(0)?;
                target as ::std::sync::Arc<dyn #trait_path + ::core::marker::Send + ::core::marker::Sync>
            }}
        }
        (kind, construction) => {
            return Err(ProcessorError::config(format!(
                "{}: {construction} does not fit {kind:?}",
                descriptor.key
            )));
        }
    };

    // Factories without dependencies never read the context
    let ctx = if descriptor.dependencies.is_empty() {
        format_ident!("_ctx")
    } else {
        format_ident!("ctx")
    };

    Ok(quote! {
        #[doc(hidden)]
        fn #factory_fn(
            #ctx: &#runtime::ResolutionContext<'_>,
        ) -> #runtime::Result<#runtime::Instance> {
            ::core::result::Result::Ok(#runtime::Instance::new(#value))
        }

        #[doc(hidden)]
        #[#runtime::linkme::distributed_slice(#runtime::COMPONENT_FACTORIES)]
        #[linkme(crate = #runtime::linkme)]
        static #entry: #runtime::ComponentFactoryEntry = #runtime::ComponentFactoryEntry {
            type_name: #type_name,
            qualifier: #qualifier,
            crate_name: #crate_name,
            descriptor: #descriptor_id,
            factory: #factory_fn,
        };
    })
}
