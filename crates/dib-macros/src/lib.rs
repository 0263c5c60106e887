//! Marker attributes for dib
//!
//! These attributes are the source-level form of the annotation vocabulary in
//! [`dib_domain::annotations`]. They have no runtime behaviour: each one
//! checks its own arguments and hands the item back unchanged. The bindings
//! themselves are discovered by `dib-processor`, which reads the markers from
//! the source files at build time.
//!
//! Attribute macros cannot sit on function parameters, so `#[injectable]` and
//! `#[module]` placed on an `impl` block remove the helper markers
//! (`inject`, `provides`, `named`, `qualifier`, `scope`, `singleton`,
//! `eager_singleton`) from the items and parameters inside it.
//!
//! # Example
//!
//! ```ignore
//! use dib::{injectable, inject, named, singleton};
//!
//! #[injectable]
//! #[singleton]
//! pub struct Checkout {
//!     processor: Arc<dyn CreditCardProcessor>,
//! }
//!
//! #[injectable]
//! impl Checkout {
//!     #[inject]
//!     pub fn new(#[named("paypal")] processor: Arc<dyn CreditCardProcessor>) -> Self {
//!         Self { processor }
//!     }
//! }
//! ```

use dib_domain::Marker;
use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;

mod args;
mod strip;

/// Marks a component type, or the inherent impl holding its constructor
#[proc_macro_attribute]
pub fn injectable(attr: TokenStream, item: TokenStream) -> TokenStream {
    render(expand(Marker::Injectable, attr.into(), item.into()))
}

/// Sets the lifecycle: `#[scope(singleton | request | prototype)]`
#[proc_macro_attribute]
pub fn scope(attr: TokenStream, item: TokenStream) -> TokenStream {
    render(expand(Marker::Scope, attr.into(), item.into()))
}

/// Shorthand for `#[scope(singleton)]`
#[proc_macro_attribute]
pub fn singleton(attr: TokenStream, item: TokenStream) -> TokenStream {
    render(expand(Marker::Singleton, attr.into(), item.into()))
}

/// Singleton built while the runtime bridge starts
#[proc_macro_attribute]
pub fn eager_singleton(attr: TokenStream, item: TokenStream) -> TokenStream {
    render(expand(Marker::EagerSingleton, attr.into(), item.into()))
}

/// Selects the construction point
#[proc_macro_attribute]
pub fn inject(attr: TokenStream, item: TokenStream) -> TokenStream {
    render(expand(Marker::Inject, attr.into(), item.into()))
}

/// Marks a module method whose return value is a binding
#[proc_macro_attribute]
pub fn provides(attr: TokenStream, item: TokenStream) -> TokenStream {
    render(expand(Marker::Provides, attr.into(), item.into()))
}

/// String qualifier: `#[named("JDBC URL")]`
#[proc_macro_attribute]
pub fn named(attr: TokenStream, item: TokenStream) -> TokenStream {
    render(expand(Marker::Named, attr.into(), item.into()))
}

/// Marker-type qualifier: `#[qualifier(PayPal)]`
#[proc_macro_attribute]
pub fn qualifier(attr: TokenStream, item: TokenStream) -> TokenStream {
    render(expand(Marker::Qualifier, attr.into(), item.into()))
}

/// Default implementation of a trait: `#[implemented_by(PayPalProcessor)]`
#[proc_macro_attribute]
pub fn implemented_by(attr: TokenStream, item: TokenStream) -> TokenStream {
    render(expand(Marker::ImplementedBy, attr.into(), item.into()))
}

/// Module impl block: `#[module(order = 1, environments = ["test"])]`
#[proc_macro_attribute]
pub fn module(attr: TokenStream, item: TokenStream) -> TokenStream {
    render(expand(Marker::Module, attr.into(), item.into()))
}

fn render(result: syn::Result<TokenStream2>) -> TokenStream {
    result.unwrap_or_else(syn::Error::into_compile_error).into()
}

fn expand(marker: Marker, attr: TokenStream2, item: TokenStream2) -> syn::Result<TokenStream2> {
    args::validate(marker, attr)?;

    match marker {
        Marker::Injectable | Marker::Module => strip::strip_impl_helpers(item),
        _ => Ok(item),
    }
}
