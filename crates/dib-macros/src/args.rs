//! Argument checks for marker attributes

use dib_domain::constants::PROVIDES_INTO_SET;
use dib_domain::{Marker, Scope};
use proc_macro2::{Span, TokenStream as TokenStream2};
use syn::parse::Parser;
use syn::spanned::Spanned;
use syn::{Expr, ExprArray, Ident, Lit, LitInt, LitStr, Path, Type};

/// Check that `attr` is a well-formed argument list for `marker`
pub fn validate(marker: Marker, attr: TokenStream2) -> syn::Result<()> {
    match marker {
        Marker::Injectable
        | Marker::Singleton
        | Marker::EagerSingleton
        | Marker::Inject => {
            if attr.is_empty() {
                Ok(())
            } else {
                Err(syn::Error::new(
                    attr.span(),
                    format!("{marker} takes no arguments"),
                ))
            }
        }
        Marker::Provides => {
            if attr.is_empty() {
                return Ok(());
            }
            let ident: Ident = syn::parse2(attr)?;
            if ident == PROVIDES_INTO_SET {
                Ok(())
            } else {
                Err(syn::Error::new(
                    ident.span(),
                    format!("expected `{PROVIDES_INTO_SET}`"),
                ))
            }
        }
        Marker::Scope => {
            let ident: Ident = syn::parse2(attr)?;
            ident
                .to_string()
                .parse::<Scope>()
                .map(|_| ())
                .map_err(|msg| syn::Error::new(ident.span(), msg))
        }
        Marker::Named => {
            let value: LitStr = syn::parse2(attr)?;
            if value.value().is_empty() {
                return Err(syn::Error::new(value.span(), "#[named] value cannot be empty"));
            }
            Ok(())
        }
        Marker::Qualifier => syn::parse2::<Path>(attr).map(|_| ()),
        Marker::ImplementedBy => syn::parse2::<Type>(attr).map(|_| ()),
        Marker::Module => validate_module(attr),
    }
}

fn validate_module(attr: TokenStream2) -> syn::Result<()> {
    let parser = syn::meta::parser(|meta| {
        if meta.path.is_ident("order") {
            let order: LitInt = meta.value()?.parse()?;
            order.base10_parse::<u32>()?;
            Ok(())
        } else if meta.path.is_ident("environments") {
            let list: ExprArray = meta.value()?.parse()?;
            for elem in &list.elems {
                match elem {
                    Expr::Lit(lit) if matches!(lit.lit, Lit::Str(_)) => {}
                    other => {
                        return Err(syn::Error::new(
                            other.span(),
                            "environments must be string literals",
                        ));
                    }
                }
            }
            Ok(())
        } else {
            Err(meta.error("expected `order` or `environments`"))
        }
    });
    parser.parse2(attr).map_err(|e| {
        let mut err = syn::Error::new(Span::call_site(), "invalid #[module] arguments");
        err.combine(e);
        err
    })
}
