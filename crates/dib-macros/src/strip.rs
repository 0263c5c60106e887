//! Removal of helper markers inside impl blocks

use dib_domain::Marker;
use proc_macro2::TokenStream as TokenStream2;
use quote::ToTokens;
use syn::visit_mut::{self, VisitMut};
use syn::{Attribute, ImplItemFn, Item, PatType, Receiver};

/// Strip helper markers from an impl block; other items are returned as-is
pub fn strip_impl_helpers(item: TokenStream2) -> syn::Result<TokenStream2> {
    match syn::parse2::<Item>(item.clone()) {
        Ok(Item::Impl(mut imp)) => {
            HelperStripper.visit_item_impl_mut(&mut imp);
            Ok(imp.into_token_stream())
        }
        _ => Ok(item),
    }
}

fn is_helper(attr: &Attribute) -> bool {
    let segments: Vec<String> = attr
        .path()
        .segments
        .iter()
        .map(|s| s.ident.to_string())
        .collect();
    Marker::from_path(segments.iter().map(String::as_str)).is_some_and(Marker::is_helper)
}

fn retain_non_helpers(attrs: &mut Vec<Attribute>) {
    attrs.retain(|attr| !is_helper(attr));
}

struct HelperStripper;

impl VisitMut for HelperStripper {
    fn visit_impl_item_fn_mut(&mut self, node: &mut ImplItemFn) {
        retain_non_helpers(&mut node.attrs);
        visit_mut::visit_impl_item_fn_mut(self, node);
    }

    fn visit_pat_type_mut(&mut self, node: &mut PatType) {
        retain_non_helpers(&mut node.attrs);
        visit_mut::visit_pat_type_mut(self, node);
    }

    fn visit_receiver_mut(&mut self, node: &mut Receiver) {
        retain_non_helpers(&mut node.attrs);
        visit_mut::visit_receiver_mut(self, node);
    }
}
