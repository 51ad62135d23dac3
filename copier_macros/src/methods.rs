//! `#[methods]` attribute macro implementation
//!
//! Scans an inherent impl block for setters (`&mut self`, one owned argument, no return value)
//! and getters (`&self`, no arguments, an owned return value) and implements `RecordMethods`
//! with them. Other methods are left alone. The return type of a getter must implement
//! `Reflect`, so methods such as `fn check(&self) -> Result<(), E>` need `#[copier(skip)]`.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{FnArg, ImplItem, ItemImpl, ReturnType, Signature, Type, parse_macro_input};

use crate::shared::{parse_methods_args, take_method_attrs};

/// Implementation of the methods attribute macro
pub fn methods_impl(args: TokenStream, item: TokenStream) -> TokenStream {
    let mut item_impl = parse_macro_input!(item as ItemImpl);
    expand(args.into(), &mut item_impl)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// How a method takes part in copying
enum MethodRole {
    Setter(Type),
    Getter(Type),
}

struct Accessor {
    ident: syn::Ident,
    name:  String,
    ty:    Type,
}

fn expand(args: TokenStream2, item_impl: &mut ItemImpl) -> syn::Result<TokenStream2> {
    let rename_all = parse_methods_args(args)?;
    if let Some((_, path, _)) = &item_impl.trait_ {
        return Err(syn::Error::new_spanned(
            path,
            "#[methods] must be placed on an inherent impl block",
        ));
    }
    if let Some(param) = item_impl.generics.params.first() {
        return Err(syn::Error::new_spanned(
            param,
            "#[methods] cannot be placed on a generic impl block",
        ));
    }

    let mut setters = Vec::new();
    let mut getters = Vec::new();

    for item in &mut item_impl.items {
        let ImplItem::Fn(method) = item else {
            continue;
        };
        let attrs = take_method_attrs(&mut method.attrs)?;
        if attrs.skip {
            continue;
        }

        let Some(role) = classify(&method.sig) else {
            if attrs.rename.is_some() {
                return Err(syn::Error::new_spanned(
                    &method.sig.ident,
                    "renamed method is neither a setter nor a getter",
                ));
            }
            continue;
        };

        let declared = method.sig.ident.to_string();
        let name = attrs.rename.unwrap_or_else(|| {
            rename_all.map_or_else(|| declared.clone(), |rule| rule.apply(&declared))
        });
        let ident = method.sig.ident.clone();
        match role {
            MethodRole::Setter(ty) => setters.push(Accessor { ident, name, ty }),
            MethodRole::Getter(ty) => getters.push(Accessor { ident, name, ty }),
        }
    }

    let self_ty = &item_impl.self_ty;

    let shapes = setters
        .iter()
        .map(|Accessor { name, ty, .. }| {
            quote! { ::struct_copier::MethodShape::setter(#name, ::struct_copier::TypeKey::of::<#ty>()) }
        })
        .chain(getters.iter().map(|Accessor { name, ty, .. }| {
            quote! { ::struct_copier::MethodShape::getter(#name, ::struct_copier::TypeKey::of::<#ty>()) }
        }));

    let call_setter = if setters.is_empty() {
        quote! {}
    } else {
        let arms = setters.iter().enumerate().map(|(index, Accessor { ident, ty, .. })| {
            quote! {
                #index => match ::struct_copier::Reflect::as_any(value).downcast_ref::<#ty>() {
                    ::core::option::Option::Some(argument) => {
                        self.#ident(::core::clone::Clone::clone(argument));
                        true
                    }
                    ::core::option::Option::None => false,
                }
            }
        });
        quote! {
            fn call_setter(&mut self, index: usize, value: &dyn ::struct_copier::Reflect) -> bool {
                match index {
                    #(#arms,)*
                    _ => false,
                }
            }
        }
    };

    let call_getter = if getters.is_empty() {
        quote! {}
    } else {
        let arms = getters.iter().enumerate().map(|(index, Accessor { ident, .. })| {
            quote! {
                #index => ::core::option::Option::Some(
                    ::std::boxed::Box::new(self.#ident()) as ::std::boxed::Box<dyn ::struct_copier::Reflect>
                )
            }
        });
        quote! {
            fn call_getter(
                &self,
                index: usize,
            ) -> ::core::option::Option<::std::boxed::Box<dyn ::struct_copier::Reflect>> {
                match index {
                    #(#arms,)*
                    _ => ::core::option::Option::None,
                }
            }
        }
    };

    Ok(quote! {
        #item_impl

        impl ::struct_copier::RecordMethods for #self_ty {
            fn method_shapes() -> ::std::vec::Vec<::struct_copier::MethodShape> {
                ::std::vec![#(#shapes),*]
            }

            #call_setter

            #call_getter
        }
    })
}

/// Setter or getter role of a method, `None` for anything else
fn classify(sig: &Signature) -> Option<MethodRole> {
    if sig.asyncness.is_some() || sig.unsafety.is_some() || !sig.generics.params.is_empty() {
        return None;
    }

    let mut inputs = sig.inputs.iter();
    let Some(FnArg::Receiver(receiver)) = inputs.next() else {
        return None;
    };
    if receiver.reference.is_none() || receiver.colon_token.is_some() {
        return None;
    }

    let argument = inputs.next();
    if inputs.next().is_some() {
        return None;
    }

    match (receiver.mutability.is_some(), argument, &sig.output) {
        (true, Some(FnArg::Typed(argument)), output) if returns_unit(output) => {
            is_owned(&argument.ty).then(|| MethodRole::Setter((*argument.ty).clone()))
        }
        (false, None, ReturnType::Type(_, ty)) if !is_unit(ty) => {
            is_owned(ty).then(|| MethodRole::Getter((**ty).clone()))
        }
        _ => None,
    }
}

fn returns_unit(output: &ReturnType) -> bool {
    match output {
        ReturnType::Default => true,
        ReturnType::Type(_, ty) => is_unit(ty),
    }
}

fn is_unit(ty: &Type) -> bool { matches!(ty, Type::Tuple(tuple) if tuple.elems.is_empty()) }

/// Types a value can be cloned into or boxed from
fn is_owned(ty: &Type) -> bool {
    match ty {
        Type::Path(_) | Type::Array(_) | Type::Tuple(_) => true,
        Type::Paren(inner) => is_owned(&inner.elem),
        _ => false,
    }
}
