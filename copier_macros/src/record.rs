//! Record derive macro implementation

use std::collections::HashMap;

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::ext::IdentExt;
use syn::{Data, DeriveInput, Fields, parse_macro_input};

use crate::shared::{parse_container_attrs, parse_field_attrs};

/// Implementation of the Record derive macro
pub fn derive_record_impl(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let Data::Struct(data) = &input.data else {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "Record can only be derived for structs",
        ));
    };
    let Fields::Named(fields) = &data.fields else {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "Record can only be derived for structs with named fields",
        ));
    };

    if let Some(param) = input.generics.params.first() {
        return Err(syn::Error::new_spanned(
            param,
            "Record cannot be derived for generic structs",
        ));
    }

    let container = parse_container_attrs(&input.attrs)?;
    let mut shape_fields = Vec::new();
    let mut field_arms = Vec::new();
    let mut field_mut_arms = Vec::new();
    let mut empty_checks = Vec::new();
    let mut effective_names: HashMap<String, String> = HashMap::new();

    for (index, field) in fields.named.iter().enumerate() {
        let Some(ident) = &field.ident else {
            continue;
        };
        let field_ty = &field.ty;
        let attrs = parse_field_attrs(&field.attrs)?;
        let declared = ident.unraw().to_string();

        // Explicit rename wins over rename_all
        let renamed = attrs.rename.clone().or_else(|| {
            container
                .rename_all
                .map(|rule| rule.apply(&declared))
                .filter(|converted| *converted != declared)
        });
        let tag = attrs.tag(renamed.as_deref());

        shape_fields.push(quote! {
            .field(#declared, #tag, ::struct_copier::TypeKey::of::<#field_ty>())
        });

        if attrs.ignore {
            continue;
        }

        let effective = renamed.unwrap_or_else(|| declared.clone());
        if let Some(previous) = effective_names.insert(effective.clone(), declared.clone()) {
            return Err(syn::Error::new_spanned(
                ident,
                format!("fields '{previous}' and '{declared}' both match as '{effective}'"),
            ));
        }

        field_arms.push(quote! {
            #index => ::core::option::Option::Some(&self.#ident as &dyn ::struct_copier::Reflect)
        });
        field_mut_arms.push(quote! {
            #index => ::core::option::Option::Some(&mut self.#ident as &mut dyn ::struct_copier::Reflect)
        });
        empty_checks.push(quote! {
            && ::struct_copier::Reflect::is_empty_value(&self.#ident)
        });
    }

    let name = &input.ident;

    let methods_impl = if container.methods {
        quote! {}
    } else {
        quote! {
            impl ::struct_copier::RecordMethods for #name {}
        }
    };

    Ok(quote! {
        impl ::struct_copier::Reflect for #name {
            fn type_key(&self) -> ::struct_copier::TypeKey { ::struct_copier::TypeKey::of::<Self>() }

            fn as_any(&self) -> &dyn ::core::any::Any { self }

            fn as_any_mut(&mut self) -> &mut dyn ::core::any::Any { self }

            fn as_reflect(&self) -> &dyn ::struct_copier::Reflect { self }

            fn reflect_ref(&self) -> ::struct_copier::ReflectRef<'_> {
                ::struct_copier::ReflectRef::Record(self)
            }

            fn reflect_mut(&mut self) -> ::struct_copier::ReflectMut<'_> {
                ::struct_copier::ReflectMut::Record(self)
            }

            fn clone_value(&self) -> ::std::boxed::Box<dyn ::struct_copier::Reflect> {
                ::std::boxed::Box::new(::core::clone::Clone::clone(self))
            }

            fn assign(&mut self, value: &dyn ::struct_copier::Reflect) -> bool {
                ::struct_copier::reflect::assign_concrete(self, value)
            }

            fn is_empty_value(&self) -> bool {
                true #(#empty_checks)*
            }
        }

        impl ::struct_copier::Record for #name {
            fn build_shape(&self) -> ::struct_copier::Result<::struct_copier::RecordShape> {
                ::struct_copier::RecordShape::builder(::struct_copier::TypeKey::of::<Self>())
                    #(#shape_fields)*
                    .methods(<Self as ::struct_copier::RecordMethods>::method_shapes())
                    .build()
            }

            fn field(&self, index: usize) -> ::core::option::Option<&dyn ::struct_copier::Reflect> {
                match index {
                    #(#field_arms,)*
                    _ => ::core::option::Option::None,
                }
            }

            fn field_mut(
                &mut self,
                index: usize,
            ) -> ::core::option::Option<&mut dyn ::struct_copier::Reflect> {
                match index {
                    #(#field_mut_arms,)*
                    _ => ::core::option::Option::None,
                }
            }

            fn call_setter(&mut self, index: usize, value: &dyn ::struct_copier::Reflect) -> bool {
                <Self as ::struct_copier::RecordMethods>::call_setter(self, index, value)
            }

            fn call_getter(
                &self,
                index: usize,
            ) -> ::core::option::Option<::std::boxed::Box<dyn ::struct_copier::Reflect>> {
                <Self as ::struct_copier::RecordMethods>::call_getter(self, index)
            }
        }

        #methods_impl
    })
}

#[cfg(test)]
mod tests {
    use syn::parse_quote;

    use super::*;

    fn error_message(input: &DeriveInput) -> Option<String> {
        expand(input).err().map(|error| error.to_string())
    }

    #[test]
    fn generic_structs_are_rejected() {
        let input: DeriveInput = parse_quote! {
            struct Wrapper<T> {
                value: T,
            }
        };
        assert_eq!(
            error_message(&input).as_deref(),
            Some("Record cannot be derived for generic structs")
        );
    }

    #[test]
    fn duplicate_effective_names_are_rejected() {
        let input: DeriveInput = parse_quote! {
            struct Clash {
                #[copier(rename = "name")]
                first: String,
                name: String,
            }
        };
        assert!(error_message(&input).is_some_and(|message| message.contains("both match")));
    }

    #[test]
    fn plain_struct_expands() {
        let input: DeriveInput = parse_quote! {
            struct Plain {
                value: i64,
            }
        };
        assert!(expand(&input).is_ok());
    }
}
