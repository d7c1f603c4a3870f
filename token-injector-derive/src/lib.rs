//! Derive macro for token-injector
//!
//! `#[derive(Construct)]` maps struct fields to token names and generates
//! `Construct::construct`, so a type can be registered with `singleton::<T>()`,
//! `scoped::<T>()` or `transient::<T>()` without a hand-written constructor.
//!
//! ```rust,ignore
//! use token_injector::{Construct, Container, Tokens, value};
//! use std::sync::Arc;
//!
//! struct Database { url: String }
//! struct Cache;
//!
//! #[derive(Construct)]
//! struct UserService {
//!     #[inject]
//!     database: Arc<Database>,
//!     #[inject("metrics_cache")]
//!     cache: Arc<Cache>,
//!     #[inject(optional)]
//!     audit: Option<Arc<String>>,
//!     // Non-injected fields use Default
//!     request_count: u64,
//! }
//! ```

use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::quote;
use syn::parse::{ParseStream, Parser};
use syn::{Attribute, Data, DeriveInput, Fields, LitStr, Type, parse_macro_input};

/// Derive `token_injector::Construct`.
///
/// # Attributes
///
/// - `#[inject]` - resolve the field by its own name. The field type must be
///   `Arc<T>`.
/// - `#[inject("name")]` - resolve the field by `name`.
/// - `#[inject(optional)]` / `#[inject(optional, "name")]` - the field is
///   `Option<Arc<T>>` and is `None` when the name is not registered anywhere
///   in the container chain.
///
/// Fields without `#[inject]` are initialized with `Default::default()`.
#[proc_macro_derive(Construct, attributes(inject))]
pub fn derive_construct(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let body = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => {
                let inits = fields
                    .named
                    .iter()
                    .map(|field| {
                        // named fields always carry an ident
                        let ident = field.ident.as_ref().ok_or_else(|| {
                            syn::Error::new_spanned(field, "expected a named field")
                        })?;
                        let value = field_init(&ident.to_string(), &field.ty, &field.attrs)?;
                        Ok(quote! { #ident: #value })
                    })
                    .collect::<syn::Result<Vec<_>>>()?;
                quote! { Self { #(#inits),* } }
            }
            Fields::Unit => quote! { Self },
            Fields::Unnamed(_) => {
                return Err(syn::Error::new_spanned(
                    input,
                    "Construct can only be derived for structs with named fields or unit structs",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                "Construct can only be derived for structs",
            ));
        }
    };

    Ok(quote! {
        impl #impl_generics ::token_injector::Construct for #name #ty_generics #where_clause {
            fn construct(
                instances: &::token_injector::Instances<'_>,
            ) -> ::token_injector::Result<Self> {
                ::std::result::Result::Ok(#body)
            }
        }
    })
}

/// Parsed `#[inject(...)]` arguments
struct Inject {
    name: Option<LitStr>,
    optional: bool,
}

fn field_init(
    field_name: &str,
    ty: &Type,
    attrs: &[Attribute],
) -> syn::Result<proc_macro2::TokenStream> {
    let Some(inject) = find_inject_attr(attrs)? else {
        return Ok(quote! { ::std::default::Default::default() });
    };

    let token = inject
        .name
        .unwrap_or_else(|| LitStr::new(field_name, Span::call_site()));

    if inject.optional {
        let inner = extract_option_arc_inner_type(ty).ok_or_else(|| {
            syn::Error::new_spanned(
                ty,
                "Fields marked with #[inject(optional)] must have type Option<Arc<T>>",
            )
        })?;
        Ok(quote! { instances.get_optional::<#inner>(#token)? })
    } else {
        let inner = extract_arc_inner_type(ty).ok_or_else(|| {
            syn::Error::new_spanned(ty, "Fields marked with #[inject] must have type Arc<T>")
        })?;
        Ok(quote! { instances.get::<#inner>(#token)? })
    }
}

/// Find and parse the `#[inject]` attribute
fn find_inject_attr(attrs: &[Attribute]) -> syn::Result<Option<Inject>> {
    let Some(attr) = attrs.iter().find(|attr| attr.path().is_ident("inject")) else {
        return Ok(None);
    };

    let mut inject = Inject {
        name: None,
        optional: false,
    };

    if attr.meta.require_path_only().is_ok() {
        return Ok(Some(inject));
    }

    let parser = |input: ParseStream<'_>| {
        while !input.is_empty() {
            if input.peek(LitStr) {
                let name: LitStr = input.parse()?;
                if inject.name.replace(name.clone()).is_some() {
                    return Err(syn::Error::new(name.span(), "duplicate token name"));
                }
            } else {
                let ident: syn::Ident = input.parse()?;
                if ident != "optional" {
                    return Err(syn::Error::new(
                        ident.span(),
                        "expected `optional` or a token name string",
                    ));
                }
                inject.optional = true;
            }

            if !input.is_empty() {
                input.parse::<syn::Token![,]>()?;
            }
        }
        Ok(())
    };
    attr.parse_args_with(parser)?;

    Ok(Some(inject))
}

/// Extract T from Arc<T>
fn extract_arc_inner_type(ty: &Type) -> Option<&Type> {
    generic_argument_of(ty, "Arc")
}

/// Extract T from Option<Arc<T>>
fn extract_option_arc_inner_type(ty: &Type) -> Option<&Type> {
    generic_argument_of(ty, "Option").and_then(extract_arc_inner_type)
}

fn generic_argument_of<'a>(ty: &'a Type, wrapper: &str) -> Option<&'a Type> {
    let Type::Path(type_path) = ty else {
        return None;
    };
    let segment = type_path.path.segments.last()?;
    if segment.ident != wrapper {
        return None;
    }
    let syn::PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    match args.args.first()? {
        syn::GenericArgument::Type(inner) => Some(inner),
        _ => None,
    }
}
