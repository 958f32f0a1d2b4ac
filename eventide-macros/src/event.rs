//! `#[derive(Event)]`.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{ToTokens, quote};
use syn::{
    Attribute, Data, DeriveInput, Index, Member, Path, Token, Type,
    parse::{Parse, ParseStream},
    parse_macro_input,
    punctuated::Punctuated,
};

/// Container-level `#[event(...)]` arguments.
#[derive(Default)]
struct EventArgs {
    supertypes: Vec<Path>,
    markers: Vec<Path>,
}

impl Parse for EventArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut args = EventArgs::default();

        while !input.is_empty() {
            let ident: syn::Ident = input.parse()?;
            match ident.to_string().as_str() {
                "supertypes" | "markers" => {
                    let content;
                    syn::parenthesized!(content in input);
                    let paths = Punctuated::<Path, Token![,]>::parse_terminated(&content)?;
                    if ident == "supertypes" {
                        args.supertypes.extend(paths);
                    } else {
                        args.markers.extend(paths);
                    }
                }
                other => {
                    return Err(syn::Error::new(
                        ident.span(),
                        format!("unknown event attribute: {}", other),
                    ));
                }
            }

            if input.peek(Token![,]) {
                input.parse::<Token![,]>()?;
            }
        }

        Ok(args)
    }
}

fn parse_container_args(attrs: &[Attribute]) -> syn::Result<EventArgs> {
    let mut merged = EventArgs::default();
    for attr in attrs.iter().filter(|attr| attr.path().is_ident("event")) {
        let args: EventArgs = attr.parse_args()?;
        merged.supertypes.extend(args.supertypes);
        merged.markers.extend(args.markers);
    }
    Ok(merged)
}

fn is_parent_field(attrs: &[Attribute]) -> syn::Result<bool> {
    let mut parent = false;
    for attr in attrs.iter().filter(|attr| attr.path().is_ident("event")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("parent") {
                parent = true;
                Ok(())
            } else {
                Err(meta.error("unknown field attribute, expected `parent`"))
            }
        })?;
    }
    Ok(parent)
}

/// A field marked `#[event(parent)]`.
struct Parent {
    member: Member,
    ty: Type,
}

/// Fields marked `#[event(parent)]`, in declaration order.
fn parent_fields(input: &DeriveInput) -> syn::Result<Vec<Parent>> {
    match &input.data {
        Data::Struct(data) => {
            let mut parents = Vec::new();
            for (index, field) in data.fields.iter().enumerate() {
                if !is_parent_field(&field.attrs)? {
                    continue;
                }
                let member = match &field.ident {
                    Some(ident) => Member::Named(ident.clone()),
                    None => Member::Unnamed(Index::from(index)),
                };
                parents.push(Parent {
                    member,
                    ty: field.ty.clone(),
                });
            }
            Ok(parents)
        }
        Data::Enum(data) => {
            for variant in &data.variants {
                for field in &variant.fields {
                    if is_parent_field(&field.attrs)? {
                        return Err(syn::Error::new_spanned(
                            field,
                            "`#[event(parent)]` is only supported on struct fields",
                        ));
                    }
                }
            }
            Ok(Vec::new())
        }
        Data::Union(_) => Err(syn::Error::new_spanned(
            input,
            "#[derive(Event)] can only be used on structs and enums",
        )),
    }
}

/// Token text of a type or path, ignoring spacing.
fn spelling(tokens: &impl ToTokens) -> String {
    tokens
        .to_token_stream()
        .to_string()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect()
}

/// Pairs every listed supertype with the parent field holding its data.
///
/// A typed handler on a supertype can only view the event through such a
/// field, so a supertype without one is rejected; data-less supertypes go
/// in `markers(..)` instead.
fn check_parents(args: &EventArgs, parents: &[Parent]) -> syn::Result<()> {
    let mut errors: Option<syn::Error> = None;
    let mut push = |error: syn::Error| match errors.as_mut() {
        Some(existing) => existing.combine(error),
        None => errors = Some(error),
    };

    for path in &args.supertypes {
        let wanted = spelling(path);
        if !parents.iter().any(|parent| spelling(&parent.ty) == wanted) {
            push(syn::Error::new_spanned(
                path,
                format!(
                    "supertype `{}` has no `#[event(parent)]` field of that type; \
                     add one, or list it under `markers(..)` if it carries no data",
                    wanted
                ),
            ));
        }
    }
    for parent in parents {
        let held = spelling(&parent.ty);
        if !args.supertypes.iter().any(|path| spelling(path) == held) {
            push(syn::Error::new_spanned(
                &parent.ty,
                format!("parent field type `{}` must be listed in `supertypes(..)`", held),
            ));
        }
    }

    errors.map_or(Ok(()), Err)
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let args = parse_container_args(&input.attrs)?;
    let parents = parent_fields(input)?;
    check_parents(&args, &parents)?;

    let supertypes = args.supertypes.iter().chain(&args.markers).map(|path| {
        quote! { ::eventide::EventType::of::<#path>() }
    });
    let parents: Vec<&Member> = parents.iter().map(|parent| &parent.member).collect();

    let projection = if parents.is_empty() {
        TokenStream2::new()
    } else {
        quote! {
            fn project(
                &self,
                target: ::std::any::TypeId,
            ) -> ::core::option::Option<&dyn ::std::any::Any> {
                if target == ::std::any::TypeId::of::<Self>() {
                    return ::core::option::Option::Some(self);
                }
                #(
                    if let ::core::option::Option::Some(found) =
                        ::eventide::Hierarchy::project(&self.#parents, target)
                    {
                        return ::core::option::Option::Some(found);
                    }
                )*
                ::core::option::Option::None
            }
        }
    };

    Ok(quote! {
        impl #impl_generics ::eventide::Hierarchy for #name #ty_generics #where_clause {
            fn supertypes() -> ::std::vec::Vec<::eventide::EventType> {
                ::std::vec![#(#supertypes),*]
            }

            #projection
        }
    })
}

/// Implementation of `#[derive(Event)]`.
pub fn derive_event_impl(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(&input) {
        Ok(expanded) => TokenStream::from(expanded),
        Err(error) => error.to_compile_error().into(),
    }
}
