//! `#[subscriber]` and its `#[subscribe]` method markers.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{
    Attribute, FnArg, ImplItem, ImplItemFn, ItemImpl, Meta, Type, TypeReference,
    parse::{Nothing, Parse, ParseStream},
    parse_macro_input,
};

/// Arguments of `#[subscribe]` / `#[subscribe(Type)]`.
struct SubscribeArgs {
    event_type: Option<Type>,
}

impl Parse for SubscribeArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let event_type = if input.is_empty() {
            None
        } else {
            Some(input.parse()?)
        };
        Ok(SubscribeArgs { event_type })
    }
}

/// Removes the `#[subscribe]` marker from `attrs`, returning its arguments.
fn take_subscribe_attr(attrs: &mut Vec<Attribute>) -> syn::Result<Option<SubscribeArgs>> {
    let Some(position) = attrs.iter().position(|attr| attr.path().is_ident("subscribe")) else {
        return Ok(None);
    };
    let attr = attrs.remove(position);
    if attrs.iter().any(|attr| attr.path().is_ident("subscribe")) {
        return Err(syn::Error::new_spanned(
            &attr,
            "a handler may only carry one `#[subscribe]`",
        ));
    }
    let args = match &attr.meta {
        Meta::Path(_) => SubscribeArgs { event_type: None },
        _ => attr.parse_args()?,
    };
    Ok(Some(args))
}

fn is_dyn_event(ty: &Type) -> bool {
    match ty {
        Type::TraitObject(object) => object.bounds.iter().any(|bound| match bound {
            syn::TypeParamBound::Trait(bound) => bound
                .path
                .segments
                .last()
                .is_some_and(|segment| segment.ident == "Event"),
            _ => false,
        }),
        Type::Paren(inner) => is_dyn_event(&inner.elem),
        Type::Group(inner) => is_dyn_event(&inner.elem),
        _ => false,
    }
}

/// Descriptor expression for one `#[subscribe]` method.
fn handler_descriptor(method: &ImplItemFn, args: SubscribeArgs) -> syn::Result<TokenStream2> {
    let sig = &method.sig;
    let name = &sig.ident;

    if sig.asyncness.is_some() {
        return Err(syn::Error::new_spanned(
            sig.asyncness,
            "handler methods must be synchronous",
        ));
    }
    if !sig.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &sig.generics,
            "handler methods cannot be generic",
        ));
    }

    let mut inputs = sig.inputs.iter();
    match inputs.next() {
        Some(FnArg::Receiver(receiver))
            if receiver.reference.is_some() && receiver.mutability.is_none() =>
        {
            if receiver.colon_token.is_some() {
                return Err(syn::Error::new_spanned(
                    receiver,
                    "handler methods must take `&self`",
                ));
            }
        }
        Some(other) => {
            return Err(syn::Error::new_spanned(
                other,
                "handler methods must take `&self`",
            ));
        }
        None => {
            return Err(syn::Error::new_spanned(
                sig,
                "handler methods must take `&self`",
            ));
        }
    }

    let params: Vec<&FnArg> = inputs.collect();
    let [FnArg::Typed(param)] = params.as_slice() else {
        return Err(syn::Error::new_spanned(
            &sig.inputs,
            format!(
                "handler methods must accept exactly one event parameter, `{}` has {}",
                name,
                params.len()
            ),
        ));
    };

    let Type::Reference(TypeReference {
        mutability: None,
        elem,
        ..
    }) = &*param.ty
    else {
        return Err(syn::Error::new_spanned(
            &param.ty,
            "handler event parameter must be a shared reference (`&Event`)",
        ));
    };

    if is_dyn_event(elem) {
        let declared = match args.event_type {
            Some(ty) => quote! { #ty },
            None => quote! { ::eventide::AnyEvent },
        };
        Ok(quote! {
            ::eventide::HandlerMethod::erased::<Self, _>(
                ::core::stringify!(#name),
                ::eventide::EventType::of::<#declared>(),
                Self::#name,
            )
        })
    } else {
        if let Some(ty) = args.event_type {
            return Err(syn::Error::new_spanned(
                ty,
                "an explicit event type is only allowed for `&dyn Event` parameters",
            ));
        }
        Ok(quote! {
            ::eventide::HandlerMethod::typed::<Self, #elem, _>(
                ::core::stringify!(#name),
                Self::#name,
            )
        })
    }
}

fn expand(mut input: ItemImpl) -> syn::Result<TokenStream2> {
    if let Some((_, path, _)) = &input.trait_ {
        return Err(syn::Error::new_spanned(
            path,
            "#[subscriber] must be used on an inherent impl block",
        ));
    }

    let mut descriptors = Vec::new();
    let mut errors: Option<syn::Error> = None;

    for item in &mut input.items {
        let ImplItem::Fn(method) = item else {
            continue;
        };
        let outcome = take_subscribe_attr(&mut method.attrs)
            .and_then(|args| args.map(|args| handler_descriptor(method, args)).transpose());
        match outcome {
            Ok(Some(descriptor)) => descriptors.push(descriptor),
            Ok(None) => {}
            Err(error) => match &mut errors {
                Some(existing) => existing.combine(error),
                None => errors = Some(error),
            },
        }
    }

    if let Some(error) = errors {
        return Err(error);
    }

    let self_ty = &input.self_ty;
    let (impl_generics, _, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        #input

        impl #impl_generics ::eventide::Subscriber for #self_ty #where_clause {
            fn handler_methods(&self) -> ::std::vec::Vec<::eventide::HandlerMethod> {
                ::std::vec![#(#descriptors),*]
            }

            fn as_any(&self) -> &dyn ::std::any::Any {
                self
            }
        }
    })
}

/// Implementation of the `#[subscriber]` attribute macro.
pub fn subscriber_impl(attr: TokenStream, item: TokenStream) -> TokenStream {
    parse_macro_input!(attr as Nothing);
    let input = parse_macro_input!(item as ItemImpl);

    match expand(input) {
        Ok(expanded) => TokenStream::from(expanded),
        Err(error) => error.to_compile_error().into(),
    }
}
