//! # Loupe Derive Macros
//!
//! This crate provides `#[derive(Inspect)]` for `loupe`. It generates the
//! static member layout of a type and the indexed member accessor the walker
//! and the type formatter read through, so no runtime reflection is needed.
//!
//! Compatible with `syn 2.0`.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{
    Attribute, Data, DataEnum, DataStruct, DeriveInput, Fields, Generics, Ident, LitStr, Member,
    Path, Variant, parse_macro_input, parse_quote,
};

/// Derives `loupe::Inspect`.
///
/// Container attributes: `#[inspect(rename = "..")]`, `#[inspect(display)]`,
/// `#[inspect(flags)]` and `#[inspect(flags = "Path")]`.
/// Field attributes: `#[inspect(skip)]`, `#[inspect(rename = "..")]` and
/// `#[inspect(with = "path")]`. Fields marked `#[deprecated]` are left out.
#[proc_macro_derive(Inspect, attributes(inspect))]
pub fn derive_inspect(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(input) {
        Ok(tokens) => tokens.into(),
        Err(e) => e.to_compile_error().into(),
    }
}

fn expand(input: DeriveInput) -> syn::Result<TokenStream2> {
    let opts = ContainerOpts::parse(&input.attrs)?;
    let name = &input.ident;
    let display_name = opts.rename.clone().unwrap_or_else(|| name.to_string());
    let generics = add_bounds(input.generics.clone());

    match &input.data {
        Data::Struct(ds) => match &opts.flags_table {
            Some(table) => generate_flags_newtype(name, &generics, ds, table, &display_name),
            None => generate_struct(name, &generics, ds, &opts, &display_name),
        },
        Data::Enum(de) if de.variants.iter().all(|v| matches!(v.fields, Fields::Unit)) => {
            generate_fieldless_enum(name, de, &opts, &display_name)
        }
        Data::Enum(de) => generate_data_enum(name, &generics, de, &opts, &display_name),
        Data::Union(_) => Err(syn::Error::new(
            name.span(),
            "Inspect cannot be derived for unions",
        )),
    }
}

// --- Attribute Parsing ---

#[derive(Default)]
struct ContainerOpts {
    rename: Option<String>,
    display: bool,
    flags: bool,
    flags_table: Option<Path>,
}

impl ContainerOpts {
    fn parse(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut opts = Self::default();
        for attr in attrs {
            if !attr.path().is_ident("inspect") {
                continue;
            }
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename") {
                    let s: LitStr = meta.value()?.parse()?;
                    opts.rename = Some(s.value());
                    return Ok(());
                }

                if meta.path.is_ident("display") {
                    opts.display = true;
                    return Ok(());
                }

                if meta.path.is_ident("flags") {
                    opts.flags = true;
                    if meta.input.peek(syn::Token![=]) {
                        let s: LitStr = meta.value()?.parse()?;
                        opts.flags_table = Some(s.parse()?);
                    }
                    return Ok(());
                }
                Err(meta.error(
                    "Unknown inspect attribute key. Supported: rename, display, flags",
                ))
            })?;
        }
        Ok(opts)
    }
}

#[derive(Default)]
struct FieldOpts {
    skip: bool,
    rename: Option<String>,
    with: Option<Path>,
}

impl FieldOpts {
    fn parse(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut opts = Self::default();
        for attr in attrs {
            // Obsolete members never render.
            if attr.path().is_ident("deprecated") {
                opts.skip = true;
                continue;
            }
            if !attr.path().is_ident("inspect") {
                continue;
            }
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("skip") {
                    opts.skip = true;
                    return Ok(());
                }

                if meta.path.is_ident("rename") {
                    let s: LitStr = meta.value()?.parse()?;
                    opts.rename = Some(s.value());
                    return Ok(());
                }

                if meta.path.is_ident("with") {
                    let s: LitStr = meta.value()?.parse()?;
                    opts.with = Some(s.parse()?);
                    return Ok(());
                }
                Err(meta.error("Unknown inspect attribute key. Supported: skip, rename, with"))
            })?;
        }
        Ok(opts)
    }
}

/// A member kept in the layout.
struct MemberField {
    member: Member,
    label: String,
    with: Option<Path>,
}

fn collect_members(fields: &Fields) -> syn::Result<Vec<MemberField>> {
    let mut members = Vec::new();
    for (i, field) in fields.iter().enumerate() {
        let opts = FieldOpts::parse(&field.attrs)?;
        if opts.skip {
            continue;
        }
        let member = match &field.ident {
            Some(ident) => Member::Named(ident.clone()),
            None => Member::Unnamed(i.into()),
        };
        let label = opts.rename.unwrap_or_else(|| match &member {
            Member::Named(ident) => ident.to_string(),
            Member::Unnamed(index) => index.index.to_string(),
        });
        members.push(MemberField {
            member,
            label,
            with: opts.with,
        });
    }
    Ok(members)
}

fn add_bounds(mut generics: Generics) -> Generics {
    for param in generics.type_params_mut() {
        param.bounds.push(parse_quote!(::loupe::Inspect));
    }
    generics
}

// --- Generators ---

fn layout_kind(fields: &Fields) -> TokenStream2 {
    match fields {
        Fields::Named(_) => quote! { ::loupe::LayoutKind::Struct },
        Fields::Unnamed(_) => quote! { ::loupe::LayoutKind::Tuple },
        Fields::Unit => quote! { ::loupe::LayoutKind::Unit },
    }
}

fn static_layout(display_name: &str, kind: &TokenStream2, members: &[MemberField], custom_text: bool) -> TokenStream2 {
    let labels = members.iter().map(|m| &m.label);
    quote! {
        static LAYOUT: ::loupe::Layout = ::loupe::Layout {
            name: #display_name,
            kind: #kind,
            members: &[#(#labels),*],
            custom_text: #custom_text,
        };
        ::core::option::Option::Some(&LAYOUT)
    }
}

/// Hands `binding` (an expression of type `&Field`) to `visit`, through the
/// getter when one is configured.
fn visit_member(binding: TokenStream2, with: Option<&Path>) -> TokenStream2 {
    match with {
        Some(getter) => quote! {
            match #getter(#binding) {
                ::core::result::Result::Ok(value) => {
                    visit(::core::result::Result::Ok(&value as &dyn ::loupe::Inspect))
                }
                ::core::result::Result::Err(err) => visit(::core::result::Result::Err(err)),
            }
        },
        None => quote! {
            visit(::core::result::Result::Ok(#binding as &dyn ::loupe::Inspect))
        },
    }
}

fn custom_text_fn(display: bool) -> TokenStream2 {
    if display {
        quote! {
            fn custom_text(&self) -> ::core::option::Option<::std::string::String> {
                ::core::option::Option::Some(::std::string::ToString::to_string(self))
            }
        }
    } else {
        quote! {}
    }
}

fn generate_struct(
    name: &Ident,
    generics: &Generics,
    ds: &DataStruct,
    opts: &ContainerOpts,
    display_name: &str,
) -> syn::Result<TokenStream2> {
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();
    let members = collect_members(&ds.fields)?;
    let layout = static_layout(display_name, &layout_kind(&ds.fields), &members, opts.display);

    let arms = members.iter().enumerate().map(|(i, m)| {
        let member = &m.member;
        let body = visit_member(quote! { &self.#member }, m.with.as_ref());
        quote! { #i => { #body } }
    });
    let custom_text = custom_text_fn(opts.display);

    Ok(quote! {
        impl #impl_generics ::loupe::Inspect for #name #ty_generics #where_clause {
            fn layout(&self) -> ::core::option::Option<&'static ::loupe::Layout> {
                #layout
            }

            fn member(&self, index: usize, visit: &mut ::loupe::VisitMember<'_>) {
                match index {
                    #(#arms)*
                    _ => {}
                }
            }

            #custom_text
        }
    })
}

/// Integer newtype rendered as a flags enumeration over another enum's table.
fn generate_flags_newtype(
    name: &Ident,
    generics: &Generics,
    ds: &DataStruct,
    table: &Path,
    display_name: &str,
) -> syn::Result<TokenStream2> {
    if ds.fields.len() != 1 || !matches!(ds.fields, Fields::Unnamed(_)) {
        return Err(syn::Error::new(
            name.span(),
            "#[inspect(flags = \"..\")] requires a single-field tuple struct",
        ));
    }
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();
    Ok(quote! {
        impl #impl_generics ::loupe::Inspect for #name #ty_generics #where_clause {
            fn as_scalar(&self) -> ::core::option::Option<::loupe::Result<::loupe::Scalar<'_>>> {
                ::core::option::Option::Some(::core::result::Result::Ok(
                    ::loupe::rt::enum_scalar::<#table>(
                        #display_name,
                        ::loupe::rt::FlagBits::flag_bits(self.0),
                        true,
                    ),
                ))
            }
        }
    })
}

fn variant_label(variant: &Variant) -> syn::Result<String> {
    let opts = ContainerOpts::parse(&variant.attrs)?;
    Ok(opts.rename.unwrap_or_else(|| variant.ident.to_string()))
}

fn generate_fieldless_enum(
    name: &Ident,
    de: &DataEnum,
    opts: &ContainerOpts,
    display_name: &str,
) -> syn::Result<TokenStream2> {
    let idents: Vec<&Ident> = de.variants.iter().map(|v| &v.ident).collect();
    let labels = de
        .variants
        .iter()
        .map(variant_label)
        .collect::<syn::Result<Vec<_>>>()?;
    let flags = opts.flags;
    // Fieldless enums are atomic, so a Display form replaces the table rendering.
    let scalar = if opts.display {
        quote! {
            ::loupe::Scalar::Text(::std::borrow::Cow::Owned(::std::string::ToString::to_string(self)))
        }
    } else {
        quote! {
            ::loupe::rt::enum_scalar::<Self>(
                <Self as ::loupe::rt::EnumTable>::NAME,
                match *self {
                    #(Self::#idents => Self::#idents as i128,)*
                },
                #flags,
            )
        }
    };

    Ok(quote! {
        impl ::loupe::rt::EnumTable for #name {
            const NAME: &'static str = #display_name;
            const VARIANTS: &'static [(&'static str, i128)] = &[
                #((#labels, #name::#idents as i128)),*
            ];
        }

        impl ::loupe::Inspect for #name {
            fn as_scalar(&self) -> ::core::option::Option<::loupe::Result<::loupe::Scalar<'_>>> {
                ::core::option::Option::Some(::core::result::Result::Ok(#scalar))
            }
        }
    })
}

fn generate_data_enum(
    name: &Ident,
    generics: &Generics,
    de: &DataEnum,
    opts: &ContainerOpts,
    display_name: &str,
) -> syn::Result<TokenStream2> {
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();
    let binding = format_ident!("__loupe_field");

    let mut layout_arms = Vec::new();
    let mut member_arms = Vec::new();
    for variant in &de.variants {
        let ident = &variant.ident;
        let label = format!("{display_name}::{}", variant_label(variant)?);
        let members = collect_members(&variant.fields)?;
        let layout = static_layout(&label, &layout_kind(&variant.fields), &members, opts.display);
        layout_arms.push(quote! {
            Self::#ident { .. } => { #layout }
        });

        for (i, m) in members.iter().enumerate() {
            let member = &m.member;
            let body = visit_member(quote! { #binding }, m.with.as_ref());
            member_arms.push(quote! {
                (Self::#ident { #member: #binding, .. }, #i) => { #body }
            });
        }
    }
    let custom_text = custom_text_fn(opts.display);

    Ok(quote! {
        impl #impl_generics ::loupe::Inspect for #name #ty_generics #where_clause {
            fn layout(&self) -> ::core::option::Option<&'static ::loupe::Layout> {
                match self {
                    #(#layout_arms)*
                }
            }

            fn member(&self, index: usize, visit: &mut ::loupe::VisitMember<'_>) {
                match (self, index) {
                    #(#member_arms)*
                    _ => {}
                }
            }

            #custom_text
        }
    })
}
