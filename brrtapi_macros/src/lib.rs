//! Derive support for `brrtapi::ApiType`.
//!
//! `#[derive(ApiType)]` works on two kinds of structs:
//!
//! - **Named-field structs** become body schemas. Every field is listed in
//!   declaration order under its wire name (`#[serde(rename)]` and
//!   `#[serde(rename_all)]` are honoured, `#[serde(skip)]` excludes it).
//!   Field tags `#[api(format = "..")]` and `#[api(example = "..")]` land in
//!   the field's schema metadata.
//! - **Newtypes** (`struct UserId(i64);`) become scalar parameters with the
//!   inner type's JSON shape. Container tags describe the parameter:
//!   `#[api(name = "id", required, description = "..", format = "..",
//!   location = "path")]`.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::meta::ParseNestedMeta;
use syn::{
    parse_macro_input, Attribute, Data, DeriveInput, Fields, LitBool, LitStr, Result as SynResult,
    Token,
};

#[derive(Default)]
struct ContainerArgs {
    name: Option<LitStr>,
    required: Option<bool>,
    description: Option<LitStr>,
    format: Option<LitStr>,
    location: Option<LitStr>,
    rename_all: Option<LitStr>,
}

#[derive(Default)]
struct FieldArgs {
    rename: Option<LitStr>,
    skip: bool,
    format: Option<LitStr>,
    example: Option<LitStr>,
}

/// Consume an attribute entry we do not care about (`default`, `with = ".."`,
/// `rename(serialize = "..")`, ...).
fn skip_meta(meta: &ParseNestedMeta) -> SynResult<()> {
    if meta.input.peek(Token![=]) {
        let _: syn::Expr = meta.value()?.parse()?;
    } else if meta.input.peek(syn::token::Paren) {
        meta.parse_nested_meta(|nested| skip_meta(&nested))?;
    }
    Ok(())
}

fn parse_container_args(attrs: &[Attribute]) -> SynResult<ContainerArgs> {
    let mut args = ContainerArgs::default();
    for attr in attrs {
        if attr.path().is_ident("api") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("name") {
                    args.name = Some(meta.value()?.parse()?);
                } else if meta.path.is_ident("required") {
                    args.required = Some(if meta.input.peek(Token![=]) {
                        meta.value()?.parse::<LitBool>()?.value
                    } else {
                        true
                    });
                } else if meta.path.is_ident("description") {
                    args.description = Some(meta.value()?.parse()?);
                } else if meta.path.is_ident("format") {
                    args.format = Some(meta.value()?.parse()?);
                } else if meta.path.is_ident("location") {
                    args.location = Some(meta.value()?.parse()?);
                } else {
                    return Err(meta.error("unsupported api attribute"));
                }
                Ok(())
            })?;
        } else if attr.path().is_ident("serde") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename_all") && meta.input.peek(Token![=]) {
                    args.rename_all = Some(meta.value()?.parse()?);
                    Ok(())
                } else {
                    skip_meta(&meta)
                }
            })?;
        }
    }
    Ok(args)
}

fn parse_field_args(attrs: &[Attribute]) -> SynResult<FieldArgs> {
    let mut args = FieldArgs::default();
    for attr in attrs {
        if attr.path().is_ident("serde") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename") && meta.input.peek(Token![=]) {
                    args.rename = Some(meta.value()?.parse()?);
                    Ok(())
                } else if meta.path.is_ident("skip") {
                    args.skip = true;
                    Ok(())
                } else {
                    skip_meta(&meta)
                }
            })?;
        } else if attr.path().is_ident("api") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("format") {
                    args.format = Some(meta.value()?.parse()?);
                } else if meta.path.is_ident("example") {
                    args.example = Some(meta.value()?.parse()?);
                } else {
                    return Err(meta.error("unsupported api field attribute"));
                }
                Ok(())
            })?;
        }
    }
    Ok(args)
}

fn split_words(name: &str) -> Vec<String> {
    name.split('_')
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Apply a serde `rename_all` rule to a snake_case field name.
fn apply_rename_rule(rule: &LitStr, field: &str) -> SynResult<String> {
    let words = split_words(field);
    let renamed = match rule.value().as_str() {
        "lowercase" => field.to_lowercase(),
        "UPPERCASE" => field.to_uppercase(),
        "snake_case" => field.to_string(),
        "SCREAMING_SNAKE_CASE" => field.to_uppercase(),
        "kebab-case" => field.replace('_', "-"),
        "SCREAMING-KEBAB-CASE" => field.replace('_', "-").to_uppercase(),
        "PascalCase" => words.iter().map(|w| capitalize(w)).collect(),
        "camelCase" => words
            .iter()
            .enumerate()
            .map(|(i, w)| if i == 0 { w.clone() } else { capitalize(w) })
            .collect(),
        other => {
            return Err(syn::Error::new(
                rule.span(),
                format!("unsupported rename_all rule `{other}`"),
            ))
        }
    };
    Ok(renamed)
}

fn opt_lit(value: &Option<LitStr>) -> TokenStream2 {
    match value {
        Some(lit) => quote! { ::std::option::Option::Some(#lit) },
        None => quote! { ::std::option::Option::None },
    }
}

fn capability_methods(ident_str: &str, args: &ContainerArgs) -> SynResult<TokenStream2> {
    let mut methods = TokenStream2::new();

    if args.name.is_some() || args.required.is_some() || args.description.is_some() {
        let name = args
            .name
            .as_ref()
            .map(LitStr::value)
            .unwrap_or_else(|| ident_str.to_string());
        let required = args.required.unwrap_or(false);
        let description = args
            .description
            .as_ref()
            .map(LitStr::value)
            .unwrap_or_default();
        methods.extend(quote! {
            fn param_spec() -> ::std::option::Option<::brrtapi::ParamSpec> {
                ::std::option::Option::Some(::brrtapi::ParamSpec {
                    name: ::std::string::String::from(#name),
                    required: #required,
                    description: ::std::string::String::from(#description),
                })
            }
        });
    }

    if let Some(format) = &args.format {
        methods.extend(quote! {
            fn format() -> ::std::option::Option<::std::string::String> {
                ::std::option::Option::Some(::std::string::String::from(#format))
            }
        });
    }

    if let Some(location) = &args.location {
        let variant = match location.value().as_str() {
            "path" => quote! { Path },
            "query" => quote! { Query },
            "header" => quote! { Header },
            "cookie" => quote! { Cookie },
            other => {
                return Err(syn::Error::new(
                    location.span(),
                    format!("unknown parameter location `{other}` (expected path, query, header or cookie)"),
                ))
            }
        };
        methods.extend(quote! {
            fn location() -> ::std::option::Option<::brrtapi::ParamIn> {
                ::std::option::Option::Some(::brrtapi::ParamIn::#variant)
            }
        });
    }

    Ok(methods)
}

fn expand(input: DeriveInput) -> SynResult<TokenStream2> {
    let ident = &input.ident;
    let ident_str = ident.to_string();
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let container = parse_container_args(&input.attrs)?;
    let capabilities = capability_methods(&ident_str, &container)?;

    let data = match &input.data {
        Data::Struct(data) => data,
        _ => {
            return Err(syn::Error::new_spanned(
                ident,
                "ApiType can only be derived for structs",
            ))
        }
    };

    let body = match &data.fields {
        Fields::Named(named) => {
            let mut defs = Vec::new();
            for field in &named.named {
                let args = parse_field_args(&field.attrs)?;
                if args.skip {
                    continue;
                }
                let Some(field_ident) = field.ident.as_ref() else {
                    continue;
                };
                let declared = field_ident.to_string();
                let declared = declared.trim_start_matches("r#").to_string();
                let rename = match (&args.rename, &container.rename_all) {
                    (Some(lit), _) => Some(lit.value()),
                    (None, Some(rule)) => Some(apply_rename_rule(rule, &declared)?),
                    (None, None) => None,
                };
                let rename = match rename {
                    Some(name) => quote! { ::std::option::Option::Some(#name) },
                    None => quote! { ::std::option::Option::None },
                };
                let format = opt_lit(&args.format);
                let example = opt_lit(&args.example);
                let ty = &field.ty;
                defs.push(quote! {
                    ::brrtapi::FieldDef {
                        name: #declared,
                        rename: #rename,
                        format: #format,
                        example: #example,
                        ty: ::brrtapi::TypeDescriptor::of::<#ty>,
                    }
                });
            }
            quote! {
                fn shape() -> ::brrtapi::TypeShape {
                    ::brrtapi::TypeShape::Struct
                }

                fn fields() -> ::std::vec::Vec<::brrtapi::FieldDef> {
                    ::std::vec![#(#defs),*]
                }
            }
        }
        Fields::Unnamed(unnamed) if unnamed.unnamed.len() == 1 => {
            let inner = &unnamed.unnamed[0].ty;
            quote! {
                fn shape() -> ::brrtapi::TypeShape {
                    <#inner as ::brrtapi::ApiType>::shape()
                }
            }
        }
        _ => {
            return Err(syn::Error::new_spanned(
                ident,
                "ApiType requires named fields or a single-field newtype",
            ))
        }
    };

    Ok(quote! {
        impl #impl_generics ::brrtapi::ApiType for #ident #ty_generics #where_clause {
            fn type_name() -> &'static str {
                #ident_str
            }

            #body

            #capabilities
        }
    })
}

#[proc_macro_derive(ApiType, attributes(api, serde))]
pub fn derive_api_type(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(input) {
        Ok(tokens) => TokenStream::from(tokens),
        Err(err) => TokenStream::from(err.to_compile_error()),
    }
}
