use quote::quote;
use syn::{AngleBracketedGenericArguments, GenericArgument, Path, PathArguments, Type, TypePath};

pub fn inner_of_option(ty: &Type) -> Option<&Type> {
    let Type::Path(TypePath { path, .. }) = ty else {
        return None;
    };
    let is_option_path = match path.segments.len() {
        1 => path.segments[0].ident == "Option",
        3 => {
            (path.segments[0].ident == "std" || path.segments[0].ident == "core")
                && path.segments[1].ident == "option"
                && path.segments[2].ident == "Option"
        }
        _ => false,
    };
    if !is_option_path {
        return None;
    }

    if let Some(seg) = path.segments.last()
        && let PathArguments::AngleBracketed(AngleBracketedGenericArguments { args, .. }) =
            &seg.arguments
        && let Some(GenericArgument::Type(t)) = args.first()
    {
        return Some(t);
    }
    None
}

/// Builds the expression that turns `raw: String` into the field value.
/// `Option<T>` fields parse as `T` and are stored as `Some`.
pub fn build_cli_parse_expr(ty: &Type, parse_with: Option<&Path>) -> proc_macro2::TokenStream {
    let (target, optional) = match inner_of_option(ty) {
        Some(inner) => (inner, true),
        None => (ty, false),
    };

    let parsed = if let Some(parse_with) = parse_with {
        quote! { #parse_with(&raw)? }
    } else {
        quote! {
            raw.trim().parse::<#target>()
                .map_err(|e| crate::Error::invalid_input(format!(
                    "Invalid value for --{name}: {raw} ({e})"
                )))?
        }
    };

    if optional {
        quote! { Some(#parsed) }
    } else {
        parsed
    }
}

pub fn to_kebab_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for (idx, ch) in s.chars().enumerate() {
        if ch.is_ascii_uppercase() {
            if idx != 0 {
                out.push('-');
            }
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}
