use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::quote;
use syn::{Data, DeriveInput, Fields, LitStr, parse_macro_input, spanned::Spanned};

/// Renders a struct as an aligned `key = value` block, one field per line.
///
/// `#[kv(fmt = "...")]` selects `display` (default), `len`, `path`, `opt` (an `Option`
/// printed as `-` when empty) or `skip`.
pub fn derive_kv_display_inner(item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    let struct_ident = input.ident.clone();

    let Data::Struct(data_struct) = &input.data else {
        return syn::Error::new(input.span(), "KvDisplay can only be derived for structs")
            .to_compile_error()
            .into();
    };

    let Fields::Named(fields) = &data_struct.fields else {
        return syn::Error::new(input.span(), "KvDisplay requires named fields")
            .to_compile_error()
            .into();
    };

    let mut keys = Vec::new();
    let mut writes = Vec::new();

    for field in &fields.named {
        let Some(field_ident) = &field.ident else {
            continue;
        };
        let mut key = field_ident.to_string();
        let mut fmt_mode = String::from("display");

        for attr in &field.attrs {
            if !attr.path().is_ident("kv") {
                continue;
            }
            let parse_result = attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("name") {
                    let lit: LitStr = meta.value()?.parse()?;
                    key = lit.value();
                    return Ok(());
                }
                if meta.path.is_ident("fmt") {
                    let lit: LitStr = meta.value()?.parse()?;
                    fmt_mode = lit.value();
                    return Ok(());
                }
                Err(meta.error("unsupported kv attribute; expected name/fmt"))
            });
            if let Err(err) = parse_result {
                return err.to_compile_error().into();
            }
        }

        let value = match fmt_mode.as_str() {
            "skip" => continue,
            "display" => quote! { write!(f, "{}", &self.#field_ident)?; },
            "len" => quote! { write!(f, "{}", self.#field_ident.len())?; },
            "path" => quote! { write!(f, "{}", self.#field_ident.display())?; },
            "opt" => quote! {
                match &self.#field_ident {
                    Some(value) => write!(f, "{value}")?,
                    None => f.write_str("-")?,
                }
            },
            other => {
                return syn::Error::new(field.span(), format!("unsupported kv fmt mode: {other}"))
                    .to_compile_error()
                    .into();
            }
        };
        keys.push(key);
        writes.push(value);
    }

    let longest = keys.iter().map(String::len).max().unwrap_or(0);
    let prefixes = keys
        .iter()
        .map(|key| {
            let padding = " ".repeat(longest - key.len());
            LitStr::new(&format!("\n\t{key}{padding} = "), Span::call_site())
        })
        .collect::<Vec<_>>();

    let expanded = quote! {
        impl std::fmt::Display for #struct_ident {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                #(
                    f.write_str(#prefixes)?;
                    #writes
                )*
                Ok(())
            }
        }
    };

    TokenStream::from(expanded)
}
