use proc_macro::TokenStream;
use quote::quote;
use syn::{ItemFn, LitStr, ReturnType, parse_macro_input};

pub fn timer_inner(attr: TokenStream, item: TokenStream) -> TokenStream {
    let label = parse_macro_input!(attr as LitStr);
    let ItemFn {
        attrs,
        vis,
        sig,
        block,
    } = parse_macro_input!(item as ItemFn);

    if sig.asyncness.is_some() {
        return syn::Error::new_spanned(sig.fn_token, "timer does not support async fns")
            .to_compile_error()
            .into();
    }

    let output = match &sig.output {
        ReturnType::Default => quote! { () },
        ReturnType::Type(_, ty) => quote! { #ty },
    };

    let expanded = quote! {
        #(#attrs)*
        #vis #sig {
            let __timer_start = std::time::Instant::now();
            #[allow(clippy::redundant_closure_call)]
            let __timer_result = (|| -> #output #block)();
            log::debug!(
                "{}: elapsed={:.3}s",
                #label,
                __timer_start.elapsed().as_secs_f64()
            );
            __timer_result
        }
    };

    TokenStream::from(expanded)
}
