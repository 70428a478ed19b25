use convert_case::{Case, Casing};
use proc_macro::TokenStream;
use quote::{format_ident, quote};
use syn::{parse_macro_input, ItemFn, LitStr};

/// Registers the annotated factory fn in the global endpoints controller registry before `main` runs.
///
/// ```ignore
/// #[endpoints_controller("ipaddress")]
/// fn new_ip_address_controller(client: &ApiClient) -> Box<dyn EndpointsController> { ... }
/// ```
#[proc_macro_attribute]
pub fn endpoints_controller(attr: TokenStream, item: TokenStream) -> TokenStream {
    let name = parse_macro_input!(attr as LitStr);
    let input = parse_macro_input!(item as ItemFn);
    let factory = &input.sig.ident;

    let sanitized: String = name
        .value()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    if sanitized.trim_matches('_').is_empty() {
        return syn::Error::new(name.span(), "endpoints controller name must contain at least one alphanumeric character")
            .to_compile_error()
            .into();
    }

    let fn_name = format_ident!("register_{}_endpoints_controller", sanitized.to_case(Case::Snake));

    let expanded = quote! {
        #input

        #[ctor::ctor]
        fn #fn_name() {
            crate::domain::controller_registry::register(#name, #factory);
        }
    };

    expanded.into()
}
