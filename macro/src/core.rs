use parsing::{SID_REVISION, SidComponents};
use proc_macro_crate::{Error as MacroCrateError, FoundCrate, crate_name};
use proc_macro2::{Span, TokenStream};
use quote::quote;
use syn::LitStr;

pub fn sid_impl(input: &LitStr) -> Result<TokenStream, syn::Error> {
    let components: SidComponents = input
        .value()
        .parse()
        .map_err(|e| syn::Error::new_spanned(input, e))?;
    if components.revision != SID_REVISION {
        return Err(syn::Error::new_spanned(
            input,
            format!("unsupported SID revision {}, only 1 is defined", components.revision),
        ));
    }
    let sub_authority = components.sub_authority.as_slice();
    let authority = components.identifier_authority;
    let root = crate_root("win-security-descriptor").map_err(|err| {
        syn::Error::new(Span::call_site(), format!("Root crate not found:{err}"))
    })?;

    let expanded = quote! {
        #root::SecurityIdentifier::from_array(
            #root::SidIdentifierAuthority::new([#(#authority),*]),
            [#(#sub_authority),*]
        )
    };
    Ok(expanded)
}

fn crate_root(name: &str) -> Result<TokenStream, MacroCrateError> {
    crate_name(name).map(|found| root_path(found, name))
}

fn root_path(found: FoundCrate, name: &str) -> TokenStream {
    let ident = match found {
        FoundCrate::Name(found_name) => found_name,
        // The root crate aliases itself under its own name so expansions in
        // its doctests and unit tests resolve the same path.
        FoundCrate::Itself => name.replace('-', "_"),
    };
    let ident = syn::Ident::new(&ident, Span::call_site());
    quote!(::#ident)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "Unwrap is not an issue in test")]
mod tests {
    use super::*;

    fn lit(value: &str) -> LitStr {
        LitStr::new(value, Span::call_site())
    }

    #[test]
    fn rejects_malformed_literal() {
        let err = sid_impl(&lit("S-1-5-abc")).unwrap_err();
        assert_eq!(err.to_string(), "invalid format for SID string");
    }

    #[test]
    fn root_path_inside_the_root_crate_is_absolute() {
        let root = root_path(FoundCrate::Itself, "win-security-descriptor").to_string();
        assert_eq!(root.replace(' ', ""), "::win_security_descriptor");
    }

    #[test]
    fn root_path_follows_renamed_dependency() {
        let root = root_path(FoundCrate::Name("sd".to_owned()), "win-security-descriptor").to_string();
        assert_eq!(root.replace(' ', ""), "::sd");
    }

    #[test]
    fn rejects_other_revisions() {
        let err = sid_impl(&lit("S-2-5-32")).unwrap_err();
        assert!(err.to_string().contains("revision 2"), "unexpected error: {err}");
    }
}
