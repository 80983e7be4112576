#![allow(
    clippy::missing_inline_in_public_items,
    reason = "Not an issue in a macro crate"
)]
//! Procedural macro for compile-time Windows Security Identifier (SID) literals.
//!
//! Use it through the `win-security-descriptor` crate, which re-exports it.
mod core;
use core::sid_impl;
use proc_macro::TokenStream;

use syn::{LitStr, parse_macro_input};

/// Parses a SID string such as `"S-1-5-32-544"` at compile time and expands
/// to a `const`-evaluable `SecurityIdentifier`.
///
/// Malformed strings, revisions other than 1 and more than 15
/// sub-authorities are compile errors.
#[proc_macro]
pub fn sid(input: TokenStream) -> TokenStream {
    let lit = parse_macro_input!(input as LitStr);
    match sid_impl(&lit) {
        Ok(token_stream) => token_stream,
        Err(err) => err.to_compile_error(),
    }
    .into()
}
