#![allow(clippy::needless_return)]

//! Test helpers for the parser: `assert_parse_node!("text", func (args))`
//! calls `parser.parse_func(args)` and expects the whole text consumed,
//! `assert_parse_error!("text", func (args), Kind)` expects an error of
//! that `ErrorKind`.

use proc_macro2::{Delimiter, Ident, Literal, TokenStream, TokenTree};
use proc_macro_error::{abort, abort_call_site, proc_macro_error};
use quote::{quote, ToTokens};

/// The source text, which must be a string literal.
fn expect_text(tt: Option<TokenTree>) -> Literal {
    let tt = tt.unwrap_or_else(|| abort_call_site!("must pass text and ident for parsing func"));
    let TokenTree::Literal(text) = tt else {
        abort!(tt, "first value must be string literal");
    };
    if let Err(e) = syn::parse2::<syn::LitStr>(text.to_token_stream()) {
        abort!(text, "first value must be string literal: {}", e);
    }
    return text;
}

fn expect_comma(tt: Option<TokenTree>) {
    let tt = tt.unwrap_or_else(|| abort_call_site!("must pass arguments seperated by comma"));
    match &tt {
        TokenTree::Punct(p) if p.as_char() == ',' => {}
        _ => abort!(tt, "expected comma"),
    }
}

fn expect_ident(tt: Option<TokenTree>, what: &str) -> Ident {
    let tt = tt.unwrap_or_else(|| abort_call_site!("expected {}", what));
    let TokenTree::Ident(id) = tt else {
        abort!(tt, "expected {}", what);
    };
    return id;
}

/// `func` becomes `parse_func`.
fn parse_fun(id: &Ident) -> Ident {
    return Ident::new(&format!("parse_{}", id), id.span());
}

fn group_args(tt: &TokenTree) -> Option<TokenStream> {
    match tt {
        TokenTree::Group(g) if g.delimiter() == Delimiter::Parenthesis => Some(g.stream()),
        TokenTree::Group(g) => abort!(g, "arguments for parse func must be parenthesis delimited"),
        _ => None,
    }
}

#[proc_macro_error]
#[proc_macro]
pub fn assert_parse_node(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let mut i = proc_macro2::TokenStream::from(input).into_iter();

    let text = expect_text(i.next());
    expect_comma(i.next());
    let fun = parse_fun(&expect_ident(i.next(), "parse func ident"));

    let args = match i.next() {
        Some(tt) => group_args(&tt).unwrap_or_else(|| {
            abort!(tt, "when including arguments for parse func, must be parenthesis delimited group")
        }),
        None => quote!(),
    };
    if let Some(tt) = i.next() {
        abort!(tt, "unexpected tokens after parse func");
    }

    return quote!(assert_node(#text, |parser: &mut Parser| parser.#fun(#args))).into();
}

#[proc_macro_error]
#[proc_macro]
pub fn assert_parse_error(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let mut i = proc_macro2::TokenStream::from(input).into_iter();

    let text = expect_text(i.next());
    expect_comma(i.next());
    let fun = parse_fun(&expect_ident(i.next(), "parse func ident"));

    let tt = i
        .next()
        .unwrap_or_else(|| abort_call_site!("must pass comma-seperated text, parsing func ident, error kind"));
    let args = match group_args(&tt) {
        Some(args) => {
            expect_comma(i.next());
            args
        }
        None => {
            expect_comma(Some(tt));
            quote!()
        }
    };

    let kind = expect_ident(i.next(), "error kind");
    return quote!(assert_error(#text, |parser: &mut Parser| parser.#fun(#args), ErrorKind::#kind)).into();
}
