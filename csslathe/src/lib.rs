#![allow(clippy::needless_return)]
#![allow(clippy::new_without_default)]

//! A CSS parser keeping enough of the source to render it back:
//! comments, vendor prefixes, unknown at-rules and invalid values in
//! lenient mode all survive a parse/render round trip.

pub mod config;
pub mod logging;
pub mod nodes;
pub mod parser;
pub mod render;
pub mod tokenizer;
pub mod value;

pub use config::Settings;
pub use nodes::Document;
pub use parser::css_error::{ErrorKind, OutputError, ParseError};
pub use parser::Parser;
pub use render::OutputFormat;

/// Parses a whole stylesheet.
#[tracing::instrument(skip_all)]
pub fn parse(text: &str, settings: Settings) -> Result<Document, ParseError> {
    let mut parser = Parser::new(text, settings);
    return parser.parse_document();
}
