pub mod css_error;
pub mod css_parser;
mod css_value_parser;

pub use css_parser::Parser;
