//! Pipeline configuration: raw YAML model, parsing, and validation.

pub mod bundle;
pub mod parser;
pub mod types;
pub mod validator;
