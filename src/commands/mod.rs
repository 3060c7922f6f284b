//! Command implementations for the CLI
//!
//! - generate: Build and write the newsletter
//! - test: Check configuration and template validity

pub mod generate;
pub mod test;
