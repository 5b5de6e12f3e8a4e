//! Shared vocabulary for the Groove crates: byte spans, line indexing,
//! Groovy token kinds and lexer errors.

pub mod error;
pub mod span;
pub mod token;
