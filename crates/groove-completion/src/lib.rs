//! Groove completion: context-sensitive code completion for Groovy sources.
//!
//! A request runs through a fixed pipeline:
//!
//! 1. [`patch`] copies the document and inserts a dummy identifier at the
//!    cursor so that the incomplete code parses around it.
//! 2. [`classify`] matches the position against an ordered registry of
//!    context patterns and picks every strategy that applies.
//! 3. [`strategy`] implementations ask a [`resolve::SymbolResolver`] for
//!    symbols, narrowing expected types through [`narrow`] for smart
//!    completion, and push candidates into a [`sink::CompletionResultSink`].
//! 4. Once the user picks a candidate, [`insert`] turns it into edits of the
//!    original, unpatched document.
//!
//! [`engine::CompletionEngine`] wires the steps together.

pub mod classify;
pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod index;
pub mod insert;
pub mod item;
pub mod narrow;
pub mod patch;
pub mod pattern;
pub mod resolve;
pub mod sink;
pub mod strategy;

pub use classify::Registry;
pub use config::{CompletionConfig, QualifyPolicy};
pub use context::{CompletionContext, CompletionRequest, Invocation};
pub use engine::CompletionEngine;
pub use error::GrooveError;
pub use index::{ClassIndex, FileResolver};
pub use insert::{DocumentEdit, TextEdit};
pub use item::{Candidate, CandidateKind, ClassRef, CompletionList, InsertPayload, TypeRef};
pub use patch::Patch;
