//! Java source syntax: lexing, parsing, traversal, and canonical rendering.
//!
//! The parser builds an owned, immutable AST and recovers from syntax errors
//! with ECJ-shaped messages, so a single pass reports every problem it can.
//! Long same-operator binary chains may be flattened into combined nodes; the
//! visitor and renderer keep that compaction unobservable.

pub mod ast;
pub mod javadoc;
pub mod lexer;
pub mod literals;
pub mod parser;
pub mod render;
pub mod token;
pub mod trace;
pub mod visit;

pub use parser::{parse, ParseOutcome, ParserConfig};
pub use render::render_canonical;
pub use visit::{walk_unit, AstVisitor, BinaryRef, Descend, NodeRef, Scope};

#[cfg(test)]
mod tests;
