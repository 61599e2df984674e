//! Token-sequence to node-tree construction

mod builder;
mod node;
mod rules;
mod scan;

pub use builder::build;
pub use node::{AstNode, NodeTag, SyntaxTree, TokenSpan};
