//! Filter expressions for coarse metadata filtering.
//!
//! Syntax:
//!   path=value               - value at path equals the literal
//!   path=value;path=value    - AND
//!
//! Paths use dot and bracket access, e.g. `histories[0].province=BC`.

mod ast;
mod lexer;
mod parser;
mod eval;

pub use ast::*;
pub use parser::parse_filter_expressions;
pub use eval::{FilterPredicate, evaluate_expression, filter_predicate, resolve_path};
