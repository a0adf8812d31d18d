//! # Formula Language - Abstract Syntax Tree
//!
//! This module defines the tokens and syntax tree of the formula language,
//! a small expression language that host applications embed so that users
//! can write formulas evaluated against runtime bindings.
//!
//! ## Architecture Overview
//!
//! - **[tokens]** - Lexical tokens produced by the lexer
//! - **[expressions]** - The closed set of expression nodes
//! - **[operators]** - Binary and unary operators
//! - **[visitor]** - Double-dispatch contract for tree consumers
//!
//! ## Quick Start
//!
//! ```text
//! [unit price] * quantity > 100 ? 'bulk' : 'retail'
//! ```
//!
//! ## Precedence
//!
//! Lowest to highest:
//!
//! | Level | Operators | Associativity |
//! |---|---|---|
//! | ternary | `? :` | - |
//! | logical or | `\|\|` `or` | right |
//! | logical and | `&&` `and` | right |
//! | bitwise or | `\|` | left |
//! | bitwise xor | `^` | left |
//! | bitwise and | `&` | left |
//! | equality | `==` `=` `!=` `<>` | left |
//! | relational | `<` `<=` `>` `>=` `in` | left |
//! | shift | `<<` `>>` | left |
//! | additive | `+` `-` | left |
//! | multiplicative | `*` `/` `%` | left |
//! | unary | `!` `not` `~` `-` | prefix |
//!
//! ## Calls
//!
//! A call never evaluates its arguments up front. The host's function hook
//! or the builtin decides which arguments to evaluate and in which order,
//! which is what lets `in(x, a, b)` stop at the first match.
pub mod expressions;
pub mod operators;
pub mod tokens;
pub mod visitor;

pub use expressions::Expr;
pub use operators::{BinOp, UnaryOp};
pub use tokens::{Token, TokenKind};
pub use visitor::Visitor;
