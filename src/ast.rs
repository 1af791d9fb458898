//! # ClassAd Language - Abstract Syntax Tree
//!
//! This module defines the Abstract Syntax Tree (AST) for the ClassAd
//! language: a semi-structured attribute/expression language describing jobs
//! and machines so that two descriptions can be matched symmetrically.
//!
//! ## Architecture Overview
//!
//! The AST module is organized into focused submodules:
//!
//! - **[tokens]** - Lexical tokens produced by the lexer
//! - **[expressions]** - Expression nodes (literals, references, operations, records)
//! - **[operators]** - Binary and unary operators, attribute scopes
//!
//! The record type itself lives in [`crate::classad`], since records are both
//! AST nodes (nested literals) and the unit of evaluation.
//!
//! ## Quick Start
//!
//! ```text
//! [
//!     Cpus = 2;
//!     Memory = 2048;
//!     Requirements = TARGET.Cpus >= MY.Cpus && TARGET.Memory >= Memory
//! ]
//! ```
//!
//! ## Core Concepts
//!
//! ### Records
//!
//! A record is an ordered list of `name = expression` bindings enclosed in
//! brackets and separated by semicolons. Re-binding a name replaces the
//! earlier expression.
//!
//! ### Scopes
//!
//! - **unscoped** `Cpus` - the owning record, then TARGET inside a match
//! - **`MY.Cpus`** - always the owning record
//! - **`TARGET.Cpus`** - the record on the other side of a match
//! - **`PARENT.Cpus`** - the record enclosing a nested record
//!
//! ### Undefined and Error
//!
//! Missing attributes evaluate to `undefined`; failed evaluations to `error`.
//! Both absorb through most operators. Only `is`/`isnt` and the type
//! predicates look at them directly.
//!
//! ## Examples
//!
//! ### Fallbacks
//!
//! ```text
//! Memory ?: 1024
//! ```
//!
//! ### Nested records and lists
//!
//! ```text
//! [Slots = {[Id = 1], [Id = 2]}; First = Slots[0].Id]
//! ```
pub mod expressions;
pub mod operators;
pub mod tokens;

pub use expressions::Expr;
pub use operators::{BinOp, Scope, UnaryOp};
pub use tokens::Token;
