//! Index construction and read-only access.
//!
//! The index is built exactly once per run and is immutable afterwards:
//! [`builder::IndexBuilder`] consumes the corpus and hands out a single
//! [`package::IndexPackage`] that every query evaluator shares read-only.

pub mod builder;
pub mod package;

pub use builder::{IndexBuilder, IndexBuilderConfig};
pub use package::{IndexPackage, TermKey};
