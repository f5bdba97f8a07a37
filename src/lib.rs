//! # Calluna
//!
//! A batch document-retrieval engine: build an inverted index once from a
//! fixed corpus, then classify, evaluate, and rank a fixed set of queries
//! against it.
//!
//! ## Features
//!
//! - Unified in-memory index: postings, position lists, and a character
//!   n-gram index for wildcard expansion
//! - Boolean queries with `AND`/`OR`/`NOT`, parentheses, and quoted phrases
//! - `*` wildcard patterns resolved through n-gram pre-filtering
//! - `NEAR/k` proximity with term and phrase operands
//! - Natural-language queries converted to boolean disjunctions
//! - BM25/TF-IDF ranking with a budgeted embedding cosine refinement

// Core modules
pub mod document;
mod engine;
mod error;
pub mod index;
pub mod query;
pub mod rank;

// Re-exports for the public API
pub use document::{DocId, Document};
pub use engine::{QueryOutput, QueryRecord, SearchEngine, SearchEngineConfig};
pub use error::{CallunaError, Result};
pub use index::{IndexBuilder, IndexBuilderConfig, IndexPackage, TermKey};
pub use query::{QueryType, convert_natural_language, detect_query_type, process_query};
pub use rank::{
    Bm25Params, PrecomputedVectors, RankMethod, RankedResult, Ranker, RankerConfig,
    SemanticProvider,
};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
