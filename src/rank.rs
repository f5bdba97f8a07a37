//! Candidate ranking: lexical scoring with a budgeted semantic refinement.
//!
//! Every candidate gets a lexical score from the index statistics; only a
//! fixed-size top slice additionally gets the expensive embedding cosine
//! signal. The resulting order is total and reproducible.

pub mod lexical;
pub mod ranker;
pub mod semantic;

pub use lexical::{Bm25Params, RankMethod, lexical_score};
pub use ranker::{RankedResult, Ranker, RankerConfig};
pub use semantic::{PrecomputedVectors, SemanticProvider, cosine_similarity};
