//! Hybrid retrieval: weighted rank fusion of the lexical index and the
//! embedding store, plus the retrieval evaluation harness.

pub mod eval;
pub mod fusion;
pub mod retriever;

pub use fusion::{fuse, FusedRanking, FusionWeights};
pub use retriever::HybridRetriever;
