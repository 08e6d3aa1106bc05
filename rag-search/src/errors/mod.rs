pub mod rag_search_error;

pub use rag_search_error::RagSearchError;
