//! Azure AI Search integration.
//!
//! Public API:
//! - `retriever::DocumentRetriever`: never-failing context retrieval for the
//!   RAG pipeline (retry-wrapped search, fixed fallback sentinels).
//! - `indexer::IndexAdmin`: index schema management and bulk document upload
//!   for the setup CLI.

pub mod config;
pub mod errors;
pub mod flatten;
pub mod indexer;
pub mod retriever;
pub mod search_client;

pub use config::SearchConfig;
pub use retriever::DocumentRetriever;
pub use search_client::SearchBackend;
