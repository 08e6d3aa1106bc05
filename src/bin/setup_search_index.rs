//! CLI: create or update the search index and bulk-upload JSON documents.
//!
//! ```bash
//! setup-search-index \
//!   --endpoint https://my-service.search.windows.net \
//!   --key "$AZURE_SEARCH_ADMIN_KEY" \
//!   --index-name career-docs \
//!   --docs-path ./docs/samples
//! ```

use std::{error::Error, fs, path::PathBuf, process};

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use rag_search::indexer::{IndexAdmin, IndexDocument, prepare_document};

#[derive(Debug, Parser)]
#[command(name = "setup-search-index")]
#[command(about = "Set up the AI Search index and upload documents")]
struct Args {
    /// Search service endpoint, e.g. https://your-search-service.search.windows.net
    #[arg(long)]
    endpoint: String,

    /// Search admin key
    #[arg(long)]
    key: String,

    /// Name of the search index to create/update
    #[arg(long)]
    index_name: String,

    /// Path to the directory containing JSON documents
    #[arg(long, default_value = "./docs/samples")]
    docs_path: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap();
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let args = Args::parse();

    // IndexAdmin::new rejects non-HTTP endpoints up front.
    let admin = IndexAdmin::new(&args.endpoint, &args.key, &args.index_name)?;
    admin.create_or_update_index().await?;

    let documents = collect_documents(&args.docs_path)?;
    if documents.is_empty() {
        warn!(path = %args.docs_path.display(), "no documents prepared for upload");
        return Ok(());
    }

    info!(count = documents.len(), index = %args.index_name, "uploading documents");
    let report = admin.upload_documents(&documents).await?;

    info!(
        succeeded = report.succeeded,
        total = report.total,
        "document upload completed"
    );
    for (key, message) in &report.failures {
        error!(key = %key, message = %message, "document upload failed");
    }

    if report.succeeded == 0 {
        process::exit(1);
    }
    Ok(())
}

/// Reads every `*.json` file under `dir`, skipping unparseable documents
/// with a logged error.
fn collect_documents(dir: &PathBuf) -> Result<Vec<IndexDocument>, Box<dyn Error>> {
    let mut documents = Vec::new();
    let mut entries: Vec<_> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    entries.sort();

    info!(count = entries.len(), path = %dir.display(), "found JSON documents");

    for path in entries {
        match prepare_document(&path) {
            Ok(doc) => documents.push(doc),
            Err(e) => error!(path = %path.display(), error = %e, "error processing document"),
        }
    }
    Ok(documents)
}
