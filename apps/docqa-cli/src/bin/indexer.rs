use std::env;

use docqa_core::config::Config;
use docqa_core::data_processor::DataProcessor;
use docqa_embed::default_embedder;
use docqa_vector::{SnapshotStore, VectorIndex};

fn main() -> anyhow::Result<()> {
    docqa_cli::init_tracing();
    let args: Vec<String> = env::args().skip(1).collect();
    if args.is_empty() || args.iter().any(|a| a == "--help" || a == "-h") {
        eprintln!("Usage: docqa-indexer <pdf|dir>...");
        std::process::exit(1);
    }
    let settings = Config::load()?.settings()?;
    let files = docqa_cli::input_files(&args)?;

    println!("DocQA Indexer\n=============");
    println!("Snapshot directory: {}", settings.snapshot_dir().display());
    println!("Documents: {}", files.len());

    let embedder = default_embedder(&settings.embedding, docqa_cli::api_key().as_deref())?;
    let store = SnapshotStore::new(settings.snapshot_dir())?;
    let processor = DataProcessor::with_settings(&settings.chunking);
    let index = VectorIndex::build_or_load(&files, &processor, embedder, &store, settings.embedding.batch_size)?;

    println!("\nIndexed {} chunks from {} documents", index.len(), index.sources().len());
    println!("Fingerprint: {}", index.fingerprint());
    if let Some(dim) = store.dim()? {
        println!("Vector dimension: {dim}");
    }
    Ok(())
}
