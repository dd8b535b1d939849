//! Shared start-up for the terminal binaries.

use std::path::PathBuf;

use anyhow::{bail, Result};
use tracing_subscriber::EnvFilter;

use docqa_core::data_processor::list_pdf_files;

pub const API_KEY_VAR: &str = "GEMINI_API_KEY";

/// Log to stderr, `info` unless `RUST_LOG` says otherwise.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).try_init();
}

pub fn api_key() -> Option<String> {
    std::env::var(API_KEY_VAR).ok().filter(|k| !k.trim().is_empty())
}

/// PDF files named on the command line, with directories expanded.
pub fn input_files(args: &[String]) -> Result<Vec<PathBuf>> {
    let inputs: Vec<PathBuf> = args.iter().filter(|a| !a.starts_with('-')).map(PathBuf::from).collect();
    if inputs.is_empty() {
        bail!("no input files given");
    }
    let files = list_pdf_files(&inputs);
    if files.is_empty() {
        bail!("no PDF files found under {}", args.join(" "));
    }
    Ok(files)
}
