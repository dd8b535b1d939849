use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use docqa_core::config::Settings;
use docqa_core::data_processor::{source_name, DataProcessor};
use docqa_core::traits::PageExtractor;
use docqa_core::{Chunk, Error, Role};
use docqa_embed::HashEmbedder;
use docqa_llm::FakeGenerator;
use docqa_pipeline::{score, ConfidenceLevel, RagPipeline, Session, NO_RELEVANT_INFORMATION};
use docqa_vector::{fingerprint, IndexedChunk, VectorIndex};

struct StubExtractor {
    docs: HashMap<String, Vec<String>>,
}

impl PageExtractor for StubExtractor {
    fn extract_pages(&self, path: &Path) -> anyhow::Result<Vec<String>> {
        self.docs
            .get(&source_name(path))
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("cannot open {}", path.display()))
    }
}

fn survival_processor(settings: &Settings) -> DataProcessor {
    let mut docs = HashMap::new();
    docs.insert(
        "fire.pdf".to_string(),
        vec![
            "Gather dry tinder and kindling before you light a fire.".to_string(),
            "Shelter the fire from wind with a ring of stones.".to_string(),
        ],
    );
    docs.insert("water.pdf".to_string(), vec!["Boil water for one minute to purify it.".to_string()]);
    DataProcessor::with_extractor(Box::new(StubExtractor { docs }), &settings.chunking)
}

fn settings_in(dir: &Path) -> Settings {
    let mut settings = Settings::default();
    settings.storage.snapshot_dir = dir.join("db").to_string_lossy().to_string();
    settings
}

fn single_chunk_index(text: &str, page: u32) -> VectorIndex {
    let embedder = Arc::new(HashEmbedder::new(32));
    let entries = vec![IndexedChunk { chunk: Chunk::new(text, "guide.pdf", page), vector: vec![1.0; 32] }];
    VectorIndex::from_entries(entries, embedder, fingerprint(&[PathBuf::from("guide.pdf")]))
}

#[test]
fn confidence_follows_rank_for_full_length_first_page_chunks() {
    let percents: Vec<u32> = (1..=5).map(|rank| score(rank, 1000, 1).percent).collect();
    assert_eq!(percents, vec![100, 85, 70, 55, 40]);
    let levels: Vec<ConfidenceLevel> = (1..=5).map(|rank| score(rank, 1000, 1).level).collect();
    assert_eq!(
        levels,
        vec![ConfidenceLevel::VeryHigh, ConfidenceLevel::High, ConfidenceLevel::Medium, ConfidenceLevel::Low, ConfidenceLevel::Low]
    );
}

#[test]
fn confidence_is_bounded_and_never_rises_with_rank() {
    for len in [0usize, 1, 150, 999, 1000, 4000] {
        for page in [1u32, 2, 5, 30] {
            let mut previous = u32::MAX;
            for rank in 1..=10 {
                let c = score(rank, len, page);
                assert!((10..=100).contains(&c.percent), "{} out of range", c.percent);
                assert!(c.percent <= previous);
                previous = c.percent;
            }
        }
    }
}

#[test]
fn empty_retrieval_returns_fallback_without_generation() {
    let generator = Arc::new(FakeGenerator::answering("unused"));
    let index = VectorIndex::from_entries(Vec::new(), Arc::new(HashEmbedder::new(8)), fingerprint(&[]));
    let pipeline = RagPipeline::new(index, generator.clone(), 5);

    assert_eq!(pipeline.answer_question("Anything?").unwrap(), NO_RELEVANT_INFORMATION);
    assert_eq!(generator.calls(), 0);
}

#[test]
fn answer_carries_citations_and_previews() {
    let text = "x".repeat(1000);
    let generator = Arc::new(FakeGenerator::answering("Keep the fire small."));
    let pipeline = RagPipeline::new(single_chunk_index(&text, 1), generator.clone(), 5);

    let answer = pipeline.answer_question("How big should a fire be?").unwrap();

    let expected = format!(
        "Keep the fire small.\n\n**Sources and Context:**\n• **Source 1**: guide.pdf\n  - **Page**: 1\n  - **Confidence**: 100% (Very High)\n  - **Content Preview**: {}...",
        "x".repeat(200)
    );
    assert_eq!(answer, expected);

    let prompt = generator.last_prompt().unwrap();
    assert!(prompt.contains("Source 1:\nFile: guide.pdf\nPage: 1\nContent:\n"));
    assert!(prompt.contains("Question:\nHow big should a fire be?\n"));
}

#[test]
fn short_chunk_preview_still_ends_with_ellipsis() {
    let pipeline = RagPipeline::new(single_chunk_index("Boil water.", 2), Arc::new(FakeGenerator::answering("ok")), 5);
    let answer = pipeline.answer_question("water").unwrap();
    assert!(answer.ends_with("  - **Confidence**: 10% (Very Low)\n  - **Content Preview**: Boil water...."));
    assert!(answer.contains("  - **Page**: 2\n"));
}

#[test]
fn generation_failure_is_typed() {
    let pipeline = RagPipeline::new(single_chunk_index("text", 1), Arc::new(FakeGenerator::failing("model overloaded")), 5);
    let err = pipeline.answer_question("q").unwrap_err();
    assert!(matches!(err, Error::Generation(ref m) if m.contains("model overloaded")));
}

#[test]
fn session_answers_and_records_history() {
    let tmp = tempfile::tempdir().unwrap();
    let settings = settings_in(tmp.path());
    let processor = survival_processor(&settings);
    let generator = Arc::new(FakeGenerator::echo());
    let mut session = Session::with_processor(settings, Arc::new(HashEmbedder::new(256)), generator.clone(), processor);

    assert!(matches!(session.ask("too early"), Err(Error::NotReady)));
    assert!(session.history().is_empty());

    let docs = session.ingest(&[PathBuf::from("/tmp/upload/fire.pdf"), PathBuf::from("/tmp/upload/water.pdf")]).unwrap();
    assert_eq!(docs, ["fire.pdf".to_string(), "water.pdf".to_string()]);

    let answer = session.ask("How do I purify water?").unwrap();
    assert!(answer.starts_with("Stub answer to \"How do I purify water?\" drawn from 3 source(s)."));
    assert!(answer.contains("• **Source 1**: water.pdf"));
    assert!(answer.contains("• **Source 3**: "));
    assert!(!answer.contains("• **Source 4**"));

    let roles: Vec<Role> = session.history().iter().map(|t| t.role).collect();
    assert_eq!(roles, vec![Role::User, Role::Assistant]);
    assert_eq!(session.history()[1].content, answer);
    session.end();
}

#[test]
fn failed_answer_keeps_only_the_user_turn() {
    let tmp = tempfile::tempdir().unwrap();
    let settings = settings_in(tmp.path());
    let processor = survival_processor(&settings);
    let mut session =
        Session::with_processor(settings, Arc::new(HashEmbedder::new(64)), Arc::new(FakeGenerator::failing("boom")), processor);
    session.ingest(&[PathBuf::from("fire.pdf")]).unwrap();

    assert!(matches!(session.ask("Where?"), Err(Error::Generation(_))));
    assert_eq!(session.history().len(), 1);
    assert_eq!(session.history()[0].role, Role::User);
    assert_eq!(session.history()[0].content, "Where?");
}

#[test]
fn ingestion_of_unreadable_files_is_empty_corpus() {
    let tmp = tempfile::tempdir().unwrap();
    let settings = settings_in(tmp.path());
    let processor = survival_processor(&settings);
    let mut session =
        Session::with_processor(settings, Arc::new(HashEmbedder::new(8)), Arc::new(FakeGenerator::default()), processor);

    assert!(matches!(session.ingest(&[PathBuf::from("missing.pdf")]), Err(Error::EmptyCorpus)));
    assert!(!session.is_ready());
}

#[test]
fn second_ingest_keeps_the_first_index() {
    let tmp = tempfile::tempdir().unwrap();
    let settings = settings_in(tmp.path());
    let processor = survival_processor(&settings);
    let mut session =
        Session::with_processor(settings, Arc::new(HashEmbedder::new(64)), Arc::new(FakeGenerator::default()), processor);

    session.ingest(&[PathBuf::from("fire.pdf")]).unwrap();
    let docs = session.ingest(&[PathBuf::from("water.pdf")]).unwrap().to_vec();

    assert_eq!(docs, vec!["fire.pdf".to_string()]);
    assert_eq!(session.pipeline().map(|p| p.index().len()), Some(2));
}
