//! Question answering over an indexed document set.

pub mod confidence;
pub mod pipeline;
pub mod prompt;
pub mod session;

pub use confidence::{score, Confidence, ConfidenceLevel};
pub use pipeline::{source_info_with_scores, RagPipeline, NO_RELEVANT_INFORMATION};
pub use session::Session;
