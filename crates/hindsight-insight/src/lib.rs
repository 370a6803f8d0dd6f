pub mod analysis;
pub mod render;
pub mod synth;
pub mod templates;

pub use analysis::{EvolutionPattern, EvolutionStage, InsightAnalysis, SentimentSummary};
pub use render::render_text;
pub use synth::InsightSynthesizer;
