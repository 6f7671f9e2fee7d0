pub mod answer_scorer;
pub mod llm_service;
pub mod scale_converter;

pub use answer_scorer::{AnswerScorer, ScoreOutcome};
pub use llm_service::LlmService;
pub use scale_converter::{ScaleConverter, MAX_RAW_SCORE, MAX_SCALED_SCORE, SCALE_TABLE};
