pub mod config;
pub mod errors;
pub mod judge;
pub mod model;
pub mod providers;
pub mod structured;
pub mod vcr;

pub use config::TriageConfig;
pub use errors::{TriageError, TriageResult};
pub use judge::{JudgeVerdict, SimilarityJudge};
pub use model::{Category, LlmResponse, SimilarityScore};
