pub mod advisor;
pub mod matcher;

pub use advisor::AdvisorService;
pub use matcher::{best_match, normalize, suggest, MatchResult, ScorerKind, Similarity};
