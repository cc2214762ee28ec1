pub mod aggregation;
pub mod analyzer;
pub mod experience;
pub mod scoring;
pub mod skills;
pub mod sufficiency;
pub mod vocabulary;

pub use analyzer::MarketAnalyzer;
pub use skills::SkillExtractor;
pub use vocabulary::Vocabulary;
