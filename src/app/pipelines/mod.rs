pub mod input;
pub mod market_pipeline;
