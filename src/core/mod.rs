pub mod cache;
pub mod frequency;
pub mod orchestrator;
pub mod quarters;
pub mod rate_limiter;
pub mod retry;
pub mod scheduler;
pub mod timeseries;
