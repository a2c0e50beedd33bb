pub mod assemble;
pub mod config;
pub mod constants;
pub mod enrich;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod logging;
pub mod normalize;
pub mod pipeline;
pub mod report;
pub mod storage;
pub mod types;
