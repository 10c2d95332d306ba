//! Infrastructure adapters for the Mailtrail application ports.

#![forbid(unsafe_code)]

mod csv_log_parser;
mod in_memory_analysis_cache;
mod in_memory_session_repository;
mod redis_analysis_cache;

pub use csv_log_parser::CsvLogParser;
pub use in_memory_analysis_cache::InMemoryAnalysisCache;
pub use in_memory_session_repository::InMemorySessionRepository;
pub use redis_analysis_cache::RedisAnalysisCache;
