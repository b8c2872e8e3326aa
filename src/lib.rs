//! StudyMate Library
//!
//! Natural-language command pipeline for a study assistant: free-form
//! requests in, note/flashcard/schedule operations and a one-sentence
//! summary out.

pub mod audit;
pub mod config;
pub mod core;
pub mod error;
pub mod executor;
pub mod model;
pub mod pipeline;
pub mod storage;
pub mod summary;
pub mod utils;

pub use config::Config;
pub use error::{AssistError, AssistResult};
pub use model::Response;
pub use pipeline::CommandPipeline;
