//! Core processing modules
//!
//! Text normalization, compound splitting, intent classification,
//! parameter extraction and the optional AI integration.

pub mod ai;
pub mod classifier;
pub mod dates;
pub mod extractor;
pub mod ollama;
pub mod rules;
pub mod splitter;
pub mod text_normalizer;
