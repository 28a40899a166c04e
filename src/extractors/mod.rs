// src/extractors/mod.rs
pub mod capa;

// Re-export the extraction entry point for convenience
pub use capa::ReportExtractor;
