//! Integration tests module
//!
//! End-to-end tests for the knowledge graph pipeline:
//! - Validate → reset → build → ask over an in-memory graph
//! - Failure handling at every stage

pub mod error_scenarios;
pub mod fixtures;
pub mod pipeline_test;
