#![doc = "srs-testgen-core: requirement extraction and test-case synthesis pipeline."]

//! This crate holds every step of the pipeline that turns a Software Requirements
//! Specification into a bounded list of test cases:
//!
//! acquire text → filter requirement sentences → build prompt → synthesize → normalize.
//!
//! Transport (HTTP, CLI) and the networked model client live in the `srs-testgen` crate.
//! External collaborators are reached only through the traits in [`contract`].

pub mod acquire;
pub mod config;
pub mod contract;
pub mod filter;
pub mod normalize;
pub mod pipeline;
pub mod prompt;

pub use contract::{SrsInput, TestCase, TestCaseSet};
pub use pipeline::Pipeline;
