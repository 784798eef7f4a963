//! Core domain models
//!
//! This module defines the fundamental data structures that represent
//! trigger events, pipelines, jobs, runs and their configuration.

pub mod config;
pub mod event;
pub mod job;
pub mod pipeline;
pub mod run;

pub use event::*;
pub use job::*;
pub use pipeline::*;
pub use run::*;
