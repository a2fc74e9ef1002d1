//! Core extraction logic and run orchestration for the Aozora corpus builder.
//!
//! This crate ties together fetching, normalization, per-work extraction and
//! cross-work aggregation into the end-to-end [`pipeline::run_corpus`] run.

pub mod aggregate;
pub mod extract;
pub mod pipeline;
