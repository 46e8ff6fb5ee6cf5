//! Maturity scoring for GCG assessments.
//!
//! The [`scoring`] module holds the aggregator: a pure rollup of factor
//! responses through parameters, aspects and KKAs into an overall score and
//! fulfillment level (FUK). The remaining modules load assessment documents,
//! track their workflow status and render results for the CLI.

pub mod assessment;
pub mod config;
pub mod error;
pub mod output;
pub mod scoring;

pub use error::ScoreError;
