//! Portability & readiness scoring for private banking books.
//!
//! The [`portability`] module holds the engine: reference data, boundary validation,
//! scoring, banding, recommendations and the benchmark seam. [`config`], [`error`] and
//! [`telemetry`] carry the service plumbing shared with the API binary.

pub mod config;
pub mod error;
pub mod portability;
pub mod telemetry;
