//! Application layer - Use cases and orchestration.
//!
//! Services here depend on domain ports (traits) rather than concrete encoder
//! implementations: `ModelCache` memoizes loaded encoders, `similarity` turns
//! one encoder's output into the pairwise matrices, and `ComparisonService`
//! validates requests and drives both.

pub mod services;

pub use services::{ComparisonService, ModelCache};
