// SPDX-FileCopyrightText: 2026 PC-Agent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the PC-Agent router.
//!
//! This crate provides the error type, the closed sets of model tiers and
//! complexity features, and the backend trait shared by the configuration,
//! cost, and routing crates.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::PcAgentError;
pub use traits::BackendHandle;
pub use types::{Feature, ModelTier, truncate_chars};
