// SPDX-FileCopyrightText: 2026 PC-Agent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait definitions for pluggable routing collaborators.

pub mod backend;

pub use backend::BackendHandle;
