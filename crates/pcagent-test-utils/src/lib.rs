// SPDX-FileCopyrightText: 2026 PC-Agent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for PC-Agent routing tests.
//!
//! Provides scripted backends and a router harness on a manual clock for
//! fast, deterministic tests without real model clients.
//!
//! # Components
//!
//! - [`MockBackend`] - Backend with scripted responses and failures
//! - [`MockBackendFactory`] - Factory that builds mock backends and keeps handles to them
//! - [`TestRouter`] - Router agent wired to mocks and a [`ManualClock`](pcagent_cost::ManualClock)

pub mod harness;
pub mod mock_backend;

pub use harness::{TestRouter, TestRouterBuilder};
pub use mock_backend::{MockBackend, MockBackendFactory};
