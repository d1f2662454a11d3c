// SPDX-FileCopyrightText: 2026 PC-Agent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock backend for deterministic testing.
//!
//! `MockBackend` implements `BackendHandle` with a FIFO queue of scripted
//! outcomes. When the queue is empty it answers with a default response,
//! unless it was built to always fail.

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::sync::{Arc, Mutex, PoisonError};

use pcagent_config::model::ModelConfig;
use pcagent_core::{BackendHandle, ModelTier, PcAgentError};
use pcagent_router::BackendFactory;

/// A backend that replays scripted outcomes and records every input.
pub struct MockBackend {
    tier: ModelTier,
    name: String,
    cost_per_call: f64,
    always_fail: bool,
    script: Mutex<VecDeque<Result<String, String>>>,
    invocations: Mutex<Vec<String>>,
}

impl MockBackend {
    /// Create a mock that succeeds with a default response.
    pub fn new(tier: ModelTier) -> Self {
        Self {
            tier,
            name: format!("mock-{tier}"),
            cost_per_call: 0.0,
            always_fail: false,
            script: Mutex::new(VecDeque::new()),
            invocations: Mutex::new(Vec::new()),
        }
    }

    /// Create a mock pre-loaded with successful responses.
    pub fn with_responses(tier: ModelTier, responses: Vec<String>) -> Self {
        let mock = Self::new(tier);
        for response in responses {
            mock.push_response(response);
        }
        mock
    }

    /// Create a mock whose every invocation fails.
    pub fn failing(tier: ModelTier) -> Self {
        Self {
            always_fail: true,
            ..Self::new(tier)
        }
    }

    /// Set the display name.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the fixed cost returned by `estimate_cost`.
    pub fn with_cost(mut self, cost_per_call: f64) -> Self {
        self.cost_per_call = cost_per_call;
        self
    }

    /// Queue a successful response.
    pub fn push_response(&self, text: impl Into<String>) {
        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(Ok(text.into()));
    }

    /// Queue a failure.
    pub fn push_failure(&self, message: impl Into<String>) {
        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(Err(message.into()));
    }

    /// Inputs received so far, in order.
    pub fn invocations(&self) -> Vec<String> {
        self.invocations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn invocation_count(&self) -> usize {
        self.invocations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl BackendHandle for MockBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn tier(&self) -> ModelTier {
        self.tier
    }

    fn estimate_cost(&self, _input: &str) -> f64 {
        self.cost_per_call
    }

    fn invoke(&self, input: &str) -> Result<String, PcAgentError> {
        self.invocations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(input.to_string());

        if self.always_fail {
            return Err(PcAgentError::backend(self.tier, "mock failure"));
        }

        let next = self
            .script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();
        match next {
            Some(Ok(text)) => Ok(text),
            Some(Err(message)) => Err(PcAgentError::backend(self.tier, message)),
            None => Ok(format!("mock {} response", self.tier)),
        }
    }
}

/// Factory producing [`MockBackend`]s and keeping a handle to each.
#[derive(Default)]
pub struct MockBackendFactory {
    failing: BTreeSet<ModelTier>,
    created: Mutex<BTreeMap<ModelTier, Arc<MockBackend>>>,
}

impl MockBackendFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every backend created for `tier` fail.
    pub fn with_failing_tier(mut self, tier: ModelTier) -> Self {
        self.failing.insert(tier);
        self
    }

    /// The mock created for `tier`, if the tier was instantiated.
    pub fn backend(&self, tier: ModelTier) -> Option<Arc<MockBackend>> {
        self.created
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&tier)
            .cloned()
    }
}

impl BackendFactory for MockBackendFactory {
    fn create(&self, tier: ModelTier, model: &ModelConfig) -> Arc<dyn BackendHandle> {
        let mock = if self.failing.contains(&tier) {
            MockBackend::failing(tier)
        } else {
            MockBackend::new(tier)
        };
        let mock = Arc::new(mock.named(model.name.clone()).with_cost(model.cost_per_unit));
        self.created
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(tier, Arc::clone(&mock));
        mock
    }
}
