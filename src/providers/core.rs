// ABOUTME: Core recognition backend trait shared by all providers
// ABOUTME: Defines the detect contract, deadline handling, and backend configuration
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 NutriScan

//! Shared backend contract.
//!
//! All recognition sources implement [`RecognitionBackend`]; the
//! orchestrator never type-switches on a provider name. Adding a provider
//! means implementing the trait and registering it, nothing more.

use crate::models::{BackendKind, Detection, ScanInput};
use crate::providers::errors::BackendError;
use async_trait::async_trait;
use std::time::Duration;

/// Endpoint and credential configuration for one backend.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Base URL of the provider API
    pub base_url: String,
    /// API key, when the provider requires one
    pub api_key: Option<String>,
    /// Model identifier for model-backed providers
    pub model: Option<String>,
}

impl BackendConfig {
    /// Configuration with just a base URL
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: None,
            model: None,
        }
    }
}

/// One pluggable recognition source.
///
/// Implementations must be `Send + Sync`; backend calls run as independent
/// concurrent tasks and each writes only to its own result slot. A backend
/// must respect the caller-supplied deadline: the orchestrator additionally
/// enforces it, but a cooperative backend releases its network handle as
/// soon as the budget is spent.
#[async_trait]
pub trait RecognitionBackend: Send + Sync {
    /// Which backend this is
    fn kind(&self) -> BackendKind;

    /// Whether this backend can process the given input kind
    fn accepts(&self, input: &ScanInput) -> bool;

    /// Turn raw input into zero or more candidate detections.
    ///
    /// Zero detections with `Ok` means the backend worked but found
    /// nothing; that is not a failure.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] on timeout, transport, or protocol
    /// failures. The orchestrator degrades this backend and carries on.
    async fn detect(
        &self,
        input: &ScanInput,
        deadline: Duration,
    ) -> Result<Vec<Detection>, BackendError>;
}
