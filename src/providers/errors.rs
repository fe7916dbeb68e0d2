// ABOUTME: Structured error types for recognition backend operations
// ABOUTME: Retryability classification drives the per-backend circuit breaker
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 NutriScan

use crate::external::CatalogError;
use crate::models::BackendKind;
use thiserror::Error;

/// Failure of a single backend invocation.
///
/// Local to one backend: the orchestrator records the backend as degraded
/// and excludes its contribution. Only when every backend fails does a
/// caller-facing error surface.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The call exceeded the shared timeout budget
    #[error("backend {backend} timed out")]
    Timeout {
        /// Backend that timed out
        backend: BackendKind,
    },

    /// Provider returned a non-success HTTP status
    #[error("backend returned HTTP {status}: {message}")]
    Http {
        /// HTTP status code
        status: u16,
        /// Response detail, truncated for logs
        message: String,
    },

    /// Transport-level failure (connect, TLS, DNS)
    #[error("backend network error: {0}")]
    Network(String),

    /// The provider answered but the body was unusable
    #[error("unparseable backend response: {0}")]
    InvalidResponse(String),

    /// Provider-side or client-side rate limit engaged
    #[error("backend rate limited")]
    RateLimited {
        /// Suggested wait before retrying, when known
        retry_after_secs: Option<u64>,
    },

    /// The circuit breaker is open for this backend
    #[error("backend {backend} circuit open, retry in {retry_after_secs}s")]
    CircuitOpen {
        /// Backend whose breaker tripped
        backend: BackendKind,
        /// Seconds until a recovery probe is allowed
        retry_after_secs: u64,
    },

    /// Backend is not configured or otherwise unusable
    #[error("backend unavailable: {0}")]
    Unavailable(String),
}

impl BackendError {
    /// Whether retrying the same call later could succeed.
    ///
    /// Only retryable failures count against the circuit breaker; a
    /// malformed response is a bug, not an outage.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout { .. } | Self::Network(_) | Self::RateLimited { .. } => true,
            Self::Http { status, .. } => *status >= 500,
            Self::InvalidResponse(_) | Self::CircuitOpen { .. } | Self::Unavailable(_) => false,
        }
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            // Transport timeout; the orchestrator rewrites this with the
            // backend kind when it knows which slot it came from.
            Self::Network("request timed out".to_owned())
        } else if let Some(status) = err.status() {
            Self::Http {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl From<CatalogError> for BackendError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Timeout => Self::Network("catalog request timed out".to_owned()),
            CatalogError::Network(msg) => Self::Network(msg),
            CatalogError::Http { status } => Self::Http {
                status,
                message: "catalog error".to_owned(),
            },
            CatalogError::InvalidResponse(msg) => Self::InvalidResponse(msg),
            CatalogError::RateLimited => Self::RateLimited {
                retry_after_secs: None,
            },
        }
    }
}
