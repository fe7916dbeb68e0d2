// ABOUTME: Circuit breaker guarding calls to unreliable recognition backends
// ABOUTME: Opens after consecutive retryable failures, probes again after a recovery window
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 NutriScan

//! Per-backend circuit breaker.
//!
//! A backend that keeps timing out is skipped (and counted as degraded)
//! until the recovery window elapses, at which point a single probe call is
//! let through. A successful probe closes the circuit; a failed one
//! re-opens it.

use crate::models::BackendKind;
use crate::providers::errors::BackendError;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Breaker thresholds.
#[derive(Debug, Clone)]
pub struct BreakerConfig {
    /// Consecutive retryable failures before the circuit opens
    pub failure_threshold: u32,
    /// How long the circuit stays open before a recovery probe
    pub recovery_timeout: Duration,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 3,
            recovery_timeout: Duration::from_secs(30),
        }
    }
}

/// Observable breaker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerState {
    /// Normal operation, calls pass through
    Closed,
    /// Tripped; calls fail fast until the recovery window elapses
    Open,
    /// One probe call in flight to test recovery
    HalfOpen,
}

#[derive(Debug)]
enum Inner {
    Closed { failures: u32 },
    Open { since: Instant },
    HalfOpen,
}

/// Circuit breaker for one backend.
pub struct CircuitBreaker {
    backend: BackendKind,
    config: BreakerConfig,
    inner: Mutex<Inner>,
}

impl CircuitBreaker {
    /// Breaker with default thresholds
    #[must_use]
    pub fn new(backend: BackendKind) -> Self {
        Self::with_config(backend, BreakerConfig::default())
    }

    /// Breaker with custom thresholds
    #[must_use]
    pub fn with_config(backend: BackendKind, config: BreakerConfig) -> Self {
        Self {
            backend,
            config,
            inner: Mutex::new(Inner::Closed { failures: 0 }),
        }
    }

    /// Current state
    #[must_use]
    pub fn state(&self) -> BreakerState {
        match *self.lock() {
            Inner::Closed { .. } => BreakerState::Closed,
            Inner::Open { .. } => BreakerState::Open,
            Inner::HalfOpen => BreakerState::HalfOpen,
        }
    }

    /// Gate a call: `Ok` lets it proceed, `Err` fails fast.
    ///
    /// An open circuit transitions to half-open once the recovery window
    /// has elapsed, admitting exactly one probe.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::CircuitOpen`] while the circuit rejects calls.
    pub fn check(&self) -> Result<(), BackendError> {
        let mut inner = self.lock();
        match *inner {
            Inner::Closed { .. } => Ok(()),
            Inner::HalfOpen => Err(BackendError::CircuitOpen {
                backend: self.backend,
                retry_after_secs: 1,
            }),
            Inner::Open { since } => {
                let elapsed = since.elapsed();
                if elapsed >= self.config.recovery_timeout {
                    info!(backend = %self.backend, "circuit half-open, admitting recovery probe");
                    *inner = Inner::HalfOpen;
                    Ok(())
                } else {
                    let remaining = self.config.recovery_timeout - elapsed;
                    Err(BackendError::CircuitOpen {
                        backend: self.backend,
                        retry_after_secs: remaining.as_secs().max(1),
                    })
                }
            }
        }
    }

    /// Record a successful call; closes the circuit from any state.
    pub fn record_success(&self) {
        let mut inner = self.lock();
        if matches!(*inner, Inner::HalfOpen) {
            info!(backend = %self.backend, "circuit closed, backend recovered");
        }
        *inner = Inner::Closed { failures: 0 };
    }

    /// Record a failed call. Only retryable failures move the breaker;
    /// a deterministic failure (bad response shape) is not an outage.
    pub fn record_failure(&self, error: &BackendError) {
        if !error.is_retryable() {
            return;
        }
        let mut inner = self.lock();
        match *inner {
            Inner::Closed { failures } => {
                let failures = failures + 1;
                if failures >= self.config.failure_threshold {
                    warn!(
                        backend = %self.backend,
                        failures,
                        recovery_secs = self.config.recovery_timeout.as_secs(),
                        "circuit opened, backend failing"
                    );
                    *inner = Inner::Open {
                        since: Instant::now(),
                    };
                } else {
                    *inner = Inner::Closed { failures };
                }
            }
            Inner::HalfOpen => {
                warn!(backend = %self.backend, "recovery probe failed, circuit re-opened");
                *inner = Inner::Open {
                    since: Instant::now(),
                };
            }
            Inner::Open { .. } => {}
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // A panic while holding this short critical section is a bug;
        // recover the guard rather than poisoning every later scan.
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}
