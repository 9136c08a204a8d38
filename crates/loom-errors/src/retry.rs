// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Retry with exponential backoff for batch delivery.

use std::time::Duration;
use tracing::trace;

/// Attempts per batch before it is dropped.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Delay before the first retry; doubles for every further retry.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(1000);

/// Upper bound on any single backoff delay.
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(30);

/// Backoff schedule for one batch. The delay doubles after every failed
/// attempt, starting at `base_delay` and never exceeding `max_delay`.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
	/// Total attempts, including the first one.
	pub max_attempts: u32,
	pub base_delay: Duration,
	pub max_delay: Duration,
	/// Scale each delay by a random factor in `[0.5, 1.5)` so that many
	/// clients failing together do not retry in lockstep.
	pub jitter: bool,
}

impl Default for RetryConfig {
	fn default() -> Self {
		Self {
			max_attempts: DEFAULT_MAX_ATTEMPTS,
			base_delay: DEFAULT_BASE_DELAY,
			max_delay: DEFAULT_MAX_DELAY,
			jitter: false,
		}
	}
}

pub trait RetryableError {
	fn is_retryable(&self) -> bool;
}

/// Delay after failed attempt number `failures` (1-based).
pub(crate) fn backoff(cfg: &RetryConfig, failures: u32) -> Duration {
	let doublings = failures.saturating_sub(1).min(31);
	let delay = cfg
		.base_delay
		.checked_mul(1u32 << doublings)
		.map_or(cfg.max_delay, |delay| delay.min(cfg.max_delay));

	if cfg.jitter {
		delay.mul_f64(0.5 + fastrand::f64())
	} else {
		delay
	}
}

/// Runs `op` until it succeeds, fails with a non-retryable error, or
/// `max_attempts` is used up. The last error is returned on exhaustion.
pub async fn retry<F, Fut, T, E>(cfg: &RetryConfig, mut op: F) -> Result<T, E>
where
	F: FnMut() -> Fut,
	Fut: std::future::Future<Output = Result<T, E>>,
	E: RetryableError + std::fmt::Debug,
{
	let max_attempts = cfg.max_attempts.max(1);
	let mut failures = 0;

	loop {
		let err = match op().await {
			Ok(value) => return Ok(value),
			Err(err) => err,
		};
		failures += 1;
		if failures >= max_attempts || !err.is_retryable() {
			return Err(err);
		}

		let delay = backoff(cfg, failures);
		trace!(
			error = ?err,
			failures,
			max_attempts,
			delay_ms = delay.as_millis() as u64,
			"Retrying batch delivery"
		);
		tokio::time::sleep(delay).await;
	}
}
