// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Sending one drained batch, with retries.
//!
//! A batch moves `Pending -> Attempting -> {Delivered | Retrying ->
//! Attempting | Dropped}`. The whole batch is retried or dropped as a unit.

use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use loom_errors_core::{encode_batch, ErrorReportPayload};
use reqwest::StatusCode;
use tracing::{debug, warn};

use crate::error::{ReporterError, Result};
use crate::guard::panic_message;
use crate::retry::{retry, RetryConfig};
use crate::transport::Transport;

/// Terminal state of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
	/// Accepted by the endpoint. A 429 also lands here: the server chose to
	/// drop the batch and asking again would not change that.
	Delivered { attempts: u32, status: u16 },
	/// Every attempt failed, or the batch could not be encoded.
	Dropped { attempts: u32 },
}

impl DeliveryOutcome {
	pub fn is_delivered(&self) -> bool {
		matches!(self, Self::Delivered { .. })
	}

	pub fn attempts(&self) -> u32 {
		match self {
			Self::Delivered { attempts, .. } | Self::Dropped { attempts } => *attempts,
		}
	}
}

/// 2xx and 429 end delivery successfully.
pub fn is_terminal_success(status: u16) -> bool {
	(200..300).contains(&status) || status == StatusCode::TOO_MANY_REQUESTS.as_u16()
}

/// Encodes `items` and delivers them with retries. Never fails; the outcome
/// says what happened.
pub async fn deliver_batch(
	transport: &dyn Transport,
	url: &str,
	items: Vec<ErrorReportPayload>,
	retry_config: &RetryConfig,
	debug: bool,
) -> DeliveryOutcome {
	let count = items.len();
	let body = match encode_batch(&items) {
		Ok(body) => body,
		Err(err) => {
			if debug {
				warn!(count, error = %err, "Dropping error batch that could not be encoded");
			}
			return DeliveryOutcome::Dropped { attempts: 0 };
		}
	};

	let mut attempts = 0u32;
	let result = retry(retry_config, || {
		attempts += 1;
		attempt(transport, url, body.clone())
	})
	.await;

	match result {
		Ok(status) => {
			if debug {
				debug!(count, status, attempts, "Error batch delivered");
			}
			DeliveryOutcome::Delivered { attempts, status }
		}
		Err(err) => {
			if debug {
				warn!(count, attempts, error = %err, "Dropping error batch after exhausting retries");
			}
			DeliveryOutcome::Dropped { attempts }
		}
	}
}

async fn attempt(transport: &dyn Transport, url: &str, body: String) -> Result<u16> {
	let sent = AssertUnwindSafe(async move { transport.send(url, body).await })
		.catch_unwind()
		.await
		.map_err(|payload| ReporterError::TransportPanicked(panic_message(payload.as_ref())))?;

	let status = sent?;
	if is_terminal_success(status) {
		Ok(status)
	} else {
		Err(ReporterError::ServerError { status })
	}
}
