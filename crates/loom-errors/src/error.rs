// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for the reporter SDK.
//!
//! None of these ever reach a caller of the public reporter API; they flow
//! between internal steps and end at the failure boundary in
//! [`crate::guard`].

use loom_errors_core::ErrorsCoreError;
use thiserror::Error;

use crate::retry::RetryableError;

/// Result type alias for reporter operations.
pub type Result<T> = std::result::Result<T, ReporterError>;

/// Errors that can occur inside the reporter.
#[derive(Debug, Error)]
pub enum ReporterError {
	/// HTTP request failed before a response arrived.
	#[error("HTTP request failed: {0}")]
	RequestFailed(#[from] reqwest::Error),

	/// Endpoint answered with a status that is neither 2xx nor 429.
	#[error("server error (status {status})")]
	ServerError {
		/// HTTP status code.
		status: u16,
	},

	/// A custom transport reported a failure.
	#[error("transport failed: {0}")]
	Transport(String),

	/// A custom transport panicked while sending.
	#[error("transport panicked: {0}")]
	TransportPanicked(String),

	/// Building or encoding a report failed.
	#[error(transparent)]
	Core(#[from] ErrorsCoreError),

	/// Failed to serialize a report.
	#[error("serialization error: {0}")]
	SerializationError(#[from] serde_json::Error),

	/// The detached delivery task was cancelled or could not be joined.
	#[error("delivery task failed: {0}")]
	TaskFailed(#[from] tokio::task::JoinError),
}

impl RetryableError for ReporterError {
	fn is_retryable(&self) -> bool {
		match self {
			// A request that could not be built (e.g. a relative URL) fails the
			// same way on every attempt.
			ReporterError::RequestFailed(err) => !err.is_builder(),
			ReporterError::ServerError { .. }
			| ReporterError::Transport(_)
			| ReporterError::TransportPanicked(_) => true,
			ReporterError::Core(_)
			| ReporterError::SerializationError(_)
			| ReporterError::TaskFailed(_) => false,
		}
	}
}
