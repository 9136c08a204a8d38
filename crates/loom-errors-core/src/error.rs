// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for the error reporter core.

use thiserror::Error;

/// Errors produced by the core types.
#[derive(Debug, Error)]
pub enum ErrorsCoreError {
	#[error("invalid error level: {0}")]
	InvalidLevel(String),

	#[error("invalid platform: {0}")]
	InvalidPlatform(String),

	#[error("cannot encode an empty batch")]
	EmptyBatch,

	#[error("serialization error: {0}")]
	Serialization(#[from] serde_json::Error),
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, ErrorsCoreError>;
