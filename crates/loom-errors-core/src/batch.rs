// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Request body encoding for a batch of reports.
//!
//! A batch of one is sent as a bare JSON object and larger batches as a
//! JSON array. The ingestion endpoint accepts both shapes and older
//! endpoints only understand the single-object form, so the distinction is
//! kept.

use crate::error::{ErrorsCoreError, Result};
use crate::payload::ErrorReportPayload;

/// Encodes `items` as the JSON body of one POST.
pub fn encode_batch(items: &[ErrorReportPayload]) -> Result<String> {
	match items {
		[] => Err(ErrorsCoreError::EmptyBatch),
		[single] => Ok(serde_json::to_string(single)?),
		many => Ok(serde_json::to_string(many)?),
	}
}
