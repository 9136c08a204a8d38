// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core types for the Loom embedded error reporter.
//!
//! This crate holds everything the reporter needs that does not touch the
//! network or a runtime: the report payload, breadcrumbs and the bounded
//! breadcrumb trail, normalization of arbitrary error values, the
//! fingerprint algorithm, the per-fingerprint rate limiter, and the batch
//! body encoding. The SDK itself lives in `loom-errors`.

pub mod batch;
pub mod breadcrumb;
pub mod error;
pub mod fingerprint;
pub mod level;
pub mod normalize;
pub mod payload;
pub mod ratelimit;

pub use batch::encode_batch;
pub use breadcrumb::{BreadcrumbTrail, ErrorBreadcrumb, NewBreadcrumb, DEFAULT_CATEGORY, MAX_BREADCRUMBS};
pub use error::{ErrorsCoreError, Result};
pub use fingerprint::compute_fingerprint;
pub use level::ErrorLevel;
pub use normalize::{normalize, NormalizedError, Reportable};
pub use payload::{ErrorReportPayload, Platform};
pub use ratelimit::{RateDecision, RateLimiter};

use chrono::{DateTime, SecondsFormat, Utc};

/// Formats a timestamp the way reports and breadcrumbs carry it:
/// ISO-8601 UTC with millisecond precision, e.g. `2025-01-01T12:00:00.000Z`.
pub fn iso_timestamp(at: DateTime<Utc>) -> String {
	at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// [`iso_timestamp`] for the current time.
pub fn iso_now() -> String {
	iso_timestamp(Utc::now())
}
