// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Embedded error reporter for Loom applications.
//!
//! Captures errors and messages inside a running application, groups them
//! by fingerprint, rate-limits floods, batches them in memory and ships them
//! to an HTTP ingestion endpoint with bounded retries. Nothing in the public
//! API ever returns an error or panics; telemetry failing must not take the
//! host down with it.
//!
//! # Example
//!
//! ```ignore
//! use loom_errors::{CaptureExtras, ErrorReporter, NewBreadcrumb, Reportable, ReporterOptions};
//!
//! let reporter = ErrorReporter::new();
//! reporter.init(
//!     ReporterOptions::new()
//!         .base_url("https://loom.example.com")
//!         .environment("staging")
//!         .release(env!("CARGO_PKG_VERSION")),
//! );
//!
//! reporter.add_breadcrumb(NewBreadcrumb::new("opened project").category("navigation"));
//!
//! if let Err(e) = load_project() {
//!     reporter.capture_error(Reportable::from_error(&e), CaptureExtras::new().component("ProjectView"));
//! }
//!
//! reporter.shutdown().await;
//! ```

mod client;
mod config;
mod context;
mod delivery;
mod error;
mod extras;
mod guard;
mod retry;
mod transport;

#[cfg(test)]
mod testing;

pub use client::ErrorReporter;
pub use config::{
	ReporterConfig, ReporterConfigLayer, ReporterOptions, DEFAULT_ENDPOINT, DEFAULT_ENVIRONMENT,
	DEFAULT_FLUSH_INTERVAL, DEFAULT_MAX_BUFFERED_REPORTS, DEFAULT_MAX_QUEUE_SIZE,
	DEFAULT_REQUEST_TIMEOUT,
};
pub use context::{ContextResolver, FnContext, NoContext};
pub use delivery::{deliver_batch, is_terminal_success, DeliveryOutcome};
pub use error::{ReporterError, Result};
pub use extras::CaptureExtras;
pub use retry::{
	retry, RetryConfig, RetryableError, DEFAULT_BASE_DELAY, DEFAULT_MAX_ATTEMPTS, DEFAULT_MAX_DELAY,
};
pub use transport::{
	is_absolute_url, resolve_endpoint, user_agent, HttpTransport, Transport, SDK_NAME, SDK_VERSION,
};

// Re-export core types for convenience
pub use loom_errors_core::{
	compute_fingerprint, ErrorBreadcrumb, ErrorLevel, ErrorReportPayload, NewBreadcrumb, Platform,
	Reportable,
};
