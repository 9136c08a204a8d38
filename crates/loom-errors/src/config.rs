// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Reporter configuration.
//!
//! [`ReporterConfigLayer`] is the deserializable, all-optional form a host
//! can load from its own config; layers merge and then finalize into a
//! [`ReporterConfig`] with every default applied. [`ReporterOptions`] is what
//! `ErrorReporter::init` takes: a layer plus the injected collaborators.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use loom_errors_core::ratelimit::{DEFAULT_MAX_EVENTS, DEFAULT_WINDOW};
use loom_errors_core::{Platform, MAX_BREADCRUMBS};
use serde::{Deserialize, Serialize};

use crate::context::ContextResolver;
use crate::retry::{RetryConfig, DEFAULT_BASE_DELAY, DEFAULT_MAX_ATTEMPTS, DEFAULT_MAX_DELAY};
use crate::transport::{is_absolute_url, resolve_endpoint, Transport};

pub const DEFAULT_ENDPOINT: &str = "/api/errors";
pub const DEFAULT_ENVIRONMENT: &str = "production";
pub const DEFAULT_MAX_QUEUE_SIZE: usize = 50;
pub const DEFAULT_MAX_BUFFERED_REPORTS: usize = 1000;
pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_millis(5000);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Partial configuration. Unset fields fall back to the defaults above.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ReporterConfigLayer {
	pub endpoint: Option<String>,
	/// Prefix for a relative `endpoint` when the default HTTP transport is
	/// used outside a browser-like environment.
	pub base_url: Option<String>,
	pub platform: Option<Platform>,
	pub environment: Option<String>,
	pub release: Option<String>,
	pub enabled: Option<bool>,
	pub max_queue_size: Option<usize>,
	pub max_buffered_reports: Option<usize>,
	pub flush_interval_ms: Option<u64>,
	pub default_tags: Option<HashMap<String, String>>,
	pub debug: Option<bool>,
	pub max_breadcrumbs: Option<usize>,
	pub request_timeout_ms: Option<u64>,
	pub max_attempts: Option<u32>,
	pub retry_base_delay_ms: Option<u64>,
	pub retry_max_delay_ms: Option<u64>,
	pub retry_jitter: Option<bool>,
	pub rate_limit_max_events: Option<u32>,
	pub rate_limit_window_ms: Option<u64>,
}

impl ReporterConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.endpoint.is_some() {
			self.endpoint = other.endpoint;
		}
		if other.base_url.is_some() {
			self.base_url = other.base_url;
		}
		if other.platform.is_some() {
			self.platform = other.platform;
		}
		if other.environment.is_some() {
			self.environment = other.environment;
		}
		if other.release.is_some() {
			self.release = other.release;
		}
		if other.enabled.is_some() {
			self.enabled = other.enabled;
		}
		if other.max_queue_size.is_some() {
			self.max_queue_size = other.max_queue_size;
		}
		if other.max_buffered_reports.is_some() {
			self.max_buffered_reports = other.max_buffered_reports;
		}
		if other.flush_interval_ms.is_some() {
			self.flush_interval_ms = other.flush_interval_ms;
		}
		if other.default_tags.is_some() {
			self.default_tags = other.default_tags;
		}
		if other.debug.is_some() {
			self.debug = other.debug;
		}
		if other.max_breadcrumbs.is_some() {
			self.max_breadcrumbs = other.max_breadcrumbs;
		}
		if other.request_timeout_ms.is_some() {
			self.request_timeout_ms = other.request_timeout_ms;
		}
		if other.max_attempts.is_some() {
			self.max_attempts = other.max_attempts;
		}
		if other.retry_base_delay_ms.is_some() {
			self.retry_base_delay_ms = other.retry_base_delay_ms;
		}
		if other.retry_max_delay_ms.is_some() {
			self.retry_max_delay_ms = other.retry_max_delay_ms;
		}
		if other.retry_jitter.is_some() {
			self.retry_jitter = other.retry_jitter;
		}
		if other.rate_limit_max_events.is_some() {
			self.rate_limit_max_events = other.rate_limit_max_events;
		}
		if other.rate_limit_window_ms.is_some() {
			self.rate_limit_window_ms = other.rate_limit_window_ms;
		}
	}

	pub fn finalize(self) -> ReporterConfig {
		let retry = RetryConfig {
			max_attempts: self.max_attempts.unwrap_or(DEFAULT_MAX_ATTEMPTS).max(1),
			base_delay: self
				.retry_base_delay_ms
				.map(Duration::from_millis)
				.unwrap_or(DEFAULT_BASE_DELAY),
			max_delay: self
				.retry_max_delay_ms
				.map(Duration::from_millis)
				.unwrap_or(DEFAULT_MAX_DELAY),
			jitter: self.retry_jitter.unwrap_or(false),
		};

		// A zero-sized queue would flush on every capture; treat it as one.
		let max_queue_size = self.max_queue_size.unwrap_or(DEFAULT_MAX_QUEUE_SIZE).max(1);

		ReporterConfig {
			endpoint: self
				.endpoint
				.unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
			base_url: self.base_url,
			platform: self.platform.unwrap_or_default(),
			environment: self
				.environment
				.unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string()),
			release: self.release,
			enabled: self.enabled.unwrap_or(true),
			max_queue_size,
			max_buffered_reports: self
				.max_buffered_reports
				.unwrap_or(DEFAULT_MAX_BUFFERED_REPORTS)
				.max(max_queue_size),
			// Tokio intervals reject a zero period.
			flush_interval: self
				.flush_interval_ms
				.map(|ms| Duration::from_millis(ms.max(1)))
				.unwrap_or(DEFAULT_FLUSH_INTERVAL),
			default_tags: self.default_tags.unwrap_or_default(),
			debug: self.debug.unwrap_or(false),
			max_breadcrumbs: self.max_breadcrumbs.unwrap_or(MAX_BREADCRUMBS),
			request_timeout: self
				.request_timeout_ms
				.map(Duration::from_millis)
				.unwrap_or(DEFAULT_REQUEST_TIMEOUT),
			retry,
			rate_limit_max_events: self.rate_limit_max_events.unwrap_or(DEFAULT_MAX_EVENTS),
			rate_limit_window: self
				.rate_limit_window_ms
				.map(Duration::from_millis)
				.unwrap_or(DEFAULT_WINDOW),
		}
	}
}

/// Fully resolved configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ReporterConfig {
	pub endpoint: String,
	pub base_url: Option<String>,
	pub platform: Platform,
	pub environment: String,
	pub release: Option<String>,
	pub enabled: bool,
	pub max_queue_size: usize,
	/// Hard cap on queued reports; the oldest are dropped beyond it.
	pub max_buffered_reports: usize,
	pub flush_interval: Duration,
	pub default_tags: HashMap<String, String>,
	pub debug: bool,
	pub max_breadcrumbs: usize,
	pub request_timeout: Duration,
	pub retry: RetryConfig,
	pub rate_limit_max_events: u32,
	pub rate_limit_window: Duration,
}

impl ReporterConfig {
	/// The URL batches are posted to.
	pub fn endpoint_url(&self) -> String {
		resolve_endpoint(&self.endpoint, self.base_url.as_deref())
	}

	/// Whether [`ReporterConfig::endpoint_url`] is something the default
	/// HTTP transport can send to.
	pub fn endpoint_is_absolute(&self) -> bool {
		is_absolute_url(&self.endpoint_url())
	}
}

impl Default for ReporterConfig {
	fn default() -> Self {
		ReporterConfigLayer::default().finalize()
	}
}

/// Everything `ErrorReporter::init` accepts.
#[derive(Clone, Default)]
pub struct ReporterOptions {
	layer: ReporterConfigLayer,
	transport: Option<Arc<dyn Transport>>,
	context: Option<Arc<dyn ContextResolver>>,
}

impl ReporterOptions {
	/// Creates options with every field at its default.
	pub fn new() -> Self {
		Self::default()
	}

	/// Starts from a layer loaded by the host (e.g. a `[errors]` section of
	/// its config file).
	pub fn from_layer(layer: ReporterConfigLayer) -> Self {
		Self {
			layer,
			..Self::default()
		}
	}

	/// Sets the ingestion endpoint.
	///
	/// Example: `/api/errors` or `https://errors.example.com/api/errors`
	pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
		self.layer.endpoint = Some(endpoint.into());
		self
	}

	/// Sets the base URL that a relative endpoint is resolved against.
	pub fn base_url(mut self, url: impl Into<String>) -> Self {
		self.layer.base_url = Some(url.into());
		self
	}

	pub fn platform(mut self, platform: Platform) -> Self {
		self.layer.platform = Some(platform);
		self
	}

	/// Sets the environment name.
	///
	/// Example: `production`, `staging`, `development`
	pub fn environment(mut self, environment: impl Into<String>) -> Self {
		self.layer.environment = Some(environment.into());
		self
	}

	/// Sets the release version.
	///
	/// Example: `1.2.3` or a git commit SHA
	pub fn release(mut self, release: impl Into<String>) -> Self {
		self.layer.release = Some(release.into());
		self
	}

	pub fn enabled(mut self, enabled: bool) -> Self {
		self.layer.enabled = Some(enabled);
		self
	}

	/// Queue length that triggers an immediate flush.
	pub fn max_queue_size(mut self, size: usize) -> Self {
		self.layer.max_queue_size = Some(size);
		self
	}

	/// Most reports held in memory while waiting for a flush. Past this the
	/// oldest are dropped. Never lower than the queue size.
	pub fn max_buffered_reports(mut self, max: usize) -> Self {
		self.layer.max_buffered_reports = Some(max);
		self
	}

	pub fn flush_interval(mut self, interval: Duration) -> Self {
		self.layer.flush_interval_ms = Some(interval.as_millis() as u64);
		self
	}

	/// Replaces the tags attached to every report.
	pub fn default_tags(mut self, tags: HashMap<String, String>) -> Self {
		self.layer.default_tags = Some(tags);
		self
	}

	/// Adds one tag attached to every report.
	pub fn default_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self
			.layer
			.default_tags
			.get_or_insert_with(HashMap::new)
			.insert(key.into(), value.into());
		self
	}

	/// Emits diagnostic log lines for dropped reports and absorbed failures.
	pub fn debug(mut self, debug: bool) -> Self {
		self.layer.debug = Some(debug);
		self
	}

	pub fn max_breadcrumbs(mut self, max: usize) -> Self {
		self.layer.max_breadcrumbs = Some(max);
		self
	}

	/// Sets the timeout of the default HTTP transport.
	pub fn request_timeout(mut self, timeout: Duration) -> Self {
		self.layer.request_timeout_ms = Some(timeout.as_millis() as u64);
		self
	}

	/// Sets the attempts per batch, first attempt included.
	pub fn max_attempts(mut self, attempts: u32) -> Self {
		self.layer.max_attempts = Some(attempts);
		self
	}

	pub fn retry_base_delay(mut self, delay: Duration) -> Self {
		self.layer.retry_base_delay_ms = Some(delay.as_millis() as u64);
		self
	}

	/// Caps how long a single backoff can grow.
	pub fn retry_max_delay(mut self, delay: Duration) -> Self {
		self.layer.retry_max_delay_ms = Some(delay.as_millis() as u64);
		self
	}

	pub fn retry_jitter(mut self, jitter: bool) -> Self {
		self.layer.retry_jitter = Some(jitter);
		self
	}

	/// Allows `max_events` reports per fingerprint within each `window`.
	pub fn rate_limit(mut self, max_events: u32, window: Duration) -> Self {
		self.layer.rate_limit_max_events = Some(max_events);
		self.layer.rate_limit_window_ms = Some(window.as_millis() as u64);
		self
	}

	/// Replaces the default HTTP transport.
	pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
		self.transport = Some(transport);
		self
	}

	/// Sets how the user id and URL are looked up at capture time.
	pub fn context_resolver(mut self, resolver: Arc<dyn ContextResolver>) -> Self {
		self.context = Some(resolver);
		self
	}

	pub fn layer(&self) -> &ReporterConfigLayer {
		&self.layer
	}

	pub(crate) fn into_parts(
		self,
	) -> (
		ReporterConfigLayer,
		Option<Arc<dyn Transport>>,
		Option<Arc<dyn ContextResolver>>,
	) {
		(self.layer, self.transport, self.context)
	}
}

impl fmt::Debug for ReporterOptions {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ReporterOptions")
			.field("layer", &self.layer)
			.field("transport", &self.transport.is_some())
			.field("context", &self.context.is_some())
			.finish()
	}
}
