// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The error reporter.
//!
//! [`ErrorReporter`] is a cheaply cloneable handle created once at startup
//! and passed to whatever needs to report errors. Every public method is
//! infallible: failures inside the reporter, including panics in injected
//! collaborators, are absorbed at the boundary in [`crate::guard`].

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use loom_errors_core::{
	compute_fingerprint, iso_now, normalize, BreadcrumbTrail, ErrorLevel, ErrorReportPayload,
	NewBreadcrumb, RateDecision, RateLimiter, Reportable,
};
use tokio::runtime::Handle;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::config::{ReporterConfig, ReporterOptions};
use crate::context::{ContextResolver, NoContext};
use crate::delivery::{deliver_batch, DeliveryOutcome};
use crate::error::Result;
use crate::extras::CaptureExtras;
use crate::guard::{isolated, shielded, shielded_async};
use crate::transport::{HttpTransport, Transport};

/// Configuration and collaborators in effect after `init`.
struct ActiveConfig {
	config: ReporterConfig,
	endpoint_url: String,
	transport: Arc<dyn Transport>,
	context: Arc<dyn ContextResolver>,
}

#[derive(Default)]
struct ReporterState {
	active: Option<Arc<ActiveConfig>>,
	tags: HashMap<String, String>,
	queue: Vec<ErrorReportPayload>,
	breadcrumbs: BreadcrumbTrail,
	limiter: RateLimiter,
	user_id: Option<String>,
	worker: Option<JoinHandle<()>>,
}

impl ReporterState {
	/// The active configuration, if initialized and enabled.
	fn enabled(&self) -> Option<Arc<ActiveConfig>> {
		self
			.active
			.as_ref()
			.filter(|active| active.config.enabled)
			.cloned()
	}
}

#[derive(Default)]
struct ReporterInner {
	state: Mutex<ReporterState>,
	debug: AtomicBool,
	/// Held for the duration of a flush.
	flush_gate: tokio::sync::Mutex<()>,
	flush_notify: Arc<Notify>,
}

impl ReporterInner {
	fn lock_state(&self) -> MutexGuard<'_, ReporterState> {
		self.state.lock().unwrap_or_else(PoisonError::into_inner)
	}
}

/// Fire-and-forget error reporter.
///
/// ```ignore
/// let reporter = ErrorReporter::new();
/// reporter.init(ReporterOptions::new().release("1.2.3"));
/// reporter.add_breadcrumb(NewBreadcrumb::new("opened settings").category("navigation"));
/// reporter.capture_error(Reportable::from_error(&err), CaptureExtras::new().component("Settings"));
/// ```
#[derive(Clone, Default)]
pub struct ErrorReporter {
	inner: Arc<ReporterInner>,
}

impl ErrorReporter {
	/// Creates an uninitialized reporter. Every method is a no-op until
	/// [`ErrorReporter::init`] is called.
	pub fn new() -> Self {
		Self::default()
	}

	/// Applies `options` over the defaults and starts the periodic flush
	/// worker, replacing any previous one.
	///
	/// Safe to call more than once. Queued reports, breadcrumbs, rate-limit
	/// counters and the explicit user carry over; default tags are reset to
	/// the new configuration's. Outside a Tokio runtime the worker is started
	/// by the first capture made inside one.
	pub fn init(&self, options: ReporterOptions) {
		let debug = options.layer().debug.unwrap_or(false);
		shielded("init", debug, || self.try_init(options))
	}

	fn try_init(&self, options: ReporterOptions) -> Result<()> {
		let (layer, transport, context) = options.into_parts();
		let config = layer.finalize();

		let transport: Arc<dyn Transport> = match transport {
			Some(transport) => transport,
			None => {
				if !config.endpoint_is_absolute() {
					warn!(
						endpoint = %config.endpoint_url(),
						"Endpoint is relative and no base_url is set; the HTTP transport cannot deliver reports"
					);
				}
				Arc::new(HttpTransport::new(config.request_timeout)?)
			}
		};
		let context: Arc<dyn ContextResolver> = context.unwrap_or_else(|| Arc::new(NoContext));

		let active = Arc::new(ActiveConfig {
			endpoint_url: config.endpoint_url(),
			config,
			transport,
			context,
		});
		self.inner.debug.store(active.config.debug, Ordering::SeqCst);

		let mut state = self.inner.lock_state();
		if let Some(previous) = state.worker.take() {
			previous.abort();
		}
		state.tags = active.config.default_tags.clone();
		state.breadcrumbs.set_capacity(active.config.max_breadcrumbs);
		state.limiter.reconfigure(
			active.config.rate_limit_max_events,
			active.config.rate_limit_window,
		);
		state.worker = if active.config.enabled {
			self.spawn_worker(active.config.flush_interval)
		} else {
			None
		};
		let worker_started = state.worker.is_some();
		state.active = Some(Arc::clone(&active));
		drop(state);

		if active.config.enabled && !worker_started {
			warn!("No Tokio runtime available; the flush worker starts with the first capture made inside one");
		}

		info!(
			endpoint = %active.endpoint_url,
			platform = %active.config.platform,
			environment = %active.config.environment,
			enabled = active.config.enabled,
			"Error reporter initialized"
		);
		Ok(())
	}

	fn spawn_worker(&self, period: Duration) -> Option<JoinHandle<()>> {
		let handle = Handle::try_current().ok()?;
		let inner = Arc::downgrade(&self.inner);
		let notify = Arc::clone(&self.inner.flush_notify);
		Some(handle.spawn(run_worker(inner, notify, period)))
	}

	/// Stops the flush worker, marks the reporter uninitialized and starts one
	/// final send of whatever is queued without waiting for it. Outside a
	/// Tokio runtime nothing is sent and the queue waits for the next `init`.
	pub fn destroy(&self) {
		shielded("destroy", self.debug(), || {
			let runtime = Handle::try_current().ok();
			let pending = self.teardown(runtime.is_some());
			if let (Some(handle), Some((active, items))) = (runtime, pending) {
				handle.spawn(async move {
					deliver_batch(
						active.transport.as_ref(),
						&active.endpoint_url,
						items,
						&active.config.retry,
						active.config.debug,
					)
					.await;
				});
			}
			info!("Error reporter destroyed");
			Ok(())
		})
	}

	/// Like [`ErrorReporter::destroy`], but waits for the final send.
	pub async fn shutdown(&self) {
		let debug = self.debug();
		shielded_async("shutdown", debug, self.try_shutdown()).await
	}

	async fn try_shutdown(&self) -> Result<()> {
		let runtime = Handle::try_current().ok();
		let pending = self.teardown(runtime.is_some());
		if let (Some(handle), Some((active, items))) = (runtime, pending) {
			send_detached(&handle, active, items).await?;
		}
		info!("Error reporter shut down");
		Ok(())
	}

	/// Aborts the worker, marks the reporter uninitialized and takes the
	/// queue if there is anything to send. Without a runtime to send on, the
	/// queue is left in place for the next `init`.
	fn teardown(&self, can_send: bool) -> Option<(Arc<ActiveConfig>, Vec<ErrorReportPayload>)> {
		let mut state = self.inner.lock_state();
		if let Some(worker) = state.worker.take() {
			worker.abort();
		}
		let active = state.active.take()?;
		if !active.config.enabled || state.queue.is_empty() {
			return None;
		}
		if !can_send {
			if active.config.debug {
				debug!(
					count = state.queue.len(),
					"No Tokio runtime; keeping queued error reports for the next init"
				);
			}
			return None;
		}
		let items = std::mem::take(&mut state.queue);
		Some((active, items))
	}

	pub fn is_initialized(&self) -> bool {
		self.inner.lock_state().active.is_some()
	}

	/// True when initialized with `enabled` set.
	pub fn is_enabled(&self) -> bool {
		self.inner.lock_state().enabled().is_some()
	}

	/// Reports waiting for the next flush.
	pub fn queue_len(&self) -> usize {
		self.inner.lock_state().queue.len()
	}

	pub fn breadcrumb_count(&self) -> usize {
		self.inner.lock_state().breadcrumbs.len()
	}

	/// Reports an error.
	///
	/// Accepts anything convertible into a [`Reportable`]: a string, a JSON
	/// value, or [`Reportable::from_error`] for a Rust error. The level
	/// defaults to `error` when a stack trace is available and `warning`
	/// otherwise.
	pub fn capture_error(&self, error: impl Into<Reportable>, extras: CaptureExtras) {
		shielded("capture_error", self.debug(), || {
			let Some(active) = self.enabled() else {
				return Ok(());
			};

			let normalized = normalize(&error.into());
			let level = extras
				.level
				.unwrap_or_else(|| ErrorLevel::default_for(normalized.stack.is_some()));
			self.enqueue(&active, normalized.message, normalized.stack, level, extras);
			Ok(())
		})
	}

	/// Reports a message without a stack trace. `level` falls back to
	/// `extras.level`, then to `warning`.
	pub fn capture_message(
		&self,
		message: impl Into<String>,
		level: Option<ErrorLevel>,
		extras: CaptureExtras,
	) {
		shielded("capture_message", self.debug(), || {
			let Some(active) = self.enabled() else {
				return Ok(());
			};

			let level = level.or(extras.level).unwrap_or(ErrorLevel::Warning);
			self.enqueue(&active, message.into(), None, level, extras);
			Ok(())
		})
	}

	fn enqueue(
		&self,
		active: &ActiveConfig,
		message: String,
		stack_trace: Option<String>,
		level: ErrorLevel,
		extras: CaptureExtras,
	) {
		let debug = active.config.debug;
		let fingerprint = extras
			.fingerprint
			.unwrap_or_else(|| compute_fingerprint(&message, stack_trace.as_deref()));

		let explicit_user = {
			let mut state = self.inner.lock_state();
			let now = Instant::now().into_std();
			if state.limiter.check(&fingerprint, now) == RateDecision::Limited {
				if debug {
					debug!(fingerprint = %fingerprint, "Error report rate limited");
				}
				return;
			}
			state.user_id.clone()
		};

		// Host callbacks run outside the lock.
		let user_id = explicit_user.or_else(|| isolated(|| active.context.user_id()));
		let url = match extras.component {
			Some(_) => None,
			None => isolated(|| active.context.url()),
		};

		let mut state = self.inner.lock_state();
		if state.enabled().is_none() {
			return;
		}

		let mut tags = state.tags.clone();
		tags.extend(extras.tags);
		let breadcrumbs = state.breadcrumbs.snapshot();

		state.queue.push(ErrorReportPayload {
			message,
			stack_trace,
			level,
			platform: active.config.platform,
			environment: active.config.environment.clone(),
			release: active.config.release.clone(),
			user_id,
			url,
			component: extras.component,
			action: extras.action,
			breadcrumbs,
			context: extras.context,
			tags,
			fingerprint,
			timestamp: Some(iso_now()),
		});

		let overflow = state
			.queue
			.len()
			.saturating_sub(active.config.max_buffered_reports);
		if overflow > 0 {
			state.queue.drain(..overflow);
			if debug {
				debug!(dropped = overflow, "Error report buffer full; dropped the oldest reports");
			}
		}

		// No worker yet, or its runtime has since shut down.
		if state.worker.as_ref().map_or(true, JoinHandle::is_finished) {
			state.worker = self.spawn_worker(active.config.flush_interval);
		}

		let full = state.queue.len() >= active.config.max_queue_size;
		drop(state);

		if full {
			self.inner.flush_notify.notify_one();
		}
	}

	/// Records a breadcrumb. Category defaults to `custom`, level to `info`.
	pub fn add_breadcrumb(&self, breadcrumb: NewBreadcrumb) {
		shielded("add_breadcrumb", self.debug(), || {
			let mut state = self.inner.lock_state();
			if state.enabled().is_some() {
				state.breadcrumbs.push(breadcrumb.into_breadcrumb(iso_now()));
			}
			Ok(())
		})
	}

	pub fn clear_breadcrumbs(&self) {
		shielded("clear_breadcrumbs", self.debug(), || {
			let mut state = self.inner.lock_state();
			if state.enabled().is_some() {
				state.breadcrumbs.clear();
			}
			Ok(())
		})
	}

	/// Sets the user attached to future reports, overriding the context
	/// resolver. `None` goes back to the resolver.
	pub fn set_user(&self, user_id: Option<String>) {
		shielded("set_user", self.debug(), || {
			let mut state = self.inner.lock_state();
			if state.enabled().is_some() {
				state.user_id = user_id;
			}
			Ok(())
		})
	}

	/// Merges `tags` into the tags attached to every future report.
	pub fn set_tags(&self, tags: HashMap<String, String>) {
		shielded("set_tags", self.debug(), || {
			let mut state = self.inner.lock_state();
			if state.enabled().is_some() {
				state.tags.extend(tags);
			}
			Ok(())
		})
	}

	/// Sends everything queued as one batch.
	///
	/// Returns once the batch is delivered or dropped. If another flush is
	/// already in flight, or there is no Tokio runtime to send on, this
	/// returns immediately and the queue is left for the next flush.
	pub async fn flush(&self) {
		let debug = self.debug();
		shielded_async("flush", debug, self.try_flush(debug)).await
	}

	async fn try_flush(&self, debug: bool) -> Result<()> {
		let Ok(runtime) = Handle::try_current() else {
			if debug {
				debug!("No Tokio runtime; leaving queue for a flush made inside one");
			}
			return Ok(());
		};
		let Ok(_gate) = self.inner.flush_gate.try_lock() else {
			if debug {
				debug!("Flush already in progress; leaving queue for the next one");
			}
			return Ok(());
		};

		let drained = {
			let mut state = self.inner.lock_state();
			match state.enabled() {
				Some(active) if !state.queue.is_empty() => {
					Some((active, std::mem::take(&mut state.queue)))
				}
				_ => None,
			}
		};

		if let Some((active, items)) = drained {
			send_detached(&runtime, active, items).await?;
		}
		Ok(())
	}

	fn sweep_rate_limits(&self) {
		let mut state = self.inner.lock_state();
		let removed = state.limiter.sweep_expired(Instant::now().into_std());
		if removed > 0 && self.debug() {
			debug!(removed, "Swept expired rate-limit entries");
		}
	}

	fn enabled(&self) -> Option<Arc<ActiveConfig>> {
		self.inner.lock_state().enabled()
	}

	fn debug(&self) -> bool {
		self.inner.debug.load(Ordering::SeqCst)
	}
}

impl fmt::Debug for ErrorReporter {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let state = self.inner.lock_state();
		f.debug_struct("ErrorReporter")
			.field("initialized", &state.active.is_some())
			.field("queued", &state.queue.len())
			.field("breadcrumbs", &state.breadcrumbs.len())
			.finish()
	}
}

/// Delivers on its own task so that dropping the caller's future does not
/// cancel a request that is already on the wire.
async fn send_detached(
	runtime: &Handle,
	active: Arc<ActiveConfig>,
	items: Vec<ErrorReportPayload>,
) -> Result<DeliveryOutcome> {
	let task = runtime.spawn(async move {
		deliver_batch(
			active.transport.as_ref(),
			&active.endpoint_url,
			items,
			&active.config.retry,
			active.config.debug,
		)
		.await
	});
	Ok(task.await?)
}

async fn run_worker(inner: Weak<ReporterInner>, notify: Arc<Notify>, period: Duration) {
	let mut ticker = tokio::time::interval(period);
	ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
	// The first tick completes immediately.
	ticker.tick().await;

	debug!(flush_interval_ms = period.as_millis() as u64, "Error reporter flush worker started");

	loop {
		let periodic = tokio::select! {
			_ = ticker.tick() => true,
			_ = notify.notified() => false,
		};

		let Some(inner) = inner.upgrade() else {
			break;
		};
		let reporter = ErrorReporter { inner };
		if periodic {
			reporter.sweep_rate_limits();
		}
		reporter.flush().await;
	}

	debug!("Error reporter flush worker stopped");
}
