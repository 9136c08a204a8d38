// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Test doubles shared by the unit tests.

use std::collections::{HashMap, VecDeque};
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use loom_errors_core::{ErrorLevel, ErrorReportPayload, Platform};

use crate::error::{ReporterError, Result};
use crate::transport::Transport;

/// What a [`MockTransport`] answers with.
#[derive(Debug, Clone, Copy)]
pub enum Reply {
	Status(u16),
	NetworkError,
}

/// Records every send and answers from a script, then with a fallback.
pub struct MockTransport {
	calls: AtomicUsize,
	sent: Mutex<Vec<(String, String)>>,
	script: Mutex<VecDeque<Reply>>,
	fallback: Reply,
	delay: Option<Duration>,
}

impl MockTransport {
	/// Answers 200 to everything.
	pub fn new() -> Self {
		Self::always(Reply::Status(200))
	}

	pub fn always(reply: Reply) -> Self {
		Self {
			calls: AtomicUsize::new(0),
			sent: Mutex::new(Vec::new()),
			script: Mutex::new(VecDeque::new()),
			fallback: reply,
			delay: None,
		}
	}

	/// Plays `replies` in order, then answers 200.
	pub fn scripted(replies: impl IntoIterator<Item = Reply>) -> Self {
		let transport = Self::new();
		transport.script.lock().unwrap().extend(replies);
		transport
	}

	/// Sleeps for `delay` before answering each send.
	pub fn slow(delay: Duration) -> Self {
		Self {
			delay: Some(delay),
			..Self::new()
		}
	}

	pub fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}

	pub fn bodies(&self) -> Vec<String> {
		self.sent.lock().unwrap().iter().map(|(_, body)| body.clone()).collect()
	}

	pub fn urls(&self) -> Vec<String> {
		self.sent.lock().unwrap().iter().map(|(url, _)| url.clone()).collect()
	}

	/// Bodies parsed as JSON.
	pub fn json_bodies(&self) -> Vec<serde_json::Value> {
		self
			.bodies()
			.iter()
			.map(|body| serde_json::from_str(body).unwrap())
			.collect()
	}
}

#[async_trait::async_trait]
impl Transport for MockTransport {
	async fn send(&self, url: &str, body: String) -> Result<u16> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		self.sent.lock().unwrap().push((url.to_string(), body));

		if let Some(delay) = self.delay {
			tokio::time::sleep(delay).await;
		}

		let reply = self.script.lock().unwrap().pop_front().unwrap_or(self.fallback);
		match reply {
			Reply::Status(status) => Ok(status),
			Reply::NetworkError => Err(ReporterError::Transport("connection refused".to_string())),
		}
	}
}

/// A transport with a bug in it.
#[derive(Default)]
pub struct PanickingTransport {
	pub calls: AtomicUsize,
}

#[async_trait::async_trait]
impl Transport for PanickingTransport {
	async fn send(&self, _url: &str, _body: String) -> Result<u16> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		panic!("transport bug");
	}
}

/// Collects formatted log lines so tests can assert on what was logged.
#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
	/// Runs `f` with a subscriber that writes into this buffer.
	pub fn capture<T>(&self, f: impl FnOnce() -> T) -> T {
		let writer = self.clone();
		let subscriber = tracing_subscriber::fmt()
			.with_writer(move || writer.clone())
			.with_ansi(false)
			.finish();
		tracing::subscriber::with_default(subscriber, f)
	}

	pub fn contents(&self) -> String {
		String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
	}
}

impl io::Write for LogBuffer {
	fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
		self.0.lock().unwrap().extend_from_slice(buf);
		Ok(buf.len())
	}

	fn flush(&mut self) -> io::Result<()> {
		Ok(())
	}
}

pub fn payload(message: &str) -> ErrorReportPayload {
	ErrorReportPayload {
		message: message.to_string(),
		stack_trace: None,
		level: ErrorLevel::Error,
		platform: Platform::Web,
		environment: "test".to_string(),
		release: None,
		user_id: None,
		url: None,
		component: None,
		action: None,
		breadcrumbs: Vec::new(),
		context: serde_json::Map::new(),
		tags: HashMap::new(),
		fingerprint: loom_errors_core::compute_fingerprint(message, None),
		timestamp: None,
	}
}
