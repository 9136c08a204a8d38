// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Delivery of encoded batches to the ingestion endpoint.

use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::Client;

use crate::error::{ReporterError, Result};

/// SDK version for identification.
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");
/// SDK name for identification.
pub const SDK_NAME: &str = "loom-errors-rust";

/// Sends one encoded batch and reports the HTTP status it got back.
///
/// Implementations only report what happened; deciding whether a status
/// counts as delivered and whether to retry is done by the caller. Inject a
/// custom implementation where the default HTTP client is unavailable or
/// for tests.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
	/// POSTs `body` (a JSON document) to `url`.
	async fn send(&self, url: &str, body: String) -> Result<u16>;
}

/// Default transport: a `reqwest` client with a bounded request timeout.
///
/// Sends run on a Tokio task that is detached from whatever triggered the
/// flush, so a caller going away does not cancel an in-flight request.
#[derive(Debug, Clone)]
pub struct HttpTransport {
	client: Client,
}

impl HttpTransport {
	/// Builds a client with the SDK User-Agent and the given timeout.
	pub fn new(timeout: Duration) -> Result<Self> {
		let client = Client::builder()
			.user_agent(user_agent())
			.timeout(timeout)
			.build()
			.map_err(ReporterError::RequestFailed)?;
		Ok(Self { client })
	}

	/// Wraps an existing client, e.g. one shared with the host application.
	pub fn from_client(client: Client) -> Self {
		Self { client }
	}
}

#[async_trait::async_trait]
impl Transport for HttpTransport {
	async fn send(&self, url: &str, body: String) -> Result<u16> {
		let response = self
			.client
			.post(url)
			.header(CONTENT_TYPE, "application/json")
			.body(body)
			.send()
			.await?;

		Ok(response.status().as_u16())
	}
}

/// User-Agent sent by [`HttpTransport`]: `loom-errors-rust/{version}`.
pub fn user_agent() -> String {
	format!("{SDK_NAME}/{SDK_VERSION}")
}

/// True for `http://` and `https://` URLs, the only ones [`HttpTransport`]
/// can send to.
pub fn is_absolute_url(url: &str) -> bool {
	url.starts_with("http://") || url.starts_with("https://")
}

/// Resolves the configured endpoint against an optional base URL.
///
/// Absolute endpoints are used as-is; relative ones are appended to
/// `base_url` when one is configured.
pub fn resolve_endpoint(endpoint: &str, base_url: Option<&str>) -> String {
	if is_absolute_url(endpoint) {
		return endpoint.to_string();
	}

	match base_url {
		Some(base) => {
			let base = base.trim_end_matches('/');
			if endpoint.starts_with('/') {
				format!("{base}{endpoint}")
			} else {
				format!("{base}/{endpoint}")
			}
		}
		None => endpoint.to_string(),
	}
}
