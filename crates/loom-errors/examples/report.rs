// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Example: report a few errors to an ingestion endpoint.
//!
//! Run with:
//!   LOOM_ERRORS_URL=http://localhost:8080 RUST_LOG=loom_errors=debug \
//!     cargo run --example report -p loom-errors

use std::sync::Arc;

use loom_errors::{
	CaptureExtras, ErrorLevel, ErrorReporter, FnContext, NewBreadcrumb, Platform, Reportable,
	ReporterOptions,
};
use serde_json::json;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
		.init();

	let base_url =
		std::env::var("LOOM_ERRORS_URL").unwrap_or_else(|_| "http://localhost:8080".to_string());

	let reporter = ErrorReporter::new();
	reporter.init(
		ReporterOptions::new()
			.base_url(&base_url)
			.platform(Platform::Server)
			.environment("development")
			.release(env!("CARGO_PKG_VERSION"))
			.default_tag("example", "true")
			.debug(true)
			.context_resolver(Arc::new(
				FnContext::new().with_user_id(|| std::env::var("USER").ok()),
			)),
	);

	println!("Reporting to {base_url}/api/errors");

	reporter.add_breadcrumb(NewBreadcrumb::new("example started").category("startup"));
	reporter.add_breadcrumb(
		NewBreadcrumb::new("reading config")
			.category("io")
			.data("path", json!("/etc/example.toml")),
	);

	match std::fs::read_to_string("/etc/example.toml") {
		Ok(_) => println!("Config found; nothing to report"),
		Err(e) => reporter.capture_error(
			Reportable::from_error(&e),
			CaptureExtras::new()
				.component("config")
				.action("load")
				.context("path", json!("/etc/example.toml")),
		),
	}

	reporter.capture_message(
		"Cache warmup took longer than expected",
		Some(ErrorLevel::Info),
		CaptureExtras::new().tag("subsystem", "cache"),
	);

	reporter.capture_error(
		json!({ "message": "Webview script error", "stack": "at render (app.js:12:4)" }),
		CaptureExtras::default(),
	);

	println!("Queued {} report(s); shutting down", reporter.queue_len());
	reporter.shutdown().await;
	println!("Done");
}
