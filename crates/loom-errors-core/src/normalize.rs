// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Turning whatever the caller hands to `capture_error` into a message and
//! an optional stack trace.

use std::backtrace::{Backtrace, BacktraceStatus};
use std::fmt;

use serde_json::Value;

/// Anything that can be reported as an error.
#[derive(Debug, Clone)]
pub enum Reportable {
	/// An exception-like value with its own message and stack.
	Exception {
		message: String,
		stack: Option<String>,
	},
	/// A plain string.
	Message(String),
	/// An arbitrary structured value, e.g. an error object forwarded from a
	/// webview.
	Object(Value),
}

impl Reportable {
	pub fn exception(message: impl Into<String>, stack: Option<String>) -> Self {
		Self::Exception {
			message: message.into(),
			stack,
		}
	}

	/// Captures a Rust error. A backtrace is attached when backtraces are
	/// enabled for the process (`RUST_BACKTRACE`).
	pub fn from_error<E>(error: &E) -> Self
	where
		E: std::error::Error + ?Sized,
	{
		let backtrace = Backtrace::capture();
		let stack = match backtrace.status() {
			BacktraceStatus::Captured => Some(backtrace.to_string()),
			_ => None,
		};

		Self::Exception {
			message: error.to_string(),
			stack,
		}
	}

	/// Reports any displayable value by its string form.
	pub fn display(value: impl fmt::Display) -> Self {
		Self::Message(value.to_string())
	}
}

impl From<&str> for Reportable {
	fn from(message: &str) -> Self {
		Self::Message(message.to_string())
	}
}

impl From<String> for Reportable {
	fn from(message: String) -> Self {
		Self::Message(message)
	}
}

impl From<Value> for Reportable {
	fn from(value: Value) -> Self {
		Self::Object(value)
	}
}

/// Message and stack extracted from a [`Reportable`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedError {
	pub message: String,
	pub stack: Option<String>,
}

/// Extracts message and stack. Never fails: unrecognised shapes fall back to
/// their JSON text.
pub fn normalize(input: &Reportable) -> NormalizedError {
	match input {
		Reportable::Exception { message, stack } => NormalizedError {
			message: message.clone(),
			stack: non_empty(stack.as_deref()),
		},
		Reportable::Message(message) => NormalizedError {
			message: message.clone(),
			stack: None,
		},
		Reportable::Object(value) => normalize_value(value),
	}
}

fn normalize_value(value: &Value) -> NormalizedError {
	match value {
		Value::Object(map) => {
			let message = match map.get("message") {
				Some(Value::String(message)) => message.clone(),
				_ => value.to_string(),
			};
			let stack = match map.get("stack") {
				Some(Value::String(stack)) => non_empty(Some(stack)),
				_ => None,
			};
			NormalizedError { message, stack }
		}
		Value::String(message) => NormalizedError {
			message: message.clone(),
			stack: None,
		},
		other => NormalizedError {
			message: other.to_string(),
			stack: None,
		},
	}
}

fn non_empty(stack: Option<&str>) -> Option<String> {
	stack
		.filter(|s| !s.trim().is_empty())
		.map(|s| s.to_string())
}
