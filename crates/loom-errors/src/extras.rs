// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Per-capture extras: level, component, action, context, tags and an
//! explicit fingerprint, all optional.

use std::collections::HashMap;

use loom_errors_core::ErrorLevel;
use serde_json::{Map, Value};

/// Optional per-capture fields.
#[derive(Debug, Clone, Default)]
pub struct CaptureExtras {
	/// Overrides the level derived from the error.
	pub level: Option<ErrorLevel>,
	/// UI component or module the error came from. When set, the page URL
	/// is not attached.
	pub component: Option<String>,
	/// What the user was doing, e.g. `save_profile`.
	pub action: Option<String>,
	pub context: Map<String, Value>,
	/// Merged over the default tags; these win on conflict.
	pub tags: HashMap<String, String>,
	/// Replaces the computed fingerprint.
	pub fingerprint: Option<String>,
}

impl CaptureExtras {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn level(mut self, level: ErrorLevel) -> Self {
		self.level = Some(level);
		self
	}

	pub fn component(mut self, component: impl Into<String>) -> Self {
		self.component = Some(component.into());
		self
	}

	pub fn action(mut self, action: impl Into<String>) -> Self {
		self.action = Some(action.into());
		self
	}

	pub fn context(mut self, key: impl Into<String>, value: Value) -> Self {
		self.context.insert(key.into(), value);
		self
	}

	pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.tags.insert(key.into(), value.into());
		self
	}

	pub fn fingerprint(mut self, fingerprint: impl Into<String>) -> Self {
		self.fingerprint = Some(fingerprint.into());
		self
	}
}
