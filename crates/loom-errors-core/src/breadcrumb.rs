// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Breadcrumbs (events leading up to a report) and the bounded trail that
//! holds them.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::level::ErrorLevel;

/// Maximum number of breadcrumbs to keep.
pub const MAX_BREADCRUMBS: usize = 100;

/// Category used when the caller does not supply one.
pub const DEFAULT_CATEGORY: &str = "custom";

/// A recorded breadcrumb.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBreadcrumb {
	pub timestamp: String,
	/// "navigation", "http", "ui", "console", ...
	pub category: String,
	pub message: String,
	pub level: ErrorLevel,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub data: Option<serde_json::Map<String, serde_json::Value>>,
}

/// Caller-supplied breadcrumb fields. The timestamp and any missing
/// category or level are filled in when the breadcrumb is recorded.
#[derive(Debug, Clone, Default)]
pub struct NewBreadcrumb {
	pub category: Option<String>,
	pub message: String,
	pub level: Option<ErrorLevel>,
	pub data: Option<serde_json::Map<String, serde_json::Value>>,
}

impl NewBreadcrumb {
	pub fn new(message: impl Into<String>) -> Self {
		Self {
			message: message.into(),
			..Default::default()
		}
	}

	pub fn category(mut self, category: impl Into<String>) -> Self {
		self.category = Some(category.into());
		self
	}

	pub fn level(mut self, level: ErrorLevel) -> Self {
		self.level = Some(level);
		self
	}

	/// Adds one key to the breadcrumb's data map.
	pub fn data(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
		self
			.data
			.get_or_insert_with(serde_json::Map::new)
			.insert(key.into(), value);
		self
	}

	/// Stamps the breadcrumb and applies the category/level defaults.
	pub fn into_breadcrumb(self, timestamp: String) -> ErrorBreadcrumb {
		ErrorBreadcrumb {
			timestamp,
			category: self
				.category
				.unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
			message: self.message,
			level: self.level.unwrap_or(ErrorLevel::Info),
			data: self.data,
		}
	}
}

/// Bounded FIFO of recent breadcrumbs. Once full, each push evicts the
/// oldest entry.
#[derive(Debug, Clone)]
pub struct BreadcrumbTrail {
	entries: VecDeque<ErrorBreadcrumb>,
	capacity: usize,
}

impl BreadcrumbTrail {
	pub fn new(capacity: usize) -> Self {
		Self {
			entries: VecDeque::with_capacity(capacity.min(MAX_BREADCRUMBS)),
			capacity,
		}
	}

	pub fn push(&mut self, breadcrumb: ErrorBreadcrumb) {
		self.entries.push_back(breadcrumb);
		self.trim();
	}

	/// Changes the capacity, dropping the oldest entries if the trail is
	/// now over it.
	pub fn set_capacity(&mut self, capacity: usize) {
		self.capacity = capacity;
		self.trim();
	}

	/// Returns an independent copy of the trail, oldest first.
	pub fn snapshot(&self) -> Vec<ErrorBreadcrumb> {
		self.entries.iter().cloned().collect()
	}

	pub fn iter(&self) -> impl Iterator<Item = &ErrorBreadcrumb> {
		self.entries.iter()
	}

	pub fn clear(&mut self) {
		self.entries.clear();
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn capacity(&self) -> usize {
		self.capacity
	}

	fn trim(&mut self) {
		while self.entries.len() > self.capacity {
			self.entries.pop_front();
		}
	}
}

impl Default for BreadcrumbTrail {
	fn default() -> Self {
		Self::new(MAX_BREADCRUMBS)
	}
}
