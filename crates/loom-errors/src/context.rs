// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Host-supplied context looked up lazily at capture time.

use std::fmt;

/// Resolves the current user and location when a report is captured.
///
/// Both methods are called fresh for every capture and never cached. A
/// panic inside either is treated as "unknown". An explicit user set with
/// `ErrorReporter::set_user` takes precedence over [`ContextResolver::user_id`].
pub trait ContextResolver: Send + Sync {
	fn user_id(&self) -> Option<String> {
		None
	}

	/// Current page URL or screen route.
	fn url(&self) -> Option<String> {
		None
	}
}

/// Resolver that knows nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoContext;

impl ContextResolver for NoContext {}

type Lookup = Box<dyn Fn() -> Option<String> + Send + Sync>;

/// Resolver backed by closures.
///
/// ```ignore
/// let resolver = FnContext::new()
///     .with_user_id(|| session.current_user())
///     .with_url(|| router.current_route());
/// ```
#[derive(Default)]
pub struct FnContext {
	user_id: Option<Lookup>,
	url: Option<Lookup>,
}

impl FnContext {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_user_id(mut self, f: impl Fn() -> Option<String> + Send + Sync + 'static) -> Self {
		self.user_id = Some(Box::new(f));
		self
	}

	pub fn with_url(mut self, f: impl Fn() -> Option<String> + Send + Sync + 'static) -> Self {
		self.url = Some(Box::new(f));
		self
	}
}

impl ContextResolver for FnContext {
	fn user_id(&self) -> Option<String> {
		self.user_id.as_ref().and_then(|f| f())
	}

	fn url(&self) -> Option<String> {
		self.url.as_ref().and_then(|f| f())
	}
}

impl fmt::Debug for FnContext {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("FnContext")
			.field("user_id", &self.user_id.is_some())
			.field("url", &self.url.is_some())
			.finish()
	}
}
