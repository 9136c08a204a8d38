// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The failure boundary wrapped around every public reporter method and
//! every call into host-supplied code.
//!
//! Errors and panics are both absorbed and replaced by `T::default()`; the
//! host application never observes a failure from the reporter.

use std::any::Any;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};

use futures::FutureExt;
use tracing::warn;

use crate::error::Result;

/// Runs `f`, absorbing any error or panic.
pub(crate) fn shielded<T, F>(op: &'static str, debug: bool, f: F) -> T
where
	T: Default,
	F: FnOnce() -> Result<T>,
{
	match panic::catch_unwind(AssertUnwindSafe(f)) {
		Ok(Ok(value)) => value,
		Ok(Err(err)) => {
			if debug {
				warn!(op, error = %err, "error reporter absorbed a failure");
			}
			T::default()
		}
		Err(payload) => {
			if debug {
				warn!(op, panic = %panic_message(payload.as_ref()), "error reporter absorbed a panic");
			}
			T::default()
		}
	}
}

/// Async counterpart of [`shielded`]. Panics raised while the future is
/// polled are absorbed as well.
pub(crate) async fn shielded_async<T, Fut>(op: &'static str, debug: bool, fut: Fut) -> T
where
	T: Default,
	Fut: Future<Output = Result<T>>,
{
	match AssertUnwindSafe(fut).catch_unwind().await {
		Ok(Ok(value)) => value,
		Ok(Err(err)) => {
			if debug {
				warn!(op, error = %err, "error reporter absorbed a failure");
			}
			T::default()
		}
		Err(payload) => {
			if debug {
				warn!(op, panic = %panic_message(payload.as_ref()), "error reporter absorbed a panic");
			}
			T::default()
		}
	}
}

/// Calls into host-supplied code that has no error channel of its own,
/// mapping a panic to `None`.
pub(crate) fn isolated<T>(f: impl FnOnce() -> Option<T>) -> Option<T> {
	panic::catch_unwind(AssertUnwindSafe(f)).unwrap_or(None)
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
	if let Some(message) = payload.downcast_ref::<&str>() {
		(*message).to_string()
	} else if let Some(message) = payload.downcast_ref::<String>() {
		message.clone()
	} else {
		"non-string panic payload".to_string()
	}
}
