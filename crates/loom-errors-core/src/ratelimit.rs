// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Per-fingerprint windowed rate limiting, applied before a report is
//! queued so floods of the same error never reach the network.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Reports allowed per fingerprint within one window.
pub const DEFAULT_MAX_EVENTS: u32 = 5;

/// Length of the rate-limit window.
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(60);

/// Result of a rate-limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
	Allowed,
	Limited,
}

#[derive(Debug, Clone)]
struct RateLimitEntry {
	count: u32,
	reset_at: Instant,
}

/// Counts reports per fingerprint. A fingerprint that exceeds `max_events`
/// within `window` is limited until its window resets.
///
/// Callers pass `now` explicitly so tests can drive the clock.
#[derive(Debug, Clone)]
pub struct RateLimiter {
	max_events: u32,
	window: Duration,
	entries: HashMap<String, RateLimitEntry>,
}

impl RateLimiter {
	pub fn new(max_events: u32, window: Duration) -> Self {
		Self {
			max_events,
			window,
			entries: HashMap::new(),
		}
	}

	/// Changes the limits. Existing counters keep their current windows.
	pub fn reconfigure(&mut self, max_events: u32, window: Duration) {
		self.max_events = max_events;
		self.window = window;
	}

	/// Records one report for `fingerprint` and decides whether it may be
	/// queued.
	pub fn check(&mut self, fingerprint: &str, now: Instant) -> RateDecision {
		let fresh = RateLimitEntry {
			count: 1,
			reset_at: now + self.window,
		};

		let entry = match self.entries.entry(fingerprint.to_string()) {
			Entry::Vacant(slot) => {
				slot.insert(fresh);
				return RateDecision::Allowed;
			}
			Entry::Occupied(slot) => slot.into_mut(),
		};

		if now >= entry.reset_at {
			*entry = fresh;
			return RateDecision::Allowed;
		}

		entry.count = entry.count.saturating_add(1);
		if entry.count > self.max_events {
			RateDecision::Limited
		} else {
			RateDecision::Allowed
		}
	}

	/// Drops entries whose window has already reset. An expired entry
	/// behaves exactly like a missing one, so this only reclaims memory.
	pub fn sweep_expired(&mut self, now: Instant) -> usize {
		let before = self.entries.len();
		self.entries.retain(|_, entry| now < entry.reset_at);
		before - self.entries.len()
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn clear(&mut self) {
		self.entries.clear();
	}
}

impl Default for RateLimiter {
	fn default() -> Self {
		Self::new(DEFAULT_MAX_EVENTS, DEFAULT_WINDOW)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	#[test]
	fn sixth_event_in_window_is_limited() {
		let mut limiter = RateLimiter::default();
		let now = Instant::now();

		for _ in 0..5 {
			assert_eq!(limiter.check("fp", now), RateDecision::Allowed);
		}
		assert_eq!(limiter.check("fp", now), RateDecision::Limited);
		assert_eq!(
			limiter.check("fp", now + Duration::from_secs(59)),
			RateDecision::Limited
		);
	}

	#[test]
	fn window_reset_allows_again() {
		let mut limiter = RateLimiter::default();
		let start = Instant::now();

		for _ in 0..6 {
			limiter.check("fp", start);
		}
		assert_eq!(
			limiter.check("fp", start + DEFAULT_WINDOW),
			RateDecision::Allowed
		);
		for _ in 0..4 {
			assert_eq!(
				limiter.check("fp", start + DEFAULT_WINDOW),
				RateDecision::Allowed
			);
		}
		assert_eq!(
			limiter.check("fp", start + DEFAULT_WINDOW),
			RateDecision::Limited
		);
	}

	#[test]
	fn fingerprints_are_independent() {
		let mut limiter = RateLimiter::new(1, DEFAULT_WINDOW);
		let now = Instant::now();

		assert_eq!(limiter.check("a", now), RateDecision::Allowed);
		assert_eq!(limiter.check("a", now), RateDecision::Limited);
		assert_eq!(limiter.check("b", now), RateDecision::Allowed);
	}

	#[test]
	fn sweep_removes_only_expired_entries() {
		let mut limiter = RateLimiter::default();
		let start = Instant::now();

		limiter.check("old", start);
		limiter.check("new", start + Duration::from_secs(30));

		let removed = limiter.sweep_expired(start + Duration::from_secs(61));
		assert_eq!(removed, 1);
		assert_eq!(limiter.len(), 1);
	}

	#[test]
	fn sweep_does_not_change_decisions() {
		let mut swept = RateLimiter::default();
		let mut unswept = RateLimiter::default();
		let start = Instant::now();

		for _ in 0..6 {
			swept.check("fp", start);
			unswept.check("fp", start);
		}
		let later = start + Duration::from_secs(90);
		swept.sweep_expired(later);

		assert_eq!(swept.check("fp", later), unswept.check("fp", later));
	}

	proptest! {
		#[test]
		fn allows_exactly_max_events_per_window(max in 1..20u32, attempts in 0..60u32) {
			let mut limiter = RateLimiter::new(max, DEFAULT_WINDOW);
			let now = Instant::now();
			let allowed = (0..attempts)
				.filter(|_| limiter.check("fp", now) == RateDecision::Allowed)
				.count() as u32;
			prop_assert_eq!(allowed, attempts.min(max));
		}
	}
}
