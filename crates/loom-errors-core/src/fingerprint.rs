// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Fingerprinting algorithm for grouping similar reports on the client.
//!
//! The fingerprint is built from:
//! 1. The message, lowercased, with volatile parts (UUIDs, numbers, long
//!    quoted strings) replaced by placeholders
//! 2. Up to three leading stack frames, as `function@file` where possible
//!
//! and hashed with a pair of djb2-style rolling hashes. The output must stay
//! stable across releases because the ingestion side groups on it.

use std::sync::LazyLock;

use regex::{NoExpand, Regex};

/// Number of stack frames that contribute to the fingerprint.
const MAX_FRAMES: usize = 3;

const SEED_PRIMARY: u32 = 5381;
const SEED_SECONDARY: u32 = 52711;

static UUID_REGEX: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"(?i)[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}").unwrap()
});

static NUMBER_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[0-9]+").unwrap());

/// Quoted strings at least this long, in UTF-16 code units, are collapsed.
const LONG_STRING_UNITS: usize = 50;

// The extension class is spelled out because `\w` is Unicode-aware here and
// the ingestion side only treats ASCII word characters as an extension.
static FRAME_REGEX: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"at\s+(\S+)\s+\(?(?:.*[/\\])?([^/\\\s:()]+\.[A-Za-z0-9_]+)").unwrap()
});

/// Compute the 16 hex character fingerprint for a message and optional
/// stack trace.
pub fn compute_fingerprint(message: &str, stack: Option<&str>) -> String {
	dual_djb2(&fingerprint_key(message, stack))
}

/// The string that gets hashed: the normalized message followed by
/// `|frame` for each extracted frame.
pub fn fingerprint_key(message: &str, stack: Option<&str>) -> String {
	let mut key = normalize_message(message);

	if let Some(stack) = stack {
		for frame in extract_frames(stack) {
			key.push('|');
			key.push_str(&frame);
		}
	}

	key
}

/// Lowercase, trim, and replace volatile substrings with placeholders.
pub fn normalize_message(message: &str) -> String {
	let lowered = message.to_lowercase();
	let trimmed = lowered.trim();
	let without_uuids = UUID_REGEX.replace_all(trimmed, NoExpand("{{uuid}}"));
	let without_numbers = NUMBER_REGEX.replace_all(&without_uuids, NoExpand("{{n}}"));
	collapse_long_strings(&without_numbers)
}

/// Replaces every `"..."` whose body has at least [`LONG_STRING_UNITS`]
/// UTF-16 code units with `"{{str}}"`.
///
/// A quote that does not open a long string is skipped on its own, so the
/// quote closing a short string may still open a long one.
fn collapse_long_strings(input: &str) -> String {
	let mut out = String::with_capacity(input.len());
	let mut rest = input;

	while let Some(open) = rest.find('"') {
		let body = &rest[open + 1..];
		match body.find('"') {
			Some(close) if body[..close].encode_utf16().count() >= LONG_STRING_UNITS => {
				out.push_str(&rest[..open]);
				out.push_str("\"{{str}}\"");
				rest = &body[close + 1..];
			}
			Some(_) => {
				out.push_str(&rest[..=open]);
				rest = body;
			}
			None => break,
		}
	}

	out.push_str(rest);
	out
}

/// Pull up to three frames out of a stack trace.
///
/// Only lines containing `"at "` are considered. Lines that look like
/// `at function (path/to/file.ext:1:2)` become `function@file.ext`; anything
/// else is kept as the trimmed line.
pub fn extract_frames(stack: &str) -> Vec<String> {
	stack
		.lines()
		.filter(|line| line.contains("at "))
		.take(MAX_FRAMES)
		.map(|line| match FRAME_REGEX.captures(line) {
			Some(caps) => format!("{}@{}", &caps[1], &caps[2]),
			None => line.trim().to_string(),
		})
		.collect()
}

/// Two djb2-style hashes (`h = (h * 33) ^ unit` over UTF-16 code units)
/// with different seeds, rendered as two zero-padded 8 digit hex strings.
///
/// Not cryptographic.
pub fn dual_djb2(input: &str) -> String {
	let mut primary = SEED_PRIMARY;
	let mut secondary = SEED_SECONDARY;

	for unit in input.encode_utf16() {
		primary = primary.wrapping_mul(33) ^ u32::from(unit);
		secondary = secondary.wrapping_mul(33) ^ u32::from(unit);
	}

	format!("{primary:08x}{secondary:08x}")
}
