// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Severity levels shared by reports and breadcrumbs.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ErrorsCoreError;

/// Severity of a captured report or breadcrumb.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorLevel {
	Fatal,
	Error,
	Warning,
	Info,
}

impl ErrorLevel {
	/// Level used when the caller does not pick one: reports that carry a
	/// stack trace are errors, everything else is a warning.
	pub fn default_for(has_stack: bool) -> Self {
		if has_stack {
			Self::Error
		} else {
			Self::Warning
		}
	}
}

impl fmt::Display for ErrorLevel {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Fatal => write!(f, "fatal"),
			Self::Error => write!(f, "error"),
			Self::Warning => write!(f, "warning"),
			Self::Info => write!(f, "info"),
		}
	}
}

impl FromStr for ErrorLevel {
	type Err = ErrorsCoreError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"fatal" => Ok(Self::Fatal),
			"error" => Ok(Self::Error),
			"warning" => Ok(Self::Warning),
			"info" => Ok(Self::Info),
			_ => Err(ErrorsCoreError::InvalidLevel(s.to_string())),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	#[test]
	fn default_level_depends_on_stack() {
		assert_eq!(ErrorLevel::default_for(true), ErrorLevel::Error);
		assert_eq!(ErrorLevel::default_for(false), ErrorLevel::Warning);
	}

	#[test]
	fn serializes_lowercase() {
		let json = serde_json::to_string(&ErrorLevel::Warning).unwrap();
		assert_eq!(json, "\"warning\"");
	}

	#[test]
	fn rejects_unknown_level() {
		assert!(matches!(
			"critical".parse::<ErrorLevel>(),
			Err(ErrorsCoreError::InvalidLevel(_))
		));
	}

	proptest! {
		#[test]
		fn level_display_parses_back(level in prop_oneof![
			Just(ErrorLevel::Fatal),
			Just(ErrorLevel::Error),
			Just(ErrorLevel::Warning),
			Just(ErrorLevel::Info),
		]) {
			let parsed: ErrorLevel = level.to_string().parse().unwrap();
			prop_assert_eq!(level, parsed);
		}
	}
}
