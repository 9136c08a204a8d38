// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The report payload queued by the reporter and posted to the ingestion
//! endpoint.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::breadcrumb::ErrorBreadcrumb;
use crate::error::ErrorsCoreError;
use crate::level::ErrorLevel;

/// Platform the reporting application runs on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
	#[default]
	Web,
	MobileIos,
	MobileAndroid,
	Server,
}

impl fmt::Display for Platform {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Web => write!(f, "web"),
			Self::MobileIos => write!(f, "mobile_ios"),
			Self::MobileAndroid => write!(f, "mobile_android"),
			Self::Server => write!(f, "server"),
		}
	}
}

impl FromStr for Platform {
	type Err = ErrorsCoreError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"web" => Ok(Self::Web),
			"mobile_ios" => Ok(Self::MobileIos),
			"mobile_android" => Ok(Self::MobileAndroid),
			"server" => Ok(Self::Server),
			_ => Err(ErrorsCoreError::InvalidPlatform(s.to_string())),
		}
	}
}

/// A single captured report.
///
/// Built once at capture time and never mutated afterwards; the breadcrumb
/// list is a copy of the trail as it was at that moment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorReportPayload {
	pub message: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub stack_trace: Option<String>,
	pub level: ErrorLevel,
	pub platform: Platform,
	pub environment: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub release: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub user_id: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub url: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub component: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub action: Option<String>,
	#[serde(default)]
	pub breadcrumbs: Vec<ErrorBreadcrumb>,
	#[serde(default)]
	pub context: serde_json::Map<String, serde_json::Value>,
	#[serde(default)]
	pub tags: HashMap<String, String>,
	pub fingerprint: String,
	/// Capture time, ISO-8601 UTC.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub timestamp: Option<String>,
}

#[cfg(test)]
mod tests {
	use super::*;

	fn sample() -> ErrorReportPayload {
		ErrorReportPayload {
			message: "boom".to_string(),
			stack_trace: None,
			level: ErrorLevel::Warning,
			platform: Platform::MobileIos,
			environment: "staging".to_string(),
			release: None,
			user_id: Some("u_1".to_string()),
			url: None,
			component: Some("Checkout".to_string()),
			action: None,
			breadcrumbs: Vec::new(),
			context: serde_json::Map::new(),
			tags: HashMap::new(),
			fingerprint: "0011223344556677".to_string(),
			timestamp: None,
		}
	}

	#[test]
	fn serializes_with_camel_case_keys() {
		let value = serde_json::to_value(sample()).unwrap();
		assert_eq!(value["userId"], "u_1");
		assert_eq!(value["platform"], "mobile_ios");
		assert_eq!(value["level"], "warning");
		assert_eq!(value["component"], "Checkout");
	}

	#[test]
	fn omits_absent_optional_fields() {
		let value = serde_json::to_value(sample()).unwrap();
		let object = value.as_object().unwrap();
		assert!(!object.contains_key("stackTrace"));
		assert!(!object.contains_key("release"));
		assert!(!object.contains_key("url"));
		assert!(!object.contains_key("timestamp"));
		assert!(object.contains_key("breadcrumbs"));
		assert!(object.contains_key("tags"));
	}

	#[test]
	fn platform_parses_wire_names() {
		assert_eq!("mobile_android".parse::<Platform>().unwrap(), Platform::MobileAndroid);
		assert!("desktop".parse::<Platform>().is_err());
		assert_eq!(Platform::default(), Platform::Web);
	}
}
