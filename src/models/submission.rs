//! # Submission Types
//!
//! The tagged intent a photo form is submitted with and the structured
//! result reported back to the page when a submission is not accepted.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// What a form submission asks the server to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// Remove the current photo
    Delete,
    /// Replace the current photo with the uploaded file
    Submit,
    /// Check the submit fields and re-render, without persisting anything
    Validate,
}

impl Intent {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "delete" => Some(Intent::Delete),
            "submit" => Some(Intent::Submit),
            "validate" => Some(Intent::Validate),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Delete => "delete",
            Intent::Submit => "submit",
            Intent::Validate => "validate",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of the last submission as seen by the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    Idle,
    Error,
    Success,
}

/// Validation result returned to the page, keyed by form field name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionResult {
    pub status: SubmissionStatus,
    pub intent: Option<Intent>,
    pub field_errors: BTreeMap<String, Vec<String>>,
    pub form_errors: Vec<String>,
}

impl SubmissionResult {
    pub fn success(intent: Intent) -> Self {
        Self {
            status: SubmissionStatus::Success,
            intent: Some(intent),
            field_errors: BTreeMap::new(),
            form_errors: Vec::new(),
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.field_errors.is_empty() || !self.form_errors.is_empty()
    }

    /// Errors reported for a single form field.
    pub fn errors_for(&self, field: &str) -> &[String] {
        self.field_errors
            .get(field)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

/// JSON body of a non-redirect action response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionResponse {
    pub result: SubmissionResult,
}
