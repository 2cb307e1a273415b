//! Feature-request domain constants, enumerations, and validation.
//!
//! Priorities and statuses are persisted as their display strings
//! (`"High"`, `"In Review"`) so the database `CHECK` constraints and the
//! JSON wire format agree without a mapping table.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/* --------------------------------------------------------------------------
Constants
-------------------------------------------------------------------------- */

/// Prefix of every request identifier.
pub const REQUEST_ID_PREFIX: &str = "REQ-";

/// Minimum number of digits in a request identifier (`REQ-007`).
pub const REQUEST_ID_WIDTH: usize = 3;

/// Upper bound on id candidates tried before giving up on a create.
pub const MAX_ID_ATTEMPTS: u32 = 16;

/// Maximum length for a request title.
pub const MAX_TITLE_LENGTH: usize = 500;

/// Activity `target_type` for request activities.
pub const TARGET_REQUEST: &str = "request";

/// Activity action recorded on create.
pub const ACTION_CREATED: &str = "created";

/// Activity action recorded on update.
pub const ACTION_UPDATED: &str = "updated";

/// Activity action recorded when a comment is added.
pub const ACTION_COMMENTED: &str = "commented on";

/* --------------------------------------------------------------------------
Priority
-------------------------------------------------------------------------- */

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl Priority {
    pub const ALL: [Priority; 4] = [
        Priority::Critical,
        Priority::High,
        Priority::Medium,
        Priority::Low,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
            Priority::Critical => "Critical",
        }
    }

    /// Severity rank, most severe first (`Critical` = 1).
    pub fn rank(self) -> u8 {
        match self {
            Priority::Critical => 1,
            Priority::High => 2,
            Priority::Medium => 3,
            Priority::Low => 4,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Priority::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Invalid priority '{s}'. Must be one of: Low, Medium, High, Critical"
                ))
            })
    }
}

/// Sort key for a stored priority string. Unknown values sort last.
pub fn priority_sort_key(priority: &str) -> u8 {
    priority.parse::<Priority>().map_or(5, Priority::rank)
}

/* --------------------------------------------------------------------------
Status
-------------------------------------------------------------------------- */

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    #[default]
    #[serde(rename = "Not Started")]
    NotStarted,
    #[serde(rename = "In Progress")]
    InProgress,
    #[serde(rename = "In Review")]
    InReview,
    Completed,
    Blocked,
}

impl Status {
    /// Kanban column order.
    pub const ALL: [Status; 5] = [
        Status::NotStarted,
        Status::InProgress,
        Status::InReview,
        Status::Completed,
        Status::Blocked,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Status::NotStarted => "Not Started",
            Status::InProgress => "In Progress",
            Status::InReview => "In Review",
            Status::Completed => "Completed",
            Status::Blocked => "Blocked",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Status::ALL
            .into_iter()
            .find(|st| st.as_str() == s)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Invalid status '{s}'. Must be one of: Not Started, In Progress, \
                     In Review, Completed, Blocked"
                ))
            })
    }
}

/* --------------------------------------------------------------------------
Request identifiers
-------------------------------------------------------------------------- */

/// Render the `n`-th request identifier, e.g. `7` -> `REQ-007`.
///
/// Numbers wider than [`REQUEST_ID_WIDTH`] are not truncated (`REQ-1000`).
pub fn format_request_id(n: i64) -> String {
    format!("{REQUEST_ID_PREFIX}{n:0width$}", width = REQUEST_ID_WIDTH)
}

/// Parse the numeric part of a request identifier. Returns `None` for
/// anything that is not `REQ-` followed by digits.
pub fn parse_request_number(id: &str) -> Option<i64> {
    let digits = id.strip_prefix(REQUEST_ID_PREFIX)?;
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// First id candidate for a new request given the current row count.
pub fn initial_id_candidate(existing_count: i64) -> i64 {
    existing_count + 1
}

/* --------------------------------------------------------------------------
Validation functions
-------------------------------------------------------------------------- */

/// Validate a request title: non-blank and within [`MAX_TITLE_LENGTH`].
pub fn validate_title(title: &str) -> Result<(), CoreError> {
    if title.trim().is_empty() {
        return Err(CoreError::Validation("Title is required".to_string()));
    }
    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(CoreError::Validation(format!(
            "Title exceeds maximum length of {MAX_TITLE_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Effort is measured in whole weeks and cannot be negative.
pub fn validate_effort(effort: i32) -> Result<(), CoreError> {
    if effort < 0 {
        return Err(CoreError::Validation(format!(
            "Effort must be a non-negative number of weeks, got {effort}"
        )));
    }
    Ok(())
}

/// Validate an optional priority string, returning the parsed value.
pub fn validate_priority(priority: Option<&str>) -> Result<Option<Priority>, CoreError> {
    priority.map(|p| p.parse::<Priority>()).transpose()
}

/// Validate an optional status string, returning the parsed value.
pub fn validate_status(status: Option<&str>) -> Result<Option<Status>, CoreError> {
    status.map(|s| s.parse::<Status>()).transpose()
}
