//! Dashboard metric arithmetic.
//!
//! The SQL layer only counts rows; ratios and rounding live here so the
//! zero-denominator rules are defined in one place.

/// Customer stage that counts towards "active customers".
pub const STAGE_ACTIVE: &str = "Active";

/// Number of rows in each "recent"/"top" dashboard list.
pub const DASHBOARD_LIST_LIMIT: i64 = 5;

/// Percentage of completed requests, rounded to the nearest integer.
///
/// Defined as `0` when there are no requests.
pub fn completion_rate(completed: i64, total: i64) -> i64 {
    if total <= 0 {
        return 0;
    }
    (completed as f64 / total as f64 * 100.0).round() as i64
}

/// Requests per active customer, rounded to one decimal place.
///
/// Defined as `0.0` when there are no active customers.
pub fn request_to_customer_ratio(total_requests: i64, active_customers: i64) -> f64 {
    if active_customers <= 0 {
        return 0.0;
    }
    (total_requests as f64 / active_customers as f64 * 10.0).round() / 10.0
}
