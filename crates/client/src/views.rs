//! List and kanban view state for requests.
//!
//! Everything here is pure and synchronous: the views work on whatever the
//! last `list_requests` call returned.

use std::cmp::Ordering;

use echo_core::error::CoreError;
use echo_core::request::{Priority, Status};

use crate::types::{Request, RequestWithRelations};

/// Filter option label meaning "no filter".
pub const ALL_FILTER: &str = "All";

/// Anything that carries a request row.
pub trait AsRequest {
    fn as_request(&self) -> &Request;
}

impl AsRequest for Request {
    fn as_request(&self) -> &Request {
        self
    }
}

impl AsRequest for RequestWithRelations {
    fn as_request(&self) -> &Request {
        &self.request
    }
}

/* --------------------------------------------------------------------------
Filtering
-------------------------------------------------------------------------- */

/// Search box plus the status and priority dropdowns. All predicates are
/// ANDed; an empty search or `None` dropdown matches everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestFilter {
    pub search: String,
    pub status: Option<Status>,
    pub priority: Option<Priority>,
}

impl RequestFilter {
    /// Set the status dropdown from its label; `"All"` clears it.
    pub fn set_status(&mut self, label: &str) -> Result<(), CoreError> {
        self.status = parse_choice(label)?;
        Ok(())
    }

    /// Set the priority dropdown from its label; `"All"` clears it.
    pub fn set_priority(&mut self, label: &str) -> Result<(), CoreError> {
        self.priority = parse_choice(label)?;
        Ok(())
    }

    pub fn matches(&self, request: &Request) -> bool {
        if !self.search.is_empty()
            && !request
                .title
                .to_lowercase()
                .contains(&self.search.to_lowercase())
        {
            return false;
        }
        if self.status.is_some_and(|s| s != request.status) {
            return false;
        }
        if self.priority.is_some_and(|p| p != request.priority) {
            return false;
        }
        true
    }

    pub fn apply<'a, T: AsRequest>(&self, items: &'a [T]) -> Vec<&'a T> {
        items
            .iter()
            .filter(|item| self.matches(item.as_request()))
            .collect()
    }
}

fn parse_choice<T: std::str::FromStr<Err = CoreError>>(label: &str) -> Result<Option<T>, CoreError> {
    if label.is_empty() || label == ALL_FILTER {
        return Ok(None);
    }
    label.parse().map(Some)
}

/* --------------------------------------------------------------------------
Sorting
-------------------------------------------------------------------------- */

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortField {
    Id,
    #[default]
    Title,
    Description,
    /// Least severe first when ascending.
    Priority,
    /// Kanban column order when ascending.
    Status,
    Effort,
    Position,
    CreatedAt,
    UpdatedAt,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    fn flipped(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

/// Column sort of the request table. Starts on title, ascending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SortState {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortState {
    /// Header click: same field flips direction, a new field starts
    /// ascending.
    pub fn toggle(&mut self, field: SortField) {
        if field == self.field {
            self.direction = self.direction.flipped();
        } else {
            self.field = field;
            self.direction = SortDirection::Ascending;
        }
    }

    pub fn compare(&self, a: &Request, b: &Request) -> Ordering {
        let ordering = compare_field(self.field, a, b);
        match self.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }

    /// Stable sort: equal keys keep their incoming order in both directions.
    pub fn sort<T: AsRequest>(&self, items: &mut [T]) {
        items.sort_by(|a, b| self.compare(a.as_request(), b.as_request()));
    }
}

fn compare_field(field: SortField, a: &Request, b: &Request) -> Ordering {
    match field {
        SortField::Id => a.id.cmp(&b.id),
        SortField::Title => a.title.cmp(&b.title),
        SortField::Description => a
            .description
            .as_deref()
            .unwrap_or_default()
            .cmp(b.description.as_deref().unwrap_or_default()),
        SortField::Priority => b.priority.rank().cmp(&a.priority.rank()),
        SortField::Status => status_column(a.status).cmp(&status_column(b.status)),
        SortField::Effort => a.effort.cmp(&b.effort),
        SortField::Position => a.position.cmp(&b.position),
        SortField::CreatedAt => a.created_at.cmp(&b.created_at),
        SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
    }
}

fn status_column(status: Status) -> usize {
    Status::ALL
        .iter()
        .position(|s| *s == status)
        .unwrap_or(Status::ALL.len())
}

/* --------------------------------------------------------------------------
Kanban
-------------------------------------------------------------------------- */

#[derive(Debug)]
pub struct StatusColumn<'a, T> {
    pub status: Status,
    pub items: Vec<&'a T>,
}

/// One column per status in board order, empty columns included. Items keep
/// their incoming order within a column.
pub fn group_by_status<T: AsRequest>(items: &[T]) -> Vec<StatusColumn<'_, T>> {
    columns(items.iter().collect())
}

fn columns<'a, T: AsRequest>(visible: Vec<&'a T>) -> Vec<StatusColumn<'a, T>> {
    Status::ALL
        .into_iter()
        .map(|status| StatusColumn {
            status,
            items: visible
                .iter()
                .copied()
                .filter(|item| item.as_request().status == status)
                .collect(),
        })
        .collect()
}

/* --------------------------------------------------------------------------
Combined view
-------------------------------------------------------------------------- */

/// Filter and sort state of the requests page.
#[derive(Debug, Clone, Default)]
pub struct RequestView {
    pub filter: RequestFilter,
    pub sort: SortState,
}

impl RequestView {
    /// Rows of the table view: filtered, then sorted.
    pub fn rows<'a, T: AsRequest>(&self, items: &'a [T]) -> Vec<&'a T> {
        let mut rows = self.filter.apply(items);
        rows.sort_by(|a, b| self.sort.compare(a.as_request(), b.as_request()));
        rows
    }

    /// Columns of the kanban view: filtered, then grouped.
    pub fn board<'a, T: AsRequest>(&self, items: &'a [T]) -> Vec<StatusColumn<'a, T>> {
        columns(self.filter.apply(items))
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::{TimeZone, Utc};

    use super::*;

    fn request(id: &str, title: &str, priority: Priority, status: Status) -> Request {
        let at = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        Request {
            id: id.to_string(),
            title: title.to_string(),
            description: None,
            priority,
            status,
            effort: 0,
            position: 0,
            user_id: Some(1),
            created_at: at,
            updated_at: at,
        }
    }

    fn sample() -> Vec<Request> {
        vec![
            request("REQ-001", "Add SSO", Priority::High, Status::InProgress),
            request("REQ-002", "Improve UI", Priority::Low, Status::NotStarted),
            request("REQ-003", "sso audit log", Priority::Critical, Status::Completed),
            request("REQ-004", "Bulk export", Priority::High, Status::InProgress),
        ]
    }

    fn ids<T: AsRequest>(items: &[&T]) -> Vec<String> {
        items.iter().map(|i| i.as_request().id.clone()).collect()
    }

    // -- filtering --

    #[test]
    fn search_is_case_insensitive_substring_on_title() {
        let items = vec![
            request("REQ-001", "Add SSO", Priority::Medium, Status::NotStarted),
            request("REQ-002", "Improve UI", Priority::Medium, Status::NotStarted),
        ];
        let filter = RequestFilter {
            search: "sso".into(),
            ..Default::default()
        };

        assert_eq!(ids(&filter.apply(&items)), vec!["REQ-001"]);
    }

    #[test]
    fn predicates_are_anded() {
        let items = sample();
        let mut filter = RequestFilter {
            search: "sso".into(),
            ..Default::default()
        };
        filter.set_priority("High").unwrap();

        assert_eq!(ids(&filter.apply(&items)), vec!["REQ-001"]);

        filter.set_status("Completed").unwrap();
        assert!(filter.apply(&items).is_empty());
    }

    #[test]
    fn all_label_clears_a_dropdown() {
        let mut filter = RequestFilter::default();
        filter.set_status("In Progress").unwrap();
        assert_eq!(filter.status, Some(Status::InProgress));

        filter.set_status(ALL_FILTER).unwrap();
        assert_eq!(filter.status, None);
        assert_eq!(filter.apply(&sample()).len(), 4);
    }

    #[test]
    fn unknown_dropdown_label_is_rejected() {
        let mut filter = RequestFilter::default();
        assert_matches!(filter.set_priority("Urgent"), Err(CoreError::Validation(_)));
        assert_eq!(filter.priority, None);
    }

    // -- sorting --

    #[test]
    fn default_sort_is_title_ascending() {
        let sort = SortState::default();
        assert_eq!(sort.field, SortField::Title);
        assert_eq!(sort.direction, SortDirection::Ascending);

        let mut items = sample();
        sort.sort(&mut items);
        let titles: Vec<_> = items.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, ["Add SSO", "Bulk export", "Improve UI", "sso audit log"]);
    }

    #[test]
    fn toggle_flips_same_field_and_resets_on_new_field() {
        let mut sort = SortState::default();

        sort.toggle(SortField::Title);
        assert_eq!(sort.direction, SortDirection::Descending);
        sort.toggle(SortField::Title);
        assert_eq!(sort.direction, SortDirection::Ascending);

        sort.toggle(SortField::Title);
        sort.toggle(SortField::Effort);
        assert_eq!(sort.field, SortField::Effort);
        assert_eq!(sort.direction, SortDirection::Ascending);
    }

    #[test]
    fn sort_is_stable_in_both_directions() {
        let mut sort = SortState {
            field: SortField::Priority,
            direction: SortDirection::Ascending,
        };

        let mut items = sample();
        sort.sort(&mut items);
        assert_eq!(
            ids(&items.iter().collect::<Vec<_>>()),
            ["REQ-002", "REQ-001", "REQ-004", "REQ-003"]
        );

        sort.toggle(SortField::Priority);
        let mut items = sample();
        sort.sort(&mut items);
        assert_eq!(
            ids(&items.iter().collect::<Vec<_>>()),
            ["REQ-003", "REQ-001", "REQ-004", "REQ-002"]
        );
    }

    #[test]
    fn missing_description_sorts_as_empty() {
        let mut items = sample();
        items[0].description = Some("b".into());
        items[2].description = Some("a".into());
        let sort = SortState {
            field: SortField::Description,
            direction: SortDirection::Ascending,
        };

        sort.sort(&mut items);

        assert_eq!(
            ids(&items.iter().collect::<Vec<_>>()),
            ["REQ-002", "REQ-004", "REQ-003", "REQ-001"]
        );
    }

    #[test]
    fn status_sorts_in_board_order() {
        let mut items = sample();
        SortState {
            field: SortField::Status,
            direction: SortDirection::Ascending,
        }
        .sort(&mut items);

        let statuses: Vec<_> = items.iter().map(|r| r.status).collect();
        assert_eq!(
            statuses,
            [
                Status::NotStarted,
                Status::InProgress,
                Status::InProgress,
                Status::Completed
            ]
        );
    }

    // -- kanban --

    #[test]
    fn board_has_five_columns_in_fixed_order() {
        let items = sample();
        let columns = group_by_status(&items);

        let order: Vec<_> = columns.iter().map(|c| c.status).collect();
        assert_eq!(order, Status::ALL);
        assert_eq!(ids(&columns[1].items), ["REQ-001", "REQ-004"]);
        assert!(columns[2].items.is_empty());
        assert!(columns[4].items.is_empty());
    }

    #[test]
    fn view_filters_before_sorting_and_grouping() {
        let items = sample();
        let mut view = RequestView::default();
        view.filter.search = "s".into();
        view.sort.toggle(SortField::Title);

        assert_eq!(ids(&view.rows(&items)), ["REQ-003", "REQ-001"]);

        let board = view.board(&items);
        assert_eq!(board.len(), 5);
        assert!(board[0].items.is_empty());
        assert_eq!(ids(&board[1].items), ["REQ-001"]);
        assert_eq!(ids(&board[3].items), ["REQ-003"]);
    }
}
