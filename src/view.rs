//! Filter/sort pipeline.
//!
//! [`derive`] maps (tasks, status filter, sort config) to the ordered list
//! the view renders. It never touches the stored collection.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::error::{Error, Result};
use crate::task::{priority_rank, Priority, Task};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Completed,
}

impl StatusFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusFilter::All => "all",
            StatusFilter::Active => "active",
            StatusFilter::Completed => "completed",
        }
    }

    pub fn matches(&self, task: &Task) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Active => !task.completed,
            StatusFilter::Completed => task.completed,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(StatusFilter::All),
            "active" => Ok(StatusFilter::Active),
            "completed" => Ok(StatusFilter::Completed),
            other => Err(Error::Validation(format!(
                "invalid status filter '{other}' (expected all|active|completed)"
            ))),
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field the view is ordered by.
///
/// `Unsorted` keeps the input order; unknown criterion names parse to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortCriterion {
    Title,
    Priority,
    DueDate,
    CreationDate,
    Unsorted,
}

impl SortCriterion {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortCriterion::Title => "title",
            SortCriterion::Priority => "priority",
            SortCriterion::DueDate => "dueDate",
            SortCriterion::CreationDate => "creationDate",
            SortCriterion::Unsorted => "unsorted",
        }
    }

    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "title" => SortCriterion::Title,
            "priority" => SortCriterion::Priority,
            "duedate" => SortCriterion::DueDate,
            "creationdate" => SortCriterion::CreationDate,
            _ => SortCriterion::Unsorted,
        }
    }
}

impl fmt::Display for SortCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    pub fn reversed(&self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

impl FromStr for SortDirection {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            other => Err(Error::Validation(format!(
                "invalid sort direction '{other}' (expected asc|desc)"
            ))),
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SortConfig {
    pub criterion: SortCriterion,
    pub direction: SortDirection,
}

impl SortConfig {
    pub fn new(criterion: SortCriterion, direction: SortDirection) -> Self {
        Self {
            criterion,
            direction,
        }
    }
}

impl Default for SortConfig {
    fn default() -> Self {
        Self::new(SortCriterion::CreationDate, SortDirection::Desc)
    }
}

/// Filter and order `tasks` for display.
pub fn derive(tasks: &[Task], filter: StatusFilter, sort: SortConfig) -> Vec<Task> {
    let mut visible: Vec<Task> = tasks
        .iter()
        .filter(|task| filter.matches(task))
        .cloned()
        .collect();
    // sort_by is stable, so equal keys keep insertion order
    visible.sort_by(|left, right| compare(left, right, sort));
    visible
}

/// Ordering of two tasks under `sort`.
pub fn compare(left: &Task, right: &Task, sort: SortConfig) -> Ordering {
    match sort.criterion {
        SortCriterion::Priority => compare_priority(left.priority, right.priority, sort.direction),
        SortCriterion::Title => directed(compare_titles(&left.title, &right.title), sort.direction),
        SortCriterion::DueDate => directed(
            compare_due_dates(left.due_date, right.due_date),
            sort.direction,
        ),
        SortCriterion::CreationDate => {
            directed(left.creation_date.cmp(&right.creation_date), sort.direction)
        }
        SortCriterion::Unsorted => Ordering::Equal,
    }
}

fn directed(ordering: Ordering, direction: SortDirection) -> Ordering {
    match direction {
        SortDirection::Asc => ordering,
        SortDirection::Desc => ordering.reverse(),
    }
}

/// Accent- and case-insensitive first, then the raw text so the order is
/// total.
fn compare_titles(left: &str, right: &str) -> Ordering {
    title_key(left)
        .cmp(&title_key(right))
        .then_with(|| left.cmp(right))
}

/// Collation key: decomposed, combining marks dropped, lowercased.
fn title_key(title: &str) -> String {
    title
        .nfd()
        .filter(|ch| !is_combining_mark(*ch))
        .collect::<String>()
        .to_lowercase()
}

/// Dated tasks before undated ones.
fn compare_due_dates(
    left: Option<chrono::NaiveDate>,
    right: Option<chrono::NaiveDate>,
) -> Ordering {
    match (left, right) {
        (Some(left), Some(right)) => left.cmp(&right),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Asc: low, medium, high. Desc: high, medium, low. Unprioritized last in
/// both.
fn compare_priority(
    left: Option<Priority>,
    right: Option<Priority>,
    direction: SortDirection,
) -> Ordering {
    match (left, right) {
        (Some(_), Some(_)) => {
            let ranked = priority_rank(left).cmp(&priority_rank(right));
            match direction {
                SortDirection::Desc => ranked,
                SortDirection::Asc => ranked.reverse(),
            }
        }
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
