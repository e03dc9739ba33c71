// SPDX-License-Identifier: MIT
//! Listing query policy.
//!
//! Translates the raw `filter`/`value`/`sort` request parameters into an
//! enumerated query shape: a WHERE predicate and an ORDER BY clause.
//! The resolution happens once at the request boundary; storage only splices
//! the rendered fragments and binds the filter value.
//!
//! Unsupported input never errors. An unknown filter field, a filter without
//! a value, or a value without a filter all resolve to [`TaskFilter::All`];
//! an unknown sort key resolves to the default priority-rank ordering.

// ─── Filter ───────────────────────────────────────────────────────────────────

/// WHERE predicate for a task listing. At most one filter applies per request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TaskFilter {
    /// `filter=isCompleted&value=...` — the value parses as `true` only on
    /// exact match, anything else means `false`.
    Completed(bool),
    /// `filter=priority&value=...` — the label is kept as sent; an
    /// unrecognized label yields an empty result set rather than an error.
    Priority(String),
    /// No predicate: filter absent, unknown, or missing its value.
    #[default]
    All,
}

impl TaskFilter {
    /// Resolve the raw query parameters into a filter variant.
    pub fn from_params(filter: Option<&str>, value: Option<&str>) -> Self {
        match (filter, value) {
            (Some(field), Some(value)) if !field.is_empty() => match field {
                "isCompleted" => TaskFilter::Completed(value == "true"),
                "priority" => TaskFilter::Priority(value.to_owned()),
                _ => TaskFilter::All,
            },
            _ => TaskFilter::All,
        }
    }

    /// WHERE fragment with a bind placeholder for the filter value, or the
    /// empty string when no predicate applies.
    pub fn where_sql(&self) -> &'static str {
        match self {
            TaskFilter::Completed(_) => " WHERE is_completed = ?",
            TaskFilter::Priority(_) => " WHERE priority = ?",
            TaskFilter::All => "",
        }
    }
}

// ─── Sort ─────────────────────────────────────────────────────────────────────

/// ORDER BY clause for a task listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskSort {
    /// `sort=dueDate` — ascending; SQLite places NULL due dates first.
    DueDate,
    /// `sort=priority`, absent, or unrecognized: fixed rank high(1),
    /// medium(2), low(3). Ties keep the storage engine's natural order.
    #[default]
    PriorityRank,
}

impl TaskSort {
    /// Resolve the raw `sort` parameter, falling back to the default rank
    /// ordering for anything unrecognized.
    pub fn from_param(sort: Option<&str>) -> Self {
        match sort {
            Some("dueDate") => TaskSort::DueDate,
            _ => TaskSort::PriorityRank,
        }
    }

    /// ORDER BY fragment.
    pub fn order_sql(&self) -> &'static str {
        match self {
            TaskSort::DueDate => " ORDER BY due_date ASC",
            TaskSort::PriorityRank => {
                // ELSE arm is unreachable under the schema CHECK constraint.
                " ORDER BY CASE priority WHEN 'high' THEN 1 WHEN 'medium' THEN 2 WHEN 'low' THEN 3 ELSE 4 END ASC"
            }
        }
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
