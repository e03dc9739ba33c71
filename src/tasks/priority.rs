// SPDX-License-Identifier: MIT
//! Priority derivation rule.
//!
//! Maps a task's state to one of three priority labels. The rule is pure:
//! the caller supplies the clock, so the same inputs always yield the same
//! label and the rule can be exercised with an in-memory snapshot.
//!
//! ## Decision order (first match wins)
//!
//! | Condition                          | Label    |
//! |------------------------------------|----------|
//! | task is completed                  | `low`    |
//! | task is critical                   | `high`   |
//! | due in ≤ 3 days (overdue included) | `high`   |
//! | due in ≤ 7 days                    | `medium` |
//! | otherwise (no or far due date)     | `medium` |
//!
//! "Days until due" is the millisecond span from `now` to the due date,
//! divided by 86,400,000 and rounded up toward positive infinity. An overdue
//! task therefore counts as ≤ 0 days and lands in the `high` band.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ─── Types ────────────────────────────────────────────────────────────────────

/// Task priority label, ordered by urgency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    /// Stored and wire label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }

    /// Listing rank: high sorts before medium sorts before low.
    pub fn rank(&self) -> i64 {
        match self {
            Priority::High => 1,
            Priority::Medium => 2,
            Priority::Low => 3,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The task fields the rule reads, as they will stand once the pending write
/// is applied. Handlers build this from the create payload, or from the
/// stored record merged with the update payload.
#[derive(Debug, Clone, Copy, Default)]
pub struct TaskSnapshot {
    pub is_completed: bool,
    pub is_critical: bool,
    pub due_date: Option<DateTime<Utc>>,
}

// ─── Rule ─────────────────────────────────────────────────────────────────────

const MS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Derive the priority label for `task` as of `now`.
pub fn derive_priority(task: &TaskSnapshot, now: DateTime<Utc>) -> Priority {
    if task.is_completed {
        return Priority::Low;
    }
    if task.is_critical {
        return Priority::High;
    }
    if let Some(due) = task.due_date {
        let days = days_until_due(due, now);
        if days <= 3 {
            return Priority::High;
        }
        if days <= 7 {
            return Priority::Medium;
        }
    }
    Priority::Medium
}

/// Whole days from `now` to `due`, rounded up. Exactly 72 hours out counts
/// as 3 days; one millisecond more counts as 4. Past due dates yield zero or
/// negative counts.
fn days_until_due(due: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let ms = due.signed_duration_since(now).num_milliseconds();
    // Integer ceiling division; rem_euclid is non-negative, so negative spans
    // round toward zero-or-up as well.
    ms.div_euclid(MS_PER_DAY) + i64::from(ms.rem_euclid(MS_PER_DAY) != 0)
}

// ─── Tests ────────────────────────────────────────────────────────────────────
