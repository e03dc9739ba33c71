// rest/routes/tasks.rs — Task resource routes.

use anyhow::Context as _;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use std::sync::Arc;

use crate::rest::error::ApiError;
use crate::storage::TaskRow;
use crate::tasks::{derive_priority, TaskFilter, TaskSnapshot, TaskSort};
use crate::AppContext;

// ─── Request types ────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    /// Checked in the handler so a missing title maps to a validation error
    /// rather than a deserialization rejection.
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub is_critical: Option<bool>,
}

/// Partial update: absent fields keep their stored value. For the nullable
/// fields an explicit `null` clears, which the double `Option` keeps distinct
/// from the key being absent.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub due_date: Option<Option<DateTime<Utc>>>,
    pub is_completed: Option<bool>,
    pub is_critical: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListTasksParams {
    pub sort: Option<String>,
    pub filter: Option<String>,
    pub value: Option<String>,
}

/// Outer `None` only when the key is missing entirely; `Some(None)` when the
/// client sent an explicit `null`.
fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}

// ─── Handlers ─────────────────────────────────────────────────────────────────

pub async fn create_task(
    State(ctx): State<Arc<AppContext>>,
    Json(body): Json<CreateTaskRequest>,
) -> Result<(StatusCode, Json<TaskRow>), ApiError> {
    let title = match body.title {
        Some(t) if !t.is_empty() => t,
        _ => return Err(ApiError::Validation("Title is required")),
    };

    let snapshot = TaskSnapshot {
        is_completed: false,
        is_critical: body.is_critical.unwrap_or(false),
        due_date: body.due_date,
    };
    let priority = derive_priority(&snapshot, Utc::now());

    let due_date = snapshot.due_date.map(|d| d.to_rfc3339());
    let task = ctx
        .storage
        .create_task(
            &title,
            body.description.as_deref(),
            due_date.as_deref(),
            snapshot.is_critical,
            priority,
        )
        .await
        .map_err(|e| ApiError::internal(&ctx.config, "Failed to create task", e))?;

    Ok((StatusCode::CREATED, Json(task)))
}

pub async fn list_tasks(
    State(ctx): State<Arc<AppContext>>,
    Query(params): Query<ListTasksParams>,
) -> Result<Json<Vec<TaskRow>>, ApiError> {
    let filter = TaskFilter::from_params(params.filter.as_deref(), params.value.as_deref());
    let sort = TaskSort::from_param(params.sort.as_deref());

    let tasks = ctx
        .storage
        .list_tasks(&filter, sort)
        .await
        .map_err(|e| ApiError::internal(&ctx.config, "Failed to get tasks", e))?;

    Ok(Json(tasks))
}

pub async fn get_task(
    State(ctx): State<Arc<AppContext>>,
    Path(id): Path<i64>,
) -> Result<Json<TaskRow>, ApiError> {
    let task = ctx
        .storage
        .get_task(id)
        .await
        .map_err(|e| ApiError::internal(&ctx.config, "Failed to get task", e))?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(task))
}

pub async fn update_task(
    State(ctx): State<Arc<AppContext>>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateTaskRequest>,
) -> Result<Json<TaskRow>, ApiError> {
    let current = ctx
        .storage
        .get_task(id)
        .await
        .map_err(|e| ApiError::internal(&ctx.config, "Failed to update task", e))?
        .ok_or(ApiError::NotFound)?;

    let title = match body.title {
        Some(t) if !t.is_empty() => t,
        Some(_) => return Err(ApiError::Validation("Title cannot be empty")),
        None => current.title,
    };
    let description = match body.description {
        Some(value) => value,
        None => current.description,
    };
    let due_date = match body.due_date {
        Some(value) => value,
        None => parse_stored_due(current.due_date.as_deref())
            .map_err(|e| ApiError::internal(&ctx.config, "Failed to update task", e))?,
    };
    let is_completed = body.is_completed.unwrap_or(current.is_completed);
    let is_critical = body.is_critical.unwrap_or(current.is_critical);

    // Priority is recomputed from the merged state, never taken from the body.
    let snapshot = TaskSnapshot {
        is_completed,
        is_critical,
        due_date,
    };
    let priority = derive_priority(&snapshot, Utc::now());

    let due_date = snapshot.due_date.map(|d| d.to_rfc3339());
    let task = ctx
        .storage
        .update_task(
            id,
            &title,
            description.as_deref(),
            due_date.as_deref(),
            is_completed,
            is_critical,
            priority,
        )
        .await
        .map_err(|e| ApiError::internal(&ctx.config, "Failed to update task", e))?;

    Ok(Json(task))
}

pub async fn delete_task(
    State(ctx): State<Arc<AppContext>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let deleted = ctx
        .storage
        .delete_task(id)
        .await
        .map_err(|e| ApiError::internal(&ctx.config, "Failed to delete task", e))?;
    if !deleted {
        return Err(ApiError::NotFound);
    }
    Ok(StatusCode::NO_CONTENT)
}

/// Stored due dates are RFC 3339 text written by this service; failing to
/// parse one back means the row was edited out-of-band.
fn parse_stored_due(raw: Option<&str>) -> anyhow::Result<Option<DateTime<Utc>>> {
    raw.map(|s| {
        DateTime::parse_from_rfc3339(s)
            .map(|d| d.with_timezone(&Utc))
            .with_context(|| format!("invalid stored due date: {s}"))
    })
    .transpose()
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_body_distinguishes_absent_from_null() {
        let body: UpdateTaskRequest = serde_json::from_str("{}").unwrap();
        assert!(body.due_date.is_none());
        assert!(body.description.is_none());

        let body: UpdateTaskRequest =
            serde_json::from_str(r#"{"dueDate": null, "description": null}"#).unwrap();
        assert_eq!(body.due_date, Some(None));
        assert_eq!(body.description, Some(None));

        let body: UpdateTaskRequest = serde_json::from_str(r#"{"description": "notes"}"#).unwrap();
        assert_eq!(body.description, Some(Some("notes".into())));
        assert!(body.due_date.is_none());
    }

    #[test]
    fn test_client_priority_field_is_ignored() {
        // Unknown fields are skipped: priority can never be set from a body.
        let body: CreateTaskRequest =
            serde_json::from_str(r#"{"title": "T", "priority": "low"}"#).unwrap();
        assert_eq!(body.title.as_deref(), Some("T"));

        let body: UpdateTaskRequest = serde_json::from_str(r#"{"priority": "high"}"#).unwrap();
        assert!(body.title.is_none());
        assert!(body.is_completed.is_none());
    }

    #[test]
    fn test_parse_stored_due_round_trips() {
        let now = Utc::now();
        let stored = now.to_rfc3339();
        let parsed = parse_stored_due(Some(&stored)).unwrap();
        assert_eq!(parsed, Some(now));

        assert_eq!(parse_stored_due(None).unwrap(), None);
        assert!(parse_stored_due(Some("not-a-date")).is_err());
    }
}
