//! HTTP route handlers: health, hierarchy structuring and stored-hierarchy queries.

use std::collections::HashMap;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use orgchart_core::{
    decode_submission, organize_hierarchy, structure_hierarchy, EmployeeName, HierarchyError,
    HierarchyNode, StructuredHierarchy, SupervisionPair, TopDownHierarchy,
};
use orgchart_storage::{EmployeeRecord, OrgStorage, StorageError};
use tracing::{error, info, warn};

use super::json_error;
use super::state::AppState;

/// Fallback handler for unmatched routes.
pub(crate) async fn handle_not_found() -> impl IntoResponse {
    json_error(StatusCode::NOT_FOUND, "not found")
}

/// GET /health
pub(crate) async fn handle_health() -> impl IntoResponse {
    let response = serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    });
    (StatusCode::OK, Json(response))
}

/// 400 body for a rejected submission.
fn rejection(err: &HierarchyError) -> Response {
    let mut body = serde_json::json!({
        "status": "fail",
        "error": err.kind(),
        "message": err.to_string(),
    });
    match err {
        HierarchyError::DuplicateSupervisorAssignment { employees }
        | HierarchyError::CyclicSupervision { employees } => {
            body["employees"] = serde_json::json!(employees);
        }
        HierarchyError::MultipleRoots { roots } => {
            body["roots"] = serde_json::json!(roots);
        }
        _ => {}
    }
    (StatusCode::BAD_REQUEST, Json(body)).into_response()
}

fn storage_failure(err: &StorageError) -> Response {
    match err {
        StorageError::EmployeeNotFound { name } => json_error(
            StatusCode::NOT_FOUND,
            &format!("employee '{name}' not found"),
        )
        .into_response(),
        other => {
            error!(error = %other, "storage failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "storage failure").into_response()
        }
    }
}

/// POST /api/v1/hierarchy/structure
///
/// The body is the raw `{employee: supervisor}` document, taken as bytes so
/// an invalid encoding is rejected like any other malformed document. On
/// success the stored table is replaced and the nested hierarchy echoed back.
pub(crate) async fn handle_structure<S: OrgStorage>(
    State(state): State<Arc<AppState<S>>>,
    body: Bytes,
) -> Response {
    let result = tokio::task::spawn_blocking(move || {
        decode_submission(&body).and_then(structure_hierarchy)
    })
    .await;

    let StructuredHierarchy {
        hierarchy,
        nested_set,
    } = match result {
        Ok(Ok(structured)) => structured,
        Ok(Err(e)) => {
            warn!(error = e.kind(), "rejected hierarchy submission");
            return rejection(&e);
        }
        Err(e) => {
            return json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                &format!("task join error: {e}"),
            )
            .into_response()
        }
    };

    let records: Vec<EmployeeRecord> = nested_set
        .into_entries()
        .into_iter()
        .map(EmployeeRecord::from)
        .collect();
    let employees = records.len();
    if let Err(e) = state.storage.replace_hierarchy(records).await {
        return storage_failure(&e);
    }
    info!(employees, "replaced stored hierarchy");

    let response = serde_json::json!({
        "status": "success",
        "hierarchy": hierarchy,
    });
    (StatusCode::OK, Json(response)).into_response()
}

/// Rebuild the nested hierarchy from stored rows.
///
/// Rows come in `lft` order, so every supervisor is seen before its
/// subordinates and sibling order matches the submission's.
fn rebuild_hierarchy(rows: &[EmployeeRecord]) -> Result<TopDownHierarchy, HierarchyError> {
    let names: HashMap<&str, &str> = rows
        .iter()
        .map(|r| (r.employee_id.as_str(), r.name.as_str()))
        .collect();

    let mut pairs = Vec::with_capacity(rows.len());
    for row in rows {
        let Some(supervisor) = row.supervisor_id.as_deref().and_then(|id| names.get(id)) else {
            continue;
        };
        pairs.push(SupervisionPair::new(
            EmployeeName::new(&row.name)?,
            EmployeeName::new(supervisor)?,
        ));
    }

    if pairs.is_empty() {
        // A lone root has no pair to carry it.
        return rows
            .iter()
            .map(|r| EmployeeName::new(&r.name).map(HierarchyNode::leaf))
            .collect::<Result<Vec<_>, _>>()
            .map(TopDownHierarchy::new);
    }
    organize_hierarchy(&pairs)
}

/// GET /api/v1/hierarchy
pub(crate) async fn handle_get_hierarchy<S: OrgStorage>(
    State(state): State<Arc<AppState<S>>>,
) -> Response {
    let rows = match state.storage.list_employees().await {
        Ok(rows) => rows,
        Err(e) => return storage_failure(&e),
    };
    match rebuild_hierarchy(&rows) {
        Ok(hierarchy) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "status": "success",
                "hierarchy": hierarchy,
            })),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "stored rows do not form a hierarchy");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "stored hierarchy is corrupt")
                .into_response()
        }
    }
}

/// GET /api/v1/hierarchy/employees/{name}
pub(crate) async fn handle_get_employee<S: OrgStorage>(
    State(state): State<Arc<AppState<S>>>,
    Path(name): Path<String>,
) -> Response {
    match state.storage.get_employee(&name).await {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(e) => storage_failure(&e),
    }
}

/// GET /api/v1/hierarchy/employees/{name}/supervisors
pub(crate) async fn handle_list_supervisors<S: OrgStorage>(
    State(state): State<Arc<AppState<S>>>,
    Path(name): Path<String>,
) -> Response {
    match state.storage.list_supervisors(&name).await {
        Ok(rows) => employee_list(&name, "supervisors", rows),
        Err(e) => storage_failure(&e),
    }
}

/// GET /api/v1/hierarchy/employees/{name}/subordinates
pub(crate) async fn handle_list_subordinates<S: OrgStorage>(
    State(state): State<Arc<AppState<S>>>,
    Path(name): Path<String>,
) -> Response {
    match state.storage.list_subordinates(&name).await {
        Ok(rows) => employee_list(&name, "subordinates", rows),
        Err(e) => storage_failure(&e),
    }
}

fn employee_list(name: &str, field: &str, rows: Vec<EmployeeRecord>) -> Response {
    let mut body = serde_json::json!({ "employee": name });
    body[field] = serde_json::json!(rows);
    (StatusCode::OK, Json(body)).into_response()
}
