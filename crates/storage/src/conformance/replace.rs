use std::future::Future;

use super::{make_record, names, sample_hierarchy, small_hierarchy, TestResult};
use crate::{OrgStorage, StorageError};

pub(super) async fn run_replace_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: OrgStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let mut results = Vec::new();

    results.push(TestResult::from_result(
        "replace",
        "replace_populates_empty_table",
        replace_populates_empty_table(factory).await,
    ));
    results.push(TestResult::from_result(
        "replace",
        "replace_overwrites_previous_table",
        replace_overwrites_previous_table(factory).await,
    ));
    results.push(TestResult::from_result(
        "replace",
        "replace_with_nothing_clears_table",
        replace_with_nothing_clears_table(factory).await,
    ));
    results.push(TestResult::from_result(
        "replace",
        "replace_preserves_record_fields",
        replace_preserves_record_fields(factory).await,
    ));
    results.push(TestResult::from_result(
        "replace",
        "failed_replace_keeps_previous_table",
        failed_replace_keeps_previous_table(factory).await,
    ));

    results
}

// ── Test implementations ──────────────────────────────────────────────────────

/// A replace on a fresh backend stores every record.
async fn replace_populates_empty_table<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: OrgStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    s.replace_hierarchy(sample_hierarchy(0))
        .await
        .map_err(|e| e.to_string())?;

    let count = s.count_employees().await.map_err(|e| e.to_string())?;
    if count != 5 {
        return Err(format!("expected 5 employees, got {count}"));
    }
    Ok(())
}

/// A second replace leaves none of the first table's rows behind.
async fn replace_overwrites_previous_table<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: OrgStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    s.replace_hierarchy(sample_hierarchy(0))
        .await
        .map_err(|e| e.to_string())?;
    s.replace_hierarchy(small_hierarchy())
        .await
        .map_err(|e| e.to_string())?;

    let rows = s.list_employees().await.map_err(|e| e.to_string())?;
    if names(&rows) != ["Peter", "Ham"] {
        return Err(format!("expected [Peter, Ham], got {:?}", names(&rows)));
    }
    match s.get_employee("Jonas").await {
        Err(StorageError::EmployeeNotFound { .. }) => Ok(()),
        Ok(_) => Err("Jonas survived the replace".to_string()),
        Err(e) => Err(format!("expected EmployeeNotFound, got {e}")),
    }
}

/// Replacing with an empty list empties the table.
async fn replace_with_nothing_clears_table<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: OrgStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    s.replace_hierarchy(sample_hierarchy(0))
        .await
        .map_err(|e| e.to_string())?;
    s.replace_hierarchy(Vec::new())
        .await
        .map_err(|e| e.to_string())?;

    let count = s.count_employees().await.map_err(|e| e.to_string())?;
    if count != 0 {
        return Err(format!("expected empty table, got {count} rows"));
    }
    Ok(())
}

/// Stored rows read back exactly as written.
async fn replace_preserves_record_fields<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: OrgStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let records = sample_hierarchy(0);
    s.replace_hierarchy(records.clone())
        .await
        .map_err(|e| e.to_string())?;

    for expected in &records {
        let actual = s
            .get_employee(&expected.name)
            .await
            .map_err(|e| e.to_string())?;
        if &actual != expected {
            return Err(format!("expected {expected:?}, got {actual:?}"));
        }
    }
    Ok(())
}

/// A replace that violates a constraint leaves the old table untouched.
async fn failed_replace_keeps_previous_table<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: OrgStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    s.replace_hierarchy(sample_hierarchy(0))
        .await
        .map_err(|e| e.to_string())?;

    let mut broken = small_hierarchy();
    broken.push(make_record("Peter", 903, Some(901), 5, 6));
    if s.replace_hierarchy(broken).await.is_ok() {
        return Err("replace with duplicate names succeeded".to_string());
    }

    let rows = s.list_employees().await.map_err(|e| e.to_string())?;
    if names(&rows) != ["Jonas", "Sophie", "Nick", "Pete", "Barbara"] {
        return Err(format!("old table changed: {:?}", names(&rows)));
    }
    Ok(())
}
