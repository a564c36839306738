use std::future::Future;

use super::{make_record, names, sample_hierarchy, small_hierarchy, TestResult};
use crate::OrgStorage;

pub(super) async fn run_snapshot_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: OrgStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let mut results = Vec::new();

    results.push(TestResult::from_result(
        "snapshot",
        "uncommitted_inserts_invisible",
        uncommitted_inserts_invisible(factory).await,
    ));
    results.push(TestResult::from_result(
        "snapshot",
        "uncommitted_delete_invisible",
        uncommitted_delete_invisible(factory).await,
    ));
    results.push(TestResult::from_result(
        "snapshot",
        "aborted_snapshot_discarded",
        aborted_snapshot_discarded(factory).await,
    ));
    results.push(TestResult::from_result(
        "snapshot",
        "dropped_snapshot_discarded",
        dropped_snapshot_discarded(factory).await,
    ));
    results.push(TestResult::from_result(
        "snapshot",
        "insert_without_delete_appends",
        insert_without_delete_appends(factory).await,
    ));

    results
}

// ── Test implementations ──────────────────────────────────────────────────────

/// Rows staged in an open snapshot are not visible to queries.
async fn uncommitted_inserts_invisible<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: OrgStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let mut snap = s.begin_snapshot().await.map_err(|e| e.to_string())?;
    for record in sample_hierarchy(0) {
        s.insert_employee(&mut snap, record)
            .await
            .map_err(|e| e.to_string())?;
    }

    let count = s.count_employees().await.map_err(|e| e.to_string())?;
    if count != 0 {
        return Err(format!("uncommitted rows visible: {count}"));
    }

    s.commit_snapshot(snap).await.map_err(|e| e.to_string())?;
    let count = s.count_employees().await.map_err(|e| e.to_string())?;
    if count != 5 {
        return Err(format!("expected 5 rows after commit, got {count}"));
    }
    Ok(())
}

/// A staged delete-all does not empty the committed table.
async fn uncommitted_delete_invisible<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: OrgStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    s.replace_hierarchy(sample_hierarchy(0))
        .await
        .map_err(|e| e.to_string())?;

    let mut snap = s.begin_snapshot().await.map_err(|e| e.to_string())?;
    s.delete_all_employees(&mut snap)
        .await
        .map_err(|e| e.to_string())?;

    let count = s.count_employees().await.map_err(|e| e.to_string())?;
    s.abort_snapshot(snap).await.map_err(|e| e.to_string())?;
    if count != 5 {
        return Err(format!("uncommitted delete visible: {count} rows left"));
    }
    Ok(())
}

/// Abort discards the staged replacement entirely.
async fn aborted_snapshot_discarded<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: OrgStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    s.replace_hierarchy(sample_hierarchy(0))
        .await
        .map_err(|e| e.to_string())?;

    let mut snap = s.begin_snapshot().await.map_err(|e| e.to_string())?;
    s.delete_all_employees(&mut snap)
        .await
        .map_err(|e| e.to_string())?;
    for record in small_hierarchy() {
        s.insert_employee(&mut snap, record)
            .await
            .map_err(|e| e.to_string())?;
    }
    s.abort_snapshot(snap).await.map_err(|e| e.to_string())?;

    let rows = s.list_employees().await.map_err(|e| e.to_string())?;
    if names(&rows) != ["Jonas", "Sophie", "Nick", "Pete", "Barbara"] {
        return Err(format!("abort leaked changes: {:?}", names(&rows)));
    }
    Ok(())
}

/// Dropping a snapshot without commit behaves like abort.
async fn dropped_snapshot_discarded<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: OrgStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    {
        let mut snap = s.begin_snapshot().await.map_err(|e| e.to_string())?;
        for record in small_hierarchy() {
            s.insert_employee(&mut snap, record)
                .await
                .map_err(|e| e.to_string())?;
        }
    }

    let count = s.count_employees().await.map_err(|e| e.to_string())?;
    if count != 0 {
        return Err(format!("dropped snapshot leaked {count} rows"));
    }
    Ok(())
}

/// Inserting without a delete keeps the rows already committed.
async fn insert_without_delete_appends<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: OrgStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    s.replace_hierarchy(small_hierarchy())
        .await
        .map_err(|e| e.to_string())?;

    let mut snap = s.begin_snapshot().await.map_err(|e| e.to_string())?;
    s.insert_employee(&mut snap, make_record("Tender", 77, None, 5, 6))
        .await
        .map_err(|e| e.to_string())?;
    s.commit_snapshot(snap).await.map_err(|e| e.to_string())?;

    let rows = s.list_employees().await.map_err(|e| e.to_string())?;
    if names(&rows) != ["Peter", "Ham", "Tender"] {
        return Err(format!("expected [Peter, Ham, Tender], got {:?}", names(&rows)));
    }
    Ok(())
}
