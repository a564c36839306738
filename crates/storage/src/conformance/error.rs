use std::future::Future;

use super::{make_record, sample_hierarchy, small_hierarchy, TestResult};
use crate::{OrgStorage, StorageError};

pub(super) async fn run_error_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: OrgStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let mut results = Vec::new();

    results.push(TestResult::from_result(
        "error",
        "get_employee_nonexistent",
        get_employee_nonexistent(factory).await,
    ));
    results.push(TestResult::from_result(
        "error",
        "queries_on_unknown_name_not_found",
        queries_on_unknown_name_not_found(factory).await,
    ));
    results.push(TestResult::from_result(
        "error",
        "duplicate_name_rejected",
        duplicate_name_rejected(factory).await,
    ));
    results.push(TestResult::from_result(
        "error",
        "duplicate_id_rejected",
        duplicate_id_rejected(factory).await,
    ));
    results.push(TestResult::from_result(
        "error",
        "unknown_supervisor_rejected_at_commit",
        unknown_supervisor_rejected_at_commit(factory).await,
    ));

    results
}

// ── Test implementations ──────────────────────────────────────────────────────

/// Looking up a missing name yields EmployeeNotFound carrying that name.
async fn get_employee_nonexistent<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: OrgStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    match s.get_employee("Nobody").await {
        Err(StorageError::EmployeeNotFound { name }) if name == "Nobody" => Ok(()),
        Err(StorageError::EmployeeNotFound { name }) => {
            Err(format!("EmployeeNotFound carried wrong name {name:?}"))
        }
        Ok(rec) => Err(format!("expected EmployeeNotFound, got {rec:?}")),
        Err(e) => Err(format!("expected EmployeeNotFound, got {e}")),
    }
}

/// Range queries for a name that is not stored fail instead of returning
/// an empty list.
async fn queries_on_unknown_name_not_found<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: OrgStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    s.replace_hierarchy(sample_hierarchy(0))
        .await
        .map_err(|e| e.to_string())?;

    if !matches!(
        s.list_subordinates("Nobody").await,
        Err(StorageError::EmployeeNotFound { .. })
    ) {
        return Err("list_subordinates did not return EmployeeNotFound".to_string());
    }
    if !matches!(
        s.list_supervisors("Nobody").await,
        Err(StorageError::EmployeeNotFound { .. })
    ) {
        return Err("list_supervisors did not return EmployeeNotFound".to_string());
    }
    Ok(())
}

/// Two rows with one name cannot be staged in the same snapshot.
async fn duplicate_name_rejected<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: OrgStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let mut snap = s.begin_snapshot().await.map_err(|e| e.to_string())?;
    s.delete_all_employees(&mut snap)
        .await
        .map_err(|e| e.to_string())?;
    s.insert_employee(&mut snap, make_record("Peter", 1, None, 1, 4))
        .await
        .map_err(|e| e.to_string())?;
    let result = s
        .insert_employee(&mut snap, make_record("Peter", 2, Some(1), 2, 3))
        .await;
    let _ = s.abort_snapshot(snap).await;

    match result {
        Err(StorageError::DuplicateEmployee { name }) if name == "Peter" => Ok(()),
        Ok(()) => Err("duplicate name accepted".to_string()),
        Err(e) => Err(format!("expected DuplicateEmployee, got {e}")),
    }
}

/// Two rows with one primary key cannot be staged in the same snapshot.
async fn duplicate_id_rejected<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: OrgStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let mut snap = s.begin_snapshot().await.map_err(|e| e.to_string())?;
    s.delete_all_employees(&mut snap)
        .await
        .map_err(|e| e.to_string())?;
    s.insert_employee(&mut snap, make_record("Peter", 7, None, 1, 4))
        .await
        .map_err(|e| e.to_string())?;
    let result = s
        .insert_employee(&mut snap, make_record("Ham", 7, None, 2, 3))
        .await;
    let _ = s.abort_snapshot(snap).await;

    match result {
        Err(StorageError::DuplicateEmployeeId { .. }) => Ok(()),
        Ok(()) => Err("duplicate id accepted".to_string()),
        Err(e) => Err(format!("expected DuplicateEmployeeId, got {e}")),
    }
}

/// A supervisor_id with no matching row fails the commit and applies nothing.
async fn unknown_supervisor_rejected_at_commit<S, F, Fut>(factory: &F) -> Result<(), String>
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
    s.delete_all_employees(&mut snap)
        .await
        .map_err(|e| e.to_string())?;
    s.insert_employee(&mut snap, make_record("Orphan", 50, Some(51), 1, 2))
        .await
        .map_err(|e| e.to_string())?;

    match s.commit_snapshot(snap).await {
        Err(StorageError::UnknownSupervisor { .. }) => {}
        Ok(()) => return Err("dangling supervisor_id committed".to_string()),
        Err(e) => return Err(format!("expected UnknownSupervisor, got {e}")),
    }

    let count = s.count_employees().await.map_err(|e| e.to_string())?;
    if count != 2 {
        return Err(format!("expected the 2 previous rows to remain, got {count}"));
    }
    Ok(())
}
