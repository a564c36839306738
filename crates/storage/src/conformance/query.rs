use std::future::Future;

use super::{names, sample_hierarchy, TestResult};
use crate::OrgStorage;

pub(super) async fn run_query_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: OrgStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let mut results = Vec::new();

    results.push(TestResult::from_result(
        "query",
        "list_employees_ordered_by_lft",
        list_employees_ordered_by_lft(factory).await,
    ));
    results.push(TestResult::from_result(
        "query",
        "subordinates_are_nested_set_descendants",
        subordinates_are_nested_set_descendants(factory).await,
    ));
    results.push(TestResult::from_result(
        "query",
        "supervisors_are_nested_set_ancestors",
        supervisors_are_nested_set_ancestors(factory).await,
    ));
    results.push(TestResult::from_result(
        "query",
        "empty_table_lists_nothing",
        empty_table_lists_nothing(factory).await,
    ));

    results
}

// ── Test implementations ──────────────────────────────────────────────────────

/// Rows come back in preorder regardless of insertion order.
async fn list_employees_ordered_by_lft<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: OrgStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let mut records = sample_hierarchy(0);
    records.reverse();
    s.replace_hierarchy(records)
        .await
        .map_err(|e| e.to_string())?;

    let rows = s.list_employees().await.map_err(|e| e.to_string())?;
    if names(&rows) != ["Jonas", "Sophie", "Nick", "Pete", "Barbara"] {
        return Err(format!("expected preorder, got {:?}", names(&rows)));
    }
    Ok(())
}

/// Descendants are exactly the rows whose bounds sit inside the employee's.
async fn subordinates_are_nested_set_descendants<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: OrgStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    s.replace_hierarchy(sample_hierarchy(0))
        .await
        .map_err(|e| e.to_string())?;

    let cases: [(&str, &[&str]); 4] = [
        ("Jonas", &["Sophie", "Nick", "Pete", "Barbara"]),
        ("Sophie", &["Nick", "Pete", "Barbara"]),
        ("Nick", &["Pete", "Barbara"]),
        ("Barbara", &[]),
    ];
    for (name, expected) in cases {
        let rows = s
            .list_subordinates(name)
            .await
            .map_err(|e| e.to_string())?;
        if names(&rows) != expected {
            return Err(format!(
                "subordinates of {name}: expected {expected:?}, got {:?}",
                names(&rows)
            ));
        }
    }
    Ok(())
}

/// Ancestors come back root first, direct supervisor last.
async fn supervisors_are_nested_set_ancestors<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: OrgStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    s.replace_hierarchy(sample_hierarchy(0))
        .await
        .map_err(|e| e.to_string())?;

    let cases: [(&str, &[&str]); 3] = [
        ("Pete", &["Jonas", "Sophie", "Nick"]),
        ("Sophie", &["Jonas"]),
        ("Jonas", &[]),
    ];
    for (name, expected) in cases {
        let rows = s
            .list_supervisors(name)
            .await
            .map_err(|e| e.to_string())?;
        if names(&rows) != expected {
            return Err(format!(
                "supervisors of {name}: expected {expected:?}, got {:?}",
                names(&rows)
            ));
        }
    }
    Ok(())
}

/// A fresh backend holds no employees.
async fn empty_table_lists_nothing<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: OrgStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let rows = s.list_employees().await.map_err(|e| e.to_string())?;
    if !rows.is_empty() {
        return Err(format!("expected no rows, got {}", rows.len()));
    }
    let count = s.count_employees().await.map_err(|e| e.to_string())?;
    if count != 0 {
        return Err(format!("expected count 0, got {count}"));
    }
    Ok(())
}
