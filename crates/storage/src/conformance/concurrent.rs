use std::future::Future;
use std::sync::Arc;

use super::{sample_hierarchy, TestResult};
use crate::record::EmployeeRecord;
use crate::OrgStorage;

/// Number of concurrent tasks to spawn in each test.
const N: usize = 10;

pub(super) async fn run_concurrent_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: OrgStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let mut results = Vec::new();

    results.push(TestResult::from_result(
        "concurrent",
        "concurrent_replacements_leave_one_generation",
        concurrent_replacements_leave_one_generation(factory).await,
    ));
    results.push(TestResult::from_result(
        "concurrent",
        "readers_never_observe_mixed_tables",
        readers_never_observe_mixed_tables(factory).await,
    ));

    results
}

/// The generation suffix of a row name, `0` for unsuffixed names.
fn generation_of(record: &EmployeeRecord) -> u32 {
    record
        .name
        .rsplit_once('-')
        .and_then(|(_, g)| g.parse().ok())
        .unwrap_or(0)
}

/// A table is consistent when it is empty or holds exactly one whole
/// generation of the sample hierarchy.
fn check_single_generation(rows: &[EmployeeRecord]) -> Result<(), String> {
    if rows.is_empty() {
        return Ok(());
    }
    if rows.len() != 5 {
        return Err(format!("expected 0 or 5 rows, saw {}", rows.len()));
    }
    let generation = generation_of(&rows[0]);
    if rows.iter().any(|r| generation_of(r) != generation) {
        let names: Vec<&str> = rows.iter().map(|r| r.name.as_str()).collect();
        return Err(format!("rows from different replacements mixed: {names:?}"));
    }
    Ok(())
}

// ── Concurrent replace: last commit wins whole ──────────────────────────────

/// N tasks each replace the table with their own generation. Every replace
/// succeeds and the surviving table is exactly one of them.
async fn concurrent_replacements_leave_one_generation<S, F, Fut>(
    factory: &F,
) -> Result<(), String>
where
    S: OrgStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let storage = Arc::new(factory().await);

    let mut handles = Vec::new();
    for i in 0..N {
        let s = storage.clone();
        let generation = i as u32 + 1;
        handles.push(tokio::spawn(async move {
            s.replace_hierarchy(sample_hierarchy(generation)).await
        }));
    }

    for handle in handles {
        handle
            .await
            .map_err(|e| format!("task panicked: {e}"))?
            .map_err(|e| format!("replace failed: {e}"))?;
    }

    let rows = storage.list_employees().await.map_err(|e| e.to_string())?;
    if rows.is_empty() {
        return Err("table empty after concurrent replacements".to_string());
    }
    check_single_generation(&rows)
}

// ── Readers during writes ───────────────────────────────────────────────────

/// Readers polling while writers replace the table only ever see a whole
/// committed table.
async fn readers_never_observe_mixed_tables<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: OrgStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let storage = Arc::new(factory().await);

    let mut writers = Vec::new();
    for i in 0..N {
        let s = storage.clone();
        let generation = i as u32 + 1;
        writers.push(tokio::spawn(async move {
            for _ in 0..5 {
                s.replace_hierarchy(sample_hierarchy(generation)).await?;
                tokio::task::yield_now().await;
            }
            Ok::<(), crate::StorageError>(())
        }));
    }

    let mut readers = Vec::new();
    for _ in 0..N {
        let s = storage.clone();
        readers.push(tokio::spawn(async move {
            for _ in 0..20 {
                let rows = s.list_employees().await.map_err(|e| e.to_string())?;
                check_single_generation(&rows)?;
                tokio::task::yield_now().await;
            }
            Ok::<(), String>(())
        }));
    }

    for handle in writers {
        handle
            .await
            .map_err(|e| format!("writer panicked: {e}"))?
            .map_err(|e| format!("replace failed: {e}"))?;
    }
    for handle in readers {
        handle.await.map_err(|e| format!("reader panicked: {e}"))??;
    }
    Ok(())
}
