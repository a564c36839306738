//! Conformance test suite for `OrgStorage` implementations.
//!
//! This module provides a backend-agnostic test suite that any `OrgStorage`
//! implementation can run to verify correctness. The suite covers:
//!
//! - **Replace**: whole-table replacement, constraint failures keep the old table
//! - **Snapshot isolation**: uncommitted writes invisible, aborted writes discarded
//! - **Queries**: lookups and nested-set ancestor/descendant ranges
//! - **Concurrency**: concurrent replacements never interleave
//!
//! # Usage
//!
//! Backend crates call [`run_conformance_suite`] with a factory function that
//! creates a fresh, empty storage instance for each test:
//!
//! ```ignore
//! use orgchart_storage::conformance::run_conformance_suite;
//!
//! #[tokio::test]
//! async fn postgres_conformance() {
//!     let report = run_conformance_suite(|| async {
//!         create_test_postgres_storage().await
//!     }).await;
//!     assert!(report.failed == 0, "{report}");
//! }
//! ```

mod concurrent;
mod error;
mod query;
mod replace;
mod snapshot;

use std::fmt;
use std::future::Future;

use crate::record::EmployeeRecord;
use crate::OrgStorage;

/// Result of a single conformance test.
#[derive(Debug, Clone)]
pub struct TestResult {
    /// Test category (e.g. "replace", "snapshot", "query").
    pub category: String,
    /// Test name (e.g. "replace_overwrites_previous_table").
    pub name: String,
    /// Whether the test passed.
    pub passed: bool,
    /// Error message if the test failed.
    pub message: Option<String>,
}

impl TestResult {
    fn pass(category: &str, name: &str) -> Self {
        Self {
            category: category.to_string(),
            name: name.to_string(),
            passed: true,
            message: None,
        }
    }

    fn fail(category: &str, name: &str, msg: String) -> Self {
        Self {
            category: category.to_string(),
            name: name.to_string(),
            passed: false,
            message: Some(msg),
        }
    }

    fn from_result(category: &str, name: &str, result: Result<(), String>) -> Self {
        match result {
            Ok(()) => Self::pass(category, name),
            Err(msg) => Self::fail(category, name, msg),
        }
    }
}

/// Aggregated report from a full conformance suite run.
#[derive(Debug, Clone)]
pub struct ConformanceReport {
    pub results: Vec<TestResult>,
    pub passed: usize,
    pub failed: usize,
    pub total: usize,
}

impl fmt::Display for ConformanceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Conformance: {}/{} passed ({} failed)",
            self.passed, self.total, self.failed
        )?;
        for r in &self.results {
            if !r.passed {
                writeln!(
                    f,
                    "  FAIL [{}/{}]: {}",
                    r.category,
                    r.name,
                    r.message.as_deref().unwrap_or("(no message)")
                )?;
            }
        }
        Ok(())
    }
}

/// Run the full conformance suite against a storage backend.
///
/// The `factory` function is called once per test to create a fresh, empty
/// storage instance, ensuring test isolation.
pub async fn run_conformance_suite<S, F, Fut>(factory: F) -> ConformanceReport
where
    S: OrgStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let mut results = Vec::new();

    results.extend(replace::run_replace_tests(&factory).await);
    results.extend(error::run_error_tests(&factory).await);
    results.extend(snapshot::run_snapshot_tests(&factory).await);
    results.extend(query::run_query_tests(&factory).await);
    results.extend(concurrent::run_concurrent_tests(&factory).await);

    let passed = results.iter().filter(|r| r.passed).count();
    let total = results.len();

    ConformanceReport {
        results,
        passed,
        failed: total - passed,
        total,
    }
}

// ── Helpers: record constructors with sensible defaults ──────────────────────

/// A 32-char lowercase hex id derived from `seed`, stable across calls.
fn make_id(seed: u32) -> String {
    format!("{seed:032x}")
}

fn make_record(
    name: &str,
    id_seed: u32,
    supervisor_seed: Option<u32>,
    lft: u64,
    rgt: u64,
) -> EmployeeRecord {
    EmployeeRecord {
        employee_id: make_id(id_seed),
        name: name.to_string(),
        supervisor_id: supervisor_seed.map(make_id),
        lft,
        rgt,
    }
}

/// Jonas > Sophie > Nick > {Pete, Barbara}, numbered.
///
/// `generation` offsets ids and suffixes names so tables written by
/// different callers can be told apart.
fn sample_hierarchy(generation: u32) -> Vec<EmployeeRecord> {
    let base = generation * 100;
    let suffix = |n: &str| {
        if generation == 0 {
            n.to_string()
        } else {
            format!("{n}-{generation}")
        }
    };
    vec![
        make_record(&suffix("Jonas"), base + 1, None, 1, 10),
        make_record(&suffix("Sophie"), base + 2, Some(base + 1), 2, 9),
        make_record(&suffix("Nick"), base + 3, Some(base + 2), 3, 8),
        make_record(&suffix("Pete"), base + 4, Some(base + 3), 4, 5),
        make_record(&suffix("Barbara"), base + 5, Some(base + 3), 6, 7),
    ]
}

/// Peter > Ham, numbered.
fn small_hierarchy() -> Vec<EmployeeRecord> {
    vec![
        make_record("Peter", 901, None, 1, 4),
        make_record("Ham", 902, Some(901), 2, 3),
    ]
}

fn names(records: &[EmployeeRecord]) -> Vec<String> {
    records.iter().map(|r| r.name.clone()).collect()
}
