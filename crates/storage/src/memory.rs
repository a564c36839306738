//! In-memory `OrgStorage` backend.
//!
//! Snapshots stage their changes privately; commit validates the resulting
//! table and swaps it in under the write lock, so readers only ever observe
//! whole committed tables.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::StorageError;
use crate::record::EmployeeRecord;
use crate::traits::OrgStorage;

/// Employee table held in process memory. Cloning shares the table.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStorage {
    table: Arc<RwLock<Vec<EmployeeRecord>>>,
}

/// Staged changes of one in-memory transaction.
#[derive(Debug, Default)]
pub struct MemorySnapshot {
    cleared: bool,
    inserted: Vec<EmployeeRecord>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Enforce the table constraints: unique ids, unique names, and every
/// supervisor_id pointing at a row of the same table.
fn check_constraints(rows: &[EmployeeRecord]) -> Result<(), StorageError> {
    let mut ids = HashSet::with_capacity(rows.len());
    let mut names = HashSet::with_capacity(rows.len());
    for row in rows {
        if !ids.insert(row.employee_id.as_str()) {
            return Err(StorageError::DuplicateEmployeeId {
                employee_id: row.employee_id.clone(),
            });
        }
        if !names.insert(row.name.as_str()) {
            return Err(StorageError::DuplicateEmployee {
                name: row.name.clone(),
            });
        }
    }
    for row in rows {
        if let Some(supervisor_id) = &row.supervisor_id {
            if !ids.contains(supervisor_id.as_str()) {
                return Err(StorageError::UnknownSupervisor {
                    employee_id: row.employee_id.clone(),
                    supervisor_id: supervisor_id.clone(),
                });
            }
        }
    }
    Ok(())
}

fn find<'a>(rows: &'a [EmployeeRecord], name: &str) -> Result<&'a EmployeeRecord, StorageError> {
    rows.iter()
        .find(|r| r.name == name)
        .ok_or_else(|| StorageError::EmployeeNotFound {
            name: name.to_string(),
        })
}

fn sorted_by_lft(mut rows: Vec<EmployeeRecord>) -> Vec<EmployeeRecord> {
    rows.sort_by_key(|r| r.lft);
    rows
}

#[async_trait]
impl OrgStorage for InMemoryStorage {
    type Snapshot = MemorySnapshot;

    async fn begin_snapshot(&self) -> Result<MemorySnapshot, StorageError> {
        Ok(MemorySnapshot::default())
    }

    async fn commit_snapshot(&self, snapshot: MemorySnapshot) -> Result<(), StorageError> {
        let mut table = self.table.write().await;
        let mut next = if snapshot.cleared {
            Vec::with_capacity(snapshot.inserted.len())
        } else {
            table.clone()
        };
        next.extend(snapshot.inserted);
        check_constraints(&next)?;

        tracing::debug!(rows = next.len(), "committed employee table");
        *table = next;
        Ok(())
    }

    async fn abort_snapshot(&self, snapshot: MemorySnapshot) -> Result<(), StorageError> {
        tracing::debug!(staged = snapshot.inserted.len(), "aborted snapshot");
        Ok(())
    }

    async fn delete_all_employees(
        &self,
        snapshot: &mut MemorySnapshot,
    ) -> Result<(), StorageError> {
        snapshot.cleared = true;
        snapshot.inserted.clear();
        Ok(())
    }

    async fn insert_employee(
        &self,
        snapshot: &mut MemorySnapshot,
        record: EmployeeRecord,
    ) -> Result<(), StorageError> {
        if snapshot.inserted.iter().any(|r| r.name == record.name) {
            return Err(StorageError::DuplicateEmployee { name: record.name });
        }
        if snapshot
            .inserted
            .iter()
            .any(|r| r.employee_id == record.employee_id)
        {
            return Err(StorageError::DuplicateEmployeeId {
                employee_id: record.employee_id,
            });
        }
        snapshot.inserted.push(record);
        Ok(())
    }

    async fn get_employee(&self, name: &str) -> Result<EmployeeRecord, StorageError> {
        let table = self.table.read().await;
        find(&table, name).cloned()
    }

    async fn list_employees(&self) -> Result<Vec<EmployeeRecord>, StorageError> {
        let table = self.table.read().await;
        Ok(sorted_by_lft(table.clone()))
    }

    async fn list_subordinates(&self, name: &str) -> Result<Vec<EmployeeRecord>, StorageError> {
        let table = self.table.read().await;
        let employee = find(&table, name)?;
        Ok(sorted_by_lft(
            table
                .iter()
                .filter(|r| employee.is_ancestor_of(r))
                .cloned()
                .collect(),
        ))
    }

    async fn list_supervisors(&self, name: &str) -> Result<Vec<EmployeeRecord>, StorageError> {
        let table = self.table.read().await;
        let employee = find(&table, name)?;
        Ok(sorted_by_lft(
            table
                .iter()
                .filter(|r| r.is_ancestor_of(employee))
                .cloned()
                .collect(),
        ))
    }

    async fn count_employees(&self) -> Result<usize, StorageError> {
        Ok(self.table.read().await.len())
    }
}
