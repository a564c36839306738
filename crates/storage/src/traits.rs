use async_trait::async_trait;

use crate::error::StorageError;
use crate::record::EmployeeRecord;

/// The storage trait for orgchart backends.
///
/// An `OrgStorage` implementation holds the employee table: one
/// [`EmployeeRecord`] per employee, replaced wholesale on every accepted
/// hierarchy submission.
///
/// ## Snapshot Semantics
///
/// All mutating operations take `&mut Self::Snapshot`, a type representing an
/// in-progress transaction. The lifecycle is:
///
/// 1. `begin_snapshot()`: start a transaction, returns a `Snapshot`
/// 2. Call mutating methods with `&mut snapshot`
/// 3. `commit_snapshot(snapshot)`: commit and consume the transaction
///    OR `abort_snapshot(snapshot)`: roll back and consume the transaction
///
/// If a `Snapshot` is dropped without committing, nothing it staged may
/// become visible.
///
/// ## Atomic Replace
///
/// Two concurrent replacements must never interleave: readers see either
/// the complete old table or the complete new one, never rows with
/// `lft`/`rgt` bounds from two different submissions. Commit is the
/// mutual-exclusion boundary.
///
/// ## Thread Safety
///
/// Implementations must be `Send + Sync + 'static` to be used in axum
/// application state and across async task boundaries.
#[async_trait]
pub trait OrgStorage: Send + Sync + 'static {
    /// The snapshot (transaction) type used by this storage backend.
    ///
    /// Must be `Send` to allow passing across async task boundaries.
    type Snapshot: Send;

    // ── Snapshot lifecycle ────────────────────────────────────────────────────

    /// Begin a new snapshot (transaction).
    async fn begin_snapshot(&self) -> Result<Self::Snapshot, StorageError>;

    /// Commit a snapshot, making all mutations durable.
    ///
    /// Table constraints (unique names and ids, supervisor references) are
    /// checked here; on violation nothing is applied.
    async fn commit_snapshot(&self, snapshot: Self::Snapshot) -> Result<(), StorageError>;

    /// Abort (roll back) a snapshot, discarding all mutations.
    async fn abort_snapshot(&self, snapshot: Self::Snapshot) -> Result<(), StorageError>;

    // ── Mutations (within snapshot) ───────────────────────────────────────────

    /// Delete every employee row.
    async fn delete_all_employees(&self, snapshot: &mut Self::Snapshot)
        -> Result<(), StorageError>;

    /// Insert one employee row.
    ///
    /// Returns `Err(StorageError::DuplicateEmployee)` or
    /// `Err(StorageError::DuplicateEmployeeId)` when the snapshot already
    /// holds a row with the same name or id.
    async fn insert_employee(
        &self,
        snapshot: &mut Self::Snapshot,
        record: EmployeeRecord,
    ) -> Result<(), StorageError>;

    // ── Query operations (outside snapshot, against committed data) ───────────

    /// Read one employee by name.
    ///
    /// Returns `Err(StorageError::EmployeeNotFound)` if there is none.
    async fn get_employee(&self, name: &str) -> Result<EmployeeRecord, StorageError>;

    /// Every employee, ordered by `lft` (preorder).
    async fn list_employees(&self) -> Result<Vec<EmployeeRecord>, StorageError>;

    /// Every employee below `name` (`lft` and `rgt` strictly inside its
    /// bounds), ordered by `lft`.
    async fn list_subordinates(&self, name: &str) -> Result<Vec<EmployeeRecord>, StorageError>;

    /// Every employee above `name` (bounds strictly enclosing its own),
    /// from the root down to the direct supervisor.
    async fn list_supervisors(&self, name: &str) -> Result<Vec<EmployeeRecord>, StorageError>;

    /// Number of stored employees.
    async fn count_employees(&self) -> Result<usize, StorageError>;

    // ── Provided ──────────────────────────────────────────────────────────────

    /// Replace the whole table with `records` in one snapshot.
    ///
    /// The snapshot is aborted if any step fails, leaving the previous table
    /// in place.
    async fn replace_hierarchy(&self, records: Vec<EmployeeRecord>) -> Result<(), StorageError> {
        let mut snapshot = self.begin_snapshot().await?;
        let staged = async {
            self.delete_all_employees(&mut snapshot).await?;
            for record in records {
                self.insert_employee(&mut snapshot, record).await?;
            }
            Ok::<(), StorageError>(())
        }
        .await;

        match staged {
            Ok(()) => self.commit_snapshot(snapshot).await,
            Err(e) => {
                self.abort_snapshot(snapshot).await?;
                Err(e)
            }
        }
    }
}
