/// All errors that can be returned by an OrgStorage implementation.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Two rows in the same table share a name.
    #[error("duplicate employee name: {name}")]
    DuplicateEmployee { name: String },

    /// Two rows in the same table share a primary key.
    #[error("duplicate employee id: {employee_id}")]
    DuplicateEmployeeId { employee_id: String },

    /// A row's supervisor_id does not reference any row of the table.
    #[error("employee {employee_id} references unknown supervisor {supervisor_id}")]
    UnknownSupervisor {
        employee_id: String,
        supervisor_id: String,
    },

    /// No stored employee has the given name.
    #[error("employee not found: {name}")]
    EmployeeNotFound { name: String },

    /// A backend-specific storage error (DB connection, serialization, etc.).
    #[error("storage backend error: {0}")]
    Backend(String),
}
