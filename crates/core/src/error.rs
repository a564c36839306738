/// Reasons a hierarchy submission is rejected.
///
/// All variants are recoverable: the caller reports them and leaves any
/// previously stored hierarchy untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HierarchyError {
    /// The document is not a JSON object of string to string pairs.
    #[error("invalid JSON posted: {0}")]
    MalformedInput(String),

    /// Nothing was submitted: an empty body or an empty object.
    #[error("no employees were submitted")]
    EmptyInput,

    /// At least one employee was given more than one supervisor.
    ///
    /// `employees` is ordered by the second occurrence of each name.
    #[error(
        "the posted JSON contains loops, these employees have more than one supervisor: {}",
        .employees.join(", ")
    )]
    DuplicateSupervisorAssignment { employees: Vec<String> },

    /// The organized hierarchy has more than one top-level supervisor.
    #[error("the hierarchy has more than one root: {}", .roots.join(", "))]
    MultipleRoots { roots: Vec<String> },

    /// Every employee has one supervisor but the chain loops back on itself
    /// (`A -> B -> C -> A`, or `A -> A`), so these names never reach a root.
    #[error("these employees form a supervision cycle: {}", .employees.join(", "))]
    CyclicSupervision { employees: Vec<String> },

    /// An employee or supervisor name is empty after trimming.
    #[error("employee names must not be blank")]
    BlankName,

    /// A surrogate identifier is not 32 lowercase hexadecimal characters.
    #[error("invalid employee id: {0:?}")]
    InvalidEmployeeId(String),
}

impl HierarchyError {
    /// Stable snake_case code for API responses and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            HierarchyError::MalformedInput(_) => "malformed_input",
            HierarchyError::EmptyInput => "empty_input",
            HierarchyError::DuplicateSupervisorAssignment { .. } => "duplicate_supervisor",
            HierarchyError::MultipleRoots { .. } => "multiple_roots",
            HierarchyError::CyclicSupervision { .. } => "cyclic_supervision",
            HierarchyError::BlankName => "blank_name",
            HierarchyError::InvalidEmployeeId(_) => "invalid_employee_id",
        }
    }

    /// The offending names carried by the error, if any.
    pub fn names(&self) -> Option<&[String]> {
        match self {
            HierarchyError::DuplicateSupervisorAssignment { employees }
            | HierarchyError::CyclicSupervision { employees } => Some(employees),
            HierarchyError::MultipleRoots { roots } => Some(roots),
            _ => None,
        }
    }
}
